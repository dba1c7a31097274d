//! Connection configuration records
//!
//! A configuration is either *direct* (contact points plus an optional
//! authentication strategy) or *cloud* (an Astra token plus the information
//! needed to locate a secure connect bundle). The `astra` key selects the
//! cloud shape when parsing JSON.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

/// Named, immutable description of how to reach a cluster
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawConnectionConfig")]
pub enum ConnectionConfig {
    /// Self-hosted cluster reached through contact points
    Direct(DirectConfig),
    /// Managed cloud database reached through a secure connect bundle
    Cloud(CloudConfig),
}

impl ConnectionConfig {
    /// Parse a JSON-encoded configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use cassandra_connector::ConnectionConfig;
    ///
    /// let config = ConnectionConfig::from_json(
    ///     r#"{"contact_points": ["127.0.0.1"], "port": 9042}"#,
    /// ).unwrap();
    /// assert!(!config.is_cloud());
    /// ```
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| {
            Error::ConfigurationMalformed(format!("error parsing connection arguments: {}", e))
        })
    }

    /// Whether this configuration targets the managed cloud variant
    pub fn is_cloud(&self) -> bool {
        matches!(self, Self::Cloud(_))
    }
}

impl From<DirectConfig> for ConnectionConfig {
    fn from(config: DirectConfig) -> Self {
        Self::Direct(config)
    }
}

impl From<CloudConfig> for ConnectionConfig {
    fn from(config: CloudConfig) -> Self {
        Self::Cloud(config)
    }
}

// Wire shape: a flat mapping where a non-null `astra` record wins
#[derive(Deserialize)]
struct RawConnectionConfig {
    #[serde(default)]
    astra: Option<CloudConfig>,
    #[serde(flatten)]
    direct: DirectConfig,
}

impl From<RawConnectionConfig> for ConnectionConfig {
    fn from(raw: RawConnectionConfig) -> Self {
        match raw.astra {
            Some(cloud) => Self::Cloud(cloud),
            None => Self::Direct(raw.direct),
        }
    }
}

/// Direct-mode configuration
#[derive(Clone, Default, PartialEq, Deserialize)]
pub struct DirectConfig {
    /// Authentication strategy identifier (`None` = unauthenticated)
    #[serde(rename = "authProviderClass", default)]
    pub auth_provider: Option<String>,
    /// Strategy-specific arguments
    #[serde(rename = "authProviderArgs", default)]
    pub auth_provider_args: Map<String, Value>,
    /// Everything else is handed to the driver
    #[serde(flatten)]
    pub options: DriverOptions,
}

impl DirectConfig {
    /// Create a builder for a direct-mode configuration
    pub fn builder() -> DirectConfigBuilder {
        DirectConfigBuilder::default()
    }
}

impl fmt::Debug for DirectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Argument values usually carry credentials
        let arg_keys: Vec<&String> = self.auth_provider_args.keys().collect();
        f.debug_struct("DirectConfig")
            .field("auth_provider", &self.auth_provider)
            .field("auth_provider_args", &arg_keys)
            .field("options", &self.options)
            .finish()
    }
}

/// Builder for [`DirectConfig`]
#[derive(Debug, Clone, Default)]
pub struct DirectConfigBuilder {
    config: DirectConfig,
}

impl DirectConfigBuilder {
    /// Set the authentication strategy identifier
    pub fn auth_provider(mut self, name: impl Into<String>) -> Self {
        self.config.auth_provider = Some(name.into());
        self
    }

    /// Add a strategy argument
    pub fn auth_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config
            .auth_provider_args
            .insert(key.into(), value.into());
        self
    }

    /// Add a contact point (`host` or `host:port`)
    pub fn contact_point(mut self, point: impl Into<String>) -> Self {
        self.config.options.contact_points.push(point.into());
        self
    }

    /// Set the native protocol port
    pub fn port(mut self, port: u16) -> Self {
        self.config.options.port = Some(port);
        self
    }

    /// Set the keyspace used by sessions
    pub fn keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.config.options.keyspace = Some(keyspace.into());
        self
    }

    /// Set the driver connection timeout in seconds
    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.options.connect_timeout_secs = Some(secs);
        self
    }

    /// Set the secure connect bundle handed to the driver
    pub fn cloud_bundle_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.options.cloud_bundle_path = Some(path.into());
        self
    }

    /// Add an arbitrary driver option
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.options.extra.insert(key.into(), value.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> DirectConfig {
        self.config
    }
}

/// Driver-level options passed through to the driver collaborator
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DriverOptions {
    /// Contact points (`host` or `host:port`)
    #[serde(default)]
    pub contact_points: Vec<String>,
    /// Native protocol port
    #[serde(default)]
    pub port: Option<u16>,
    /// Keyspace to use
    #[serde(default)]
    pub keyspace: Option<String>,
    /// Connection timeout in seconds
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Secure connect bundle (set for cloud connections)
    #[serde(default)]
    pub cloud_bundle_path: Option<PathBuf>,
    /// Options the crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cloud-mode (Astra) configuration
#[derive(Clone, Default, PartialEq, Deserialize)]
pub struct CloudConfig {
    /// Application token
    pub token: String,
    /// API endpoint, e.g. `https://<db-id>-<region>.apps.astra.datastax.com`
    #[serde(default, deserialize_with = "non_empty_string")]
    pub endpoint: Option<String>,
    /// Database (datacenter) identifier
    #[serde(rename = "datacenterID", default, deserialize_with = "non_empty_string")]
    pub datacenter_id: Option<String>,
    /// Region name
    #[serde(rename = "regionName", default, deserialize_with = "non_empty_string")]
    pub region_name: Option<String>,
    /// Pre-supplied secure connect bundle, trusted as-is
    #[serde(rename = "scb", default, deserialize_with = "non_empty_path")]
    pub secure_bundle_path: Option<PathBuf>,
    /// Override for the bundle discovery URL (`{database_id}` placeholder)
    #[serde(
        rename = "bundleUrlTemplate",
        default,
        deserialize_with = "non_empty_string"
    )]
    pub bundle_url_template: Option<String>,
}

impl CloudConfig {
    /// Cloud configuration located by API endpoint
    pub fn with_endpoint(token: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    /// Cloud configuration located by database id
    pub fn with_database_id(token: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            datacenter_id: Some(database_id.into()),
            ..Self::default()
        }
    }

    /// Request the bundle of a specific region
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region_name = Some(region.into());
        self
    }

    /// Use an existing bundle file instead of downloading one
    pub fn secure_bundle_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.secure_bundle_path = Some(path.into());
        self
    }

    /// Override the discovery URL template
    pub fn bundle_url_template(mut self, template: impl Into<String>) -> Self {
        self.bundle_url_template = Some(template.into());
        self
    }
}

impl fmt::Debug for CloudConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudConfig")
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("datacenter_id", &self.datacenter_id)
            .field("region_name", &self.region_name)
            .field("secure_bundle_path", &self.secure_bundle_path)
            .field("bundle_url_template", &self.bundle_url_template)
            .finish()
    }
}

fn non_empty_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn non_empty_path<'de, D>(deserializer: D) -> std::result::Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_empty_string(deserializer)?.map(PathBuf::from))
}
