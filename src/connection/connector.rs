//! Realizing connections from configurations

use super::driver::{Cluster, Driver, SessionOf};
use crate::auth::{AuthRegistry, PLAIN_TEXT_AUTH_PROVIDER};
use crate::bundle::BundleResolver;
use crate::config::{CloudConfig, ConnectionConfig, DirectConfig};
use crate::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Username used with Astra application tokens
pub const TOKEN_USERNAME: &str = "token";

/// How a connection reaches its cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Contact points, optional authentication strategy
    Direct,
    /// Secure connect bundle plus application token
    Cloud,
}

impl ConnectionMode {
    /// Mode of a configuration
    pub fn of(config: &ConnectionConfig) -> Self {
        match config {
            ConnectionConfig::Direct(_) => Self::Direct,
            ConnectionConfig::Cloud(_) => Self::Cloud,
        }
    }

    pub(crate) fn metric_label(&self) -> &'static str {
        match self {
            Self::Direct => crate::metrics::labels::MODE_DIRECT,
            Self::Cloud => crate::metrics::labels::MODE_CLOUD,
        }
    }
}

impl std::fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Cloud => write!(f, "cloud"),
        }
    }
}

/// A cluster handle plus its default session
///
/// Both are owned by the connection and live until it is dropped.
pub struct Connection<D: Driver> {
    cluster: D::Cluster,
    session: SessionOf<D>,
    mode: ConnectionMode,
}

impl<D: Driver> Connection<D> {
    /// The cluster handle
    pub fn cluster(&self) -> &D::Cluster {
        &self.cluster
    }

    /// The session opened when the connection was realized
    pub fn session(&self) -> &SessionOf<D> {
        &self.session
    }

    /// Open a new session from the same cluster handle
    ///
    /// Every call creates an independent session; the default one returned
    /// by [`session`](Self::session) is left untouched.
    pub async fn new_session(&self) -> Result<SessionOf<D>> {
        self.cluster.connect().await
    }

    /// How this connection reaches its cluster
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }
}

impl<D: Driver> std::fmt::Debug for Connection<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Turns configurations into connections
///
/// Direct configurations go straight to the driver. Cloud configurations
/// first resolve a secure connect bundle and are then rewritten into a
/// direct configuration authenticating with the application token.
pub struct Connector<D: Driver> {
    driver: Arc<D>,
    auth: AuthRegistry,
    bundles: BundleResolver,
}

impl<D: Driver> Connector<D> {
    /// Create a connector
    pub fn new(driver: D, auth: AuthRegistry, bundles: BundleResolver) -> Self {
        Self {
            driver: Arc::new(driver),
            auth,
            bundles,
        }
    }

    /// The driver in use
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The bundle resolver in use
    pub fn bundles(&self) -> &BundleResolver {
        &self.bundles
    }

    /// Realize a connection; errors propagate unmodified
    ///
    /// Cloud configurations fail with [`Error::Driver`] before any network
    /// access when the driver cannot open secure connect bundles.
    pub async fn connect(&self, config: &ConnectionConfig) -> Result<Connection<D>> {
        match config {
            ConnectionConfig::Direct(direct) => {
                self.connect_direct(direct, ConnectionMode::Direct).await
            }
            ConnectionConfig::Cloud(cloud) => {
                if !self.driver.supports_cloud_bundle() {
                    return Err(Error::Driver(
                        "secure connect bundles require a cloud-capable driver".into(),
                    ));
                }
                let bundle = self.bundles.resolve(cloud).await?;
                let direct = cloud_direct_config(cloud, bundle);
                self.connect_direct(&direct, ConnectionMode::Cloud).await
            }
        }
    }

    async fn connect_direct(
        &self,
        config: &DirectConfig,
        mode: ConnectionMode,
    ) -> Result<Connection<D>> {
        let credentials = match &config.auth_provider {
            Some(name) => Some(self.auth.credentials(name, &config.auth_provider_args)?),
            None => None,
        };

        let cluster = self.driver.open_cluster(credentials, &config.options).await?;
        let session = cluster.connect().await?;

        Ok(Connection {
            cluster,
            session,
            mode,
        })
    }
}

impl<D: Driver> std::fmt::Debug for Connector<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("auth", &self.auth)
            .field("bundles", &self.bundles)
            .finish_non_exhaustive()
    }
}

/// Direct configuration equivalent to a cloud configuration whose bundle
/// has been resolved to `bundle`
pub fn cloud_direct_config(config: &CloudConfig, bundle: PathBuf) -> DirectConfig {
    DirectConfig::builder()
        .auth_provider(PLAIN_TEXT_AUTH_PROVIDER)
        .auth_arg("username", TOKEN_USERNAME)
        .auth_arg("password", config.token.clone())
        .cloud_bundle_path(bundle)
        .build()
}
