//! Astra endpoint parsing
//!
//! Astra API endpoints have the form
//! `https://<database-id>-<region>.apps.astra.datastax.com`, where the
//! database id is a UUID (five dash-separated segments) and the region may
//! itself contain dashes.

use crate::config::CloudConfig;
use crate::{Error, Result};
use url::Url;

/// DNS suffix shared by all Astra API endpoints
pub const ASTRA_DOMAIN_SUFFIX: &str = ".apps.astra.datastax.com";

/// Number of leading hostname segments forming the database id
const DATACENTER_SEGMENTS: usize = 5;

/// The `(datacenterID, regionName)` pair identifying a secure bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleTarget {
    /// Database (datacenter) identifier
    pub datacenter_id: String,
    /// Region, if one was given or parsed
    pub region: Option<String>,
}

impl BundleTarget {
    /// Cache file name for this target
    pub fn file_name(&self) -> String {
        match &self.region {
            Some(region) => format!("astra-secure-connect-{}-{}.zip", self.datacenter_id, region),
            None => format!("astra-secure-connect-{}.zip", self.datacenter_id),
        }
    }

    /// Determine the target of a cloud configuration
    ///
    /// Explicit `datacenterID` and `regionName` values take precedence over
    /// the ones parsed from `endpoint`, field by field.
    ///
    /// Values that could escape the cache directory (path separators or
    /// `..`) are rejected.
    pub fn from_config(config: &CloudConfig) -> Result<Self> {
        let target = Self::select(config)?;
        check_file_name_part("datacenter id", &target.datacenter_id)?;
        if let Some(region) = &target.region {
            check_file_name_part("region", region)?;
        }
        Ok(target)
    }

    fn select(config: &CloudConfig) -> Result<Self> {
        match &config.endpoint {
            Some(endpoint) => {
                let parsed = parse_endpoint(endpoint)?;
                Ok(Self {
                    datacenter_id: config
                        .datacenter_id
                        .clone()
                        .unwrap_or(parsed.datacenter_id),
                    region: config.region_name.clone().or(parsed.region),
                })
            }
            None => {
                let datacenter_id = config
                    .datacenter_id
                    .clone()
                    .ok_or(Error::MissingDatacenterIdentifier)?;
                Ok(Self {
                    datacenter_id,
                    region: config.region_name.clone(),
                })
            }
        }
    }
}

fn check_file_name_part(what: &str, value: &str) -> Result<()> {
    if value.contains(['/', '\\']) || value.contains("..") {
        return Err(Error::ConfigurationMalformed(format!(
            "{} '{}' is not usable in a bundle file name",
            what, value
        )));
    }
    Ok(())
}

/// Split an endpoint URL into database id and region
pub fn parse_endpoint(endpoint: &str) -> Result<BundleTarget> {
    let url = Url::parse(endpoint).map_err(|e| {
        Error::ConfigurationMalformed(format!("invalid astra endpoint '{}': {}", endpoint, e))
    })?;
    let host = url.host_str().ok_or_else(|| {
        Error::ConfigurationMalformed(format!("astra endpoint '{}' has no host", endpoint))
    })?;

    Ok(split_hostname(host))
}

fn split_hostname(host: &str) -> BundleTarget {
    let name = host
        .split(ASTRA_DOMAIN_SUFFIX)
        .next()
        .unwrap_or(host);
    let parts: Vec<&str> = name.split('-').collect();
    let split = parts.len().min(DATACENTER_SEGMENTS);
    let region = parts[split..].join("-");

    BundleTarget {
        datacenter_id: parts[..split].join("-"),
        region: (!region.is_empty()).then_some(region),
    }
}
