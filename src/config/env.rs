//! Environment-sourced connection configurations
//!
//! Two configurations may be pre-registered from the process environment:
//! * `env_cassandra`: JSON document in `CASSANDRA_CONNECTION`
//! * `env_astra`: assembled from the `ASTRA_DB_*` variables, present only
//!   when `ASTRA_DB_APPLICATION_TOKEN` is set

use super::connection::{CloudConfig, ConnectionConfig};
use crate::Result;
use std::path::PathBuf;

/// Key under which the `CASSANDRA_CONNECTION` configuration is registered
pub const ENV_CASSANDRA_KEY: &str = "env_cassandra";

/// Key under which the `ASTRA_DB_*` configuration is registered
pub const ENV_ASTRA_KEY: &str = "env_astra";

/// JSON-encoded direct-mode configuration
pub const CASSANDRA_CONNECTION: &str = "CASSANDRA_CONNECTION";
/// Astra application token
pub const ASTRA_DB_APPLICATION_TOKEN: &str = "ASTRA_DB_APPLICATION_TOKEN";
/// Astra API endpoint
pub const ASTRA_DB_API_ENDPOINT: &str = "ASTRA_DB_API_ENDPOINT";
/// Astra database id
pub const ASTRA_DB_DATABASE_ID: &str = "ASTRA_DB_DATABASE_ID";
/// Astra region
pub const ASTRA_DB_REGION: &str = "ASTRA_DB_REGION";
/// Local secure connect bundle path
pub const ASTRA_DB_SECURE_BUNDLE_PATH: &str = "ASTRA_DB_SECURE_BUNDLE_PATH";

/// Read the named configurations from the process environment
pub fn configs_from_env() -> Result<Vec<(String, ConnectionConfig)>> {
    configs_from_lookup(|name| std::env::var(name).ok())
}

/// Read the named configurations through an arbitrary variable lookup
///
/// Unset and empty variables are treated alike. A malformed
/// `CASSANDRA_CONNECTION` document is an error.
pub fn configs_from_lookup<F>(lookup: F) -> Result<Vec<(String, ConnectionConfig)>>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let mut configs = Vec::new();

    if let Some(json) = var(CASSANDRA_CONNECTION) {
        configs.push((
            ENV_CASSANDRA_KEY.to_string(),
            ConnectionConfig::from_json(&json)?,
        ));
    }

    if let Some(token) = var(ASTRA_DB_APPLICATION_TOKEN) {
        let cloud = CloudConfig {
            token,
            endpoint: var(ASTRA_DB_API_ENDPOINT),
            datacenter_id: var(ASTRA_DB_DATABASE_ID),
            region_name: var(ASTRA_DB_REGION),
            secure_bundle_path: var(ASTRA_DB_SECURE_BUNDLE_PATH).map(PathBuf::from),
            bundle_url_template: None,
        };
        configs.push((ENV_ASTRA_KEY.to_string(), ConnectionConfig::Cloud(cloud)));
    }

    Ok(configs)
}
