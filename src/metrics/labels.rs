//! Metric names and label values

/// Connections realized, labelled by mode
pub const CONNECTIONS_INITIALIZED: &str = "cassandra_connector_connections_initialized_total";
/// Failed realizations, labelled by mode
pub const CONNECTION_FAILURES: &str = "cassandra_connector_connection_failures_total";
/// Bundle resolutions served from the cache
pub const BUNDLE_CACHE_HITS: &str = "cassandra_connector_bundle_cache_hits_total";
/// Bundle resolutions that required a download, labelled by reason
pub const BUNDLE_CACHE_MISSES: &str = "cassandra_connector_bundle_cache_misses_total";
/// Bundle downloads, labelled by outcome
pub const BUNDLE_DOWNLOADS: &str = "cassandra_connector_bundle_downloads_total";
/// Discovery plus download time in milliseconds
pub const BUNDLE_DOWNLOAD_DURATION_MS: &str = "cassandra_connector_bundle_download_duration_ms";

/// Label key for the connection mode
pub const MODE: &str = "mode";
/// Direct connection
pub const MODE_DIRECT: &str = "direct";
/// Cloud connection
pub const MODE_CLOUD: &str = "cloud";

/// Label key for the cache miss reason
pub const REASON: &str = "reason";
/// No cached bundle
pub const REASON_ABSENT: &str = "absent";
/// Cached bundle older than the freshness limit
pub const REASON_STALE: &str = "stale";

/// Label key for an outcome
pub const OUTCOME: &str = "outcome";
/// Success
pub const OUTCOME_SUCCESS: &str = "success";
/// Failure
pub const OUTCOME_FAILURE: &str = "failure";
