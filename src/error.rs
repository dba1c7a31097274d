//! Error types

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving or initializing a connection
#[derive(Debug, Error)]
pub enum Error {
    /// No stored or supplied configuration exists for a connection key
    #[error("connection parameters for '{key}' not configured")]
    ConfigurationMissing {
        /// The logical connection key
        key: String,
    },

    /// A configuration could not be parsed
    #[error("malformed connection configuration: {0}")]
    ConfigurationMalformed(String),

    /// A cloud configuration has neither an endpoint nor a database id
    #[error("astra endpoint or datacenter id must be provided")]
    MissingDatacenterIdentifier,

    /// The secure bundle URL discovery exchange failed
    #[error("failed to get secure bundle URLs for '{datacenter_id}': {reason}")]
    BundleDiscoveryFailed {
        /// Datacenter (database) identifier
        datacenter_id: String,
        /// Underlying cause
        reason: String,
    },

    /// Discovery succeeded but returned no bundle for the requested region
    #[error("secure bundle for region '{region}' not found")]
    RegionBundleNotFound {
        /// The requested region
        region: String,
    },

    /// The secure bundle download failed
    #[error("secure bundle download failed: {0}")]
    BundleDownloadFailed(String),

    /// An authentication strategy could not be resolved or instantiated
    #[error("auth strategy '{strategy}' could not be resolved: {reason}")]
    AuthStrategyResolutionFailed {
        /// Strategy identifier from the configuration
        strategy: String,
        /// Underlying cause
        reason: String,
    },

    /// Realizing a connection failed
    #[error("connection for '{key}' could not be initialized: {source}")]
    ConnectionInitializationFailed {
        /// The logical connection key
        key: String,
        /// The failure raised by the connector
        #[source]
        source: Box<Error>,
    },

    /// The driver collaborator failed, or cannot serve the configuration, or
    /// the HTTP client could not be built
    #[error("driver error: {0}")]
    Driver(String),

    /// Filesystem error in the bundle cache
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error stems from the caller's configuration rather than
    /// from the network, the filesystem or the cluster
    pub fn is_configuration(&self) -> bool {
        match self {
            Error::ConfigurationMissing { .. }
            | Error::ConfigurationMalformed(_)
            | Error::MissingDatacenterIdentifier
            | Error::AuthStrategyResolutionFailed { .. } => true,
            Error::ConnectionInitializationFailed { source, .. } => source.is_configuration(),
            _ => false,
        }
    }
}
