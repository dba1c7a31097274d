//! ConnectionManager implementation

use crate::auth::AuthRegistry;
use crate::bundle::{
    default_cache_dir, BundleApi, BundleResolver, HttpBundleApi, DEFAULT_REQUEST_TIMEOUT,
};
use crate::config::{configs_from_env, configs_from_lookup, ConnectionConfig, ENV_ASTRA_KEY};
use crate::connection::{Connection, ConnectionMode, Connector, Driver};
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::Instrument;

type Slot<D> = Arc<OnceCell<Arc<Connection<D>>>>;

/// Maps logical connection keys to long-lived connections
///
/// Each key is realized at most once: concurrent first requests for the same
/// key wait for a single initialization, and later requests return the same
/// [`Connection`]. A failed initialization is not cached; the next request
/// tries again from scratch.
pub struct ConnectionManager<D: Driver> {
    connector: Connector<D>,
    configs: RwLock<HashMap<String, ConnectionConfig>>,
    connections: Mutex<HashMap<String, Slot<D>>>,
}

impl<D: Driver> ConnectionManager<D> {
    /// Create a manager around a connector with no stored configurations
    pub fn new(connector: Connector<D>) -> Self {
        Self {
            connector,
            configs: RwLock::new(HashMap::new()),
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Start building a manager for `driver`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> cassandra_connector::Result<()> {
    /// use cassandra_connector::{ConnectionManager, ScyllaDriver};
    ///
    /// let manager = ConnectionManager::builder(ScyllaDriver)
    ///     .env()?
    ///     .build()?;
    ///
    /// let conn = manager.get_connection("env_cassandra", None).await?;
    /// let _rows = conn
    ///     .session()
    ///     .query_unpaged("SELECT release_version FROM system.local", ())
    ///     .await;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder(driver: D) -> ConnectionManagerBuilder<D> {
        ConnectionManagerBuilder::new(driver)
    }

    /// Manager with default settings and the configurations found in the
    /// process environment
    pub fn from_env(driver: D) -> Result<Self> {
        Self::builder(driver).env()?.build()
    }

    /// The connector used to realize connections
    pub fn connector(&self) -> &Connector<D> {
        &self.connector
    }

    /// Store a configuration under `key` without connecting
    ///
    /// Returns `false` and leaves the stored configuration untouched if one
    /// already exists.
    pub async fn register(&self, key: impl Into<String>, config: ConnectionConfig) -> bool {
        let mut configs = self.configs.write().await;
        match configs.entry(key.into()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(config);
                true
            }
        }
    }

    /// Return the connection for `key`, realizing it on first use
    ///
    /// `config` is only consulted when no configuration is stored for `key`
    /// yet; it is then stored for later calls.
    pub async fn get_connection(
        &self,
        key: &str,
        config: Option<ConnectionConfig>,
    ) -> Result<Arc<Connection<D>>> {
        if let Some(conn) = self.realized(key).await {
            return Ok(conn);
        }

        let config = self.stored_or_supplied(key, config).await?;
        let slot = {
            let mut connections = self.connections.lock().await;
            connections.entry(key.to_string()).or_default().clone()
        };

        let conn = slot
            .get_or_try_init(|| self.initialize(key, &config))
            .await?;
        Ok(conn.clone())
    }

    /// Connection for the `env_astra` key
    pub async fn default_connection(&self) -> Result<Arc<Connection<D>>> {
        self.get_connection(ENV_ASTRA_KEY, None).await
    }

    /// Whether `key` has a realized connection
    pub async fn is_realized(&self, key: &str) -> bool {
        self.realized(key).await.is_some()
    }

    /// Keys with a stored configuration, sorted
    pub async fn configured_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.configs.read().await.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    async fn realized(&self, key: &str) -> Option<Arc<Connection<D>>> {
        let connections = self.connections.lock().await;
        connections.get(key).and_then(|slot| slot.get().cloned())
    }

    async fn stored_or_supplied(
        &self,
        key: &str,
        config: Option<ConnectionConfig>,
    ) -> Result<ConnectionConfig> {
        if let Some(stored) = self.configs.read().await.get(key) {
            return Ok(stored.clone());
        }

        let mut configs = self.configs.write().await;
        if let Some(stored) = configs.get(key) {
            return Ok(stored.clone());
        }
        match config {
            Some(config) => {
                configs.insert(key.to_string(), config.clone());
                Ok(config)
            }
            None => Err(Error::ConfigurationMissing {
                key: key.to_string(),
            }),
        }
    }

    async fn initialize(&self, key: &str, config: &ConnectionConfig) -> Result<Arc<Connection<D>>> {
        let mode = ConnectionMode::of(config);

        async {
            match self.connector.connect(config).await {
                Ok(conn) => {
                    tracing::info!("connection for '{}' initialized successfully", key);
                    crate::metrics::counters::connection_initialized(mode.metric_label());
                    Ok(Arc::new(conn))
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to set up connection for '{}'", key);
                    crate::metrics::counters::connection_failed(mode.metric_label());
                    Err(Error::ConnectionInitializationFailed {
                        key: key.to_string(),
                        source: Box::new(e),
                    })
                }
            }
        }
        .instrument(tracing::info_span!("connection", key = %key, mode = %mode))
        .await
    }
}

impl<D: Driver> std::fmt::Debug for ConnectionManager<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connector", &self.connector)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ConnectionManager`]
///
/// # Defaults
///
/// - cache directory: `<tmp>/cassandra-astra`
/// - request timeout: 30 seconds
/// - auth registry: [`AuthRegistry::default`]
/// - bundle API: HTTP via `reqwest`
pub struct ConnectionManagerBuilder<D: Driver> {
    driver: D,
    auth: AuthRegistry,
    cache_dir: PathBuf,
    request_timeout: Duration,
    bundle_api: Option<Arc<dyn BundleApi>>,
    configs: HashMap<String, ConnectionConfig>,
}

impl<D: Driver> ConnectionManagerBuilder<D> {
    fn new(driver: D) -> Self {
        Self {
            driver,
            auth: AuthRegistry::default(),
            cache_dir: default_cache_dir(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            bundle_api: None,
            configs: HashMap::new(),
        }
    }

    /// Use a custom authentication strategy registry
    pub fn auth_registry(mut self, auth: AuthRegistry) -> Self {
        self.auth = auth;
        self
    }

    /// Directory where downloaded bundles are cached
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Timeout applied to bundle discovery and download requests
    ///
    /// Ignored when a custom [`BundleApi`] is supplied.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Use a custom bundle API client
    pub fn bundle_api(mut self, api: Arc<dyn BundleApi>) -> Self {
        self.bundle_api = Some(api);
        self
    }

    /// Pre-register a configuration; the first registration of a key wins
    pub fn register(mut self, key: impl Into<String>, config: ConnectionConfig) -> Self {
        self.configs.entry(key.into()).or_insert(config);
        self
    }

    /// Pre-register the configurations found in the process environment
    pub fn env(self) -> Result<Self> {
        let configs = configs_from_env()?;
        Ok(self.register_all(configs))
    }

    /// Pre-register environment configurations read through `lookup`
    pub fn env_lookup<F>(self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let configs = configs_from_lookup(lookup)?;
        Ok(self.register_all(configs))
    }

    fn register_all(self, configs: Vec<(String, ConnectionConfig)>) -> Self {
        configs
            .into_iter()
            .fold(self, |builder, (key, config)| builder.register(key, config))
    }

    /// Build the manager
    pub fn build(self) -> Result<ConnectionManager<D>> {
        let api = match self.bundle_api {
            Some(api) => api,
            None => Arc::new(HttpBundleApi::new(self.request_timeout)?),
        };
        let bundles = BundleResolver::new(self.cache_dir, api);
        let connector = Connector::new(self.driver, self.auth, bundles);

        Ok(ConnectionManager {
            connector,
            configs: RwLock::new(self.configs),
            connections: Mutex::new(HashMap::new()),
        })
    }
}
