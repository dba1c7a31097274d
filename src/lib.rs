//! cassandra-connector: one access point for Apache Cassandra and Astra DB
//!
//! A [`ConnectionManager`] maps logical keys to long-lived connections and
//! creates each one on first use. Direct configurations are handed to a
//! [`Driver`]; cloud configurations first resolve a secure connect bundle,
//! downloading and caching it when needed.
//!
//! ```no_run
//! # async fn example() -> cassandra_connector::Result<()> {
//! use cassandra_connector::{ConnectionManager, DirectConfig, ScyllaDriver};
//!
//! let manager = ConnectionManager::from_env(ScyllaDriver)?;
//!
//! // Pre-registered from CASSANDRA_CONNECTION
//! let cassandra = manager.get_connection("env_cassandra", None).await?;
//!
//! // Supplied on first use, remembered afterwards
//! let analytics = DirectConfig::builder()
//!     .contact_point("10.0.0.7")
//!     .keyspace("analytics")
//!     .build();
//! let first = manager
//!     .get_connection("analytics", Some(analytics.into()))
//!     .await?;
//! let again = manager.get_connection("analytics", None).await?;
//! assert!(std::sync::Arc::ptr_eq(&first, &again));
//! # let _ = cassandra;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod bundle;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod metrics;

pub use auth::{AuthRegistry, AuthStrategy, Credentials};
pub use bundle::{BundleApi, BundleResolver};
pub use client::{ConnectionManager, ConnectionManagerBuilder};
pub use config::{CloudConfig, ConnectionConfig, DirectConfig, DriverOptions};
pub use connection::{Cluster, Connection, ConnectionMode, Connector, Driver, ScyllaDriver};
pub use error::{Error, Result};
