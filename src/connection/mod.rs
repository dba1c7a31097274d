//! Connection realization
//!
//! This module handles:
//! * The driver boundary (cluster handles and sessions)
//! * Direct vs. cloud mode dispatch
//! * Authentication strategy resolution for direct connections
//! * The bundled ScyllaDB driver

mod connector;
mod driver;
mod scylla_driver;

pub use connector::{cloud_direct_config, Connection, ConnectionMode, Connector, TOKEN_USERNAME};
pub use driver::{Cluster, Driver, SessionOf};
pub use scylla_driver::{ScyllaCluster, ScyllaDriver, DEFAULT_CONTACT_POINT, DEFAULT_PORT};
