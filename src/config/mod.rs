//! Connection configuration
//!
//! This module handles:
//! * Direct vs. cloud configuration records
//! * JSON parsing of configurations
//! * Pre-registration from environment variables

mod connection;
pub mod env;

pub use connection::{
    CloudConfig, ConnectionConfig, DirectConfig, DirectConfigBuilder, DriverOptions,
};
pub use env::{configs_from_env, configs_from_lookup, ENV_ASTRA_KEY, ENV_CASSANDRA_KEY};
