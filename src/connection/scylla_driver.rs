//! [`Driver`] implementation on top of the `scylla` crate

use super::driver::{Cluster, Driver};
use crate::auth::Credentials;
use crate::config::DriverOptions;
use crate::{Error, Result};
use futures::future::BoxFuture;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Default native protocol port
pub const DEFAULT_PORT: u16 = 9042;

/// Contact point used when none is configured
pub const DEFAULT_CONTACT_POINT: &str = "127.0.0.1";

/// Driver backed by the ScyllaDB Rust driver
///
/// Works against Apache Cassandra and ScyllaDB. Secure connect bundles are
/// not supported: a `cloud_bundle_path` option is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScyllaDriver;

impl Driver for ScyllaDriver {
    type Cluster = ScyllaCluster;

    fn supports_cloud_bundle(&self) -> bool {
        false
    }

    fn open_cluster<'a>(
        &'a self,
        credentials: Option<Credentials>,
        options: &'a DriverOptions,
    ) -> BoxFuture<'a, Result<ScyllaCluster>> {
        Box::pin(async move { ScyllaCluster::new(credentials, options) })
    }
}

/// Cluster handle holding the session configuration
pub struct ScyllaCluster {
    builder: SessionBuilder,
    known_nodes: Vec<String>,
}

impl ScyllaCluster {
    fn new(credentials: Option<Credentials>, options: &DriverOptions) -> Result<Self> {
        if let Some(path) = &options.cloud_bundle_path {
            return Err(Error::Driver(format!(
                "secure connect bundle {} requires a cloud-capable driver",
                path.display()
            )));
        }
        for key in options.extra.keys() {
            tracing::warn!(option = %key, "ignoring unsupported driver option");
        }

        let known_nodes = known_nodes(options);
        let mut builder = SessionBuilder::new().known_nodes(&known_nodes);

        if let Some(Credentials::PlainText { username, password }) = credentials {
            builder = builder.user(username, password);
        }
        if let Some(keyspace) = &options.keyspace {
            builder = builder.use_keyspace(keyspace, false);
        }
        if let Some(secs) = options.connect_timeout_secs {
            builder = builder.connection_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            builder,
            known_nodes,
        })
    }

    /// Contact points as `host:port`
    pub fn known_nodes(&self) -> &[String] {
        &self.known_nodes
    }
}

impl Cluster for ScyllaCluster {
    type Session = Session;

    fn connect(&self) -> BoxFuture<'_, Result<Session>> {
        Box::pin(async move {
            tracing::debug!(nodes = ?self.known_nodes, "opening scylla session");
            self.builder
                .build()
                .await
                .map_err(|e| Error::Driver(format!("failed to connect: {}", e)))
        })
    }
}

impl std::fmt::Debug for ScyllaCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScyllaCluster")
            .field("known_nodes", &self.known_nodes)
            .finish()
    }
}

/// Append the configured port to contact points that lack one
fn known_nodes(options: &DriverOptions) -> Vec<String> {
    let port = options.port.unwrap_or(DEFAULT_PORT);
    let with_port = |point: &str| {
        if point.parse::<SocketAddr>().is_ok() {
            point.to_string()
        } else if let Ok(ip) = point.parse::<IpAddr>() {
            SocketAddr::new(ip, port).to_string()
        } else if point.contains(':') {
            point.to_string()
        } else {
            format!("{}:{}", point, port)
        }
    };

    if options.contact_points.is_empty() {
        vec![with_port(DEFAULT_CONTACT_POINT)]
    } else {
        options.contact_points.iter().map(|p| with_port(p)).collect()
    }
}
