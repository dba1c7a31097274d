//! Driver collaborator boundary
//!
//! The crate never talks the native protocol itself. A [`Driver`] turns
//! credentials and driver options into a [`Cluster`] handle, and sessions
//! are opened from that handle.

use crate::auth::Credentials;
use crate::config::DriverOptions;
use crate::Result;
use futures::future::BoxFuture;

/// Opens cluster handles
pub trait Driver: Send + Sync + 'static {
    /// Cluster handle produced by this driver
    type Cluster: Cluster;

    /// Whether the driver accepts a `cloud_bundle_path` option
    ///
    /// Cloud configurations are rejected before any bundle is resolved when
    /// this returns `false`.
    fn supports_cloud_bundle(&self) -> bool {
        true
    }

    /// Create a cluster handle from credentials and driver options
    fn open_cluster<'a>(
        &'a self,
        credentials: Option<Credentials>,
        options: &'a DriverOptions,
    ) -> BoxFuture<'a, Result<Self::Cluster>>;
}

/// A cluster handle from which sessions are opened
pub trait Cluster: Send + Sync + 'static {
    /// Session type
    type Session: Send + Sync + 'static;

    /// Open a new, independent session
    fn connect(&self) -> BoxFuture<'_, Result<Self::Session>>;
}

/// Session type of a driver
pub type SessionOf<D> = <<D as Driver>::Cluster as Cluster>::Session;
