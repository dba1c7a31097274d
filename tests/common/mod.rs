//! Fakes shared by the integration tests

#![allow(dead_code)]

use bytes::Bytes;
use cassandra_connector::auth::Credentials;
use cassandra_connector::bundle::{BundleApi, BundleLocation};
use cassandra_connector::config::DriverOptions;
use cassandra_connector::{Cluster, Driver, Error, Result};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Bundle API answering from a fixed list and recording every request
#[derive(Default)]
pub struct RecordingBundleApi {
    pub locations: Vec<BundleLocation>,
    pub body: Vec<u8>,
    pub fail_download: bool,
    pub discoveries: Mutex<Vec<(String, String)>>,
    pub downloads: Mutex<Vec<String>>,
}

impl RecordingBundleApi {
    pub fn new(locations: &[(&str, &str)], body: &[u8]) -> Self {
        Self {
            locations: locations
                .iter()
                .map(|(region, url)| BundleLocation {
                    region: region.to_string(),
                    download_url: url.to_string(),
                })
                .collect(),
            body: body.to_vec(),
            ..Self::default()
        }
    }

    pub fn discovery_count(&self) -> usize {
        self.discoveries.lock().unwrap().len()
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }

    pub fn network_calls(&self) -> usize {
        self.discovery_count() + self.download_count()
    }
}

impl BundleApi for RecordingBundleApi {
    fn bundle_locations<'a>(
        &'a self,
        url: &'a str,
        token: &'a str,
        _datacenter_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<BundleLocation>>> {
        self.discoveries
            .lock()
            .unwrap()
            .push((url.to_string(), token.to_string()));
        let locations = self.locations.clone();
        Box::pin(async move { Ok(locations) })
    }

    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes>> {
        self.downloads.lock().unwrap().push(url.to_string());
        let result = if self.fail_download {
            Err(Error::BundleDownloadFailed("HTTP 403 Forbidden".into()))
        } else {
            Ok(Bytes::from(self.body.clone()))
        };
        Box::pin(async move { result })
    }
}

/// Driver counting how many clusters it opened
#[derive(Default)]
pub struct SlowCountingDriver {
    pub opened: AtomicUsize,
    pub delay: Duration,
    pub last_options: Mutex<Option<(Option<Credentials>, DriverOptions)>>,
}

impl SlowCountingDriver {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

pub struct CountingCluster {
    pub id: usize,
    sessions: AtomicUsize,
}

impl Cluster for CountingCluster {
    type Session = (usize, usize);

    fn connect(&self) -> BoxFuture<'_, Result<(usize, usize)>> {
        Box::pin(async move { Ok((self.id, self.sessions.fetch_add(1, Ordering::SeqCst))) })
    }
}

impl Driver for SlowCountingDriver {
    type Cluster = CountingCluster;

    fn open_cluster<'a>(
        &'a self,
        credentials: Option<Credentials>,
        options: &'a DriverOptions,
    ) -> BoxFuture<'a, Result<CountingCluster>> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            if options.contact_points.iter().any(|p| p == "unreachable") {
                return Err(Error::Driver("connection refused".into()));
            }
            *self.last_options.lock().unwrap() = Some((credentials, options.clone()));
            Ok(CountingCluster {
                id: self.opened.fetch_add(1, Ordering::SeqCst),
                sessions: AtomicUsize::new(0),
            })
        })
    }
}
