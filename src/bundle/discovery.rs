//! Secure bundle URL discovery and download
//!
//! The DevOps API returns one signed download URL per region of a database.
//! [`BundleApi`] abstracts the two HTTP exchanges so the resolver can be
//! exercised without network access.

use crate::{Error, Result};
use bytes::Bytes;
use futures::future::BoxFuture;
use serde::Deserialize;
use std::time::Duration;

/// Default discovery URL template
pub const DEFAULT_BUNDLE_URL_TEMPLATE: &str =
    "https://api.astra.datastax.com/v2/databases/{database_id}/secureBundleURL?all=true";

/// Default timeout for discovery and download requests
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One entry of the discovery response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BundleLocation {
    /// Region the bundle connects to
    pub region: String,
    /// Signed download URL
    #[serde(rename = "downloadURL")]
    pub download_url: String,
}

/// HTTP exchanges needed to fetch a secure bundle
pub trait BundleApi: Send + Sync {
    /// `POST` the discovery URL with a bearer token and decode the bundle list
    ///
    /// Failures are reported as [`Error::BundleDiscoveryFailed`].
    fn bundle_locations<'a>(
        &'a self,
        url: &'a str,
        token: &'a str,
        datacenter_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<BundleLocation>>>;

    /// `GET` a bundle archive
    ///
    /// Failures are reported as [`Error::BundleDownloadFailed`].
    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes>>;
}

/// Expand a discovery URL template
pub fn discovery_url(template: &str, datacenter_id: &str) -> String {
    template.replace("{database_id}", datacenter_id)
}

/// Pick the bundle to download
///
/// With no region the first entry is used. A requested region that is not
/// in the list is an error even if other regions are available.
pub fn select_bundle<'a>(
    locations: &'a [BundleLocation],
    region: Option<&str>,
    datacenter_id: &str,
) -> Result<&'a BundleLocation> {
    let first = locations
        .first()
        .ok_or_else(|| Error::BundleDiscoveryFailed {
            datacenter_id: datacenter_id.to_string(),
            reason: "empty secure bundle list".into(),
        })?;

    match region {
        None => Ok(first),
        Some(region) => locations
            .iter()
            .find(|loc| loc.region == region)
            .ok_or_else(|| Error::RegionBundleNotFound {
                region: region.to_string(),
            }),
    }
}

/// [`BundleApi`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpBundleApi {
    client: reqwest::Client,
}

impl HttpBundleApi {
    /// Create a client whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(client_error)?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn client_error(e: reqwest::Error) -> Error {
    Error::Driver(format!("failed to build http client: {}", e))
}

impl BundleApi for HttpBundleApi {
    fn bundle_locations<'a>(
        &'a self,
        url: &'a str,
        token: &'a str,
        datacenter_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<BundleLocation>>> {
        Box::pin(async move {
            let failed = |reason: String| Error::BundleDiscoveryFailed {
                datacenter_id: datacenter_id.to_string(),
                reason,
            };

            let response = self
                .client
                .post(url)
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .send()
                .await
                .map_err(|e| failed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(failed(format!("HTTP {}: {}", status, body)));
            }

            response
                .json::<Vec<BundleLocation>>()
                .await
                .map_err(|e| failed(format!("invalid response body: {}", e)))
        })
    }

    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| Error::BundleDownloadFailed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::BundleDownloadFailed(format!("HTTP {}", status)));
            }

            response
                .bytes()
                .await
                .map_err(|e| Error::BundleDownloadFailed(e.to_string()))
        })
    }
}
