//! Secure connect bundle resolution and on-disk caching

use super::discovery::{
    discovery_url, select_bundle, BundleApi, HttpBundleApi, DEFAULT_BUNDLE_URL_TEMPLATE,
    DEFAULT_REQUEST_TIMEOUT,
};
use super::endpoint::BundleTarget;
use crate::config::CloudConfig;
use crate::{Error, Result};
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tracing::Instrument;

/// Bundles older than this are downloaded again
pub const BUNDLE_MAX_AGE: Duration = Duration::from_secs(360 * 24 * 60 * 60);

/// Name of the cache directory under the system temporary directory
pub const CACHE_DIR_NAME: &str = "cassandra-astra";

/// Default cache directory: `<tmp>/cassandra-astra`
pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join(CACHE_DIR_NAME)
}

/// Resolves cloud configurations to a local secure connect bundle
///
/// The resolver keeps no state besides the files in its cache directory.
/// Downloads are written to a temporary file and renamed into place, so a
/// concurrent reader sees either a complete bundle or none.
#[derive(Clone)]
pub struct BundleResolver {
    cache_dir: PathBuf,
    api: Arc<dyn BundleApi>,
}

impl BundleResolver {
    /// Create a resolver with an explicit cache directory and API client
    pub fn new(cache_dir: impl Into<PathBuf>, api: Arc<dyn BundleApi>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            api,
        }
    }

    /// Resolver using the default cache directory and an HTTP client with
    /// the default request timeout
    pub fn with_defaults() -> Result<Self> {
        let api = HttpBundleApi::new(DEFAULT_REQUEST_TIMEOUT)?;
        Ok(Self::new(default_cache_dir(), Arc::new(api)))
    }

    /// Cache directory in use
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache path for a bundle target
    pub fn cache_path(&self, target: &BundleTarget) -> PathBuf {
        self.cache_dir.join(target.file_name())
    }

    /// Produce a local bundle path for `config`, downloading if necessary
    pub async fn resolve(&self, config: &CloudConfig) -> Result<PathBuf> {
        if let Some(path) = &config.secure_bundle_path {
            tracing::debug!(path = %path.display(), "using configured secure bundle");
            return Ok(path.clone());
        }

        let target = BundleTarget::from_config(config)?;
        let span = tracing::info_span!(
            "secure_bundle",
            datacenter_id = %target.datacenter_id,
            region = target.region.as_deref().unwrap_or("")
        );

        self.resolve_target(config, &target).instrument(span).await
    }

    async fn resolve_target(&self, config: &CloudConfig, target: &BundleTarget) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        let path = self.cache_path(target);

        match bundle_age(&path).await? {
            Some(age) if age <= BUNDLE_MAX_AGE => {
                tracing::debug!(path = %path.display(), "secure bundle cache hit");
                crate::metrics::counters::bundle_cache_hit();
                return Ok(path);
            }
            Some(_) => {
                tracing::debug!(path = %path.display(), "cached secure bundle is stale");
                crate::metrics::counters::bundle_cache_miss(
                    crate::metrics::labels::REASON_STALE,
                );
            }
            None => {
                crate::metrics::counters::bundle_cache_miss(
                    crate::metrics::labels::REASON_ABSENT,
                );
            }
        }

        match self.fetch(config, target, &path).await {
            Ok(()) => {
                crate::metrics::counters::bundle_download(
                    crate::metrics::labels::OUTCOME_SUCCESS,
                );
                tracing::info!(path = %path.display(), "secure bundle downloaded");
                Ok(path)
            }
            Err(e) => {
                crate::metrics::counters::bundle_download(
                    crate::metrics::labels::OUTCOME_FAILURE,
                );
                tracing::error!(error = %e, "failed to fetch secure bundle");
                Err(e)
            }
        }
    }

    async fn fetch(&self, config: &CloudConfig, target: &BundleTarget, path: &Path) -> Result<()> {
        let started = Instant::now();
        let template = config
            .bundle_url_template
            .as_deref()
            .unwrap_or(DEFAULT_BUNDLE_URL_TEMPLATE);
        let url = discovery_url(template, &target.datacenter_id);

        tracing::debug!(url = %url, "requesting secure bundle URLs");
        let locations = self
            .api
            .bundle_locations(&url, &config.token, &target.datacenter_id)
            .await?;
        let location = select_bundle(&locations, target.region.as_deref(), &target.datacenter_id)?;

        tracing::debug!(region = %location.region, "downloading secure bundle");
        let body = self.api.download(&location.download_url).await?;
        write_atomically(path, &body).await?;

        crate::metrics::histograms::bundle_download_duration(
            started.elapsed().as_millis() as u64,
        );
        Ok(())
    }
}

impl std::fmt::Debug for BundleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleResolver")
            .field("cache_dir", &self.cache_dir)
            .field("api", &"<BundleApi>")
            .finish()
    }
}

/// Age of the file at `path`, or `None` if it does not exist
///
/// A modification time in the future counts as age zero.
async fn bundle_age(path: &Path) -> Result<Option<Duration>> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let modified = metadata.modified()?;
    Ok(Some(
        SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO),
    ))
}

/// Write `contents` to a sibling temporary file, then rename it over `path`
async fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::BundleDownloadFailed(format!("invalid cache path {}", path.display())))?;
    let suffix: u64 = rand::thread_rng().gen();
    let tmp = path.with_file_name(format!(".{}.{:016x}.tmp", file_name, suffix));

    if let Err(e) = tokio::fs::write(&tmp, contents).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(Error::BundleDownloadFailed(format!(
            "writing {}: {}",
            tmp.display(),
            e
        )));
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(Error::BundleDownloadFailed(format!(
            "renaming into {}: {}",
            path.display(),
            e
        )));
    }
    Ok(())
}
