//! Secure bundle resolution against a recording bundle API
//!
//! Run with: cargo test --test bundle_cache

mod common;

use cassandra_connector::bundle::{BundleResolver, BUNDLE_MAX_AGE};
use cassandra_connector::{CloudConfig, Error};
use common::RecordingBundleApi;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const DB_ID: &str = "3c4b6b4f-2b23-4d1a-9c5e-0f1e2d3c4b5a";

fn endpoint(region: &str) -> String {
    format!("https://{}-{}.apps.astra.datastax.com", DB_ID, region)
}

fn resolver(cache: &TempDir, api: &Arc<RecordingBundleApi>) -> BundleResolver {
    BundleResolver::new(cache.path(), api.clone())
}

fn two_regions() -> Arc<RecordingBundleApi> {
    Arc::new(RecordingBundleApi::new(
        &[
            ("us-east1", "https://bundles/us-east1.zip"),
            ("eu-west1", "https://bundles/eu-west1.zip"),
        ],
        b"PK\x03\x04bundle",
    ))
}

fn set_age(path: &Path, age: Duration) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

#[tokio::test]
async fn test_explicit_bundle_path_skips_network() {
    let cache = TempDir::new().unwrap();
    let api = two_regions();
    let config = CloudConfig::with_endpoint("T", endpoint("us-east1"))
        .secure_bundle_path("/does/not/exist.zip");

    let path = resolver(&cache, &api).resolve(&config).await.unwrap();

    assert_eq!(path, Path::new("/does/not/exist.zip"));
    assert_eq!(api.network_calls(), 0);
}

#[tokio::test]
async fn test_endpoint_download_scenario() {
    let cache = TempDir::new().unwrap();
    let api = two_regions();
    let config = CloudConfig::with_endpoint("AstraCS:T", endpoint("eu-west1"));

    let path = resolver(&cache, &api).resolve(&config).await.unwrap();

    let expected = cache
        .path()
        .join(format!("astra-secure-connect-{}-eu-west1.zip", DB_ID));
    assert_eq!(path, expected);
    assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04bundle");

    let discoveries = api.discoveries.lock().unwrap().clone();
    assert_eq!(
        discoveries,
        vec![(
            format!(
                "https://api.astra.datastax.com/v2/databases/{}/secureBundleURL?all=true",
                DB_ID
            ),
            "AstraCS:T".to_string()
        )]
    );
    assert_eq!(
        *api.downloads.lock().unwrap(),
        vec!["https://bundles/eu-west1.zip".to_string()]
    );
}

#[tokio::test]
async fn test_short_endpoint_hostname_scenario() {
    let cache = TempDir::new().unwrap();
    let api = Arc::new(RecordingBundleApi::new(
        &[
            ("other", "https://bundles/other.zip"),
            ("region1", "https://bundles/region1.zip"),
        ],
        b"PK\x03\x04scenario",
    ));
    let config =
        CloudConfig::with_endpoint("T", "https://abcde-01234-region1.apps.astra.datastax.com");

    let path = resolver(&cache, &api).resolve(&config).await.unwrap();

    // Fewer than five segments: the whole hostname is the database id and no
    // region is requested, so the first entry is downloaded
    let discoveries = api.discoveries.lock().unwrap().clone();
    assert_eq!(discoveries.len(), 1);
    assert!(discoveries[0]
        .0
        .contains("/databases/abcde-01234-region1/secureBundleURL"));
    assert_eq!(
        *api.downloads.lock().unwrap(),
        vec!["https://bundles/other.zip".to_string()]
    );
    assert_eq!(
        path,
        cache
            .path()
            .join("astra-secure-connect-abcde-01234-region1.zip")
    );
    assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04scenario");
}

#[tokio::test]
async fn test_traversal_in_database_id_is_rejected() {
    let cache = TempDir::new().unwrap();
    let api = two_regions();
    let config = CloudConfig::with_database_id("T", "../../escape");

    let err = resolver(&cache, &api).resolve(&config).await.unwrap_err();

    assert!(matches!(err, Error::ConfigurationMalformed(_)));
    assert_eq!(api.network_calls(), 0);
    assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_fresh_cache_hit_skips_network() {
    let cache = TempDir::new().unwrap();
    let api = two_regions();
    let config = CloudConfig::with_endpoint("T", endpoint("us-east1"));
    let resolver = resolver(&cache, &api);

    let first = resolver.resolve(&config).await.unwrap();
    set_age(&first, BUNDLE_MAX_AGE - Duration::from_secs(24 * 60 * 60));
    let second = resolver.resolve(&config).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(api.discovery_count(), 1);
    assert_eq!(api.download_count(), 1);
}

#[tokio::test]
async fn test_stale_cache_is_downloaded_again() {
    let cache = TempDir::new().unwrap();
    let api = two_regions();
    let config = CloudConfig::with_database_id("T", DB_ID).region("us-east1");
    let resolver = resolver(&cache, &api);

    let path = resolver.cache_path(&cassandra_connector::bundle::BundleTarget {
        datacenter_id: DB_ID.to_string(),
        region: Some("us-east1".to_string()),
    });
    std::fs::write(&path, b"old bundle").unwrap();
    set_age(&path, BUNDLE_MAX_AGE + Duration::from_secs(24 * 60 * 60));

    let resolved = resolver.resolve(&config).await.unwrap();

    assert_eq!(resolved, path);
    assert_eq!(api.download_count(), 1);
    assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04bundle");
}

#[tokio::test]
async fn test_no_region_selects_first_entry() {
    let cache = TempDir::new().unwrap();
    let api = two_regions();
    let config = CloudConfig::with_database_id("T", DB_ID);

    let path = resolver(&cache, &api).resolve(&config).await.unwrap();

    assert_eq!(
        path.file_name().unwrap(),
        format!("astra-secure-connect-{}.zip", DB_ID).as_str()
    );
    assert_eq!(
        *api.downloads.lock().unwrap(),
        vec!["https://bundles/us-east1.zip".to_string()]
    );
}

#[tokio::test]
async fn test_unknown_region_fails() {
    let cache = TempDir::new().unwrap();
    let api = two_regions();
    let config = CloudConfig::with_endpoint("T", endpoint("ap-south1"));

    let err = resolver(&cache, &api).resolve(&config).await.unwrap_err();

    assert!(matches!(err, Error::RegionBundleNotFound { ref region } if region == "ap-south1"));
    assert_eq!(api.download_count(), 0);
    assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_empty_discovery_response_fails() {
    let cache = TempDir::new().unwrap();
    let api = Arc::new(RecordingBundleApi::new(&[], b""));
    let config = CloudConfig::with_database_id("T", DB_ID);

    let err = resolver(&cache, &api).resolve(&config).await.unwrap_err();

    assert!(matches!(err, Error::BundleDiscoveryFailed { .. }));
}

#[tokio::test]
async fn test_download_failure_leaves_no_file() {
    let cache = TempDir::new().unwrap();
    let mut api = RecordingBundleApi::new(&[("us-east1", "https://bundles/us-east1.zip")], b"");
    api.fail_download = true;
    let api = Arc::new(api);
    let config = CloudConfig::with_database_id("T", DB_ID);

    let err = resolver(&cache, &api).resolve(&config).await.unwrap_err();

    assert!(matches!(err, Error::BundleDownloadFailed(_)));
    assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_datacenter_identifier() {
    let cache = TempDir::new().unwrap();
    let api = two_regions();
    let config = CloudConfig {
        token: "T".into(),
        region_name: Some("us-east1".into()),
        ..CloudConfig::default()
    };

    let err = resolver(&cache, &api).resolve(&config).await.unwrap_err();

    assert!(matches!(err, Error::MissingDatacenterIdentifier));
    assert_eq!(api.network_calls(), 0);
}

#[tokio::test]
async fn test_custom_url_template() {
    let cache = TempDir::new().unwrap();
    let api = two_regions();
    let config = CloudConfig::with_database_id("T", "db-1")
        .bundle_url_template("https://devops.internal/v2/databases/{database_id}/secureBundleURL");

    resolver(&cache, &api).resolve(&config).await.unwrap();

    let discoveries = api.discoveries.lock().unwrap();
    assert_eq!(
        discoveries[0].0,
        "https://devops.internal/v2/databases/db-1/secureBundleURL"
    );
}

#[tokio::test]
async fn test_cache_directory_is_created() {
    let cache = TempDir::new().unwrap();
    let nested = cache.path().join("nested").join("bundles");
    let api = two_regions();
    let config = CloudConfig::with_database_id("T", DB_ID);

    let path = BundleResolver::new(&nested, api.clone())
        .resolve(&config)
        .await
        .unwrap();

    assert!(path.starts_with(&nested));
    assert!(path.exists());
}

#[tokio::test]
async fn test_concurrent_resolutions_see_complete_files() {
    let cache = TempDir::new().unwrap();
    let body = vec![0xAB; 256 * 1024];
    let api = Arc::new(RecordingBundleApi::new(
        &[("us-east1", "https://bundles/us-east1.zip")],
        &body,
    ));
    let config = CloudConfig::with_database_id("T", DB_ID);
    let resolver = resolver(&cache, &api);

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let resolver = resolver.clone();
            let config = config.clone();
            tokio::spawn(async move { resolver.resolve(&config).await })
        })
        .collect();

    for task in tasks {
        let path = task.await.unwrap().unwrap();
        assert_eq!(std::fs::read(&path).unwrap().len(), body.len());
    }

    // Only the final bundle remains; no temporary files are left behind
    assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 1);
}
