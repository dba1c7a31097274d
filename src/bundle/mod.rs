//! Secure connect bundle management
//!
//! This module handles:
//! * Locating the database id and region of a cloud configuration
//! * Discovering the signed bundle download URL
//! * Downloading and caching bundles with a freshness limit

mod discovery;
mod endpoint;
mod resolver;

pub use discovery::{
    discovery_url, select_bundle, BundleApi, BundleLocation, HttpBundleApi,
    DEFAULT_BUNDLE_URL_TEMPLATE, DEFAULT_REQUEST_TIMEOUT,
};
pub use endpoint::{parse_endpoint, BundleTarget, ASTRA_DOMAIN_SUFFIX};
pub use resolver::{default_cache_dir, BundleResolver, BUNDLE_MAX_AGE, CACHE_DIR_NAME};
