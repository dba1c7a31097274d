//! Counter helpers

use super::labels;

/// Record a realized connection
pub fn connection_initialized(mode: &'static str) {
    metrics::counter!(labels::CONNECTIONS_INITIALIZED, labels::MODE => mode).increment(1);
}

/// Record a failed realization
pub fn connection_failed(mode: &'static str) {
    metrics::counter!(labels::CONNECTION_FAILURES, labels::MODE => mode).increment(1);
}

/// Record a bundle cache hit
pub fn bundle_cache_hit() {
    metrics::counter!(labels::BUNDLE_CACHE_HITS).increment(1);
}

/// Record a bundle cache miss
pub fn bundle_cache_miss(reason: &'static str) {
    metrics::counter!(labels::BUNDLE_CACHE_MISSES, labels::REASON => reason).increment(1);
}

/// Record a bundle download attempt
pub fn bundle_download(outcome: &'static str) {
    metrics::counter!(labels::BUNDLE_DOWNLOADS, labels::OUTCOME => outcome).increment(1);
}
