//! Histogram helpers

use super::labels;

/// Record how long fetching a bundle took
pub fn bundle_download_duration(millis: u64) {
    metrics::histogram!(labels::BUNDLE_DOWNLOAD_DURATION_MS).record(millis as f64);
}
