//! Metrics emitted through the `metrics` facade
//!
//! The library only records; installing an exporter is up to the
//! application.

pub mod counters;
pub mod histograms;
pub mod labels;
