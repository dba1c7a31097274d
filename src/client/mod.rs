//! Connection manager entry point

mod manager;

pub use manager::{ConnectionManager, ConnectionManagerBuilder};
