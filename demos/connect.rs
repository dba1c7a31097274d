//! Connect using the environment and print the server version
//!
//! Run with:
//!
//! ```text
//! CASSANDRA_CONNECTION='{"contact_points":["127.0.0.1"]}' \
//!     RUST_LOG=cassandra_connector=debug cargo run --example connect
//! ```
//!
//! `CONNECTION_KEY` selects another configured key. The bundled driver only
//! handles direct configurations; Astra keys need a cloud-capable driver.

use cassandra_connector::{ConnectionManager, ScyllaDriver};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let key = std::env::var("CONNECTION_KEY").unwrap_or_else(|_| "env_cassandra".to_string());

    let manager = ConnectionManager::from_env(ScyllaDriver)?;
    println!("configured keys: {:?}", manager.configured_keys().await);

    let conn = manager.get_connection(&key, None).await?;
    println!("connected to '{}' ({} mode)", key, conn.mode());

    let rows = conn
        .session()
        .query_unpaged("SELECT release_version FROM system.local", ())
        .await?
        .into_rows_result()?;
    for row in rows.rows::<(String,)>()? {
        let (version,) = row?;
        println!("release_version: {}", version);
    }

    Ok(())
}
