//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - Pool handle passed in explicitly; repositories borrow it per call
//! - Statistics are aggregated at read time, nothing derived is stored
//! - Rely on DB constraints for uniqueness, map violations to conflicts
//! - Transactions for multi-step writes

pub mod migrations;
pub mod repos;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use repos::*;

/// How long a request waits for a free connection before failing
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a pool holding at most `max_connections` connections.
///
/// Connects eagerly: an unreachable database is an error here.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;

    tracing::debug!(max_connections, "Database pool ready");
    Ok(pool)
}
