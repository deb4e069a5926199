//! Database module: schema, pool bootstrap and repository backends.
//!
//! Layout:
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: sqlx-backed `DeviceRepository`
//! - `memory.rs`: map-backed `DeviceRepository` for tests

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::InMemoryDeviceRepository;
pub use schema::SQLITE_INIT;
pub use sqlite::{SqliteDeviceRepository, SqlitePool};

use crate::error::InventoryResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// SQLite lock-wait budget for a statement bound of `timeout`. Kept below the
/// bound so a blocked write fails with `SQLITE_BUSY` before the caller gives up.
pub fn busy_timeout_for(timeout: Duration) -> Duration {
    timeout * 4 / 5
}

/// Opens the shared pool. Pool checkouts are bounded by `timeout`, lock waits by
/// `busy_timeout_for(timeout)`.
pub async fn connect(database_url: &str, timeout: Duration) -> InventoryResult<SqlitePool> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(busy_timeout_for(timeout));
    let pool = SqlitePoolOptions::new()
        .acquire_timeout(timeout)
        .connect_with(connect_opts)
        .await?;
    info!(database_url, "database pool opened");
    Ok(pool)
}

/// Single-connection pool over `sqlite::memory:`. Each in-memory connection
/// is its own database, so the one connection is never recycled.
pub async fn connect_in_memory() -> InventoryResult<SqlitePool> {
    let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect_opts)
        .await?;
    Ok(pool)
}

/// Connects and prepares the schema, returning a ready repository.
pub async fn open_repository(
    database_url: &str,
    timeout: Duration,
) -> InventoryResult<SqliteDeviceRepository> {
    let pool = connect(database_url, timeout).await?;
    let repo = SqliteDeviceRepository::new(pool, timeout);
    repo.init_schema().await?;
    Ok(repo)
}
