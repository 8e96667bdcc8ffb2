//! Connection bootstrap for the key-value store database.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout.
//! - Returned connections have `kv_store` at [`KV_SCHEMA_VERSION`].

use super::{DbError, DbResult, KV_SCHEMA_VERSION};
use log::{error, info};
use rusqlite::Connection;
use std::cmp::Ordering;
use std::path::Path;
use std::time::{Duration, Instant};

/// Location reported for in-memory databases.
pub const MEMORY_LOCATION: &str = ":memory:";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const KV_STORE_SQL: &str = include_str!("kv_store.sql");

/// Opens (or creates) the store database file and prepares its schema.
///
/// Emits `db_open` events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with("file", path.display().to_string(), || Connection::open(path))
}

/// Opens a private in-memory store database with the schema prepared.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with(
        "memory",
        MEMORY_LOCATION.to_string(),
        Connection::open_in_memory,
    )
}

fn open_with(
    mode: &'static str,
    location: String,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let opened = connect()
        .and_then(|conn| configure(&conn).map(|()| conn))
        .map_err(|source| DbError::Open {
            location: location.clone(),
            source,
        })
        .and_then(|mut conn| ensure_schema(&mut conn, &location).map(|()| conn));

    match &opened {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code={} error={err}",
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
    opened
}

fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)
}

fn ensure_schema(conn: &mut Connection, location: &str) -> DbResult<()> {
    let schema_err = |source: rusqlite::Error| DbError::Schema {
        location: location.to_string(),
        source,
    };

    let found: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(schema_err)?;
    match found.cmp(&KV_SCHEMA_VERSION) {
        Ordering::Equal => Ok(()),
        Ordering::Greater => Err(DbError::NewerSchema {
            location: location.to_string(),
            found,
            supported: KV_SCHEMA_VERSION,
        }),
        Ordering::Less => {
            let tx = conn.transaction().map_err(schema_err)?;
            tx.execute_batch(KV_STORE_SQL).map_err(schema_err)?;
            tx.pragma_update(None, "user_version", KV_SCHEMA_VERSION)
                .map_err(schema_err)?;
            tx.commit().map_err(schema_err)?;
            info!("event=db_schema module=db status=ok from_version={found} to_version={KV_SCHEMA_VERSION}");
            Ok(())
        }
    }
}
