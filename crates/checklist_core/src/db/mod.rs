//! SQLite file backing the key-value store.
//!
//! # Responsibility
//! - Open and configure connections for the checklist core.
//! - Create the `kv_store` table and stamp its schema version.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No key-value reads or writes happen before the schema check passes.
//! - Every error names the database it happened on.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;

pub use open::{open_db, open_db_in_memory, MEMORY_LOCATION};

/// Schema version stamped after `kv_store` is created.
pub const KV_SCHEMA_VERSION: u32 = 1;

pub type DbResult<T> = Result<T, DbError>;

/// Failure while bringing a store database into a usable state.
#[derive(Debug)]
pub enum DbError {
    /// Connection could not be opened or configured.
    Open {
        location: String,
        source: rusqlite::Error,
    },
    /// Reading the schema version or creating `kv_store` failed.
    Schema {
        location: String,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build.
    NewerSchema {
        location: String,
        found: u32,
        supported: u32,
    },
}

impl DbError {
    /// File path of the database, or [`MEMORY_LOCATION`].
    pub fn location(&self) -> &str {
        match self {
            Self::Open { location, .. }
            | Self::Schema { location, .. }
            | Self::NewerSchema { location, .. } => location,
        }
    }

    /// Stable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "db_open_failed",
            Self::Schema { .. } => "db_schema_failed",
            Self::NewerSchema { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { location, source } => {
                write!(f, "cannot open store database `{location}`: {source}")
            }
            Self::Schema { location, source } => {
                write!(f, "cannot prepare kv_store in `{location}`: {source}")
            }
            Self::NewerSchema {
                location,
                found,
                supported,
            } => write!(
                f,
                "store database `{location}` has schema version {found}, newer than supported {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Schema { source, .. } => Some(source),
            Self::NewerSchema { .. } => None,
        }
    }
}
