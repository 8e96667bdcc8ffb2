//! Core domain logic for the checklist app.
//! This crate is the single source of truth for list/item invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::draft::ListDraft;
pub use model::list::{Collection, Item, ItemId, List, ListId, ListValidationError};
pub use model::snapshot::{decode_collection, encode_collection, seed_collection, SnapshotError};
pub use repo::kv_repo::{KvRepository, MemoryKvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use repo::lists_repo::{ListsRepository, LISTS_STORAGE_KEY};
pub use service::lists_store::{ListsStore, LoadOutcome};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
