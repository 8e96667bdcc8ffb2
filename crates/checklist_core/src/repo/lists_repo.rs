//! Fixed-key adapter that stores the serialized lists document.
//!
//! # Invariants
//! - Exactly one value is owned, under [`LISTS_STORAGE_KEY`].
//! - The adapter never parses or mutates the document it moves.

use crate::repo::kv_repo::{KvRepository, RepoResult};
use log::error;

/// Storage key of the serialized collection.
pub const LISTS_STORAGE_KEY: &str = "@my_lists";

/// Persistence adapter for the whole lists collection.
pub struct ListsRepository<R: KvRepository> {
    kv: R,
}

impl<R: KvRepository> ListsRepository<R> {
    pub fn new(kv: R) -> Self {
        Self { kv }
    }

    /// Returns the stored document, or `None` if nothing was ever saved.
    pub fn load(&self) -> RepoResult<Option<String>> {
        self.kv.get_item(LISTS_STORAGE_KEY).inspect_err(|err| {
            error!("event=lists_load module=repo status=error error={err}");
        })
    }

    /// Overwrites the stored document.
    pub fn save(&self, serialized: &str) -> RepoResult<()> {
        self.kv.set_item(LISTS_STORAGE_KEY, serialized)
    }
}
