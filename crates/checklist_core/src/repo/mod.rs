//! Repository layer: local key-value persistence.
//!
//! # Responsibility
//! - Define the key-value storage contract used by the store.
//! - Isolate SQLite details from the lists store.
//!
//! # Invariants
//! - Repositories move opaque strings; they never interpret list data.

pub mod kv_repo;
pub mod lists_repo;
