//! Checklist domain model.
//!
//! # Responsibility
//! - Define the list/item records shared by the store and its callers.
//! - Own the persisted JSON document shape of a whole collection.
//!
//! # Invariants
//! - List ids are unique within a collection.
//! - Items carry a stable `uuid`; positional index is a view concern.

pub mod draft;
pub mod list;
pub mod snapshot;
