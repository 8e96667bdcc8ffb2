//! Core use-case services.
//!
//! # Responsibility
//! - Own the lists collection and its mutation rules.
//! - Keep FFI/UI callers decoupled from storage details.

pub mod lists_store;
pub mod snapshot_writer;
