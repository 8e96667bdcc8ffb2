//! Persisted collection document and first-run seed.
//!
//! # Responsibility
//! - Encode/decode a whole collection as one JSON array.
//! - Provide the seeded collection shown on first start.
//!
//! # Invariants
//! - Encoding preserves collection order.
//! - Decoding never yields duplicate list ids.

use crate::model::list::{find_duplicate_id, Collection, Item, List, ListId};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SEED_LIST_NAME: &str = "Grocery store list";
const SEED_ITEM_NAMES: [&str; 8] = [
    "Cake",
    "Potato",
    "Slim Jim",
    "Watermelon",
    "Ding Dongs",
    "Sugar",
    "Pepper",
    "Burekas",
];

/// Failure to turn a stored document into a collection, or back.
#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    DuplicateListId(ListId),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid lists document: {err}"),
            Self::DuplicateListId(id) => write!(f, "lists document repeats list id {id}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::DuplicateListId(_) => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Serializes `lists` as a compact JSON array.
pub fn encode_collection(lists: &[List]) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(lists)?)
}

/// Parses a stored JSON array back into a collection.
pub fn decode_collection(raw: &str) -> Result<Collection, SnapshotError> {
    let lists: Collection = serde_json::from_str(raw)?;
    if let Some(id) = find_duplicate_id(&lists) {
        return Err(SnapshotError::DuplicateListId(id));
    }
    Ok(lists)
}

/// The single sample list used when nothing has been stored yet.
pub fn seed_collection() -> Collection {
    vec![List {
        id: 1,
        name: SEED_LIST_NAME.to_string(),
        items: SEED_ITEM_NAMES.iter().copied().map(Item::new).collect(),
    }]
}
