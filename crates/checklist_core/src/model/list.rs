//! List and item records.
//!
//! # Responsibility
//! - Define the canonical `List` / `Item` shapes and their JSON field names.
//! - Provide creation-path validation and derived list state.
//!
//! # Invariants
//! - `Item::uuid` is stable and never reused for another item.
//! - Creation paths store trimmed, non-empty names.
//! - A list is never "all checked" while it has no items.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Integer list id, unique inside one collection.
pub type ListId = i64;

/// Stable per-item identifier.
pub type ItemId = Uuid;

/// Ordered collection of lists, in creation order.
pub type Collection = Vec<List>;

/// One checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Generated when absent so documents written before item ids still load.
    #[serde(default = "Uuid::new_v4")]
    pub uuid: ItemId,
    pub name: String,
    #[serde(default)]
    pub checked: bool,
}

impl Item {
    /// Creates an unchecked item with a fresh stable id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            checked: false,
        }
    }

    /// Returns a copy with `checked` flipped.
    pub fn toggled(&self) -> Self {
        Self {
            checked: !self.checked,
            ..self.clone()
        }
    }
}

/// Named, ordered sequence of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl List {
    /// Builds a list through the creation path.
    ///
    /// # Errors
    /// - `BlankName` when `name` trims to empty.
    /// - `NoItems` when `items` is empty.
    pub fn create(
        id: ListId,
        name: &str,
        items: Vec<Item>,
    ) -> Result<Self, ListValidationError> {
        let name = normalize_name(name)?;
        if items.is_empty() {
            return Err(ListValidationError::NoItems);
        }
        Ok(Self { id, name, items })
    }

    /// `true` iff the list has items and all of them are checked.
    pub fn all_checked(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| item.checked)
    }

    /// `true` when at least one item is unchecked. Empty lists are not incomplete.
    pub fn is_incomplete(&self) -> bool {
        self.items.iter().any(|item| !item.checked)
    }

    pub fn checked_count(&self) -> usize {
        self.items.iter().filter(|item| item.checked).count()
    }

    /// Position of the item with `uuid`, if present.
    pub fn item_position(&self, uuid: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.uuid == uuid)
    }
}

/// Rejected user input on a creation or bulk-replace path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListValidationError {
    /// Name is blank after trim.
    BlankName,
    /// A new list must start with at least one item.
    NoItems,
    /// Bulk replacement would put two lists under one id.
    DuplicateListId(ListId),
    /// The largest id in use leaves no room for another one.
    IdSpaceExhausted,
}

impl Display for ListValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "list name must not be blank"),
            Self::NoItems => write!(f, "list must contain at least one item"),
            Self::DuplicateListId(id) => write!(f, "duplicate list id: {id}"),
            Self::IdSpaceExhausted => write!(f, "no list id left above the largest one in use"),
        }
    }
}

impl Error for ListValidationError {}

/// Trims `raw` and rejects blank names.
pub fn normalize_name(raw: &str) -> Result<String, ListValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ListValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

/// Next id under the max-plus-one rule; `1` for an empty collection.
///
/// Returns `None` when the largest id is `ListId::MAX`.
pub fn next_list_id(lists: &[List]) -> Option<ListId> {
    match lists.iter().map(|list| list.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Returns the first id that appears more than once, if any.
pub fn find_duplicate_id(lists: &[List]) -> Option<ListId> {
    let mut seen = std::collections::HashSet::with_capacity(lists.len());
    lists.iter().map(|list| list.id).find(|id| !seen.insert(*id))
}
