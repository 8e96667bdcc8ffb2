//! In-progress list form state for the create and edit flows.
//!
//! # Invariants
//! - Items added through the draft are trimmed and non-blank.
//! - `can_submit()` matches the create-path validation of `List::create`.

use crate::model::list::{normalize_name, Item, List, ListValidationError};

/// Name and items collected before a list is created or saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDraft {
    pub name: String,
    pub items: Vec<Item>,
}

impl ListDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefills a draft from an existing list, keeping item ids and flags.
    pub fn from_list(list: &List) -> Self {
        Self {
            name: list.name.clone(),
            items: list.items.clone(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Appends an unchecked item from `text`. Blank text is ignored.
    ///
    /// Returns whether an item was added.
    pub fn add_item(&mut self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.items.push(Item::new(trimmed));
        true
    }

    /// Removes the item at `index`; out of range is a no-op.
    pub fn remove_item(&mut self, index: usize) -> Option<Item> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }

    /// Checks the draft against the list creation rules.
    pub fn validate(&self) -> Result<(), ListValidationError> {
        normalize_name(&self.name)?;
        if self.items.is_empty() {
            return Err(ListValidationError::NoItems);
        }
        Ok(())
    }

    /// Splits the draft into `(name, items)` for a store call.
    pub fn into_parts(self) -> (String, Vec<Item>) {
        (self.name, self.items)
    }
}
