//! Lists store: the in-memory source of truth for all lists.
//!
//! # Responsibility
//! - Load the collection on cold start, or seed the sample list.
//! - Apply list/item mutations as whole-collection replacements.
//! - Schedule a full-snapshot write after every effective change.
//!
//! # Invariants
//! - List ids stay unique; new ids follow the max-plus-one rule.
//! - Unknown list ids and out-of-range item indexes are silent no-ops.
//! - Mutations never wait for persistence and never see its errors.
//! - Published snapshots are immutable; a mutation swaps in a new one.

use crate::model::list::{
    find_duplicate_id, next_list_id, Collection, Item, ItemId, List, ListId, ListValidationError,
};
use crate::model::snapshot::{decode_collection, encode_collection, seed_collection};
use crate::repo::kv_repo::KvRepository;
use crate::repo::lists_repo::ListsRepository;
use crate::service::snapshot_writer::SnapshotWriter;
use log::{debug, error, info, warn};
use std::io;
use std::sync::Arc;

/// How the collection was obtained during [`ListsStore::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored document decoded as-is.
    Restored,
    /// Nothing stored yet; the sample list was seeded.
    Seeded,
    /// Stored document was unreadable; the sample list replaced it.
    Recovered,
}

impl LoadOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Restored => "restored",
            Self::Seeded => "seeded",
            Self::Recovered => "recovered",
        }
    }
}

/// Owner of the lists collection and of its background writer.
pub struct ListsStore {
    lists: Arc<Collection>,
    load_outcome: LoadOutcome,
    writer: SnapshotWriter,
}

impl ListsStore {
    /// Loads the collection through `repo` and starts the snapshot writer.
    ///
    /// Read and decode failures fall back to the seeded collection. A seeded
    /// or recovered collection is written back once.
    ///
    /// # Errors
    /// Returns an error only when the writer thread cannot be spawned.
    pub fn initialize<R>(repo: ListsRepository<R>) -> io::Result<Self>
    where
        R: KvRepository + Send + 'static,
    {
        let (lists, load_outcome) = load_or_seed(&repo);
        info!(
            "event=store_init module=store status=ok outcome={} lists={}",
            load_outcome.as_str(),
            lists.len()
        );

        let store = Self {
            lists: Arc::new(lists),
            load_outcome,
            writer: SnapshotWriter::spawn(repo)?,
        };
        if load_outcome != LoadOutcome::Restored {
            store.persist();
        }
        Ok(store)
    }

    /// Current collection snapshot. Cheap to clone and safe to hold.
    pub fn lists(&self) -> Arc<Collection> {
        Arc::clone(&self.lists)
    }

    pub fn get_list(&self, id: ListId) -> Option<&List> {
        self.lists.iter().find(|list| list.id == id)
    }

    /// `true` when list `id` exists, has items, and all are checked.
    pub fn all_checked(&self, id: ListId) -> bool {
        self.get_list(id).is_some_and(List::all_checked)
    }

    /// Number of lists with at least one unchecked item.
    pub fn incomplete_count(&self) -> usize {
        self.lists.iter().filter(|list| list.is_incomplete()).count()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn load_outcome(&self) -> LoadOutcome {
        self.load_outcome
    }

    /// Replaces the whole collection.
    ///
    /// # Errors
    /// `DuplicateListId` when two lists share an id; nothing changes then.
    pub fn replace_all(&mut self, lists: Collection) -> Result<(), ListValidationError> {
        if let Some(id) = find_duplicate_id(&lists) {
            warn!("event=replace_all module=store status=rejected error_code=duplicate_list_id list_id={id}");
            return Err(ListValidationError::DuplicateListId(id));
        }
        self.commit("replace_all", lists);
        Ok(())
    }

    /// Appends a new list under the next free id and returns it.
    ///
    /// # Errors
    /// `BlankName`, `NoItems`, or `IdSpaceExhausted`; the collection is
    /// unchanged then.
    pub fn create_list(
        &mut self,
        name: &str,
        items: Vec<Item>,
    ) -> Result<List, ListValidationError> {
        let list = next_list_id(&self.lists)
            .ok_or(ListValidationError::IdSpaceExhausted)
            .and_then(|id| List::create(id, name, items))
            .inspect_err(|err| {
                debug!("event=create_list module=store status=rejected error={err}");
            })?;

        let mut next = Vec::with_capacity(self.lists.len() + 1);
        next.extend(self.lists.iter().cloned());
        next.push(list.clone());
        self.commit("create_list", next);
        Ok(list)
    }

    /// Removes list `id`. Returns whether anything was removed.
    pub fn delete_list(&mut self, id: ListId) -> bool {
        if self.get_list(id).is_none() {
            debug!("event=delete_list module=store status=noop reason=list_not_found list_id={id}");
            return false;
        }
        let next = self
            .lists
            .iter()
            .filter(|list| list.id != id)
            .cloned()
            .collect();
        self.commit("delete_list", next);
        true
    }

    /// Replaces name and items of list `id` wholesale.
    pub fn rename_and_replace_items(
        &mut self,
        id: ListId,
        name: impl Into<String>,
        items: Vec<Item>,
    ) -> bool {
        let name = name.into();
        self.update_list("rename_and_replace_items", id, |list| {
            Some(List {
                id: list.id,
                name,
                items,
            })
        })
    }

    /// Appends an unchecked item named `item_name` to list `id`.
    pub fn add_item_to_list(&mut self, id: ListId, item_name: impl Into<String>) -> bool {
        let item = Item::new(item_name);
        self.update_list("add_item_to_list", id, |list| {
            let mut items = list.items.clone();
            items.push(item);
            Some(List {
                items,
                ..list.clone()
            })
        })
    }

    /// Flips `checked` of the item at `item_index` in list `id`.
    pub fn toggle_item_checked(&mut self, id: ListId, item_index: usize) -> bool {
        self.update_list("toggle_item_checked", id, |list| {
            toggle_at(list, item_index)
        })
    }

    /// Flips `checked` of the item with stable id `item_uuid` in list `id`.
    pub fn toggle_item(&mut self, id: ListId, item_uuid: ItemId) -> bool {
        self.update_list("toggle_item", id, |list| {
            list.item_position(item_uuid)
                .and_then(|index| toggle_at(list, index))
        })
    }

    /// Waits until every snapshot scheduled so far was handed to storage.
    pub fn flush(&self) -> bool {
        self.writer.flush()
    }

    fn update_list(
        &mut self,
        op: &'static str,
        id: ListId,
        edit: impl FnOnce(&List) -> Option<List>,
    ) -> bool {
        let Some(position) = self.lists.iter().position(|list| list.id == id) else {
            debug!("event={op} module=store status=noop reason=list_not_found list_id={id}");
            return false;
        };
        let Some(updated) = edit(&self.lists[position]) else {
            debug!("event={op} module=store status=noop reason=item_not_found list_id={id}");
            return false;
        };

        let mut next = Collection::clone(&self.lists);
        next[position] = updated;
        self.commit(op, next);
        true
    }

    fn commit(&mut self, op: &'static str, next: Collection) {
        self.lists = Arc::new(next);
        debug!(
            "event={op} module=store status=ok lists={}",
            self.lists.len()
        );
        self.persist();
    }

    fn persist(&self) {
        match encode_collection(&self.lists) {
            Ok(snapshot) => self.writer.submit(snapshot),
            Err(err) => {
                error!("event=lists_save module=store status=error error_code=encode_failed error={err}")
            }
        }
    }
}

fn toggle_at(list: &List, index: usize) -> Option<List> {
    let target = list.items.get(index)?;
    let mut items = list.items.clone();
    items[index] = target.toggled();
    Some(List {
        items,
        ..list.clone()
    })
}

fn load_or_seed<R: KvRepository>(repo: &ListsRepository<R>) -> (Collection, LoadOutcome) {
    let raw = match repo.load() {
        Ok(Some(raw)) => raw,
        Ok(None) => return (seed_collection(), LoadOutcome::Seeded),
        Err(err) => {
            warn!("event=store_init module=store status=fallback error_code=read_failed error={err}");
            return (seed_collection(), LoadOutcome::Recovered);
        }
    };

    match decode_collection(&raw) {
        Ok(lists) => (lists, LoadOutcome::Restored),
        Err(err) => {
            warn!(
                "event=store_init module=store status=fallback error_code=decode_failed bytes={} error={err}",
                raw.len()
            );
            (seed_collection(), LoadOutcome::Recovered)
        }
    }
}
