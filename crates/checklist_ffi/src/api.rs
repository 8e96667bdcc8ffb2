//! FFI use-case API for the Flutter shell.
//!
//! # Responsibility
//! - Expose the lists store operations to Dart via FRB sync calls.
//! - Own the single store instance for the process.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - The store database path is fixed once the store has been created.
//! - At most one store is opened per process; a failed open is retried on the
//!   next call.

use checklist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Item, List, ListsRepository, ListsStore, RepoError, SqliteKvRepository,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

const STORE_DB_FILE_NAME: &str = "checklist_store.sqlite3";
const STORE_DB_PATH_ENV: &str = "CHECKLIST_DB_PATH";

static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE: Mutex<Option<ListsStore>> = Mutex::new(None);
#[cfg(test)]
static STORE_OPENS: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Sets the store database path. Must run before the first store call.
///
/// Returns an empty string on success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store_path(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = STORE_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "store path already set to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// One item as shown by the list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    /// Stable item id in string form.
    pub uuid: String,
    pub name: String,
    pub checked: bool,
}

/// One list with derived state for the item screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub id: i64,
    pub name: String,
    pub items: Vec<ItemView>,
    pub checked_count: u32,
    pub all_checked: bool,
}

/// Item payload coming back from the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInput {
    /// Existing item id; `None` or unparsable for items added in the form.
    pub uuid: Option<String>,
    pub name: String,
    pub checked: bool,
}

/// Generic action envelope for list mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListActionResponse {
    pub ok: bool,
    /// Whether the collection changed (false for no-op lookups).
    pub changed: bool,
    /// Affected list after the call, when it still exists.
    pub list: Option<ListView>,
    pub message: String,
}

impl ListActionResponse {
    fn applied(changed: bool, list: Option<ListView>, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            changed,
            list,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            changed: false,
            list: None,
            message: message.into(),
        }
    }
}

/// Counters for the lists overview header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListsSummary {
    pub total_lists: u32,
    /// Lists with at least one unchecked item. Empty lists are not counted.
    pub incomplete_lists: u32,
}

/// Returns every list in creation order; empty on store failure.
#[flutter_rust_bridge::frb(sync)]
pub fn lists_snapshot() -> Vec<ListView> {
    with_store(|store| store.lists().iter().map(to_list_view).collect()).unwrap_or_default()
}

/// Returns list counters; zeroes on store failure.
#[flutter_rust_bridge::frb(sync)]
pub fn lists_summary() -> ListsSummary {
    with_store(|store| ListsSummary {
        total_lists: count_u32(store.len()),
        incomplete_lists: count_u32(store.incomplete_count()),
    })
    .unwrap_or_default()
}

/// Returns one list, or `None` when it does not exist.
#[flutter_rust_bridge::frb(sync)]
pub fn list_detail(list_id: i64) -> Option<ListView> {
    with_store(|store| store.get_list(list_id).map(to_list_view))
        .ok()
        .flatten()
}

/// Creates a list from the add-list form.
///
/// Blank item names are skipped, matching the form's add-item behavior.
#[flutter_rust_bridge::frb(sync)]
pub fn create_list(name: String, item_names: Vec<String>) -> ListActionResponse {
    let items = item_names
        .iter()
        .map(|raw| raw.trim())
        .filter(|trimmed| !trimmed.is_empty())
        .map(Item::new)
        .collect();
    respond("create_list", |store| {
        match store.create_list(name.as_str(), items) {
            Ok(list) => ListActionResponse::applied(true, Some(to_list_view(&list)), "List created."),
            Err(err) => ListActionResponse::failure(format!("create_list rejected: {err}")),
        }
    })
}

/// Deletes a list; unknown ids are a successful no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_list(list_id: i64) -> ListActionResponse {
    respond("delete_list", |store| {
        let changed = store.delete_list(list_id);
        ListActionResponse::applied(changed, None, outcome_message(changed, "List deleted."))
    })
}

/// Saves the edit form: new name plus the full item list.
#[flutter_rust_bridge::frb(sync)]
pub fn rename_and_replace_items(
    list_id: i64,
    name: String,
    items: Vec<ItemInput>,
) -> ListActionResponse {
    let items = items.into_iter().map(to_item).collect();
    mutate_list(list_id, "List saved.", |store| {
        store.rename_and_replace_items(list_id, name, items)
    })
}

/// Appends an unchecked item to a list.
#[flutter_rust_bridge::frb(sync)]
pub fn add_item_to_list(list_id: i64, item_name: String) -> ListActionResponse {
    mutate_list(list_id, "Item added.", |store| {
        store.add_item_to_list(list_id, item_name)
    })
}

/// Flips one item by position; out-of-range positions are a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn toggle_item_checked(list_id: i64, item_index: u32) -> ListActionResponse {
    mutate_list(list_id, "Item toggled.", |store| {
        usize::try_from(item_index)
            .map(|index| store.toggle_item_checked(list_id, index))
            .unwrap_or(false)
    })
}

/// Flips one item by stable id.
#[flutter_rust_bridge::frb(sync)]
pub fn toggle_item(list_id: i64, item_uuid: String) -> ListActionResponse {
    let Ok(uuid) = Uuid::parse_str(item_uuid.trim()) else {
        return ListActionResponse::failure(format!("invalid item uuid `{item_uuid}`"));
    };
    mutate_list(list_id, "Item toggled.", |store| {
        store.toggle_item(list_id, uuid)
    })
}

/// Blocks until pending list writes reached storage (app pause/shutdown).
///
/// Returns an empty string on success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn flush_store() -> String {
    match with_store(|store| store.flush()) {
        Ok(true) => String::new(),
        Ok(false) => "store writer is not running".to_string(),
        Err(err) => err,
    }
}

fn mutate_list(
    list_id: i64,
    done_message: &str,
    f: impl FnOnce(&mut ListsStore) -> bool,
) -> ListActionResponse {
    respond("mutate_list", |store| {
        let changed = f(store);
        let list = store.get_list(list_id).map(to_list_view);
        ListActionResponse::applied(changed, list, outcome_message(changed, done_message))
    })
}

fn respond(
    op: &str,
    f: impl FnOnce(&mut ListsStore) -> ListActionResponse,
) -> ListActionResponse {
    with_store(f).unwrap_or_else(|err| ListActionResponse::failure(format!("{op} failed: {err}")))
}

fn outcome_message(changed: bool, done: &str) -> String {
    if changed {
        done.to_string()
    } else {
        "No matching list or item.".to_string()
    }
}

fn resolve_store_db_path() -> PathBuf {
    STORE_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(STORE_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(STORE_DB_FILE_NAME)
        })
        .clone()
}

fn open_store() -> Result<ListsStore, String> {
    #[cfg(test)]
    STORE_OPENS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

    let db_path = resolve_store_db_path();
    let kv = SqliteKvRepository::open(&db_path).map_err(|err| {
        warn!("event=ffi_store_ready module=ffi status=error error_code={}", err_code(&err));
        format!("store DB open failed: {err}")
    })?;
    let store = ListsStore::initialize(ListsRepository::new(kv))
        .map_err(|err| format!("store init failed: {err}"))?;
    info!(
        "event=ffi_store_ready module=ffi status=ok outcome={}",
        store.load_outcome().as_str()
    );
    Ok(store)
}

/// Runs `f` on the process store, opening it under the lock on first use.
fn with_store<T>(f: impl FnOnce(&mut ListsStore) -> T) -> Result<T, String> {
    let mut slot = STORE
        .lock()
        .map_err(|_| "store lock poisoned".to_string())?;
    let store = match &mut *slot {
        Some(store) => store,
        empty => empty.insert(open_store()?),
    };
    Ok(f(store))
}

fn err_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Db(db) => db.code(),
        RepoError::Query(_) => "kv_query_failed",
        RepoError::Unavailable(_) => "kv_unavailable",
    }
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn to_item(input: ItemInput) -> Item {
    let mut item = Item::new(input.name);
    if let Some(uuid) = input
        .uuid
        .as_deref()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
    {
        item.uuid = uuid;
    }
    item.checked = input.checked;
    item
}

fn to_list_view(list: &List) -> ListView {
    ListView {
        id: list.id,
        name: list.name.clone(),
        items: list
            .items
            .iter()
            .map(|item| ItemView {
                uuid: item.uuid.to_string(),
                name: item.name.clone(),
                checked: item.checked,
            })
            .collect(),
        checked_count: count_u32(list.checked_count()),
        all_checked: list.all_checked(),
    }
}
