use checklist_core::db::{open_db, open_db_in_memory, DbError, KV_SCHEMA_VERSION};
use checklist_core::{
    KvRepository, ListsRepository, MemoryKvRepository, RepoError, SqliteKvRepository,
    LISTS_STORAGE_KEY,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_prepares_kv_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), KV_SCHEMA_VERSION);
    assert_table_exists(&conn, "kv_store");
}

#[test]
fn reopening_same_database_keeps_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checklist.db");

    let first = SqliteKvRepository::open(&path).unwrap();
    first.set_item("theme", "dark").unwrap();
    drop(first);

    let second = SqliteKvRepository::open(&path).unwrap();
    assert_eq!(second.get_item("theme").unwrap().as_deref(), Some("dark"));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::NewerSchema {
            location,
            found,
            supported,
        } => {
            assert_eq!(location, path.display().to_string());
            assert_eq!(found, 999);
            assert_eq!(supported, KV_SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = SqliteKvRepository::open(&path).err().unwrap();
    assert!(matches!(err, RepoError::Db(DbError::NewerSchema { .. })));
}

#[test]
fn open_failure_in_missing_directory_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("checklist.db");

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::Open { .. }), "unexpected error: {err}");
    assert_eq!(err.location(), path.display().to_string());
    assert_eq!(err.code(), "db_open_failed");
    assert!(err.to_string().contains(&path.display().to_string()));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn non_database_file_is_rejected_with_its_location() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "plain text, not a sqlite header. ".repeat(8)).unwrap();

    let err = open_db(&path).unwrap_err();
    assert!(
        matches!(err, DbError::Open { .. } | DbError::Schema { .. }),
        "unexpected error: {err}"
    );
    assert_eq!(err.location(), path.display().to_string());
}

#[test]
fn query_errors_are_separate_from_open_errors() {
    let conn = Connection::open_in_memory().unwrap();
    let repo = SqliteKvRepository::new(conn);

    let err = repo.get_item("k").unwrap_err();
    assert!(matches!(err, RepoError::Query(_)), "unexpected error: {err}");
    assert!(err.to_string().starts_with("kv_store query failed"));
}

#[test]
fn sqlite_set_overwrites_and_remove_reports_presence() {
    let repo = SqliteKvRepository::open_in_memory().unwrap();

    assert_eq!(repo.get_item("k").unwrap(), None);
    repo.set_item("k", "one").unwrap();
    repo.set_item("k", "two").unwrap();
    assert_eq!(repo.get_item("k").unwrap().as_deref(), Some("two"));

    assert!(repo.remove_item("k").unwrap());
    assert!(!repo.remove_item("k").unwrap());
    assert_eq!(repo.get_item("k").unwrap(), None);
}

#[test]
fn memory_repository_clones_share_entries() {
    let repo = MemoryKvRepository::new();
    let other = repo.clone();

    repo.set_item("a", "1").unwrap();
    assert_eq!(other.get_item("a").unwrap().as_deref(), Some("1"));
    assert!(other.remove_item("a").unwrap());
    assert_eq!(repo.get_item("a").unwrap(), None);
}

#[test]
fn lists_repository_uses_fixed_key() {
    let kv = MemoryKvRepository::new();
    let lists = ListsRepository::new(kv.clone());

    assert_eq!(lists.load().unwrap(), None);
    lists.save("[]").unwrap();

    assert_eq!(LISTS_STORAGE_KEY, "@my_lists");
    assert_eq!(kv.get_item("@my_lists").unwrap().as_deref(), Some("[]"));
    assert_eq!(lists.load().unwrap().as_deref(), Some("[]"));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
