use catalog_core::db::migrations::latest_version;
use catalog_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "records");
    assert_table_exists(&conn, "record_fields");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "records");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn nested_records_require_a_parent_and_roots_forbid_one() {
    let conn = open_db_in_memory().unwrap();

    let orphan = conn.execute(
        "INSERT INTO records (id, kind, parent_id, created, changed, fetched)
         VALUES ('orphan', 'Email', NULL, '2020-01-01 00:00:00', '2020-01-01 00:00:00', '2020-01-01 00:00:00');",
        [],
    );
    assert!(orphan.is_err(), "nested kind without parent must be rejected");

    conn.execute(
        "INSERT INTO records (id, kind, parent_id, guid, created, changed, fetched)
         VALUES ('root', 'Organization', NULL, 'g-1', '2020-01-01 00:00:00', '2020-01-01 00:00:00', '2020-01-01 00:00:00');",
        [],
    )
    .unwrap();
    let nested_root = conn.execute(
        "INSERT INTO records (id, kind, parent_id, guid, created, changed, fetched)
         VALUES ('nested-root', 'Organization', 'root', 'g-2', '2020-01-01 00:00:00', '2020-01-01 00:00:00', '2020-01-01 00:00:00');",
        [],
    );
    assert!(nested_root.is_err(), "root kind with parent must be rejected");
}

#[test]
fn removing_a_record_row_cascades_to_its_fields() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO records (id, kind, guid, created, changed, fetched)
         VALUES ('root', 'Organization', 'g-1', '2020-01-01 00:00:00', '2020-01-01 00:00:00', '2020-01-01 00:00:00');
         INSERT INTO record_fields (record_id, name, value) VALUES ('root', 'organization_type', 'Municipality');
         DELETE FROM records WHERE id = 'root';",
    )
    .unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM record_fields;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
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
