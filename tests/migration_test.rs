mod helpers;

use echomind::db;
use echomind::db::migrations::{get_schema_version, has_column, run_migrations, CURRENT_SCHEMA_VERSION};

#[test]
fn fresh_db_migrates_to_current_version() {
    let conn = helpers::test_db();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn migrations_are_idempotent() {
    let conn = helpers::test_db();
    run_migrations(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn manual_v1_db_upgrades_correctly() {
    // A v1 database with a session saved before sentiment/duration existed
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO history (session_id, created_by, notes, summary, created_at) \
         VALUES ('old', 'u1', 'user: hi', 'Brief session with minimal conversation.', '2024-01-01T00:00:00Z')",
        [],
    )
    .unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), 1);
    assert!(!has_column(&conn, "history", "duration").unwrap());

    run_migrations(&conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    let record = echomind::account::sessions::get_session(&conn, "old", "u1")
        .unwrap()
        .unwrap();
    assert!(record.duration.is_none());
    assert!(record.sentiment.is_none());
}
