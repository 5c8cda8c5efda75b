//! SQL DDL for all EchoMind tables.
//!
//! Defines `users`, `history` and `schema_meta`. All DDL uses `IF NOT EXISTS`
//! for idempotent initialization; later columns arrive through
//! [`super::migrations`].

use rusqlite::Connection;

/// Version-1 schema. Columns added after v1 live in migrations.
const SCHEMA_SQL: &str = r#"
-- Accounts and usage counters, keyed by the identity provider's user id
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at TEXT NOT NULL,
    free_trial_used INTEGER NOT NULL DEFAULT 0,
    free_trial_limit INTEGER NOT NULL DEFAULT 3,
    premium_calls_remaining INTEGER NOT NULL DEFAULT 0,
    premium_calls_total INTEGER NOT NULL DEFAULT 0
);

-- One row per completed voice session
CREATE TABLE IF NOT EXISTS history (
    session_id TEXT PRIMARY KEY,
    created_by TEXT,
    notes TEXT,
    summary TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_history_owner ON history(created_by, created_at);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"history".to_string()));
        assert!(tables.contains(&"schema_meta".to_string()));
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // second call should not error
    }

    #[test]
    fn duplicate_session_id_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO history (session_id, created_at) VALUES ('s-1', '2024-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        let second = conn.execute(
            "INSERT INTO history (session_id, created_at) VALUES ('s-1', '2024-01-02T00:00:00Z')",
            [],
        );
        assert!(second.is_err(), "primary key should reject a second insert");
    }
}
