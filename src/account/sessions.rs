//! Session history: write-once records of completed voice sessions.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::account::types::SessionRecord;

const SESSION_COLUMNS: &str =
    "session_id, created_by, notes, summary, sentiment, duration, created_at";

/// Listing order for [`list_sessions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrder {
    Newest,
    Oldest,
}

/// Input for [`save_session`]. `created_at` is stamped on insert.
#[derive(Debug, Clone, Default)]
pub struct NewSession {
    pub session_id: String,
    pub created_by: String,
    pub notes: Option<String>,
    pub summary: Option<String>,
    pub sentiment: Option<String>,
    pub duration: Option<String>,
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        session_id: row.get(0)?,
        created_by: row.get(1)?,
        notes: row.get(2)?,
        summary: row.get(3)?,
        sentiment: row.get(4)?,
        duration: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a session record.
///
/// Returns `false` (and leaves the stored row untouched) when a record with
/// the same `session_id` already exists.
pub fn save_session(conn: &Connection, session: &NewSession) -> Result<bool> {
    let now = super::now_timestamp();
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO history (session_id, created_by, notes, summary, sentiment, duration, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            session.session_id,
            session.created_by,
            session.notes,
            session.summary,
            session.sentiment,
            session.duration,
            now,
        ],
    )?;

    if inserted == 0 {
        tracing::warn!(session = %session.session_id, "session already saved, ignoring");
        return Ok(false);
    }
    tracing::info!(
        session = %session.session_id,
        owner = %session.created_by,
        notes_len = session.notes.as_deref().map_or(0, str::len),
        "session saved"
    );
    Ok(true)
}

/// Fetch one session owned by `owner`.
pub fn get_session(
    conn: &Connection,
    session_id: &str,
    owner: &str,
) -> Result<Option<SessionRecord>> {
    let record = conn
        .query_row(
            &format!("SELECT {SESSION_COLUMNS} FROM history WHERE session_id = ?1 AND created_by = ?2"),
            params![session_id, owner],
            row_to_session,
        )
        .optional()?;
    Ok(record)
}

/// All sessions owned by `owner`. Ties on `created_at` fall back to insertion order.
pub fn list_sessions(
    conn: &Connection,
    owner: &str,
    order: SessionOrder,
) -> Result<Vec<SessionRecord>> {
    let direction = match order {
        SessionOrder::Newest => "DESC",
        SessionOrder::Oldest => "ASC",
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM history WHERE created_by = ?1 \
         ORDER BY created_at {direction}, rowid {direction}"
    ))?;
    let sessions = stmt
        .query_map(params![owner], row_to_session)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sessions)
}

/// Number of sessions owned by `owner`.
pub fn count_sessions(conn: &Connection, owner: &str) -> Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM history WHERE created_by = ?1",
        params![owner],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn session(id: &str, owner: &str) -> NewSession {
        NewSession {
            session_id: id.to_string(),
            created_by: owner.to_string(),
            notes: Some("user: I slept badly\nai: Tell me more".to_string()),
            summary: Some("Brief session with minimal conversation.".to_string()),
            sentiment: None,
            duration: Some("00:04:12".to_string()),
        }
    }

    #[test]
    fn save_then_get() {
        let conn = db::open_memory_database().unwrap();
        assert!(save_session(&conn, &session("s1", "u1")).unwrap());

        let record = get_session(&conn, "s1", "u1").unwrap().unwrap();
        assert_eq!(record.created_by.as_deref(), Some("u1"));
        assert_eq!(record.duration.as_deref(), Some("00:04:12"));
        assert!(record.sentiment.is_none());
    }

    #[test]
    fn second_save_is_ignored() {
        let conn = db::open_memory_database().unwrap();
        assert!(save_session(&conn, &session("s1", "u1")).unwrap());

        let mut again = session("s1", "u1");
        again.summary = Some("overwritten?".to_string());
        assert!(!save_session(&conn, &again).unwrap());

        let record = get_session(&conn, "s1", "u1").unwrap().unwrap();
        assert_eq!(
            record.summary.as_deref(),
            Some("Brief session with minimal conversation.")
        );
        assert_eq!(count_sessions(&conn, "u1").unwrap(), 1);
    }

    #[test]
    fn sessions_are_scoped_to_owner() {
        let conn = db::open_memory_database().unwrap();
        save_session(&conn, &session("s1", "u1")).unwrap();
        save_session(&conn, &session("s2", "u2")).unwrap();

        assert!(get_session(&conn, "s2", "u1").unwrap().is_none());
        let mine = list_sessions(&conn, "u1", SessionOrder::Newest).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].session_id, "s1");
    }

    #[test]
    fn list_orders_both_ways() {
        let conn = db::open_memory_database().unwrap();
        for id in ["a", "b", "c"] {
            save_session(&conn, &session(id, "u1")).unwrap();
        }

        let newest: Vec<String> = list_sessions(&conn, "u1", SessionOrder::Newest)
            .unwrap()
            .into_iter()
            .map(|s| s.session_id)
            .collect();
        let oldest: Vec<String> = list_sessions(&conn, "u1", SessionOrder::Oldest)
            .unwrap()
            .into_iter()
            .map(|s| s.session_id)
            .collect();

        assert_eq!(newest, vec!["c", "b", "a"]);
        assert_eq!(oldest, vec!["a", "b", "c"]);
    }
}
