//! User records and usage counters.
//!
//! Users are created lazily the first time an authenticated request needs them
//! ([`ensure_user`]). Counter changes go through [`apply_usage_action`], which
//! issues a single `UPDATE` with the arithmetic done in SQL so concurrent
//! requests never lose an increment.

use anyhow::{bail, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::account::types::{NewUser, UsageAction, UsageSnapshot, User};

const USER_COLUMNS: &str = "id, name, email, created_at, free_trial_used, free_trial_limit, \
     premium_calls_remaining, premium_calls_total";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
        free_trial_used: row.get(4)?,
        free_trial_limit: row.get(5)?,
        premium_calls_remaining: row.get(6)?,
        premium_calls_total: row.get(7)?,
    })
}

/// Fetch a user by id.
pub fn get_user(conn: &Connection, id: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

/// Create the user if absent and return the stored row.
///
/// The returned flag is `true` when this call inserted the row. An existing
/// user keeps its stored name and email.
pub fn ensure_user(
    conn: &Connection,
    new_user: &NewUser,
    free_trial_limit: i64,
) -> Result<(User, bool)> {
    let now = super::now_timestamp();
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (id, name, email, created_at, free_trial_limit) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![new_user.id, new_user.name, new_user.email, now, free_trial_limit],
    )?;

    if inserted > 0 {
        tracing::info!(user = %new_user.id, "user synced to database");
    }

    match get_user(conn, &new_user.id)? {
        Some(user) => Ok((user, inserted > 0)),
        None => bail!("user vanished after insert: {}", new_user.id),
    }
}

/// Apply a counter mutation and return the updated snapshot.
pub fn apply_usage_action(
    conn: &Connection,
    id: &str,
    action: UsageAction,
) -> Result<UsageSnapshot> {
    let rows = match action {
        UsageAction::UseFreeCall => conn.execute(
            "UPDATE users SET free_trial_used = free_trial_used + 1 WHERE id = ?1",
            params![id],
        )?,
        UsageAction::AddPremiumCalls(calls) => conn.execute(
            "UPDATE users SET premium_calls_remaining = premium_calls_remaining + ?2, \
             premium_calls_total = premium_calls_total + ?2 WHERE id = ?1",
            params![id, calls],
        )?,
        UsageAction::UsePremiumCall => conn.execute(
            "UPDATE users SET premium_calls_remaining = premium_calls_remaining - 1 WHERE id = ?1",
            params![id],
        )?,
    };
    if rows == 0 {
        bail!("user not found: {id}");
    }

    let Some(user) = get_user(conn, id)? else {
        bail!("user not found: {id}");
    };
    if user.premium_calls_remaining < 0 {
        tracing::warn!(
            user = %id,
            remaining = user.premium_calls_remaining,
            "premium call balance is negative"
        );
    }

    tracing::debug!(user = %id, action = %action, "usage counters updated");
    Ok(UsageSnapshot::from(&user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn new_user(id: &str) -> NewUser {
        NewUser {
            id: id.to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn ensure_user_creates_with_defaults() {
        let conn = db::open_memory_database().unwrap();
        let (user, created) = ensure_user(&conn, &new_user("u1"), 3).unwrap();

        assert!(created);
        assert_eq!(user.id, "u1");
        assert_eq!(user.free_trial_used, 0);
        assert_eq!(user.free_trial_limit, 3);
        assert_eq!(user.premium_calls_remaining, 0);
        assert_eq!(user.premium_calls_total, 0);
    }

    #[test]
    fn ensure_user_is_idempotent() {
        let conn = db::open_memory_database().unwrap();
        ensure_user(&conn, &new_user("u1"), 3).unwrap();

        let renamed = NewUser {
            name: "Someone Else".to_string(),
            ..new_user("u1")
        };
        let (user, created) = ensure_user(&conn, &renamed, 5).unwrap();

        assert!(!created);
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.free_trial_limit, 3);
    }

    #[test]
    fn get_user_missing_is_none() {
        let conn = db::open_memory_database().unwrap();
        assert!(get_user(&conn, "nobody").unwrap().is_none());
    }

    #[test]
    fn use_free_call_increments_only_trial() {
        let conn = db::open_memory_database().unwrap();
        ensure_user(&conn, &new_user("u1"), 3).unwrap();

        let snap = apply_usage_action(&conn, "u1", UsageAction::UseFreeCall).unwrap();
        assert_eq!(snap.free_trial_used, 1);
        assert_eq!(snap.premium_calls_remaining, 0);
        assert_eq!(snap.premium_calls_total, 0);
        assert!(!snap.is_premium);
    }

    #[test]
    fn add_premium_calls_updates_remaining_and_total() {
        let conn = db::open_memory_database().unwrap();
        ensure_user(&conn, &new_user("u1"), 3).unwrap();

        apply_usage_action(&conn, "u1", UsageAction::AddPremiumCalls(10)).unwrap();
        let snap = apply_usage_action(&conn, "u1", UsageAction::UsePremiumCall).unwrap();

        assert_eq!(snap.premium_calls_remaining, 9);
        assert_eq!(snap.premium_calls_total, 10);
        assert!(snap.is_premium);
    }

    #[test]
    fn premium_decrement_is_not_floored() {
        let conn = db::open_memory_database().unwrap();
        ensure_user(&conn, &new_user("u1"), 3).unwrap();

        let snap = apply_usage_action(&conn, "u1", UsageAction::UsePremiumCall).unwrap();
        assert_eq!(snap.premium_calls_remaining, -1);
        assert!(!snap.is_premium);
    }

    #[test]
    fn action_on_unknown_user_fails() {
        let conn = db::open_memory_database().unwrap();
        let err = apply_usage_action(&conn, "ghost", UsageAction::UseFreeCall).unwrap_err();
        assert!(err.to_string().contains("user not found"));
    }
}
