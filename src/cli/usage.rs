//! CLI `usage` command: show one user's counters and session count.

use anyhow::Result;

use echomind::account::types::UsageSnapshot;
use echomind::account::{sessions, users};
use echomind::config::EchoConfig;

pub fn usage(config: &EchoConfig, user_id: &str) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = echomind::db::open_database(&db_path)?;

    let Some(user) = users::get_user(&conn, user_id)? else {
        println!("No user with id {user_id}");
        return Ok(());
    };
    let snapshot = UsageSnapshot::from(&user);
    let session_count = sessions::count_sessions(&conn, user_id)?;

    println!("Usage for {} <{}>", user.name, user.email);
    println!("{}", "=".repeat(40));
    println!("  Created:             {}", user.created_at);
    println!(
        "  Free trial:          {}/{}",
        snapshot.free_trial_used, snapshot.free_trial_limit
    );
    println!(
        "  Premium calls:       {} remaining of {} purchased",
        snapshot.premium_calls_remaining, snapshot.premium_calls_total
    );
    println!("  Premium:             {}", if snapshot.is_premium { "yes" } else { "no" });
    println!("  Sessions saved:      {session_count}");
    if let Err(denial) = snapshot.check_can_start() {
        println!();
        println!("  {denial}");
    }

    Ok(())
}
