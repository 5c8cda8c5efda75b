pub mod sessions;
pub mod types;
pub mod users;

/// Fixed-width UTC timestamp, so `created_at` columns sort lexicographically.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
