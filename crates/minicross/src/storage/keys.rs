//! Local key namespace.

use chrono::NaiveDate;

const PREFIX: &str = "mc";

/// TTL-cached puzzle document for a date.
pub fn puzzle(date: NaiveDate) -> String {
    format!("{}::puzzle::{}", PREFIX, date)
}

/// Progress snapshot for a player and date. Signed-out play has its own slot.
pub fn progress(user: Option<&str>, date: NaiveDate) -> String {
    match user {
        Some(user) => format!("{}::user::{}::progress::{}", PREFIX, user, date),
        None => format!("{}::anon::progress::{}", PREFIX, date),
    }
}

/// Pending sync operations.
pub fn queue() -> String {
    format!("{}::queue", PREFIX)
}

pub fn stats(user: &str) -> String {
    format!("{}::stats::{}", PREFIX, user)
}

pub fn profile(user: &str) -> String {
    format!("{}::profile::{}", PREFIX, user)
}
