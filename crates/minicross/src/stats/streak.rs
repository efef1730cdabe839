use chrono::NaiveDate;

use super::Stats;

/// Calendar days from `from` to `to`.
pub fn day_gap(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Count `day` toward the streak.
///
/// Same day: no change. Next day: +1. Longer gap: back to 1. A day earlier
/// than the last streak day leaves the streak alone.
pub fn advance_streak(stats: &mut Stats, day: NaiveDate) {
    match stats.last_streak_day {
        None => {
            stats.current_streak = 1;
            stats.last_streak_day = Some(day);
        }
        Some(last) => {
            match day_gap(last, day) {
                0 => {}
                1 => stats.current_streak += 1,
                gap if gap > 1 => stats.current_streak = 1,
                _ => return,
            }
            stats.last_streak_day = Some(day);
        }
    }
    // A record missing its streak fields may arrive with 0 here
    stats.current_streak = stats.current_streak.max(1);
    stats.longest_streak = stats.longest_streak.max(stats.current_streak);
}
