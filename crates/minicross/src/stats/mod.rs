//! Per-user play statistics.
//!
//! - `Stats` - totals, history, best-of-day times and streaks
//! - `CompletionEvaluator` - applies one solve to `Stats` and judges the result
//! - `StatsStore` - reads and writes `Stats` in the local store

mod evaluator;
mod store;
mod streak;

pub use evaluator::{CompletionEvaluator, CompletionInput, Verdict, apply_completion};
pub use store::{GUEST, StatsStore};
pub use streak::{advance_streak, day_gap};

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Totals {
    pub played: u64,
    pub completed: u64,
    /// Number of assisted completions.
    pub reveals: u64,
    pub errors: u64,
    pub total_time_secs: u64,
    /// All-time best of clean solves only.
    pub best_time_secs: Option<u64>,
}

/// One line of the append-only history log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub day: Option<NaiveDate>,
    pub title: Option<String>,
    pub puzzle_key: Option<String>,
    pub size: Option<usize>,
    pub errors: u32,
    pub assisted: bool,
    pub elapsed_secs: u64,
    pub completed: bool,
    /// Play starts recorded for `day` (marker entries only).
    pub played: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub totals: Totals,
    pub history: Vec<HistoryEntry>,
    /// Best time per day, assisted solves included.
    pub completions_by_day: BTreeMap<NaiveDate, u64>,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_clean_day: Option<NaiveDate>,
    pub last_streak_day: Option<NaiveDate>,
    pub last_played_at: Option<DateTime<Utc>>,
}

impl Stats {
    /// Fill fields that older records did not carry.
    pub fn normalized(mut self) -> Self {
        if self.last_streak_day.is_none() {
            self.last_streak_day = self.last_clean_day;
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self
    }

    /// Record that a play started, once per session.
    pub fn bump_played(&mut self, day: Option<NaiveDate>, now: DateTime<Utc>) {
        self.totals.played += 1;
        self.last_played_at = Some(now);

        let Some(day) = day else {
            return;
        };
        match self
            .history
            .iter_mut()
            .find(|entry| entry.day == Some(day) && entry.played > 0)
        {
            Some(entry) => entry.played += 1,
            None => self.history.push(HistoryEntry {
                at: now,
                day: Some(day),
                played: 1,
                ..HistoryEntry::default()
            }),
        }
    }

    /// Mean solve time across all completions.
    pub fn average_time_secs(&self) -> Option<u64> {
        (self.totals.completed > 0).then(|| self.totals.total_time_secs / self.totals.completed)
    }
}
