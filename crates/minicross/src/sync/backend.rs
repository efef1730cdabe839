use std::cell::RefCell;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub type UserId = String;

/// Resolves the signed-in user, if any.
pub trait IdentityProvider {
    fn current_user(&self) -> Option<UserId>;
}

impl IdentityProvider for Option<UserId> {
    fn current_user(&self) -> Option<UserId> {
        self.clone()
    }
}

/// Identity that can change while a session runs (sign-in, sign-out).
impl IdentityProvider for RefCell<Option<UserId>> {
    fn current_user(&self) -> Option<UserId> {
        self.borrow().clone()
    }
}

/// Saved entries and elapsed time for one puzzle date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Rows of single letters; `""` for empty and block squares.
    pub entries: Vec<Vec<String>>,
    #[serde(default)]
    pub seconds: u64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressSnapshot {
    pub fn new(entries: Vec<Vec<String>>, seconds: u64) -> Self {
        Self {
            entries,
            seconds,
            ..Self::default()
        }
    }
}

/// Remote completion payload. `errors` is `None` for assisted solves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub seconds: u64,
    pub errors: Option<u32>,
}

/// One row of the remote completions list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRow {
    pub date: NaiveDate,
    pub seconds: Option<u64>,
    pub errors: Option<u32>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Remote store. Every call may fail.
pub trait Backend {
    /// Raw puzzle document, `None` when no puzzle is published for `date`.
    fn fetch_puzzle(&self, date: NaiveDate) -> Result<Option<Value>>;

    fn load_progress(&self, user: &str, date: NaiveDate) -> Result<Option<ProgressSnapshot>>;

    /// Upsert keyed by user and date.
    fn save_progress(&self, user: &str, date: NaiveDate, snapshot: &ProgressSnapshot) -> Result<()>;

    fn record_completion(&self, user: &str, date: NaiveDate, record: &CompletionRecord) -> Result<()>;

    /// Most recent first.
    fn list_completions(&self, user: &str, limit: usize) -> Result<Vec<CompletionRow>>;
}
