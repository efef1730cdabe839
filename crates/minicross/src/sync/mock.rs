//! In-memory backend for tests.
//!
//! Holds puzzles, progress and completions in memory and can be told to fail,
//! either entirely (offline) or only for writes touching particular dates.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{Error, Result};

use super::backend::{Backend, CompletionRecord, CompletionRow, ProgressSnapshot};

#[derive(Debug, Default)]
pub struct MockBackend {
    puzzles: RefCell<HashMap<NaiveDate, Value>>,
    progress: RefCell<HashMap<(String, NaiveDate), ProgressSnapshot>>,
    completions: RefCell<Vec<(String, NaiveDate, CompletionRecord)>>,
    offline: Cell<bool>,
    failing_dates: RefCell<HashSet<NaiveDate>>,
    fetch_calls: Cell<usize>,
    write_calls: Cell<usize>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_puzzle(self, date: NaiveDate, doc: Value) -> Self {
        self.puzzles.borrow_mut().insert(date, doc);
        self
    }

    pub fn with_progress(self, user: &str, date: NaiveDate, snapshot: ProgressSnapshot) -> Self {
        self.progress
            .borrow_mut()
            .insert((user.to_string(), date), snapshot);
        self
    }

    /// Fail every call.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    /// Fail writes for `date` until cleared.
    pub fn fail_writes_for(&self, date: NaiveDate) {
        self.failing_dates.borrow_mut().insert(date);
    }

    pub fn clear_failures(&self) {
        self.failing_dates.borrow_mut().clear();
        self.offline.set(false);
    }

    pub fn progress_for(&self, user: &str, date: NaiveDate) -> Option<ProgressSnapshot> {
        self.progress
            .borrow()
            .get(&(user.to_string(), date))
            .cloned()
    }

    pub fn completions(&self) -> Vec<(String, NaiveDate, CompletionRecord)> {
        self.completions.borrow().clone()
    }

    /// Number of `fetch_puzzle` and `load_progress` calls made.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.get()
    }

    /// Number of write attempts, failed ones included.
    pub fn write_calls(&self) -> usize {
        self.write_calls.get()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.get() {
            Err(Error::backend("network unreachable"))
        } else {
            Ok(())
        }
    }

    fn check_write(&self, date: NaiveDate) -> Result<()> {
        self.write_calls.set(self.write_calls.get() + 1);
        self.check_online()?;
        if self.failing_dates.borrow().contains(&date) {
            return Err(Error::backend(format!("write rejected for {}", date)));
        }
        Ok(())
    }
}

impl Backend for MockBackend {
    fn fetch_puzzle(&self, date: NaiveDate) -> Result<Option<Value>> {
        self.fetch_calls.set(self.fetch_calls.get() + 1);
        self.check_online()?;
        Ok(self.puzzles.borrow().get(&date).cloned())
    }

    fn load_progress(&self, user: &str, date: NaiveDate) -> Result<Option<ProgressSnapshot>> {
        self.fetch_calls.set(self.fetch_calls.get() + 1);
        self.check_online()?;
        Ok(self.progress_for(user, date))
    }

    fn save_progress(&self, user: &str, date: NaiveDate, snapshot: &ProgressSnapshot) -> Result<()> {
        self.check_write(date)?;
        self.progress
            .borrow_mut()
            .insert((user.to_string(), date), snapshot.clone());
        Ok(())
    }

    fn record_completion(&self, user: &str, date: NaiveDate, record: &CompletionRecord) -> Result<()> {
        self.check_write(date)?;
        self.completions
            .borrow_mut()
            .push((user.to_string(), date, *record));
        Ok(())
    }

    fn list_completions(&self, user: &str, limit: usize) -> Result<Vec<CompletionRow>> {
        self.check_online()?;
        let mut rows: Vec<CompletionRow> = self
            .completions
            .borrow()
            .iter()
            .filter(|(u, _, _)| u == user)
            .map(|(_, date, record)| CompletionRow {
                date: *date,
                seconds: Some(record.seconds),
                errors: record.errors,
                finished_at: None,
            })
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.truncate(limit);
        Ok(rows)
    }
}
