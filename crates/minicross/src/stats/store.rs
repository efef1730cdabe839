use std::rc::Rc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::storage::{LocalStore, keys, read_json, write_json};

use super::Stats;

/// Stats bucket used when nobody is signed in.
pub const GUEST: &str = "guest";

/// Local persistence for per-user `Stats`.
#[derive(Clone)]
pub struct StatsStore {
    store: Rc<dyn LocalStore>,
}

impl StatsStore {
    pub fn new(store: Rc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub fn load(&self, user: &str) -> Stats {
        read_json::<Stats>(self.store.as_ref(), &keys::stats(user))
            .unwrap_or_default()
            .normalized()
    }

    pub fn save(&self, user: &str, stats: &Stats) -> bool {
        write_json(self.store.as_ref(), &keys::stats(user), stats)
    }

    /// Load, change and save in one step, returning the updated stats.
    pub fn update<R>(&self, user: &str, f: impl FnOnce(&mut Stats) -> R) -> (Stats, R) {
        let mut stats = self.load(user);
        let result = f(&mut stats);
        self.save(user, &stats);
        (stats, result)
    }

    pub fn bump_played(&self, user: &str, day: Option<NaiveDate>, now: DateTime<Utc>) -> Stats {
        self.update(user, |stats| stats.bump_played(day, now)).0
    }

    pub fn clear(&self, user: &str) {
        self.save(user, &Stats::default());
    }
}
