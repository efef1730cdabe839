//! Local-first progress persistence.
//!
//! Every save lands in the local store before the remote upsert is tried, so
//! a failed or skipped remote write never loses entries. Remote failures are
//! handed to the [`SyncQueue`], and so is every write made while the store is
//! marked offline. Local copies are kept per player.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;
use strum::Display;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config;
use crate::error::Result;
use crate::puzzle::validate_document;
use crate::retry::RetryStrategy;
use crate::storage::{CacheEntry, LocalStore, keys, read_fresh, read_json, write_json};

use super::SyncTrigger;
use super::backend::{Backend, CompletionRecord, CompletionRow, IdentityProvider, ProgressSnapshot};
use super::debounce::Debouncer;
use super::queue::{FlushReport, SyncPayload, SyncQueue};

/// Where a save ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SaveOutcome {
    /// Written locally and remotely.
    Synced,
    /// Written locally only; nobody is signed in.
    Offline,
    /// Written locally; the remote write is waiting in the queue.
    Queued,
}

pub struct ProgressStore {
    store: Rc<dyn LocalStore>,
    backend: Rc<dyn Backend>,
    identity: Rc<dyn IdentityProvider>,
    queue: Rc<SyncQueue>,
    clock: Rc<dyn Clock>,
    cache_ttl: Duration,
    online: Cell<bool>,
    pending: RefCell<Debouncer<(NaiveDate, ProgressSnapshot)>>,
}

impl ProgressStore {
    pub fn new(
        store: Rc<dyn LocalStore>,
        backend: Rc<dyn Backend>,
        identity: Rc<dyn IdentityProvider>,
        queue: Rc<SyncQueue>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            backend,
            identity,
            queue,
            clock,
            cache_ttl: Duration::from_secs(config::cache::TTL_SECS),
            online: Cell::new(true),
            pending: RefCell::new(Debouncer::new(Duration::from_millis(
                config::debounce::PROGRESS_SAVE_MS,
            ))),
        }
    }

    /// Override the save debounce window.
    pub fn with_debounce(self, delay: Duration) -> Self {
        self.pending.replace(Debouncer::new(delay));
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn queue(&self) -> &Rc<SyncQueue> {
        &self.queue
    }

    pub fn current_user(&self) -> Option<String> {
        self.identity.current_user()
    }

    /// While offline, remote reads are skipped and remote writes go straight
    /// to the queue.
    pub fn set_online(&self, online: bool) {
        self.online.set(online);
    }

    pub fn is_online(&self) -> bool {
        self.online.get()
    }

    /// Last known progress for `date`.
    ///
    /// Signed in: remote first, cached locally on success; the local copy is
    /// used only while fresh. Anonymous: the local copy is the record itself.
    /// Only the current player's local copy is ever read.
    pub fn load(&self, date: NaiveDate) -> Option<ProgressSnapshot> {
        let user = self.identity.current_user();
        let key = keys::progress(user.as_deref(), date);
        let Some(user) = user else {
            return read_json::<CacheEntry<ProgressSnapshot>>(self.store.as_ref(), &key)
                .map(|entry| entry.value);
        };

        if self.is_online() {
            match self.backend.load_progress(&user, date) {
                Ok(Some(snapshot)) => {
                    self.write_local(Some(user.as_str()), date, &snapshot);
                    return Some(snapshot);
                }
                Ok(None) => debug!("No remote progress for {}", date),
                Err(e) => warn!("Failed to load remote progress for {}: {}", date, e),
            }
        }
        read_fresh(self.store.as_ref(), &key, self.clock.now(), self.cache_ttl)
    }

    /// Save after the debounce window, replacing any save still pending.
    pub fn schedule_save(&self, date: NaiveDate, snapshot: ProgressSnapshot) {
        let previous = {
            let mut pending = self.pending.borrow_mut();
            let replaced = pending.take();
            pending.schedule((date, snapshot), self.clock.now());
            replaced.filter(|(previous_date, _)| *previous_date != date)
        };
        if let Some((previous_date, previous)) = previous {
            self.save_now(previous_date, previous);
        }
    }

    /// Perform the pending save if its window has passed.
    pub fn poll(&self) -> Option<SaveOutcome> {
        let due = self.pending.borrow_mut().take_due(self.clock.now());
        due.map(|(date, snapshot)| self.save_now(date, snapshot))
    }

    /// Perform the pending save immediately.
    pub fn flush(&self) -> Option<SaveOutcome> {
        let pending = self.pending.borrow_mut().take();
        pending.map(|(date, snapshot)| self.save_now(date, snapshot))
    }

    pub fn has_pending_save(&self) -> bool {
        self.pending.borrow().is_pending()
    }

    /// Drop the pending save without writing it.
    pub fn cancel_pending(&self) {
        self.pending.borrow_mut().take();
    }

    pub fn save_now(&self, date: NaiveDate, mut snapshot: ProgressSnapshot) -> SaveOutcome {
        snapshot.updated_at = Some(self.clock.now());
        let user = self.identity.current_user();
        self.write_local(user.as_deref(), date, &snapshot);

        let Some(user) = user else {
            return SaveOutcome::Offline;
        };
        if !self.is_online() {
            debug!("Offline, queueing progress for {}", date);
            self.queue
                .enqueue(Some(user.as_str()), date, SyncPayload::Progress(snapshot));
            return SaveOutcome::Queued;
        }
        match self.backend.save_progress(&user, date, &snapshot) {
            Ok(()) => {
                debug!("Saved progress for {}", date);
                SaveOutcome::Synced
            }
            Err(e) => {
                warn!("Progress save for {} failed, queueing: {}", date, e);
                self.queue
                    .enqueue(Some(user.as_str()), date, SyncPayload::Progress(snapshot));
                SaveOutcome::Queued
            }
        }
    }

    /// Record a finished solve. Without an identity the record waits in the
    /// queue until someone signs in.
    pub fn record_completion(&self, date: NaiveDate, record: CompletionRecord) -> SaveOutcome {
        let Some(user) = self.identity.current_user() else {
            info!("No signed-in user, queueing completion for {}", date);
            self.queue.enqueue(None, date, SyncPayload::Completion(record));
            return SaveOutcome::Queued;
        };
        if !self.is_online() {
            info!("Offline, queueing completion for {}", date);
            self.queue
                .enqueue(Some(user.as_str()), date, SyncPayload::Completion(record));
            return SaveOutcome::Queued;
        }
        match self.backend.record_completion(&user, date, &record) {
            Ok(()) => {
                let key = keys::progress(Some(user.as_str()), date);
                let mut snapshot = read_json::<CacheEntry<ProgressSnapshot>>(self.store.as_ref(), &key)
                    .map(|entry| entry.value)
                    .unwrap_or_default();
                snapshot.completed = true;
                snapshot.seconds = record.seconds;
                self.write_local(Some(user.as_str()), date, &snapshot);
                info!("Recorded completion for {} in {}s", date, record.seconds);
                SaveOutcome::Synced
            }
            Err(e) => {
                warn!("Completion record for {} failed, queueing: {}", date, e);
                self.queue
                    .enqueue(Some(user.as_str()), date, SyncPayload::Completion(record));
                SaveOutcome::Queued
            }
        }
    }

    /// Puzzle document for `date`: fresh cache, then remote. `None` lets the
    /// caller fall back to the bundled puzzle. Only documents that pass shape
    /// validation are cached; invalid ones are still returned so the caller
    /// decides how to treat them.
    pub fn fetch_puzzle(&self, date: NaiveDate) -> Option<Value> {
        let key = keys::puzzle(date);
        if let Some(doc) = read_fresh(self.store.as_ref(), &key, self.clock.now(), self.cache_ttl) {
            debug!("Puzzle cache hit for {}", date);
            return Some(doc);
        }
        if !self.is_online() {
            return None;
        }
        match self.backend.fetch_puzzle(date) {
            Ok(Some(doc)) => {
                let problems = validate_document(&doc);
                if problems.is_empty() {
                    write_json(
                        self.store.as_ref(),
                        &key,
                        &CacheEntry::new(&doc, self.clock.now()),
                    );
                } else {
                    debug!("Not caching invalid puzzle for {}: {:?}", date, problems);
                }
                Some(doc)
            }
            Ok(None) => {
                info!("No puzzle published for {}", date);
                None
            }
            Err(e) => {
                warn!("Failed to fetch puzzle for {}: {}", date, e);
                None
            }
        }
    }

    /// Remote completions for the signed-in user, newest first.
    pub fn list_completions(&self, limit: usize) -> Result<Vec<CompletionRow>> {
        match self.identity.current_user() {
            Some(user) => self.backend.list_completions(&user, limit),
            None => Ok(Vec::new()),
        }
    }

    /// Replay the queue once per operation.
    pub fn sync(&self, trigger: SyncTrigger) -> FlushReport {
        debug!("Flushing sync queue ({})", trigger);
        self.queue.flush(self.backend.as_ref(), self.identity.as_ref())
    }

    pub fn sync_with<S: RetryStrategy>(&self, trigger: SyncTrigger, strategy: &S) -> FlushReport {
        debug!("Flushing sync queue ({})", trigger);
        self.queue
            .flush_with(self.backend.as_ref(), self.identity.as_ref(), strategy)
    }

    fn write_local(&self, user: Option<&str>, date: NaiveDate, snapshot: &ProgressSnapshot) {
        write_json(
            self.store.as_ref(),
            &keys::progress(user, date),
            &CacheEntry::new(snapshot, self.clock.now()),
        );
    }
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("cache_ttl", &self.cache_ttl)
            .field("online", &self.is_online())
            .field("pending_save", &self.has_pending_save())
            .field("queue", &self.queue)
            .finish()
    }
}
