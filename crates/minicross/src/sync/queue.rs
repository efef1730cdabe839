//! Durable queue of remote writes that could not be delivered.
//!
//! Operations are appended on failure and removed only when a later flush
//! delivers them; they are never edited. The queue mirrors itself into the
//! local store on every change and notifies subscribers with the new count.
//!
//! Each operation remembers who queued it. A flush only replays the signed-in
//! user's operations plus those queued while nobody was signed in.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::Result;
use crate::retry::{NoRetry, RetryStrategy};
use crate::storage::{LocalStore, keys, read_json, write_json};

use super::backend::{Backend, CompletionRecord, IdentityProvider, ProgressSnapshot};

/// The write to replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum SyncPayload {
    Progress(ProgressSnapshot),
    Completion(CompletionRecord),
}

impl SyncPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Progress(_) => "progress",
            Self::Completion(_) => "completion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOperation {
    pub id: String,
    /// Owner; `None` when queued while signed out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub payload: SyncPayload,
    pub created_at: DateTime<Utc>,
}

/// Result of one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub attempted: usize,
    pub delivered: usize,
    pub remaining: usize,
    /// Nobody was signed in, so nothing was attempted.
    pub no_identity: bool,
}

/// Handle returned by [`SyncQueue::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

type Listener = Rc<dyn Fn(usize)>;

pub struct SyncQueue {
    store: Rc<dyn LocalStore>,
    clock: Rc<dyn Clock>,
    ops: RefCell<Vec<SyncOperation>>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener: Cell<u64>,
    seq: Cell<u64>,
}

impl SyncQueue {
    /// Open the queue, restoring operations persisted by earlier runs.
    pub fn new(store: Rc<dyn LocalStore>, clock: Rc<dyn Clock>) -> Self {
        let ops: Vec<SyncOperation> = read_json(store.as_ref(), &keys::queue()).unwrap_or_default();
        if !ops.is_empty() {
            info!("Restored {} pending sync operations", ops.len());
        }
        Self {
            store,
            clock,
            ops: RefCell::new(ops),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            seq: Cell::new(0),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.ops.borrow().len()
    }

    pub fn operations(&self) -> Vec<SyncOperation> {
        self.ops.borrow().clone()
    }

    /// Operations a flush as `user` would replay.
    pub fn pending_for(&self, user: &str) -> usize {
        self.ops
            .borrow()
            .iter()
            .filter(|op| op.belongs_to(user))
            .count()
    }

    /// Append an operation with a fresh id.
    pub fn enqueue(
        &self,
        user: Option<&str>,
        date: NaiveDate,
        payload: SyncPayload,
    ) -> SyncOperation {
        let now = self.clock.now();
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        let op = SyncOperation {
            id: format!("{}:{}:{}-{}", payload.kind(), date, now.timestamp_millis(), seq),
            user: user.map(str::to_string),
            date,
            payload,
            created_at: now,
        };
        debug!("Queued {}", op.id);
        self.ops.borrow_mut().push(op.clone());
        self.changed();
        op
    }

    /// Replay every operation once.
    pub fn flush(&self, backend: &dyn Backend, identity: &dyn IdentityProvider) -> FlushReport {
        self.flush_with(backend, identity, &NoRetry::new())
    }

    /// Replay every operation, retrying each according to `strategy`.
    ///
    /// Operations are independent: failures stay queued in their original
    /// order and deliveries are removed. Other users' operations are left
    /// untouched.
    pub fn flush_with<S: RetryStrategy>(
        &self,
        backend: &dyn Backend,
        identity: &dyn IdentityProvider,
        strategy: &S,
    ) -> FlushReport {
        let Some(user) = identity.current_user() else {
            return FlushReport {
                remaining: self.pending_count(),
                no_identity: true,
                ..FlushReport::default()
            };
        };
        let pending: Vec<SyncOperation> = self
            .operations()
            .into_iter()
            .filter(|op| op.belongs_to(&user))
            .collect();
        if pending.is_empty() {
            return FlushReport {
                remaining: self.pending_count(),
                ..FlushReport::default()
            };
        }

        let mut delivered_ids = Vec::new();
        for op in &pending {
            match strategy.execute(|_| deliver(backend, &user, op)) {
                Ok(()) => {
                    debug!("Delivered {}", op.id);
                    delivered_ids.push(op.id.clone());
                }
                Err(e) => warn!("Sync of {} failed: {}", op.id, e),
            }
        }

        let delivered = delivered_ids.len();
        if delivered > 0 {
            self.ops
                .borrow_mut()
                .retain(|op| !delivered_ids.contains(&op.id));
            self.changed();
        }
        let report = FlushReport {
            attempted: pending.len(),
            delivered,
            remaining: self.pending_count(),
            no_identity: false,
        };
        info!(
            "Sync flush: {} delivered, {} remaining",
            report.delivered, report.remaining
        );
        report
    }

    /// Call `listener` with the pending count after every change.
    pub fn subscribe(&self, listener: impl Fn(usize) + 'static) -> Subscription {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        Subscription(id)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription.0);
        listeners.len() != before
    }

    /// Drop every pending operation.
    pub fn clear(&self) {
        if self.ops.borrow().is_empty() {
            return;
        }
        self.ops.borrow_mut().clear();
        self.changed();
    }

    fn changed(&self) {
        let ops = self.operations();
        write_json(self.store.as_ref(), &keys::queue(), &ops);

        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(ops.len());
        }
    }
}

impl SyncOperation {
    fn belongs_to(&self, user: &str) -> bool {
        self.user.as_deref().is_none_or(|owner| owner == user)
    }
}

fn deliver(backend: &dyn Backend, user: &str, op: &SyncOperation) -> Result<()> {
    match &op.payload {
        SyncPayload::Progress(snapshot) => backend.save_progress(user, op.date, snapshot),
        SyncPayload::Completion(record) => backend.record_completion(user, op.date, record),
    }
}

impl std::fmt::Debug for SyncQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncQueue")
            .field("pending", &self.pending_count())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
