//! Progress persistence and remote sync.
//!
//! - `Backend` / `IdentityProvider` - the remote store and the signed-in user
//! - `ProgressStore` - debounced local-first progress saves, completion records,
//!   TTL-cached puzzle and progress reads
//! - `SyncQueue` - durable log of remote writes that failed, replayed on flush
//! - `MockBackend` - scriptable in-memory backend for tests and offline hosts
//!
//! Remote progress is an upsert keyed by user and date, so the last snapshot
//! written wins; concurrent edits from two devices are not merged.

mod backend;
mod debounce;
mod mock;
mod progress;
mod queue;

pub use backend::{
    Backend, CompletionRecord, CompletionRow, IdentityProvider, ProgressSnapshot, UserId,
};
pub use debounce::Debouncer;
pub use mock::MockBackend;
pub use progress::{ProgressStore, SaveOutcome};
pub use queue::{FlushReport, Subscription, SyncOperation, SyncPayload, SyncQueue};

use strum::{Display, EnumString};

/// What prompted a queue flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SyncTrigger {
    ConnectivityRestored,
    BecameVisible,
    TimerTick,
    Manual,
}
