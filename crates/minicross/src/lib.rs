//! # minicross
//!
//! Core library for a daily mini crossword.
//!
//! This crate provides:
//! - Puzzle documents, validation and run numbering
//! - The board state machine (entries, feedback, cursor) with check/reveal/clear
//! - Completion scoring: personal records, streaks and history
//! - Offline-tolerant progress persistence and a replayable sync queue
//! - `PlaySession`, which wires all of the above for one puzzle date

pub mod clock;
pub mod config;
pub mod error;
pub mod grid;
pub mod numbering;
pub mod profile;
pub mod puzzle;
pub mod retry;
pub mod session;
pub mod share;
pub mod stats;
pub mod storage;
pub mod sync;

pub use clock::{Clock, ManualClock, SaveCadence, Stopwatch, SystemClock, TimerEvent};
pub use config::Config;
pub use error::{Error, Result};
pub use grid::{
    Arrow, Board, Change, CheckOptions, ClearOptions, Cursor, Feedback, Rejection, Scope,
};
pub use numbering::{ClueRef, Numbering, Run, compute_numbering};
pub use profile::{Profile, ProfileStore, ProfileUpdate};
pub use puzzle::{
    Direction, Pos, Puzzle, PuzzleSource, Square, ValidationOptions, bundled_puzzle,
    check_document, resolve_puzzle, validate_document,
};
pub use retry::{ExponentialBackoff, FixedDelay, NoRetry, RetryStrategy};
pub use session::{Applied, Command, CompletionSummary, PlaySession, SessionDeps};
pub use share::{StreakLine, build_share_text, format_clock, format_elapsed};
pub use stats::{CompletionEvaluator, CompletionInput, GUEST, Stats, StatsStore, Verdict};
pub use storage::{FileStore, LocalStore, MemoryStore};
pub use sync::{
    Backend, CompletionRecord, CompletionRow, FlushReport, IdentityProvider, MockBackend,
    ProgressSnapshot, ProgressStore, SaveOutcome, Subscription, SyncOperation, SyncPayload,
    SyncQueue, SyncTrigger, UserId,
};
