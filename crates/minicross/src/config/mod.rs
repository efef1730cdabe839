//! Configuration.
//!
//! This module contains:
//! - Timing constants for persistence, feedback and sync
//! - `Config`, the runtime options a host can override (usually from a file)

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Progress save debouncing.
///
/// Bursts of keystrokes within the window collapse into one save.
pub mod debounce {
    /// Delay (in ms) between the last edit and the progress save.
    pub const PROGRESS_SAVE_MS: u64 = 800;
}

/// Check feedback configuration.
pub mod feedback {
    /// Delay (in ms) before a single-square `incorrect` mark fades.
    pub const FADE_MS: u64 = 1200;
}

/// Local cache configuration.
pub mod cache {
    /// Lifetime of a cached puzzle or progress snapshot (10 minutes).
    pub const TTL_SECS: u64 = 10 * 60;
}

/// Sync queue configuration.
pub mod sync {
    /// Elapsed-time interval (in timer seconds) between periodic saves and flushes.
    pub const FLUSH_EVERY_SECS: u64 = 10;

    /// Default number of completions listed from the remote store.
    pub const COMPLETIONS_LIMIT: usize = 200;
}

/// Remote write retry configuration.
///
/// Exponential backoff: 250ms → 500ms → 1000ms = total ~1.75s max per operation.
pub mod retry {
    /// Maximum number of attempts per queued operation during a flush.
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Delay (in ms) after each failed attempt.
    pub const RETRY_DELAYS_MS: [u64; 3] = [250, 500, 1000];
}

/// Runtime options for a play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fail hard on malformed puzzle documents instead of falling back.
    pub strict_validation: bool,
    /// Skip filled and locked squares when moving with the arrow keys.
    pub smart_navigation: bool,
    /// Advance the cursor after revealing a single square.
    pub advance_on_reveal: bool,
    pub save_debounce_ms: u64,
    pub feedback_fade_ms: u64,
    pub cache_ttl_secs: u64,
    pub flush_every_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict_validation: false,
            smart_navigation: true,
            advance_on_reveal: true,
            save_debounce_ms: debounce::PROGRESS_SAVE_MS,
            feedback_fade_ms: feedback::FADE_MS,
            cache_ttl_secs: cache::TTL_SECS,
            flush_every_secs: sync::FLUSH_EVERY_SECS,
        }
    }
}

impl Config {
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn feedback_fade(&self) -> Duration {
        Duration::from_millis(self.feedback_fade_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
