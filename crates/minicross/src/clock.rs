//! Time sources.
//!
//! - `Clock` - wall-clock reads for debounce deadlines, fades and cache TTLs
//! - `Stopwatch` - the per-puzzle timer, advanced one second per host tick
//! - `SaveCadence` - decides which elapsed-time events trigger a save and flush

use std::cell::Cell;
use std::time::Duration;

use chrono::{DateTime, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let step = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
        self.now.set(self.now.get() + step);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// `true` once `deadline` has been reached.
pub(crate) fn is_due(deadline: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= deadline
}

pub(crate) fn deadline_after(now: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    now + chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::zero())
}

/// Event emitted by the stopwatch on each counted second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Elapsed { seconds: u64 },
}

/// Puzzle timer.
///
/// The host calls [`Stopwatch::tick`] once per second; ticks while stopped are ignored.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    elapsed_secs: u64,
    running: bool,
    finished: bool,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously saved elapsed time, stopped.
    pub fn with_elapsed(elapsed_secs: u64) -> Self {
        Self {
            elapsed_secs,
            ..Self::default()
        }
    }

    pub fn start(&mut self) {
        if !self.finished {
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stop for good; later `start` calls are ignored until `reset`.
    pub fn finish(&mut self) {
        self.running = false;
        self.finished = true;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running || self.finished {
            return None;
        }
        self.elapsed_secs += 1;
        Some(TimerEvent::Elapsed {
            seconds: self.elapsed_secs,
        })
    }
}

/// Periodic save/flush policy listening to stopwatch events.
#[derive(Debug, Clone, Copy)]
pub struct SaveCadence {
    every_secs: u64,
}

impl SaveCadence {
    pub fn new(every_secs: u64) -> Self {
        Self {
            every_secs: every_secs.max(1),
        }
    }

    pub fn is_due(&self, event: TimerEvent) -> bool {
        match event {
            TimerEvent::Elapsed { seconds } => seconds > 0 && seconds % self.every_secs == 0,
        }
    }
}

impl Default for SaveCadence {
    fn default() -> Self {
        Self::new(crate::config::sync::FLUSH_EVERY_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2025, 9, 27, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::from_millis(1500));
        assert_eq!((clock.now() - start).num_milliseconds(), 1500);
    }

    #[test]
    fn test_stopwatch_ignores_ticks_while_stopped() {
        let mut watch = Stopwatch::new();
        assert_eq!(watch.tick(), None);
        watch.start();
        assert_eq!(watch.tick(), Some(TimerEvent::Elapsed { seconds: 1 }));
        watch.stop();
        assert_eq!(watch.tick(), None);
        assert_eq!(watch.elapsed_secs(), 1);
    }

    #[test]
    fn test_finished_stopwatch_cannot_restart() {
        let mut watch = Stopwatch::with_elapsed(42);
        watch.start();
        watch.finish();
        watch.start();
        assert!(!watch.is_running());
        assert_eq!(watch.tick(), None);
        watch.reset();
        assert_eq!(watch.elapsed_secs(), 0);
        assert!(!watch.is_finished());
    }

    #[test]
    fn test_save_cadence() {
        let cadence = SaveCadence::new(10);
        assert!(!cadence.is_due(TimerEvent::Elapsed { seconds: 9 }));
        assert!(cadence.is_due(TimerEvent::Elapsed { seconds: 10 }));
        assert!(cadence.is_due(TimerEvent::Elapsed { seconds: 20 }));
        assert!(!cadence.is_due(TimerEvent::Elapsed { seconds: 21 }));
    }
}
