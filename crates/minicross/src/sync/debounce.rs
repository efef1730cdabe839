use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock;

/// Holds the latest value until `delay` passes without a newer one.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, DateTime<Utc>)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending value and restart the delay.
    pub fn schedule(&mut self, value: T, now: DateTime<Utc>) {
        self.pending = Some((value, clock::deadline_after(now, self.delay)));
    }

    /// The pending value, if its deadline has passed.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|(_, deadline)| clock::is_due(*deadline, now));
        if due { self.take() } else { None }
    }

    /// The pending value regardless of its deadline.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 27, 9, 0, 0).unwrap() + chrono::Duration::milliseconds(ms)
    }

    #[test]
    fn test_burst_collapses_to_last_value() {
        let mut debouncer = Debouncer::new(Duration::from_millis(800));
        debouncer.schedule(1, at(0));
        debouncer.schedule(2, at(300));
        debouncer.schedule(3, at(600));
        assert_eq!(debouncer.take_due(at(1000)), None);
        assert_eq!(debouncer.take_due(at(1400)), Some(3));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_take_ignores_deadline() {
        let mut debouncer = Debouncer::new(Duration::from_millis(800));
        debouncer.schedule("a", at(0));
        assert_eq!(debouncer.deadline(), Some(at(800)));
        assert_eq!(debouncer.take(), Some("a"));
        assert_eq!(debouncer.take(), None);
    }
}
