use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{HistoryEntry, Stats, advance_streak};

/// Everything known about one finished solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionInput {
    pub day: NaiveDate,
    pub elapsed_secs: u64,
    /// At least one square was revealed.
    pub assisted: bool,
    /// Squares ever marked incorrect.
    pub errors: u32,
    pub title: Option<String>,
    pub size: Option<usize>,
    pub puzzle_key: Option<String>,
}

/// How a solve compares to the personal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// First clean solve on record.
    FirstRecord,
    /// Clean solve faster than the previous best.
    NewRecord { improvement_secs: u64 },
    /// Not a record; signed difference to the current best.
    Behind { delta_secs: i64 },
    /// Not a record and there is no best to compare with.
    Unranked,
}

impl Verdict {
    pub fn is_record(&self) -> bool {
        matches!(self, Self::FirstRecord | Self::NewRecord { .. })
    }
}

/// Fold one completion into `stats`.
pub fn apply_completion(stats: &mut Stats, input: &CompletionInput, now: DateTime<Utc>) -> Verdict {
    let t = input.elapsed_secs;

    stats.totals.completed += 1;
    if input.assisted {
        stats.totals.reveals += 1;
    }
    stats.totals.errors += u64::from(input.errors);
    stats.totals.total_time_secs += t;

    stats
        .completions_by_day
        .entry(input.day)
        .and_modify(|best| *best = (*best).min(t))
        .or_insert(t);

    let prev_best = stats.totals.best_time_secs;
    let clean = !input.assisted;
    if clean {
        stats.totals.best_time_secs = Some(prev_best.map_or(t, |b| b.min(t)));
        stats.last_clean_day = Some(input.day);
    }

    advance_streak(stats, input.day);

    stats.history.push(HistoryEntry {
        at: now,
        day: Some(input.day),
        title: input.title.clone(),
        puzzle_key: input.puzzle_key.clone(),
        size: input.size,
        errors: input.errors,
        assisted: input.assisted,
        elapsed_secs: t,
        completed: true,
        played: 0,
    });

    match (clean, prev_best, stats.totals.best_time_secs) {
        (true, None, _) => Verdict::FirstRecord,
        (true, Some(prev), _) if t < prev => Verdict::NewRecord {
            improvement_secs: prev - t,
        },
        (_, _, Some(best)) => Verdict::Behind {
            delta_secs: t as i64 - best as i64,
        },
        (_, _, None) => Verdict::Unranked,
    }
}

/// Applies a session's completion exactly once.
#[derive(Debug, Clone, Default)]
pub struct CompletionEvaluator {
    fired: bool,
}

impl CompletionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Apply the completion, or return `None` if this session already did.
    pub fn evaluate(
        &mut self,
        stats: &mut Stats,
        input: &CompletionInput,
        now: DateTime<Utc>,
    ) -> Option<Verdict> {
        if self.fired {
            debug!("Ignoring repeated completion for {}", input.day);
            return None;
        }
        self.fired = true;
        let verdict = apply_completion(stats, input, now);
        info!(
            "Completed {} in {}s (assisted: {}, errors: {}): {:?}",
            input.day, input.elapsed_secs, input.assisted, input.errors, verdict
        );
        Some(verdict)
    }

    /// Re-arm after a board reset.
    pub fn reset(&mut self) {
        self.fired = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 27, 10, 0, 0).unwrap()
    }

    fn input(day: u32, secs: u64, assisted: bool) -> CompletionInput {
        CompletionInput {
            day: NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
            elapsed_secs: secs,
            assisted,
            errors: 2,
            title: Some("Mini".to_string()),
            size: Some(5),
            puzzle_key: None,
        }
    }

    #[test]
    fn test_first_clean_solve_is_record() {
        let mut stats = Stats::default();
        let verdict = apply_completion(&mut stats, &input(1, 90, false), now());
        assert_eq!(verdict, Verdict::FirstRecord);
        assert_eq!(stats.totals.best_time_secs, Some(90));
        assert_eq!(stats.totals.completed, 1);
        assert_eq!(stats.totals.errors, 2);
        assert_eq!(stats.history.len(), 1);
    }

    #[test]
    fn test_faster_clean_solve_improves_best() {
        let mut stats = Stats::default();
        apply_completion(&mut stats, &input(1, 90, false), now());
        let verdict = apply_completion(&mut stats, &input(2, 60, false), now());
        assert_eq!(verdict, Verdict::NewRecord { improvement_secs: 30 });
        assert_eq!(stats.totals.best_time_secs, Some(60));
    }

    #[test]
    fn test_slower_clean_solve_reports_delta() {
        let mut stats = Stats::default();
        apply_completion(&mut stats, &input(1, 60, false), now());
        let verdict = apply_completion(&mut stats, &input(2, 75, false), now());
        assert_eq!(verdict, Verdict::Behind { delta_secs: 15 });
        assert_eq!(stats.totals.best_time_secs, Some(60));
    }

    #[test]
    fn test_tie_is_not_a_record() {
        let mut stats = Stats::default();
        apply_completion(&mut stats, &input(1, 60, false), now());
        let verdict = apply_completion(&mut stats, &input(2, 60, false), now());
        assert_eq!(verdict, Verdict::Behind { delta_secs: 0 });
    }

    #[test]
    fn test_assisted_solve_never_touches_best() {
        let mut stats = Stats::default();
        assert_eq!(
            apply_completion(&mut stats, &input(1, 10, true), now()),
            Verdict::Unranked
        );
        assert_eq!(stats.totals.best_time_secs, None);

        apply_completion(&mut stats, &input(2, 80, false), now());
        let verdict = apply_completion(&mut stats, &input(3, 20, true), now());
        assert_eq!(verdict, Verdict::Behind { delta_secs: -60 });
        assert_eq!(stats.totals.best_time_secs, Some(80));
        assert_eq!(stats.totals.reveals, 2);
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn test_best_of_day_includes_assisted() {
        let mut stats = Stats::default();
        apply_completion(&mut stats, &input(1, 50, false), now());
        apply_completion(&mut stats, &input(1, 30, true), now());
        apply_completion(&mut stats, &input(1, 40, false), now());
        let day = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert_eq!(stats.completions_by_day[&day], 30);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.last_clean_day, Some(day));
    }

    #[test]
    fn test_evaluator_fires_once() {
        let mut stats = Stats::default();
        let mut evaluator = CompletionEvaluator::new();
        assert!(evaluator.evaluate(&mut stats, &input(1, 60, false), now()).is_some());
        assert!(evaluator.evaluate(&mut stats, &input(1, 60, false), now()).is_none());
        assert_eq!(stats.totals.completed, 1);

        evaluator.reset();
        assert!(evaluator.evaluate(&mut stats, &input(1, 50, false), now()).is_some());
        assert_eq!(stats.totals.completed, 2);
    }
}
