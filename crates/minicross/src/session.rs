//! One player working on one puzzle date.
//!
//! `PlaySession` owns the board and the timer and routes every accepted edit
//! into the progress store. Completion is detected from the board's
//! `solved_now` transition and applied to stats exactly once.

use std::rc::Rc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::clock::{Clock, SaveCadence, Stopwatch};
use crate::config::Config;
use crate::error::Result;
use crate::grid::{Arrow, Board, Change, CheckOptions, ClearOptions, Scope};
use crate::puzzle::{Direction, Pos, Puzzle, PuzzleSource, ValidationOptions, resolve_puzzle};
use crate::share::{StreakLine, build_share_text};
use crate::stats::{CompletionEvaluator, CompletionInput, GUEST, Stats, StatsStore, Verdict};
use crate::storage::LocalStore;
use crate::sync::{
    Backend, CompletionRecord, FlushReport, IdentityProvider, ProgressSnapshot, ProgressStore,
    SaveOutcome, SyncQueue, SyncTrigger,
};

/// Shared services a session is built from.
#[derive(Clone)]
pub struct SessionDeps {
    pub store: Rc<dyn LocalStore>,
    pub backend: Rc<dyn Backend>,
    pub identity: Rc<dyn IdentityProvider>,
    pub queue: Rc<SyncQueue>,
    pub clock: Rc<dyn Clock>,
}

/// A player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Letter(char),
    Backspace,
    Arrow(Arrow),
    ToggleDirection,
    NextClue,
    PrevClue,
    SelectCell(Pos),
    SelectClue(Direction, u32),
    Check(Scope, CheckOptions),
    Reveal(Scope),
    Clear(Scope, ClearOptions),
    TogglePause,
    Reset,
}

/// Result of the solve that finished the puzzle.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSummary {
    pub verdict: Verdict,
    pub stats: Stats,
    pub elapsed_secs: u64,
    pub assisted: bool,
    pub errors: u32,
    /// Where the remote completion record ended up.
    pub outcome: SaveOutcome,
}

/// What one command did.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub change: Change,
    /// Set only by the command that solved the puzzle.
    pub completion: Option<CompletionSummary>,
}

pub struct PlaySession {
    date: NaiveDate,
    streak_day: NaiveDate,
    source: PuzzleSource,
    board: Board,
    stopwatch: Stopwatch,
    cadence: SaveCadence,
    progress: ProgressStore,
    stats: StatsStore,
    evaluator: CompletionEvaluator,
    config: Config,
    clock: Rc<dyn Clock>,
    played_recorded: bool,
    /// An edit has started the clock since open or the last reset.
    started: bool,
    online: bool,
    visible: bool,
    completion: Option<CompletionSummary>,
}

impl PlaySession {
    /// Resolve the puzzle for `date` and restore saved progress.
    pub fn open(date: NaiveDate, config: Config, deps: SessionDeps) -> Result<Self> {
        let progress = ProgressStore::new(
            deps.store.clone(),
            deps.backend,
            deps.identity,
            deps.queue,
            deps.clock.clone(),
        )
        .with_debounce(config.save_debounce())
        .with_cache_ttl(config.cache_ttl());

        let remote = progress.fetch_puzzle(date);
        let options = ValidationOptions {
            strict_validation: config.strict_validation,
        };
        let (puzzle, source) = resolve_puzzle(date, remote.as_ref(), options)?;
        Ok(Self::with_puzzle(puzzle, source, config, deps.store, progress, deps.clock))
    }

    fn with_puzzle(
        puzzle: Puzzle,
        source: PuzzleSource,
        config: Config,
        store: Rc<dyn LocalStore>,
        progress: ProgressStore,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let date = puzzle.date;
        let mut board = Board::new(puzzle)
            .with_smart_navigation(config.smart_navigation)
            .with_feedback_fade(config.feedback_fade());
        let mut stopwatch = Stopwatch::new();

        if let Some(snapshot) = progress.load(date) {
            let solved = board.hydrate(&snapshot.entries);
            stopwatch = Stopwatch::with_elapsed(snapshot.seconds);
            if solved || snapshot.completed {
                stopwatch.finish();
            }
            debug!(
                "Restored progress for {} ({}s, solved: {})",
                date, snapshot.seconds, solved
            );
        }

        Self {
            date,
            streak_day: date,
            source,
            board,
            stopwatch,
            cadence: SaveCadence::new(config.flush_every_secs),
            progress,
            stats: StatsStore::new(store),
            evaluator: CompletionEvaluator::new(),
            config,
            clock,
            played_recorded: false,
            started: false,
            online: true,
            visible: true,
            completion: None,
        }
    }

    /// Calendar day credited for streaks; defaults to the puzzle date.
    pub fn with_streak_day(mut self, day: NaiveDate) -> Self {
        self.streak_day = day;
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn source(&self) -> PuzzleSource {
        self.source
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.stopwatch.elapsed_secs()
    }

    pub fn is_timer_running(&self) -> bool {
        self.stopwatch.is_running()
    }

    pub fn completion(&self) -> Option<&CompletionSummary> {
        self.completion.as_ref()
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn pending_sync(&self) -> usize {
        self.progress.queue().pending_count()
    }

    /// Stats of whoever is playing, the guest bucket when anonymous.
    pub fn stats(&self) -> Stats {
        self.stats.load(&self.stats_user())
    }

    pub fn apply(&mut self, command: Command) -> Applied {
        let change = match command {
            Command::Letter(ch) => self.board.place_letter(ch),
            Command::Backspace => self.board.erase(),
            Command::Arrow(arrow) => self.board.move_cursor(arrow),
            Command::ToggleDirection => self.board.toggle_direction(),
            Command::NextClue => self.board.next_clue(),
            Command::PrevClue => self.board.prev_clue(),
            Command::SelectCell(pos) => self.board.select_cell(pos),
            Command::SelectClue(direction, number) => self.board.select_clue(direction, number),
            Command::Check(scope, options) => self.board.check(scope, options, self.clock.now()),
            Command::Reveal(scope) => self.board.reveal(scope, self.config.advance_on_reveal),
            Command::Clear(scope, options) => self.board.clear(scope, options),
            Command::TogglePause => {
                self.toggle_pause();
                Change::Unchanged
            }
            Command::Reset => {
                self.reset();
                Change::Edited { solved_now: false }
            }
        };

        let completion = match change {
            Change::Edited { solved_now } if !matches!(command, Command::Reset) => {
                self.on_edit();
                if solved_now {
                    self.complete()
                } else {
                    self.progress.schedule_save(self.date, self.snapshot());
                    None
                }
            }
            _ => None,
        };
        Applied { change, completion }
    }

    /// Advance the timer by one second. Every `flush_every_secs` the current
    /// progress is saved and, when online, the queue is flushed.
    pub fn tick(&mut self) -> Option<SaveOutcome> {
        let mut outcome = self.poll();
        if let Some(event) = self.stopwatch.tick()
            && self.cadence.is_due(event)
        {
            self.progress.cancel_pending();
            outcome = Some(self.progress.save_now(self.date, self.snapshot()));
            if self.online {
                self.progress.sync(SyncTrigger::TimerTick);
            }
        }
        outcome
    }

    /// Fade expired feedback and perform a due debounced save.
    pub fn poll(&mut self) -> Option<SaveOutcome> {
        self.board.expire_feedback(self.clock.now());
        self.progress.poll()
    }

    /// Report connectivity. While offline every remote write is queued;
    /// coming back online flushes the queue.
    pub fn set_online(&mut self, online: bool) -> Option<FlushReport> {
        let restored = online && !self.online;
        self.online = online;
        self.progress.set_online(online);
        restored.then(|| self.progress.sync(SyncTrigger::ConnectivityRestored))
    }

    /// Report page visibility. Becoming visible while online flushes the queue.
    pub fn set_visible(&mut self, visible: bool) -> Option<FlushReport> {
        let shown = visible && !self.visible;
        self.visible = visible;
        (shown && self.online).then(|| self.progress.sync(SyncTrigger::BecameVisible))
    }

    pub fn sync_now(&self) -> FlushReport {
        self.progress.sync(SyncTrigger::Manual)
    }

    /// Save the current state now if anything was played, e.g. before the
    /// host exits.
    pub fn close(&mut self) -> Option<SaveOutcome> {
        if !self.played_recorded && !self.progress.has_pending_save() {
            return None;
        }
        self.progress.cancel_pending();
        Some(self.progress.save_now(self.date, self.snapshot()))
    }

    /// Share text for the finished solve.
    pub fn share_text(&self, site_url: &str) -> Option<String> {
        let summary = self.completion.as_ref()?;
        let streak = (summary.stats.current_streak > 0).then_some(StreakLine {
            current: summary.stats.current_streak,
            longest: Some(summary.stats.longest_streak),
        });
        Some(build_share_text(
            &self.board.puzzle().title,
            self.date,
            summary.elapsed_secs,
            summary.assisted,
            streak,
            site_url,
        ))
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            entries: self.board.entry_rows(),
            seconds: self.stopwatch.elapsed_secs(),
            completed: self.board.is_solved(),
            updated_at: None,
        }
    }

    fn stats_user(&self) -> String {
        self.progress
            .current_user()
            .unwrap_or_else(|| GUEST.to_string())
    }

    fn toggle_pause(&mut self) {
        if self.board.toggle_pause() {
            self.stopwatch.stop();
        } else if self.started {
            self.stopwatch.start();
        }
    }

    /// The first accepted edit starts the clock. Only the first one of the
    /// session counts as a play.
    fn on_edit(&mut self) {
        if !self.played_recorded {
            self.played_recorded = true;
            let user = self.stats_user();
            self.stats
                .bump_played(&user, Some(self.streak_day), self.clock.now());
        }
        self.started = true;
        self.stopwatch.start();
    }

    fn reset(&mut self) {
        self.board.reset();
        self.stopwatch.reset();
        self.started = false;
        self.evaluator.reset();
        self.completion = None;
        self.progress.cancel_pending();
        self.progress.save_now(self.date, self.snapshot());
        info!("Session for {} reset", self.date);
    }

    fn complete(&mut self) -> Option<CompletionSummary> {
        self.stopwatch.finish();
        self.progress.cancel_pending();
        self.progress.save_now(self.date, self.snapshot());

        let elapsed_secs = self.stopwatch.elapsed_secs();
        let assisted = self.board.is_assisted();
        let errors = self.board.error_count();
        let puzzle = self.board.puzzle();
        let input = CompletionInput {
            day: self.streak_day,
            elapsed_secs,
            assisted,
            errors,
            title: Some(puzzle.title.clone()),
            size: Some(puzzle.size),
            puzzle_key: Some(puzzle.key()),
        };

        let user = self.stats_user();
        let now = self.clock.now();
        let evaluator = &mut self.evaluator;
        let (stats, verdict) = self
            .stats
            .update(&user, |stats| evaluator.evaluate(stats, &input, now));
        let verdict = verdict?;

        let record = CompletionRecord {
            seconds: elapsed_secs,
            errors: (!assisted).then_some(errors),
        };
        let outcome = self.progress.record_completion(self.date, record);

        let summary = CompletionSummary {
            verdict,
            stats,
            elapsed_secs,
            assisted,
            errors,
            outcome,
        };
        self.completion = Some(summary.clone());
        Some(summary)
    }
}

impl std::fmt::Debug for PlaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaySession")
            .field("date", &self.date)
            .field("source", &self.source)
            .field("elapsed_secs", &self.stopwatch.elapsed_secs())
            .field("solved", &self.board.is_solved())
            .field("progress", &self.progress)
            .finish()
    }
}
