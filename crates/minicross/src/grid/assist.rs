//! Check, reveal and clear.
//!
//! Each operation targets a [`Scope`]: the active square, the word under the
//! cursor, or the whole puzzle. Checking a single square schedules its
//! `incorrect` mark to fade; callers drive the fade with [`Board::expire_feedback`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::clock;
use crate::puzzle::Pos;

use super::board::{Board, Change, Fade, Rejection};
use super::Feedback;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Scope {
    Square,
    Word,
    Puzzle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Mark empty squares incorrect instead of leaving them unmarked.
    pub treat_empty_as_incorrect: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOptions {
    /// Also clear revealed squares.
    pub include_revealed: bool,
    /// Drop feedback marks along with letters.
    pub clear_marks: bool,
}

impl Default for ClearOptions {
    fn default() -> Self {
        Self {
            include_revealed: false,
            clear_marks: true,
        }
    }
}

impl Board {
    fn scope_cells(&self, scope: Scope) -> Result<Vec<Pos>, Rejection> {
        match scope {
            Scope::Square => {
                let pos = self.cursor.pos;
                if self.puzzle.is_block(pos) {
                    Err(Rejection::Block)
                } else {
                    Ok(vec![pos])
                }
            }
            Scope::Word => self
                .current_run()
                .map(|run| run.cells.clone())
                .ok_or(Rejection::NoActiveWord),
            Scope::Puzzle => Ok(self.puzzle.playable().collect()),
        }
    }

    /// Mark squares correct or incorrect against the solution.
    pub fn check(&mut self, scope: Scope, options: CheckOptions, now: DateTime<Utc>) -> Change {
        if self.paused {
            return Change::Rejected(Rejection::Paused);
        }
        let cells = match self.scope_cells(scope) {
            Ok(cells) => cells,
            Err(rejection) => return Change::Rejected(rejection),
        };

        let mut incorrect = 0;
        for pos in cells {
            let mark = match self.entry(pos) {
                None if options.treat_empty_as_incorrect => Feedback::Incorrect,
                None => Feedback::None,
                Some(guess) if Some(guess) == self.puzzle.solution(pos) => Feedback::Correct,
                Some(_) => {
                    self.error_cells.insert(pos);
                    Feedback::Incorrect
                }
            };
            self.set_feedback(pos, mark);
            if mark == Feedback::Incorrect {
                incorrect += 1;
                if scope == Scope::Square {
                    self.fades.push(Fade {
                        pos,
                        deadline: clock::deadline_after(now, self.feedback_fade),
                    });
                }
            }
        }

        let newly_locked = self.lock_solved_runs();
        debug!(
            "Checked {} on {}: {} incorrect, {} newly locked",
            scope, self.puzzle.date, incorrect, newly_locked
        );
        Change::Checked {
            incorrect,
            newly_locked,
        }
    }

    /// Lock every square of every run whose letters all match. Idempotent.
    pub fn lock_solved_runs(&mut self) -> usize {
        let solved_cells: Vec<Pos> = self
            .numbering
            .all_runs()
            .filter(|run| {
                run.cells
                    .iter()
                    .all(|p| self.entry(*p) == self.puzzle.solution(*p))
            })
            .flat_map(|run| run.cells.iter().copied())
            .collect();

        let mut newly_locked = 0;
        for pos in solved_cells {
            if !self.locked[pos] {
                self.locked[pos] = true;
                newly_locked += 1;
            }
        }
        newly_locked
    }

    /// Fill squares with their solution and flag them revealed.
    ///
    /// With `advance`, a single-square reveal moves the cursor to the next
    /// open square in the current direction.
    pub fn reveal(&mut self, scope: Scope, advance: bool) -> Change {
        if self.paused {
            return Change::Rejected(Rejection::Paused);
        }
        let cells = match self.scope_cells(scope) {
            Ok(cells) => cells,
            Err(rejection) => return Change::Rejected(rejection),
        };

        let mut changed = false;
        for pos in cells {
            if self.is_locked(pos) {
                continue;
            }
            let Some(answer) = self.puzzle.solution(pos) else {
                continue;
            };
            self.entries[pos] = Some(answer);
            self.set_feedback(pos, Feedback::Correct);
            self.revealed[pos] = true;
            self.ever_revealed = true;
            changed = true;
        }

        let mut moved = false;
        if scope == Scope::Square
            && advance
            && let Some(next) = self.raw_step(self.cursor.pos, self.cursor.direction.delta())
        {
            self.cursor.pos = next;
            moved = true;
        }

        if !changed {
            return if moved { Change::Moved } else { Change::Unchanged };
        }
        Change::Edited {
            solved_now: self.evaluate_solved(),
        }
    }

    /// Blank squares. Locked squares are never touched.
    pub fn clear(&mut self, scope: Scope, options: ClearOptions) -> Change {
        if self.paused {
            return Change::Rejected(Rejection::Paused);
        }
        let cells = match self.scope_cells(scope) {
            Ok(cells) => cells,
            Err(rejection) => return Change::Rejected(rejection),
        };

        let mut changed = false;
        for pos in cells {
            if self.is_locked(pos) || (self.revealed[pos] && !options.include_revealed) {
                continue;
            }
            if self.entries[pos].take().is_some() {
                changed = true;
            }
            self.revealed[pos] = false;
            if options.clear_marks {
                self.set_feedback(pos, Feedback::None);
            }
        }

        if changed {
            Change::Edited { solved_now: false }
        } else {
            Change::Unchanged
        }
    }

    /// Drop `incorrect` marks whose fade deadline has passed. Returns how many faded.
    pub fn expire_feedback(&mut self, now: DateTime<Utc>) -> usize {
        let (due, pending): (Vec<Fade>, Vec<Fade>) = self
            .fades
            .drain(..)
            .partition(|fade| clock::is_due(fade.deadline, now));
        self.fades = pending;

        let mut faded = 0;
        for fade in due {
            if self.feedback[fade.pos] == Feedback::Incorrect {
                self.feedback[fade.pos] = Feedback::None;
                faded += 1;
            }
        }
        faded
    }

    /// Earliest pending fade, for hosts that schedule their own wake-ups.
    pub fn next_fade_deadline(&self) -> Option<DateTime<Utc>> {
        self.fades.iter().map(|fade| fade.deadline).min()
    }
}

#[cfg(test)]
mod tests {
    use super::super::board::tests::{board, solution_rows};
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 27, 9, 0, 0).unwrap()
    }

    fn after(ms: i64) -> DateTime<Utc> {
        now() + chrono::Duration::milliseconds(ms)
    }

    #[test]
    fn test_square_check_marks_incorrect_then_fades() {
        let mut board = board();
        let pos = Pos::new(0, 1);
        board.place_letter('Z');
        board.select_cell(pos);
        board.toggle_direction();

        let change = board.check(Scope::Square, CheckOptions::default(), now());
        assert!(matches!(change, Change::Checked { incorrect: 1, .. }));
        assert_eq!(board.feedback(pos), Feedback::Incorrect);

        assert_eq!(board.expire_feedback(after(1199)), 0);
        assert_eq!(board.feedback(pos), Feedback::Incorrect);

        assert_eq!(board.expire_feedback(after(1200)), 1);
        assert_eq!(board.feedback(pos), Feedback::None);
        assert_eq!(board.entry(pos), Some('Z'));
        assert_eq!(board.error_count(), 1);
    }

    #[test]
    fn test_overwritten_mark_does_not_fade() {
        let mut board = board();
        let pos = Pos::new(0, 1);
        board.entries[pos] = Some('Z');
        board.check(Scope::Square, CheckOptions::default(), now());
        assert!(board.next_fade_deadline().is_some());

        // Re-check as part of the word; the new mark replaces the pending fade
        board.check(Scope::Word, CheckOptions::default(), after(100));
        assert!(board.next_fade_deadline().is_none());
        board.expire_feedback(after(5000));
        assert_eq!(board.feedback(pos), Feedback::Incorrect);
    }

    #[test]
    fn test_empty_squares_unmarked_unless_requested() {
        let mut board = board();
        board.check(Scope::Word, CheckOptions::default(), now());
        assert_eq!(board.feedback(Pos::new(0, 2)), Feedback::None);

        let strict = CheckOptions {
            treat_empty_as_incorrect: true,
        };
        board.check(Scope::Puzzle, strict, now());
        assert_eq!(board.feedback(Pos::new(0, 2)), Feedback::Incorrect);
        // Empty squares never enter the error tally
        assert_eq!(board.error_count(), 0);
    }

    #[test]
    fn test_error_tally_survives_correction() {
        let mut board = board();
        let pos = Pos::new(0, 1);
        board.entries[pos] = Some('Q');
        board.check(Scope::Square, CheckOptions::default(), now());
        board.erase();
        board.place_letter('A');
        assert_eq!(board.error_count(), 1);
    }

    #[test]
    fn test_check_locks_solved_words_idempotently() {
        let mut board = board();
        for (col, letter) in [(1, 'A'), (2, 'B'), (3, 'C')] {
            board.entries[Pos::new(0, col)] = Some(letter);
        }
        let first = board.check(Scope::Puzzle, CheckOptions::default(), now());
        assert_eq!(
            first,
            Change::Checked {
                incorrect: 0,
                newly_locked: 3
            }
        );
        let locked_after_first: Vec<bool> = board.puzzle().playable().map(|p| board.is_locked(p)).collect();

        let second = board.check(Scope::Puzzle, CheckOptions::default(), now());
        assert_eq!(
            second,
            Change::Checked {
                incorrect: 0,
                newly_locked: 0
            }
        );
        let locked_after_second: Vec<bool> = board.puzzle().playable().map(|p| board.is_locked(p)).collect();
        assert_eq!(locked_after_first, locked_after_second);
        assert!(!board.is_locked(Pos::new(1, 1)));
    }

    #[test]
    fn test_reveal_square_advances() {
        let mut board = board();
        let change = board.reveal(Scope::Square, true);
        assert_eq!(change, Change::Edited { solved_now: false });
        assert_eq!(board.entry(Pos::new(0, 1)), Some('A'));
        assert!(board.is_revealed(Pos::new(0, 1)));
        assert_eq!(board.feedback(Pos::new(0, 1)), Feedback::Correct);
        assert_eq!(board.cursor().pos, Pos::new(0, 2));
        assert!(board.is_assisted());
    }

    #[test]
    fn test_reveal_on_locked_square_only_moves() {
        let mut board = board();
        board.locked[Pos::new(0, 1)] = true;
        assert_eq!(board.reveal(Scope::Square, true), Change::Moved);
        assert_eq!(board.cursor().pos, Pos::new(0, 2));
        assert!(!board.is_revealed(Pos::new(0, 1)));
        assert!(!board.is_assisted());

        board.locked[Pos::new(0, 2)] = true;
        assert_eq!(board.reveal(Scope::Square, false), Change::Unchanged);
        assert_eq!(board.cursor().pos, Pos::new(0, 2));
    }

    #[test]
    fn test_reveal_puzzle_solves() {
        let mut board = board();
        assert_eq!(
            board.reveal(Scope::Puzzle, false),
            Change::Edited { solved_now: true }
        );
        assert!(board.is_solved());
        assert!(board.is_assisted());
        assert_eq!(board.reveal(Scope::Puzzle, false), Change::Unchanged);
    }

    #[test]
    fn test_clear_skips_revealed_unless_included() {
        let mut board = board();
        board.reveal(Scope::Square, false);
        board.entries[Pos::new(0, 2)] = Some('X');

        board.clear(Scope::Word, ClearOptions::default());
        assert_eq!(board.entry(Pos::new(0, 1)), Some('A'));
        assert_eq!(board.entry(Pos::new(0, 2)), None);

        let all = ClearOptions {
            include_revealed: true,
            ..ClearOptions::default()
        };
        board.clear(Scope::Word, all);
        assert_eq!(board.entry(Pos::new(0, 1)), None);
        assert!(!board.is_revealed(Pos::new(0, 1)));
        // Scoring still remembers the reveal
        assert!(board.is_assisted());
    }

    #[test]
    fn test_clear_never_touches_locked() {
        let mut board = board();
        board.hydrate(&solution_rows(&board));
        assert_eq!(
            board.clear(Scope::Puzzle, ClearOptions::default()),
            Change::Unchanged
        );
        assert!(board.is_complete());
    }

    #[test]
    fn test_assist_rejected_while_paused() {
        let mut board = board();
        board.set_paused(true);
        assert_eq!(
            board.check(Scope::Puzzle, CheckOptions::default(), now()),
            Change::Rejected(Rejection::Paused)
        );
        assert_eq!(
            board.reveal(Scope::Square, true),
            Change::Rejected(Rejection::Paused)
        );
    }

    #[test]
    fn test_custom_fade_delay() {
        let mut board = board().with_feedback_fade(Duration::from_millis(10));
        board.entries[Pos::new(0, 1)] = Some('Z');
        board.check(Scope::Square, CheckOptions::default(), now());
        assert_eq!(board.expire_feedback(after(10)), 1);
    }
}
