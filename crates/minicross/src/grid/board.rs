use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use strum::{Display, IntoStaticStr};
use tracing::debug;

use crate::config;
use crate::numbering::{Numbering, Run, compute_numbering};
use crate::puzzle::{Direction, Pos, Puzzle};

use super::{Feedback, Matrix};

/// Active square and typing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub pos: Pos,
    pub direction: Direction,
}

/// Why an input was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Rejection {
    Paused,
    Block,
    Locked,
    NotALetter,
    OutOfBounds,
    UnknownClue,
    NoActiveWord,
}

/// Outcome of one board input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Rejected(Rejection),
    /// Accepted but nothing moved or changed.
    Unchanged,
    /// Cursor position or direction changed.
    Moved,
    /// Entries changed. `solved_now` is true only on the transition into solved.
    Edited { solved_now: bool },
    /// Feedback marks were updated.
    Checked { incorrect: usize, newly_locked: usize },
}

impl Change {
    pub fn is_edit(&self) -> bool {
        matches!(self, Self::Edited { .. })
    }

    pub fn solved_now(&self) -> bool {
        matches!(self, Self::Edited { solved_now: true })
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Fade {
    pub(super) pos: Pos,
    pub(super) deadline: DateTime<Utc>,
}

/// Grid state for one puzzle date.
#[derive(Debug, Clone)]
pub struct Board {
    pub(super) puzzle: Puzzle,
    pub(super) numbering: Numbering,
    pub(super) entries: Matrix<Option<char>>,
    pub(super) feedback: Matrix<Feedback>,
    pub(super) revealed: Matrix<bool>,
    pub(super) locked: Matrix<bool>,
    pub(super) cursor: Cursor,
    pub(super) paused: bool,
    pub(super) smart_navigation: bool,
    pub(super) feedback_fade: Duration,
    /// Squares ever marked incorrect while holding a letter.
    pub(super) error_cells: BTreeSet<Pos>,
    pub(super) ever_revealed: bool,
    pub(super) solved: bool,
    pub(super) fades: Vec<Fade>,
}

impl Board {
    pub fn new(puzzle: Puzzle) -> Self {
        let size = puzzle.size;
        let numbering = compute_numbering(&puzzle.grid);
        let start = puzzle.first_playable().unwrap_or(Pos::new(0, 0));
        Self {
            puzzle,
            numbering,
            entries: Matrix::filled(size, None),
            feedback: Matrix::filled(size, Feedback::None),
            revealed: Matrix::filled(size, false),
            locked: Matrix::filled(size, false),
            cursor: Cursor {
                pos: start,
                direction: Direction::Across,
            },
            paused: false,
            smart_navigation: true,
            feedback_fade: Duration::from_millis(config::feedback::FADE_MS),
            error_cells: BTreeSet::new(),
            ever_revealed: false,
            solved: false,
            fades: Vec::new(),
        }
    }

    pub fn with_smart_navigation(mut self, enabled: bool) -> Self {
        self.smart_navigation = enabled;
        self
    }

    pub fn with_feedback_fade(mut self, fade: Duration) -> Self {
        self.feedback_fade = fade;
        self
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn numbering(&self) -> &Numbering {
        &self.numbering
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn entry(&self, pos: Pos) -> Option<char> {
        self.entries.get(pos).copied().flatten()
    }

    pub fn feedback(&self, pos: Pos) -> Feedback {
        self.feedback.get(pos).copied().unwrap_or_default()
    }

    pub fn is_revealed(&self, pos: Pos) -> bool {
        self.revealed.get(pos).copied().unwrap_or(false)
    }

    pub fn is_locked(&self, pos: Pos) -> bool {
        self.locked.get(pos).copied().unwrap_or(false)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Whether any square was revealed since the last reset.
    pub fn is_assisted(&self) -> bool {
        self.ever_revealed
    }

    /// Number of distinct squares ever marked incorrect.
    pub fn error_count(&self) -> u32 {
        self.error_cells.len() as u32
    }

    pub fn has_any_entry(&self) -> bool {
        self.entries.iter().any(|(_, e)| e.is_some())
    }

    /// Run under the cursor in the current direction.
    pub fn current_run(&self) -> Option<&Run> {
        self.numbering
            .run_at(self.cursor.pos, self.cursor.direction)
    }

    /// Number and text of the clue under the cursor.
    pub fn current_clue(&self) -> Option<(u32, &str)> {
        let run = self.current_run()?;
        let text = self.puzzle.clues.get(run.direction, run.number)?;
        Some((run.number, text))
    }

    /// Entries as rows of strings, `""` for empty and block squares.
    pub fn entry_rows(&self) -> Vec<Vec<String>> {
        self.entries
            .rows()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|e| e.map(String::from).unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Flip the pause state, returning the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Type a letter into the active square and advance.
    pub fn place_letter(&mut self, ch: char) -> Change {
        if let Some(rejection) = self.edit_guard(self.cursor.pos) {
            return Change::Rejected(rejection);
        }
        if !ch.is_ascii_alphabetic() {
            return Change::Rejected(Rejection::NotALetter);
        }

        let pos = self.cursor.pos;
        let letter = ch.to_ascii_uppercase();
        if self.entries[pos] != Some(letter) {
            self.revealed[pos] = false;
        }
        self.set_feedback(pos, Feedback::None);
        self.entries[pos] = Some(letter);
        if let Some(next) = self.smart_step(pos, self.cursor.direction.delta()) {
            self.cursor.pos = next;
        }
        Change::Edited {
            solved_now: self.evaluate_solved(),
        }
    }

    /// Backspace: clear the active square, or step back and clear the previous one.
    pub fn erase(&mut self) -> Change {
        let pos = self.cursor.pos;
        if let Some(rejection) = self.edit_guard(pos) {
            return Change::Rejected(rejection);
        }

        if self.entries[pos].is_some() {
            self.blank(pos);
            return Change::Edited { solved_now: false };
        }

        let Some(prev) = self.editable_step_back(pos, self.cursor.direction) else {
            return Change::Unchanged;
        };
        self.cursor.pos = prev;
        self.blank(prev);
        Change::Edited { solved_now: false }
    }

    /// A revealed square only keeps its flag while it holds the solution.
    fn blank(&mut self, pos: Pos) {
        self.entries[pos] = None;
        self.revealed[pos] = false;
        self.set_feedback(pos, Feedback::None);
    }

    /// Clear everything back to a fresh board.
    pub fn reset(&mut self) {
        self.entries.fill(None);
        self.feedback.fill(Feedback::None);
        self.revealed.fill(false);
        self.locked.fill(false);
        self.cursor = Cursor {
            pos: self.puzzle.first_playable().unwrap_or(Pos::new(0, 0)),
            direction: Direction::Across,
        };
        self.paused = false;
        self.error_cells.clear();
        self.ever_revealed = false;
        self.solved = false;
        self.fades.clear();
        debug!("Board reset for {}", self.puzzle.date);
    }

    /// Load saved entries. Returns true when they already solve the puzzle,
    /// in which case the board is marked solved and locked without a new
    /// solve transition being reported.
    pub fn hydrate(&mut self, rows: &[Vec<String>]) -> bool {
        for pos in self.puzzle.playable().collect::<Vec<_>>() {
            let letter = rows
                .get(pos.row)
                .and_then(|row| row.get(pos.col))
                .and_then(|s| s.trim().chars().next())
                .filter(char::is_ascii_alphabetic)
                .map(|c| c.to_ascii_uppercase());
            self.entries[pos] = letter;
            self.set_feedback(pos, Feedback::None);
        }
        if self.is_complete() {
            self.mark_solved();
            return true;
        }
        false
    }

    /// Every playable square holds its solution letter.
    pub fn is_complete(&self) -> bool {
        self.puzzle
            .playable()
            .all(|pos| self.entry(pos) == self.puzzle.solution(pos))
    }

    pub(super) fn edit_guard(&self, pos: Pos) -> Option<Rejection> {
        if self.paused {
            Some(Rejection::Paused)
        } else if self.puzzle.is_block(pos) {
            Some(Rejection::Block)
        } else if self.is_locked(pos) {
            Some(Rejection::Locked)
        } else {
            None
        }
    }

    /// Overwrite a mark; any pending fade for the square is dropped.
    pub(super) fn set_feedback(&mut self, pos: Pos, mark: Feedback) {
        self.fades.retain(|fade| fade.pos != pos);
        self.feedback[pos] = mark;
    }

    /// Transition into solved if the grid is now complete.
    pub(super) fn evaluate_solved(&mut self) -> bool {
        if self.solved || !self.is_complete() {
            return false;
        }
        self.mark_solved();
        true
    }

    fn mark_solved(&mut self) {
        self.solved = true;
        for pos in self.puzzle.playable().collect::<Vec<_>>() {
            self.locked[pos] = true;
        }
        debug!("Puzzle {} solved", self.puzzle.date);
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.puzzle.size {
            let line: String = (0..self.puzzle.size)
                .map(|col| {
                    let pos = Pos::new(row, col);
                    if self.puzzle.is_block(pos) {
                        '#'
                    } else {
                        self.entry(pos).unwrap_or('.')
                    }
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
