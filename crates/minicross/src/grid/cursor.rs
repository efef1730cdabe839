//! Cursor movement.
//!
//! All movement scans a single row or column. Smart navigation skips blocks,
//! locked squares and filled squares; raw navigation only passes over blocks.
//! When no square qualifies the cursor stays where it is.

use strum::{Display, EnumString};

use crate::numbering::ClueRef;
use crate::puzzle::{Direction, Pos};

use super::board::{Board, Change, Rejection};

/// Arrow key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Arrow {
    Left,
    Right,
    Up,
    Down,
}

impl Arrow {
    fn delta(self) -> (isize, isize) {
        match self {
            Self::Left => (0, -1),
            Self::Right => (0, 1),
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
        }
    }
}

impl Board {
    /// First square past `from` along `delta` for which `skip` is false.
    fn scan(&self, from: Pos, (dr, dc): (isize, isize), skip: impl Fn(Pos) -> bool) -> Option<Pos> {
        let size = self.puzzle.size;
        let mut next = from.offset(dr, dc, size);
        while let Some(pos) = next {
            if !skip(pos) {
                return Some(pos);
            }
            next = pos.offset(dr, dc, size);
        }
        None
    }

    /// Next open square, passing over blocks.
    pub(super) fn raw_step(&self, from: Pos, delta: (isize, isize)) -> Option<Pos> {
        self.scan(from, delta, |p| self.puzzle.is_block(p))
    }

    /// Next square that is open, unlocked and empty.
    pub(super) fn smart_step(&self, from: Pos, delta: (isize, isize)) -> Option<Pos> {
        self.scan(from, delta, |p| {
            self.puzzle.is_block(p) || self.is_locked(p) || self.entry(p).is_some()
        })
    }

    /// Nearest open, unlocked square behind `from` in `direction`.
    pub(super) fn editable_step_back(&self, from: Pos, direction: Direction) -> Option<Pos> {
        let (dr, dc) = direction.delta();
        self.scan(from, (-dr, -dc), |p| {
            self.puzzle.is_block(p) || self.is_locked(p)
        })
    }

    /// Arrow key movement. Allowed while paused.
    pub fn move_cursor(&mut self, arrow: Arrow) -> Change {
        let from = self.cursor.pos;
        let target = if self.smart_navigation {
            self.smart_step(from, arrow.delta())
        } else {
            self.raw_step(from, arrow.delta())
        };
        match target {
            Some(pos) => {
                self.cursor.pos = pos;
                Change::Moved
            }
            None => Change::Unchanged,
        }
    }

    pub fn toggle_direction(&mut self) -> Change {
        self.cursor.direction = self.cursor.direction.toggled();
        Change::Moved
    }

    /// Click on a square: move there, or flip direction if it is already active.
    pub fn select_cell(&mut self, pos: Pos) -> Change {
        if pos.row >= self.puzzle.size || pos.col >= self.puzzle.size {
            return Change::Rejected(Rejection::OutOfBounds);
        }
        if self.puzzle.is_block(pos) {
            return Change::Rejected(Rejection::Block);
        }
        if pos == self.cursor.pos {
            return self.toggle_direction();
        }
        self.cursor.pos = pos;
        Change::Moved
    }

    /// Jump to the start of a numbered clue.
    pub fn select_clue(&mut self, direction: Direction, number: u32) -> Change {
        let Some(start) = self.numbering.find(direction, number).map(|run| run.start) else {
            return Change::Rejected(Rejection::UnknownClue);
        };
        self.cursor.pos = start;
        self.cursor.direction = direction;
        Change::Moved
    }

    /// Tab: the following clue in across-then-down order, wrapping.
    pub fn next_clue(&mut self) -> Change {
        self.step_clue(1)
    }

    /// Shift-tab: the preceding clue, wrapping.
    pub fn prev_clue(&mut self) -> Change {
        self.step_clue(-1)
    }

    /// Position of the current clue in clue order.
    ///
    /// The run under the cursor in the current direction wins; otherwise a run
    /// starting at the cursor in either direction.
    pub fn current_clue_index(&self, order: &[ClueRef]) -> Option<usize> {
        if let Some(run) = self.current_run()
            && let Some(i) = order
                .iter()
                .position(|c| c.direction == run.direction && c.number == run.number)
        {
            return Some(i);
        }
        order.iter().position(|c| c.start == self.cursor.pos)
    }

    fn step_clue(&mut self, step: isize) -> Change {
        let order = self.numbering.clue_order();
        if order.is_empty() {
            return Change::Unchanged;
        }
        let len = order.len() as isize;
        let index = match self.current_clue_index(&order) {
            Some(i) => (i as isize + step).rem_euclid(len),
            None => 0,
        };
        let target = order[index as usize];
        self.cursor.pos = target.start;
        self.cursor.direction = target.direction;
        Change::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::super::board::tests::board;
    use super::*;

    #[test]
    fn test_smart_right_skips_filled_and_blocks() {
        let mut board = board();
        board.cursor.pos = Pos::new(1, 0);
        board.entries[Pos::new(1, 1)] = Some('E');
        assert_eq!(board.move_cursor(Arrow::Right), Change::Moved);
        assert_eq!(board.cursor().pos, Pos::new(1, 2));
        // (1,3) and (1,4) are blocks
        assert_eq!(board.move_cursor(Arrow::Right), Change::Unchanged);
        assert_eq!(board.cursor().pos, Pos::new(1, 2));
    }

    #[test]
    fn test_smart_left_skips_locked() {
        let mut board = board();
        board.cursor.pos = Pos::new(2, 3);
        board.locked[Pos::new(2, 2)] = true;
        board.move_cursor(Arrow::Left);
        assert_eq!(board.cursor().pos, Pos::new(2, 1));
    }

    #[test]
    fn test_raw_navigation_passes_blocks_and_clamps() {
        let mut board = board().with_smart_navigation(false);
        board.cursor.pos = Pos::new(1, 2);
        board.entries[Pos::new(2, 2)] = Some('H');
        assert_eq!(board.move_cursor(Arrow::Down), Change::Moved);
        assert_eq!(board.cursor().pos, Pos::new(2, 2));

        board.cursor.pos = Pos::new(0, 1);
        assert_eq!(board.move_cursor(Arrow::Up), Change::Unchanged);
        assert_eq!(board.move_cursor(Arrow::Left), Change::Unchanged);
        assert_eq!(board.cursor().pos, Pos::new(0, 1));

        assert_eq!(board.move_cursor(Arrow::Down), Change::Moved);
        assert_eq!(board.cursor().pos, Pos::new(1, 1));
    }

    #[test]
    fn test_raw_navigation_jumps_over_block() {
        let mut board = board().with_smart_navigation(false);
        board.cursor.pos = Pos::new(1, 0);
        assert_eq!(board.move_cursor(Arrow::Down), Change::Moved);
        // (2,0) is a block; (3,0) is the next open square
        assert_eq!(board.cursor().pos, Pos::new(3, 0));
    }

    #[test]
    fn test_navigation_allowed_while_paused() {
        let mut board = board();
        board.set_paused(true);
        assert_eq!(board.move_cursor(Arrow::Right), Change::Moved);
        assert_eq!(board.toggle_direction(), Change::Moved);
    }

    #[test]
    fn test_select_active_cell_toggles_direction() {
        let mut board = board();
        board.select_cell(Pos::new(0, 1));
        assert_eq!(board.cursor().direction, Direction::Down);
        assert_eq!(board.cursor().pos, Pos::new(0, 1));

        assert_eq!(board.select_cell(Pos::new(2, 2)), Change::Moved);
        assert_eq!(board.cursor().direction, Direction::Down);
        assert_eq!(
            board.select_cell(Pos::new(0, 0)),
            Change::Rejected(Rejection::Block)
        );
        assert_eq!(
            board.select_cell(Pos::new(9, 0)),
            Change::Rejected(Rejection::OutOfBounds)
        );
    }

    #[test]
    fn test_select_clue_moves_to_start() {
        let mut board = board();
        assert_eq!(board.select_clue(Direction::Down, 2), Change::Moved);
        assert_eq!(board.cursor().pos, Pos::new(0, 2));
        assert_eq!(board.cursor().direction, Direction::Down);
        assert_eq!(
            board.select_clue(Direction::Down, 9),
            Change::Rejected(Rejection::UnknownClue)
        );
    }

    #[test]
    fn test_next_clue_wraps() {
        let mut board = board();
        // across 1 -> across 3
        board.next_clue();
        assert_eq!(board.cursor().pos, Pos::new(1, 0));

        board.select_clue(Direction::Down, 2);
        board.next_clue();
        assert_eq!(board.cursor().pos, Pos::new(0, 1));
        assert_eq!(board.cursor().direction, Direction::Across);
    }

    #[test]
    fn test_prev_clue_wraps_backwards() {
        let mut board = board();
        board.prev_clue();
        assert_eq!(board.cursor().direction, Direction::Down);
        assert_eq!(board.cursor().pos, Pos::new(0, 2));
    }

    #[test]
    fn test_current_clue_falls_back_to_run_start() {
        let mut board = board();
        // (0,3) has no down run and starts nothing
        board.cursor.pos = Pos::new(0, 3);
        board.cursor.direction = Direction::Down;
        let order = board.numbering().clue_order();
        assert_eq!(board.current_clue_index(&order), None);
        board.next_clue();
        assert_eq!(board.cursor().pos, Pos::new(0, 1));
        assert_eq!(board.cursor().direction, Direction::Across);
    }
}
