//! Crossword numbering.
//!
//! A square starts an across answer when it is not a block, the square to its
//! left is off-grid or a block, and the square to its right is a letter. Down
//! answers follow the same rule vertically. A square starting both shares one
//! number, and numbers increase in row-major scan order.

use serde::Serialize;

use crate::puzzle::{Direction, Pos, Square};

/// One answer slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    pub number: u32,
    pub direction: Direction,
    pub start: Pos,
    pub cells: Vec<Pos>,
}

impl Run {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }
}

/// Reference to a run in clue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClueRef {
    pub direction: Direction,
    pub number: u32,
    pub start: Pos,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Numbering {
    pub across: Vec<Run>,
    pub down: Vec<Run>,
    /// Index into `across` for each square, `None` for blocks and unreached squares.
    pub cell_to_across: Vec<Vec<Option<usize>>>,
    pub cell_to_down: Vec<Vec<Option<usize>>>,
}

/// Derive runs and lookup tables from a square grid.
pub fn compute_numbering(grid: &[Vec<Square>]) -> Numbering {
    let size = grid.len();
    let is_open = |pos: Option<Pos>| {
        pos.and_then(|p| grid.get(p.row).and_then(|row| row.get(p.col)))
            .is_some_and(|sq| !sq.is_block())
    };

    let mut numbering = Numbering {
        across: Vec::new(),
        down: Vec::new(),
        cell_to_across: vec![vec![None; size]; size],
        cell_to_down: vec![vec![None; size]; size],
    };
    let mut next_number = 1;

    for row in 0..size {
        for col in 0..size {
            let pos = Pos::new(row, col);
            if !is_open(Some(pos)) {
                continue;
            }

            let starts = |direction: Direction| {
                let (dr, dc) = direction.delta();
                !is_open(pos.offset(-dr, -dc, size)) && is_open(pos.offset(dr, dc, size))
            };
            let starts_across = starts(Direction::Across);
            let starts_down = starts(Direction::Down);
            if !starts_across && !starts_down {
                continue;
            }

            let number = next_number;
            next_number += 1;

            for (direction, starts_here) in [
                (Direction::Across, starts_across),
                (Direction::Down, starts_down),
            ] {
                if !starts_here {
                    continue;
                }
                let (dr, dc) = direction.delta();
                let mut cells = Vec::new();
                let mut cursor = Some(pos);
                while let Some(p) = cursor.filter(|p| is_open(Some(*p))) {
                    cells.push(p);
                    cursor = p.offset(dr, dc, size);
                }

                let (runs, lookup) = match direction {
                    Direction::Across => (&mut numbering.across, &mut numbering.cell_to_across),
                    Direction::Down => (&mut numbering.down, &mut numbering.cell_to_down),
                };
                let index = runs.len();
                for p in &cells {
                    lookup[p.row][p.col] = Some(index);
                }
                runs.push(Run {
                    number,
                    direction,
                    start: pos,
                    cells,
                });
            }
        }
    }

    numbering
}

impl Numbering {
    pub fn runs(&self, direction: Direction) -> &[Run] {
        match direction {
            Direction::Across => &self.across,
            Direction::Down => &self.down,
        }
    }

    /// The run containing `pos` in `direction`.
    pub fn run_at(&self, pos: Pos, direction: Direction) -> Option<&Run> {
        let lookup = match direction {
            Direction::Across => &self.cell_to_across,
            Direction::Down => &self.cell_to_down,
        };
        let index = (*lookup.get(pos.row)?.get(pos.col)?)?;
        self.runs(direction).get(index)
    }

    pub fn find(&self, direction: Direction, number: u32) -> Option<&Run> {
        self.runs(direction).iter().find(|run| run.number == number)
    }

    /// Corner number printed in `pos`, if any run starts there.
    pub fn number_at(&self, pos: Pos) -> Option<u32> {
        self.across
            .iter()
            .chain(self.down.iter())
            .find(|run| run.start == pos)
            .map(|run| run.number)
    }

    /// Across runs then down runs, each in start order.
    pub fn clue_order(&self) -> Vec<ClueRef> {
        self.across
            .iter()
            .chain(self.down.iter())
            .map(|run| ClueRef {
                direction: run.direction,
                number: run.number,
                start: run.start,
            })
            .collect()
    }

    pub fn all_runs(&self) -> impl Iterator<Item = &Run> {
        self.across.iter().chain(self.down.iter())
    }
}
