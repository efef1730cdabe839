use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Grid symbol marking a block square in puzzle documents.
pub const BLOCK: &str = "#";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    #[default]
    Across,
    Down,
}

impl Direction {
    pub const ALL: [Self; 2] = [Self::Across, Self::Down];

    pub fn toggled(self) -> Self {
        match self {
            Self::Across => Self::Down,
            Self::Down => Self::Across,
        }
    }

    /// Forward step as (row delta, column delta).
    pub fn delta(self) -> (isize, isize) {
        match self {
            Self::Across => (0, 1),
            Self::Down => (1, 0),
        }
    }
}

/// Grid coordinate, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbour at the given offset, or `None` when it falls off a `size`×`size` grid.
    pub fn offset(self, dr: isize, dc: isize, size: usize) -> Option<Self> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < size && col < size).then_some(Self { row, col })
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Square {
    Block,
    Letter(char),
}

impl Square {
    /// Parse a document symbol: `#` or a single ASCII letter (stored upper-case).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        if symbol == BLOCK {
            return Some(Self::Block);
        }
        let mut chars = symbol.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Some(Self::Letter(c.to_ascii_uppercase())),
            _ => None,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Self::Block)
    }

    pub fn letter(&self) -> Option<char> {
        match self {
            Self::Letter(c) => Some(*c),
            Self::Block => None,
        }
    }

    pub fn symbol(&self) -> String {
        match self {
            Self::Block => BLOCK.to_string(),
            Self::Letter(c) => c.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clues {
    pub across: BTreeMap<u32, String>,
    pub down: BTreeMap<u32, String>,
}

impl Clues {
    pub fn get(&self, direction: Direction, number: u32) -> Option<&str> {
        let bag = match direction {
            Direction::Across => &self.across,
            Direction::Down => &self.down,
        };
        bag.get(&number).map(String::as_str)
    }
}

/// Wire shape of a puzzle document.
///
/// Only deserialize this after `validate_document` reported no violations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleDocument {
    pub title: String,
    pub size: usize,
    pub grid: Vec<Vec<String>>,
    pub clues: ClueDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClueDocument {
    pub across: BTreeMap<String, String>,
    pub down: BTreeMap<String, String>,
}

/// A validated puzzle for one date.
#[derive(Debug, Clone, PartialEq)]
pub struct Puzzle {
    pub date: NaiveDate,
    pub title: String,
    pub author: Option<String>,
    pub size: usize,
    pub grid: Vec<Vec<Square>>,
    pub clues: Clues,
}

impl Puzzle {
    pub fn square(&self, pos: Pos) -> Square {
        self.grid
            .get(pos.row)
            .and_then(|row| row.get(pos.col))
            .copied()
            .unwrap_or(Square::Block)
    }

    pub fn is_block(&self, pos: Pos) -> bool {
        self.square(pos).is_block()
    }

    pub fn solution(&self, pos: Pos) -> Option<char> {
        self.square(pos).letter()
    }

    /// Every non-block square in row-major order.
    pub fn playable(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.size)
            .flat_map(move |row| (0..self.size).map(move |col| Pos::new(row, col)))
            .filter(|pos| !self.is_block(*pos))
    }

    pub fn first_playable(&self) -> Option<Pos> {
        self.playable().next()
    }

    /// Identifier used in history entries and logs.
    pub fn key(&self) -> String {
        format!("{}:{}", self.date, self.title)
    }

    pub fn to_document(&self) -> PuzzleDocument {
        let numbered = |bag: &BTreeMap<u32, String>| {
            bag.iter()
                .map(|(num, text)| (num.to_string(), text.clone()))
                .collect()
        };
        PuzzleDocument {
            title: self.title.clone(),
            size: self.size,
            grid: self
                .grid
                .iter()
                .map(|row| row.iter().map(Square::symbol).collect())
                .collect(),
            clues: ClueDocument {
                across: numbered(&self.clues.across),
                down: numbered(&self.clues.down),
            },
            author: self.author.clone(),
        }
    }
}
