//! Board state and the operations players perform on it.
//!
//! - `Board` - entries, feedback marks, revealed/locked flags and the cursor
//! - cursor movement (smart and raw navigation, clue jumps) in `cursor`
//! - check, reveal and clear by scope, plus solved-word locking, in `assist`

mod assist;
mod board;
mod cursor;
mod matrix;

pub use assist::{CheckOptions, ClearOptions, Scope};
pub use board::{Board, Change, Cursor, Rejection};
pub use cursor::Arrow;
pub use matrix::Matrix;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Check mark shown on a square.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Feedback {
    #[default]
    None,
    Correct,
    Incorrect,
}
