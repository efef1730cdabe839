//! Puzzle model and document handling.
//!
//! - `Puzzle` - a validated grid with clues for one date
//! - `validate_document` / `check_document` - shape validation of raw JSON
//! - `resolve_puzzle` - pick the remote document or fall back to the bundled one

mod schema;
mod types;

pub use schema::*;
pub use types::*;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::Result;

const BUNDLED_PUZZLE: &str = include_str!("sample.json");

/// Where the playable puzzle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleSource {
    Remote,
    /// The remote document was missing or invalid; the bundled puzzle is shown instead.
    Bundled,
}

/// Load the bundled known-good puzzle, dated `date`.
pub fn bundled_puzzle(date: NaiveDate) -> Result<Puzzle> {
    let doc: Value = serde_json::from_str(BUNDLED_PUZZLE)?;
    Puzzle::from_document(date, &doc)
}

/// Turn an optional remote document into a playable puzzle.
///
/// Invalid documents are an error under strict validation; otherwise they are
/// logged and replaced by the bundled puzzle.
pub fn resolve_puzzle(
    date: NaiveDate,
    remote: Option<&Value>,
    options: ValidationOptions,
) -> Result<(Puzzle, PuzzleSource)> {
    if let Some(doc) = remote {
        if check_document(doc, &date.to_string(), options)? {
            return Ok((Puzzle::from_document(date, doc)?, PuzzleSource::Remote));
        }
        warn!("Falling back to bundled puzzle for {}", date);
    } else {
        info!("No remote puzzle for {}, using bundled puzzle", date);
    }
    Ok((bundled_puzzle(date)?, PuzzleSource::Bundled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 27).unwrap()
    }

    #[test]
    fn test_bundled_puzzle_is_valid() {
        let puzzle = bundled_puzzle(date()).unwrap();
        assert_eq!(puzzle.size, 5);
        assert_eq!(puzzle.date, date());
        assert_eq!(puzzle.first_playable(), Some(Pos::new(0, 1)));
    }

    #[test]
    fn test_resolve_uses_remote_when_valid() {
        let mut doc = serde_json::to_value(bundled_puzzle(date()).unwrap().to_document()).unwrap();
        doc["title"] = json!("Remote");
        let (puzzle, source) =
            resolve_puzzle(date(), Some(&doc), ValidationOptions::default()).unwrap();
        assert_eq!(source, PuzzleSource::Remote);
        assert_eq!(puzzle.title, "Remote");
    }

    #[test]
    fn test_resolve_falls_back_on_invalid_document() {
        let doc = json!({ "title": "Broken", "size": 2 });
        let (puzzle, source) =
            resolve_puzzle(date(), Some(&doc), ValidationOptions::default()).unwrap();
        assert_eq!(source, PuzzleSource::Bundled);
        assert_eq!(puzzle.title, "Mini Crossword");
    }

    #[test]
    fn test_resolve_strict_rejects_invalid_document() {
        let doc = json!({ "title": "Broken" });
        let strict = ValidationOptions {
            strict_validation: true,
        };
        assert!(resolve_puzzle(date(), Some(&doc), strict).is_err());
    }

    #[test]
    fn test_resolve_missing_document_uses_bundled() {
        let (_, source) = resolve_puzzle(date(), None, ValidationOptions::default()).unwrap();
        assert_eq!(source, PuzzleSource::Bundled);
    }
}
