//! Puzzle document validation.
//!
//! Documents arrive as untyped JSON from the backend or from disk, so the
//! validator walks the raw value and collects every violation instead of
//! stopping at the first one.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::numbering::compute_numbering;

use super::types::{BLOCK, Clues, Puzzle, PuzzleDocument, Square};

/// How a malformed document is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Return an error instead of logging a warning.
    pub strict_validation: bool,
}

/// Collect all shape violations in a puzzle document. Empty means valid.
pub fn validate_document(doc: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(obj) = doc.as_object() else {
        errors.push("Puzzle must be an object.".to_string());
        return errors;
    };

    match obj.get("title").and_then(Value::as_str) {
        Some(title) if !title.trim().is_empty() => {}
        _ => errors.push("title must be a non-empty string.".to_string()),
    }

    let size = match obj.get("size").and_then(Value::as_u64) {
        Some(n) if n > 0 => Some(n as usize),
        _ => {
            errors.push("size must be a positive integer.".to_string());
            None
        }
    };

    match obj.get("grid").and_then(Value::as_array) {
        None => errors.push("grid must be an array of rows.".to_string()),
        Some(rows) => validate_grid(rows, size, &mut errors),
    }

    match obj.get("clues").and_then(Value::as_object) {
        None => errors.push("clues must be an object.".to_string()),
        Some(clues) => {
            for dir in ["across", "down"] {
                let Some(bag) = clues.get(dir).and_then(Value::as_object) else {
                    errors.push(format!("clues.{} must be an object.", dir));
                    continue;
                };
                for (num, text) in bag {
                    if num.is_empty() || !num.chars().all(|c| c.is_ascii_digit()) {
                        errors.push(format!("clues.{} key \"{}\" must be digits.", dir, num));
                    }
                    match text.as_str() {
                        Some(t) if !t.trim().is_empty() => {}
                        _ => errors.push(format!("clues.{}[{}] must be a non-empty string.", dir, num)),
                    }
                }
            }
        }
    }

    if errors.is_empty()
        && let Ok(doc) = serde_json::from_value::<PuzzleDocument>(doc.clone())
    {
        validate_reachability(&doc, &mut errors);
    }

    errors
}

fn validate_grid(rows: &[Value], size: Option<usize>, errors: &mut Vec<String>) {
    if let Some(size) = size
        && rows.len() != size
    {
        errors.push(format!("grid must have {} rows; got {}.", size, rows.len()));
    }

    for (r, row) in rows.iter().enumerate() {
        let Some(cells) = row.as_array() else {
            errors.push(format!("grid row {} must be an array.", r));
            continue;
        };
        if let Some(size) = size
            && cells.len() != size
        {
            errors.push(format!(
                "grid row {} must have {} columns; got {}.",
                r,
                size,
                cells.len()
            ));
        }
        for (c, cell) in cells.iter().enumerate() {
            match cell.as_str() {
                None => errors.push(format!("grid[{}][{}] must be a string.", r, c)),
                Some(symbol) if Square::from_symbol(symbol).is_none() => errors.push(format!(
                    "grid[{}][{}] must be \"{}\" or a single A-Z letter.",
                    r, c, BLOCK
                )),
                Some(_) => {}
            }
        }
    }
}

/// Every letter square must sit in at least one across or down run.
fn validate_reachability(doc: &PuzzleDocument, errors: &mut Vec<String>) {
    let grid = parse_grid(&doc.grid);
    let numbering = compute_numbering(&grid);
    for (r, row) in grid.iter().enumerate() {
        for (c, square) in row.iter().enumerate() {
            if !square.is_block()
                && numbering.cell_to_across[r][c].is_none()
                && numbering.cell_to_down[r][c].is_none()
            {
                errors.push(format!("grid[{}][{}] is not part of any across or down answer.", r, c));
            }
        }
    }
}

fn parse_grid(rows: &[Vec<String>]) -> Vec<Vec<Square>> {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|s| Square::from_symbol(s).unwrap_or(Square::Block))
                .collect()
        })
        .collect()
}

/// Validate and report according to `options`.
///
/// Returns `Ok(true)` for a valid document, `Ok(false)` for an invalid one in
/// lenient mode (after logging), and `Err` for an invalid one in strict mode.
pub fn check_document(doc: &Value, id: &str, options: ValidationOptions) -> Result<bool> {
    let violations = validate_document(doc);
    if violations.is_empty() {
        return Ok(true);
    }
    if options.strict_validation {
        return Err(Error::InvalidPuzzle {
            id: id.to_string(),
            violations,
        });
    }
    warn!(
        "Invalid puzzle \"{}\":\n- {}",
        id,
        violations.join("\n- ")
    );
    Ok(false)
}

impl Puzzle {
    /// Build a puzzle from a raw document, rejecting any shape violation.
    pub fn from_document(date: NaiveDate, doc: &Value) -> Result<Self> {
        let violations = validate_document(doc);
        if !violations.is_empty() {
            return Err(Error::InvalidPuzzle {
                id: date.to_string(),
                violations,
            });
        }
        let doc: PuzzleDocument = serde_json::from_value(doc.clone())?;
        Ok(Self::from_validated(date, doc))
    }

    fn from_validated(date: NaiveDate, doc: PuzzleDocument) -> Self {
        let numbered = |bag: std::collections::BTreeMap<String, String>| {
            bag.into_iter()
                .filter_map(|(num, text)| num.parse::<u32>().ok().map(|n| (n, text)))
                .collect()
        };
        Self {
            date,
            title: doc.title,
            author: doc.author,
            size: doc.size,
            grid: parse_grid(&doc.grid),
            clues: Clues {
                across: numbered(doc.clues.across),
                down: numbered(doc.clues.down),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn good() -> Value {
        json!({
            "title": "Mini",
            "size": 5,
            "grid": [
                ["#", "A", "B", "C", "#"],
                ["D", "E", "F", "#", "#"],
                ["#", "G", "H", "I", "#"],
                ["J", "K", "L", "#", "#"],
                ["#", "M", "N", "O", "#"]
            ],
            "clues": {
                "across": { "1": "clue", "3": "clue" },
                "down": { "1": "clue", "2": "clue" }
            }
        })
    }

    #[test]
    fn test_accepts_valid_puzzle() {
        assert!(validate_document(&good()).is_empty());
    }

    #[test]
    fn test_rejects_size_mismatch() {
        let mut bad = good();
        bad["size"] = json!(4);
        let errors = validate_document(&bad).join("\n");
        assert!(errors.contains("grid must have 4 rows"));
        assert!(errors.contains("must have 4 columns"));
    }

    #[test]
    fn test_rejects_bad_cell() {
        let mut bad = good();
        bad["grid"][0][1] = json!("AA");
        let errors = validate_document(&bad).join("\n");
        assert!(errors.contains("grid[0][1] must be \"#\" or a single A-Z letter."));
    }

    #[test]
    fn test_rejects_non_numeric_clue_key() {
        let mut bad = good();
        bad["clues"]["across"] = json!({ "a1": "bad" });
        let errors = validate_document(&bad).join("\n");
        assert!(errors.contains("key \"a1\" must be digits"));
    }

    #[test]
    fn test_rejects_empty_clue_text() {
        let mut bad = good();
        bad["clues"]["down"]["2"] = json!("  ");
        let errors = validate_document(&bad);
        assert_eq!(errors, vec!["clues.down[2] must be a non-empty string.".to_string()]);
    }

    #[test]
    fn test_collects_multiple_violations() {
        let errors = validate_document(&json!({ "size": -1, "grid": "x" }));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_rejects_isolated_letter() {
        let doc = json!({
            "title": "Island",
            "size": 3,
            "grid": [["A", "B", "C"], ["#", "#", "#"], ["#", "Z", "#"]],
            "clues": { "across": { "1": "abc" }, "down": {} }
        });
        let errors = validate_document(&doc);
        assert_eq!(
            errors,
            vec!["grid[2][1] is not part of any across or down answer.".to_string()]
        );
    }

    #[test]
    fn test_strict_mode_errors_lenient_mode_warns() {
        let bad = json!({ "title": "" });
        let lenient = check_document(&bad, "x", ValidationOptions::default()).unwrap();
        assert!(!lenient);

        let strict = check_document(
            &bad,
            "x",
            ValidationOptions {
                strict_validation: true,
            },
        );
        assert!(matches!(strict, Err(Error::InvalidPuzzle { .. })));
    }

    #[test]
    fn test_from_document_uppercases_letters() {
        let mut doc = good();
        doc["grid"][0][1] = json!("a");
        let date = NaiveDate::from_ymd_opt(2025, 9, 27).unwrap();
        let puzzle = Puzzle::from_document(date, &doc).unwrap();
        assert_eq!(puzzle.grid[0][1], Square::Letter('A'));
        assert_eq!(puzzle.clues.get(crate::puzzle::Direction::Down, 2), Some("clue"));
    }
}
