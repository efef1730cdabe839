//! Validate command for checking puzzle documents before publishing.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use minicross::{Puzzle, compute_numbering, validate_document};
use serde_json::Value;

pub fn run(file: &Path, strict: bool, date: Option<NaiveDate>) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read puzzle file {}", file.display()))?;
    let doc: Value = serde_json::from_str(&content).context("Failed to parse puzzle JSON")?;

    let violations = validate_document(&doc);
    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("  - {}", violation);
        }
        if strict {
            bail!("{} has {} problem(s)", file.display(), violations.len());
        }
        println!(
            "{}: {} problem(s); players would get the bundled puzzle instead",
            file.display(),
            violations.len()
        );
        return Ok(());
    }

    let puzzle = Puzzle::from_document(date.unwrap_or_else(|| Local::now().date_naive()), &doc)?;
    let numbering = compute_numbering(&puzzle.grid);
    println!(
        "{}: OK ({}x{}, {} across, {} down)",
        puzzle.title,
        puzzle.size,
        puzzle.size,
        numbering.across.len(),
        numbering.down.len()
    );
    Ok(())
}
