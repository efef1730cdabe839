//! Clues command for listing the day's clues.

use anyhow::Result;
use minicross::PuzzleSource;
use serde::Serialize;

use crate::context::Context;

#[derive(Serialize)]
struct ClueLine<'a> {
    direction: String,
    number: u32,
    length: usize,
    text: &'a str,
}

pub fn run(ctx: &Context, json: bool) -> Result<()> {
    let session = ctx.open_session()?;
    let board = session.board();
    let puzzle = board.puzzle();
    let numbering = board.numbering();

    let lines: Vec<ClueLine> = numbering
        .clue_order()
        .into_iter()
        .map(|clue| ClueLine {
            direction: clue.direction.to_string(),
            number: clue.number,
            length: numbering
                .find(clue.direction, clue.number)
                .map_or(0, |run| run.len()),
            text: puzzle.clues.get(clue.direction, clue.number).unwrap_or(""),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(());
    }

    if session.source() == PuzzleSource::Bundled {
        eprintln!("No published puzzle for {}, showing the bundled one", ctx.date);
    }
    println!("{} - {}", puzzle.title, puzzle.date);
    let mut heading = None;
    for line in &lines {
        if heading.as_deref() != Some(line.direction.as_str()) {
            println!("\n{}", line.direction.to_uppercase());
            heading = Some(line.direction.clone());
        }
        println!("{:>3}. {} ({})", line.number, line.text, line.length);
    }
    Ok(())
}
