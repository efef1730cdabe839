//! Play command: drive a session from a script of moves.
//!
//! One move per line, `#` starts a comment:
//!
//! ```text
//! type ABC            letters in order
//! back                backspace
//! left | right | up | down
//! toggle | next | prev
//! cell 2 1            select row 2, column 1
//! clue down 2
//! check word [empty]  empty squares count as wrong
//! reveal square
//! clear puzzle [revealed] [keep-marks]
//! pause | reset
//! tick [N]            N timer seconds (default 1)
//! wait MS             let MS milliseconds pass
//! offline | online
//! show                print the grid
//! ```

use std::fs;
use std::io::{self, Read};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context as _, Result, anyhow, bail};
use minicross::{
    Arrow, Change, CheckOptions, ClearOptions, Command, Direction, PlaySession, Pos, Scope,
    format_clock,
};

use crate::context::Context;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Input(Command),
    Type(String),
    Tick(u32),
    Wait(u64),
    Online(bool),
    Show,
}

pub fn run(ctx: &Context, script: &str, site_url: &str, offline: bool) -> Result<()> {
    let text = read_script(script)?;
    let steps = parse_script(&text)?;

    let mut session = ctx.open_session()?;
    if offline {
        session.set_online(false);
    }
    eprintln!(
        "{} - {} ({:?})",
        session.board().puzzle().title,
        session.date(),
        session.source()
    );

    for step in steps {
        execute(ctx, &mut session, step);
    }

    if let Some(outcome) = session.close() {
        eprintln!("Progress saved ({})", outcome);
    }
    print!("{}", session.board());
    println!("Time: {}", format_clock(session.elapsed_secs()));

    match session.completion() {
        Some(summary) => {
            println!("Solved! {:?}", summary.verdict);
            if let Some(text) = session.share_text(site_url) {
                println!("\n{}", text);
            }
        }
        None if session.board().is_solved() => println!("Already solved."),
        None => {}
    }
    let pending = session.pending_sync();
    if pending > 0 {
        eprintln!("{} operation(s) waiting to sync", pending);
    }
    Ok(())
}

fn execute(ctx: &Context, session: &mut PlaySession, step: Step) {
    match step {
        Step::Input(command) => report(session.apply(command).change),
        Step::Type(letters) => {
            for ch in letters.chars() {
                report(session.apply(Command::Letter(ch)).change);
            }
        }
        Step::Tick(seconds) => {
            for _ in 0..seconds {
                ctx.clock.advance(Duration::from_secs(1));
                if let Some(outcome) = session.tick() {
                    tracing::debug!("Periodic save: {}", outcome);
                }
            }
        }
        Step::Wait(ms) => {
            ctx.clock.advance(Duration::from_millis(ms));
            session.poll();
        }
        Step::Online(online) => {
            if let Some(flushed) = session.set_online(online) {
                eprintln!(
                    "Back online: {} delivered, {} remaining",
                    flushed.delivered, flushed.remaining
                );
            }
        }
        Step::Show => print!("{}", session.board()),
    }
}

fn report(change: Change) {
    if let Change::Rejected(reason) = change {
        eprintln!("  ignored: {}", reason);
    }
}

fn read_script(script: &str) -> Result<String> {
    if script == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read script from stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(script).with_context(|| format!("Failed to read script {}", script))
    }
}

pub fn parse_script(text: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(step) = parse_line(line).with_context(|| format!("line {}", index + 1))? {
            steps.push(step);
        }
    }
    Ok(steps)
}

pub fn parse_line(line: &str) -> Result<Option<Step>> {
    let line = line.split('#').next().unwrap_or("").trim();
    let words: Vec<String> = line.split_whitespace().map(str::to_lowercase).collect();
    let Some((head, rest)) = words.split_first() else {
        return Ok(None);
    };
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

    let step = match (head.as_str(), rest.as_slice()) {
        ("type", [letters]) => Step::Type(letters.to_string()),
        ("back" | "backspace", []) => Step::Input(Command::Backspace),
        ("left" | "right" | "up" | "down", []) => {
            Step::Input(Command::Arrow(parse_word::<Arrow>(head)?))
        }
        ("toggle", []) => Step::Input(Command::ToggleDirection),
        ("next", []) => Step::Input(Command::NextClue),
        ("prev", []) => Step::Input(Command::PrevClue),
        ("cell", [row, col]) => Step::Input(Command::SelectCell(Pos::new(
            parse_number(row)?,
            parse_number(col)?,
        ))),
        ("clue", [direction, number]) => Step::Input(Command::SelectClue(
            parse_word::<Direction>(direction)?,
            parse_number(number)?,
        )),
        ("check", [scope, flags @ ..]) => Step::Input(Command::Check(
            parse_word::<Scope>(scope)?,
            CheckOptions {
                treat_empty_as_incorrect: has_flag(flags, "empty")?,
            },
        )),
        ("reveal", [scope]) => Step::Input(Command::Reveal(parse_word::<Scope>(scope)?)),
        ("clear", [scope, flags @ ..]) => {
            check_flags(flags, &["revealed", "keep-marks"])?;
            Step::Input(Command::Clear(
                parse_word::<Scope>(scope)?,
                ClearOptions {
                    include_revealed: flags.contains(&"revealed"),
                    clear_marks: !flags.contains(&"keep-marks"),
                },
            ))
        }
        ("pause", []) => Step::Input(Command::TogglePause),
        ("reset", []) => Step::Input(Command::Reset),
        ("tick", []) => Step::Tick(1),
        ("tick", [n]) => Step::Tick(parse_number(n)?),
        ("wait", [ms]) => Step::Wait(parse_number(ms)?),
        ("offline", []) => Step::Online(false),
        ("online", []) => Step::Online(true),
        ("show", []) => Step::Show,
        _ => bail!("unrecognized move: {}", line),
    };
    Ok(Some(step))
}

fn parse_word<T: FromStr>(word: &str) -> Result<T> {
    word.parse().map_err(|_| anyhow!("unexpected word: {}", word))
}

fn parse_number<T: FromStr>(word: &str) -> Result<T> {
    word.parse().map_err(|_| anyhow!("expected a number, got {}", word))
}

fn check_flags(flags: &[&str], allowed: &[&str]) -> Result<()> {
    match flags.iter().find(|flag| !allowed.contains(*flag)) {
        Some(flag) => bail!("unknown option: {}", flag),
        None => Ok(()),
    }
}

fn has_flag(flags: &[&str], flag: &str) -> Result<bool> {
    check_flags(flags, &[flag])?;
    Ok(flags.contains(&flag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   # just a note").unwrap(), None);
    }

    #[test]
    fn test_parse_moves() {
        assert_eq!(
            parse_line("type abc").unwrap(),
            Some(Step::Type("abc".to_string()))
        );
        assert_eq!(
            parse_line("Left").unwrap(),
            Some(Step::Input(Command::Arrow(Arrow::Left)))
        );
        assert_eq!(
            parse_line("cell 2 1  # G").unwrap(),
            Some(Step::Input(Command::SelectCell(Pos::new(2, 1))))
        );
        assert_eq!(
            parse_line("clue down 2").unwrap(),
            Some(Step::Input(Command::SelectClue(Direction::Down, 2)))
        );
        assert_eq!(parse_line("tick").unwrap(), Some(Step::Tick(1)));
        assert_eq!(parse_line("tick 12").unwrap(), Some(Step::Tick(12)));
        assert_eq!(parse_line("wait 800").unwrap(), Some(Step::Wait(800)));
    }

    #[test]
    fn test_parse_assist_options() {
        assert_eq!(
            parse_line("check word empty").unwrap(),
            Some(Step::Input(Command::Check(
                Scope::Word,
                CheckOptions {
                    treat_empty_as_incorrect: true
                }
            )))
        );
        assert_eq!(
            parse_line("clear puzzle revealed").unwrap(),
            Some(Step::Input(Command::Clear(
                Scope::Puzzle,
                ClearOptions {
                    include_revealed: true,
                    clear_marks: true,
                }
            )))
        );
        assert!(parse_line("check word loudly").is_err());
    }

    #[test]
    fn test_bad_lines_are_errors() {
        assert!(parse_line("jump").is_err());
        assert!(parse_line("cell two 1").is_err());
        assert!(parse_line("reveal everything").is_err());
    }

    #[test]
    fn test_script_errors_name_the_line() {
        let err = parse_script("type a\nfly\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }
}
