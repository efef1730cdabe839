//! Completions command for listing solves recorded remotely.

use anyhow::{Context as _, Result};
use minicross::format_clock;

use crate::context::Context;

pub fn run(ctx: &Context, limit: usize) -> Result<()> {
    let Some(user) = ctx.user() else {
        println!("Not signed in; no remote completions.");
        return Ok(());
    };
    let rows = ctx
        .progress_store()
        .list_completions(limit)
        .context("Failed to list completions")?;

    if rows.is_empty() {
        println!("No completions recorded for {}.", user);
        return Ok(());
    }
    for row in &rows {
        let time = row.seconds.map_or_else(|| "-".to_string(), format_clock);
        let errors = row
            .errors
            .map_or_else(|| "assisted".to_string(), |e| format!("{} error(s)", e));
        println!("{}  {:>6}  {}", row.date, time, errors);
    }
    Ok(())
}
