//! Stats command for showing local play statistics.

use anyhow::Result;
use minicross::{GUEST, StatsStore, format_elapsed};

use crate::context::Context;

pub fn run(ctx: &Context, json: bool) -> Result<()> {
    let user = ctx.user().unwrap_or(GUEST);
    let stats = StatsStore::new(ctx.local_store()).load(user);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let totals = &stats.totals;
    println!("Stats for {}", user);
    println!("  Played:     {}", totals.played);
    println!("  Completed:  {}", totals.completed);
    println!("  Assisted:   {}", totals.reveals);
    println!("  Errors:     {}", totals.errors);
    println!(
        "  Best time:  {}",
        totals
            .best_time_secs
            .map_or_else(|| "-".to_string(), format_elapsed)
    );
    println!(
        "  Average:    {}",
        stats
            .average_time_secs()
            .map_or_else(|| "-".to_string(), format_elapsed)
    );
    println!(
        "  Streak:     {} (longest {})",
        stats.current_streak, stats.longest_streak
    );
    if let Some(day) = stats.last_clean_day {
        println!("  Last clean: {}", day);
    }
    Ok(())
}
