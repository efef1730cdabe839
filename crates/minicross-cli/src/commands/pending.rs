//! Pending command for inspecting the sync queue.

use anyhow::Result;
use minicross::SyncPayload;

use crate::context::Context;

pub fn run(ctx: &Context, json: bool) -> Result<()> {
    let ops = ctx.queue.operations();

    if json {
        println!("{}", serde_json::to_string_pretty(&ops)?);
        return Ok(());
    }

    if ops.is_empty() {
        println!("Nothing waiting to sync.");
        return Ok(());
    }
    println!("{} operation(s) waiting to sync:", ops.len());
    for op in &ops {
        let detail = match &op.payload {
            SyncPayload::Progress(snapshot) => format!(
                "progress, {}s{}",
                snapshot.seconds,
                if snapshot.completed { ", completed" } else { "" }
            ),
            SyncPayload::Completion(record) => match record.errors {
                Some(errors) => format!("completion, {}s, {} error(s)", record.seconds, errors),
                None => format!("completion, {}s, assisted", record.seconds),
            },
        };
        println!(
            "  {} {} ({}, queued {} by {})",
            op.date,
            detail,
            op.id,
            op.created_at.format("%Y-%m-%d %H:%M"),
            op.user.as_deref().unwrap_or("guest")
        );
    }
    Ok(())
}
