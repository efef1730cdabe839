//! Sync command for replaying queued writes against the API.

use anyhow::{Result, bail};
use minicross::{ExponentialBackoff, SyncTrigger};

use crate::context::Context;

pub fn run(ctx: &Context, retry: bool) -> Result<()> {
    if ctx.user().is_none() {
        bail!("Sync needs a signed-in user (--user or MINICROSS_USER)");
    }

    let pending = ctx.queue.pending_count();
    if pending == 0 {
        println!("Nothing to sync.");
        return Ok(());
    }
    eprintln!("Syncing {} operation(s)...", pending);

    let progress = ctx.progress_store();
    let report = if retry {
        progress.sync_with(SyncTrigger::Manual, &ExponentialBackoff::new())
    } else {
        progress.sync(SyncTrigger::Manual)
    };

    println!(
        "Sync complete: {} delivered, {} remaining",
        report.delivered, report.remaining
    );
    if report.remaining > 0 {
        bail!("{} operation(s) could not be delivered", report.remaining);
    }
    Ok(())
}
