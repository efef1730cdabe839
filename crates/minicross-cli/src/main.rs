mod cli;
mod commands;
mod context;
mod http;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use context::Context;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    // Default to warn when RUST_LOG is unset
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("minicross_cli=warn,minicross=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Command::Validate { file, strict } = &args.command {
        return commands::validate::run(file, *strict, args.date);
    }

    let ctx = Context::from_args(&args)?;
    match args.command {
        Command::Validate { .. } => Ok(()),
        Command::Clues { json } => commands::clues::run(&ctx, json),
        Command::Play {
            script,
            site_url,
            offline,
        } => commands::play::run(&ctx, &script, &site_url, offline),
        Command::Stats { json } => commands::stats::run(&ctx, json),
        Command::Pending { json } => commands::pending::run(&ctx, json),
        Command::Sync { retry } => commands::sync::run(&ctx, retry),
        Command::Completions { limit } => commands::completions::run(&ctx, limit),
        Command::Profile { name, settings } => commands::profile::run(&ctx, name, &settings),
    }
}
