//! CLI argument parsing tests.
//!
//! These tests verify that command-line arguments are parsed correctly
//! without actually executing the commands (which would touch the data
//! directory and the network).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

// Re-create Args structure for testing since it's not publicly exported
#[derive(Parser)]
#[command(name = "minicross")]
struct Args {
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long)]
    api_endpoint: Option<String>,

    #[arg(long)]
    user: Option<String>,

    #[arg(long)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    Validate {
        file: PathBuf,
        #[arg(long)]
        strict: bool,
    },
    Clues {
        #[arg(long)]
        json: bool,
    },
    Play {
        #[arg(default_value = "-")]
        script: String,
        #[arg(long, default_value = "https://minicross.app")]
        site_url: String,
        #[arg(long)]
        offline: bool,
    },
    Stats {
        #[arg(long)]
        json: bool,
    },
    Pending {
        #[arg(long)]
        json: bool,
    },
    Sync {
        #[arg(long)]
        retry: bool,
    },
    Completions {
        #[arg(long, default_value_t = 200)]
        limit: usize,
    },
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        settings: Vec<String>,
    },
}

#[test]
fn test_subcommand_is_required() {
    assert!(Args::try_parse_from(["minicross"]).is_err());
}

#[test]
fn test_parse_validate() {
    let args = Args::try_parse_from(["minicross", "validate", "puzzle.json", "--strict"]).unwrap();
    match args.command {
        Command::Validate { file, strict } => {
            assert_eq!(file, PathBuf::from("puzzle.json"));
            assert!(strict);
        }
        _ => panic!("Expected Validate command"),
    }
}

#[test]
fn test_parse_play_defaults() {
    let args = Args::try_parse_from(["minicross", "play"]).unwrap();
    match args.command {
        Command::Play {
            script,
            site_url,
            offline,
        } => {
            assert_eq!(script, "-");
            assert_eq!(site_url, "https://minicross.app");
            assert!(!offline);
        }
        _ => panic!("Expected Play command"),
    }
}

#[test]
fn test_parse_play_script_file() {
    let args = Args::try_parse_from(["minicross", "play", "moves.txt", "--offline"]).unwrap();
    match args.command {
        Command::Play {
            script, offline, ..
        } => {
            assert_eq!(script, "moves.txt");
            assert!(offline);
        }
        _ => panic!("Expected Play command"),
    }
}

#[test]
fn test_parse_global_options() {
    let args = Args::try_parse_from([
        "minicross",
        "--date",
        "2025-09-27",
        "--user",
        "u1",
        "--data-dir",
        "/tmp/mc",
        "clues",
        "--json",
    ])
    .unwrap();
    assert_eq!(args.date, NaiveDate::from_ymd_opt(2025, 9, 27));
    assert_eq!(args.user.as_deref(), Some("u1"));
    assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/mc")));
    assert!(args.config.is_none());
    assert!(args.api_endpoint.is_none());
    assert!(matches!(args.command, Command::Clues { json: true }));
}

#[test]
fn test_invalid_date_fails() {
    assert!(Args::try_parse_from(["minicross", "--date", "2025-09-27", "stats"]).is_ok());
    let result = Args::try_parse_from(["minicross", "--date", "27/09/2025", "stats"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_pending_json() {
    let args = Args::try_parse_from(["minicross", "pending", "--json"]).unwrap();
    assert!(matches!(args.command, Command::Pending { json: true }));
}

#[test]
fn test_parse_completions_limit() {
    let args = Args::try_parse_from(["minicross", "completions"]).unwrap();
    assert!(matches!(args.command, Command::Completions { limit: 200 }));

    let args = Args::try_parse_from(["minicross", "completions", "--limit", "5"]).unwrap();
    assert!(matches!(args.command, Command::Completions { limit: 5 }));
}

#[test]
fn test_parse_sync_retry() {
    let args = Args::try_parse_from(["minicross", "sync", "--retry"]).unwrap();
    assert!(matches!(args.command, Command::Sync { retry: true }));
}

#[test]
fn test_parse_profile_settings() {
    let args = Args::try_parse_from([
        "minicross",
        "profile",
        "--name",
        "Ada",
        "--set",
        "theme=dark",
        "--set",
        "smart_navigation=false",
    ])
    .unwrap();
    match args.command {
        Command::Profile { name, settings } => {
            assert_eq!(name.as_deref(), Some("Ada"));
            assert_eq!(settings, vec!["theme=dark", "smart_navigation=false"]);
        }
        _ => panic!("Expected Profile command"),
    }
}

#[test]
fn test_invalid_command_fails() {
    let result = Args::try_parse_from(["minicross", "invalid-command"]);
    assert!(result.is_err());
}

#[test]
fn test_missing_required_arg_fails() {
    // validate requires a file
    let result = Args::try_parse_from(["minicross", "validate"]);
    assert!(result.is_err());
}
