// Standalone replay tool for analyzing decision logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --game <N>             Only replay one game from the log
//   --verbose              Show detailed output for each turn
//   --config <path>        Path to Trails.toml (default: Trails.toml)

use clap::Parser;
use std::path::PathBuf;
use std::process;

use llm_trails::config::Config;
use llm_trails::replay::ReplayEngine;

#[derive(Parser, Debug)]
#[command(name = "replay", about = "Re-evaluate a trails decision log")]
struct Args {
    /// JSONL decision log written by the game runner
    log_file: PathBuf,

    /// Only replay this game number
    #[arg(long)]
    game: Option<usize>,

    /// Show detailed output for each turn
    #[arg(long)]
    verbose: bool,

    /// Path to Trails.toml
    #[arg(long, default_value = "Trails.toml")]
    config: PathBuf,
}

fn main() {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();

    let config = Config::from_file(&args.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", args.config.display(), e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", args.config.display());
    println!("Replay log file: {}", args.log_file.display());
    println!();

    let engine = ReplayEngine::new(config, args.verbose);

    let mut entries = match engine.load_log_file(&args.log_file) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error loading log file: {}", e);
            process::exit(1);
        }
    };

    if let Some(game) = args.game {
        entries = ReplayEngine::filter_game(&entries, game);
    }

    if entries.is_empty() {
        eprintln!("Error: No log entries to replay");
        process::exit(1);
    }

    println!("Replaying {} decisions...\n", entries.len());
    let results = engine.replay_all(&entries);
    engine.print_report(&results);
}
