//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SetRace - concurrent round engine for the Set card game
#[derive(Parser)]
#[command(
    name = "sr",
    about = "Concurrent round engine for the Set card game",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a game to completion (the default)
    Run {
        /// Number of players
        #[arg(short, long)]
        players: Option<usize>,

        /// RNG seed for a reproducible game
        #[arg(short, long)]
        seed: Option<u64>,

        /// Per-round time limit in milliseconds
        #[arg(long = "round-ms")]
        round_ms: Option<u64>,

        /// Log the valid groups present after each deal
        #[arg(long)]
        hints: bool,
    },

    /// Print the effective configuration as YAML
    Config,
}
