//! SetRace - concurrent round engine for the Set card game
//!
//! CLI entry point: loads configuration, wires the actors and runs one game.

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use setrace::cli::{Cli, Command};
use setrace::config::Config;
use setrace::game::Game;
use setrace::ui::LogUi;
use setrules::Classic;

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let level = if let Some(s) = cli_log_level {
        match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        }
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command {
        Some(Command::Config) => {
            debug!("main: matched Config command");
            cmd_config(&config)
        }
        Some(Command::Run {
            players,
            seed,
            round_ms,
            hints,
        }) => {
            debug!(?players, ?seed, ?round_ms, hints, "main: matched Run command");
            cmd_run(config, players, seed, round_ms, hints).await
        }
        None => {
            debug!("main: no command specified, running with config defaults");
            cmd_run(config, None, None, None, false).await
        }
    }
}

/// Print the effective configuration
fn cmd_config(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    println!("{}", yaml);
    Ok(())
}

/// Run a game to completion
async fn cmd_run(
    mut config: Config,
    players: Option<usize>,
    seed: Option<u64>,
    round_ms: Option<u64>,
    hints: bool,
) -> Result<()> {
    if let Some(players) = players {
        debug!(players, "cmd_run: overriding players.count");
        config.players.count = players;
    }
    if let Some(seed) = seed {
        debug!(seed, "cmd_run: overriding players.seed");
        config.players.seed = Some(seed);
    }
    if let Some(round_ms) = round_ms {
        debug!(round_ms, "cmd_run: overriding round.timeout-ms");
        config.round.timeout_ms = round_ms;
    }
    if hints {
        config.game.hints = true;
    }
    config.validate().context("Invalid configuration")?;

    let rules = Arc::new(Classic::new(config.game.features, config.game.values));
    info!(
        players = config.players.count,
        deck = config.game.values.pow(config.game.features as u32),
        round_ms = config.round.timeout_ms,
        "starting game"
    );

    let game = Game::new(config, rules, Arc::new(LogUi));
    let (handle, task) = game.spawn();

    // first Ctrl+C ends the game cleanly and still reports winners
    let ctrl_c = {
        let handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Ctrl+C received, stopping the game");
                handle.stop();
            }
        })
    };

    let outcome = task.await.context("Game task panicked")??;
    ctrl_c.abort();

    println!();
    println!("{}", "Final scores".bold());
    for (id, score) in outcome.scores.iter().enumerate() {
        let line = format!("  player {}: {}", id, score);
        if outcome.winners.contains(&id) {
            println!("{}", line.green().bold());
        } else {
            println!("{}", line);
        }
    }
    let winners: Vec<String> = outcome.winners.iter().map(|w| format!("player {}", w)).collect();
    println!();
    println!("{} {}", "Winner:".bold(), winners.join(", ").green().bold());

    Ok(())
}
