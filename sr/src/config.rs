//! Game configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main SetRace configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Board and deck shape
    pub game: GameConfig,

    /// Round timing
    pub round: RoundConfig,

    /// Freeze durations applied after a verdict
    pub freeze: FreezeConfig,

    /// Player roster and automated input pacing
    pub players: PlayersConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if self.players.count == 0 {
            return Err(eyre::eyre!("players.count must be at least 1"));
        }
        if self.game.board_size == 0 {
            return Err(eyre::eyre!("game.board-size must be at least 1"));
        }
        if self.game.features == 0 || self.game.values < 2 {
            return Err(eyre::eyre!(
                "game.features must be >= 1 and game.values >= 2 (got {} x {})",
                self.game.features,
                self.game.values
            ));
        }
        if self.round.warning_ms > self.round.timeout_ms {
            return Err(eyre::eyre!(
                "round.warning-ms ({}) must not exceed round.timeout-ms ({})",
                self.round.warning_ms,
                self.round.timeout_ms
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .setrace.yml
        let local_config = PathBuf::from(".setrace.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/setrace/setrace.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("setrace").join("setrace.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Board and deck shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of slots on the board
    #[serde(rename = "board-size")]
    pub board_size: usize,

    /// Number of card features (classic Set: 4)
    pub features: usize,

    /// Values per feature (classic Set: 3)
    pub values: usize,

    /// Pacing delay for each card placement/removal, in milliseconds.
    /// Held with the board's write lock so no reader sees a half-updated board.
    #[serde(rename = "table-delay-ms")]
    pub table_delay_ms: u64,

    /// Log the valid groups present after each deal
    pub hints: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 12,
            features: 4,
            values: 3,
            table_delay_ms: 100,
            hints: false,
        }
    }
}

impl GameConfig {
    /// Card placement pacing delay as a Duration
    pub fn table_delay(&self) -> Duration {
        Duration::from_millis(self.table_delay_ms)
    }
}

/// Round timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Per-round time limit in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Window before the deadline in which the countdown switches to
    /// fine-grained (millisecond) updates
    #[serde(rename = "warning-ms")]
    pub warning_ms: u64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            warning_ms: 5_000,
        }
    }
}

impl RoundConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn warning(&self) -> Duration {
        Duration::from_millis(self.warning_ms)
    }
}

/// Freeze durations applied after a verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FreezeConfig {
    /// Freeze after a valid claim, in milliseconds
    #[serde(rename = "point-ms")]
    pub point_ms: u64,

    /// Freeze after an invalid claim, in milliseconds (typically longer)
    #[serde(rename = "penalty-ms")]
    pub penalty_ms: u64,
}

impl Default for FreezeConfig {
    fn default() -> Self {
        Self {
            point_ms: 1_000,
            penalty_ms: 3_000,
        }
    }
}

impl FreezeConfig {
    pub fn point(&self) -> Duration {
        Duration::from_millis(self.point_ms)
    }

    pub fn penalty(&self) -> Duration {
        Duration::from_millis(self.penalty_ms)
    }
}

/// Player roster and automated input pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayersConfig {
    /// Number of players
    pub count: usize,

    /// Delay between generated bot moves, in milliseconds
    #[serde(rename = "bot-delay-ms")]
    pub bot_delay_ms: u64,

    /// RNG seed for the deck shuffle and the bots (reproducible games)
    pub seed: Option<u64>,
}

impl Default for PlayersConfig {
    fn default() -> Self {
        Self {
            count: 2,
            bot_delay_ms: 500,
            seed: None,
        }
    }
}

impl PlayersConfig {
    pub fn bot_delay(&self) -> Duration {
        Duration::from_millis(self.bot_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_classic_game() {
        let config = Config::default();
        assert_eq!(config.game.board_size, 12);
        assert_eq!(config.game.features, 4);
        assert_eq!(config.game.values, 3);
        assert_eq!(config.round.timeout_ms, 60_000);
        assert_eq!(config.freeze.point_ms, 1_000);
        assert_eq!(config.freeze.penalty_ms, 3_000);
        assert_eq!(config.players.count, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_kebab_case_yaml() {
        let yaml = r#"
game:
  board-size: 9
  table-delay-ms: 0
  hints: true
round:
  timeout-ms: 5000
  warning-ms: 1000
freeze:
  penalty-ms: 2000
players:
  count: 4
  seed: 42
"#;
        let config: Config = serde_yaml::from_str(yaml).expect("should parse");
        assert_eq!(config.game.board_size, 9);
        assert_eq!(config.game.table_delay_ms, 0);
        assert!(config.game.hints);
        assert_eq!(config.round.timeout(), Duration::from_secs(5));
        assert_eq!(config.round.warning(), Duration::from_secs(1));
        assert_eq!(config.freeze.penalty(), Duration::from_secs(2));
        // untouched sections keep their defaults
        assert_eq!(config.freeze.point_ms, 1_000);
        assert_eq!(config.players.count, 4);
        assert_eq!(config.players.seed, Some(42));
    }

    #[test]
    fn loads_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "players:\n  count: 3").expect("write");
        let path = file.path().to_path_buf();
        let config = Config::load(Some(&path)).expect("should load");
        assert_eq!(config.players.count, 3);
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        let mut config = Config::default();
        config.players.count = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.game.values = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.round.warning_ms = config.round.timeout_ms + 1;
        assert!(config.validate().is_err());
    }
}
