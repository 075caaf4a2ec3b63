// Configuration module for reading Trails.toml
// The merged configuration is built once at startup, validated, and passed by reference.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, TrailsError};
use crate::types::{PlayerId, MAX_PLAYERS};

/// Smallest board that can host the spacing rules and still be playable
pub const MIN_GRID_SIZE: usize = 3;
/// Largest board the console renderer is expected to draw
pub const MAX_GRID_SIZE: usize = 64;
/// Lookahead branches up to four ways per level
pub const MAX_LOOKAHEAD_DEPTH: u8 = 6;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub game: GameConfig,
    pub oracle: OracleConfig,
    pub scores: ScoresConfig,
    pub debug: DebugConfig,
}

/// Board and match parameters
#[derive(Debug, Deserialize, Clone)]
pub struct GameConfig {
    pub grid_size: usize,
    pub player_count: usize,
    /// Number of games to play, 0 plays forever
    pub games: usize,
    pub min_start_distance: i32,
    pub placement_attempts: usize,
    /// How many recent moves the prompt shows
    pub history_window: usize,
}

/// Text-generation endpoint settings
#[derive(Debug, Deserialize, Clone)]
pub struct OracleConfig {
    pub url: String,
    pub model: String,
    pub temperature: f64,
    pub max_retries: u32,
    pub timeout_secs: u64,
    /// Model overrides keyed by player symbol ("1".."9", "A")
    #[serde(default)]
    pub player_models: HashMap<String, String>,
}

impl OracleConfig {
    /// Model used for a player, honouring per-player overrides
    pub fn model_for(&self, player: PlayerId) -> &str {
        self.player_models
            .iter()
            .find(|(key, _)| Self::symbol_of(key) == Some(player))
            .map(|(_, model)| model.as_str())
            .unwrap_or(&self.model)
    }

    /// Player named by an override key, ignoring case and surrounding spaces
    pub fn symbol_of(key: &str) -> Option<PlayerId> {
        let mut chars = key.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => PlayerId::from_symbol(c),
            _ => None,
        }
    }
}

/// Move evaluation weights and lookahead parameters
#[derive(Debug, Deserialize, Clone)]
pub struct ScoresConfig {
    pub weight_territory: f64,
    pub weight_lookahead: f64,
    pub weight_mobility: f64,
    pub weight_center: f64,
    pub lookahead_depth: u8,
    /// Multiplier applied to each deeper lookahead level
    pub lookahead_decay: f64,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub show_prompts: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Trails.toml configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| TrailsError::io("read config file", e))?;

        toml::from_str(&contents)
            .map_err(|e| TrailsError::config(format!("failed to parse config file: {}", e)))
    }

    /// Loads default configuration from Trails.toml in the working directory
    pub fn load_default() -> Result<Self> {
        Self::from_file("Trails.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the values shipped in Trails.toml
    pub fn default_hardcoded() -> Self {
        Config {
            game: GameConfig {
                grid_size: 12,
                player_count: 2,
                games: 1,
                min_start_distance: 3,
                placement_attempts: 1000,
                history_window: 20,
            },
            oracle: OracleConfig {
                url: "http://localhost:11434/api/generate".to_string(),
                model: "llama3.2".to_string(),
                temperature: 0.7,
                max_retries: 3,
                timeout_secs: 120,
                player_models: HashMap::new(),
            },
            scores: ScoresConfig {
                weight_territory: 2.0,
                weight_lookahead: 3.0,
                weight_mobility: 5.0,
                weight_center: 1.0,
                lookahead_depth: 2,
                lookahead_decay: 0.5,
            },
            debug: DebugConfig {
                enabled: false,
                show_prompts: false,
                log_file_path: "trails_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Trails.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Rejects configurations no game can be played with
    pub fn validate(&self) -> Result<()> {
        let game = &self.game;
        if game.player_count < 2 || game.player_count > MAX_PLAYERS {
            return Err(TrailsError::config(format!(
                "number of players must be between 2 and {} (got {})",
                MAX_PLAYERS, game.player_count
            )));
        }
        if game.grid_size < MIN_GRID_SIZE || game.grid_size > MAX_GRID_SIZE {
            return Err(TrailsError::config(format!(
                "grid size must be between {} and {} (got {})",
                MIN_GRID_SIZE, MAX_GRID_SIZE, game.grid_size
            )));
        }
        if game.grid_size * game.grid_size < game.player_count {
            return Err(TrailsError::config(format!(
                "a {}x{} grid cannot seat {} players",
                game.grid_size, game.grid_size, game.player_count
            )));
        }
        if game.min_start_distance < 0 {
            return Err(TrailsError::config("min_start_distance must not be negative"));
        }

        let oracle = &self.oracle;
        if oracle.max_retries == 0 {
            return Err(TrailsError::config("max_retries must be at least 1"));
        }
        if !oracle.temperature.is_finite() || oracle.temperature < 0.0 {
            return Err(TrailsError::config(format!(
                "temperature must be a non-negative number (got {})",
                oracle.temperature
            )));
        }
        let mut overridden = [false; MAX_PLAYERS];
        for key in oracle.player_models.keys() {
            match OracleConfig::symbol_of(key) {
                Some(p) if p.index() < game.player_count => {
                    if std::mem::replace(&mut overridden[p.index()], true) {
                        return Err(TrailsError::config(format!(
                            "more than one model override for player {}",
                            p
                        )));
                    }
                }
                _ => {
                    return Err(TrailsError::config(format!(
                        "model override for unknown player '{}'",
                        key
                    )))
                }
            }
        }

        let scores = &self.scores;
        if scores.lookahead_depth > MAX_LOOKAHEAD_DEPTH {
            return Err(TrailsError::config(format!(
                "lookahead_depth must be at most {} (got {})",
                MAX_LOOKAHEAD_DEPTH, scores.lookahead_depth
            )));
        }
        let weights = [
            scores.weight_territory,
            scores.weight_lookahead,
            scores.weight_mobility,
            scores.weight_center,
            scores.lookahead_decay,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(TrailsError::config(
                "score weights and lookahead_decay must be non-negative numbers",
            ));
        }

        Ok(())
    }
}
