//! Command-line flags for the game runner
//!
//! Flags are optional overrides on top of Trails.toml; `Cli::into_config`
//! produces the single validated configuration the rest of the program uses.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, OracleConfig};
use crate::error::{Result, TrailsError};
use crate::types::PlayerId;

#[derive(Parser, Debug, Clone)]
#[command(name = "llm-trails", about = "Grid trail game where an LLM picks every move")]
pub struct Cli {
    /// Grid size (NxN)
    #[arg(long)]
    pub size: Option<usize>,

    /// Number of players (2-10)
    #[arg(long)]
    pub players: Option<usize>,

    /// LLM API URL
    #[arg(long)]
    pub url: Option<String>,

    /// Default model name
    #[arg(long)]
    pub model: Option<String>,

    /// Model for one player, as ID=MODEL (repeatable)
    #[arg(long = "player-model", value_name = "ID=MODEL")]
    pub player_models: Vec<String>,

    /// Temperature for the LLM
    #[arg(long)]
    pub temp: Option<f64>,

    /// Max attempts per move before the game is abandoned
    #[arg(long)]
    pub retries: Option<u32>,

    /// Number of games to play (0 for unlimited)
    #[arg(long)]
    pub games: Option<usize>,

    /// Echo prompts and responses
    #[arg(long)]
    pub debug: bool,

    /// Write the per-turn decision log to this file
    #[arg(long)]
    pub log_file: Option<String>,

    /// Seed for starting positions
    #[arg(long)]
    pub seed: Option<u64>,

    /// Path to Trails.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Loads the config file (or defaults), applies the flags, and validates
    pub fn into_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::load_or_default(),
        };
        self.apply(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(size) = self.size {
            config.game.grid_size = size;
        }
        if let Some(players) = self.players {
            config.game.player_count = players;
        }
        if let Some(games) = self.games {
            config.game.games = games;
        }
        if let Some(url) = &self.url {
            config.oracle.url = url.clone();
        }
        if let Some(model) = &self.model {
            config.oracle.model = model.clone();
        }
        if let Some(temp) = self.temp {
            config.oracle.temperature = temp;
        }
        if let Some(retries) = self.retries {
            config.oracle.max_retries = retries;
        }
        for spec in &self.player_models {
            let (id, model) = parse_player_model(spec)?;
            config
                .oracle
                .player_models
                .retain(|key, _| OracleConfig::symbol_of(key) != Some(id));
            config.oracle.player_models.insert(id.to_string(), model);
        }
        if self.debug {
            config.debug.show_prompts = true;
        }
        if let Some(path) = &self.log_file {
            config.debug.enabled = true;
            config.debug.log_file_path = path.clone();
        }
        Ok(())
    }
}

/// Parses "2=mistral" into (player, model)
pub fn parse_player_model(spec: &str) -> Result<(PlayerId, String)> {
    let (id, model) = spec
        .split_once('=')
        .ok_or_else(|| TrailsError::config(format!("invalid player model '{}', expected ID=MODEL", spec)))?;

    let mut chars = id.trim().chars();
    let player = match (chars.next(), chars.next()) {
        (Some(c), None) => PlayerId::from_symbol(c),
        _ => None,
    }
    .ok_or_else(|| TrailsError::config(format!("unknown player id '{}'", id.trim())))?;

    let model = model.trim();
    if model.is_empty() {
        return Err(TrailsError::config(format!("empty model name in '{}'", spec)));
    }
    Ok((player, model.to_string()))
}
