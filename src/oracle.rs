// Move oracle: the external decision maker asked for one direction per turn
//
// The core only sees the `MoveOracle` trait. `OllamaOracle` is the HTTP
// adapter for an Ollama-style /api/generate endpoint. `request_move` wraps any
// oracle in the bounded re-prompting loop.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::OracleConfig;
use crate::error::{ParseError, Result, TrailsError};
use crate::grid::PlayerProfile;
use crate::prompt::format_moves;
use crate::types::{Direction, PlayerId};

/// Everything the oracle is told for one attempt
#[derive(Debug, Clone)]
pub struct OracleRequest<'a> {
    pub player: PlayerId,
    pub prompt: &'a str,
    pub legal: &'a [Direction],
    pub model: &'a str,
    pub temperature: f64,
}

/// Source of free-text move answers.
/// Transport failures are returned as errors and are never retried.
#[allow(async_fn_in_trait)]
pub trait MoveOracle {
    async fn complete(&mut self, request: &OracleRequest<'_>) -> Result<String>;
}

/// A successfully parsed oracle answer
#[derive(Debug, Clone)]
pub struct OracleReply {
    pub direction: Direction,
    pub response: String,
    pub attempts: u32,
    pub response_time: Duration,
}

/// Extracts a legal direction from a free-text response.
///
/// An exact (trimmed, case-insensitive) match wins. Otherwise the first
/// standalone direction word decides; hyphenated words such as "up-left" count
/// as a single word and match nothing.
pub fn parse_direction(response: &str, legal: &[Direction]) -> std::result::Result<Direction, ParseError> {
    let normalized = response.trim().to_lowercase();

    if let Some(dir) = Direction::from_name(&normalized) {
        if legal.contains(&dir) {
            return Ok(dir);
        }
    }

    let first = normalized
        .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .find_map(Direction::from_name)
        .ok_or(ParseError::NoDirection)?;

    if legal.contains(&first) {
        Ok(first)
    } else {
        Err(ParseError::NotLegal(first))
    }
}

/// Text appended to the prompt after an unusable answer
pub fn retry_suffix(response: &str, legal: &[Direction]) -> String {
    format!(
        "\n\nYour previous response '{}' was invalid. Please respond with exactly one word: {}",
        response,
        format_moves(legal)
    )
}

/// Asks the oracle for a move, re-prompting after unparseable answers
///
/// # Arguments
/// * `oracle` - The decision maker
/// * `player` - Player whose turn it is
/// * `prompt` - Rendered game description
/// * `legal` - Non-empty set of legal directions
/// * `profile` - Model and temperature for this player
/// * `max_retries` - Total number of attempts allowed
/// * `show_prompts` - Echo prompts and responses to the log
///
/// # Returns
/// The parsed reply, `RetriesExhausted` once every attempt failed to parse, or
/// the oracle's own error on the first transport failure
pub async fn request_move<O: MoveOracle>(
    oracle: &mut O,
    player: PlayerId,
    prompt: String,
    legal: &[Direction],
    profile: &PlayerProfile,
    max_retries: u32,
    show_prompts: bool,
) -> Result<OracleReply> {
    let mut prompt = prompt;

    for attempt in 1..=max_retries {
        if attempt > 1 {
            info!("Retry {}/{}...", attempt - 1, max_retries);
        }
        if show_prompts {
            info!("\n=== PROMPT ===\n{}\n=== END PROMPT ===", prompt);
        }

        let request = OracleRequest {
            player,
            prompt: &prompt,
            legal,
            model: &profile.model,
            temperature: profile.temperature,
        };

        let start = Instant::now();
        let response = oracle.complete(&request).await?;
        let response_time = start.elapsed();

        if show_prompts {
            info!("=== RESPONSE ({:.2}s) ===\n{}", response_time.as_secs_f64(), response);
        }

        match parse_direction(&response, legal) {
            Ok(direction) => {
                return Ok(OracleReply {
                    direction,
                    response,
                    attempts: attempt,
                    response_time,
                })
            }
            Err(e) => {
                warn!("Invalid response from player {}: {} (Error: {})", player, response, e);
                prompt.push_str(&retry_suffix(&response, legal));
            }
        }
    }

    Err(TrailsError::RetriesExhausted {
        player,
        attempts: max_retries,
    })
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Oracle backed by an Ollama-compatible text generation endpoint
pub struct OllamaOracle {
    client: reqwest::Client,
    url: String,
}

impl OllamaOracle {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(OllamaOracle {
            client,
            url: config.url.clone(),
        })
    }
}

impl MoveOracle for OllamaOracle {
    async fn complete(&mut self, request: &OracleRequest<'_>) -> Result<String> {
        let body = GenerateRequest {
            model: request.model,
            prompt: request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
            },
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: GenerateResponse = response.json().await?;

        Ok(parsed.response.trim().to_string())
    }
}
