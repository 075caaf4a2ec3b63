//! Error types for the trails game

use thiserror::Error;

use crate::types::{Direction, PlayerId, Position};

/// Reasons an oracle response could not be turned into a legal direction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("could not parse direction from response")]
    NoDirection,

    #[error("direction '{0}' is not valid")]
    NotLegal(Direction),
}

/// Main error type for the crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TrailsError {
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("unparseable move: {0}")]
    Parse(#[from] ParseError),

    #[error("oracle request failed: {message}")]
    OracleTransport { message: String },

    #[error("player {player} gave no valid move after {attempts} attempts")]
    RetriesExhausted { player: PlayerId, attempts: u32 },

    #[error("illegal move: player {player} cannot move {direction} to {target}")]
    IllegalMove {
        player: PlayerId,
        direction: Direction,
        target: Position,
    },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TrailsError {
    pub fn config(message: impl Into<String>) -> Self {
        TrailsError::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        TrailsError::Io {
            operation: operation.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for TrailsError {
    fn from(err: reqwest::Error) -> Self {
        TrailsError::OracleTransport {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrailsError>;
