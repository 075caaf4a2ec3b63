// Debug logging module for the per-turn decision log
//
// Records are handed to a background tokio task over a channel so the game
// loop never waits on disk. One JSON object per line, written in turn order.

use log::error;
use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::evaluator::MoveEvaluation;
use crate::grid::BoardSnapshot;
use crate::types::{Direction, PlayerId};

/// One logged decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub game: usize,
    pub turn: usize,
    pub player: PlayerId,
    pub chosen_move: Direction,
    /// Evaluations of every legal move, best first
    pub evaluations: Vec<MoveEvaluation>,
    /// Board before the move was applied
    pub board: BoardSnapshot,
    pub response: String,
    pub attempts: u32,
    pub response_time_ms: u64,
    pub timestamp: String,
}

/// Handle to the decision log writer
pub struct DebugLogger {
    sender: Option<UnboundedSender<TurnRecord>>,
    writer: Option<JoinHandle<()>>,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                let (sender, receiver) = mpsc::unbounded_channel();
                let writer = tokio::spawn(Self::write_loop(file, receiver));
                DebugLogger {
                    sender: Some(sender),
                    writer: Some(writer),
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            sender: None,
            writer: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Queues a record without blocking the caller
    pub fn log_turn(&self, record: TurnRecord) {
        if let Some(sender) = &self.sender {
            if sender.send(record).is_err() {
                error!("Debug log writer has stopped; dropping record");
            }
        }
    }

    /// Flushes queued records and stops the writer
    pub async fn shutdown(mut self) {
        self.sender.take();
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.await {
                error!("Debug log writer failed: {}", e);
            }
        }
    }

    async fn write_loop(mut file: File, mut receiver: UnboundedReceiver<TurnRecord>) {
        while let Some(record) = receiver.recv().await {
            match serde_json::to_string(&record) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}
