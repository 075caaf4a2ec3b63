// Library exports for the LLM trails game
// The runner and the replay tool both build on these modules.

pub mod cli;
pub mod config;
pub mod debug_logger;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod grid;
pub mod oracle;
pub mod prompt;
pub mod render;
pub mod replay;
pub mod rules;
pub mod stats;
pub mod types;
