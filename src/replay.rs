// Replay module for analyzing decision logs
//
// This module provides functionality to:
// 1. Parse JSONL decision logs
// 2. Rebuild each pre-move board and re-run the evaluator on it
// 3. Measure how the model's picks relate to the ranked hints
// 4. Generate analysis reports

use log::{info, warn};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::Config;
use crate::debug_logger::TurnRecord;
use crate::error::{Result, TrailsError};
use crate::evaluator::{evaluate_moves, rank, SafetyTier};
use crate::grid::GameState;
use crate::types::{Direction, PlayerId};

/// Result of replaying a single logged decision
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub game: usize,
    pub turn: usize,
    pub player: PlayerId,
    pub chosen_move: Direction,
    /// 0 is the top-ranked move
    pub chosen_rank: Option<usize>,
    pub chosen_tier: Option<SafetyTier>,
    pub best_move: Option<Direction>,
    /// Re-evaluation produced the same ranking as the log
    pub matches_log: bool,
}

impl ReplayResult {
    pub fn followed_best(&self) -> bool {
        self.chosen_rank == Some(0)
    }
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub followed_best: usize,
    pub follow_rate: f64,
    pub death_trap_picks: usize,
    pub ranking_drift: usize,
    pub tier_counts: Vec<(SafetyTier, usize)>,
}

/// Replay engine for analyzing decision logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine { config, verbose }
    }

    /// Loads all records from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<TurnRecord>> {
        let file = File::open(log_path.as_ref()).map_err(|e| TrailsError::io("open log file", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| TrailsError::io(format!("read line {}", line_num + 1), e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: TurnRecord = serde_json::from_str(&line).map_err(|e| {
                TrailsError::config(format!("failed to parse JSON on line {}: {}", line_num + 1, e))
            })?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Re-evaluates one logged decision
    pub fn replay_entry(&self, entry: &TurnRecord) -> Result<ReplayResult> {
        let state = GameState::from_snapshot(&entry.board)?;
        if entry.player.index() >= state.player_count() {
            return Err(TrailsError::config(format!(
                "player index {} is not on the logged board",
                entry.player.index()
            )));
        }

        let ranked = rank(evaluate_moves(&state, &self.config.scores, entry.player));
        let chosen_rank = ranked.iter().position(|e| e.direction == entry.chosen_move);
        let chosen_tier = chosen_rank.map(|i| ranked[i].tier);
        let matches_log = ranked.len() == entry.evaluations.len()
            && ranked
                .iter()
                .zip(&entry.evaluations)
                .all(|(now, then)| now.direction == then.direction && (now.score - then.score).abs() < 1e-6);

        let result = ReplayResult {
            game: entry.game,
            turn: entry.turn,
            player: entry.player,
            chosen_move: entry.chosen_move,
            chosen_rank,
            chosen_tier,
            best_move: ranked.first().map(|e| e.direction),
            matches_log,
        };

        if self.verbose {
            info!(
                "Game {} turn {}: player {} chose {} (rank {:?}, {:?}), best {:?}",
                result.game,
                result.turn,
                result.player,
                result.chosen_move,
                result.chosen_rank.map(|r| r + 1),
                result.chosen_tier,
                result.best_move
            );
        }

        Ok(result)
    }

    /// Replays every entry in parallel, keeping log order
    pub fn replay_all(&self, entries: &[TurnRecord]) -> Vec<ReplayResult> {
        entries
            .par_iter()
            .map(|entry| (entry, self.replay_entry(entry)))
            .collect::<Vec<_>>()
            .into_iter()
            .filter_map(|(entry, result)| match result {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!("Failed to replay game {} turn {}: {}", entry.game, entry.turn, e);
                    None
                }
            })
            .collect()
    }

    /// Entries of one game only
    pub fn filter_game(entries: &[TurnRecord], game: usize) -> Vec<TurnRecord> {
        entries.iter().filter(|e| e.game == game).cloned().collect()
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let followed_best = results.iter().filter(|r| r.followed_best()).count();
        let follow_rate = if total_turns > 0 {
            (followed_best as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };
        let tier_counts = SafetyTier::all()
            .iter()
            .map(|tier| {
                let count = results.iter().filter(|r| r.chosen_tier == Some(*tier)).count();
                (*tier, count)
            })
            .collect();

        ReplayStats {
            total_turns,
            followed_best,
            follow_rate,
            death_trap_picks: results
                .iter()
                .filter(|r| r.chosen_tier == Some(SafetyTier::DeathTrap))
                .count(),
            ranking_drift: results.iter().filter(|r| !r.matches_log).count(),
            tier_counts,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:        {}", stats.total_turns);
        println!("Followed Best Hint: {} ({:.1}%)", stats.followed_best, stats.follow_rate);
        println!("Death Trap Picks:   {}", stats.death_trap_picks);
        println!("Ranking Drift:      {}", stats.ranking_drift);
        println!("═══════════════════════════════════════════════════════════\n");

        println!("Picks by safety tier:");
        for (tier, count) in &stats.tier_counts {
            println!("  {:<10} {}", tier.label(), count);
        }
        println!();

        let traps: Vec<_> = results
            .iter()
            .filter(|r| r.chosen_tier == Some(SafetyTier::DeathTrap))
            .collect();
        if !traps.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DEATH TRAP DECISIONS");
            println!("═══════════════════════════════════════════════════════════");

            for result in traps {
                println!(
                    "Game {} turn {}: player {} chose {} (best was {})",
                    result.game,
                    result.turn,
                    result.player,
                    result.chosen_move,
                    result.best_move.map(|d| d.as_str()).unwrap_or("-")
                );
            }
            println!();
        }
    }
}
