// Statistics aggregated across the games of one run

use std::fmt::Write;
use std::time::Duration;

use crate::engine::GameOutcome;
use crate::types::PlayerId;

/// Win, draw and error tallies plus oracle response times
#[derive(Debug, Clone)]
pub struct Statistics {
    wins: Vec<u32>,
    draws: u32,
    errors: u32,
    total_games: u32,
    response_count: u32,
    response_total: f64,
    response_min: f64,
    response_max: f64,
}

impl Statistics {
    pub fn new(player_count: usize) -> Self {
        Statistics {
            wins: vec![0; player_count],
            draws: 0,
            errors: 0,
            total_games: 0,
            response_count: 0,
            response_total: 0.0,
            response_min: f64::INFINITY,
            response_max: 0.0,
        }
    }

    /// Counts one finished game
    pub fn record(&mut self, outcome: &GameOutcome) {
        self.total_games += 1;
        match outcome {
            GameOutcome::Winner(player) => {
                if let Some(w) = self.wins.get_mut(player.index()) {
                    *w += 1;
                }
            }
            GameOutcome::Draw => self.draws += 1,
            GameOutcome::Error(_) => self.errors += 1,
        }
    }

    /// Counts one successful oracle call
    pub fn record_response_time(&mut self, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        self.response_count += 1;
        self.response_total += secs;
        self.response_min = self.response_min.min(secs);
        self.response_max = self.response_max.max(secs);
    }

    pub fn total_games(&self) -> u32 {
        self.total_games
    }

    pub fn wins(&self, player: PlayerId) -> u32 {
        self.wins.get(player.index()).copied().unwrap_or(0)
    }

    pub fn draws(&self) -> u32 {
        self.draws
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    /// Fraction of all games won, 0 before any game
    pub fn win_rate(&self, player: PlayerId) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            self.wins(player) as f64 / self.total_games as f64
        }
    }

    /// (min, max, average) seconds, None before any call
    pub fn response_times(&self) -> Option<(f64, f64, f64)> {
        if self.response_count == 0 {
            None
        } else {
            Some((
                self.response_min,
                self.response_max,
                self.response_total / self.response_count as f64,
            ))
        }
    }

    pub fn render_report(&self) -> String {
        let mut out = String::new();
        let rule = "-".repeat(40);

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Games Played: {}", self.total_games);
        for index in 0..self.wins.len() {
            let player = PlayerId(index);
            let _ = writeln!(
                out,
                "Player {} Wins: {} ({:.1}%)",
                player,
                self.wins(player),
                self.win_rate(player) * 100.0
            );
        }
        let _ = writeln!(out, "Draws: {}", self.draws);
        let _ = writeln!(out, "Errors: {}", self.errors);
        if let Some((min, max, avg)) = self.response_times() {
            let _ = writeln!(
                out,
                "Response Time: min {:.2}s, max {:.2}s, avg {:.2}s",
                min, max, avg
            );
        }
        let _ = write!(out, "{}", rule);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_rate_is_zero_without_games() {
        let stats = Statistics::new(2);
        assert_eq!(stats.win_rate(PlayerId(0)), 0.0);
        assert!(stats.response_times().is_none());
    }

    #[test]
    fn test_record_outcomes() {
        let mut stats = Statistics::new(3);
        stats.record(&GameOutcome::Winner(PlayerId(1)));
        stats.record(&GameOutcome::Winner(PlayerId(1)));
        stats.record(&GameOutcome::Draw);
        stats.record(&GameOutcome::Error("max retries exceeded".to_string()));

        assert_eq!(stats.total_games(), 4);
        assert_eq!(stats.wins(PlayerId(1)), 2);
        assert_eq!(stats.wins(PlayerId(0)), 0);
        assert_eq!(stats.draws(), 1);
        assert_eq!(stats.errors(), 1);
        assert_eq!(stats.win_rate(PlayerId(1)), 0.5);
    }

    #[test]
    fn test_response_times() {
        let mut stats = Statistics::new(2);
        stats.record_response_time(Duration::from_millis(500));
        stats.record_response_time(Duration::from_millis(1500));

        let (min, max, avg) = stats.response_times().unwrap();
        assert!((min - 0.5).abs() < 1e-9);
        assert!((max - 1.5).abs() < 1e-9);
        assert!((avg - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_mentions_every_player() {
        let mut stats = Statistics::new(2);
        stats.record(&GameOutcome::Winner(PlayerId(0)));
        let report = stats.render_report();
        assert!(report.contains("Player 1 Wins: 1 (100.0%)"));
        assert!(report.contains("Player 2 Wins: 0 (0.0%)"));
        assert!(report.contains("Errors: 0"));
    }
}
