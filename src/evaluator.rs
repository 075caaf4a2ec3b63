//! Territory and mobility evaluation of candidate moves
//!
//! Each candidate is scored against a simulated visitation view: the real
//! visited set plus the cells the simulated head has entered. Other players are
//! assumed to stay put, so territory is "free space reachable if nobody else
//! moves", not an adversarial estimate. The result only ranks moves for the
//! prompt; it never restricts legality.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::config::ScoresConfig;
use crate::grid::{GameState, VisitedSet};
use crate::rules::{neighbor, valid_moves};
use crate::types::{Direction, PlayerId, Position};

/// Coarse, threshold-based label for a candidate move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyTier {
    Excellent,
    Good,
    Moderate,
    Risky,
    Dangerous,
    DeathTrap,
}

impl SafetyTier {
    /// Classifies in priority order; zero mobility always wins
    pub fn classify(immediate_mobility: usize, territory: usize) -> SafetyTier {
        if immediate_mobility == 0 {
            SafetyTier::DeathTrap
        } else if territory >= 20 && immediate_mobility >= 3 {
            SafetyTier::Excellent
        } else if territory >= 12 && immediate_mobility >= 2 {
            SafetyTier::Good
        } else if immediate_mobility >= 2 && territory >= 6 {
            SafetyTier::Moderate
        } else if immediate_mobility == 1 || territory < 5 {
            SafetyTier::Risky
        } else {
            SafetyTier::Dangerous
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SafetyTier::Excellent => "EXCELLENT",
            SafetyTier::Good => "GOOD",
            SafetyTier::Moderate => "MODERATE",
            SafetyTier::Risky => "RISKY",
            SafetyTier::Dangerous => "DANGEROUS",
            SafetyTier::DeathTrap => "DEATH TRAP",
        }
    }

    pub fn all() -> [SafetyTier; 6] {
        [
            SafetyTier::Excellent,
            SafetyTier::Good,
            SafetyTier::Moderate,
            SafetyTier::Risky,
            SafetyTier::Dangerous,
            SafetyTier::DeathTrap,
        ]
    }
}

impl fmt::Display for SafetyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ephemeral analysis of one candidate direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveEvaluation {
    pub direction: Direction,
    pub target: Position,
    pub immediate_mobility: usize,
    pub territory: usize,
    pub lookahead_mobility: f64,
    /// Squared distance to the board centre
    pub center_distance: f64,
    pub score: f64,
    pub tier: SafetyTier,
}

/// Visitation view over the real set plus a short list of simulated entries.
/// Branching copies only the overlay, never the grid.
#[derive(Debug, Clone)]
pub struct SimulatedVisits<'a> {
    base: &'a VisitedSet,
    size: i32,
    extra: Vec<Position>,
}

impl<'a> SimulatedVisits<'a> {
    pub fn new(state: &'a GameState) -> Self {
        SimulatedVisits {
            base: state.visited(),
            size: state.size() as i32,
            extra: Vec::new(),
        }
    }

    /// New view with `pos` additionally visited
    pub fn with(&self, pos: Position) -> Self {
        let mut extra = Vec::with_capacity(self.extra.len() + 1);
        extra.extend_from_slice(&self.extra);
        extra.push(pos);
        SimulatedVisits {
            base: self.base,
            size: self.size,
            extra,
        }
    }

    /// On the board and not visited, really or in simulation
    pub fn is_open(&self, pos: &Position) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && pos.row < self.size
            && pos.col < self.size
            && !self.base.contains(pos)
            && !self.extra.contains(pos)
    }

    fn open_neighbors(&self, pos: &Position) -> impl Iterator<Item = Position> {
        Direction::all()
            .map(|dir| Some(neighbor(pos, dir)).filter(|next| self.is_open(next)))
            .into_iter()
            .flatten()
    }
}

/// Number of open neighbours (0..=4)
pub fn immediate_mobility(sim: &SimulatedVisits<'_>, pos: &Position) -> usize {
    sim.open_neighbors(pos).count()
}

/// Size of the open region reachable from `pos` by 4-way adjacency (BFS).
/// `pos` itself is expected to be visited in `sim` and is not counted.
pub fn reachable_territory(sim: &SimulatedVisits<'_>, pos: &Position) -> usize {
    let size = sim.size.max(0) as usize;
    let mut seen = vec![false; size * size];
    let mut queue = VecDeque::new();
    let mut count = 0;

    queue.push_back(*pos);
    while let Some(current) = queue.pop_front() {
        for next in sim.open_neighbors(&current) {
            let idx = next.row as usize * size + next.col as usize;
            if !seen[idx] {
                seen[idx] = true;
                count += 1;
                queue.push_back(next);
            }
        }
    }

    count
}

/// Average near-future mobility. Each open neighbour contributes its own
/// mobility plus `decay` times its deeper average; levels average over
/// their branching factor.
pub fn lookahead_mobility(sim: &SimulatedVisits<'_>, pos: &Position, depth: u8, decay: f64) -> f64 {
    if depth == 0 {
        return 0.0;
    }

    let children: Vec<Position> = sim.open_neighbors(pos).collect();
    if children.is_empty() {
        return 0.0;
    }

    let total: f64 = children
        .iter()
        .map(|child| {
            let deeper = sim.with(*child);
            immediate_mobility(&deeper, child) as f64
                + decay * lookahead_mobility(&deeper, child, depth - 1, decay)
        })
        .sum();

    total / children.len() as f64
}

/// Squared euclidean distance to the geometric centre
pub fn center_distance(pos: &Position, size: usize) -> f64 {
    let center = (size as f64 - 1.0) / 2.0;
    let dr = pos.row as f64 - center;
    let dc = pos.col as f64 - center;
    dr * dr + dc * dc
}

/// 1.0 at the centre, 0.0 in a corner
pub fn center_proximity(center_distance: f64, size: usize) -> f64 {
    let max_distance = corner_distance(size);
    if max_distance <= 0.0 {
        return 1.0;
    }
    (max_distance - center_distance) / max_distance
}

fn corner_distance(size: usize) -> f64 {
    center_distance(&Position::new(0, 0), size)
}

/// Weighted sum of the evaluation components
pub fn total_score(
    scores: &ScoresConfig,
    immediate_mobility: usize,
    territory: usize,
    lookahead_mobility: f64,
    center_proximity: f64,
) -> f64 {
    scores.weight_territory * territory as f64
        + scores.weight_lookahead * lookahead_mobility
        + scores.weight_mobility * immediate_mobility as f64
        + scores.weight_center * center_proximity
}

/// Evaluates moving from `from` in `direction`
///
/// # Arguments
/// * `state` - Current game state; only its visited set and size are read
/// * `scores` - Weights and lookahead parameters
/// * `from` - Head position of the moving player
/// * `direction` - Candidate direction
pub fn evaluate(
    state: &GameState,
    scores: &ScoresConfig,
    from: &Position,
    direction: Direction,
) -> MoveEvaluation {
    let target = neighbor(from, direction);
    let sim = SimulatedVisits::new(state).with(target);

    let mobility = immediate_mobility(&sim, &target);
    let territory = reachable_territory(&sim, &target);
    let lookahead = lookahead_mobility(&sim, &target, scores.lookahead_depth, scores.lookahead_decay);
    let distance = center_distance(&target, state.size());
    let proximity = center_proximity(distance, state.size());

    MoveEvaluation {
        direction,
        target,
        immediate_mobility: mobility,
        territory,
        lookahead_mobility: lookahead,
        center_distance: distance,
        score: total_score(scores, mobility, territory, lookahead, proximity),
        tier: SafetyTier::classify(mobility, territory),
    }
}

/// Evaluates every legal move of a player, in enumeration order
pub fn evaluate_moves(state: &GameState, scores: &ScoresConfig, player: PlayerId) -> Vec<MoveEvaluation> {
    let head = state.position(player);
    valid_moves(state, player)
        .into_iter()
        .map(|dir| evaluate(state, scores, &head, dir))
        .collect()
}

/// Highest score first; ties keep their original order
pub fn rank(mut evaluations: Vec<MoveEvaluation>) -> Vec<MoveEvaluation> {
    evaluations.sort_by(|a, b| b.score.total_cmp(&a.score));
    evaluations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn scores() -> ScoresConfig {
        Config::default_hardcoded().scores
    }

    #[test]
    fn test_evaluate_open_corner_move() {
        let state = GameState::from_rows(&["1..", "...", "..2"]).unwrap();

        let eval = evaluate(&state, &scores(), &Position::new(0, 0), Direction::Right);

        assert_eq!(eval.target, Position::new(0, 1));
        assert_eq!(eval.immediate_mobility, 2);
        assert_eq!(eval.territory, 6);
        assert!((eval.lookahead_mobility - 2.5).abs() < 1e-9);
        assert!((eval.center_distance - 1.0).abs() < 1e-9);
        assert!((eval.score - 30.0).abs() < 1e-9);
        assert_eq!(eval.tier, SafetyTier::Moderate);
    }

    #[test]
    fn test_dead_end_is_death_trap() {
        let state = GameState::from_rows(&["1.░", "▒▒▒", "..2"]).unwrap();

        let eval = evaluate(&state, &scores(), &Position::new(0, 0), Direction::Right);

        assert_eq!(eval.immediate_mobility, 0);
        assert_eq!(eval.territory, 0);
        assert_eq!(eval.lookahead_mobility, 0.0);
        assert_eq!(eval.tier, SafetyTier::DeathTrap);
        assert!((eval.score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_territory_stops_at_walls() {
        // Column 2 is a wall of trails; only the left pocket is reachable
        let state = GameState::from_rows(&[
            "1.░...",
            "..░...",
            "..░...",
            "..░...",
            "..░...",
            "..░..2",
        ])
        .unwrap();

        let sim = SimulatedVisits::new(&state).with(Position::new(0, 1));
        assert_eq!(reachable_territory(&sim, &Position::new(0, 1)), 10);
    }

    #[test]
    fn test_simulated_visits_do_not_touch_real_state() {
        let state = GameState::from_rows(&["1..", "...", "..2"]).unwrap();
        let sim = SimulatedVisits::new(&state).with(Position::new(1, 1));

        assert!(!sim.is_open(&Position::new(1, 1)));
        assert!(!state.visited().contains(&Position::new(1, 1)));
        assert!(!sim.is_open(&Position::new(-1, 0)));
    }

    #[test]
    fn test_death_trap_regardless_of_territory() {
        assert_eq!(SafetyTier::classify(0, 0), SafetyTier::DeathTrap);
        assert_eq!(SafetyTier::classify(0, 500), SafetyTier::DeathTrap);
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(SafetyTier::classify(3, 20), SafetyTier::Excellent);
        assert_eq!(SafetyTier::classify(2, 20), SafetyTier::Good);
        assert_eq!(SafetyTier::classify(2, 12), SafetyTier::Good);
        assert_eq!(SafetyTier::classify(4, 11), SafetyTier::Moderate);
        assert_eq!(SafetyTier::classify(2, 5), SafetyTier::Dangerous);
        assert_eq!(SafetyTier::classify(1, 40), SafetyTier::Risky);
        assert_eq!(SafetyTier::classify(3, 4), SafetyTier::Risky);
    }

    #[test]
    fn test_score_components_are_monotonic() {
        let s = scores();
        let base = total_score(&s, 2, 10, 1.5, 0.5);
        assert!(total_score(&s, 3, 10, 1.5, 0.5) > base);
        assert!(total_score(&s, 2, 11, 1.5, 0.5) > base);
        assert!(total_score(&s, 2, 10, 2.0, 0.5) > base);
    }

    #[test]
    fn test_center_proximity_bounds() {
        assert!((center_proximity(center_distance(&Position::new(0, 0), 12), 12)).abs() < 1e-9);
        let middle = center_distance(&Position::new(5, 5), 12);
        assert!(center_proximity(middle, 12) > 0.9);
        assert_eq!(center_proximity(0.0, 1), 1.0);
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let state = GameState::from_rows(&["1..", "...", "..2"]).unwrap();
        let evaluations = evaluate_moves(&state, &scores(), PlayerId(0));
        assert_eq!(evaluations.len(), 2);
        // Down and Right are mirror images across the diagonal
        assert_eq!(evaluations[0].score, evaluations[1].score);

        let ranked = rank(evaluations);
        assert_eq!(ranked[0].direction, Direction::Down);
        assert_eq!(ranked[1].direction, Direction::Right);
    }

    #[test]
    fn test_rank_orders_by_score() {
        let state = GameState::from_rows(&[".....", ".....", "..1..", "░....", "2...."]).unwrap();
        let ranked = rank(evaluate_moves(&state, &scores(), PlayerId(0)));
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
