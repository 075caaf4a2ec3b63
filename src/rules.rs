// Move legality and directional geometry
//
// Legality does not depend on who asks: a cell visited by anyone, including
// the asking player, is blocked for everyone.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::grid::GameState;
use crate::types::{Direction, PlayerId, Position};

/// Why a direction cannot be taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    OutOfBounds,
    AlreadyVisited,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::OutOfBounds => "out of bounds",
            BlockReason::AlreadyVisited => "already visited",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Neighbouring position in the given direction
pub fn neighbor(pos: &Position, direction: Direction) -> Position {
    direction.apply(pos)
}

/// A position is legal when it is on the board and nobody has visited it
pub fn is_legal(state: &GameState, pos: &Position) -> bool {
    state.board().in_bounds(pos) && !state.visited().contains(pos)
}

/// Legal directions for a player, in Up, Down, Left, Right order
pub fn valid_moves(state: &GameState, player: PlayerId) -> Vec<Direction> {
    let head = state.position(player);
    Direction::all()
        .iter()
        .filter(|dir| is_legal(state, &neighbor(&head, **dir)))
        .copied()
        .collect()
}

/// Every non-legal direction with its reason. Bounds are checked first.
pub fn blocked_moves(state: &GameState, player: PlayerId) -> Vec<(Direction, BlockReason)> {
    let head = state.position(player);
    Direction::all()
        .iter()
        .filter_map(|&dir| {
            let next = neighbor(&head, dir);
            if !state.board().in_bounds(&next) {
                Some((dir, BlockReason::OutOfBounds))
            } else if state.visited().contains(&next) {
                Some((dir, BlockReason::AlreadyVisited))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_start_has_two_moves() {
        let state = GameState::from_rows(&["1..", "...", "..2"]).unwrap();
        assert_eq!(valid_moves(&state, PlayerId(0)), vec![Direction::Down, Direction::Right]);
        assert_eq!(valid_moves(&state, PlayerId(1)), vec![Direction::Up, Direction::Left]);
    }

    #[test]
    fn test_own_trail_blocks_like_any_other() {
        let state = GameState::from_rows(&["░1.", "...", "..2"]).unwrap();
        assert_eq!(
            blocked_moves(&state, PlayerId(0)),
            vec![
                (Direction::Up, BlockReason::OutOfBounds),
                (Direction::Left, BlockReason::AlreadyVisited),
            ]
        );
    }
}
