// Prompt construction for the move oracle
//
// Turns the game state and the ranked move evaluations into the text the
// oracle reads. Evaluations are hints only; every legal move stays on offer.

use std::fmt::Write;

use crate::evaluator::MoveEvaluation;
use crate::grid::GameState;
use crate::render::render_compact_board;
use crate::rules::blocked_moves;
use crate::types::{Direction, PlayerId};

/// "up, down, left"
pub fn format_moves(moves: &[Direction]) -> String {
    moves.iter().map(|d| d.as_str()).collect::<Vec<_>>().join(", ")
}

/// Builds the full prompt for one player
///
/// # Arguments
/// * `state` - Current game state
/// * `player` - Player whose turn it is
/// * `ranked` - Evaluations of the legal moves, best first
/// * `history_window` - Number of most recent moves to include
pub fn build_prompt(
    state: &GameState,
    player: PlayerId,
    ranked: &[MoveEvaluation],
    history_window: usize,
) -> String {
    let mut buf = String::new();

    let _ = writeln!(buf, "You are playing a grid trails game as Player {}.\n", player);

    buf.push_str("GAME RULES:\n");
    let _ = writeln!(buf, "- This is a {}-player grid-based game", state.player_count());
    buf.push_str("- Each player moves one cell at a time: up, down, left, or right\n");
    buf.push_str("- Each cell you visit becomes part of your trail and can NEVER be visited again by anyone\n");
    buf.push_str("- You LOSE if you have no valid moves (all adjacent cells are visited or out of bounds)\n");
    buf.push_str("- Your goal: survive longer than your opponents\n\n");

    let moves = state.moves();
    if !moves.is_empty() {
        buf.push_str("RECENT MOVE HISTORY:\n");
        let start = moves.len().saturating_sub(history_window);
        for (i, mv) in moves.iter().enumerate().skip(start) {
            let _ = writeln!(
                buf,
                "{}. Player {} moved {} from ({},{}) to ({},{})",
                i + 1,
                mv.player,
                mv.direction,
                mv.from.row,
                mv.from.col,
                mv.to.row,
                mv.to.col
            );
        }
        buf.push('\n');
    }

    buf.push_str("CURRENT POSITIONS:\n");
    let _ = writeln!(buf, "- You (Player {}): {}", player, state.position(player));
    for other in state.players().filter(|p| *p != player) {
        if state.is_active(other) {
            let _ = writeln!(buf, "- Player {}: {}", other, state.position(other));
        } else {
            let _ = writeln!(buf, "- Player {}: ELIMINATED", other);
        }
    }
    buf.push('\n');

    buf.push_str("CURRENT BOARD:\n");
    buf.push_str(&render_compact_board(state));
    buf.push('\n');

    buf.push_str("YOUR VALID MOVES (ranked by look-ahead analysis, best first):\n");
    if ranked.is_empty() {
        buf.push_str("NONE - You lose!\n");
    }
    for eval in ranked {
        let _ = writeln!(
            buf,
            "✅ {} - moves to {} [{}] score {:.1}: {} immediate moves, {} reachable cells, {:.1} average future moves",
            eval.direction.as_str().to_uppercase(),
            eval.target,
            eval.tier,
            eval.score,
            eval.immediate_mobility,
            eval.territory,
            eval.lookahead_mobility
        );
    }
    buf.push('\n');

    let blocked = blocked_moves(state, player);
    if !blocked.is_empty() {
        buf.push_str("BLOCKED MOVES:\n");
        for (dir, reason) in blocked {
            let _ = writeln!(buf, "⛔ {} - {}", dir.as_str().to_uppercase(), reason);
        }
        buf.push('\n');
    }

    buf.push_str("CRITICAL STRATEGY - AVOID SELF-ENTRAPMENT:\n");
    buf.push_str("⚠️  PREFER moves marked EXCELLENT or GOOD (open space and several exits)\n");
    buf.push_str("⚠️  NEVER pick a DEATH TRAP move (0 exits) - you will be eliminated next turn!\n");
    buf.push_str("⚠️  BE CAUTIOUS with RISKY or DANGEROUS moves - you may trap yourself\n");
    buf.push_str("⚠️  More reachable cells means more room to survive\n\n");
    buf.push_str("ADDITIONAL STRATEGY:\n");
    buf.push_str("1. Choose moves that keep you in open space with multiple escape routes\n");
    buf.push_str("2. Think 2-3 moves ahead: where will you go after this move?\n");
    buf.push_str("3. Try to cut off your opponents' escape routes while keeping yours open\n\n");

    let legal: Vec<Direction> = ranked.iter().map(|e| e.direction).collect();
    buf.push_str("RESPOND WITH EXACTLY ONE WORD - YOUR CHOSEN DIRECTION:\n");
    let _ = writeln!(buf, "Valid responses: {}", format_moves(&legal));
    buf.push_str("Do NOT include any explanation, punctuation, or other text.\n");
    buf.push_str("Just respond with: up, down, left, or right\n");

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::evaluator::{evaluate_moves, rank};

    #[test]
    fn test_prompt_lists_ranked_and_blocked_moves() {
        let mut state = GameState::from_rows(&["1...", "....", "....", "...2"]).unwrap();
        state.apply(PlayerId(0), Direction::Right).unwrap();
        state.apply(PlayerId(1), Direction::Up).unwrap();
        let scores = Config::default_hardcoded().scores;
        let ranked = rank(evaluate_moves(&state, &scores, PlayerId(0)));

        let prompt = build_prompt(&state, PlayerId(0), &ranked, 20);

        assert!(prompt.contains("as Player 1."));
        assert!(prompt.contains("1. Player 1 moved right from (0,0) to (0,1)"));
        assert!(prompt.contains("2. Player 2 moved up from (3,3) to (2,3)"));
        assert!(prompt.contains("⛔ UP - out of bounds"));
        assert!(prompt.contains("⛔ LEFT - already visited"));
        assert!(prompt.contains("Valid responses: "));
        assert!(prompt.contains("- Player 2: (2, 3)"));
    }

    #[test]
    fn test_history_window_limits_moves() {
        let mut state = GameState::from_rows(&["1....", ".....", ".....", ".....", "....2"]).unwrap();
        for dir in [Direction::Right, Direction::Right, Direction::Right] {
            state.apply(PlayerId(0), dir).unwrap();
        }

        let prompt = build_prompt(&state, PlayerId(1), &[], 2);

        assert!(!prompt.contains("1. Player 1 moved"));
        assert!(prompt.contains("2. Player 1 moved"));
        assert!(prompt.contains("3. Player 1 moved"));
        assert!(prompt.contains("NONE - You lose!"));
    }

    #[test]
    fn test_eliminated_opponents_are_marked() {
        let mut state = GameState::from_rows(&["1..", "...", "2.3"]).unwrap();
        state.eliminate(PlayerId(2));
        let prompt = build_prompt(&state, PlayerId(0), &[], 20);
        assert!(prompt.contains("- Player 3: ELIMINATED"));
        assert!(prompt.contains("3-player"));
    }
}
