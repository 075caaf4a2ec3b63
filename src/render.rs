// Console rendering of the grid
//
// Pure string builders over the read-only views of a GameState; callers decide
// where the text goes.

use std::fmt::Write;

use crate::grid::GameState;

/// Box-drawn board with row and column numbers
pub fn render_board(state: &GameState) -> String {
    let size = state.size();
    let mut out = String::new();

    out.push_str("    ");
    for col in 0..size {
        let _ = write!(out, "{:2}  ", col);
    }
    out.push('\n');

    out.push_str(&border(size, '┌', '┬', '┐'));
    for (row, cells) in state.board().rows().enumerate() {
        let _ = write!(out, "{:2} │", row);
        for cell in cells {
            let _ = write!(out, " {} │", cell.symbol());
        }
        out.push('\n');
        if row + 1 < size {
            out.push_str(&border(size, '├', '┼', '┤'));
        }
    }
    out.push_str(&border(size, '└', '┴', '┘'));

    out
}

fn border(size: usize, left: char, join: char, right: char) -> String {
    let inner = vec!["───"; size].join(&join.to_string());
    format!("   {}{}{}\n", left, inner, right)
}

/// "1=Player1 ░=Trail  2=Player2 ▒=Trail ..."
pub fn render_legend(state: &GameState) -> String {
    let entries: Vec<String> = state
        .players()
        .map(|p| format!("{}=Player{} {}=Trail", p.symbol(), p, p.trail_symbol()))
        .collect();
    format!("Legend: {}", entries.join("  "))
}

/// Compact board used inside prompts
pub fn render_compact_board(state: &GameState) -> String {
    let mut out = String::from("    ");
    for col in 0..state.size() {
        let _ = write!(out, "{:2} ", col);
    }
    out.push('\n');

    for (row, cells) in state.board().rows().enumerate() {
        let _ = write!(out, "{:2} |", row);
        for cell in cells {
            let _ = write!(out, " {} |", cell.symbol());
        }
        out.push('\n');
    }

    out
}
