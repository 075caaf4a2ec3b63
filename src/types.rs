// Core value types shared by the grid, rules, evaluator and engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display symbols for up to 10 players, in seating order
pub const PLAYER_SYMBOLS: [char; 10] = ['1', '2', '3', '4', '5', '6', '7', '8', '9', 'A'];

/// Trail glyphs, one per player, indexed like `PLAYER_SYMBOLS`
pub const TRAIL_SYMBOLS: [char; 10] = ['░', '▒', '▓', '█', '▀', '▄', '▌', '▐', '■', '□'];

/// Largest supported player count
pub const MAX_PLAYERS: usize = PLAYER_SYMBOLS.len();

/// (row, col) coordinate on the grid. Row 0 is the top row.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    /// Manhattan distance between two positions
    pub fn manhattan(&self, other: &Position) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The four possible movement directions
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all directions in their fixed enumeration order
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Lower-case name, as the oracle is expected to answer
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Calculates the neighbouring position when moving in this direction
    pub fn apply(&self, pos: &Position) -> Position {
        match self {
            Direction::Up => Position { row: pos.row - 1, col: pos.col },
            Direction::Down => Position { row: pos.row + 1, col: pos.col },
            Direction::Left => Position { row: pos.row, col: pos.col - 1 },
            Direction::Right => Position { row: pos.row, col: pos.col + 1 },
        }
    }

    /// Exact, case-sensitive lookup of a lower-case direction name
    pub fn from_name(name: &str) -> Option<Direction> {
        match name {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dense player index (0..player_count). The symbol is display-only.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub usize);

impl PlayerId {
    pub fn index(&self) -> usize {
        self.0
    }

    /// '?' for ids beyond the supported player count
    pub fn symbol(&self) -> char {
        PLAYER_SYMBOLS.get(self.0).copied().unwrap_or('?')
    }

    pub fn trail_symbol(&self) -> char {
        TRAIL_SYMBOLS.get(self.0).copied().unwrap_or('?')
    }

    /// Resolves a display symbol ("1".."9", "A") back to its player
    pub fn from_symbol(symbol: char) -> Option<PlayerId> {
        PLAYER_SYMBOLS
            .iter()
            .position(|&s| s == symbol.to_ascii_uppercase())
            .map(PlayerId)
    }

    /// Resolves a trail glyph back to its owner
    pub fn from_trail_symbol(symbol: char) -> Option<PlayerId> {
        TRAIL_SYMBOLS.iter().position(|&s| s == symbol).map(PlayerId)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Marker stored in each board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Head(PlayerId),
    Trail(PlayerId),
}

impl Cell {
    pub fn symbol(&self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::Head(p) => p.symbol(),
            Cell::Trail(p) => p.trail_symbol(),
        }
    }

    /// Player whose head or trail occupies this cell
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            Cell::Empty => None,
            Cell::Head(p) | Cell::Trail(p) => Some(*p),
        }
    }
}

/// One applied move. Appended to the game log and never changed.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub player: PlayerId,
    pub direction: Direction,
    pub from: Position,
    pub to: Position,
}
