// Grid and visitation model
//
// Single source of truth for which cells are occupied and by whom. Cells only
// ever move Empty -> Head -> Trail, and a visited cell stays visited for the
// rest of the game.

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Result, TrailsError};
use crate::rules;
use crate::types::{Cell, Direction, Move, PlayerId, Position, MAX_PLAYERS};

/// Square grid of cell markers
#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Board {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.row >= 0 && pos.col >= 0 && (pos.row as usize) < self.size && (pos.col as usize) < self.size
    }

    /// Cell at `pos`, or None when off the board
    pub fn get(&self, pos: &Position) -> Option<Cell> {
        self.index_of(pos).map(|i| self.cells[i])
    }

    /// Iterates rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size.max(1))
    }

    fn set(&mut self, pos: &Position, cell: Cell) {
        if let Some(i) = self.index_of(pos) {
            self.cells[i] = cell;
        }
    }

    fn index_of(&self, pos: &Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.row as usize * self.size + pos.col as usize)
        } else {
            None
        }
    }
}

/// Monotonic set of cells any head has entered
#[derive(Debug, Clone)]
pub struct VisitedSet {
    size: usize,
    cells: Vec<bool>,
    count: usize,
}

impl VisitedSet {
    pub fn new(size: usize) -> Self {
        VisitedSet {
            size,
            cells: vec![false; size * size],
            count: 0,
        }
    }

    /// Off-board positions are never visited
    pub fn contains(&self, pos: &Position) -> bool {
        self.index_of(pos).map(|i| self.cells[i]).unwrap_or(false)
    }

    /// Returns true if the position was newly added
    fn insert(&mut self, pos: &Position) -> bool {
        match self.index_of(pos) {
            Some(i) if !self.cells[i] => {
                self.cells[i] = true;
                self.count += 1;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn index_of(&self, pos: &Position) -> Option<usize> {
        if pos.row >= 0 && pos.col >= 0 && (pos.row as usize) < self.size && (pos.col as usize) < self.size {
            Some(pos.row as usize * self.size + pos.col as usize)
        } else {
            None
        }
    }
}

/// Model and sampling temperature forwarded to the oracle for one player
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerProfile {
    pub model: String,
    pub temperature: f64,
}

/// Serializable picture of a board, used by the decision log and replay
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardSnapshot {
    pub size: usize,
    /// One string per row; '.' is empty, player symbols are heads, glyphs are trails
    pub rows: Vec<String>,
    pub active: Vec<bool>,
}

/// Complete state of one game
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    visited: VisitedSet,
    positions: Vec<Position>,
    active: Vec<bool>,
    moves: Vec<Move>,
    profiles: Vec<PlayerProfile>,
}

impl GameState {
    /// Creates a fresh game with randomly spaced starting positions
    ///
    /// # Arguments
    /// * `config` - Validated configuration (grid size, player count, spacing)
    /// * `rng` - Source of randomness for the starting positions
    pub fn initialize<R: Rng>(config: &Config, rng: &mut R) -> Result<Self> {
        let size = config.game.grid_size;
        let player_count = config.game.player_count;
        if player_count == 0 || player_count > MAX_PLAYERS {
            return Err(TrailsError::config(format!(
                "cannot seat {} players",
                player_count
            )));
        }

        let mut state = GameState {
            board: Board::new(size),
            visited: VisitedSet::new(size),
            positions: Vec::with_capacity(player_count),
            active: Vec::with_capacity(player_count),
            moves: Vec::new(),
            profiles: Vec::with_capacity(player_count),
        };

        for index in 0..player_count {
            let player = PlayerId(index);
            let pos = state.pick_start(config, rng)?;
            debug!("Player {} starts at {}", player, pos);

            state.positions.push(pos);
            state.active.push(true);
            state.profiles.push(PlayerProfile {
                model: config.oracle.model_for(player).to_string(),
                temperature: config.oracle.temperature,
            });
            state.board.set(&pos, Cell::Head(player));
            state.visited.insert(&pos);
        }

        Ok(state)
    }

    /// Random sampling first, then a deterministic scan so spacing is never violated
    fn pick_start<R: Rng>(&self, config: &Config, rng: &mut R) -> Result<Position> {
        let size = self.board.size() as i32;
        let min_distance = config.game.min_start_distance;

        for _ in 0..config.game.placement_attempts {
            let pos = Position::new(rng.random_range(0..size), rng.random_range(0..size));
            if self.is_spaced(&pos, min_distance) {
                return Ok(pos);
            }
        }

        warn!(
            "No spaced start found after {} random attempts, scanning the board",
            config.game.placement_attempts
        );
        (0..size)
            .flat_map(|row| (0..size).map(move |col| Position::new(row, col)))
            .find(|pos| self.is_spaced(pos, min_distance))
            .ok_or_else(|| {
                TrailsError::config(format!(
                    "a {}x{} grid cannot seat {} players at distance {}",
                    size, size, config.game.player_count, min_distance
                ))
            })
    }

    fn is_spaced(&self, pos: &Position, min_distance: i32) -> bool {
        !self.visited.contains(pos)
            && self
                .positions
                .iter()
                .all(|existing| existing.manhattan(pos) >= min_distance)
    }

    /// Builds a state from symbol rows: '.' or ' ' empty, player symbols for
    /// heads, trail glyphs for trails. Every player up to the highest head
    /// symbol must have exactly one head.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let size = rows.len();
        let mut board = Board::new(size);
        let mut visited = VisitedSet::new(size);
        let mut heads: Vec<Option<Position>> = vec![None; MAX_PLAYERS];
        let mut trail_owners: Vec<PlayerId> = Vec::new();

        for (r, row) in rows.iter().enumerate() {
            let cells: Vec<char> = row.as_ref().chars().collect();
            if cells.len() != size {
                return Err(TrailsError::config(format!(
                    "row {} has {} cells, expected {}",
                    r,
                    cells.len(),
                    size
                )));
            }

            for (c, symbol) in cells.into_iter().enumerate() {
                let pos = Position::new(r as i32, c as i32);
                let cell = match symbol {
                    '.' | ' ' => Cell::Empty,
                    s => {
                        if let Some(p) = PlayerId::from_trail_symbol(s) {
                            trail_owners.push(p);
                            Cell::Trail(p)
                        } else if let Some(p) = PlayerId::from_symbol(s) {
                            if heads[p.index()].replace(pos).is_some() {
                                return Err(TrailsError::config(format!(
                                    "player {} has more than one head",
                                    p
                                )));
                            }
                            Cell::Head(p)
                        } else {
                            return Err(TrailsError::config(format!(
                                "unknown cell symbol '{}' at {}",
                                s, pos
                            )));
                        }
                    }
                };
                if cell != Cell::Empty {
                    board.set(&pos, cell);
                    visited.insert(&pos);
                }
            }
        }

        let player_count = heads.iter().rposition(Option::is_some).map_or(0, |i| i + 1);
        let positions = heads[..player_count]
            .iter()
            .enumerate()
            .map(|(i, head)| {
                head.ok_or_else(|| TrailsError::config(format!("player {} has no head", PlayerId(i))))
            })
            .collect::<Result<Vec<_>>>()?;
        if let Some(orphan) = trail_owners.iter().find(|p| p.index() >= player_count) {
            return Err(TrailsError::config(format!(
                "trail of player {} who is not on the board",
                orphan
            )));
        }

        Ok(GameState {
            board,
            visited,
            positions,
            active: vec![true; player_count],
            moves: Vec::new(),
            profiles: vec![PlayerProfile::default(); player_count],
        })
    }

    /// Rebuilds a state, including eliminations, from a logged snapshot
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Self> {
        let mut state = Self::from_rows(&snapshot.rows)?;
        if snapshot.active.len() != state.player_count() {
            return Err(TrailsError::config(format!(
                "snapshot lists {} players but the board has {}",
                snapshot.active.len(),
                state.player_count()
            )));
        }
        state.active = snapshot.active.clone();
        Ok(state)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            size: self.size(),
            rows: self
                .board
                .rows()
                .map(|row| {
                    row.iter()
                        .map(|cell| match cell {
                            Cell::Empty => '.',
                            other => other.symbol(),
                        })
                        .collect()
                })
                .collect(),
            active: self.active.clone(),
        }
    }

    /// Moves a player's head one step. The destination is re-checked and an
    /// illegal move leaves the state untouched.
    pub fn apply(&mut self, player: PlayerId, direction: Direction) -> Result<Move> {
        let from = self.position(player);
        let to = direction.apply(&from);
        if !self.is_active(player) || !rules::is_legal(self, &to) {
            return Err(TrailsError::IllegalMove {
                player,
                direction,
                target: to,
            });
        }

        self.board.set(&from, Cell::Trail(player));
        self.positions[player.index()] = to;
        self.board.set(&to, Cell::Head(player));
        self.visited.insert(&to);

        let mv = Move {
            player,
            direction,
            from,
            to,
        };
        self.moves.push(mv);
        Ok(mv)
    }

    /// Marks a player as out of the game. Their head stays on the board.
    pub fn eliminate(&mut self, player: PlayerId) {
        if let Some(flag) = self.active.get_mut(player.index()) {
            *flag = false;
        }
    }

    pub fn size(&self) -> usize {
        self.board.size()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn player_count(&self) -> usize {
        self.positions.len()
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.player_count()).map(PlayerId)
    }

    pub fn position(&self, player: PlayerId) -> Position {
        self.positions[player.index()]
    }

    pub fn is_active(&self, player: PlayerId) -> bool {
        self.active.get(player.index()).copied().unwrap_or(false)
    }

    pub fn active_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players().filter(move |p| self.is_active(*p))
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    /// Append-only move log
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn profile(&self, player: PlayerId) -> &PlayerProfile {
        &self.profiles[player.index()]
    }
}
