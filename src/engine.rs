// Turn and elimination state machine
//
// Players move in fixed rotation. At the start of a turn the rotation skips
// eliminated players, then the active count decides whether the game is over.
// A player with no legal move is eliminated without consulting the oracle.
// Oracle failures end the game with an error outcome.

use log::{error, info};
use rand::Rng;
use std::time::Duration;

use crate::config::Config;
use crate::debug_logger::{DebugLogger, TurnRecord};
use crate::error::Result;
use crate::evaluator::{evaluate_moves, rank, SafetyTier};
use crate::grid::GameState;
use crate::oracle::{request_move, MoveOracle};
use crate::prompt::build_prompt;
use crate::rules::valid_moves;
use crate::types::{Move, PlayerId};

/// How a game ended
#[derive(Debug, Clone, PartialEq)]
pub enum GameOutcome {
    Winner(PlayerId),
    /// Nobody left standing. Unreachable with one elimination per turn, kept
    /// so the active-count check is total.
    Draw,
    /// The oracle failed; nobody is credited
    Error(String),
}

/// What a single call to `Match::step` did
#[derive(Debug, Clone)]
pub enum TurnEvent {
    Eliminated(PlayerId),
    Moved {
        mv: Move,
        tier: Option<SafetyTier>,
        response_time: Duration,
        attempts: u32,
    },
    Finished(GameOutcome),
}

/// One game in progress
pub struct Match<'a> {
    config: &'a Config,
    logger: &'a DebugLogger,
    game_number: usize,
    state: GameState,
    cursor: usize,
    turn: usize,
    outcome: Option<GameOutcome>,
}

impl<'a> Match<'a> {
    /// Starts a match on an existing state. Rotation begins at player 0.
    pub fn new(config: &'a Config, logger: &'a DebugLogger, game_number: usize, state: GameState) -> Self {
        Match {
            config,
            logger,
            game_number,
            state,
            cursor: 0,
            turn: 0,
            outcome: None,
        }
    }

    /// Starts a match on a freshly initialized board
    pub fn start<R: Rng>(
        config: &'a Config,
        logger: &'a DebugLogger,
        game_number: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let state = GameState::initialize(config, rng)?;
        Ok(Self::new(config, logger, game_number, state))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    /// Player the rotation currently points at
    pub fn current_player(&self) -> PlayerId {
        PlayerId(self.cursor)
    }

    /// Number of turns started so far, eliminations included
    pub fn turn(&self) -> usize {
        self.turn
    }

    /// Winner or draw once at most one player is active
    pub fn check_finished(state: &GameState) -> Option<GameOutcome> {
        match state.active_count() {
            0 => Some(GameOutcome::Draw),
            1 => state.active_players().next().map(GameOutcome::Winner),
            _ => None,
        }
    }

    /// Plays until the game finishes, reporting every event to `observer`
    pub async fn run<O, F>(&mut self, oracle: &mut O, mut observer: F) -> GameOutcome
    where
        O: MoveOracle,
        F: FnMut(&TurnEvent, &GameState),
    {
        loop {
            let event = self.step(oracle).await;
            observer(&event, &self.state);
            if let TurnEvent::Finished(outcome) = event {
                return outcome;
            }
        }
    }

    /// Advances the game by one turn
    pub async fn step<O: MoveOracle>(&mut self, oracle: &mut O) -> TurnEvent {
        if let Some(outcome) = &self.outcome {
            return TurnEvent::Finished(outcome.clone());
        }

        self.seek_active();
        if let Some(outcome) = Self::check_finished(&self.state) {
            match &outcome {
                GameOutcome::Winner(p) => info!("Player {} wins! All other players have been eliminated.", p),
                GameOutcome::Draw => info!("Draw! All players eliminated."),
                GameOutcome::Error(_) => {}
            }
            return self.finish(outcome);
        }

        let player = self.current_player();
        self.turn += 1;
        info!("Move {}: Player {}'s turn", self.turn, player);

        let legal = valid_moves(&self.state, player);
        if legal.is_empty() {
            info!("Player {} is eliminated (no valid moves)", player);
            self.state.eliminate(player);
            self.advance();
            return TurnEvent::Eliminated(player);
        }

        let ranked = rank(evaluate_moves(&self.state, &self.config.scores, player));
        let prompt = build_prompt(&self.state, player, &ranked, self.config.game.history_window);

        let reply = match request_move(
            oracle,
            player,
            prompt,
            &legal,
            self.state.profile(player),
            self.config.oracle.max_retries,
            self.config.debug.show_prompts,
        )
        .await
        {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error getting move for player {}: {}", player, e);
                return self.finish(GameOutcome::Error(e.to_string()));
            }
        };

        let before = self.logger.is_enabled().then(|| self.state.snapshot());
        let mv = match self.state.apply(player, reply.direction) {
            Ok(mv) => mv,
            Err(e) => {
                error!("Rejected move for player {}: {}", player, e);
                return self.finish(GameOutcome::Error(e.to_string()));
            }
        };

        let tier = ranked
            .iter()
            .find(|eval| eval.direction == mv.direction)
            .map(|eval| eval.tier);
        info!(
            "Player {} chose: {} ({:.2}s, {:?})",
            player,
            mv.direction,
            reply.response_time.as_secs_f64(),
            tier
        );

        if let Some(board) = before {
            self.logger.log_turn(TurnRecord {
                game: self.game_number,
                turn: self.turn,
                player,
                chosen_move: mv.direction,
                evaluations: ranked,
                board,
                response: reply.response.clone(),
                attempts: reply.attempts,
                response_time_ms: reply.response_time.as_millis() as u64,
                timestamp: chrono::Utc::now().to_rfc3339(),
            });
        }

        self.advance();
        TurnEvent::Moved {
            mv,
            tier,
            response_time: reply.response_time,
            attempts: reply.attempts,
        }
    }

    /// Moves the cursor to the next active player, scanning at most one lap
    fn seek_active(&mut self) {
        let count = self.state.player_count();
        for _ in 0..count {
            if self.state.is_active(self.current_player()) {
                break;
            }
            self.cursor = (self.cursor + 1) % count;
        }
    }

    fn advance(&mut self) {
        let count = self.state.player_count().max(1);
        self.cursor = (self.cursor + 1) % count;
    }

    fn finish(&mut self, outcome: GameOutcome) -> TurnEvent {
        self.outcome = Some(outcome.clone());
        TurnEvent::Finished(outcome)
    }
}
