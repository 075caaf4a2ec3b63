//! Turn rotation, elimination and whole-game properties
//!
//! Games are driven by scripted or random oracles so no model server is needed.

mod common;

use common::{RandomOracle, ScriptedOracle};
use llm_trails::config::Config;
use llm_trails::debug_logger::DebugLogger;
use llm_trails::engine::{GameOutcome, Match, TurnEvent};
use llm_trails::grid::GameState;
use llm_trails::rules::valid_moves;
use llm_trails::types::{Cell, Direction, PlayerId, Position};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn test_config() -> Config {
    Config::default_hardcoded()
}

fn cells(state: &GameState) -> Vec<Cell> {
    state.board().rows().flat_map(|row| row.iter().copied()).collect()
}

#[tokio::test]
async fn test_trapped_player_is_eliminated_without_asking() {
    let config = test_config();
    let logger = DebugLogger::disabled();
    let state = GameState::from_rows(&["1▒.", "▒..", "..2"]).unwrap();
    let mut game = Match::new(&config, &logger, 1, state);
    let mut oracle = ScriptedOracle::first_legal();

    let event = game.step(&mut oracle).await;
    assert!(matches!(event, TurnEvent::Eliminated(PlayerId(0))));
    assert!(!game.state().is_active(PlayerId(0)));

    let event = game.step(&mut oracle).await;
    assert!(matches!(event, TurnEvent::Finished(GameOutcome::Winner(PlayerId(1)))));
    assert_eq!(oracle.calls, 0);
    assert_eq!(game.outcome(), Some(&GameOutcome::Winner(PlayerId(1))));
}

#[tokio::test]
async fn test_three_trapped_players_leave_one_winner() {
    let config = test_config();
    let logger = DebugLogger::disabled();
    let state = GameState::from_rows(&["1░2░3", "░░░░░", ".....", ".....", "....4"]).unwrap();
    let mut game = Match::new(&config, &logger, 1, state);
    let mut oracle = ScriptedOracle::first_legal();

    let mut events = Vec::new();
    let outcome = game
        .run(&mut oracle, |event, _| events.push(event.clone()))
        .await;

    assert_eq!(outcome, GameOutcome::Winner(PlayerId(3)));
    assert_eq!(oracle.calls, 0);
    assert_eq!(events.len(), 4);
    for (i, event) in events.iter().take(3).enumerate() {
        assert!(
            matches!(event, TurnEvent::Eliminated(p) if *p == PlayerId(i)),
            "unexpected event {:?}",
            event
        );
    }
    assert_eq!(game.turn(), 3);
}

#[tokio::test]
async fn test_no_active_players_is_a_draw() {
    let config = test_config();
    let logger = DebugLogger::disabled();
    let mut state = GameState::from_rows(&["1..", "...", "..2"]).unwrap();
    state.eliminate(PlayerId(0));
    state.eliminate(PlayerId(1));
    let mut game = Match::new(&config, &logger, 1, state);
    let mut oracle = ScriptedOracle::first_legal();

    let event = game.step(&mut oracle).await;
    assert!(matches!(event, TurnEvent::Finished(GameOutcome::Draw)));
    assert_eq!(Match::check_finished(game.state()), Some(GameOutcome::Draw));
}

#[tokio::test]
async fn test_rotation_skips_eliminated_players() {
    let config = test_config();
    let logger = DebugLogger::disabled();
    let mut state = GameState::from_rows(&[
        "1....", //
        ".....",
        "..2..",
        ".....",
        "....3",
    ])
    .unwrap();
    state.eliminate(PlayerId(1));
    let mut game = Match::new(&config, &logger, 1, state);
    let mut oracle = ScriptedOracle::new(vec![Ok("down"), Ok("up"), Ok("right")]);

    let mut movers = Vec::new();
    for _ in 0..3 {
        if let TurnEvent::Moved { mv, .. } = game.step(&mut oracle).await {
            movers.push(mv.player);
        }
    }

    assert_eq!(movers, vec![PlayerId(0), PlayerId(2), PlayerId(0)]);
    assert_eq!(game.state().moves().len(), 3);
}

#[tokio::test]
async fn test_transport_failure_ends_game_with_error() {
    let config = test_config();
    let logger = DebugLogger::disabled();
    let state = GameState::from_rows(&["1..", "...", "..2"]).unwrap();
    let mut game = Match::new(&config, &logger, 1, state);
    let mut oracle = ScriptedOracle::new(vec![Err("connection refused")]);

    let event = game.step(&mut oracle).await;
    match event {
        TurnEvent::Finished(GameOutcome::Error(message)) => {
            assert!(message.contains("connection refused"), "got: {}", message)
        }
        other => panic!("expected error outcome, got {:?}", other),
    }
    assert_eq!(oracle.calls, 1);
    assert!(game.state().moves().is_empty());

    // Finished games stay finished
    let again = game.step(&mut oracle).await;
    assert!(matches!(again, TurnEvent::Finished(GameOutcome::Error(_))));
    assert_eq!(oracle.calls, 1);
}

#[tokio::test]
async fn test_exhausted_retries_end_game_with_error() {
    let config = test_config();
    let logger = DebugLogger::disabled();
    let state = GameState::from_rows(&["1..", "...", "..2"]).unwrap();
    let mut game = Match::new(&config, &logger, 1, state);
    let mut oracle = ScriptedOracle::new(vec![Ok("banana"), Ok("left?"), Ok("I refuse")]);

    let event = game.step(&mut oracle).await;
    match event {
        TurnEvent::Finished(GameOutcome::Error(message)) => {
            assert!(message.contains("3 attempts"), "got: {}", message)
        }
        other => panic!("expected error outcome, got {:?}", other),
    }

    assert_eq!(oracle.calls, config.oracle.max_retries as usize);
    assert!(!oracle.prompts[0].contains("was invalid"));
    assert!(oracle.prompts[1].contains("Your previous response 'banana' was invalid"));
    assert!(oracle.prompts[2].contains("Your previous response 'left?' was invalid"));
    assert!(oracle.prompts[2].ends_with("Please respond with exactly one word: down, right"));
    assert!(game.state().moves().is_empty());
}

#[tokio::test]
async fn test_unparseable_answer_is_retried() {
    let config = test_config();
    let logger = DebugLogger::disabled();
    let state = GameState::from_rows(&["1..", "...", "..2"]).unwrap();
    let mut game = Match::new(&config, &logger, 1, state);
    let mut oracle = ScriptedOracle::new(vec![Ok("up-left"), Ok("right")]);

    match game.step(&mut oracle).await {
        TurnEvent::Moved { mv, attempts, tier, .. } => {
            assert_eq!(mv.player, PlayerId(0));
            assert_eq!(mv.direction, Direction::Right);
            assert_eq!(attempts, 2);
            assert!(tier.is_some());
        }
        other => panic!("expected a move, got {:?}", other),
    }
    assert_eq!(oracle.calls, 2);
    assert_eq!(
        game.state().board().get(&Position::new(0, 0)),
        Some(Cell::Trail(PlayerId(0)))
    );
}

#[tokio::test]
async fn test_random_games_keep_board_invariants() {
    let mut config = test_config();
    config.game.grid_size = 6;
    config.game.player_count = 3;
    config.game.min_start_distance = 2;
    let logger = DebugLogger::disabled();

    for seed in 0..5u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut oracle = RandomOracle::new(seed);
        let mut game = Match::start(&config, &logger, 1, &mut rng).unwrap();
        let max_turns = config.game.grid_size * config.game.grid_size * config.game.player_count;

        let outcome = loop {
            let before = cells(game.state());
            let visited_before = game.state().visited().len();

            let event = game.step(&mut oracle).await;
            let state = game.state();

            assert!(state.visited().len() >= visited_before);
            for (old, new) in before.iter().zip(cells(state)) {
                if let Some(owner) = old.owner() {
                    assert_eq!(new.owner(), Some(owner), "claimed cells never change hands");
                }
            }

            match event {
                TurnEvent::Eliminated(p) => {
                    assert!(valid_moves(state, p).is_empty());
                    assert!(!state.is_active(p));
                }
                TurnEvent::Moved { mv, .. } => {
                    assert!(state.is_active(mv.player));
                    assert_eq!(state.visited().len(), visited_before + 1);
                    assert_eq!(state.position(mv.player), mv.to);
                }
                TurnEvent::Finished(outcome) => break outcome,
            }

            assert!(game.turn() <= max_turns, "game did not terminate");
        };

        match outcome {
            GameOutcome::Winner(p) => {
                assert!(game.state().is_active(p));
                assert_eq!(game.state().active_count(), 1);
            }
            other => panic!("seed {}: unexpected outcome {:?}", seed, other),
        }
        assert_eq!(game.state().moves().len(), game.state().visited().len() - config.game.player_count);
    }
}
