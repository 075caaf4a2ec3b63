use clap::Parser;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::process;

use llm_trails::cli::Cli;
use llm_trails::debug_logger::DebugLogger;
use llm_trails::engine::{GameOutcome, Match, TurnEvent};
use llm_trails::grid::GameState;
use llm_trails::oracle::OllamaOracle;
use llm_trails::render::{render_board, render_legend};
use llm_trails::stats::Statistics;

#[tokio::main]
async fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let cli = Cli::parse();
    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    println!("🏁 Welcome to LLM Trails! 🏁");
    println!("Grid Size: {}x{}", config.game.grid_size, config.game.grid_size);
    println!("Players: {}", config.game.player_count);
    println!("Model: {}", config.oracle.model);
    println!("API URL: {}\n", config.oracle.url);

    let mut oracle = match OllamaOracle::new(&config.oracle) {
        Ok(oracle) => oracle,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut stats = Statistics::new(config.game.player_count);
    let mut game_number = 0;

    loop {
        if config.game.games > 0 && game_number >= config.game.games {
            break;
        }
        game_number += 1;
        println!("\n========== Game {} ==========", game_number);

        let mut game = match Match::start(&config, &logger, game_number, &mut rng) {
            Ok(game) => game,
            Err(e) => {
                error!("Could not set up game {}: {}", game_number, e);
                logger.shutdown().await;
                process::exit(1);
            }
        };

        println!("\nStarting positions:");
        for player in game.state().players() {
            println!("Player {}: {}", player, game.state().position(player));
        }
        print_board(game.state());

        let outcome = game
            .run(&mut oracle, |event, state| {
                if let TurnEvent::Moved { response_time, .. } = event {
                    stats.record_response_time(*response_time);
                }
                print_event(event, state);
            })
            .await;

        stats.record(&outcome);
        info!("Game {} finished after {} turns: {:?}", game_number, game.turn(), outcome);

        if config.game.games != 1 {
            println!("\n{}", stats.render_report());
        }
    }

    if config.game.games != 1 {
        println!("\n{}", "=".repeat(50));
        println!("Final Statistics:");
        println!("{}", stats.render_report());
    }

    logger.shutdown().await;
}

fn print_board(state: &GameState) {
    println!("\n{}", render_board(state));
    println!("{}", render_legend(state));
}

fn print_event(event: &TurnEvent, state: &GameState) {
    match event {
        TurnEvent::Eliminated(player) => {
            println!("❌ Player {} is eliminated (no valid moves)", player);
        }
        TurnEvent::Moved {
            mv,
            tier,
            response_time,
            attempts,
        } => {
            let tier = tier.map(|t| t.label()).unwrap_or("-");
            println!(
                "Player {} chose: {} [{}] ({:.2}s, {} attempt{})",
                mv.player,
                mv.direction,
                tier,
                response_time.as_secs_f64(),
                attempts,
                if *attempts == 1 { "" } else { "s" }
            );
            print_board(state);
        }
        TurnEvent::Finished(GameOutcome::Winner(player)) => {
            println!("\n🎉 Player {} wins! All other players have been eliminated.", player);
        }
        TurnEvent::Finished(GameOutcome::Draw) => {
            println!("\n🤝 Draw! All players eliminated simultaneously.");
        }
        TurnEvent::Finished(GameOutcome::Error(message)) => {
            println!("❌ Error getting move from LLM: {}", message);
        }
    }
}
