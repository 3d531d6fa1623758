//! Balloon Pop headless demo
//!
//! Drives a session with simulated time and an autopilot that taps the
//! balloon closest to escaping, missing now and then. After the first game
//! over it restarts once, then prints a JSON summary.
//!
//! Usage: `balloon-pop [config.json]` (set `RUST_LOG=debug` for event logs)

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use balloon_pop::sim::{GameEvent, RemovalCause, SessionSnapshot, TapOutcome};
use balloon_pop::{Game, GameConfig};

/// Simulated run length
const DEMO_DURATION: Duration = Duration::from_secs(180);
/// How often the autopilot looks at the screen
const REACTION_TIME: Duration = Duration::from_millis(350);
/// Chance the autopilot fumbles a tap
const MISS_CHANCE: f64 = 0.3;
/// Runs to play: the first, plus one restart after game over
const MAX_RUNS: usize = 2;

#[derive(Debug, Serialize)]
struct RunSummary {
    final_score: u32,
    ended_at: Duration,
}

#[derive(Debug, Serialize)]
struct DemoSummary {
    runs: Vec<RunSummary>,
    restarts: u32,
    popped: u32,
    escaped: u32,
    last: SessionSnapshot,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("Balloon Pop (headless demo) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load_or_default(path),
        None => GameConfig::default(),
    };
    let mut bot_rng = Pcg32::seed_from_u64(config.seed.unwrap_or(0));
    let mut game = Game::new(config)?;

    let summary = run_demo(&mut game, &mut bot_rng, MISS_CHANCE);
    game.shutdown();

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Play until `MAX_RUNS` games have ended or the demo time runs out
fn run_demo(game: &mut Game, bot_rng: &mut Pcg32, miss_chance: f64) -> DemoSummary {
    let mut runs = Vec::new();
    let mut restarts = 0;
    let mut popped = 0;
    let mut escaped = 0;
    let mut now = Duration::ZERO;

    while now < DEMO_DURATION && runs.len() < MAX_RUNS {
        now += REACTION_TIME;
        game.advance(now);

        for event in game.drain_events() {
            match event {
                GameEvent::BalloonRemoved {
                    cause: RemovalCause::Popped,
                    ..
                } => popped += 1,
                GameEvent::BalloonRemoved {
                    cause: RemovalCause::Escaped,
                    ..
                } => escaped += 1,
                GameEvent::GameEnded { final_score } => {
                    log::info!("Run {} over: {} points", runs.len() + 1, final_score);
                    runs.push(RunSummary {
                        final_score,
                        ended_at: now,
                    });
                }
                _ => {}
            }
        }

        if game.session().is_over() {
            if runs.len() < MAX_RUNS {
                let center = game.session().playfield().center();
                if game.tap(Some(center)) == TapOutcome::Restarted {
                    restarts += 1;
                    log::info!("Autopilot restarted the game");
                }
            }
        } else if let Some(target) = pick_target(game, now) {
            if bot_rng.random_bool(miss_chance) {
                log::debug!("Autopilot fumbled");
            } else {
                game.tap(Some(target));
            }
        }
    }

    DemoSummary {
        runs,
        restarts,
        popped,
        escaped,
        last: game.session().snapshot(),
    }
}

/// Screen point of the balloon nearest the top
fn pick_target(game: &Game, now: Duration) -> Option<Vec2> {
    let session = game.session();
    session
        .pool()
        .iter()
        .max_by(|a, b| a.progress(now).total_cmp(&b.progress(now)))
        .map(|b| session.playfield().balloon_center(b, now))
}
