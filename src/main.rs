//! Coin Chase headless driver
//!
//! Plays one match on autopilot and prints the final match state as JSON.
//!
//! Usage: `coin-chase [preset | config.json] [seed]`

use std::cmp::Ordering;
use std::process::ExitCode;

use glam::Vec2;

use coin_chase::GameConfig;
use coin_chase::consts::MAX_FRAME_DT;
use coin_chase::sim::{GameEvent, MatchState, TickInput};

/// Simulation timestep (120 Hz)
const SIM_DT: f32 = 1.0 / 120.0;
const MAX_SUBSTEPS: u32 = 8;
/// Pretend host frame rate
const FRAME_DT: f32 = 1.0 / 60.0;
/// Hard stop for configs with absurd match lengths
const MAX_FRAMES: u32 = 60 * 600;

const ARENA_WIDTH: f32 = 800.0;
const ARENA_HEIGHT: f32 = 600.0;

/// Boss distance at which the autopilot starts fleeing
const FLEE_DISTANCE: f32 = 160.0;
const DASH_DISTANCE: f32 = 90.0;
const SLOW_MOTION_DISTANCE: f32 = 220.0;

fn load_config(arg: Option<&str>) -> Result<GameConfig, String> {
    let Some(arg) = arg else {
        return Ok(GameConfig::default());
    };
    if let Some(config) = GameConfig::preset(arg) {
        return Ok(config);
    }
    let json = std::fs::read_to_string(arg).map_err(|e| format!("cannot read config {arg}: {e}"))?;
    GameConfig::from_json(&json).map_err(|e| format!("{arg}: {e}"))
}

/// Head for the nearest coin, veer away when the boss closes in
fn autopilot(state: &MatchState) -> TickInput {
    let player = state.player.pos;
    let nearest = state
        .coins
        .iter()
        .filter(|c| !c.collected)
        .min_by(|a, b| {
            a.pos
                .distance_squared(player)
                .partial_cmp(&b.pos.distance_squared(player))
                .unwrap_or(Ordering::Equal)
        });
    let mut direction = nearest.map_or(Vec2::ZERO, |c| (c.pos - player).normalize_or_zero());

    let away = player - state.boss.pos;
    let danger = away.length();
    if danger < FLEE_DISTANCE {
        direction = (direction + away.normalize_or_zero() * 2.0).normalize_or_zero();
    }

    TickInput {
        direction,
        dash: danger < DASH_DISTANCE,
        slow_motion: danger < SLOW_MOTION_DISTANCE,
    }
}

fn report(event: &GameEvent) {
    match event {
        GameEvent::PlayerHit {
            source,
            lives,
            shielded,
        } => log::info!("Hit by {source:?} (lives: {lives}, shielded: {shielded})"),
        GameEvent::BossRushStarted => log::info!("Boss is rushing!"),
        GameEvent::Won => log::info!("You win!"),
        GameEvent::Lost { reason } => log::info!("{reason}"),
        other => log::debug!("{other:?}"),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match load_config(args.first().map(String::as_str)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let seed = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rand::random::<u64>);
    log::info!("Coin Chase starting with seed: {seed}");

    let mut state = match MatchState::new(config, ARENA_WIDTH, ARENA_HEIGHT, seed) {
        Ok(state) => state,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = state.start_match(ARENA_WIDTH, ARENA_HEIGHT) {
        log::error!("{e}");
        return ExitCode::FAILURE;
    }

    let mut accumulator = 0.0;
    let mut frames = 0;
    while state.is_playing() && frames < MAX_FRAMES {
        accumulator += FRAME_DT.min(MAX_FRAME_DT);

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS && state.is_playing() {
            let input = autopilot(&state);
            for event in state.advance(&input, SIM_DT) {
                report(event);
            }
            accumulator -= SIM_DT;
            substeps += 1;
        }
        frames += 1;
    }

    log::info!(
        "Finished in {:?}: {}/{} coins, score {}, {:.1}s left",
        state.phase,
        state.coins_collected,
        state.config.coins_required,
        state.score,
        state.time_remaining
    );

    match serde_json::to_string_pretty(&state) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize match state: {e}");
            ExitCode::FAILURE
        }
    }
}
