//! Fixed timestep simulation tick
//!
//! One call advances a playing match by `dt`: timers, player actions,
//! steering, interactions, then the match clock.

use glam::Vec2;

use super::interaction;
use super::state::{GameEvent, GamePhase, LoseReason, MatchState};
use super::steering::{
    player_speed_multiplier, steer_boss, steer_drone, steer_player, try_dash, update_rush,
};
use crate::consts::MAX_FRAME_DT;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Desired movement, clamped to unit length (zero when idle)
    pub direction: Vec2,
    /// Dash along `direction`
    pub dash: bool,
    /// Trigger slow-motion
    pub slow_motion: bool,
}

/// Advance the match by one timestep
pub fn tick(state: &mut MatchState, input: &TickInput, dt: f32) {
    state.events.clear();
    if state.phase != GamePhase::Playing {
        return;
    }

    // Long frames (tab backgrounding) are clamped, garbage is ignored
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };

    tick_timers(state, dt);
    apply_actions(state, input);

    let speed = state.player.base_speed
        * player_speed_multiplier(&state.effects, state.combo.count, &state.config);
    steer_player(
        &mut state.player,
        input.direction,
        speed,
        dt,
        &state.arena,
        &state.obstacles,
    );

    if !state.effects.is_frozen() {
        steer_hostiles(state, dt);
    }

    interaction::resolve(state, dt);
    if state.phase != GamePhase::Playing {
        return;
    }

    // Clock runs last so a pickup on the final tick still wins
    state.time_remaining = (state.time_remaining - dt).max(0.0);
    if state.time_remaining == 0.0 {
        if state.coins_collected >= state.config.coins_required {
            state.finish_won();
        } else {
            state.finish_lost(LoseReason::TimeUp);
        }
    }
}

fn tick_timers(state: &mut MatchState, dt: f32) {
    state.effects.tick(dt);
    if state.combo.tick(dt) {
        log::debug!("Combo expired");
    }
    state.boss.hit_cooldown.tick(dt);
    for drone in &mut state.drones {
        drone.hit_cooldown.tick(dt);
    }
    for trap in &mut state.traps {
        trap.rearm.tick(dt);
    }
}

fn apply_actions(state: &mut MatchState, input: &TickInput) {
    let effects = &mut state.effects;

    if input.slow_motion
        && !effects.slow_motion.is_running()
        && !effects.slow_motion_cooldown.is_running()
    {
        effects.slow_motion.start(state.config.slow_motion_duration);
        effects.slow_motion_cooldown.start(state.config.slow_motion_cooldown);
        state.events.push(GameEvent::SlowMotionStarted);
    }

    if input.dash
        && !effects.dash_cooldown.is_running()
        && try_dash(
            &mut state.player,
            input.direction,
            state.config.dash_distance,
            &state.arena,
            &state.obstacles,
        )
    {
        effects.dash_cooldown.start(state.config.dash_cooldown);
        state.events.push(GameEvent::Dashed);
    }
}

fn steer_hostiles(state: &mut MatchState, dt: f32) {
    let factor = if state.effects.slow_motion.is_running() {
        state.config.slow_motion_factor
    } else {
        1.0
    };

    if update_rush(&mut state.boss, &mut state.rng, &state.config, dt) {
        log::debug!("Boss rush started");
        state.events.push(GameEvent::BossRushStarted);
    }
    steer_boss(
        &mut state.boss,
        state.player.pos,
        factor,
        dt,
        &state.arena,
        &state.obstacles,
    );
    for drone in &mut state.drones {
        steer_drone(drone, factor, dt);
    }
}
