//! Per-tick proximity checks and their consequences
//!
//! Runs after steering. Every consequence (lives, shield, combo, effects) is
//! applied in the same tick as the check that caused it. Resolution stops as
//! soon as the match ends.

use super::geometry::circles_overlap;
use super::placement::{TELEPORT_ATTEMPTS, place_drone, random_free_point};
use super::state::{BonusKind, GameEvent, GamePhase, HitSource, LoseReason, MatchState, TrapKind};

const TELEPORT_INSET: f32 = 50.0;
const TELEPORT_CLEARANCE: f32 = 10.0;

/// Run every interaction in order
pub(crate) fn resolve(state: &mut MatchState, dt: f32) {
    pull_coins(state, dt);

    let steps: [fn(&mut MatchState); 5] = [
        resolve_boss_contact,
        resolve_drone_contacts,
        collect_coins,
        resolve_traps,
        collect_bonuses,
    ];
    for step in steps {
        step(state);
        if state.phase != GamePhase::Playing {
            return;
        }
    }

    spawn_waves(state, dt);
}

/// Combo reset, then shield charge or a life
pub(crate) fn apply_hit(state: &mut MatchState, source: HitSource) {
    state.combo.reset();
    let shielded = state.effects.shield.absorb();
    if !shielded {
        state.lives = state.lives.saturating_sub(1);
    }
    state.events.push(GameEvent::PlayerHit {
        source,
        lives: state.lives,
        shielded,
    });
    log::debug!("Player hit by {source:?} (shielded: {shielded}, lives: {})", state.lives);

    if state.lives == 0 {
        state.finish_lost(source.lose_reason());
    }
}

/// Magnet drags nearby uncollected coins toward the player
fn pull_coins(state: &mut MatchState, dt: f32) {
    if !state.effects.magnet.is_running() {
        return;
    }
    let target = state.player.pos;
    let radius = state.config.magnet_radius;
    let step = state.config.magnet_pull_speed * dt;

    for coin in state.coins.iter_mut().filter(|c| !c.collected) {
        let to_player = target - coin.pos;
        let dist = to_player.length();
        if dist > 0.0 && dist <= radius {
            coin.pos += to_player / dist * step.min(dist);
        }
    }
}

fn resolve_boss_contact(state: &mut MatchState) {
    let boss = &mut state.boss;
    if boss.hit_cooldown.is_running()
        || !circles_overlap(state.player.pos, state.player.radius, boss.pos, boss.radius)
    {
        return;
    }
    boss.hit_cooldown.start(state.config.hit_cooldown);

    if state.config.boss_lethal {
        // Shield and lives do not apply
        state.combo.reset();
        state.events.push(GameEvent::PlayerHit {
            source: HitSource::Boss,
            lives: state.lives,
            shielded: false,
        });
        state.finish_lost(LoseReason::BossCaught);
    } else {
        apply_hit(state, HitSource::Boss);
    }
}

fn resolve_drone_contacts(state: &mut MatchState) {
    for i in 0..state.drones.len() {
        let drone = &mut state.drones[i];
        if drone.hit_cooldown.is_running()
            || !circles_overlap(state.player.pos, state.player.radius, drone.pos, drone.radius)
        {
            continue;
        }
        drone.hit_cooldown.start(state.config.hit_cooldown);
        state.effects.slow.start(state.config.slow_duration);
        apply_hit(state, HitSource::Drone);
        if state.phase != GamePhase::Playing {
            return;
        }
    }
}

fn collect_coins(state: &mut MatchState) {
    let window = state.config.combo_window;
    let required = state.config.coins_required;

    for index in 0..state.coins.len() {
        let coin = &mut state.coins[index];
        let touching =
            circles_overlap(state.player.pos, state.player.radius, coin.pos, coin.radius);
        if coin.collected || !touching {
            continue;
        }
        coin.collected = true;

        let combo = state.combo.register_pickup(window);
        state.coins_collected += 1;
        state.score += state.config.coin_value + state.config.combo_bonus * (combo - 1);
        state.events.push(GameEvent::CoinCollected { index, combo });

        if state.coins_collected >= required {
            state.finish_won();
            return;
        }
    }
}

fn resolve_traps(state: &mut MatchState) {
    for index in 0..state.traps.len() {
        let trap = &mut state.traps[index];
        let touching =
            circles_overlap(state.player.pos, state.player.radius, trap.pos, trap.radius);
        if !trap.is_armed() || !touching {
            continue;
        }
        trap.rearm.start(state.config.trap_rearm);
        let kind = trap.kind;
        state.events.push(GameEvent::TrapTriggered { index, kind });

        match kind {
            TrapKind::Damage => {
                apply_hit(state, HitSource::Trap);
                if state.phase != GamePhase::Playing {
                    return;
                }
            }
            TrapKind::Teleport => teleport_player(state),
        }
    }
}

/// Relocate the player to a random obstacle-free point, if one turns up
fn teleport_player(state: &mut MatchState) {
    let destination = random_free_point(
        &mut state.rng,
        &state.arena,
        &state.obstacles,
        TELEPORT_INSET,
        state.player.radius + TELEPORT_CLEARANCE,
        TELEPORT_ATTEMPTS,
    );
    match destination {
        Some(pos) => {
            log::debug!("Teleported player to ({:.0}, {:.0})", pos.x, pos.y);
            state.player.pos = pos;
        }
        None => log::debug!("Teleport found no free spot"),
    }
}

fn collect_bonuses(state: &mut MatchState) {
    for index in 0..state.bonuses.len() {
        let bonus = &mut state.bonuses[index];
        let touching =
            circles_overlap(state.player.pos, state.player.radius, bonus.pos, bonus.radius);
        if bonus.collected || !touching {
            continue;
        }
        bonus.collected = true;
        let kind = bonus.kind;

        let config = &state.config;
        let effects = &mut state.effects;
        match kind {
            BonusKind::Speed => effects.speed_boost.start(config.speed_boost_duration),
            BonusKind::Shield => {
                effects.shield.grant(config.shield_charges, config.shield_duration)
            }
            BonusKind::Magnet => effects.magnet.start(config.magnet_duration),
            BonusKind::Freeze => effects.freeze.start(config.freeze_duration),
        }
        state.events.push(GameEvent::BonusCollected { index, kind });
    }
}

/// Periodic drone reinforcements, capped at `drones_max`
fn spawn_waves(state: &mut MatchState, dt: f32) {
    let interval = state.config.wave_interval;
    if interval <= 0.0 {
        return;
    }
    state.wave_timer += dt;
    if state.wave_timer < interval {
        return;
    }
    state.wave_timer -= interval;
    state.wave_index += 1;
    state.events.push(GameEvent::WaveStarted {
        wave: state.wave_index,
    });
    log::info!("Wave {} started ({} drones)", state.wave_index, state.drones.len());

    if state.drones.len() >= state.config.drones_max {
        return;
    }
    let drone = place_drone(
        &mut state.rng,
        &state.arena,
        &state.obstacles,
        &state.drones,
        state.player.pos,
        &state.config,
        Some(state.config.wave_min_player_distance),
    );
    match drone {
        Some(drone) => {
            state.drones.push(drone);
            state.events.push(GameEvent::DroneSpawned {
                index: state.drones.len() - 1,
            });
        }
        None => log::debug!("Wave {} drone found no spot", state.wave_index),
    }
}
