//! Procedural placement by bounded rejection sampling
//!
//! Each entity kind has its own inset, obstacle clearance and separation from
//! previously placed entities. Running out of attempts never fails a match:
//! coins fall back to unchecked positions, spawns fall back to fixed points,
//! and everything else is simply omitted.

use glam::Vec2;
use rand::Rng;

use super::geometry::{Arena, Rect, hits_any};
use super::state::{Bonus, BonusKind, Coin, Drone, MatchState, Timer, Trap, TrapKind};
use crate::consts::*;
use crate::tuning::GameConfig;

const SPAWN_INSET: f32 = 50.0;
const SPAWN_CLEARANCE: f32 = 10.0;
const SPAWN_ATTEMPTS: usize = 100;

const COIN_INSET: f32 = 30.0;
const COIN_CLEARANCE: f32 = 10.0;
const COIN_ATTEMPTS: usize = 1000;

/// Per-item budget for traps, bonuses and drones
const ITEM_ATTEMPTS: usize = 200;
const ITEM_INSET: f32 = 50.0;

const TRAP_CLEARANCE: f32 = 20.0;
const TRAP_COIN_GAP: f32 = 40.0;
const TRAP_TRAP_GAP: f32 = 50.0;
const TRAP_PLAYER_GAP: f32 = 60.0;

const BONUS_CLEARANCE: f32 = 15.0;
const BONUS_COIN_GAP: f32 = 30.0;
const BONUS_TRAP_GAP: f32 = 40.0;
const BONUS_BONUS_GAP: f32 = 60.0;

const DRONE_CLEARANCE: f32 = 10.0;
const DRONE_PLAYER_GAP: f32 = 150.0;
const DRONE_DRONE_GAP: f32 = 80.0;
const WAYPOINT_ATTEMPTS: usize = 50;

/// Teleport destinations
pub const TELEPORT_ATTEMPTS: usize = 50;

/// Uniform point in the arena shrunk by `inset` on every side
#[inline]
fn random_in<R: Rng + ?Sized>(rng: &mut R, arena: &Arena, inset: f32) -> Vec2 {
    Vec2::new(
        inset + rng.random::<f32>() * (arena.width - 2.0 * inset),
        inset + rng.random::<f32>() * (arena.height - 2.0 * inset),
    )
}

/// Draw up to `attempts` candidates, returning the first one `accept` allows
fn sample<R, F>(
    rng: &mut R,
    arena: &Arena,
    inset: f32,
    attempts: usize,
    mut accept: F,
) -> Option<Vec2>
where
    R: Rng + ?Sized,
    F: FnMut(Vec2) -> bool,
{
    for _ in 0..attempts {
        let candidate = random_in(rng, arena, inset);
        if accept(candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Random point where a circle of `clearance` misses every obstacle
pub fn random_free_point<R: Rng + ?Sized>(
    rng: &mut R,
    arena: &Arena,
    obstacles: &[Rect],
    inset: f32,
    clearance: f32,
    attempts: usize,
) -> Option<Vec2> {
    sample(rng, arena, inset, attempts, |p| !hits_any(p, clearance, obstacles))
}

/// Obstacle count scaled linearly with arena area
pub fn obstacle_count(arena: &Arena) -> usize {
    let scaled = (REFERENCE_OBSTACLES * arena.area() / REFERENCE_AREA).floor() as usize;
    scaled.clamp(MIN_OBSTACLES, MAX_OBSTACLES)
}

/// Distance kept between obstacles and the arena edge
#[inline]
pub fn obstacle_margin(arena: &Arena) -> f32 {
    (arena.width * 0.05).max(30.0)
}

/// One obstacle attempt per grid sector; sectors that cannot fit are skipped
pub fn generate_obstacles<R: Rng + ?Sized>(rng: &mut R, arena: &Arena) -> Vec<Rect> {
    let count = obstacle_count(arena);
    let min_size = (arena.width * 0.06).max(40.0);
    let max_size = (arena.width * 0.12).max(80.0);
    let margin = obstacle_margin(arena);

    let sectors_x = (count as f32).sqrt().ceil() as usize;
    let sectors_y = count.div_ceil(sectors_x);
    let sector_w = arena.width / sectors_x as f32;
    let sector_h = arena.height / sectors_y as f32;

    let mut obstacles: Vec<Rect> = Vec::with_capacity(count);
    'rows: for sy in 0..sectors_y {
        for sx in 0..sectors_x {
            if obstacles.len() >= count {
                break 'rows;
            }
            let width = min_size + rng.random::<f32>() * (max_size - min_size);
            let height = min_size + rng.random::<f32>() * (max_size - min_size);
            let x = sx as f32 * sector_w
                + margin
                + rng.random::<f32>() * (sector_w - width - margin * 2.0);
            let y = sy as f32 * sector_h
                + margin
                + rng.random::<f32>() * (sector_h - height - margin * 2.0);
            let rect = Rect::new(x, y, width, height);

            let inside = rect.x >= margin
                && rect.y >= margin
                && rect.right() <= arena.width - margin
                && rect.bottom() <= arena.height - margin;
            if inside && !obstacles.iter().any(|o| o.overlaps(&rect)) {
                obstacles.push(rect);
            }
        }
    }

    if obstacles.len() < count {
        log::debug!("Placed {}/{} obstacles", obstacles.len(), count);
    }
    obstacles
}

/// Player spawn, falling back to the arena center
pub fn spawn_player<R: Rng + ?Sized>(
    rng: &mut R,
    arena: &Arena,
    obstacles: &[Rect],
    radius: f32,
) -> Vec2 {
    random_free_point(
        rng,
        arena,
        obstacles,
        SPAWN_INSET,
        radius + SPAWN_CLEARANCE,
        SPAWN_ATTEMPTS,
    )
    .unwrap_or_else(|| {
        log::debug!("Player spawn exhausted, using arena center");
        arena.center()
    })
}

/// Boss spawn away from the player, falling back to the top-right corner
pub fn spawn_boss<R: Rng + ?Sized>(
    rng: &mut R,
    arena: &Arena,
    obstacles: &[Rect],
    radius: f32,
    player_pos: Vec2,
) -> Vec2 {
    sample(rng, arena, SPAWN_INSET, SPAWN_ATTEMPTS, |p| {
        p.distance(player_pos) > BOSS_SPAWN_MIN_DISTANCE
            && !hits_any(p, radius + SPAWN_CLEARANCE, obstacles)
    })
    .unwrap_or_else(|| {
        log::debug!("Boss spawn exhausted, using corner fallback");
        Vec2::new(arena.width * 0.9, arena.height * 0.1)
    })
}

/// Exactly `count` coins; any shortfall is filled without obstacle checks
pub fn generate_coins<R: Rng + ?Sized>(
    rng: &mut R,
    arena: &Arena,
    obstacles: &[Rect],
    count: usize,
    radius: f32,
) -> Vec<Coin> {
    let mut coins = Vec::with_capacity(count);
    let mut attempts = 0;
    while coins.len() < count && attempts < COIN_ATTEMPTS {
        attempts += 1;
        let pos = random_in(rng, arena, COIN_INSET);
        if !hits_any(pos, radius + COIN_CLEARANCE, obstacles) {
            coins.push(Coin {
                pos,
                radius,
                collected: false,
            });
        }
    }

    let shortfall = count - coins.len();
    if shortfall > 0 {
        // Fallback coins may overlap obstacles (pending product decision)
        log::warn!("Coin placement exhausted, {shortfall} coins placed unchecked");
        for _ in 0..shortfall {
            coins.push(Coin {
                pos: random_in(rng, arena, COIN_INSET),
                radius,
                collected: false,
            });
        }
    }
    coins
}

pub fn generate_traps<R: Rng + ?Sized>(
    rng: &mut R,
    arena: &Arena,
    obstacles: &[Rect],
    coins: &[Coin],
    player_pos: Vec2,
    config: &GameConfig,
) -> Vec<Trap> {
    let radius = config.trap_radius;
    let mut traps: Vec<Trap> = Vec::with_capacity(config.trap_count);

    for _ in 0..config.trap_count {
        let spot = sample(rng, arena, ITEM_INSET, ITEM_ATTEMPTS, |p| {
            !hits_any(p, radius + TRAP_CLEARANCE, obstacles)
                && coins
                    .iter()
                    .all(|c| p.distance(c.pos) >= radius + c.radius + TRAP_COIN_GAP)
                && traps
                    .iter()
                    .all(|t| p.distance(t.pos) >= radius + t.radius + TRAP_TRAP_GAP)
                && p.distance(player_pos) >= radius + config.player_radius + TRAP_PLAYER_GAP
        });
        let Some(pos) = spot else {
            continue;
        };
        let kind = if rng.random_bool(config.teleport_trap_chance) {
            TrapKind::Teleport
        } else {
            TrapKind::Damage
        };
        traps.push(Trap {
            pos,
            radius,
            kind,
            rearm: Timer::default(),
        });
    }

    if traps.len() < config.trap_count {
        log::debug!("Placed {}/{} traps", traps.len(), config.trap_count);
    }
    traps
}

pub fn generate_bonuses<R: Rng + ?Sized>(
    rng: &mut R,
    arena: &Arena,
    obstacles: &[Rect],
    coins: &[Coin],
    traps: &[Trap],
    config: &GameConfig,
) -> Vec<Bonus> {
    let radius = config.bonus_radius;
    let mut bonuses: Vec<Bonus> = Vec::with_capacity(config.bonus_count);

    for _ in 0..config.bonus_count {
        let spot = sample(rng, arena, ITEM_INSET, ITEM_ATTEMPTS, |p| {
            !hits_any(p, radius + BONUS_CLEARANCE, obstacles)
                && coins
                    .iter()
                    .all(|c| p.distance(c.pos) >= radius + c.radius + BONUS_COIN_GAP)
                && traps
                    .iter()
                    .all(|t| p.distance(t.pos) >= radius + t.radius + BONUS_TRAP_GAP)
                && bonuses
                    .iter()
                    .all(|b| p.distance(b.pos) >= radius + b.radius + BONUS_BONUS_GAP)
        });
        let Some(pos) = spot else {
            continue;
        };
        let kind = BonusKind::ALL[rng.random_range(0..BonusKind::ALL.len())];
        bonuses.push(Bonus {
            pos,
            radius,
            kind,
            collected: false,
        });
    }

    if bonuses.len() < config.bonus_count {
        log::debug!("Placed {}/{} bonuses", bonuses.len(), config.bonus_count);
    }
    bonuses
}

/// Sample one drone and its patrol loop
///
/// `min_player_distance` adds an absolute distance requirement on top of the
/// usual drone-to-player gap (used by wave spawns).
pub fn place_drone<R: Rng + ?Sized>(
    rng: &mut R,
    arena: &Arena,
    obstacles: &[Rect],
    drones: &[Drone],
    player_pos: Vec2,
    config: &GameConfig,
    min_player_distance: Option<f32>,
) -> Option<Drone> {
    let radius = config.drone_radius;
    let pos = sample(rng, arena, ITEM_INSET, ITEM_ATTEMPTS, |p| {
        let to_player = p.distance(player_pos);
        !hits_any(p, radius + DRONE_CLEARANCE, obstacles)
            && to_player >= radius + config.player_radius + DRONE_PLAYER_GAP
            && min_player_distance.is_none_or(|d| to_player >= d)
            && drones
                .iter()
                .all(|d| p.distance(d.pos) >= radius + d.radius + DRONE_DRONE_GAP)
    })?;

    let mut waypoints = Vec::with_capacity(config.drone_waypoints.max(1));
    waypoints.push(pos);
    for _ in 1..config.drone_waypoints {
        if let Some(wp) = random_free_point(
            rng,
            arena,
            obstacles,
            ITEM_INSET,
            radius + DRONE_CLEARANCE,
            WAYPOINT_ATTEMPTS,
        ) {
            waypoints.push(wp);
        }
    }

    Some(Drone {
        pos,
        radius,
        speed: config.drone_speed,
        // Head for the first point past the spawn
        waypoint_index: if waypoints.len() > 1 { 1 } else { 0 },
        waypoints,
        hit_cooldown: Timer::default(),
    })
}

pub fn generate_drones<R: Rng + ?Sized>(
    rng: &mut R,
    arena: &Arena,
    obstacles: &[Rect],
    player_pos: Vec2,
    config: &GameConfig,
) -> Vec<Drone> {
    let mut drones = Vec::with_capacity(config.drones_initial);
    for _ in 0..config.drones_initial {
        if let Some(drone) = place_drone(rng, arena, obstacles, &drones, player_pos, config, None) {
            drones.push(drone);
        }
    }
    if drones.len() < config.drones_initial {
        log::debug!("Placed {}/{} drones", drones.len(), config.drones_initial);
    }
    drones
}

/// Regenerate every entity collection for the current arena
pub(crate) fn generate_layout(state: &mut MatchState) {
    let arena = state.arena;
    let config = &state.config;
    let rng = &mut state.rng;

    state.obstacles = generate_obstacles(rng, &arena);
    state.player.pos = spawn_player(rng, &arena, &state.obstacles, state.player.radius);
    state.boss.pos = spawn_boss(
        rng,
        &arena,
        &state.obstacles,
        state.boss.radius,
        state.player.pos,
    );
    state.coins = generate_coins(
        rng,
        &arena,
        &state.obstacles,
        config.coins_total,
        config.coin_radius,
    );
    state.traps = generate_traps(
        rng,
        &arena,
        &state.obstacles,
        &state.coins,
        state.player.pos,
        config,
    );
    state.bonuses = generate_bonuses(
        rng,
        &arena,
        &state.obstacles,
        &state.coins,
        &state.traps,
        config,
    );
    state.drones = generate_drones(rng, &arena, &state.obstacles, state.player.pos, config);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn arena(w: f32, h: f32) -> Arena {
        Arena::new(w, h).unwrap()
    }

    #[test]
    fn test_obstacle_count_scales_and_clamps() {
        assert_eq!(obstacle_count(&arena(800.0, 800.0)), 8);
        assert_eq!(obstacle_count(&arena(800.0, 600.0)), 6);
        assert_eq!(obstacle_count(&arena(200.0, 200.0)), MIN_OBSTACLES);
        assert_eq!(obstacle_count(&arena(4000.0, 3000.0)), MAX_OBSTACLES);
    }

    #[test]
    fn test_blocked_arena_uses_spawn_fallbacks() {
        let a = arena(800.0, 600.0);
        let wall = [Rect::new(0.0, 0.0, 800.0, 600.0)];
        let mut rng = Pcg32::seed_from_u64(1);

        assert_eq!(spawn_player(&mut rng, &a, &wall, 20.0), Vec2::new(400.0, 300.0));
        assert_eq!(
            spawn_boss(&mut rng, &a, &wall, 30.0, a.center()),
            Vec2::new(720.0, 60.0)
        );
    }

    #[test]
    fn test_boss_spawns_away_from_player() {
        let a = arena(800.0, 600.0);
        let mut rng = Pcg32::seed_from_u64(6);
        for _ in 0..50 {
            let player = spawn_player(&mut rng, &a, &[], 20.0);
            let boss = spawn_boss(&mut rng, &a, &[], 30.0, player);
            assert!(boss.distance(player) > BOSS_SPAWN_MIN_DISTANCE);
        }
    }

    #[test]
    fn test_coin_fallback_keeps_exact_count() {
        let a = arena(800.0, 600.0);
        let wall = [Rect::new(0.0, 0.0, 800.0, 600.0)];
        let mut rng = Pcg32::seed_from_u64(2);
        let coins = generate_coins(&mut rng, &a, &wall, 20, 10.0);
        assert_eq!(coins.len(), 20);
        assert!(coins.iter().all(|c| !c.collected));
    }

    #[test]
    fn test_exhausted_items_are_omitted() {
        let a = arena(800.0, 600.0);
        let wall = [Rect::new(0.0, 0.0, 800.0, 600.0)];
        let config = GameConfig::arcade();
        let mut rng = Pcg32::seed_from_u64(3);

        assert!(generate_traps(&mut rng, &a, &wall, &[], a.center(), &config).is_empty());
        assert!(generate_bonuses(&mut rng, &a, &wall, &[], &[], &config).is_empty());
        assert!(generate_drones(&mut rng, &a, &wall, a.center(), &config).is_empty());
    }

    #[test]
    fn test_drone_patrol_starts_at_spawn() {
        let a = arena(800.0, 600.0);
        let config = GameConfig::arcade();
        let mut rng = Pcg32::seed_from_u64(4);
        let drone =
            place_drone(&mut rng, &a, &[], &[], Vec2::new(50.0, 50.0), &config, None).unwrap();
        assert_eq!(drone.waypoints[0], drone.pos);
        assert_eq!(drone.waypoints.len(), config.drone_waypoints);
        assert_eq!(drone.waypoint_index, 1);
    }

    #[test]
    fn test_wave_drone_respects_extra_player_distance() {
        let a = arena(800.0, 600.0);
        let config = GameConfig::arcade();
        let mut rng = Pcg32::seed_from_u64(5);
        let player = a.center();
        for _ in 0..50 {
            if let Some(d) = place_drone(&mut rng, &a, &[], &[], player, &config, Some(300.0)) {
                assert!(d.pos.distance(player) >= 300.0);
            }
        }
    }

    proptest! {
        #[test]
        fn obstacles_stay_inside_margins(
            w in 200.0f32..2400.0,
            h in 200.0f32..1600.0,
            seed in any::<u64>(),
        ) {
            let a = arena(w, h);
            let margin = obstacle_margin(&a);
            let mut rng = Pcg32::seed_from_u64(seed);
            let obstacles = generate_obstacles(&mut rng, &a);

            prop_assert!(obstacles.len() <= obstacle_count(&a));
            for (i, o) in obstacles.iter().enumerate() {
                prop_assert!(o.x >= margin && o.y >= margin);
                prop_assert!(o.right() <= w - margin && o.bottom() <= h - margin);
                for other in &obstacles[i + 1..] {
                    prop_assert!(!o.overlaps(other));
                }
            }
        }

        #[test]
        fn layout_respects_exclusion_rules(seed in any::<u64>()) {
            let a = arena(800.0, 600.0);
            let config = GameConfig::arcade();
            let mut rng = Pcg32::seed_from_u64(seed);

            let obstacles = generate_obstacles(&mut rng, &a);
            let player = spawn_player(&mut rng, &a, &obstacles, config.player_radius);
            let boss = spawn_boss(&mut rng, &a, &obstacles, config.boss_radius, player);
            let coins =
                generate_coins(&mut rng, &a, &obstacles, config.coins_total, config.coin_radius);
            let traps = generate_traps(&mut rng, &a, &obstacles, &coins, player, &config);
            let bonuses = generate_bonuses(&mut rng, &a, &obstacles, &coins, &traps, &config);
            let drones = generate_drones(&mut rng, &a, &obstacles, player, &config);

            // Spawns either satisfy their rules or sit on the documented fallback
            prop_assert!(
                player == a.center()
                    || !hits_any(player, config.player_radius + SPAWN_CLEARANCE, &obstacles)
            );
            prop_assert!(
                boss == Vec2::new(720.0, 60.0)
                    || (boss.distance(player) > BOSS_SPAWN_MIN_DISTANCE
                        && !hits_any(boss, config.boss_radius + SPAWN_CLEARANCE, &obstacles))
            );

            // An 800x600 field has ample room, so the unchecked coin fallback never kicks in
            prop_assert_eq!(coins.len(), config.coins_total);
            for c in &coins {
                prop_assert!(!hits_any(c.pos, c.radius + COIN_CLEARANCE, &obstacles));
            }
            for (i, t) in traps.iter().enumerate() {
                prop_assert!(!hits_any(t.pos, t.radius + TRAP_CLEARANCE, &obstacles));
                prop_assert!(
                    t.pos.distance(player) >= t.radius + config.player_radius + TRAP_PLAYER_GAP
                );
                for c in &coins {
                    prop_assert!(t.pos.distance(c.pos) >= t.radius + c.radius + TRAP_COIN_GAP);
                }
                for other in &traps[i + 1..] {
                    prop_assert!(
                        t.pos.distance(other.pos) >= t.radius + other.radius + TRAP_TRAP_GAP
                    );
                }
            }
            for (i, b) in bonuses.iter().enumerate() {
                prop_assert!(!hits_any(b.pos, b.radius + BONUS_CLEARANCE, &obstacles));
                for c in &coins {
                    prop_assert!(b.pos.distance(c.pos) >= b.radius + c.radius + BONUS_COIN_GAP);
                }
                for t in &traps {
                    prop_assert!(b.pos.distance(t.pos) >= b.radius + t.radius + BONUS_TRAP_GAP);
                }
                for other in &bonuses[i + 1..] {
                    prop_assert!(
                        b.pos.distance(other.pos) >= b.radius + other.radius + BONUS_BONUS_GAP
                    );
                }
            }
            for (i, d) in drones.iter().enumerate() {
                prop_assert!(!hits_any(d.pos, d.radius + DRONE_CLEARANCE, &obstacles));
                prop_assert!(
                    d.pos.distance(player) >= d.radius + config.player_radius + DRONE_PLAYER_GAP
                );
                prop_assert!(!d.waypoints.is_empty());
                for other in &drones[i + 1..] {
                    prop_assert!(
                        d.pos.distance(other.pos) >= d.radius + other.radius + DRONE_DRONE_GAP
                    );
                }
            }
        }
    }
}
