//! Movement rules for the player and the hostile AI
//!
//! The player moves all-or-nothing: a blocked step is dropped entirely. The
//! boss walks a fallback ladder around obstacles. Drones ignore obstacles
//! and follow their patrol loop.

use glam::Vec2;
use rand::Rng;

use super::geometry::{Arena, Rect, hits_any};
use super::state::{ActiveEffects, Boss, Drone, Player};
use crate::consts::WAYPOINT_THRESHOLD;
use crate::tuning::GameConfig;

/// Combined effect and combo multiplier on the player's base speed
pub fn player_speed_multiplier(effects: &ActiveEffects, combo: u32, config: &GameConfig) -> f32 {
    let mut multiplier = 1.0;
    if effects.slow.is_running() {
        multiplier *= config.slow_multiplier;
    }
    if effects.speed_boost.is_running() {
        multiplier *= config.speed_boost_multiplier;
    }
    if combo >= config.combo_tier1 {
        multiplier *= config.combo_tier1_multiplier;
    }
    if combo >= config.combo_tier2 {
        multiplier *= config.combo_tier2_multiplier;
    }
    multiplier
}

/// Raw input to a usable direction: at most unit length, NaN treated as idle
#[inline]
fn input_direction(direction: Vec2) -> Vec2 {
    if direction.is_finite() {
        direction.clamp_length_max(1.0)
    } else {
        Vec2::ZERO
    }
}

/// Move the player; returns false if the step was blocked or there was no input
pub fn steer_player(
    player: &mut Player,
    direction: Vec2,
    speed: f32,
    dt: f32,
    arena: &Arena,
    obstacles: &[Rect],
) -> bool {
    let dir = input_direction(direction);
    if dir == Vec2::ZERO {
        return false;
    }
    // Tiny inputs can underflow to a zero length
    player.facing = dir.normalize_or(player.facing);

    let candidate = arena.clamp_circle(player.pos + dir * speed * dt, player.radius);
    if hits_any(candidate, player.radius, obstacles) {
        return false;
    }
    player.pos = candidate;
    true
}

/// Instant jump along the input direction
///
/// Returns false (and leaves the player untouched) on zero input or when the
/// landing spot is blocked.
pub fn try_dash(
    player: &mut Player,
    direction: Vec2,
    distance: f32,
    arena: &Arena,
    obstacles: &[Rect],
) -> bool {
    let dir = input_direction(direction).normalize_or_zero();
    if dir == Vec2::ZERO {
        return false;
    }
    let candidate = arena.clamp_circle(player.pos + dir * distance, player.radius);
    if hits_any(candidate, player.radius, obstacles) {
        return false;
    }
    player.pos = candidate;
    player.facing = dir;
    true
}

/// Advance rush timers and maybe start a rush; returns true when one starts
pub fn update_rush<R: Rng + ?Sized>(
    boss: &mut Boss,
    rng: &mut R,
    config: &GameConfig,
    dt: f32,
) -> bool {
    boss.rush.tick(dt);
    boss.rush_cooldown.tick(dt);

    let can_rush =
        !boss.is_rushing() && !boss.rush_cooldown.is_running() && config.rush_chance > 0.0;
    let started = can_rush && rng.random_bool(config.rush_chance);
    if started {
        boss.rush.start(config.rush_duration);
        boss.rush_cooldown.start(config.rush_duration + config.rush_cooldown);
    }

    boss.current_speed = if boss.is_rushing() {
        boss.base_speed * config.rush_multiplier
    } else {
        boss.base_speed
    };
    started
}

/// Chase `target`, sliding around obstacles
///
/// Tries the full step, then its horizontal part, then its vertical part,
/// then the perpendicular step; stays put if all four are blocked.
pub fn steer_boss(
    boss: &mut Boss,
    target: Vec2,
    factor: f32,
    dt: f32,
    arena: &Arena,
    obstacles: &[Rect],
) {
    let dir = (target - boss.pos).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    let step = dir * boss.current_speed * dt * factor;

    let ladder = [
        step,
        Vec2::new(step.x, 0.0),
        Vec2::new(0.0, step.y),
        step.perp(),
    ];
    for offset in ladder {
        let candidate = arena.clamp_circle(boss.pos + offset, boss.radius);
        if !hits_any(candidate, boss.radius, obstacles) {
            boss.pos = candidate;
            return;
        }
    }
}

/// Patrol toward the current waypoint without overshooting
pub fn steer_drone(drone: &mut Drone, factor: f32, dt: f32) {
    let target = drone.current_waypoint();
    let to_target = target - drone.pos;
    let dist = to_target.length();
    let step = drone.speed * dt * factor;

    if step >= dist {
        drone.pos = target;
    } else {
        drone.pos += to_target / dist * step;
    }

    if drone.pos.distance(target) < WAYPOINT_THRESHOLD {
        drone.advance_waypoint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Timer;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn arena() -> Arena {
        Arena::new(800.0, 600.0).unwrap()
    }

    fn player_at(x: f32, y: f32) -> Player {
        let mut player = Player::new(&GameConfig::arcade());
        player.pos = Vec2::new(x, y);
        player
    }

    fn boss_at(x: f32, y: f32) -> Boss {
        let mut boss = Boss::new(&GameConfig::arcade());
        boss.pos = Vec2::new(x, y);
        boss
    }

    #[test]
    fn test_speed_multipliers_stack() {
        let config = GameConfig::arcade();
        let mut effects = ActiveEffects::default();
        assert_eq!(player_speed_multiplier(&effects, 0, &config), 1.0);

        effects.speed_boost.start(5.0);
        assert!((player_speed_multiplier(&effects, 0, &config) - 1.8).abs() < 1e-6);

        effects.speed_boost.clear();
        assert!((player_speed_multiplier(&effects, 3, &config) - 1.15).abs() < 1e-6);
        assert!((player_speed_multiplier(&effects, 5, &config) - 1.15 * 1.1).abs() < 1e-6);

        effects.slow.start(1.0);
        assert!((player_speed_multiplier(&effects, 0, &config) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_player_moves_and_clamps() {
        let a = arena();
        let mut player = player_at(30.0, 300.0);
        assert!(steer_player(&mut player, Vec2::new(-1.0, 0.0), 200.0, 0.1, &a, &[]));
        assert_eq!(player.pos.x, player.radius);
        assert_eq!(player.facing, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_player_input_is_capped_at_unit_length() {
        let a = arena();
        let mut player = player_at(400.0, 300.0);
        steer_player(&mut player, Vec2::new(1.0, 1.0), 100.0, 0.1, &a, &[]);
        let moved = player.pos.distance(Vec2::new(400.0, 300.0));
        assert!((moved - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_blocked_player_does_not_move_at_all() {
        let a = arena();
        // Obstacle just right of the player; the diagonal step would clip it
        let wall = [Rect::new(421.0, 0.0, 50.0, 600.0)];
        let mut player = player_at(400.0, 300.0);
        let moved = steer_player(&mut player, Vec2::new(1.0, 1.0), 200.0, 0.1, &a, &wall);
        assert!(!moved);
        assert_eq!(player.pos, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_zero_or_nan_input_is_idle() {
        let a = arena();
        let mut player = player_at(400.0, 300.0);
        assert!(!steer_player(&mut player, Vec2::ZERO, 200.0, 0.1, &a, &[]));
        assert!(!steer_player(&mut player, Vec2::new(f32::NAN, 0.0), 200.0, 0.1, &a, &[]));
        assert_eq!(player.pos, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_tiny_input_keeps_facing_finite() {
        let a = arena();
        let mut player = player_at(400.0, 300.0);
        player.facing = Vec2::NEG_Y;
        steer_player(&mut player, Vec2::new(1e-30, 0.0), 200.0, 0.1, &a, &[]);
        assert!(player.facing.is_finite());
        assert!(player.pos.is_finite());
    }

    #[test]
    fn test_dash() {
        let a = arena();
        let mut player = player_at(400.0, 300.0);
        assert!(!try_dash(&mut player, Vec2::ZERO, 100.0, &a, &[]));

        assert!(try_dash(&mut player, Vec2::new(0.5, 0.0), 100.0, &a, &[]));
        assert_eq!(player.pos, Vec2::new(500.0, 300.0));

        let wall = [Rect::new(560.0, 250.0, 40.0, 100.0)];
        assert!(!try_dash(&mut player, Vec2::X, 100.0, &a, &wall));
        assert_eq!(player.pos, Vec2::new(500.0, 300.0));
    }

    #[test]
    fn test_boss_chases_target() {
        let a = arena();
        let mut boss = boss_at(100.0, 300.0);
        steer_boss(&mut boss, Vec2::new(700.0, 300.0), 1.0, 0.1, &a, &[]);
        assert!((boss.pos.x - 112.0).abs() < 1e-3);
        assert_eq!(boss.pos.y, 300.0);
    }

    #[test]
    fn test_boss_slides_vertically_along_wall() {
        let a = arena();
        let wall = [Rect::new(131.0, 0.0, 50.0, 600.0)];
        let mut boss = boss_at(100.0, 100.0);
        steer_boss(&mut boss, Vec2::new(300.0, 300.0), 1.0, 0.1, &a, &wall);
        assert_eq!(boss.pos.x, 100.0);
        assert!(boss.pos.y > 100.0);
    }

    #[test]
    fn test_boss_tries_perpendicular_then_stays() {
        let a = arena();
        // Right and bottom walls block the first three rungs
        let walls = [
            Rect::new(130.5, 0.0, 50.0, 600.0),
            Rect::new(0.0, 130.5, 800.0, 50.0),
        ];
        let mut boss = boss_at(100.0, 100.0);
        steer_boss(&mut boss, Vec2::new(300.0, 300.0), 1.0, 0.1, &a, &walls);
        // Perpendicular (-x, +y) also clips the bottom wall
        assert_eq!(boss.pos, Vec2::new(100.0, 100.0));

        // Block only the lower right so the perpendicular rung gets through
        let walls = [
            Rect::new(130.5, 0.0, 50.0, 600.0),
            Rect::new(115.0, 130.5, 100.0, 50.0),
        ];
        steer_boss(&mut boss, Vec2::new(300.0, 300.0), 1.0, 0.1, &a, &walls);
        let s = 12.0 / 2.0f32.sqrt();
        assert!((boss.pos.x - (100.0 - s)).abs() < 1e-3);
        assert!((boss.pos.y - (100.0 + s)).abs() < 1e-3);
    }

    #[test]
    fn test_slow_factor_halves_boss_step() {
        let a = arena();
        let mut boss = boss_at(100.0, 300.0);
        steer_boss(&mut boss, Vec2::new(700.0, 300.0), 0.5, 0.1, &a, &[]);
        assert!((boss.pos.x - 106.0).abs() < 1e-3);
    }

    #[test]
    fn test_rush_starts_and_respects_cooldown() {
        let mut config = GameConfig::arcade();
        config.rush_chance = 1.0;
        let mut rng = Pcg32::seed_from_u64(9);
        let mut boss = boss_at(0.0, 0.0);

        assert!(update_rush(&mut boss, &mut rng, &config, 0.1));
        assert!(boss.is_rushing());
        assert!((boss.current_speed - 120.0 * 2.2).abs() < 1e-3);

        // Still rushing, then cooling down: no retrigger
        for _ in 0..40 {
            assert!(!update_rush(&mut boss, &mut rng, &config, 0.1));
        }
        assert!(!boss.is_rushing());
        assert_eq!(boss.current_speed, 120.0);

        // Cooldown is rush (2s) + 5s; run it out
        for _ in 0..40 {
            update_rush(&mut boss, &mut rng, &config, 0.1);
        }
        assert!(boss.is_rushing());
    }

    #[test]
    fn test_rush_never_starts_with_zero_chance() {
        let config = GameConfig::classic();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut boss = boss_at(0.0, 0.0);
        for _ in 0..10_000 {
            assert!(!update_rush(&mut boss, &mut rng, &config, 0.016));
        }
    }

    #[test]
    fn test_drone_patrols_cyclically() {
        let mut drone = Drone {
            pos: Vec2::new(0.0, 0.0),
            radius: 14.0,
            speed: 100.0,
            waypoints: vec![Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0)],
            waypoint_index: 1,
            hit_cooldown: Timer::default(),
        };
        steer_drone(&mut drone, 1.0, 0.1);
        assert_eq!(drone.pos, Vec2::new(10.0, 0.0));
        assert_eq!(drone.waypoint_index, 1);

        // Lands on the waypoint instead of overshooting, then turns back
        steer_drone(&mut drone, 1.0, 0.1);
        assert_eq!(drone.pos, Vec2::new(20.0, 0.0));
        assert_eq!(drone.waypoint_index, 0);
    }
}
