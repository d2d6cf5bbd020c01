//! Data-driven game balance
//!
//! Every game variant is a `GameConfig` value rather than a separate code
//! path. Presets mirror the three shipped variants; a host may also load a
//! config from JSON.

use serde::{Deserialize, Serialize};

use crate::consts::MIN_ARENA_DIM;
use crate::error::{Result, SimError};

/// Complete set of tunables for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Match ===
    /// Match length in seconds
    pub match_duration: f32,
    pub lives: u32,
    pub coins_total: usize,
    pub coins_required: u32,
    pub coin_radius: f32,
    /// Base score per coin
    pub coin_value: u32,
    /// Extra score per combo step beyond the first
    pub combo_bonus: u32,

    // === Player ===
    pub player_radius: f32,
    pub player_speed: f32,
    /// Multiplier while slowed by a drone
    pub slow_multiplier: f32,
    pub slow_duration: f32,
    pub dash_distance: f32,
    pub dash_cooldown: f32,
    pub slow_motion_duration: f32,
    pub slow_motion_cooldown: f32,
    /// Applied to hostile movement while slow-motion is active
    pub slow_motion_factor: f32,

    // === Boss ===
    pub boss_radius: f32,
    pub boss_speed: f32,
    /// Contact ends the match immediately, ignoring shield and lives. Still
    /// emits `PlayerHit` before `Lost`
    pub boss_lethal: bool,
    pub rush_multiplier: f32,
    /// Per-tick probability of starting a rush once the cooldown elapsed
    pub rush_chance: f64,
    pub rush_duration: f32,
    pub rush_cooldown: f32,
    pub hit_cooldown: f32,

    // === Combo ===
    pub combo_window: f32,
    pub combo_tier1: u32,
    pub combo_tier1_multiplier: f32,
    pub combo_tier2: u32,
    pub combo_tier2_multiplier: f32,

    // === Traps ===
    pub trap_count: usize,
    pub trap_radius: f32,
    pub trap_rearm: f32,
    /// Probability a placed trap is a teleport trap
    pub teleport_trap_chance: f64,

    // === Bonuses ===
    pub bonus_count: usize,
    pub bonus_radius: f32,
    pub speed_boost_multiplier: f32,
    pub speed_boost_duration: f32,
    pub shield_charges: u32,
    pub shield_duration: f32,
    pub magnet_duration: f32,
    pub magnet_radius: f32,
    pub magnet_pull_speed: f32,
    pub freeze_duration: f32,

    // === Drones & waves ===
    pub drones_initial: usize,
    pub drones_max: usize,
    pub drone_radius: f32,
    pub drone_speed: f32,
    /// Patrol points per drone, including its spawn point
    pub drone_waypoints: usize,
    /// Seconds between wave spawn attempts (0 disables waves)
    pub wave_interval: f32,
    pub wave_min_player_distance: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::arcade()
    }
}

impl GameConfig {
    /// Single-boss ruleset: lethal boss, coins and obstacles only
    pub fn classic() -> Self {
        Self {
            boss_lethal: true,
            rush_chance: 0.0,
            trap_count: 0,
            bonus_count: 0,
            drones_initial: 0,
            drones_max: 0,
            wave_interval: 0.0,
            lives: 1,
            ..Self::arcade()
        }
    }

    /// Full feature set: traps, bonuses, drones, waves, combo
    pub fn arcade() -> Self {
        Self {
            match_duration: 90.0,
            lives: 3,
            coins_total: 20,
            coins_required: 14,
            coin_radius: 10.0,
            coin_value: 10,
            combo_bonus: 5,

            player_radius: 20.0,
            player_speed: 200.0,
            slow_multiplier: 0.3,
            slow_duration: 1.5,
            dash_distance: 100.0,
            dash_cooldown: 3.0,
            slow_motion_duration: 3.0,
            slow_motion_cooldown: 10.0,
            slow_motion_factor: 0.5,

            boss_radius: 30.0,
            boss_speed: 120.0,
            boss_lethal: false,
            rush_multiplier: 2.2,
            rush_chance: 0.002,
            rush_duration: 2.0,
            rush_cooldown: 5.0,
            hit_cooldown: 1.0,

            combo_window: 3.0,
            combo_tier1: 3,
            combo_tier1_multiplier: 1.15,
            combo_tier2: 5,
            combo_tier2_multiplier: 1.1,

            trap_count: 4,
            trap_radius: 15.0,
            trap_rearm: 2.0,
            teleport_trap_chance: 0.3,

            bonus_count: 3,
            bonus_radius: 12.0,
            speed_boost_multiplier: 1.8,
            speed_boost_duration: 5.0,
            shield_charges: 2,
            shield_duration: 10.0,
            magnet_duration: 6.0,
            magnet_radius: 150.0,
            magnet_pull_speed: 250.0,
            freeze_duration: 4.0,

            drones_initial: 2,
            drones_max: 5,
            drone_radius: 14.0,
            drone_speed: 90.0,
            drone_waypoints: 3,
            wave_interval: 20.0,
            wave_min_player_distance: 250.0,
        }
    }

    /// Drone-heavy variant with fewer lives and faster waves
    pub fn survival() -> Self {
        Self {
            lives: 2,
            match_duration: 120.0,
            coins_total: 24,
            coins_required: 18,
            drones_initial: 3,
            drones_max: 8,
            drone_speed: 110.0,
            wave_interval: 12.0,
            trap_count: 6,
            ..Self::arcade()
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "classic" => Some(Self::classic()),
            "arcade" => Some(Self::arcade()),
            "survival" => Some(Self::survival()),
            _ => None,
        }
    }

    /// Parse a config from JSON; missing fields fall back to `arcade()`
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs no match could be played with
    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: String) -> Result<()> {
            Err(SimError::InvalidConfig(msg))
        }

        if self.coins_required as usize > self.coins_total {
            return invalid(format!(
                "coins_required ({}) exceeds coins_total ({})",
                self.coins_required, self.coins_total
            ));
        }
        if self.lives == 0 {
            return invalid("lives must be at least 1".into());
        }
        if self.drones_initial > self.drones_max {
            return invalid(format!(
                "drones_initial ({}) exceeds drones_max ({})",
                self.drones_initial, self.drones_max
            ));
        }
        if self.drone_waypoints == 0 {
            return invalid("drone_waypoints must be at least 1".into());
        }
        let positive = [
            ("match_duration", self.match_duration),
            ("player_speed", self.player_speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("{name} must be positive, got {value}"));
            }
        }

        // Every entity has to fit inside the smallest legal arena
        let max_radius = MIN_ARENA_DIM / 2.0;
        let radii = [
            ("player_radius", self.player_radius),
            ("boss_radius", self.boss_radius),
            ("drone_radius", self.drone_radius),
            ("coin_radius", self.coin_radius),
            ("trap_radius", self.trap_radius),
            ("bonus_radius", self.bonus_radius),
        ];
        for (name, r) in radii {
            if !(r.is_finite() && r > 0.0 && r <= max_radius) {
                return invalid(format!("{name} must be in (0, {max_radius}], got {r}"));
            }
        }

        let non_negative = [
            ("slow_multiplier", self.slow_multiplier),
            ("slow_duration", self.slow_duration),
            ("dash_distance", self.dash_distance),
            ("dash_cooldown", self.dash_cooldown),
            ("slow_motion_duration", self.slow_motion_duration),
            ("slow_motion_cooldown", self.slow_motion_cooldown),
            ("slow_motion_factor", self.slow_motion_factor),
            ("boss_speed", self.boss_speed),
            ("rush_multiplier", self.rush_multiplier),
            ("rush_duration", self.rush_duration),
            ("rush_cooldown", self.rush_cooldown),
            ("hit_cooldown", self.hit_cooldown),
            ("combo_window", self.combo_window),
            ("combo_tier1_multiplier", self.combo_tier1_multiplier),
            ("combo_tier2_multiplier", self.combo_tier2_multiplier),
            ("trap_rearm", self.trap_rearm),
            ("speed_boost_multiplier", self.speed_boost_multiplier),
            ("speed_boost_duration", self.speed_boost_duration),
            ("shield_duration", self.shield_duration),
            ("magnet_duration", self.magnet_duration),
            ("magnet_radius", self.magnet_radius),
            ("magnet_pull_speed", self.magnet_pull_speed),
            ("freeze_duration", self.freeze_duration),
            ("drone_speed", self.drone_speed),
            ("wave_interval", self.wave_interval),
            ("wave_min_player_distance", self.wave_min_player_distance),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("{name} must be non-negative, got {value}"));
            }
        }
        for (name, p) in [
            ("rush_chance", self.rush_chance),
            ("teleport_trap_chance", self.teleport_trap_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{name} must be a probability, got {p}"));
            }
        }
        Ok(())
    }
}
