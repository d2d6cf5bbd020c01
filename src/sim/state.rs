//! Match state and core simulation types
//!
//! Everything the host draws or reacts to lives here. Cooldowns and effect
//! durations are `Timer`s decremented by the tick, never callbacks.

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{Arena, Rect};
use super::placement;
use crate::error::Result;
use crate::tuning::GameConfig;

/// Top-level match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Before the first match; layout exists but nothing moves
    Menu,
    /// Active gameplay
    Playing,
    /// Coin requirement met
    Won,
    /// Out of lives or out of time
    Lost,
}

/// Why a match was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoseReason {
    BossCaught,
    DroneCaught,
    Trap,
    TimeUp,
}

impl LoseReason {
    pub fn message(&self) -> &'static str {
        match self {
            LoseReason::BossCaught => "Boss caught you!",
            LoseReason::DroneCaught => "A drone got you!",
            LoseReason::Trap => "A trap got you!",
            LoseReason::TimeUp => "Time is up!",
        }
    }
}

impl fmt::Display for LoseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// What dealt a hit to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitSource {
    Boss,
    Drone,
    Trap,
}

impl HitSource {
    pub fn lose_reason(&self) -> LoseReason {
        match self {
            HitSource::Boss => LoseReason::BossCaught,
            HitSource::Drone => LoseReason::DroneCaught,
            HitSource::Trap => LoseReason::Trap,
        }
    }
}

/// Countdown in seconds, never negative
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    remaining: f32,
}

impl Timer {
    pub fn start(&mut self, duration: f32) {
        self.remaining = duration.max(0.0);
    }

    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }

    /// Advance by `dt`; returns true on the tick the timer runs out
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        self.remaining == 0.0
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.remaining > 0.0
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

/// Hit-absorbing shield
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub charges: u32,
    pub timer: Timer,
}

impl Shield {
    pub fn is_active(&self) -> bool {
        self.charges > 0 && self.timer.is_running()
    }

    pub fn grant(&mut self, charges: u32, duration: f32) {
        self.charges += charges;
        self.timer.start(duration);
    }

    /// Spend one charge if the shield is up
    pub fn absorb(&mut self) -> bool {
        if self.is_active() {
            self.charges -= 1;
            true
        } else {
            false
        }
    }

    fn tick(&mut self, dt: f32) {
        self.timer.tick(dt);
        if !self.timer.is_running() {
            self.charges = 0;
        }
    }
}

/// Active power-up effects and action cooldowns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    /// Player slowed (drone contact)
    pub slow: Timer,
    pub speed_boost: Timer,
    pub shield: Shield,
    pub magnet: Timer,
    /// Hostile AI suspended
    pub freeze: Timer,
    pub dash_cooldown: Timer,
    /// Hostile movement scaled down
    pub slow_motion: Timer,
    pub slow_motion_cooldown: Timer,
}

impl ActiveEffects {
    pub fn tick(&mut self, dt: f32) {
        self.slow.tick(dt);
        self.speed_boost.tick(dt);
        self.shield.tick(dt);
        self.magnet.tick(dt);
        self.freeze.tick(dt);
        self.dash_cooldown.tick(dt);
        self.slow_motion.tick(dt);
        self.slow_motion_cooldown.tick(dt);
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.freeze.is_running()
    }
}

/// Consecutive coin pickups within a rolling window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Combo {
    pub count: u32,
    pub timer: Timer,
}

impl Combo {
    pub fn register_pickup(&mut self, window: f32) -> u32 {
        self.count += 1;
        self.timer.start(window);
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.timer.clear();
    }

    /// Returns true if the combo timed out this tick
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.count > 0 && self.timer.tick(dt) {
            self.count = 0;
            return true;
        }
        false
    }
}

/// The player's avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub base_speed: f32,
    /// Last non-zero movement direction (unit length)
    pub facing: Vec2,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            pos: Vec2::ZERO,
            radius: config.player_radius,
            base_speed: config.player_speed,
            facing: Vec2::X,
        }
    }
}

/// The pursuing boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    pub radius: f32,
    pub base_speed: f32,
    /// Recomputed each tick from rush state
    pub current_speed: f32,
    pub rush: Timer,
    pub rush_cooldown: Timer,
    pub hit_cooldown: Timer,
}

impl Boss {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            pos: Vec2::ZERO,
            radius: config.boss_radius,
            base_speed: config.boss_speed,
            current_speed: config.boss_speed,
            rush: Timer::default(),
            rush_cooldown: Timer::default(),
            hit_cooldown: Timer::default(),
        }
    }

    #[inline]
    pub fn is_rushing(&self) -> bool {
        self.rush.is_running()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub pos: Vec2,
    pub radius: f32,
    pub collected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrapKind {
    Damage,
    Teleport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trap {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: TrapKind,
    /// Trap is inert while this runs
    pub rearm: Timer,
}

impl Trap {
    #[inline]
    pub fn is_armed(&self) -> bool {
        !self.rearm.is_running()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusKind {
    Speed,
    Shield,
    Magnet,
    Freeze,
}

impl BonusKind {
    pub const ALL: [BonusKind; 4] = [
        BonusKind::Speed,
        BonusKind::Shield,
        BonusKind::Magnet,
        BonusKind::Freeze,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bonus {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: BonusKind,
    pub collected: bool,
}

/// A patrolling drone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    /// Patrol loop, never empty
    pub waypoints: Vec<Vec2>,
    pub waypoint_index: usize,
    pub hit_cooldown: Timer,
}

impl Drone {
    #[inline]
    pub fn current_waypoint(&self) -> Vec2 {
        self.waypoints
            .get(self.waypoint_index)
            .copied()
            .unwrap_or(self.pos)
    }

    pub fn advance_waypoint(&mut self) {
        if !self.waypoints.is_empty() {
            self.waypoint_index = (self.waypoint_index + 1) % self.waypoints.len();
        }
    }
}

/// Something the host should react to (audio, UI, effects)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CoinCollected { index: usize, combo: u32 },
    TrapTriggered { index: usize, kind: TrapKind },
    BonusCollected { index: usize, kind: BonusKind },
    BossRushStarted,
    PlayerHit {
        source: HitSource,
        lives: u32,
        shielded: bool,
    },
    Dashed,
    SlowMotionStarted,
    WaveStarted { wave: u32 },
    DroneSpawned { index: usize },
    Won,
    Lost { reason: LoseReason },
}

/// One match session: arena, entities, counters and phase
#[derive(Debug, Clone, Serialize)]
pub struct MatchState {
    pub config: GameConfig,
    /// Session seed for reproducibility
    pub seed: u64,
    pub arena: Arena,
    pub phase: GamePhase,
    pub lose_reason: Option<LoseReason>,

    pub player: Player,
    pub boss: Boss,
    pub obstacles: Vec<Rect>,
    pub coins: Vec<Coin>,
    pub traps: Vec<Trap>,
    pub bonuses: Vec<Bonus>,
    pub drones: Vec<Drone>,

    pub combo: Combo,
    pub effects: ActiveEffects,
    pub lives: u32,
    pub score: u32,
    pub coins_collected: u32,
    /// Match clock in seconds
    pub time_remaining: f32,
    pub wave_index: u32,
    /// Seconds since the last wave spawn attempt
    pub wave_timer: f32,

    /// Events emitted by the most recent tick
    pub events: Vec<GameEvent>,

    /// Resize received mid-match, applied on the next restart
    #[serde(skip)]
    pending_arena: Option<Arena>,
    #[serde(skip)]
    pub(crate) rng: Pcg32,
}

impl MatchState {
    /// Create a session in the menu phase with an initial layout
    pub fn new(config: GameConfig, width: f32, height: f32, seed: u64) -> Result<Self> {
        config.validate()?;
        let arena = Arena::new(width, height)?;

        let mut state = Self {
            player: Player::new(&config),
            boss: Boss::new(&config),
            config,
            seed,
            arena,
            phase: GamePhase::Menu,
            lose_reason: None,
            obstacles: Vec::new(),
            coins: Vec::new(),
            traps: Vec::new(),
            bonuses: Vec::new(),
            drones: Vec::new(),
            combo: Combo::default(),
            effects: ActiveEffects::default(),
            lives: 0,
            score: 0,
            coins_collected: 0,
            time_remaining: 0.0,
            wave_index: 0,
            wave_timer: 0.0,
            events: Vec::new(),
            pending_arena: None,
            rng: Pcg32::seed_from_u64(seed),
        };
        state.reset_match();
        Ok(state)
    }

    /// Begin a match in a (possibly new) arena
    pub fn start_match(&mut self, width: f32, height: f32) -> Result<()> {
        self.arena = Arena::new(width, height)?;
        self.pending_arena = None;
        self.begin();
        Ok(())
    }

    /// Throw away the current match and start a fresh one
    pub fn restart(&mut self) {
        if let Some(arena) = self.pending_arena.take() {
            self.arena = arena;
        }
        self.begin();
    }

    /// Change the arena; mid-match the change waits for the next restart
    pub fn resize_arena(&mut self, width: f32, height: f32) -> Result<()> {
        let arena = Arena::new(width, height)?;
        if self.phase == GamePhase::Playing {
            log::warn!(
                "Resize to {}x{} deferred until the match ends",
                arena.width,
                arena.height
            );
            self.pending_arena = Some(arena);
        } else {
            self.arena = arena;
            self.pending_arena = None;
            placement::generate_layout(self);
        }
        Ok(())
    }

    /// Step the simulation; returns the events of this tick
    pub fn advance(&mut self, input: &super::TickInput, dt: f32) -> &[GameEvent] {
        super::tick(self, input, dt);
        &self.events
    }

    fn begin(&mut self) {
        self.reset_match();
        self.phase = GamePhase::Playing;
        log::info!(
            "Match started: arena {}x{}, {} obstacles, {} coins ({} required), \
             {} traps, {} bonuses, {} drones",
            self.arena.width,
            self.arena.height,
            self.obstacles.len(),
            self.coins.len(),
            self.config.coins_required,
            self.traps.len(),
            self.bonuses.len(),
            self.drones.len()
        );
    }

    fn reset_match(&mut self) {
        self.lose_reason = None;
        self.player = Player::new(&self.config);
        self.boss = Boss::new(&self.config);
        self.combo = Combo::default();
        self.effects = ActiveEffects::default();
        self.lives = self.config.lives;
        self.score = 0;
        self.coins_collected = 0;
        self.time_remaining = self.config.match_duration;
        self.wave_index = 0;
        self.wave_timer = 0.0;
        self.events.clear();
        placement::generate_layout(self);
    }

    /// Uncollected coins still on the field
    pub fn coins_remaining(&self) -> usize {
        self.coins.iter().filter(|c| !c.collected).count()
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Resize waiting for the next restart, if any
    pub fn pending_arena(&self) -> Option<Arena> {
        self.pending_arena
    }

    pub(crate) fn finish_won(&mut self) {
        self.phase = GamePhase::Won;
        self.events.push(GameEvent::Won);
        log::info!(
            "Match won: {} coins, score {}, {:.1}s left",
            self.coins_collected,
            self.score,
            self.time_remaining
        );
    }

    pub(crate) fn finish_lost(&mut self, reason: LoseReason) {
        self.phase = GamePhase::Lost;
        self.lose_reason = Some(reason);
        self.events.push(GameEvent::Lost { reason });
        log::info!(
            "Match lost ({}): {} coins, score {}",
            reason,
            self.coins_collected,
            self.score
        );
    }
}
