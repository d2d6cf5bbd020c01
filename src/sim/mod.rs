//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep, clamped
//! - Seeded RNG only, owned by the match
//! - Stable iteration order (collection index)
//! - No rendering or platform dependencies

pub mod geometry;
mod interaction;
pub mod placement;
pub mod state;
pub mod steering;
pub mod tick;

pub use geometry::{Arena, Rect, circle_intersects_rect, circles_overlap};
pub use state::{
    ActiveEffects, Bonus, BonusKind, Boss, Coin, Combo, Drone, GameEvent, GamePhase, HitSource,
    LoseReason, MatchState, Player, Shield, Timer, Trap, TrapKind,
};
pub use tick::{TickInput, tick};
