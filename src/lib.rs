//! Coin Chase - a single-screen arcade chase game
//!
//! Core modules:
//! - `sim`: Simulation (placement, steering, interactions, match state machine)
//! - `tuning`: Data-driven game balance
//! - `error`: Precondition errors
//!
//! Drawing, audio and input capture belong to the host. It feeds a
//! [`sim::TickInput`] each frame, calls [`sim::tick`], then reads the match
//! state and the events emitted during the tick.

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::{Result, SimError};
pub use tuning::GameConfig;

/// Game configuration constants
pub mod consts {
    /// Largest simulation step; longer frames (tab backgrounding) are clamped
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Smallest arena side the placement insets can work with
    pub const MIN_ARENA_DIM: f32 = 200.0;

    /// Arena area the obstacle count is scaled against (800x800)
    pub const REFERENCE_AREA: f32 = 640_000.0;
    /// Obstacles at the reference area
    pub const REFERENCE_OBSTACLES: f32 = 8.0;
    pub const MIN_OBSTACLES: usize = 3;
    pub const MAX_OBSTACLES: usize = 12;

    /// Boss must spawn at least this far from the player
    pub const BOSS_SPAWN_MIN_DISTANCE: f32 = 200.0;
    /// Drone counts as arrived at a waypoint within this distance
    pub const WAYPOINT_THRESHOLD: f32 = 5.0;
}
