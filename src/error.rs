//! Error types for precondition violations
//!
//! Gameplay degradations (placement exhaustion, zero input) are never errors;
//! only malformed arenas and configs are.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("arena dimensions must be finite")]
    NonFiniteArena,

    #[error("arena {width}x{height} is below the minimum of {min}x{min}")]
    ArenaTooSmall { width: f32, height: f32, min: f32 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
