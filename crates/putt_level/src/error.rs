//! Level error types

use putt_physics::PhysicsError;
use thiserror::Error;

/// Level errors
#[derive(Debug, Error)]
pub enum LevelError {
    /// Failure reported by the physics layer
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    /// Operation needs `initialize()` first
    #[error("Level not initialized")]
    NotInitialized,

    /// No actor with this name in the level
    #[error("Unknown actor: {0}")]
    UnknownActor(String),

    /// No joint with this name in the level
    #[error("Unknown joint: {0}")]
    UnknownJoint(String),

    /// Actor refers to a material the layout does not define
    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    /// Two actors share a name
    #[error("Duplicate actor name: {0}")]
    DuplicateActor(String),

    /// Frame time is negative or not finite
    #[error("Invalid frame time: {0}")]
    InvalidTimestep(f32),

    /// Actor has no recorded initial pose
    #[error("No initial pose recorded for: {0}")]
    MissingRecord(String),
}

/// Result type for level operations
pub type LevelResult<T> = std::result::Result<T, LevelError>;
