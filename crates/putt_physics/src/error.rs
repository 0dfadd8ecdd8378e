//! Error types for the physics layer

use thiserror::Error;

/// Physics layer errors
///
/// Everything here is a construction-time or lookup failure. None of them are
/// transient, so callers surface them instead of retrying.
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// A shape or cloth dimension was zero, negative or not finite
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A required actor reference was missing
    #[error("Invalid actor: {0}")]
    InvalidActor(String),

    /// Lower angular limit exceeds the upper one
    #[error("Invalid joint limit: lower {lower} > upper {upper}")]
    InvalidLimit { lower: f32, upper: f32 },

    /// Cloth grid requested with zero rows or columns
    #[error("Degenerate cloth mesh: {cols}x{rows} grid has no quads")]
    DegenerateMesh { cols: u32, rows: u32 },

    /// Rigid body not found
    #[error("Rigid body not found: {0:?}")]
    BodyNotFound(crate::body::RigidBodyHandle),

    /// Collider not found
    #[error("Collider not found: {0:?}")]
    ColliderNotFound(crate::collider::ColliderHandle),

    /// Joint not found
    #[error("Joint not found: {0:?}")]
    JointNotFound(crate::joint::JointHandle),

    /// Cloth actor not found
    #[error("Cloth not found: {0:?}")]
    ClothNotFound(crate::cloth::ClothHandle),

    /// Shape index past the end of a body's shape list
    #[error("Shape index {index} out of range (body has {count} shapes)")]
    ShapeIndexOutOfRange { index: usize, count: usize },

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
