//! Physics configuration

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// Physics world configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 in Y)
    pub gravity: [f32; 3],

    /// Fixed timestep for physics simulation
    pub timestep: f32,

    /// Maximum number of substeps per frame
    pub max_substeps: u32,

    /// Enable continuous collision detection on dynamic bodies
    pub ccd_enabled: bool,

    /// Friction for shapes created without a material
    pub default_friction: f32,

    /// Restitution for shapes created without a material
    pub default_restitution: f32,

    /// Solver iterations for velocity
    pub velocity_iterations: usize,

    /// Enable sleeping for inactive bodies
    pub sleeping_enabled: bool,

    /// Gain used by revolute joint velocity drives
    pub drive_factor: f32,

    /// Cloth solver settings
    pub cloth: ClothSettings,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            timestep: 1.0 / 60.0,
            max_substeps: 4,
            ccd_enabled: true,
            default_friction: 0.5,
            default_restitution: 0.0,
            velocity_iterations: 4,
            sleeping_enabled: true,
            drive_factor: 10.0,
            cloth: ClothSettings::default(),
        }
    }
}

impl PhysicsConfig {
    /// Create a configuration for high-precision simulation
    pub fn high_precision() -> Self {
        Self {
            velocity_iterations: 8,
            max_substeps: 8,
            cloth: ClothSettings {
                iterations: 8,
                substeps: 4,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Create a configuration for fast simulation (lower quality)
    pub fn fast() -> Self {
        Self {
            velocity_iterations: 2,
            max_substeps: 2,
            ccd_enabled: false,
            cloth: ClothSettings {
                iterations: 2,
                substeps: 1,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Set gravity
    pub fn with_gravity(mut self, x: f32, y: f32, z: f32) -> Self {
        self.gravity = [x, y, z];
        self
    }

    /// Set timestep
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Check the values the world cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.max_substeps == 0 {
            return Err(PhysicsError::InvalidConfig("max_substeps must be at least 1".into()));
        }
        if self.velocity_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "velocity_iterations must be at least 1".into(),
            ));
        }
        self.cloth.validate()
    }
}

/// Cloth solver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothSettings {
    /// Constraint projection passes per substep
    pub iterations: u32,
    /// Cloth substeps per fixed physics step
    pub substeps: u32,
    /// Velocity damping per substep [0, 1), 0 = none
    pub damping: f32,
    /// Stiffness of constraints along the gravity axis
    pub vertical_stiffness: f32,
    /// Stiffness of constraints across the gravity axis
    pub horizontal_stiffness: f32,
    /// Stiffness of cell diagonals
    pub shearing_stiffness: f32,
    /// Stiffness of two-cell spans
    pub bending_stiffness: f32,
}

impl Default for ClothSettings {
    fn default() -> Self {
        Self {
            iterations: 4,
            substeps: 2,
            damping: 0.01,
            vertical_stiffness: 1.0,
            horizontal_stiffness: 1.0,
            shearing_stiffness: 0.75,
            bending_stiffness: 0.2,
        }
    }
}

impl ClothSettings {
    fn validate(&self) -> Result<()> {
        if self.substeps == 0 {
            return Err(PhysicsError::InvalidConfig("cloth.substeps must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.damping) {
            return Err(PhysicsError::InvalidConfig(format!(
                "cloth.damping must be in [0, 1), got {}",
                self.damping
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PhysicsConfig::default().validate().is_ok());
        assert!(PhysicsConfig::high_precision().validate().is_ok());
        assert!(PhysicsConfig::fast().validate().is_ok());
    }

    #[test]
    fn test_zero_timestep_rejected() {
        let config = PhysicsConfig::default().with_timestep(0.0);
        assert!(matches!(config.validate(), Err(PhysicsError::InvalidConfig(_))));
    }

    #[test]
    fn test_cloth_damping_range() {
        let mut config = PhysicsConfig::default();
        config.cloth.damping = 1.0;
        assert!(config.validate().is_err());
    }
}
