//! Shape descriptors attached to rigid actors

use crate::error::{PhysicsError, Result};
use crate::material::PhysicsMaterial;
use crate::pose::Pose;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub(crate) rapier::ColliderHandle);

/// Collision geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Sphere with radius
    Sphere { radius: f32 },
    /// Box with half-extents
    Box { half_extents: [f32; 3] },
    /// Capsule whose segment runs along the local X axis
    Capsule { radius: f32, half_height: f32 },
}

impl Geometry {
    /// Create a sphere
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Create a box from half-extents
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::Box {
            half_extents: [hx, hy, hz],
        }
    }

    /// Create an X-aligned capsule
    pub fn capsule(radius: f32, half_height: f32) -> Self {
        Self::Capsule { radius, half_height }
    }

    /// Reject zero, negative and non-finite dimensions
    pub fn validate(&self) -> Result<()> {
        let check = |name: &str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PhysicsError::InvalidGeometry(format!(
                    "{name} must be positive, got {value}"
                )))
            }
        };

        match *self {
            Self::Sphere { radius } => check("sphere radius", radius),
            Self::Box { half_extents } => {
                check("box half-extent x", half_extents[0])?;
                check("box half-extent y", half_extents[1])?;
                check("box half-extent z", half_extents[2])
            }
            Self::Capsule { radius, half_height } => {
                check("capsule radius", radius)?;
                check("capsule half-height", half_height)
            }
        }
    }

    /// Build a Rapier shared shape
    pub(crate) fn to_rapier(&self) -> rapier::SharedShape {
        match *self {
            Self::Sphere { radius } => rapier::SharedShape::ball(radius),
            Self::Box { half_extents } => {
                rapier::SharedShape::cuboid(half_extents[0], half_extents[1], half_extents[2])
            }
            Self::Capsule { radius, half_height } => {
                rapier::SharedShape::capsule_x(half_height, radius)
            }
        }
    }
}

/// Description for attaching a shape to an actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeDesc {
    /// Collision geometry
    pub geometry: Geometry,
    /// Pose relative to the owning actor
    #[serde(default)]
    pub local_pose: Pose,
    /// Density for mass calculation (kg/m³), ignored by static actors
    #[serde(default = "default_density")]
    pub density: f32,
    /// Surface material, `None` uses the world default
    #[serde(default)]
    pub material: Option<PhysicsMaterial>,
    /// Report touch found/lost events for this shape
    #[serde(default)]
    pub report_touches: bool,
}

fn default_density() -> f32 {
    1.0
}

impl ShapeDesc {
    /// Create a new shape description at the actor origin with density 1
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            local_pose: Pose::IDENTITY,
            density: default_density(),
            material: None,
            report_touches: false,
        }
    }

    /// Set local offset, keeping the rotation
    pub fn with_offset(mut self, x: f32, y: f32, z: f32) -> Self {
        self.local_pose.position = [x, y, z];
        self
    }

    /// Set the local pose
    pub fn with_local_pose(mut self, pose: Pose) -> Self {
        self.local_pose = pose;
        self
    }

    /// Set density
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Set material
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = Some(material);
        self
    }

    /// Enable touch reporting
    pub fn with_touch_reports(mut self, report: bool) -> Self {
        self.report_touches = report;
        self
    }

    /// Check geometry and density
    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(PhysicsError::InvalidGeometry(format!(
                "density must be positive, got {}",
                self.density
            )));
        }
        Ok(())
    }

    /// Build a Rapier collider builder
    pub(crate) fn to_rapier_builder(&self, fallback: &PhysicsMaterial) -> rapier::ColliderBuilder {
        let material = self.material.as_ref().unwrap_or(fallback);
        let mut builder = rapier::ColliderBuilder::new(self.geometry.to_rapier())
            .position(self.local_pose.to_isometry())
            .density(self.density)
            .friction(material.solver_friction())
            .restitution(material.restitution)
            .friction_combine_rule(material.friction_combine.into())
            .restitution_combine_rule(material.restitution_combine.into());

        if self.report_touches {
            builder = builder.active_events(rapier::ActiveEvents::COLLISION_EVENTS);
        }

        builder
    }
}
