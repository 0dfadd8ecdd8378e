//! Rigid actor types

use crate::pose::Pose;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub(crate) rapier::RigidBodyHandle);

/// Kind of rigid actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActorKind {
    /// Never moves, infinite mass
    Static,
    /// Fully simulated
    #[default]
    Dynamic,
    /// Moved by the user, pushes dynamic bodies
    Kinematic,
}

impl From<ActorKind> for rapier::RigidBodyType {
    fn from(kind: ActorKind) -> Self {
        match kind {
            ActorKind::Static => rapier::RigidBodyType::Fixed,
            ActorKind::Dynamic => rapier::RigidBodyType::Dynamic,
            ActorKind::Kinematic => rapier::RigidBodyType::KinematicPositionBased,
        }
    }
}

/// Description for creating a rigid actor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBodyDesc {
    /// Kind of actor
    pub kind: ActorKind,
    /// Initial global pose
    pub pose: Pose,
    /// Initial linear velocity
    pub linear_velocity: [f32; 3],
    /// Initial angular velocity
    pub angular_velocity: [f32; 3],
    /// Whether gravity acts on the body
    pub gravity_enabled: bool,
    /// Disabled bodies neither move nor collide
    pub simulation_enabled: bool,
    /// Linear damping (air resistance)
    pub linear_damping: f32,
    /// Angular damping (rotational resistance)
    pub angular_damping: f32,
    /// Enable continuous collision detection
    pub ccd_enabled: bool,
    /// Can this body sleep when inactive
    pub can_sleep: bool,
    /// User data (scene actor index, etc.)
    pub user_data: u128,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            kind: ActorKind::Dynamic,
            pose: Pose::IDENTITY,
            linear_velocity: [0.0, 0.0, 0.0],
            angular_velocity: [0.0, 0.0, 0.0],
            gravity_enabled: true,
            simulation_enabled: true,
            linear_damping: 0.0,
            angular_damping: 0.0,
            ccd_enabled: false,
            can_sleep: true,
            user_data: 0,
        }
    }
}

impl RigidBodyDesc {
    /// Create a description of the given kind at a pose
    pub fn new(kind: ActorKind, pose: Pose) -> Self {
        Self {
            kind,
            pose,
            ..Default::default()
        }
    }

    /// Create a dynamic body description
    pub fn dynamic() -> Self {
        Self::new(ActorKind::Dynamic, Pose::IDENTITY)
    }

    /// Set position, keeping the rotation
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.pose.position = [x, y, z];
        self
    }

    /// Set the full pose
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Enable or disable gravity
    pub fn with_gravity(mut self, enabled: bool) -> Self {
        self.gravity_enabled = enabled;
        self
    }

    /// Enable or disable simulation
    pub fn with_simulation(mut self, enabled: bool) -> Self {
        self.simulation_enabled = enabled;
        self
    }

    /// Set linear damping
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Set user data
    pub fn with_user_data(mut self, data: u128) -> Self {
        self.user_data = data;
        self
    }

    /// Build a Rapier rigid body builder
    pub(crate) fn to_rapier_builder(&self) -> rapier::RigidBodyBuilder {
        rapier::RigidBodyBuilder::new(self.kind.into())
            .position(self.pose.to_isometry())
            .linvel(rapier::Vector::new(
                self.linear_velocity[0],
                self.linear_velocity[1],
                self.linear_velocity[2],
            ))
            .angvel(rapier::Vector::new(
                self.angular_velocity[0],
                self.angular_velocity[1],
                self.angular_velocity[2],
            ))
            .gravity_scale(if self.gravity_enabled { 1.0 } else { 0.0 })
            .linear_damping(self.linear_damping)
            .angular_damping(self.angular_damping)
            .ccd_enabled(self.ccd_enabled)
            .can_sleep(self.can_sleep)
            .enabled(self.simulation_enabled)
            .user_data(self.user_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(rapier::RigidBodyType::from(ActorKind::Static), rapier::RigidBodyType::Fixed);
        assert_eq!(
            rapier::RigidBodyType::from(ActorKind::Kinematic),
            rapier::RigidBodyType::KinematicPositionBased
        );
    }

    #[test]
    fn test_builder_keeps_rotation() {
        let pose = Pose::from_axis_angle([0.0, 0.0, 0.0], 1.0, [1.0, 0.0, 0.0]);
        let desc = RigidBodyDesc::dynamic().with_pose(pose).with_position(1.0, 2.0, 3.0);
        assert_eq!(desc.pose.position, [1.0, 2.0, 3.0]);
        assert_eq!(desc.pose.rotation, pose.rotation);
    }
}
