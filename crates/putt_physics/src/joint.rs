//! Revolute joints between a driver and a driven actor
//!
//! A joint leaves one rotational degree of freedom free, the local X axis of
//! its frames. That axis can carry an angular limit, a velocity drive, or
//! both; the two controls are independent.

use crate::body::RigidBodyHandle;
use crate::error::{PhysicsError, Result};
use crate::pose::Pose;
use crate::world::PhysicsWorld;
use log::debug;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Axis left free by a revolute joint
const FREE_AXIS: rapier::JointAxis = rapier::JointAxis::AngX;

/// Handle to a joint in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointHandle(pub(crate) rapier::ImpulseJointHandle);

/// Which controls are active on a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointState {
    /// Free rotation
    Idle,
    /// Angular limit only
    LimitOnly,
    /// Velocity drive only
    DriveOnly,
    /// Both limit and drive
    DriveAndLimit,
}

impl JointState {
    fn from_flags(limited: bool, driven: bool) -> Self {
        match (limited, driven) {
            (false, false) => Self::Idle,
            (true, false) => Self::LimitOnly,
            (false, true) => Self::DriveOnly,
            (true, true) => Self::DriveAndLimit,
        }
    }
}

/// Description for creating a revolute joint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevoluteJointDesc {
    /// Driver frame, relative to the driver or to the world when there is none
    pub driver_frame: Pose,
    /// Driven frame, relative to the driven actor
    pub driven_frame: Pose,
    /// Optional angular limit `[lower, upper]` in radians
    #[serde(default)]
    pub limits: Option<[f32; 2]>,
    /// Optional drive velocity in radians per second
    #[serde(default)]
    pub drive_velocity: Option<f32>,
}

impl RevoluteJointDesc {
    /// Create a joint description from its two local frames
    pub fn new(driver_frame: Pose, driven_frame: Pose) -> Self {
        Self {
            driver_frame,
            driven_frame,
            limits: None,
            drive_velocity: None,
        }
    }

    /// Enable the angular limit
    pub fn with_limits(mut self, lower: f32, upper: f32) -> Self {
        self.limits = Some([lower, upper]);
        self
    }

    /// Enable the velocity drive
    pub fn with_drive_velocity(mut self, velocity: f32) -> Self {
        self.drive_velocity = Some(velocity);
        self
    }
}

fn check_limits(lower: f32, upper: f32) -> Result<()> {
    if lower.is_nan() || upper.is_nan() || lower > upper {
        return Err(PhysicsError::InvalidLimit { lower, upper });
    }
    Ok(())
}

impl PhysicsWorld {
    /// Fixed body standing in for the world frame
    fn world_anchor(&mut self) -> rapier::RigidBodyHandle {
        if let Some(anchor) = self.world_anchor {
            if self.bodies.contains(anchor) {
                return anchor;
            }
        }
        let anchor = self.bodies.insert(rapier::RigidBodyBuilder::fixed());
        self.world_anchor = Some(anchor);
        anchor
    }

    /// Connect `driven` to `driver` with a revolute joint.
    ///
    /// Without a driver the joint is anchored to the world frame. The two
    /// connected bodies never collide with each other.
    pub fn create_revolute_joint(
        &mut self,
        driver: Option<RigidBodyHandle>,
        driven: Option<RigidBodyHandle>,
        desc: RevoluteJointDesc,
    ) -> Result<JointHandle> {
        let driven = driven
            .ok_or_else(|| PhysicsError::InvalidActor("revolute joint needs a driven actor".into()))?;
        if !self.bodies.contains(driven.0) {
            return Err(PhysicsError::InvalidActor(format!(
                "driven actor {driven:?} does not exist"
            )));
        }
        if let Some([lower, upper]) = desc.limits {
            check_limits(lower, upper)?;
        }

        let driver_raw = match driver {
            Some(driver) if self.bodies.contains(driver.0) => driver.0,
            Some(driver) => {
                return Err(PhysicsError::InvalidActor(format!(
                    "driver actor {driver:?} does not exist"
                )))
            }
            None => self.world_anchor(),
        };

        let mut joint = rapier::GenericJointBuilder::new(rapier::JointAxesMask::LOCKED_REVOLUTE_AXES)
            .local_frame1(desc.driver_frame.to_isometry())
            .local_frame2(desc.driven_frame.to_isometry())
            .contacts_enabled(false)
            .build();

        if let Some([lower, upper]) = desc.limits {
            joint.set_limits(FREE_AXIS, [lower, upper]);
        }
        if let Some(velocity) = desc.drive_velocity {
            joint.set_motor_velocity(FREE_AXIS, velocity, self.config().drive_factor);
        }

        let handle = JointHandle(self.impulse_joints.insert(driver_raw, driven.0, joint, true));
        debug!("Created revolute joint {:?} driving {:?}", handle, driven);
        Ok(handle)
    }

    fn joint(&self, joint: JointHandle) -> Result<&rapier::ImpulseJoint> {
        self.impulse_joints
            .get(joint.0)
            .ok_or(PhysicsError::JointNotFound(joint))
    }

    /// Enable the angular limit; the drive is left as it is
    pub fn set_joint_limits(&mut self, joint: JointHandle, lower: f32, upper: f32) -> Result<()> {
        check_limits(lower, upper)?;
        let j = self
            .impulse_joints
            .get_mut(joint.0)
            .ok_or(PhysicsError::JointNotFound(joint))?;
        j.data.set_limits(FREE_AXIS, [lower, upper]);
        Ok(())
    }

    /// Current angular limit, if enabled
    pub fn joint_limits(&self, joint: JointHandle) -> Result<Option<(f32, f32)>> {
        self.joint(joint)
            .map(|j| j.data.limits(FREE_AXIS).map(|l| (l.min, l.max)))
    }

    /// Wake the connected bodies, then drive the joint at `velocity` rad/s.
    ///
    /// The limit is left as it is.
    pub fn set_joint_drive_velocity(&mut self, joint: JointHandle, velocity: f32) -> Result<()> {
        let (body1, body2) = {
            let j = self.joint(joint)?;
            (j.body1, j.body2)
        };

        for handle in [body1, body2] {
            if let Some(body) = self.bodies.get_mut(handle) {
                if !body.is_fixed() && body.is_sleeping() {
                    body.wake_up(true);
                }
            }
        }

        let factor = self.config().drive_factor;
        let j = self
            .impulse_joints
            .get_mut(joint.0)
            .ok_or(PhysicsError::JointNotFound(joint))?;
        j.data.set_motor_velocity(FREE_AXIS, velocity, factor);
        Ok(())
    }

    /// Target drive velocity, 0 when the drive is off
    pub fn joint_drive_velocity(&self, joint: JointHandle) -> Result<f32> {
        self.joint(joint)
            .map(|j| j.data.motor(FREE_AXIS).map(|m| m.target_vel).unwrap_or(0.0))
    }

    /// Which controls are active
    pub fn joint_state(&self, joint: JointHandle) -> Result<JointState> {
        self.joint(joint).map(|j| {
            JointState::from_flags(
                j.data.limits(FREE_AXIS).is_some(),
                j.data.motor(FREE_AXIS).is_some(),
            )
        })
    }

    /// Driven actor of a joint
    pub fn joint_driven(&self, joint: JointHandle) -> Result<RigidBodyHandle> {
        self.joint(joint).map(|j| RigidBodyHandle(j.body2))
    }
}
