//! Rigid transforms in a serde-friendly form

use rapier3d::na::{Quaternion, Translation3, Unit, UnitQuaternion, Vector3};
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Position plus orientation (quaternion: x, y, z, w)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };

    /// Pure translation
    pub const fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Translation plus a rotation of `angle` radians about `axis`.
    ///
    /// A zero axis yields no rotation.
    pub fn from_axis_angle(position: [f32; 3], angle: f32, axis: [f32; 3]) -> Self {
        let axis = Vector3::new(axis[0], axis[1], axis[2]);
        let rotation = match Unit::try_new(axis, f32::EPSILON) {
            Some(axis) => UnitQuaternion::from_axis_angle(&axis, angle),
            None => UnitQuaternion::identity(),
        };
        Self {
            position,
            rotation: [rotation.i, rotation.j, rotation.k, rotation.w],
        }
    }

    /// Same pose moved by `delta`
    pub fn translated(mut self, delta: [f32; 3]) -> Self {
        self.position[0] += delta[0];
        self.position[1] += delta[1];
        self.position[2] += delta[2];
        self
    }

    /// Straight-line distance between the two positions
    pub fn distance_to(&self, other: &Pose) -> f32 {
        let dx = self.position[0] - other.position[0];
        let dy = self.position[1] - other.position[1];
        let dz = self.position[2] - other.position[2];
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Convert to a rapier isometry.
    ///
    /// The quaternion is taken as-is (no renormalisation) so a pose read from
    /// a body converts back to exactly the same isometry.
    pub fn to_isometry(&self) -> rapier::Isometry<f32> {
        let [x, y, z, w] = self.rotation;
        rapier::Isometry::from_parts(
            Translation3::new(self.position[0], self.position[1], self.position[2]),
            UnitQuaternion::new_unchecked(Quaternion::new(w, x, y, z)),
        )
    }

    /// Convert from a rapier isometry
    pub fn from_isometry(iso: &rapier::Isometry<f32>) -> Self {
        let t = iso.translation.vector;
        let r = iso.rotation;
        Self {
            position: [t.x, t.y, t.z],
            rotation: [r.i, r.j, r.k, r.w],
        }
    }

    /// Transform a point from this pose's local frame into the parent frame
    pub fn transform_point(&self, point: [f32; 3]) -> [f32; 3] {
        let p = self.to_isometry() * rapier::Point::new(point[0], point[1], point[2]);
        [p.x, p.y, p.z]
    }

    /// Transform a point from the parent frame into this pose's local frame
    pub fn inverse_transform_point(&self, point: [f32; 3]) -> [f32; 3] {
        let p = self
            .to_isometry()
            .inverse_transform_point(&rapier::Point::new(point[0], point[1], point[2]));
        [p.x, p.y, p.z]
    }
}
