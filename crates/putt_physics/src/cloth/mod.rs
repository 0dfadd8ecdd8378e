//! Cloth actors
//!
//! Rapier has no cloth, so cloth actors are simulated here with a small
//! position-based solver: Verlet integration followed by repeated projection
//! of the fabric's distance constraints, weighted by inverse mass. Cloth
//! particles do not collide with rigid shapes.
//!
//! A cloth actor owns its particle and quad buffers; removing the actor (or
//! dropping the world) frees them.

pub mod fabric;
pub mod mesh;

pub use fabric::{ClothFabric, DistanceConstraint, FabricPhase, PhaseKind};
pub use mesh::{ClothMesh, ClothParticle};

use crate::config::ClothSettings;
use crate::error::{PhysicsError, Result};
use crate::pose::Pose;
use crate::world::PhysicsWorld;
use log::debug;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Handle to a cloth actor in the physics world
    pub struct ClothHandle;
}

/// Description for creating a cloth actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClothDesc {
    /// Global pose of the cloth frame
    #[serde(default)]
    pub pose: Pose,
    /// Width and height in metres
    pub size: [f32; 2],
    /// Columns and rows
    pub resolution: [u32; 2],
    /// Pin the first row of particles to the cloth frame
    #[serde(default)]
    pub pin_top_row: bool,
    /// Gravity direction in the cloth's local frame, used for cooking
    #[serde(default = "default_gravity_axis")]
    pub gravity_axis: [f32; 3],
    /// Acceleration added to gravity for every free particle (wind)
    #[serde(default)]
    pub external_acceleration: [f32; 3],
}

fn default_gravity_axis() -> [f32; 3] {
    [0.0, -1.0, 0.0]
}

impl ClothDesc {
    /// Create a cloth description at the origin
    pub fn new(size: [f32; 2], resolution: [u32; 2]) -> Self {
        Self {
            pose: Pose::IDENTITY,
            size,
            resolution,
            pin_top_row: false,
            gravity_axis: default_gravity_axis(),
            external_acceleration: [0.0; 3],
        }
    }

    /// Set the global pose
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Pin the top row
    pub fn with_pinned_top_row(mut self, pin: bool) -> Self {
        self.pin_top_row = pin;
        self
    }

    /// Set the external acceleration
    pub fn with_external_acceleration(mut self, acceleration: [f32; 3]) -> Self {
        self.external_acceleration = acceleration;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.size.iter().all(|s| s.is_finite() && *s > 0.0) {
            Ok(())
        } else {
            Err(PhysicsError::InvalidGeometry(format!(
                "cloth size must be positive, got {:?}",
                self.size
            )))
        }
    }
}

/// A simulated cloth actor
#[derive(Debug, Clone)]
pub struct Cloth {
    pose: Pose,
    /// Particles in world space
    particles: Vec<ClothParticle>,
    previous: Vec<[f32; 3]>,
    quads: Vec<[u32; 4]>,
    fabric: ClothFabric,
    external_acceleration: [f32; 3],
}

impl Cloth {
    fn new(pose: Pose, mesh: ClothMesh, fabric: ClothFabric, external_acceleration: [f32; 3]) -> Result<Self> {
        if fabric.particle_count() != mesh.particle_count() {
            return Err(PhysicsError::InvalidGeometry(format!(
                "fabric cooked for {} particles, mesh has {}",
                fabric.particle_count(),
                mesh.particle_count()
            )));
        }

        let (mut particles, quads) = mesh.into_parts();
        for particle in &mut particles {
            particle.position = pose.transform_point(particle.position);
        }
        let previous = particles.iter().map(|p| p.position).collect();

        Ok(Self {
            pose,
            particles,
            previous,
            quads,
            fabric,
            external_acceleration,
        })
    }

    /// Global pose of the cloth frame
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Particles in world space
    pub fn particles(&self) -> &[ClothParticle] {
        &self.particles
    }

    /// Quad topology
    pub fn quads(&self) -> &[[u32; 4]] {
        &self.quads
    }

    /// Cooked fabric
    pub fn fabric(&self) -> &ClothFabric {
        &self.fabric
    }

    /// Acceleration added to gravity
    pub fn external_acceleration(&self) -> [f32; 3] {
        self.external_acceleration
    }

    /// Mean particle position
    pub fn centroid(&self) -> [f32; 3] {
        let n = self.particles.len().max(1) as f32;
        let mut sum = [0.0; 3];
        for p in &self.particles {
            for k in 0..3 {
                sum[k] += p.position[k];
            }
        }
        [sum[0] / n, sum[1] / n, sum[2] / n]
    }

    /// Move the cloth frame, carrying every particle with it
    fn set_pose(&mut self, pose: Pose) {
        let old = self.pose;
        let carry = |p: [f32; 3]| pose.transform_point(old.inverse_transform_point(p));
        for (particle, previous) in self.particles.iter_mut().zip(self.previous.iter_mut()) {
            particle.position = carry(particle.position);
            *previous = carry(*previous);
        }
        self.pose = pose;
    }

    /// Advance by one fixed step
    pub(crate) fn simulate(&mut self, dt: f32, gravity: [f32; 3], settings: &ClothSettings) {
        let substeps = settings.substeps.max(1);
        let h = dt / substeps as f32;
        let keep = 1.0 - settings.damping;
        let accel = [
            (gravity[0] + self.external_acceleration[0]) * h * h,
            (gravity[1] + self.external_acceleration[1]) * h * h,
            (gravity[2] + self.external_acceleration[2]) * h * h,
        ];

        for _ in 0..substeps {
            for (particle, previous) in self.particles.iter_mut().zip(self.previous.iter_mut()) {
                let current = particle.position;
                if !particle.is_pinned() {
                    for k in 0..3 {
                        particle.position[k] += (current[k] - previous[k]) * keep + accel[k];
                    }
                }
                *previous = current;
            }

            for _ in 0..settings.iterations {
                for phase in self.fabric.phases() {
                    let stiffness = phase.kind.stiffness(settings);
                    if stiffness <= 0.0 {
                        continue;
                    }
                    for constraint in &phase.constraints {
                        project(&mut self.particles, constraint, stiffness);
                    }
                }
            }
        }
    }
}

fn project(particles: &mut [ClothParticle], c: &DistanceConstraint, stiffness: f32) {
    let (a, b) = (c.a as usize, c.b as usize);
    let wa = particles[a].inv_mass;
    let wb = particles[b].inv_mass;
    let w = wa + wb;
    if w == 0.0 {
        return;
    }

    let pa = particles[a].position;
    let pb = particles[b].position;
    let d = [pb[0] - pa[0], pb[1] - pa[1], pb[2] - pa[2]];
    let len = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
    if len <= f32::EPSILON {
        return;
    }

    let scale = stiffness * (len - c.rest_length) / (len * w);
    for k in 0..3 {
        particles[a].position[k] += d[k] * scale * wa;
        particles[b].position[k] -= d[k] * scale * wb;
    }
}

impl PhysicsWorld {
    /// Build, cook and insert a cloth actor
    pub fn create_cloth(&mut self, desc: &ClothDesc) -> Result<ClothHandle> {
        desc.validate()?;
        let mesh = ClothMesh::grid(desc.size, desc.resolution, desc.pin_top_row);
        let fabric = ClothFabric::cook(&mesh, desc.gravity_axis)?;
        self.insert_cloth(desc.pose, mesh, fabric, desc.external_acceleration)
    }

    /// Insert a cloth actor from an already cooked fabric
    pub fn insert_cloth(
        &mut self,
        pose: Pose,
        mesh: ClothMesh,
        fabric: ClothFabric,
        external_acceleration: [f32; 3],
    ) -> Result<ClothHandle> {
        if mesh.is_degenerate() {
            return Err(PhysicsError::DegenerateMesh {
                cols: mesh.cols(),
                rows: mesh.rows(),
            });
        }
        let (particles, pinned) = (mesh.particle_count(), mesh.pinned_count());
        let cloth = Cloth::new(pose, mesh, fabric, external_acceleration)?;
        let handle = self.cloths.insert(cloth);
        debug!(
            "Created cloth {:?} ({} particles, {} pinned)",
            handle, particles, pinned
        );
        Ok(handle)
    }

    /// Remove a cloth actor, freeing its buffers
    pub fn remove_cloth(&mut self, handle: ClothHandle) -> Result<()> {
        self.cloths
            .remove(handle)
            .map(|_| ())
            .ok_or(PhysicsError::ClothNotFound(handle))
    }

    /// Get a cloth actor
    pub fn cloth(&self, handle: ClothHandle) -> Result<&Cloth> {
        self.cloths
            .get(handle)
            .ok_or(PhysicsError::ClothNotFound(handle))
    }

    /// Move a cloth actor's frame
    pub fn set_cloth_pose(&mut self, handle: ClothHandle, pose: Pose) -> Result<()> {
        self.cloths
            .get_mut(handle)
            .ok_or(PhysicsError::ClothNotFound(handle))?
            .set_pose(pose);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn small_flag() -> ClothDesc {
        ClothDesc::new([1.0, 1.0], [4, 4]).with_pinned_top_row(true)
    }

    #[test]
    fn test_create_cloth() {
        let mut world = PhysicsWorld::default();
        let handle = world.create_cloth(&small_flag()).unwrap();

        let cloth = world.cloth(handle).unwrap();
        assert_eq!(cloth.particles().len(), 25);
        assert_eq!(cloth.quads().len(), 16);
        assert_eq!(world.cloth_count(), 1);
    }

    #[test]
    fn test_degenerate_cloth_rejected() {
        let mut world = PhysicsWorld::default();
        let result = world.create_cloth(&ClothDesc::new([1.0, 1.0], [0, 4]));
        assert!(matches!(result, Err(PhysicsError::DegenerateMesh { .. })));
        assert_eq!(world.cloth_count(), 0);
    }

    #[test]
    fn test_invalid_cloth_size() {
        let mut world = PhysicsWorld::default();
        let result = world.create_cloth(&ClothDesc::new([0.0, 1.0], [4, 4]));
        assert!(matches!(result, Err(PhysicsError::InvalidGeometry(_))));
    }

    #[test]
    fn test_pose_applied_to_particles() {
        let mut world = PhysicsWorld::default();
        let pose = Pose::from_axis_angle([0.0, 10.0, 50.0], FRAC_PI_2, [0.0, 0.0, 1.0]);
        let handle = world.create_cloth(&small_flag().with_pose(pose)).unwrap();

        // Local +X maps to world +Y under a quarter turn about Z
        let corner = world.cloth(handle).unwrap().particles()[4].position;
        assert_relative_eq!(corner[0], 0.0, epsilon = 1e-5);
        assert_relative_eq!(corner[1], 11.0, epsilon = 1e-5);
        assert_relative_eq!(corner[2], 50.0, epsilon = 1e-5);
    }

    #[test]
    fn test_pinned_particles_hold_free_particles_fall() {
        let mut world = PhysicsWorld::default();
        let handle = world.create_cloth(&small_flag()).unwrap();
        let before: Vec<_> = world.cloth(handle).unwrap().particles().to_vec();

        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }

        let after = world.cloth(handle).unwrap().particles();
        for (old, new) in before.iter().zip(after) {
            if old.is_pinned() {
                assert_eq!(old.position, new.position);
            }
        }
        let bottom = after.last().unwrap();
        assert!(bottom.position[1] < -0.1, "free edge should hang down, got {:?}", bottom.position);
    }

    #[test]
    fn test_constraints_limit_stretch() {
        let mut world = PhysicsWorld::default();
        let handle = world.create_cloth(&small_flag()).unwrap();

        for _ in 0..120 {
            world.step(1.0 / 60.0);
        }

        // Cloth hangs from the pinned row; total drop stays near its 1 m length
        let bottom = world.cloth(handle).unwrap().particles().last().unwrap().position;
        let top = world.cloth(handle).unwrap().particles()[4].position;
        let hang = ((bottom[1] - top[1]).powi(2) + (bottom[2] - top[2]).powi(2)).sqrt();
        assert!(hang < 2.0, "cloth stretched to {hang}");
    }

    #[test]
    fn test_set_cloth_pose_moves_pins() {
        let mut world = PhysicsWorld::default();
        let handle = world.create_cloth(&small_flag()).unwrap();

        world
            .set_cloth_pose(handle, Pose::from_position(0.0, 0.0, 5.0))
            .unwrap();

        let cloth = world.cloth(handle).unwrap();
        assert_relative_eq!(cloth.particles()[2].position[2], 5.0, epsilon = 1e-5);
        assert_relative_eq!(cloth.particles()[2].position[0], 0.5, epsilon = 1e-5);
        assert_eq!(cloth.pose().position, [0.0, 0.0, 5.0]);
    }

    #[test]
    fn test_remove_cloth() {
        let mut world = PhysicsWorld::default();
        let handle = world.create_cloth(&small_flag()).unwrap();

        world.remove_cloth(handle).unwrap();
        assert_eq!(world.cloth_count(), 0);
        assert!(matches!(world.cloth(handle), Err(PhysicsError::ClothNotFound(_))));
        assert!(matches!(world.remove_cloth(handle), Err(PhysicsError::ClothNotFound(_))));
    }

    #[test]
    fn test_wind_pushes_cloth() {
        let mut world = PhysicsWorld::default();
        let handle = world
            .create_cloth(&small_flag().with_external_acceleration([-10.0, 0.0, 0.0]))
            .unwrap();
        let start = world.cloth(handle).unwrap().centroid();

        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        assert!(world.cloth(handle).unwrap().centroid()[0] < start[0]);
    }
}
