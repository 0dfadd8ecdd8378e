//! Physics world - main simulation container

use crate::body::{ActorKind, RigidBodyDesc, RigidBodyHandle};
use crate::cloth::{Cloth, ClothHandle};
use crate::collider::{ColliderHandle, ShapeDesc};
use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::events::{EventCollector, TouchEvent, TouchKind};
use crate::material::PhysicsMaterial;
use crate::pose::Pose;
use log::{debug, warn};
use rapier3d::prelude as rapier;
use slotmap::SlotMap;
use std::num::NonZeroUsize;

/// The main physics world containing all simulation state
///
/// Every mutation goes through `&mut self`, so stepping and actuation can
/// never interleave.
pub struct PhysicsWorld {
    /// Configuration
    config: PhysicsConfig,

    /// Rapier physics pipeline
    pipeline: rapier::PhysicsPipeline,

    /// Gravity
    gravity: rapier::Vector<f32>,

    /// Integration parameters
    integration_params: rapier::IntegrationParameters,

    /// Island manager
    pub(crate) islands: rapier::IslandManager,

    /// Broad phase
    broad_phase: rapier::DefaultBroadPhase,

    /// Narrow phase
    narrow_phase: rapier::NarrowPhase,

    /// Impulse joint set
    pub(crate) impulse_joints: rapier::ImpulseJointSet,

    /// Multibody joint set
    pub(crate) multibody_joints: rapier::MultibodyJointSet,

    /// CCD solver
    ccd_solver: rapier::CCDSolver,

    /// Rigid body set
    pub(crate) bodies: rapier::RigidBodySet,

    /// Collider set
    pub(crate) colliders: rapier::ColliderSet,

    /// Cloth actors, owning their particle and quad buffers
    pub(crate) cloths: SlotMap<ClothHandle, Cloth>,

    /// Fixed body standing in for the world frame in driver-less joints
    pub(crate) world_anchor: Option<rapier::RigidBodyHandle>,

    /// Event collector
    events: EventCollector,

    /// Material for shapes created without one
    default_material: PhysicsMaterial,

    /// Accumulated time for fixed timestep
    accumulated_time: f32,
}

impl PhysicsWorld {
    /// Create a new physics world
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PhysicsConfig) -> Self {
        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1], config.gravity[2]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        integration_params.num_solver_iterations =
            NonZeroUsize::new(config.velocity_iterations).unwrap_or(NonZeroUsize::MIN);

        let default_material = PhysicsMaterial::new(
            config.default_friction,
            config.default_friction,
            config.default_restitution,
        );

        debug!(
            "Physics world created (dt = {}, max substeps = {})",
            config.timestep, config.max_substeps
        );

        Self {
            config,
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            cloths: SlotMap::with_key(),
            world_anchor: None,
            events: EventCollector::new(),
            default_material,
            accumulated_time: 0.0,
        }
    }

    /// Get the physics configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Set gravity
    pub fn set_gravity(&mut self, x: f32, y: f32, z: f32) {
        self.gravity = rapier::Vector::new(x, y, z);
    }

    /// Get gravity
    pub fn gravity(&self) -> [f32; 3] {
        [self.gravity.x, self.gravity.y, self.gravity.z]
    }

    // ==================== Actors ====================

    /// Create a bare actor of the given kind; shapes are added afterwards
    pub fn create_actor(&mut self, kind: ActorKind, pose: Pose) -> RigidBodyHandle {
        self.create_rigid_body(RigidBodyDesc::new(kind, pose))
    }

    /// Create a rigid body
    pub fn create_rigid_body(&mut self, desc: RigidBodyDesc) -> RigidBodyHandle {
        let mut builder = desc.to_rapier_builder();
        if !self.config.sleeping_enabled {
            builder = builder.can_sleep(false);
        }
        if self.config.ccd_enabled && desc.kind == ActorKind::Dynamic {
            builder = builder.ccd_enabled(true);
        }
        let handle = RigidBodyHandle(self.bodies.insert(builder));
        debug!("Created {:?} actor {:?}", desc.kind, handle);
        handle
    }

    /// Remove a rigid body together with its shapes and joints
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) -> Result<()> {
        self.bodies
            .remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true, // Remove attached colliders
            )
            .map(|_| ())
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    pub(crate) fn body(&self, handle: RigidBodyHandle) -> Result<&rapier::RigidBody> {
        self.bodies
            .get(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    pub(crate) fn body_mut(&mut self, handle: RigidBodyHandle) -> Result<&mut rapier::RigidBody> {
        self.bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Get the global pose
    pub fn body_pose(&self, handle: RigidBodyHandle) -> Result<Pose> {
        self.body(handle).map(|b| Pose::from_isometry(b.position()))
    }

    /// Get the global position
    pub fn body_position(&self, handle: RigidBodyHandle) -> Result<[f32; 3]> {
        self.body_pose(handle).map(|p| p.position)
    }

    /// Teleport a body to a global pose, waking it
    pub fn set_body_pose(&mut self, handle: RigidBodyHandle, pose: Pose) -> Result<()> {
        let body = self.body_mut(handle)?;
        body.set_position(pose.to_isometry(), true);
        Ok(())
    }

    /// Move a body by `delta`, keeping its rotation.
    ///
    /// Kinematic bodies travel to the target over the next step so they push
    /// what they touch; other bodies are teleported.
    pub fn translate_body(&mut self, handle: RigidBodyHandle, delta: [f32; 3]) -> Result<()> {
        let body = self.body_mut(handle)?;
        if body.is_kinematic() {
            let target = Pose::from_isometry(body.next_position()).translated(delta);
            body.set_next_kinematic_position(target.to_isometry());
        } else {
            let target = Pose::from_isometry(body.position()).translated(delta);
            body.set_position(target.to_isometry(), true);
        }
        Ok(())
    }

    /// Get rigid body linear velocity
    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Result<[f32; 3]> {
        self.body(handle).map(|b| {
            let vel = b.linvel();
            [vel.x, vel.y, vel.z]
        })
    }

    /// Set rigid body linear velocity
    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: [f32; 3]) -> Result<()> {
        let body = self.body_mut(handle)?;
        body.set_linvel(rapier::Vector::new(velocity[0], velocity[1], velocity[2]), true);
        Ok(())
    }

    /// Get rigid body angular velocity
    pub fn angular_velocity(&self, handle: RigidBodyHandle) -> Result<[f32; 3]> {
        self.body(handle).map(|b| {
            let vel = b.angvel();
            [vel.x, vel.y, vel.z]
        })
    }

    /// Set rigid body angular velocity
    pub fn set_angular_velocity(&mut self, handle: RigidBodyHandle, velocity: [f32; 3]) -> Result<()> {
        let body = self.body_mut(handle)?;
        body.set_angvel(rapier::Vector::new(velocity[0], velocity[1], velocity[2]), true);
        Ok(())
    }

    /// Apply a force for the duration of one fixed step
    pub fn apply_force(&mut self, handle: RigidBodyHandle, force: [f32; 3]) -> Result<()> {
        let dt = self.config.timestep;
        self.apply_impulse(handle, [force[0] * dt, force[1] * dt, force[2] * dt])
    }

    /// Apply an impulse to a rigid body
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: [f32; 3]) -> Result<()> {
        let body = self.body_mut(handle)?;
        body.apply_impulse(rapier::Vector::new(impulse[0], impulse[1], impulse[2]), true);
        Ok(())
    }

    /// Check whether a body is asleep
    pub fn is_sleeping(&self, handle: RigidBodyHandle) -> Result<bool> {
        self.body(handle).map(|b| b.is_sleeping())
    }

    /// Put a body to sleep
    pub fn sleep_body(&mut self, handle: RigidBodyHandle) -> Result<()> {
        self.body_mut(handle)?.sleep();
        Ok(())
    }

    /// Mass computed from the body's shapes
    pub fn body_mass(&self, handle: RigidBodyHandle) -> Result<f32> {
        self.body(handle).map(|b| b.mass())
    }

    // ==================== Shapes ====================

    /// Attach a shape to an actor.
    ///
    /// Dynamic actors get their mass and inertia recomputed from all of
    /// their shapes.
    pub fn add_shape(&mut self, body: RigidBodyHandle, desc: ShapeDesc) -> Result<ColliderHandle> {
        desc.validate()?;
        if !self.bodies.contains(body.0) {
            return Err(PhysicsError::BodyNotFound(body));
        }

        let builder = desc.to_rapier_builder(&self.default_material);
        let handle = self
            .colliders
            .insert_with_parent(builder, body.0, &mut self.bodies);

        if let Some(rb) = self.bodies.get_mut(body.0) {
            if rb.is_dynamic() {
                rb.recompute_mass_properties_from_colliders(&self.colliders);
            }
        }

        Ok(ColliderHandle(handle))
    }

    /// Number of shapes attached to an actor
    pub fn shape_count(&self, body: RigidBodyHandle) -> Result<usize> {
        self.body(body).map(|b| b.colliders().len())
    }

    fn shape_at(&self, body: RigidBodyHandle, index: usize) -> Result<rapier::ColliderHandle> {
        let colliders = self.body(body)?.colliders();
        colliders
            .get(index)
            .copied()
            .ok_or(PhysicsError::ShapeIndexOutOfRange {
                index,
                count: colliders.len(),
            })
    }

    /// Set a shape's pose relative to its actor
    pub fn set_shape_local_pose(&mut self, body: RigidBodyHandle, index: usize, pose: Pose) -> Result<()> {
        let handle = self.shape_at(body, index)?;
        let collider = self
            .colliders
            .get_mut(handle)
            .ok_or(PhysicsError::ColliderNotFound(ColliderHandle(handle)))?;
        collider.set_position_wrt_parent(pose.to_isometry());

        if let Some(rb) = self.bodies.get_mut(body.0) {
            if rb.is_dynamic() {
                rb.recompute_mass_properties_from_colliders(&self.colliders);
            }
        }
        Ok(())
    }

    /// Get a shape's pose relative to its actor
    pub fn shape_local_pose(&self, body: RigidBodyHandle, index: usize) -> Result<Pose> {
        let handle = self.shape_at(body, index)?;
        self.colliders
            .get(handle)
            .and_then(|c| c.position_wrt_parent())
            .map(Pose::from_isometry)
            .ok_or(PhysicsError::ColliderNotFound(ColliderHandle(handle)))
    }

    // ==================== Simulation ====================

    /// Advance the simulation by `delta_time` using fixed substeps.
    ///
    /// Returns the number of fixed steps taken. Touch events from all of them
    /// are available through [`PhysicsWorld::touch_events`] until the next call.
    /// A negative or non-finite `delta_time` takes no steps and leaves the
    /// accumulator untouched.
    pub fn step(&mut self, delta_time: f32) -> u32 {
        self.events.clear();
        if !delta_time.is_finite() || delta_time < 0.0 {
            warn!("Ignoring invalid frame time {delta_time}");
            return 0;
        }
        self.accumulated_time += delta_time;

        let mut steps = 0;
        while self.accumulated_time >= self.config.timestep && steps < self.config.max_substeps {
            self.step_internal();
            self.accumulated_time -= self.config.timestep;
            steps += 1;
        }

        // Drop the backlog rather than spiral when the host falls behind
        if steps == self.config.max_substeps && self.accumulated_time >= self.config.timestep {
            debug!("Dropping {:.4}s of simulation backlog", self.accumulated_time);
            self.accumulated_time = 0.0;
        }

        steps
    }

    /// Internal fixed timestep
    fn step_internal(&mut self) {
        let (collision_send, collision_recv) = crossbeam_channel::unbounded();
        let event_handler = ChannelEventCollector {
            collision_events: collision_send,
        };

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &event_handler,
        );

        let gravity = self.gravity();
        let dt = self.config.timestep;
        for cloth in self.cloths.values_mut() {
            cloth.simulate(dt, gravity, &self.config.cloth);
        }

        while let Ok(event) = collision_recv.try_recv() {
            let (h1, h2, kind) = match event {
                rapier::CollisionEvent::Started(h1, h2, _) => (h1, h2, TouchKind::Found),
                rapier::CollisionEvent::Stopped(h1, h2, _) => (h1, h2, TouchKind::Lost),
            };

            let c1 = self.colliders.get(h1);
            let c2 = self.colliders.get(h2);

            self.events.touch_events.push(TouchEvent {
                collider1: ColliderHandle(h1),
                collider2: ColliderHandle(h2),
                body1: c1.and_then(|c| c.parent()).map(RigidBodyHandle),
                body2: c2.and_then(|c| c.parent()).map(RigidBodyHandle),
                kind,
            });
        }
    }

    // ==================== Events ====================

    /// Touch events from the last `step`, in the order the solver found them
    pub fn touch_events(&self) -> &[TouchEvent] {
        &self.events.touch_events
    }

    /// Contact start events from the last step
    pub fn contacts_found(&self) -> impl Iterator<Item = &TouchEvent> {
        self.events.contacts_found()
    }

    /// Contact end events from the last step
    pub fn contacts_lost(&self) -> impl Iterator<Item = &TouchEvent> {
        self.events.contacts_lost()
    }

    // ==================== Debug ====================

    /// Get number of rigid bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Get number of colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Get number of joints
    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    /// Get number of cloth actors
    pub fn cloth_count(&self) -> usize {
        self.cloths.len()
    }
}

/// Channel-based event collector for Rapier
struct ChannelEventCollector {
    collision_events: crossbeam_channel::Sender<rapier::CollisionEvent>,
}

impl rapier::EventHandler for ChannelEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        event: rapier::CollisionEvent,
        _contact_pair: Option<&rapier::ContactPair>,
    ) {
        let _ = self.collision_events.send(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        _contact_pair: &rapier::ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::build(PhysicsConfig::default())
    }
}
