//! Scene composition: builds every level actor, cloth and joint from a layout

use crate::error::{LevelError, LevelResult};
use crate::layout::{ActorLayout, Color, LevelLayout};
use log::{debug, info, warn};
use putt_physics::{
    ClothHandle, JointHandle, PhysicsMaterial, PhysicsWorld, Pose, RevoluteJointDesc,
    RigidBodyDesc, RigidBodyHandle, ShapeDesc,
};
use std::collections::{HashMap, HashSet};

/// Handle to either kind of level actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorHandle {
    Rigid(RigidBodyHandle),
    Cloth(ClothHandle),
}

/// A named actor registered in the world
#[derive(Debug, Clone)]
pub struct SceneActor {
    pub name: String,
    pub handle: ActorHandle,
    pub color: Color,
}

/// Initial pose of one resettable actor
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPose {
    pub name: String,
    pub body: RigidBodyHandle,
    pub pose: Pose,
}

/// Poses of the resettable actors at level load, captured once
#[derive(Debug, Clone, Default)]
pub struct InitialPoseRecord {
    entries: Vec<RecordedPose>,
}

impl InitialPoseRecord {
    fn capture(world: &PhysicsWorld, bodies: &[(String, RigidBodyHandle)]) -> LevelResult<Self> {
        let entries = bodies
            .iter()
            .map(|(name, body)| {
                Ok(RecordedPose {
                    name: name.clone(),
                    body: *body,
                    pose: world.body_pose(*body)?,
                })
            })
            .collect::<LevelResult<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Recorded pose of an actor
    pub fn get(&self, name: &str) -> Option<&RecordedPose> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// All recorded poses, in layout order
    pub fn iter(&self) -> impl Iterator<Item = &RecordedPose> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The composed level: handles to everything the layout created
#[derive(Debug)]
pub struct Scene {
    actors: Vec<SceneActor>,
    joints: Vec<(String, JointHandle)>,
    materials: HashMap<String, PhysicsMaterial>,
    record: InitialPoseRecord,
}

impl Scene {
    /// Build the whole layout into `world` and record the initial poses.
    ///
    /// Actors are registered in layout order, then cloths, then joints. On
    /// error everything created so far is removed from `world` again.
    pub fn compose(world: &mut PhysicsWorld, layout: &LevelLayout) -> LevelResult<Self> {
        let mut seen = HashSet::new();
        let names = layout
            .actors
            .iter()
            .map(|a| &a.name)
            .chain(layout.cloths.iter().map(|c| &c.name));
        for name in names {
            if !seen.insert(name.as_str()) {
                return Err(LevelError::DuplicateActor(name.clone()));
            }
        }

        let materials: HashMap<_, _> = layout
            .materials
            .iter()
            .map(|m| (m.name.clone(), m.material))
            .collect();

        let mut scene = Self {
            actors: Vec::with_capacity(layout.actors.len() + layout.cloths.len()),
            joints: Vec::with_capacity(layout.joints.len()),
            materials,
            record: InitialPoseRecord::default(),
        };

        if let Err(err) = scene.populate(world, layout) {
            scene.teardown(world);
            return Err(err);
        }

        info!(
            "Level composed: {} actors, {} joints, {} poses recorded",
            scene.actors.len(),
            scene.joints.len(),
            scene.record.len()
        );
        Ok(scene)
    }

    fn populate(&mut self, world: &mut PhysicsWorld, layout: &LevelLayout) -> LevelResult<()> {
        for (index, actor) in layout.actors.iter().enumerate() {
            let material = match &actor.material {
                Some(name) => *self.material(name)?,
                None => layout.default_material,
            };
            let body = spawn_actor(world, actor, index, &material)?;
            self.actors.push(SceneActor {
                name: actor.name.clone(),
                handle: ActorHandle::Rigid(body),
                color: actor.color,
            });
        }

        for cloth in &layout.cloths {
            let handle = world.create_cloth(&cloth.cloth)?;
            self.actors.push(SceneActor {
                name: cloth.name.clone(),
                handle: ActorHandle::Cloth(handle),
                color: cloth.color,
            });
            if let Some(pose) = cloth.placement {
                world.set_cloth_pose(handle, pose)?;
            }
        }

        for joint in &layout.joints {
            let driver = joint
                .driver
                .as_deref()
                .map(|name| self.body(name))
                .transpose()?;
            let driven = self.body(&joint.driven)?;

            let handle = world.create_revolute_joint(
                driver,
                Some(driven),
                RevoluteJointDesc::new(joint.driver_frame, joint.driven_frame),
            )?;
            if let Some([lower, upper]) = joint.limits {
                world.set_joint_limits(handle, lower, upper)?;
            }
            if let Some(velocity) = joint.drive_velocity {
                world.set_joint_drive_velocity(handle, velocity)?;
            }
            self.joints.push((joint.name.clone(), handle));
        }

        let resettable = layout
            .resettable
            .iter()
            .map(|name| Ok((name.clone(), self.body(name)?)))
            .collect::<LevelResult<Vec<_>>>()?;
        self.record = InitialPoseRecord::capture(world, &resettable)?;
        Ok(())
    }

    /// Remove every actor this scene created; joints go with their bodies
    fn teardown(&mut self, world: &mut PhysicsWorld) {
        for actor in self.actors.drain(..) {
            let removed = match actor.handle {
                ActorHandle::Rigid(body) => world.remove_rigid_body(body),
                ActorHandle::Cloth(cloth) => world.remove_cloth(cloth),
            };
            if let Err(err) = removed {
                warn!("Failed to remove {} during rollback: {err}", actor.name);
            }
        }
        self.joints.clear();
        debug!("Scene rolled back");
    }

    /// Registered actors, rigid ones first
    pub fn actors(&self) -> &[SceneActor] {
        &self.actors
    }

    fn actor(&self, name: &str) -> LevelResult<&SceneActor> {
        self.actors
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| LevelError::UnknownActor(name.to_string()))
    }

    /// Rigid body of a named actor
    pub fn body(&self, name: &str) -> LevelResult<RigidBodyHandle> {
        match self.actor(name)?.handle {
            ActorHandle::Rigid(body) => Ok(body),
            ActorHandle::Cloth(_) => Err(LevelError::UnknownActor(name.to_string())),
        }
    }

    /// Cloth of a named actor
    pub fn cloth(&self, name: &str) -> LevelResult<ClothHandle> {
        match self.actor(name)?.handle {
            ActorHandle::Cloth(cloth) => Ok(cloth),
            ActorHandle::Rigid(_) => Err(LevelError::UnknownActor(name.to_string())),
        }
    }

    /// Name of the actor owning a rigid body
    pub fn name_of(&self, body: RigidBodyHandle) -> Option<&str> {
        self.actors
            .iter()
            .find(|a| a.handle == ActorHandle::Rigid(body))
            .map(|a| a.name.as_str())
    }

    /// Named joint
    pub fn joint(&self, name: &str) -> LevelResult<JointHandle> {
        self.joints
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, handle)| *handle)
            .ok_or_else(|| LevelError::UnknownJoint(name.to_string()))
    }

    /// Named material
    pub fn material(&self, name: &str) -> LevelResult<&PhysicsMaterial> {
        self.materials
            .get(name)
            .ok_or_else(|| LevelError::UnknownMaterial(name.to_string()))
    }

    /// Initial poses of the resettable actors
    pub fn record(&self) -> &InitialPoseRecord {
        &self.record
    }
}

fn spawn_actor(
    world: &mut PhysicsWorld,
    actor: &ActorLayout,
    index: usize,
    material: &PhysicsMaterial,
) -> LevelResult<RigidBodyHandle> {
    let desc = RigidBodyDesc::new(actor.kind, actor.pose)
        .with_gravity(actor.gravity_enabled)
        .with_simulation(actor.simulation_enabled)
        .with_linear_damping(actor.linear_damping)
        .with_user_data(index as u128);
    let body = world.create_rigid_body(desc);

    for shape in &actor.shapes {
        let shape = ShapeDesc::new(shape.geometry)
            .with_local_pose(shape.local_pose)
            .with_density(shape.density)
            .with_material(*material)
            .with_touch_reports(actor.report_touches);
        if let Err(err) = world.add_shape(body, shape) {
            // Leave no half-built actor behind
            let _ = world.remove_rigid_body(body);
            return Err(err.into());
        }
    }

    debug!("Spawned {} with {} shapes", actor.name, actor.shapes.len());
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{names, ShapeLayout};
    use putt_physics::{ActorKind, Geometry, PhysicsError};

    fn compose_minigolf() -> (PhysicsWorld, Scene) {
        let mut world = PhysicsWorld::default();
        let scene = Scene::compose(&mut world, &LevelLayout::minigolf()).unwrap();
        (world, scene)
    }

    #[test]
    fn test_compose_counts() {
        let (world, scene) = compose_minigolf();
        assert_eq!(scene.actors().len(), 12);
        // 11 rigid actors, no world anchor needed
        assert_eq!(world.body_count(), 11);
        assert_eq!(world.joint_count(), 2);
        assert_eq!(world.cloth_count(), 1);
        assert_eq!(world.collider_count(), 5 + 1 + 1 + 3 + 3 + 1 + 1 + 6 + 4 + 1 + 1);
    }

    #[test]
    fn test_record_matches_layout() {
        let layout = LevelLayout::minigolf();
        let (_, scene) = compose_minigolf();

        assert_eq!(scene.record().len(), layout.resettable.len());
        let ball = scene.record().get(names::BALL).unwrap();
        assert_eq!(ball.pose, layout.actor(names::BALL).unwrap().pose);
        assert_eq!(ball.body, scene.body(names::BALL).unwrap());
    }

    #[test]
    fn test_joint_controls_applied() {
        let (world, scene) = compose_minigolf();

        let sail = scene.joint(names::SAIL_JOINT).unwrap();
        assert_eq!(world.joint_drive_velocity(sail).unwrap(), 1.0);
        assert_eq!(world.joint_limits(sail).unwrap(), None);

        let club = scene.joint(names::CLUB_JOINT).unwrap();
        assert_eq!(world.joint_drive_velocity(club).unwrap(), 0.0);
        assert!(world.joint_limits(club).unwrap().is_some());
    }

    #[test]
    fn test_flag_placed() {
        let (world, scene) = compose_minigolf();
        let flag = world.cloth(scene.cloth(names::FLAG).unwrap()).unwrap();

        assert_eq!(flag.particles().len(), 441);
        assert_eq!(flag.particles().iter().filter(|p| p.is_pinned()).count(), 21);
        assert_eq!(flag.pose().position, [0.0, 10.0, 50.0]);
    }

    #[test]
    fn test_lookups() {
        let (_, scene) = compose_minigolf();
        let ball = scene.body(names::BALL).unwrap();

        assert_eq!(scene.name_of(ball), Some(names::BALL));
        assert!(matches!(scene.body("nope"), Err(LevelError::UnknownActor(_))));
        assert!(matches!(scene.body(names::FLAG), Err(LevelError::UnknownActor(_))));
        assert!(matches!(scene.joint("nope"), Err(LevelError::UnknownJoint(_))));
        assert!(scene.material(names::CONCRETE).is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut layout = LevelLayout::minigolf();
        let copy = layout.actors[0].clone();
        layout.actors.push(copy);

        let mut world = PhysicsWorld::default();
        let result = Scene::compose(&mut world, &layout);
        assert!(matches!(result, Err(LevelError::DuplicateActor(_))));
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_unknown_material_rejected() {
        let mut layout = LevelLayout::minigolf();
        layout.actors[0].material = Some("ice".to_string());

        let mut world = PhysicsWorld::default();
        assert!(matches!(
            Scene::compose(&mut world, &layout),
            Err(LevelError::UnknownMaterial(_))
        ));
    }

    #[test]
    fn test_failed_compose_leaves_world_empty() {
        let mut layout = LevelLayout::minigolf();
        layout.joints[1].driven = "missing".to_string();

        let mut world = PhysicsWorld::default();
        assert!(matches!(
            Scene::compose(&mut world, &layout),
            Err(LevelError::UnknownActor(_))
        ));
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
        assert_eq!(world.joint_count(), 0);
        assert_eq!(world.cloth_count(), 0);

        // The same world composes cleanly afterwards
        let scene = Scene::compose(&mut world, &LevelLayout::minigolf()).unwrap();
        assert_eq!(world.body_count(), 11);
        assert_eq!(scene.actors().len(), 12);
    }

    #[test]
    fn test_invalid_shape_surfaces_physics_error() {
        let mut layout = LevelLayout::minigolf();
        layout.actors.push(
            ActorLayout::new("broken", ActorKind::Static, Pose::IDENTITY)
                .with_shape(ShapeLayout::centered(Geometry::sphere(-1.0))),
        );

        let mut world = PhysicsWorld::default();
        assert!(matches!(
            Scene::compose(&mut world, &layout),
            Err(LevelError::Physics(PhysicsError::InvalidGeometry(_)))
        ));
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
    }
}
