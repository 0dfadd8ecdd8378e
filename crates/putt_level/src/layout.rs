//! Level layout: every actor, joint and cloth of the level as plain data

use putt_physics::{ActorKind, ClothDesc, Geometry, PhysicsMaterial, Pose};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// RGB display colour, components in [0, 1]
pub type Color = [f32; 3];

/// Names of the actors the level logic refers to
pub mod names {
    pub const COURSE: &str = "course";
    pub const COURSE_MIDDLE: &str = "course_middle";
    pub const TEE_BOX: &str = "tee_box";
    pub const BARRIERS: &str = "barriers";
    pub const WINDMILL: &str = "windmill";
    pub const CLUB: &str = "club";
    pub const CLUB_PIVOT: &str = "club_pivot";
    pub const BALL: &str = "ball";
    pub const SAILS: &str = "sails";
    pub const SAIL_PIVOT: &str = "sail_pivot";
    pub const FLAG: &str = "flag";
    pub const FLAG_POLE: &str = "flag_pole";

    pub const CLUB_JOINT: &str = "club_joint";
    pub const SAIL_JOINT: &str = "sail_joint";

    pub const CONCRETE: &str = "concrete";
    pub const ASPHALT: &str = "asphalt";
}

/// A named surface material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialLayout {
    pub name: String,
    pub material: PhysicsMaterial,
}

/// One shape of an actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeLayout {
    pub geometry: Geometry,
    #[serde(default)]
    pub local_pose: Pose,
    #[serde(default = "default_density")]
    pub density: f32,
}

fn default_density() -> f32 {
    1.0
}

fn enabled() -> bool {
    true
}

impl ShapeLayout {
    /// Box shape at a local offset
    pub fn cuboid(half_extents: [f32; 3], offset: [f32; 3]) -> Self {
        Self {
            geometry: Geometry::cuboid(half_extents[0], half_extents[1], half_extents[2]),
            local_pose: Pose::from_position(offset[0], offset[1], offset[2]),
            density: default_density(),
        }
    }

    /// Shape centred on the actor
    pub fn centered(geometry: Geometry) -> Self {
        Self {
            geometry,
            local_pose: Pose::IDENTITY,
            density: default_density(),
        }
    }
}

/// A rigid actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorLayout {
    pub name: String,
    pub kind: ActorKind,
    #[serde(default)]
    pub pose: Pose,
    pub shapes: Vec<ShapeLayout>,
    pub color: Color,
    /// Named material; `None` uses the layout's default material
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default = "enabled")]
    pub gravity_enabled: bool,
    #[serde(default = "enabled")]
    pub simulation_enabled: bool,
    #[serde(default)]
    pub linear_damping: f32,
    /// Report touch found/lost events for this actor's shapes
    #[serde(default)]
    pub report_touches: bool,
}

impl ActorLayout {
    /// Actor with no shapes, default flags and a white colour
    pub fn new(name: &str, kind: ActorKind, pose: Pose) -> Self {
        Self {
            name: name.to_string(),
            kind,
            pose,
            shapes: Vec::new(),
            color: [1.0, 1.0, 1.0],
            material: None,
            gravity_enabled: true,
            simulation_enabled: true,
            linear_damping: 0.0,
            report_touches: false,
        }
    }

    /// Add a shape
    pub fn with_shape(mut self, shape: ShapeLayout) -> Self {
        self.shapes.push(shape);
        self
    }

    /// Set the display colour
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Use a named material
    pub fn with_material(mut self, name: &str) -> Self {
        self.material = Some(name.to_string());
        self
    }

    /// Turn gravity off
    pub fn without_gravity(mut self) -> Self {
        self.gravity_enabled = false;
        self
    }

    /// Take the actor out of the simulation (no motion, no contacts)
    pub fn without_simulation(mut self) -> Self {
        self.simulation_enabled = false;
        self
    }

    /// Set linear damping
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Report touches involving this actor
    pub fn with_touch_reports(mut self) -> Self {
        self.report_touches = true;
        self
    }
}

/// A revolute joint between two named actors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointLayout {
    pub name: String,
    /// Driver actor; `None` anchors the joint to the world
    #[serde(default)]
    pub driver: Option<String>,
    pub driver_frame: Pose,
    pub driven: String,
    pub driven_frame: Pose,
    #[serde(default)]
    pub limits: Option<[f32; 2]>,
    #[serde(default)]
    pub drive_velocity: Option<f32>,
}

/// A cloth actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClothLayout {
    pub name: String,
    pub cloth: ClothDesc,
    /// Pose the cloth is moved to right after creation
    #[serde(default)]
    pub placement: Option<Pose>,
    pub color: Color,
}

/// Axis-aligned goal region below the hole
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalBox {
    pub x_min: f32,
    pub x_max: f32,
    pub y_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

impl GoalBox {
    /// Strict containment test; the box is open towards -Y
    pub fn contains(&self, p: [f32; 3]) -> bool {
        p[1] < self.y_max
            && self.x_min < p[0]
            && p[0] < self.x_max
            && self.z_min < p[2]
            && p[2] < self.z_max
    }
}

/// Complete level description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Material for actors that do not name one
    pub default_material: PhysicsMaterial,
    pub materials: Vec<MaterialLayout>,
    /// Rigid actors in registration order
    pub actors: Vec<ActorLayout>,
    pub joints: Vec<JointLayout>,
    pub cloths: Vec<ClothLayout>,
    pub goal: GoalBox,
    /// Direction of the club swing force
    pub swing_axis: [f32; 3],
    /// Actors whose initial pose is recorded for reset
    pub resettable: Vec<String>,
    /// Actors reported by displacement telemetry
    pub telemetry: Vec<String>,
}

impl LevelLayout {
    /// Look up an actor by name
    pub fn actor(&self, name: &str) -> Option<&ActorLayout> {
        self.actors.iter().find(|a| a.name == name)
    }

    /// Look up a material by name
    pub fn material(&self, name: &str) -> Option<&PhysicsMaterial> {
        self.materials
            .iter()
            .find(|m| m.name == name)
            .map(|m| &m.material)
    }

    /// The built-in mini-golf level
    pub fn minigolf() -> Self {
        use names::*;

        let rot_x = |position: [f32; 3]| Pose::from_axis_angle(position, PI / 2.0, [1.0, 0.0, 0.0]);
        let rot_y = |position: [f32; 3]| Pose::from_axis_angle(position, PI / 2.0, [0.0, 1.0, 0.0]);
        let rot_z = |position: [f32; 3]| Pose::from_axis_angle(position, PI / 2.0, [0.0, 0.0, 1.0]);

        let course = ActorLayout::new(COURSE, ActorKind::Static, Pose::IDENTITY)
            .with_shape(ShapeLayout::cuboid([5.0, 0.1, 10.0], [0.0, 0.0, 35.0]))
            // Hole left, right, front, back
            .with_shape(ShapeLayout::cuboid([2.125, 0.1, 5.0], [-2.875, 0.0, 50.0]))
            .with_shape(ShapeLayout::cuboid([2.125, 0.1, 5.0], [2.875, 0.0, 50.0]))
            .with_shape(ShapeLayout::cuboid([0.75, 0.1, 2.125], [0.0, 0.0, 47.125]))
            .with_shape(ShapeLayout::cuboid([0.75, 0.1, 2.125], [0.0, 0.0, 52.875]))
            .with_material(CONCRETE)
            .with_color([0.5, 0.5, 0.5]);

        let course_middle = ActorLayout::new(COURSE_MIDDLE, ActorKind::Static, Pose::IDENTITY)
            .with_shape(ShapeLayout::cuboid([5.0, 0.1, 10.0], [0.0, 0.0, 15.0]))
            .with_material(ASPHALT)
            .with_color([0.0, 0.0, 0.0]);

        let tee_box = ActorLayout::new(TEE_BOX, ActorKind::Static, Pose::IDENTITY)
            .with_shape(ShapeLayout::cuboid([5.0, 0.1, 5.0], [0.0, 0.0, 0.0]))
            .with_color([1.0, 0.75, 0.75]);

        let barriers = ActorLayout::new(BARRIERS, ActorKind::Static, Pose::IDENTITY)
            .with_shape(ShapeLayout::cuboid([5.0, 0.5, 0.1], [0.0, 0.5, 55.0]))
            .with_shape(ShapeLayout::cuboid([0.1, 0.5, 25.0], [5.0, 0.5, 30.0]))
            .with_shape(ShapeLayout::cuboid([0.1, 0.5, 25.0], [-5.0, 0.5, 30.0]))
            .with_color([0.75, 0.75, 1.0]);

        let club = ActorLayout::new(CLUB, ActorKind::Dynamic, Pose::IDENTITY)
            // Head, shaft, grip
            .with_shape(ShapeLayout::cuboid([1.0, 0.35, 0.3], [0.6, 0.3, 0.0]))
            .with_shape(ShapeLayout::cuboid([0.175, 4.0, 0.175], [0.0, 4.6, 0.0]))
            .with_shape(ShapeLayout::cuboid([0.225, 1.0, 0.225], [0.0, 9.6, 0.0]))
            .with_color([0.0, 0.0, 1.0]);

        let club_pivot = ActorLayout::new(CLUB_PIVOT, ActorKind::Kinematic, Pose::from_position(0.0, 20.0, 0.0))
            .with_shape(ShapeLayout::centered(Geometry::cuboid(0.5, 0.5, 0.5)))
            .without_gravity()
            .with_color([1.0, 1.0, 1.0]);

        let ball = ActorLayout::new(BALL, ActorKind::Dynamic, Pose::from_position(0.0, 0.1, 0.8))
            .with_shape(ShapeLayout::centered(Geometry::sphere(0.35)))
            .with_material(CONCRETE)
            .with_linear_damping(0.1)
            .with_touch_reports()
            .with_color([1.0, 1.0, 1.0]);

        let windmill = ActorLayout::new(WINDMILL, ActorKind::Static, Pose::IDENTITY)
            // Tower, widest tier first
            .with_shape(ShapeLayout::cuboid([5.0, 1.0, 4.0], [0.0, 2.0, 30.0]))
            .with_shape(ShapeLayout::cuboid([4.75, 1.0, 3.75], [0.0, 4.0, 30.0]))
            .with_shape(ShapeLayout::cuboid([4.5, 1.0, 3.5], [0.0, 6.0, 30.0]))
            .with_shape(ShapeLayout::cuboid([4.0, 2.0, 3.0], [0.0, 9.0, 30.0]))
            // Walls either side of the tunnel
            .with_shape(ShapeLayout::cuboid([2.25, 0.5, 4.0], [2.75, 0.5, 30.0]))
            .with_shape(ShapeLayout::cuboid([2.25, 0.5, 4.0], [-2.75, 0.5, 30.0]))
            .with_color([0.75, 0.5, 0.5]);

        let sails = ActorLayout::new(SAILS, ActorKind::Dynamic, Pose::IDENTITY)
            .with_shape(ShapeLayout::cuboid([4.0, 1.1, 0.1], [5.0, 9.25, 25.5]))
            .with_shape(ShapeLayout::cuboid([4.0, 1.1, 0.1], [-5.0, 9.25, 25.5]))
            .with_shape(ShapeLayout::cuboid([1.1, 4.0, 0.1], [0.0, 14.25, 25.5]))
            .with_shape(ShapeLayout::cuboid([1.1, 4.0, 0.1], [0.0, 4.25, 25.5]))
            .without_gravity()
            .with_color([1.0, 0.9, 0.9]);

        let sail_pivot = ActorLayout::new(SAIL_PIVOT, ActorKind::Kinematic, Pose::from_position(0.0, 9.25, 25.5))
            .with_shape(ShapeLayout::centered(Geometry::cuboid(0.5, 0.5, 0.5)))
            .with_color([0.75, 0.5, 0.5]);

        let flag_pole = ActorLayout::new(FLAG_POLE, ActorKind::Dynamic, rot_z([0.0, 6.1, 50.0]))
            .with_shape(ShapeLayout::centered(Geometry::capsule(0.05, 5.95)))
            .without_gravity()
            .without_simulation()
            .with_color([0.4, 0.2, 0.2]);

        let club_joint = JointLayout {
            name: CLUB_JOINT.to_string(),
            driver: Some(CLUB_PIVOT.to_string()),
            driver_frame: rot_x([0.0, -10.0, 0.0]),
            driven: CLUB.to_string(),
            driven_frame: Pose::from_position(0.0, 9.5, 0.0),
            limits: Some([-PI / 2.0 - PI / 4.0, PI / 2.0 - (2.0 * PI) / 3.0]),
            drive_velocity: None,
        };

        let sail_joint = JointLayout {
            name: SAIL_JOINT.to_string(),
            driver: Some(SAIL_PIVOT.to_string()),
            driver_frame: rot_y([0.0, 0.0, 0.0]),
            driven: SAILS.to_string(),
            driven_frame: rot_y([0.0, 9.25, 25.5]),
            limits: None,
            drive_velocity: Some(1.0),
        };

        let flag = ClothLayout {
            name: FLAG.to_string(),
            cloth: ClothDesc::new([2.0, 2.0], [20, 20])
                .with_pose(rot_y([0.0, 10.0, 50.0]))
                .with_pinned_top_row(true)
                .with_external_acceleration([-10.0, 5.0, 0.0]),
            placement: Some(rot_z([0.0, 10.0, 50.0])),
            color: [1.0, 0.0, 0.0],
        };

        Self {
            default_material: PhysicsMaterial::new(0.5, 0.2, 0.0),
            materials: vec![
                MaterialLayout {
                    name: CONCRETE.to_string(),
                    material: PhysicsMaterial::new(0.6, 0.6, 0.4),
                },
                MaterialLayout {
                    name: ASPHALT.to_string(),
                    material: PhysicsMaterial::new(0.5, 0.5, 0.7),
                },
            ],
            actors: vec![
                course,
                course_middle,
                tee_box,
                barriers,
                club,
                club_pivot,
                ball,
                windmill,
                sails,
                sail_pivot,
                flag_pole,
            ],
            joints: vec![club_joint, sail_joint],
            cloths: vec![flag],
            goal: GoalBox {
                x_min: -1.0,
                x_max: 1.0,
                y_max: -0.5,
                z_min: 49.0,
                z_max: 51.0,
            },
            swing_axis: [0.0, 0.0, 1.0],
            resettable: [BALL, CLUB, CLUB_PIVOT, SAILS, FLAG_POLE]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            telemetry: [BALL, CLUB, SAILS, FLAG_POLE]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for LevelLayout {
    fn default() -> Self {
        Self::minigolf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_box_examples() {
        let goal = LevelLayout::minigolf().goal;
        assert!(goal.contains([0.0, -1.0, 50.0]));
        assert!(!goal.contains([0.0, 0.5, 50.0]));
    }

    #[test]
    fn test_goal_box_is_strict() {
        let goal = LevelLayout::minigolf().goal;
        assert!(!goal.contains([1.0, -1.0, 50.0]));
        assert!(!goal.contains([0.0, -0.5, 50.0]));
        assert!(!goal.contains([0.0, -1.0, 49.0]));
        assert!(!goal.contains([0.0, -1.0, 51.0]));
    }

    #[test]
    fn test_minigolf_actor_names_unique() {
        let layout = LevelLayout::minigolf();
        let mut names: Vec<_> = layout.actors.iter().map(|a| a.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), layout.actors.len());
    }

    #[test]
    fn test_minigolf_references_resolve() {
        let layout = LevelLayout::minigolf();
        for joint in &layout.joints {
            assert!(layout.actor(&joint.driven).is_some());
            if let Some(driver) = &joint.driver {
                assert!(layout.actor(driver).is_some());
            }
        }
        for actor in &layout.actors {
            if let Some(material) = &actor.material {
                assert!(layout.material(material).is_some(), "{material}");
            }
        }
        for name in layout.resettable.iter().chain(&layout.telemetry) {
            assert!(layout.actor(name).is_some(), "{name}");
        }
    }

    #[test]
    fn test_club_limits() {
        let layout = LevelLayout::minigolf();
        let club = layout
            .joints
            .iter()
            .find(|j| j.name == names::CLUB_JOINT)
            .unwrap();
        let [lower, upper] = club.limits.unwrap();
        assert!(lower < upper);
        assert!((lower + 3.0 * PI / 4.0).abs() < 1e-6);
        assert!((upper + PI / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_shape_counts() {
        let layout = LevelLayout::minigolf();
        let count = |name: &str| layout.actor(name).unwrap().shapes.len();
        assert_eq!(count(names::COURSE), 5);
        assert_eq!(count(names::WINDMILL), 6);
        assert_eq!(count(names::SAILS), 4);
        assert_eq!(count(names::CLUB), 3);
        assert_eq!(count(names::BALL), 1);
    }
}
