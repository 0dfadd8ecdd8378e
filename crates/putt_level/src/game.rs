//! The mini-golf session: world, scene and controller behind one API

use crate::controller::Controller;
use crate::error::{LevelError, LevelResult};
use crate::layout::{names, LevelLayout};
use crate::scene::Scene;
use log::debug;
use putt_physics::{PhysicsConfig, PhysicsWorld};

struct Level {
    scene: Scene,
    controller: Controller,
}

/// A mini-golf level session
pub struct MiniGolf {
    world: PhysicsWorld,
    layout: LevelLayout,
    level: Option<Level>,
}

impl MiniGolf {
    /// Create a session; nothing is built until [`MiniGolf::initialize`]
    pub fn new(config: PhysicsConfig, layout: LevelLayout) -> LevelResult<Self> {
        Ok(Self {
            world: PhysicsWorld::new(config)?,
            layout,
            level: None,
        })
    }

    /// The built-in level with the default physics configuration
    pub fn standard() -> LevelResult<Self> {
        Self::new(PhysicsConfig::default(), LevelLayout::minigolf())
    }

    /// Build the level. Calling it again does nothing.
    pub fn initialize(&mut self) -> LevelResult<()> {
        if self.level.is_some() {
            debug!("Level already initialized");
            return Ok(());
        }
        let scene = Scene::compose(&mut self.world, &self.layout)?;
        let controller = Controller::new(self.layout.goal, self.layout.swing_axis);
        self.level = Some(Level { scene, controller });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.level.is_some()
    }

    fn level(&self) -> LevelResult<&Level> {
        self.level.as_ref().ok_or(LevelError::NotInitialized)
    }

    /// Advance the world, report touches and check the goal.
    ///
    /// Returns the number of fixed physics steps taken. A negative or
    /// non-finite `dt` is rejected before the world is touched.
    pub fn step(&mut self, dt: f32) -> LevelResult<u32> {
        let level = self.level.as_mut().ok_or(LevelError::NotInitialized)?;
        if !dt.is_finite() || dt < 0.0 {
            return Err(LevelError::InvalidTimestep(dt));
        }
        let steps = self.world.step(dt);

        for event in self.world.touch_events() {
            let name = |body: Option<_>| {
                body.and_then(|b| level.scene.name_of(b))
                    .unwrap_or("<unknown>")
            };
            debug!(
                "Touch {:?} between {} and {}",
                event.kind,
                name(event.body1),
                name(event.body2)
            );
        }

        let ball = level.scene.body(names::BALL)?;
        level.controller.check_win(self.world.body_position(ball)?);
        Ok(steps)
    }

    /// Swing the club; the sign of `strength` picks the direction
    pub fn swing(&mut self, strength: f32) -> LevelResult<()> {
        let level = self.level.as_ref().ok_or(LevelError::NotInitialized)?;
        let club = level.scene.body(names::CLUB)?;
        level.controller.swing(&mut self.world, club, strength)
    }

    /// Move a named actor by `delta`.
    ///
    /// Moving the club pivot counter-swings the club first.
    pub fn translate(&mut self, actor: &str, delta: [f32; 3]) -> LevelResult<()> {
        let level = self.level.as_ref().ok_or(LevelError::NotInitialized)?;
        let body = level.scene.body(actor)?;
        if actor == names::CLUB_PIVOT {
            let club = level.scene.body(names::CLUB)?;
            level.controller.translate_driver(&mut self.world, club, body, delta)
        } else {
            self.world.translate_body(body, delta)?;
            Ok(())
        }
    }

    /// Check the ball against the goal; once won, stays won
    pub fn check_win(&mut self) -> LevelResult<bool> {
        let level = self.level.as_mut().ok_or(LevelError::NotInitialized)?;
        let ball = level.scene.body(names::BALL)?;
        Ok(level.controller.check_win(self.world.body_position(ball)?))
    }

    /// Whether the goal has been reached this session
    pub fn is_won(&self) -> bool {
        self.level
            .as_ref()
            .map(|l| l.controller.win_state().is_won())
            .unwrap_or(false)
    }

    /// Put the resettable actors back where they started
    pub fn reset(&mut self) -> LevelResult<()> {
        let level = self.level.as_ref().ok_or(LevelError::NotInitialized)?;
        level.controller.reset(&mut self.world, level.scene.record())
    }

    /// Set the drive velocity of a named joint
    pub fn set_drive_velocity(&mut self, joint: &str, velocity: f32) -> LevelResult<()> {
        let handle = self.level()?.scene.joint(joint)?;
        self.world.set_joint_drive_velocity(handle, velocity)?;
        Ok(())
    }

    /// Drive velocity of a named joint
    pub fn drive_velocity(&self, joint: &str) -> LevelResult<f32> {
        let handle = self.level()?.scene.joint(joint)?;
        Ok(self.world.joint_drive_velocity(handle)?)
    }

    /// Current position of a named rigid actor
    pub fn position(&self, actor: &str) -> LevelResult<[f32; 3]> {
        let body = self.level()?.scene.body(actor)?;
        Ok(self.world.body_position(body)?)
    }

    /// Distance of a recorded actor from its initial position
    pub fn displacement(&self, actor: &str) -> LevelResult<f32> {
        let record = self.level()?.scene.record();
        let entry = record
            .get(actor)
            .ok_or_else(|| LevelError::MissingRecord(actor.to_string()))?;
        Ok(self.world.body_pose(entry.body)?.distance_to(&entry.pose))
    }

    /// Displacement of every telemetry actor, in layout order
    pub fn displacements(&self) -> LevelResult<Vec<(String, f32)>> {
        self.layout
            .telemetry
            .iter()
            .map(|name| Ok((name.clone(), self.displacement(name)?)))
            .collect()
    }

    pub fn scene(&self) -> LevelResult<&Scene> {
        self.level().map(|l| &l.scene)
    }

    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operations_need_initialize() {
        let mut game = MiniGolf::standard().unwrap();
        assert!(!game.is_initialized());
        assert!(matches!(game.step(1.0 / 60.0), Err(LevelError::NotInitialized)));
        assert!(matches!(game.swing(1.0), Err(LevelError::NotInitialized)));
        assert!(matches!(game.reset(), Err(LevelError::NotInitialized)));
        assert!(matches!(game.check_win(), Err(LevelError::NotInitialized)));
        assert!(!game.is_won());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut game = MiniGolf::standard().unwrap();
        game.initialize().unwrap();
        let bodies = game.world().body_count();

        game.initialize().unwrap();
        assert_eq!(game.world().body_count(), bodies);
        assert_eq!(game.world().cloth_count(), 1);
    }

    #[test]
    fn test_failed_initialize_leaves_world_empty() {
        let mut layout = LevelLayout::minigolf();
        layout.resettable.push("missing".to_string());

        let mut game = MiniGolf::new(PhysicsConfig::default(), layout).unwrap();
        assert!(matches!(game.initialize(), Err(LevelError::UnknownActor(_))));
        assert!(!game.is_initialized());
        assert_eq!(game.world().body_count(), 0);
        assert_eq!(game.world().joint_count(), 0);
        assert_eq!(game.world().cloth_count(), 0);
    }

    #[test]
    fn test_invalid_frame_time_rejected() {
        let mut game = MiniGolf::standard().unwrap();
        game.initialize().unwrap();

        for dt in [f32::NAN, f32::INFINITY, -1.0] {
            assert!(matches!(game.step(dt), Err(LevelError::InvalidTimestep(_))));
        }

        // The simulation still advances afterwards
        let steps: u32 = (0..60).map(|_| game.step(1.0 / 60.0).unwrap()).sum();
        assert!(steps > 0);
    }

    #[test]
    fn test_displacements_start_at_zero() {
        let mut game = MiniGolf::standard().unwrap();
        game.initialize().unwrap();

        let displacements = game.displacements().unwrap();
        assert_eq!(displacements.len(), 4);
        assert!(displacements.iter().all(|(_, d)| *d == 0.0));
        assert!(matches!(
            game.displacement(names::WINDMILL),
            Err(LevelError::MissingRecord(_))
        ));
    }

    #[test]
    fn test_translate_unknown_actor() {
        let mut game = MiniGolf::standard().unwrap();
        game.initialize().unwrap();
        assert!(matches!(
            game.translate("nope", [1.0, 0.0, 0.0]),
            Err(LevelError::UnknownActor(_))
        ));
    }
}
