//! Win detection, reset and club actuation

use crate::error::LevelResult;
use crate::layout::GoalBox;
use crate::scene::InitialPoseRecord;
use log::info;
use putt_physics::{PhysicsWorld, RigidBodyHandle};

/// Swing strength applied to the club before every pivot translation
pub const IDLE_COUNTER_SWING: f32 = -0.01;

/// Whether the ball has reached the goal this session.
///
/// Only ever goes from not won to won.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WinState {
    won: bool,
}

impl WinState {
    pub fn is_won(&self) -> bool {
        self.won
    }
}

/// Goal check, reset and swing for one level session
#[derive(Debug, Clone)]
pub struct Controller {
    goal: GoalBox,
    swing_axis: [f32; 3],
    win: WinState,
}

impl Controller {
    /// Create a controller with the win state cleared
    pub fn new(goal: GoalBox, swing_axis: [f32; 3]) -> Self {
        Self {
            goal,
            swing_axis,
            win: WinState::default(),
        }
    }

    /// Goal region
    pub fn goal(&self) -> &GoalBox {
        &self.goal
    }

    /// Current win state
    pub fn win_state(&self) -> WinState {
        self.win
    }

    /// Test the ball against the goal box and latch the win.
    ///
    /// Returns the win state after the test.
    pub fn check_win(&mut self, ball_position: [f32; 3]) -> bool {
        if !self.win.won && self.goal.contains(ball_position) {
            self.win.won = true;
            info!(
                "YOU WIN! Ball reached the goal at ({:.2}, {:.2}, {:.2})",
                ball_position[0], ball_position[1], ball_position[2]
            );
        }
        self.win.won
    }

    /// Push the club along the swing axis for one step; negative strength
    /// swings backwards
    pub fn swing(&self, world: &mut PhysicsWorld, club: RigidBodyHandle, strength: f32) -> LevelResult<()> {
        let force = self.swing_axis.map(|a| a * strength);
        world.apply_force(club, force)?;
        Ok(())
    }

    /// Move the club's driver by `delta`, counter-swinging the club first
    pub fn translate_driver(
        &self,
        world: &mut PhysicsWorld,
        club: RigidBodyHandle,
        driver: RigidBodyHandle,
        delta: [f32; 3],
    ) -> LevelResult<()> {
        self.swing(world, club, IDLE_COUNTER_SWING)?;
        world.translate_body(driver, delta)?;
        Ok(())
    }

    /// Put every recorded actor back at its initial pose, at rest.
    ///
    /// The win state is left as it is.
    pub fn reset(&self, world: &mut PhysicsWorld, record: &InitialPoseRecord) -> LevelResult<()> {
        for entry in record.iter() {
            world.set_body_pose(entry.body, entry.pose)?;
            world.set_linear_velocity(entry.body, [0.0; 3])?;
            world.set_angular_velocity(entry.body, [0.0; 3])?;
        }
        info!("Level reset ({} actors)", record.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LevelLayout;
    use crate::scene::Scene;
    use crate::layout::names;
    use putt_physics::Pose;

    fn controller() -> Controller {
        let layout = LevelLayout::minigolf();
        Controller::new(layout.goal, layout.swing_axis)
    }

    #[test]
    fn test_check_win_examples() {
        let mut c = controller();
        assert!(!c.check_win([0.0, 0.5, 50.0]));
        assert!(c.check_win([0.0, -1.0, 50.0]));
    }

    #[test]
    fn test_win_is_monotonic() {
        let mut c = controller();
        assert!(c.check_win([0.0, -1.0, 50.0]));

        for p in [[0.0, 0.5, 50.0], [10.0, 10.0, 0.0], [0.0, -1.0, 50.0]] {
            assert!(c.check_win(p));
        }
        assert!(c.win_state().is_won());
    }

    #[test]
    fn test_reset_restores_poses_and_keeps_win() {
        let mut world = PhysicsWorld::default();
        let scene = Scene::compose(&mut world, &LevelLayout::minigolf()).unwrap();
        let mut c = controller();
        let ball = scene.body(names::BALL).unwrap();

        world.set_body_pose(ball, Pose::from_position(0.0, -1.0, 50.0)).unwrap();
        world.set_linear_velocity(ball, [0.0, -3.0, 1.0]).unwrap();
        assert!(c.check_win(world.body_position(ball).unwrap()));

        c.reset(&mut world, scene.record()).unwrap();

        for entry in scene.record().iter() {
            assert_eq!(world.body_pose(entry.body).unwrap(), entry.pose, "{}", entry.name);
        }
        assert_eq!(world.linear_velocity(ball).unwrap(), [0.0; 3]);
        assert_eq!(world.angular_velocity(ball).unwrap(), [0.0; 3]);
        assert!(c.win_state().is_won());
    }

    #[test]
    fn test_swing_pushes_club_along_axis() {
        let mut world = PhysicsWorld::default();
        let scene = Scene::compose(&mut world, &LevelLayout::minigolf()).unwrap();
        let c = controller();
        let club = scene.body(names::CLUB).unwrap();

        c.swing(&mut world, club, 500.0).unwrap();
        let v = world.linear_velocity(club).unwrap();
        assert!(v[2] > 0.0, "club should move towards +Z, got {v:?}");
        assert_eq!(v[0], 0.0);
    }

    #[test]
    fn test_swing_backwards_pushes_club_back() {
        let mut world = PhysicsWorld::default();
        let scene = Scene::compose(&mut world, &LevelLayout::minigolf()).unwrap();
        let c = controller();
        let club = scene.body(names::CLUB).unwrap();

        c.swing(&mut world, club, -500.0).unwrap();
        let v = world.linear_velocity(club).unwrap();
        assert!(v[2] < 0.0, "club should move towards -Z, got {v:?}");
        assert_eq!(v[0], 0.0);
    }
}
