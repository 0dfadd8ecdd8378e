//! Integration tests for putt_level

use putt_level::*;

const DT: f32 = 1.0 / 60.0;

fn game() -> MiniGolf {
    let mut game = MiniGolf::standard().unwrap();
    game.initialize().unwrap();
    game
}

fn run(game: &mut MiniGolf, steps: usize) {
    for _ in 0..steps {
        game.step(DT).unwrap();
    }
}

/// Teleport the ball above the hole
fn drop_ball_in_hole(game: &mut MiniGolf) {
    let ball = game.position(names::BALL).unwrap();
    game.translate(names::BALL, [-ball[0], 0.5 - ball[1], 50.0 - ball[2]])
        .unwrap();
}

#[test]
fn test_ball_in_hole_wins() {
    let mut game = game();
    assert!(!game.check_win().unwrap());

    drop_ball_in_hole(&mut game);
    run(&mut game, 120);

    assert!(game.is_won());
    assert!(game.position(names::BALL).unwrap()[1] < -0.5);
}

#[test]
fn test_reset_restores_initial_poses() {
    let mut game = game();
    drop_ball_in_hole(&mut game);
    run(&mut game, 120);
    assert!(game.is_won());

    game.reset().unwrap();

    let scene = game.scene().unwrap();
    for entry in scene.record().iter() {
        assert_eq!(game.world().body_pose(entry.body).unwrap(), entry.pose, "{}", entry.name);
        assert_eq!(game.world().linear_velocity(entry.body).unwrap(), [0.0; 3]);
        assert_eq!(game.world().angular_velocity(entry.body).unwrap(), [0.0; 3]);
    }
    assert_eq!(game.displacement(names::BALL).unwrap(), 0.0);

    // Reset never clears the win
    assert!(game.is_won());
    assert!(game.check_win().unwrap());
}

#[test]
fn test_ball_on_tee_does_not_win() {
    let mut game = game();
    run(&mut game, 60);
    assert!(!game.is_won());
}

#[test]
fn test_sails_turn() {
    let mut game = game();
    assert_eq!(game.drive_velocity(names::SAIL_JOINT).unwrap(), 1.0);

    run(&mut game, 60);
    assert!(game.displacement(names::SAILS).unwrap() > 0.1);
}

#[test]
fn test_flag_pole_stays_put() {
    let mut game = game();
    run(&mut game, 60);
    assert_eq!(game.displacement(names::FLAG_POLE).unwrap(), 0.0);
}

#[test]
fn test_swing_moves_club_forward() {
    let mut still = game();
    let mut swung = game();

    swung.swing(400.0).unwrap();
    run(&mut still, 10);
    run(&mut swung, 10);

    let z_still = still.position(names::CLUB).unwrap()[2];
    let z_swung = swung.position(names::CLUB).unwrap()[2];
    assert!(z_swung > z_still, "swung club at z={z_swung}, idle club at z={z_still}");
}

#[test]
fn test_swing_backwards_moves_club_back() {
    let mut still = game();
    let mut swung = game();

    swung.swing(-400.0).unwrap();
    run(&mut still, 10);
    run(&mut swung, 10);

    let z_still = still.position(names::CLUB).unwrap()[2];
    let z_swung = swung.position(names::CLUB).unwrap()[2];
    assert!(z_swung < z_still, "swung club at z={z_swung}, idle club at z={z_still}");
}

#[test]
fn test_translate_club_pivot() {
    let mut game = game();
    let start = game.position(names::CLUB_PIVOT).unwrap();

    game.translate(names::CLUB_PIVOT, [1.0, 0.0, 0.0]).unwrap();
    run(&mut game, 1);

    let moved = game.position(names::CLUB_PIVOT).unwrap();
    assert!((moved[0] - start[0] - 1.0).abs() < 1e-4);
}

#[test]
fn test_drive_velocity_change() {
    let mut game = game();
    game.set_drive_velocity(names::SAIL_JOINT, -2.0).unwrap();
    assert_eq!(game.drive_velocity(names::SAIL_JOINT).unwrap(), -2.0);
    assert!(matches!(
        game.set_drive_velocity("nope", 1.0),
        Err(LevelError::UnknownJoint(_))
    ));
}

#[test]
fn test_flag_blows_in_wind() {
    let mut game = game();
    let flag = game.scene().unwrap().cloth(names::FLAG).unwrap();
    let start = game.world().cloth(flag).unwrap().centroid();

    run(&mut game, 60);

    let end = game.world().cloth(flag).unwrap().centroid();
    let moved = (0..3).map(|k| (end[k] - start[k]).powi(2)).sum::<f32>().sqrt();
    assert!(moved > 0.05, "flag centroid moved {moved}");
}

#[test]
fn test_telemetry_names() {
    let game = game();
    let reported: Vec<_> = game
        .displacements()
        .unwrap()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(reported, vec![names::BALL, names::CLUB, names::SAILS, names::FLAG_POLE]);
}
