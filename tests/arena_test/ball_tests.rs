use std::{cell::RefCell, rc::Rc};

use carball::{Arena, ArenaConfig, ArenaError, BallState, GameMode, RotMat, Team, Vec3};

use super::{BallSetup, seeded_arena};

#[test]
fn ball_starts_at_kickoff_and_settles() {
    let mut arena = Arena::new(GameMode::Soccar);
    let start = arena.get_ball();
    assert_eq!(start.pos, Vec3::new(0.0, 0.0, 93.15));

    arena.step(600);

    let ball = arena.get_ball();
    assert!(ball.pos.x.abs() < 1.0 && ball.pos.y.abs() < 1.0);
    assert!(ball.pos.z > 85.0 && ball.pos.z < 100.0, "ball at {}", ball.pos);
    assert!(ball.vel.length() < 10.0);
}

#[test]
fn ball_falls_forever_in_the_void() {
    let mut arena = Arena::new(GameMode::TheVoid);
    let start_z = arena.get_ball().pos.z;

    arena.step(120);

    let ball = arena.get_ball();
    assert!(ball.pos.z < start_z - 100.0);
    assert!(ball.vel.z < 0.0);
}

#[test]
fn set_ball_is_read_back() {
    let mut arena = Arena::new(GameMode::Soccar);
    let state = BallSetup::new(Vec3::new(100.0, -200.0, 300.0))
        .with_vel(Vec3::new(10.0, 20.0, -30.0))
        .with_ang_vel(Vec3::new(1.0, 2.0, 3.0))
        .make_ball_state();

    arena.set_ball(state).unwrap();
    assert_eq!(arena.get_ball(), state);
}

#[test]
fn bad_ball_states_are_rejected() {
    let mut arena = Arena::new(GameMode::Soccar);
    let before = arena.get_ball();

    let mut state = BallState::DEFAULT;
    state.phys.vel.x = f32::NAN;
    assert!(matches!(arena.set_ball(state), Err(ArenaError::NonFinite(_))));

    let mut state = BallState::DEFAULT;
    state.phys.rot_mat = RotMat::ZERO;
    assert_eq!(arena.set_ball(state), Err(ArenaError::DegenerateRotation));

    assert_eq!(arena.get_ball(), before);
}

#[test]
fn slightly_skewed_rotation_is_corrected() {
    let mut arena = Arena::new(GameMode::Soccar);

    let mut state = BallState::DEFAULT;
    state.phys.rot_mat = RotMat::from_diagonal(Vec3::new(1.01, 1.0, 1.0).into());
    arena.set_ball(state).unwrap();

    let rot = arena.get_ball().rot_mat;
    assert!((rot.x_axis.length() - 1.0).abs() < 1e-5);
}

#[test]
fn goal_callback_fires_once_and_ball_resets() {
    let mut arena = seeded_arena(GameMode::Soccar, 0);
    let goals = Rc::new(RefCell::new(Vec::new()));

    let goals_ref = goals.clone();
    arena.set_goal_scored_callback(move |team| goals_ref.borrow_mut().push(team));

    let state = BallSetup::new(Vec3::new(0.0, 5400.0, 300.0))
        .with_vel(Vec3::new(0.0, 500.0, 0.0))
        .make_ball_state();
    arena.set_ball(state).unwrap();

    arena.step(1);
    assert_eq!(*goals.borrow(), [Team::Blue]);
    assert_eq!(arena.get_ball().pos, Vec3::new(0.0, 0.0, 93.15));

    arena.step(10);
    assert_eq!(goals.borrow().len(), 1);
}

#[test]
fn ball_driven_into_the_goal_scores_once() {
    let mut arena = seeded_arena(GameMode::Soccar, 0);
    let goals = Rc::new(RefCell::new(Vec::new()));

    let goals_ref = goals.clone();
    arena.set_goal_scored_callback(move |team| goals_ref.borrow_mut().push(team));

    let state = BallSetup::new(Vec3::new(0.0, 4500.0, 300.0))
        .with_vel(Vec3::new(0.0, 2000.0, 0.0))
        .make_ball_state();
    arena.set_ball(state).unwrap();

    let mut ticks = 0;
    while goals.borrow().is_empty() && ticks < 240 {
        arena.step(1);
        ticks += 1;
    }

    assert_eq!(*goals.borrow(), [Team::Blue]);
    assert!(ticks > 20, "scored after {ticks} ticks");

    let after_reset = arena.get_ball();
    assert_eq!(after_reset.pos, Vec3::new(0.0, 0.0, 93.15));

    // the ball keeps simulating from the kickoff spot
    arena.step(1);
    assert_ne!(arena.get_ball(), after_reset);
    assert_eq!(goals.borrow().len(), 1);
}

#[test]
fn only_the_goal_mouth_scores() {
    let mut arena = Arena::new(GameMode::Soccar);

    for (pos, scored) in [
        (Vec3::new(0.0, 5300.0, 300.0), true),
        (Vec3::new(-700.0, -5300.0, 150.0), true),
        (Vec3::new(3000.0, 5300.0, 1500.0), false),
        (Vec3::new(0.0, 5300.0, 800.0), false),
        (Vec3::new(1200.0, -5300.0, 150.0), false),
    ] {
        arena.set_ball(BallSetup::new(pos).make_ball_state()).unwrap();
        assert_eq!(arena.is_ball_scored(), scored, "ball at {pos}");
    }
}

#[test]
fn goal_is_latched_while_the_ball_stays_in() {
    let config = ArenaConfig {
        reset_ball_on_goal: false,
        ..ArenaConfig::DEFAULT
    };
    let mut arena = Arena::new_with_config(GameMode::Soccar, config, 120.0).unwrap();
    let goals = Rc::new(RefCell::new(Vec::new()));

    let goals_ref = goals.clone();
    arena.set_goal_scored_callback(move |team| goals_ref.borrow_mut().push(team));

    let state = BallSetup::new(Vec3::new(0.0, -5400.0, 200.0)).make_ball_state();
    arena.set_ball(state).unwrap();

    arena.step(10);
    assert_eq!(*goals.borrow(), [Team::Orange]);
    assert!(arena.is_ball_scored());

    // Setting the ball re-arms detection
    arena.set_ball(state).unwrap();
    arena.step(1);
    assert_eq!(goals.borrow().len(), 2);

    arena.clear_goal_scored_callback();
    arena.set_ball(state).unwrap();
    arena.step(1);
    assert_eq!(goals.borrow().len(), 2);
}

#[test]
fn void_never_scores() {
    let mut arena = Arena::new(GameMode::TheVoid);
    let state = BallSetup::new(Vec3::new(0.0, 6000.0, 100.0)).make_ball_state();
    arena.set_ball(state).unwrap();

    assert!(!arena.is_ball_scored());
}
