use std::{cell::RefCell, rc::Rc};

use carball::{
    Arena, ArenaError, CarConfig, CarControls, CarState, GameMode, MutatorConfig, RotMat,
    RotMatExt, Team, Vec3, consts::car::spawn,
};

use super::{CarSetup, quick_air, quick_drive, seeded_arena};

#[test]
fn car_ids_are_sequential_and_never_reused() {
    let mut arena = Arena::new(GameMode::Soccar);
    let blue = arena.add_car(Team::Blue, CarConfig::OCTANE);
    let orange = arena.add_car(Team::Orange, CarConfig::DOMINUS);

    assert_eq!((blue, orange), (1, 2));
    assert_eq!(arena.get_cars(), [1, 2]);
    assert_eq!(arena.get_car_team(orange), Ok(Team::Orange));
    assert_eq!(arena.get_car_config(orange), Ok(CarConfig::DOMINUS));
}

#[test]
fn cars_spawn_on_mirrored_kickoff_spots() {
    let mut arena = Arena::new(GameMode::Soccar);
    let blue = arena.add_car(Team::Blue, CarConfig::OCTANE);
    let orange = arena.add_car(Team::Orange, CarConfig::OCTANE);

    let kickoff = spawn::LOCS_KICKOFF_SOCCAR[0];
    let blue_state = arena.get_car(blue).unwrap();
    let orange_state = arena.get_car(orange).unwrap();

    assert_eq!(blue_state.pos, Vec3::new(kickoff.x, kickoff.y, spawn::SPAWN_Z));
    assert_eq!(orange_state.pos, Vec3::new(-kickoff.x, -kickoff.y, spawn::SPAWN_Z));
    assert!(blue_state.get_forward_dir().dot(orange_state.get_forward_dir()) < -0.99);
    assert_eq!(blue_state.boost, MutatorConfig::new(GameMode::Soccar).car_spawn_boost_amount);
}

#[test]
fn unknown_car_is_an_error() {
    let mut arena = Arena::new(GameMode::Soccar);
    arena.add_car(Team::Blue, CarConfig::OCTANE);

    assert_eq!(arena.get_car(7), Err(ArenaError::UnknownCar(7)));
    assert_eq!(
        arena.set_car_controls(7, CarControls::DEFAULT),
        Err(ArenaError::UnknownCar(7))
    );
    assert_eq!(
        arena.set_car(7, CarState::DEFAULT),
        Err(ArenaError::UnknownCar(7))
    );
}

#[test]
fn set_all_controls_is_all_or_nothing() {
    let mut arena = Arena::new(GameMode::Soccar);
    let id = arena.add_car(Team::Blue, CarConfig::OCTANE);

    let drive = quick_drive(1.0, 0.0, false, false);
    let result = arena.set_all_controls(&[(id, drive), (id + 1, drive)]);
    assert_eq!(result, Err(ArenaError::UnknownCar(id + 1)));
    assert_eq!(arena.get_car(id).unwrap().controls, CarControls::DEFAULT);

    arena.set_all_controls(&[(id, drive)]).unwrap();
    assert_eq!(arena.get_car(id).unwrap().controls, drive);
}

#[test]
fn non_finite_controls_are_rejected() {
    let mut arena = Arena::new(GameMode::Soccar);
    let id = arena.add_car(Team::Blue, CarConfig::OCTANE);

    let controls = quick_drive(f32::NAN, 0.0, false, false);
    assert!(matches!(
        arena.set_car_controls(id, controls),
        Err(ArenaError::NonFinite(_))
    ));
}

#[test]
fn out_of_range_controls_are_clamped() {
    let mut arena = Arena::new(GameMode::Soccar);
    let id = arena.add_car(Team::Blue, CarConfig::OCTANE);

    arena
        .set_car_controls(id, quick_drive(5.0, -3.0, false, false))
        .unwrap();
    arena.step(1);

    let controls = arena.get_car(id).unwrap().controls;
    assert_eq!((controls.throttle, controls.steer), (1.0, -1.0));
}

#[test]
fn car_settles_and_drives_forward() {
    let mut arena = Arena::new(GameMode::Soccar);
    let id = arena.add_car(Team::Blue, CarConfig::OCTANE);

    arena.step(120);
    let settled = arena.get_car(id).unwrap();
    assert!(settled.is_on_ground);
    assert_eq!(settled.wheels_with_contact, [true; 4]);
    assert!(settled.pos.z > 10.0 && settled.pos.z < 30.0, "car at {}", settled.pos);
    assert!(settled.vel.length() < 5.0);

    arena
        .set_car_controls(id, quick_drive(1.0, 0.0, false, false))
        .unwrap();
    arena.step(120);

    let driving = arena.get_car(id).unwrap();
    assert!(driving.is_on_ground);
    assert!(driving.vel.dot(driving.get_forward_dir()) > 500.0);
    assert!((driving.pos - settled.pos).dot(settled.get_forward_dir()) > 200.0);
}

#[test]
fn boosting_uses_boost_over_time() {
    let mut arena = Arena::new(GameMode::TheVoid);
    let id = CarSetup::new(Team::Blue, Vec3::new(0.0, 0.0, 500.0))
        .with_boost(100.0)
        .spawn(&mut arena);

    arena
        .set_car_controls(id, quick_air(0.0, 0.0, 0.0, false, true))
        .unwrap();
    arena.step(120);

    let state = arena.get_car(id).unwrap();
    assert!(state.boost > 60.0 && state.boost < 70.0, "boost {}", state.boost);
    assert!(state.is_boosting);
    assert!(state.vel.x > 500.0);
}

#[test]
fn held_boost_runs_dry_without_going_negative() {
    let mut arena = Arena::new(GameMode::Soccar);
    let id = CarSetup::new(Team::Blue, Vec3::new(0.0, 0.0, 1050.0))
        .with_rot(RotMat::from_angles(1.1, 0.0, 0.0))
        .with_boost(100.0)
        .spawn(&mut arena);

    arena
        .set_car_controls(id, quick_air(0.0, 0.0, 0.0, false, true))
        .unwrap();

    let mut ran_dry_on = None;
    for tick in 0..7200 {
        arena.step(1);

        let boost = arena.get_car(id).unwrap().boost;
        assert!(boost >= 0.0, "boost {boost} on tick {tick}");
        if boost == 0.0 && ran_dry_on.is_none() {
            ran_dry_on = Some(tick);
        }
    }

    // 100 boost at 100/3 per second
    let ran_dry_on = ran_dry_on.unwrap();
    assert!((355..=365).contains(&ran_dry_on), "ran dry on tick {ran_dry_on}");
    assert_eq!(arena.get_tick_count(), 7200);
}

#[test]
fn boost_is_clamped_into_range() {
    let mut arena = Arena::new(GameMode::Soccar);
    let id = arena.add_car(Team::Blue, CarConfig::OCTANE);
    let mut state = arena.get_car(id).unwrap();

    state.boost = -20.0;
    arena.set_car(id, state).unwrap();
    assert_eq!(arena.get_car(id).unwrap().boost, 0.0);

    state.boost = 250.0;
    arena.set_car(id, state).unwrap();
    assert_eq!(arena.get_car(id).unwrap().boost, 100.0);

    state.boost = 42.0;
    arena.set_car(id, state).unwrap();
    assert_eq!(arena.get_car(id).unwrap().boost, 42.0);
}

#[test]
fn jump_lifts_the_car() {
    let mut arena = Arena::new(GameMode::Soccar);
    let id = arena.add_car(Team::Blue, CarConfig::OCTANE);
    arena.step(60);
    let start_z = arena.get_car(id).unwrap().pos.z;

    arena
        .set_car_controls(id, quick_air(0.0, 0.0, 0.0, true, false))
        .unwrap();
    arena.step(20);

    let state = arena.get_car(id).unwrap();
    assert!(state.has_jumped);
    assert!(!state.is_on_ground);
    assert!(state.pos.z > start_z + 20.0);
}

#[test]
fn demoed_car_respawns_after_its_timer() {
    let mut arena = seeded_arena(GameMode::Soccar, 3);
    let id = arena.add_car(Team::Blue, CarConfig::OCTANE);

    let mut state = arena.get_car(id).unwrap();
    state.is_demoed = true;
    state.demo_respawn_timer = 0.5;
    arena.set_car(id, state).unwrap();

    arena.step(30);
    let demoed = arena.get_car(id).unwrap();
    assert!(demoed.is_demoed);
    assert!(demoed.pos.distance(state.pos) < 0.01);

    arena.step(35);
    let respawned = arena.get_car(id).unwrap();
    assert!(!respawned.is_demoed);
    assert!(respawned.pos.y < -4000.0);
    assert!(
        spawn::LOCS_RESPAWN_SOCCAR
            .iter()
            .any(|loc| (loc.x - respawned.pos.x).abs() < 50.0)
    );
}

#[test]
fn random_kickoff_is_seeded() {
    let mut arena_a = Arena::new(GameMode::Soccar);
    for team in [Team::Blue, Team::Blue, Team::Orange, Team::Orange] {
        arena_a.add_car(team, CarConfig::OCTANE);
    }
    let mut arena_b = arena_a.clone_without_callbacks();

    arena_a.reset_to_random_kickoff(Some(42));
    arena_b.reset_to_random_kickoff(Some(42));

    for id in arena_a.get_cars() {
        let state = arena_a.get_car(id).unwrap();
        assert_eq!(state, arena_b.get_car(id).unwrap());

        let (x, y) = match arena_a.get_car_team(id).unwrap() {
            Team::Blue => (state.pos.x, state.pos.y),
            Team::Orange => (-state.pos.x, -state.pos.y),
        };
        assert!(
            spawn::LOCS_KICKOFF_SOCCAR
                .iter()
                .any(|loc| loc.x == x && loc.y == y)
        );
    }
}

#[test]
fn bump_events_reach_the_callback() {
    let mut arena = Arena::new(GameMode::TheVoid);
    let mut mutator_config = *arena.mutator_config();
    mutator_config.gravity = Vec3::ZERO;
    arena.set_mutator_config(mutator_config).unwrap();

    let bumper = CarSetup::new(Team::Blue, Vec3::new(-300.0, 0.0, 500.0))
        .with_vel(Vec3::new(1500.0, 0.0, 0.0))
        .spawn(&mut arena);
    let victim = CarSetup::new(Team::Orange, Vec3::new(0.0, 20.0, 510.0)).spawn(&mut arena);

    let events = Rc::new(RefCell::new(Vec::new()));
    let events_ref = events.clone();
    arena.set_car_bump_callback(move |event| events_ref.borrow_mut().push(event));

    arena.step(60);

    let events = events.borrow();
    assert!(!events.is_empty());
    assert_eq!(events[0].bumper_id, bumper);
    assert_eq!(events[0].victim_id, victim);
    assert!(arena.get_car(victim).unwrap().vel.x > 0.0);
}

#[test]
fn invalid_mutator_config_is_rejected() {
    let mut arena = Arena::new(GameMode::Soccar);
    let before = *arena.mutator_config();

    let mut mutator_config = before;
    mutator_config.car_mass = -1.0;
    assert!(matches!(
        arena.set_mutator_config(mutator_config),
        Err(ArenaError::InvalidMutatorConfig(_))
    ));
    assert_eq!(*arena.mutator_config(), before);
}
