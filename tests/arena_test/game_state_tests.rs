use carball::{
    Arena, ArenaConfig, ArenaError, CarConfig, DemoMode, GameMode, GameState, Team, Vec3,
};

use super::{BallSetup, CarSetup, quick_drive, seeded_arena};

fn busy_arena() -> Arena {
    let mut arena = seeded_arena(GameMode::Soccar, 1);
    let blue = arena.add_car(Team::Blue, CarConfig::OCTANE);
    let orange = arena.add_car(Team::Orange, CarConfig::BREAKOUT);

    arena
        .set_all_controls(&[
            (blue, quick_drive(1.0, 0.3, true, false)),
            (orange, quick_drive(0.5, -1.0, false, true)),
        ])
        .unwrap();

    let ball = BallSetup::new(Vec3::new(200.0, -300.0, 400.0))
        .with_vel(Vec3::new(-500.0, 800.0, 100.0))
        .make_ball_state();
    arena.set_ball(ball).unwrap();

    arena.step(45);
    arena
}

#[test]
fn tick_rate_and_count() {
    let mut arena = Arena::new(GameMode::Soccar);
    assert_eq!(arena.get_tick_rate(), 120.0);
    assert_eq!(arena.get_tick_time(), 1.0 / 120.0);

    arena.step(10);
    assert_eq!(arena.get_tick_count(), 10);

    let arena = Arena::new_with_config(GameMode::Soccar, ArenaConfig::DEFAULT, 60.0).unwrap();
    assert_eq!(arena.get_tick_time(), 1.0 / 60.0);

    for rate in [15.0, 30.0, 120.0] {
        assert!(Arena::new_with_config(GameMode::Soccar, ArenaConfig::DEFAULT, rate).is_ok());
    }

    // the floor cannot hold bodies at very low rates
    for bad_rate in [0.0, -120.0, 1.0, 14.9, 240.0, f32::INFINITY] {
        assert_eq!(
            Arena::new_with_config(GameMode::Soccar, ArenaConfig::DEFAULT, bad_rate).err(),
            Some(ArenaError::InvalidTickRate(bad_rate))
        );
    }
    assert!(Arena::new_with_config(GameMode::Soccar, ArenaConfig::DEFAULT, f32::NAN).is_err());
}

#[test]
fn game_state_describes_the_arena() {
    let arena = busy_arena();
    let state = arena.get_game_state();

    assert_eq!(state.tick_rate, 120.0);
    assert_eq!(state.tick_count, 45);
    assert_eq!(state.game_mode, GameMode::Soccar);
    assert_eq!(state.ball, arena.get_ball());
    assert_eq!(state.pads.len(), arena.num_pads());

    let ids = state.cars.iter().map(|car| car.id).collect::<Vec<_>>();
    assert_eq!(ids, arena.get_cars());
    assert_eq!(state.cars[1].team, Team::Orange);
    assert_eq!(state.cars[1].config, CarConfig::BREAKOUT);
}

#[test]
fn restoring_a_game_state_is_idempotent() {
    let mut arena = busy_arena();
    let snapshot = arena.get_game_state();

    arena.step(60);
    assert_ne!(arena.get_game_state(), snapshot);

    arena.set_game_state(&snapshot).unwrap();
    assert_eq!(arena.get_game_state(), snapshot);
    assert_eq!(arena.get_tick_count(), 45);
}

#[test]
fn cloned_arenas_stay_in_lockstep() {
    let mut arena_a = busy_arena();
    let mut arena_b = arena_a.clone_without_callbacks();

    arena_a.step(120);
    arena_b.step(120);

    assert_eq!(arena_a.get_game_state(), arena_b.get_game_state());
}

#[test]
fn identical_setups_are_deterministic() {
    let mut arena_a = busy_arena();
    let mut arena_b = busy_arena();

    arena_a.step(60);
    arena_b.step(60);

    assert_eq!(arena_a.get_game_state(), arena_b.get_game_state());
}

#[test]
fn restored_snapshot_replays_the_same_ticks() {
    let mut arena = busy_arena();
    arena.step(55);
    let snapshot = arena.get_game_state();

    arena.step(100);
    let expected = arena.get_game_state();

    arena.set_game_state(&snapshot).unwrap();
    arena.step(100);
    assert_eq!(arena.get_game_state(), expected);

    // The random generator travels with the snapshot, the seed here does not matter
    let mut fresh = seeded_arena(GameMode::Soccar, 99);
    fresh.add_car(Team::Blue, CarConfig::OCTANE);
    fresh.add_car(Team::Orange, CarConfig::BREAKOUT);
    let decoded = GameState::from_bytes(&snapshot.to_bytes()).unwrap();
    fresh.set_game_state(&decoded).unwrap();
    fresh.step(100);
    assert_eq!(fresh.get_game_state(), expected);
}

#[test]
fn ball_replays_after_restore() {
    let mut arena = Arena::new(GameMode::Soccar);
    let ball = BallSetup::new(Vec3::new(-1000.0, 2500.0, 800.0))
        .with_vel(Vec3::new(1700.0, -900.0, 300.0))
        .with_ang_vel(Vec3::new(0.5, -2.0, 1.0))
        .make_ball_state();
    arena.set_ball(ball).unwrap();
    arena.step(100);

    let snapshot = arena.get_game_state();
    arena.step(250);
    let expected = arena.get_ball();

    let mut fresh = Arena::new(GameMode::Soccar);
    fresh.set_game_state(&snapshot).unwrap();
    fresh.step(250);
    assert_eq!(fresh.get_ball(), expected);
}

#[test]
fn demos_replay_after_restore() {
    let config = ArenaConfig {
        rng_seed: Some(5),
        ..ArenaConfig::DEFAULT
    };
    let mut arena = Arena::new_with_config(GameMode::Soccar, config, 120.0).unwrap();
    let mut mutator_config = *arena.mutator_config();
    mutator_config.demo_mode = DemoMode::OnContact;
    arena.set_mutator_config(mutator_config).unwrap();

    let bumper = CarSetup::new(Team::Blue, Vec3::new(-250.0, 0.0, 17.0))
        .with_vel(Vec3::new(1500.0, 0.0, 0.0))
        .with_on_ground(true)
        .spawn(&mut arena);
    let victim = CarSetup::new(Team::Orange, Vec3::new(0.0, 20.0, 17.0))
        .with_on_ground(true)
        .spawn(&mut arena);
    arena
        .set_car_controls(bumper, quick_drive(1.0, 0.0, false, false))
        .unwrap();

    arena.step(5);
    let snapshot = arena.get_game_state();
    assert!(!snapshot.cars[1].state.is_demoed);

    // demolished, then respawned on a random spot
    arena.step(600);
    let expected = arena.get_game_state();
    assert!(arena.get_car(victim).unwrap().pos.y.abs() > 2000.0);

    let mut other = arena.clone_without_callbacks();
    other.reset_to_random_kickoff(Some(1234));
    other.set_game_state(&snapshot).unwrap();
    other.step(600);
    assert_eq!(other.get_game_state(), expected);
}

#[test]
fn bytes_restore_into_a_fresh_arena() {
    let arena = busy_arena();
    let snapshot = arena.get_game_state();
    let bytes = snapshot.to_bytes();

    let decoded = GameState::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, snapshot);

    let mut fresh = seeded_arena(GameMode::Soccar, 1);
    fresh.add_car(Team::Blue, CarConfig::OCTANE);
    fresh.add_car(Team::Orange, CarConfig::BREAKOUT);
    fresh.set_game_state(&decoded).unwrap();

    assert_eq!(fresh.get_game_state(), snapshot);
}

#[test]
fn mismatched_game_states_are_rejected() {
    let mut arena = busy_arena();
    let snapshot = arena.get_game_state();
    let before = arena.get_game_state();

    let mut hoops = Arena::new(GameMode::Hoops);
    assert_eq!(
        hoops.set_game_state(&snapshot),
        Err(ArenaError::GameModeMismatch {
            expected: GameMode::Hoops,
            got: GameMode::Soccar,
        })
    );

    let mut bad = snapshot.clone();
    bad.pads.pop();
    assert_eq!(
        arena.set_game_state(&bad),
        Err(ArenaError::PadCountMismatch {
            expected: 34,
            got: 33,
        })
    );

    let mut bad = snapshot.clone();
    bad.tick_rate = 60.0;
    assert_eq!(
        arena.set_game_state(&bad),
        Err(ArenaError::InvalidTickRate(60.0))
    );

    let mut bad = snapshot.clone();
    bad.cars[0].id = 99;
    assert_eq!(arena.set_game_state(&bad), Err(ArenaError::UnknownCar(99)));

    // A bad entry late in the state leaves the earlier ones unapplied
    let mut bad = snapshot.clone();
    bad.ball.phys.pos = Vec3::ZERO;
    bad.pads[3].state.cooldown = f32::NAN;
    assert!(matches!(
        arena.set_game_state(&bad),
        Err(ArenaError::InvalidCooldown(_))
    ));

    assert_eq!(arena.get_game_state(), before);
}

#[test]
fn cars_left_out_of_a_game_state_keep_their_state() {
    let mut arena = busy_arena();
    let mut snapshot = arena.get_game_state();
    let orange = snapshot.cars.pop().unwrap();

    arena.step(30);
    let orange_now = arena.get_car(orange.id).unwrap();

    arena.set_game_state(&snapshot).unwrap();
    assert_eq!(arena.get_car(orange.id).unwrap(), orange_now);
    assert_eq!(arena.get_car(snapshot.cars[0].id).unwrap(), snapshot.cars[0].state);
}

#[test]
fn corrupt_bytes_are_an_error() {
    let bytes = busy_arena().get_game_state().to_bytes();

    let result = GameState::from_bytes(&bytes[..bytes.len() / 2]);
    assert!(matches!(result, Err(ArenaError::Decode(_))));

    let mut bad_magic = bytes.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        GameState::from_bytes(&bad_magic),
        Err(ArenaError::Decode(_))
    ));
}
