use carball::{
    Arena, ArenaConfig, ArenaError, BoostPadConfig, BoostPadState, GameMode, Team, Vec3,
};

use super::CarSetup;

#[test]
fn pad_layouts_per_game_mode() {
    let soccar = Arena::new(GameMode::Soccar);
    assert_eq!(soccar.num_pads(), 34);

    let big_pad = soccar.get_pad_static(0).unwrap();
    assert!(big_pad.is_big);
    assert_eq!(big_pad.pos, Vec3::new(-3584.0, 0.0, 73.0));

    let pad_state = soccar.get_pad_state(0).unwrap();
    assert!(pad_state.is_active);
    assert_eq!(pad_state.cooldown, 0.0);

    assert_eq!(Arena::new(GameMode::Hoops).num_pads(), 20);
    assert_eq!(Arena::new(GameMode::TheVoid).num_pads(), 0);
}

#[test]
fn custom_pads_replace_the_default_layout() {
    let config = ArenaConfig {
        use_custom_boost_pads: true,
        custom_boost_pads: vec![
            BoostPadConfig::new(Vec3::new(0.0, 0.0, 70.0), true),
            BoostPadConfig::new(Vec3::new(500.0, 0.0, 70.0), false),
        ],
        ..ArenaConfig::DEFAULT
    };
    let arena = Arena::new_with_config(GameMode::Soccar, config, 120.0).unwrap();

    assert_eq!(arena.num_pads(), 2);
    assert!(!arena.get_pad_static(1).unwrap().is_big);

    let config = ArenaConfig {
        use_custom_boost_pads: true,
        custom_boost_pads: vec![BoostPadConfig::new(Vec3::new(f32::NAN, 0.0, 70.0), true)],
        ..ArenaConfig::DEFAULT
    };
    assert!(matches!(
        Arena::new_with_config(GameMode::Soccar, config, 120.0),
        Err(ArenaError::NonFinite(_))
    ));
}

#[test]
fn pad_index_is_checked() {
    let mut arena = Arena::new(GameMode::Soccar);
    let err = ArenaError::PadIndexOutOfRange {
        index: 34,
        num_pads: 34,
    };

    assert_eq!(arena.get_pad_state(34), Err(err.clone()));
    assert_eq!(arena.get_pad_static(34), Err(err.clone()));
    assert_eq!(arena.set_pad_state(34, BoostPadState::DEFAULT), Err(err));
}

#[test]
fn negative_cooldown_is_rejected() {
    let mut arena = Arena::new(GameMode::Soccar);
    let state = BoostPadState {
        is_active: false,
        cooldown: -1.0,
        ..BoostPadState::DEFAULT
    };

    assert_eq!(
        arena.set_pad_state(0, state),
        Err(ArenaError::InvalidCooldown(-1.0))
    );
    assert!(arena.get_pad_state(0).unwrap().is_active);
}

#[test]
fn set_pad_state_is_read_back() {
    let mut arena = Arena::new(GameMode::Soccar);
    let state = BoostPadState {
        is_active: false,
        cooldown: 2.5,
        cur_locked_car_id: 3,
        prev_locked_car_id: 1,
    };

    arena.set_pad_state(5, state).unwrap();
    assert_eq!(arena.get_pad_state(5), Ok(state));
}

#[test]
fn big_pad_pickup_and_cooldown() {
    let mut arena = Arena::new(GameMode::Soccar);
    let pad_pos = arena.get_pad_static(0).unwrap().pos;

    let id = CarSetup::new(Team::Blue, Vec3::new(pad_pos.x, pad_pos.y, 17.0))
        .with_on_ground(true)
        .spawn(&mut arena);

    arena.step(1);

    assert_eq!(arena.get_car(id).unwrap().boost, 100.0);
    let picked = arena.get_pad_state(0).unwrap();
    assert!(!picked.is_active);
    assert_eq!(picked.cur_locked_car_id, id);
    assert!(picked.cooldown > 9.9 && picked.cooldown <= 10.0);

    // Full cars leave the pad alone once it is back
    arena.step(1210);

    let reactivated = arena.get_pad_state(0).unwrap();
    assert!(reactivated.is_active);
    assert_eq!(reactivated.cooldown, 0.0);
    assert_eq!(reactivated.cur_locked_car_id, 0);
    assert_eq!(reactivated.prev_locked_car_id, id);
}

#[test]
fn small_pad_gives_a_fixed_amount() {
    let mut arena = Arena::new(GameMode::Soccar);
    let pad_idx = (0..arena.num_pads())
        .find(|&idx| !arena.get_pad_static(idx).unwrap().is_big)
        .unwrap();
    let pad_pos = arena.get_pad_static(pad_idx).unwrap().pos;

    let id = CarSetup::new(Team::Blue, Vec3::new(pad_pos.x, pad_pos.y, 17.0))
        .with_on_ground(true)
        .with_boost(50.0)
        .spawn(&mut arena);

    arena.step(1);

    assert_eq!(arena.get_car(id).unwrap().boost, 62.0);
    let state = arena.get_pad_state(pad_idx).unwrap();
    assert!(!state.is_active);
    assert!(state.cooldown > 3.9 && state.cooldown <= 4.0);
}

#[test]
fn pad_with_cooldown_left_waits_for_it() {
    let mut arena = Arena::new(GameMode::Soccar);
    let pad_pos = arena.get_pad_static(0).unwrap().pos;
    let state = BoostPadState {
        is_active: true,
        cooldown: 5.0,
        ..BoostPadState::DEFAULT
    };
    arena.set_pad_state(0, state).unwrap();

    let id = CarSetup::new(Team::Blue, Vec3::new(pad_pos.x, pad_pos.y, 17.0))
        .with_on_ground(true)
        .spawn(&mut arena);

    arena.step(120);
    assert_eq!(arena.get_car(id).unwrap().boost, 0.0);
    let waiting = arena.get_pad_state(0).unwrap();
    assert!(!waiting.is_active);
    assert!(waiting.cooldown > 3.9 && waiting.cooldown < 4.1);

    arena.step(490);
    assert_eq!(arena.get_car(id).unwrap().boost, 100.0);
    assert_eq!(arena.get_pad_state(0).unwrap().cur_locked_car_id, id);
}

#[test]
fn airborne_car_misses_the_pad() {
    let mut arena = Arena::new(GameMode::Soccar);
    let pad_pos = arena.get_pad_static(0).unwrap().pos;

    let id = CarSetup::new(Team::Blue, Vec3::new(pad_pos.x, pad_pos.y, 500.0)).spawn(&mut arena);
    arena.step(1);

    assert_eq!(arena.get_car(id).unwrap().boost, 0.0);
    assert!(arena.get_pad_state(0).unwrap().is_active);
}
