//! Tuning constants of the simulation.
//! Distances are in unreal units (uu) unless the name ends in `_BT`.

use crate::GameMode;
use glam::Vec3A;

/// `BulletPhysics` Units (1m) to Unreal Units (2cm) conversion scale
pub const BT_TO_UU: f32 = 50.0;

/// Unreal Units (2cm) to `BulletPhysics` Units (1m) conversion scale
pub const UU_TO_BT: f32 = 1.0 / 50.0;

pub const GRAVITY_Z: f32 = -650.0;

pub const ARENA_EXTENT_X: f32 = 4096.0;
pub const ARENA_EXTENT_Y: f32 = 5120.0;
pub const ARENA_HEIGHT: f32 = 2048.0;

pub const ARENA_EXTENT_X_HOOPS: f32 = 8900.0 / 3.0;
pub const ARENA_EXTENT_Y_HOOPS: f32 = 3581.0;
pub const ARENA_HEIGHT_HOOPS: f32 = 1820.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coefs {
    pub friction: f32,
    pub restitution: f32,
}

pub mod arena {
    use super::Coefs;

    pub const BASE_COEFS: Coefs = Coefs {
        friction: 0.6,
        restitution: 0.3,
    };

    /// Radius of the curved transitions between the floor, walls and ceiling
    pub const FILLET_RADIUS: f32 = 256.0;

    /// Length of the 45 degree corner walls along each axis
    pub const CORNER_CUT: f32 = 1152.0;

    /// Max distance a point may sit behind a wall and still be pushed back out
    pub const MAX_POINT_PENETRATION: f32 = 60.0;
}

pub mod goal {
    pub const SOCCAR_GOAL_SCORE_BASE_THRESHOLD_Y: f32 = 5124.25;
    pub const SOCCAR_GOAL_HALF_WIDTH: f32 = 892.755;
    pub const SOCCAR_GOAL_HEIGHT: f32 = 642.775;
    pub const SOCCAR_GOAL_DEPTH: f32 = 880.0;

    pub const HOOPS_GOAL_SCORE_THRESHOLD_Z: f32 = 270.0;
    pub const HOOPS_GOAL_SCALE_Y: f32 = 0.9;
    pub const HOOPS_GOAL_OFFSET_Y: f32 = 2770.0;
    pub const HOOPS_GOAL_RADIUS_SQ: f32 = 716.0 * 716.0;
}

pub mod ball {
    use super::Coefs;
    use crate::GameMode;

    pub const MASS_BT: f32 = super::car::MASS_BT / 6.0;
    pub const REST_Z: f32 = 93.15;
    pub const MAX_SPEED: f32 = 6000.0;
    pub const MAX_ANG_SPEED: f32 = 6.0;
    pub const DRAG: f32 = 0.03;
    pub const COEFS: Coefs = Coefs {
        friction: 0.35,
        restitution: 0.6,
    };

    pub const RADIUS_SOCCAR: f32 = 91.25;
    pub const RADIUS_HOOPS: f32 = 96.3831;

    /// Contacts slower than this (in uu/s) do not bounce
    pub const RESTITUTION_VEL_THRESH: f32 = 10.0;

    #[must_use]
    pub const fn get_radius(game_mode: GameMode) -> f32 {
        match game_mode {
            GameMode::Hoops => RADIUS_HOOPS,
            _ => RADIUS_SOCCAR,
        }
    }

    pub mod car_hit {
        use crate::sim::LinearPieceCurve;

        pub const COEFS: super::Coefs = super::Coefs {
            friction: 2.0,
            restitution: 0.0,
        };

        pub const EXTRA_IMPULSE_Z_SCALE: f32 = 0.35;
        pub const EXTRA_IMPULSE_FORWARD_SCALE: f32 = 0.65;
        pub const EXTRA_IMPULSE_MAX_DELTA_VEL: f32 = 4600.0;
        pub const EXTRA_IMPULSE_FACTOR_CURVE: LinearPieceCurve<4> = LinearPieceCurve::new([
            (0.0, 0.65),
            (500.0, 0.65),
            (2300.0, 0.55),
            (4600.0, 0.30),
        ]);
    }
}

pub mod car {
    use super::Coefs;

    pub const MASS_BT: f32 = 180.0;
    pub const MAX_SPEED: f32 = 2300.0;
    pub const MAX_ANG_SPEED: f32 = 5.5;

    pub const BASE_COEFS: Coefs = Coefs {
        friction: 0.3,
        restitution: 0.1,
    };
    pub const HIT_WORLD_COEFS: Coefs = Coefs {
        friction: 0.3,
        restitution: 0.3,
    };
    pub const HIT_CAR_COEFS: Coefs = Coefs {
        friction: 0.09,
        restitution: 0.1,
    };

    pub mod supersonic {
        pub const START_SPEED: f32 = 2200.0;
        pub const MAINTAIN_MIN_SPEED: f32 = START_SPEED - 100.0;
        pub const MAINTAIN_MAX_TIME: f32 = 1.0;
    }

    pub mod drive {
        use super::MASS_BT;

        pub const THROTTLE_TORQUE_AMOUNT: f32 = MASS_BT * 400.0;
        pub const BRAKE_TORQUE_AMOUNT: f32 = MASS_BT * (14.25 + (1.0 / 3.0));
        pub const STOPPING_FORWARD_VEL: f32 = 25.0;
        pub const COASTING_BRAKE_FACTOR: f32 = 0.15;
        pub const BRAKING_NO_THROTTLE_SPEED_THRESH: f32 = 0.01;
        pub const THROTTLE_DEADZONE: f32 = 0.001;
        pub const THROTTLE_AIR_ACCEL: f32 = 200.0 / 3.0;
        pub const POWERSLIDE_RISE_RATE: f32 = 5.0;
        pub const POWERSLIDE_FALL_RATE: f32 = 2.0;
    }

    pub mod jump {
        pub const ACCEL: f32 = 4375.0 / 3.0;
        pub const IMMEDIATE_FORCE: f32 = 875.0 / 3.0;
        pub const MIN_TIME: f32 = 0.025;
        pub const RESET_TIME_PAD: f32 = 1.0 / 40.0;
        pub const MAX_TIME: f32 = 0.2;
        pub const DOUBLEJUMP_MAX_DELAY: f32 = 1.25;
        /// Scale applied to the sustained jump force before the minimum jump time has passed
        pub const PRE_MIN_ACCEL_SCALE: f32 = 0.62;
    }

    pub mod flip {
        pub const Z_DAMP_120: f32 = 0.35;
        pub const Z_DAMP_START: f32 = 0.15;
        pub const Z_DAMP_END: f32 = 0.21;
        pub const TORQUE_TIME: f32 = 0.65;
        pub const PITCHLOCK_EXTRA_TIME: f32 = 0.3;
        pub const INITIAL_VEL_SCALE: f32 = 500.0;
        pub const TORQUE_X: f32 = 260.0;
        pub const TORQUE_Y: f32 = 224.0;
        pub const FORWARD_IMPULSE_MAX_SPEED_SCALE: f32 = 1.0;
        pub const SIDE_IMPULSE_MAX_SPEED_SCALE: f32 = 1.9;
        pub const BACKWARD_IMPULSE_MAX_SPEED_SCALE: f32 = 2.5;
        pub const BACKWARD_IMPULSE_SCALE_X: f32 = 16.0 / 15.0;
    }

    pub mod boost {
        pub const MAX: f32 = 100.0;
        pub const USED_PER_SECOND: f32 = MAX / 3.0;
        pub const MIN_TIME: f32 = 0.1;
        pub const ACCEL_GROUND: f32 = 2975.0 / 3.0;
        pub const ACCEL_AIR: f32 = 3175.0 / 3.0;
        pub const SPAWN_AMOUNT: f32 = MAX / 3.0;
        pub const RECHARGE_PER_SECOND: f32 = 10.0;
        pub const RECHARGE_DELAY: f32 = 0.25;
    }

    pub mod air_control {
        use glam::Vec3A;

        pub const TORQUE: Vec3A = Vec3A::new(130.0, 95.0, 400.0);
        pub const DAMPING: Vec3A = Vec3A::new(30.0, 20.0, 50.0);
        pub const TORQUE_APPLY_SCALE: f32 = std::f32::consts::TAU / 65536.0 * 1000.0;
    }

    pub mod autoflip {
        pub const IMPULSE: f32 = 200.0;
        pub const TORQUE: f32 = 50.0;
        pub const TIME: f32 = 0.4;
        pub const NORM_Z_THRESH: f32 = std::f32::consts::FRAC_1_SQRT_2;
        pub const ROLL_THRESH: f32 = 2.8;
    }

    pub mod autoroll {
        pub const FORCE: f32 = 100.0;
        pub const TORQUE: f32 = 80.0;
    }

    pub mod bump {
        use crate::sim::LinearPieceCurve;

        pub const COOLDOWN_TIME: f32 = 0.25;
        pub const MIN_FORWARD_DIST: f32 = 64.5;

        pub const VEL_AMOUNT_GROUND_CURVE: LinearPieceCurve<3> =
            LinearPieceCurve::new([(0.0, 5.0 / 6.0), (1400.0, 1100.0), (2200.0, 1530.0)]);
        pub const VEL_AMOUNT_AIR_CURVE: LinearPieceCurve<3> =
            LinearPieceCurve::new([(0.0, 5.0 / 6.0), (1400.0, 1390.0), (2200.0, 1945.0)]);
        pub const UPWARD_VEL_AMOUNT_CURVE: LinearPieceCurve<3> =
            LinearPieceCurve::new([(0.0, 0.0), (1400.0, 278.0), (2200.0, 417.0)]);
    }

    pub mod spawn {
        use crate::GameMode;
        use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

        pub const SPAWN_Z: f32 = 17.0;
        pub const RESPAWN_Z: f32 = 36.0;
        pub const RESPAWN_TIME: f32 = 3.0;

        #[derive(Clone, Copy, Debug, PartialEq)]
        pub struct CarSpawnPos {
            pub x: f32,
            pub y: f32,
            pub yaw_ang: f32,
        }

        impl CarSpawnPos {
            #[must_use]
            pub const fn new(x: f32, y: f32, yaw_ang: f32) -> Self {
                Self { x, y, yaw_ang }
            }
        }

        /// Kickoff locations for the blue team, orange mirrors them
        pub const LOCS_KICKOFF_SOCCAR: [CarSpawnPos; 5] = [
            CarSpawnPos::new(-2048.0, -2560.0, FRAC_PI_4),
            CarSpawnPos::new(2048.0, -2560.0, FRAC_PI_4 * 3.0),
            CarSpawnPos::new(-256.0, -3840.0, FRAC_PI_2),
            CarSpawnPos::new(256.0, -3840.0, FRAC_PI_2),
            CarSpawnPos::new(0.0, -4608.0, FRAC_PI_2),
        ];

        pub const LOCS_RESPAWN_SOCCAR: [CarSpawnPos; 4] = [
            CarSpawnPos::new(-2304.0, -4608.0, FRAC_PI_2),
            CarSpawnPos::new(-2688.0, -4608.0, FRAC_PI_2),
            CarSpawnPos::new(2304.0, -4608.0, FRAC_PI_2),
            CarSpawnPos::new(2688.0, -4608.0, FRAC_PI_2),
        ];

        pub const LOCS_KICKOFF_HOOPS: [CarSpawnPos; 5] = [
            CarSpawnPos::new(-1536.0, -3072.0, FRAC_PI_2),
            CarSpawnPos::new(1536.0, -3072.0, FRAC_PI_2),
            CarSpawnPos::new(-256.0, -2816.0, FRAC_PI_2),
            CarSpawnPos::new(256.0, -2816.0, FRAC_PI_2),
            CarSpawnPos::new(0.0, -3200.0, FRAC_PI_2),
        ];

        pub const LOCS_RESPAWN_HOOPS: [CarSpawnPos; 4] = [
            CarSpawnPos::new(-1920.0, -3072.0, FRAC_PI_2),
            CarSpawnPos::new(-1152.0, -3072.0, FRAC_PI_2),
            CarSpawnPos::new(1920.0, -3072.0, FRAC_PI_2),
            CarSpawnPos::new(1152.0, -3072.0, FRAC_PI_2),
        ];

        #[must_use]
        pub const fn get_kickoff_locations(game_mode: GameMode) -> &'static [CarSpawnPos] {
            match game_mode {
                GameMode::Hoops => &LOCS_KICKOFF_HOOPS,
                _ => &LOCS_KICKOFF_SOCCAR,
            }
        }

        #[must_use]
        pub const fn get_respawn_locations(game_mode: GameMode) -> &'static [CarSpawnPos] {
            match game_mode {
                GameMode::Hoops => &LOCS_RESPAWN_HOOPS,
                _ => &LOCS_RESPAWN_SOCCAR,
            }
        }
    }
}

pub mod bullet_vehicle {
    use super::UU_TO_BT;

    pub const SUSPENSION_STIFFNESS: f32 = 500.0;
    pub const WHEELS_DAMPING_COMPRESSION: f32 = 25.0;
    pub const WHEELS_DAMPING_RELAXATION: f32 = 40.0;
    /// Max suspension travel in either direction from the rest length
    pub const MAX_SUSPENSION_TRAVEL: f32 = 12.0;
    pub const SUSPENSION_SUBTRACTION: f32 = 0.05;
    pub const SUSPENSION_FORCE_SCALE_FRONT: f32 = 36.0 - (1.0 / 4.0);
    pub const SUSPENSION_FORCE_SCALE_BACK: f32 = 54.0 + (1.0 / 4.0) + (1.5 / 100.0);
    pub const ROLLING_FRICTION_SCALE: f32 = 113.73963;
    pub const MAX_SUSPENSION_TRAVEL_BT: f32 = MAX_SUSPENSION_TRAVEL * UU_TO_BT;
}

pub mod curves {
    use crate::sim::LinearPieceCurve;

    pub const STEER_ANGLE_FROM_SPEED: LinearPieceCurve<6> = LinearPieceCurve::new([
        (0.0, 0.53356),
        (500.0, 0.31930),
        (1000.0, 0.18203),
        (1500.0, 0.10570),
        (1750.0, 0.08507),
        (3000.0, 0.03454),
    ]);
    pub const STEER_ANGLE_FROM_SPEED_THREEWHEEL: LinearPieceCurve<2> =
        LinearPieceCurve::new([(0.0, 0.342_473), (2300.0, 0.034_837)]);

    pub const POWERSLIDE_STEER_ANGLE_FROM_SPEED: LinearPieceCurve<2> =
        LinearPieceCurve::new([(0.0, 0.39235), (2500.0, 0.12610)]);

    pub const DRIVE_SPEED_TORQUE_FACTOR: LinearPieceCurve<3> =
        LinearPieceCurve::new([(0.0, 1.0), (1400.0, 0.1), (1410.0, 0.0)]);

    pub const NON_STICKY_FRICTION_FACTOR: LinearPieceCurve<3> =
        LinearPieceCurve::new([(0.0, 0.1), (0.7075, 0.5), (1.0, 1.0)]);

    pub const LAT_FRICTION: LinearPieceCurve<2> = LinearPieceCurve::new([(0.0, 1.0), (1.0, 0.2)]);
    pub const LAT_FRICTION_THREEWHEEL: LinearPieceCurve<2> =
        LinearPieceCurve::new([(0.0, 0.3), (1.0, 0.25)]);

    pub const HANDBRAKE_LAT_FRICTION_FACTOR: f32 = 0.9;
    pub const HANDBRAKE_LONG_FRICTION_FACTOR: LinearPieceCurve<2> =
        LinearPieceCurve::new([(0.0, 0.5), (1.0, 0.9)]);
}

pub mod boost_pads {
    use glam::Vec3A;

    pub const CYL_HEIGHT: f32 = 95.0;
    pub const CYL_RAD_BIG: f32 = 208.0;
    pub const CYL_RAD_SMALL: f32 = 144.0;

    pub const BOX_HEIGHT: f32 = 64.0;
    pub const BOX_RAD_BIG: f32 = 160.0;
    pub const BOX_RAD_SMALL: f32 = 120.0;

    pub const COOLDOWN_BIG: f32 = 10.0;
    pub const COOLDOWN_SMALL: f32 = 4.0;

    pub const BOOST_AMOUNT_BIG: f32 = 100.0;
    pub const BOOST_AMOUNT_SMALL: f32 = 12.0;

    pub const LOCS_AMOUNT_BIG: usize = 6;
    pub const LOCS_AMOUNT_SMALL_SOCCAR: usize = 28;
    pub const LOCS_AMOUNT_SMALL_HOOPS: usize = 14;

    const BIG_Z: f32 = 73.0;
    const SMALL_Z: f32 = 70.0;

    pub const LOCS_BIG_SOCCAR: [Vec3A; LOCS_AMOUNT_BIG] = [
        Vec3A::new(-3584.0, 0.0, BIG_Z),
        Vec3A::new(3584.0, 0.0, BIG_Z),
        Vec3A::new(-3072.0, 4096.0, BIG_Z),
        Vec3A::new(3072.0, 4096.0, BIG_Z),
        Vec3A::new(-3072.0, -4096.0, BIG_Z),
        Vec3A::new(3072.0, -4096.0, BIG_Z),
    ];

    pub const LOCS_SMALL_SOCCAR: [Vec3A; LOCS_AMOUNT_SMALL_SOCCAR] = [
        Vec3A::new(0.0, -4240.0, SMALL_Z),
        Vec3A::new(-1792.0, -4184.0, SMALL_Z),
        Vec3A::new(1792.0, -4184.0, SMALL_Z),
        Vec3A::new(-940.0, -3308.0, SMALL_Z),
        Vec3A::new(940.0, -3308.0, SMALL_Z),
        Vec3A::new(0.0, -2816.0, SMALL_Z),
        Vec3A::new(-3584.0, -2484.0, SMALL_Z),
        Vec3A::new(3584.0, -2484.0, SMALL_Z),
        Vec3A::new(-1788.0, -2300.0, SMALL_Z),
        Vec3A::new(1788.0, -2300.0, SMALL_Z),
        Vec3A::new(-2048.0, -1036.0, SMALL_Z),
        Vec3A::new(0.0, -1024.0, SMALL_Z),
        Vec3A::new(2048.0, -1036.0, SMALL_Z),
        Vec3A::new(-1024.0, 0.0, SMALL_Z),
        Vec3A::new(1024.0, 0.0, SMALL_Z),
        Vec3A::new(-2048.0, 1036.0, SMALL_Z),
        Vec3A::new(0.0, 1024.0, SMALL_Z),
        Vec3A::new(2048.0, 1036.0, SMALL_Z),
        Vec3A::new(-1788.0, 2300.0, SMALL_Z),
        Vec3A::new(1788.0, 2300.0, SMALL_Z),
        Vec3A::new(-3584.0, 2484.0, SMALL_Z),
        Vec3A::new(3584.0, 2484.0, SMALL_Z),
        Vec3A::new(0.0, 2816.0, SMALL_Z),
        Vec3A::new(-940.0, 3310.0, SMALL_Z),
        Vec3A::new(940.0, 3308.0, SMALL_Z),
        Vec3A::new(-1792.0, 4184.0, SMALL_Z),
        Vec3A::new(1792.0, 4184.0, SMALL_Z),
        Vec3A::new(0.0, 4240.0, SMALL_Z),
    ];

    const BIG_Z_HOOPS: f32 = 72.0;
    const SMALL_Z_HOOPS: f32 = 64.0;

    pub const LOCS_BIG_HOOPS: [Vec3A; LOCS_AMOUNT_BIG] = [
        Vec3A::new(-2176.0, 2944.0, BIG_Z_HOOPS),
        Vec3A::new(2176.0, -2944.0, BIG_Z_HOOPS),
        Vec3A::new(-2176.0, -2944.0, BIG_Z_HOOPS),
        Vec3A::new(-2432.0, 0.0, BIG_Z_HOOPS),
        Vec3A::new(2432.0, 0.0, BIG_Z_HOOPS),
        Vec3A::new(2175.99, 2944.0, BIG_Z_HOOPS),
    ];

    pub const LOCS_SMALL_HOOPS: [Vec3A; LOCS_AMOUNT_SMALL_HOOPS] = [
        Vec3A::new(1536.0, -1024.0, SMALL_Z_HOOPS),
        Vec3A::new(-1280.0, -2304.0, SMALL_Z_HOOPS),
        Vec3A::new(0.0, -2816.0, SMALL_Z_HOOPS),
        Vec3A::new(-1536.0, -1024.0, SMALL_Z_HOOPS),
        Vec3A::new(1280.0, -2304.0, SMALL_Z_HOOPS),
        Vec3A::new(-512.0, 512.0, SMALL_Z_HOOPS),
        Vec3A::new(-1536.0, 1024.0, SMALL_Z_HOOPS),
        Vec3A::new(1536.0, 1024.0, SMALL_Z_HOOPS),
        Vec3A::new(1280.0, 2304.0, SMALL_Z_HOOPS),
        Vec3A::new(0.0, 2816.0, SMALL_Z_HOOPS),
        Vec3A::new(512.0, 512.0, SMALL_Z_HOOPS),
        Vec3A::new(512.0, -512.0, SMALL_Z_HOOPS),
        Vec3A::new(-512.0, -512.0, SMALL_Z_HOOPS),
        Vec3A::new(-1280.0, 2304.0, SMALL_Z_HOOPS),
    ];

    #[must_use]
    pub fn get_locations(game_mode: crate::GameMode) -> Vec<(Vec3A, bool)> {
        let (big, small): (&[Vec3A], &[Vec3A]) = match game_mode {
            crate::GameMode::Soccar => (&LOCS_BIG_SOCCAR, &LOCS_SMALL_SOCCAR),
            crate::GameMode::Hoops => (&LOCS_BIG_HOOPS, &LOCS_SMALL_HOOPS),
            crate::GameMode::TheVoid => (&[], &[]),
        };

        big.iter()
            .map(|&pos| (pos, true))
            .chain(small.iter().map(|&pos| (pos, false)))
            .collect()
    }
}

/// Max allowed angular velocity for any rigid body, before tick scaling
pub const MAX_ANG_VEL_PER_TICK: f32 = std::f32::consts::FRAC_PI_2;

#[must_use]
pub fn kickoff_ball_pos(game_mode: GameMode) -> Vec3A {
    Vec3A::new(0.0, 0.0, ball::get_radius(game_mode) + (ball::REST_Z - ball::RADIUS_SOCCAR))
}

