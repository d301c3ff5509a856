use std::ops::{Deref, DerefMut};

use crate::{
    BallHitInfo, CarControls, PhysState,
    consts::car as car_consts,
    math::{RotMat, Vec3},
};

/// Recent bump between two cars, blocks repeat bumps until the timer runs out
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarContact {
    pub other_car_id: u64,
    pub cooldown_timer: f32,
}

/// Dynamic state of one car, in unreal units
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarState {
    pub phys: PhysState,
    /// Applied every tick until replaced
    pub controls: CarControls,
    /// `controls` as of the end of the last tick, edge detection for jump
    pub prev_controls: CarControls,
    /// At least three wheels touch something
    pub is_on_ground: bool,
    /// Front right, front left, back right, back left
    pub wheels_with_contact: [bool; 4],
    /// The car left the ground through a jump.
    ///
    /// Stays false after a flip reset.
    pub has_jumped: bool,
    pub has_double_jumped: bool,
    /// Set from the start of a flip until landing
    pub has_flipped: bool,
    /// Car-local torque axis of the current flip, positive y flips forward
    pub flip_rel_torque: Vec3,
    pub jump_time: f32,
    pub flip_time: f32,
    pub is_flipping: bool,
    pub is_jumping: bool,
    pub air_time: f32,
    /// Zero until the first jump ends
    pub air_time_since_jump: f32,
    /// 0..=100 with the default mutators
    pub boost: f32,
    /// Seconds, drives boost recharge
    pub time_since_boosted: f32,
    pub is_boosting: bool,
    /// Boosting lasts at least `consts::car::boost::MIN_TIME`
    pub boosting_time: f32,
    pub is_supersonic: bool,
    pub supersonic_time: f32,
    /// Smoothed handbrake input
    pub handbrake_val: f32,
    pub is_auto_flipping: bool,
    pub auto_flip_timer: f32,
    pub auto_flip_torque_scale: f32,
    /// Normal of the last static surface the hitbox touched this tick
    pub world_contact_normal: Option<Vec3>,
    pub car_contact: Option<CarContact>,
    pub is_demoed: bool,
    /// Seconds until a demoed car respawns
    pub demo_respawn_timer: f32,
    /// Last time this car touched the ball
    pub ball_hit_info: Option<BallHitInfo>,
}

impl Default for CarState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CarState {
    pub const DEFAULT: Self = Self {
        phys: PhysState {
            pos: Vec3::new(0.0, 0.0, car_consts::spawn::SPAWN_Z),
            rot_mat: RotMat::IDENTITY,
            vel: Vec3::ZERO,
            ang_vel: Vec3::ZERO,
        },
        controls: CarControls::DEFAULT,
        prev_controls: CarControls::DEFAULT,
        is_on_ground: true,
        wheels_with_contact: [false; 4],
        has_jumped: false,
        has_double_jumped: false,
        has_flipped: false,
        flip_rel_torque: Vec3::ZERO,
        jump_time: 0.0,
        flip_time: 0.0,
        is_flipping: false,
        is_jumping: false,
        air_time: 0.0,
        air_time_since_jump: 0.0,
        boost: car_consts::boost::SPAWN_AMOUNT,
        time_since_boosted: 0.0,
        is_boosting: false,
        boosting_time: 0.0,
        is_supersonic: false,
        supersonic_time: 0.0,
        handbrake_val: 0.0,
        is_auto_flipping: false,
        auto_flip_timer: 0.0,
        auto_flip_torque_scale: 0.0,
        world_contact_normal: None,
        car_contact: None,
        is_demoed: false,
        demo_respawn_timer: 0.0,
        ball_hit_info: None,
    };

    #[must_use]
    pub const fn has_flip_or_jump(&self) -> bool {
        self.is_on_ground
            || (!self.has_flipped
                && !self.has_double_jumped
                && self.air_time_since_jump < car_consts::jump::DOUBLEJUMP_MAX_DELAY)
    }

    #[must_use]
    pub const fn has_flip_reset(&self) -> bool {
        !self.is_on_ground && self.has_flip_or_jump() && !self.has_jumped
    }

    #[must_use]
    pub const fn got_flip_reset(&self) -> bool {
        !self.is_on_ground && !self.has_jumped
    }

    /// Every float the simulation reads back is finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.phys.is_finite()
            && self.controls.is_finite()
            && self.prev_controls.is_finite()
            && self.flip_rel_torque.is_finite()
            && [
                self.jump_time,
                self.flip_time,
                self.air_time,
                self.air_time_since_jump,
                self.boost,
                self.time_since_boosted,
                self.boosting_time,
                self.supersonic_time,
                self.handbrake_val,
                self.auto_flip_timer,
                self.auto_flip_torque_scale,
                self.demo_respawn_timer,
            ]
            .iter()
            .all(|x| x.is_finite())
            && self.world_contact_normal.is_none_or(|n| n.is_finite())
            && self.car_contact.is_none_or(|c| c.cooldown_timer.is_finite())
    }
}

impl Deref for CarState {
    type Target = PhysState;
    fn deref(&self) -> &Self::Target {
        &self.phys
    }
}

impl DerefMut for CarState {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.phys
    }
}
