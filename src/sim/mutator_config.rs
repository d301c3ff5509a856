use crate::{
    ArenaError, GameMode, Result,
    consts::{self, UU_TO_BT},
    math::Vec3,
};

/// When a car-car contact demolishes instead of bumping
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DemoMode {
    /// Only a supersonic bumper hit demolishes
    #[default]
    Normal,
    /// Any bumper hit demolishes
    OnContact,
    Disabled,
}

/// Physics and gameplay tuning of an arena.
///
/// Masses are in bullet units, everything else is in unreal units.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MutatorConfig {
    pub gravity: Vec3,
    pub car_mass: f32,
    pub car_world_friction: f32,
    pub car_world_restitution: f32,
    pub ball_mass: f32,
    pub ball_max_speed: f32,
    pub ball_drag: f32,
    pub ball_world_friction: f32,
    pub ball_world_restitution: f32,
    pub jump_accel: f32,
    pub jump_immediate_force: f32,
    pub boost_accel_ground: f32,
    pub boost_accel_air: f32,
    pub boost_used_per_second: f32,
    pub respawn_delay: f32,
    pub bump_cooldown_time: f32,
    pub car_max_boost_amount: f32,
    pub car_spawn_boost_amount: f32,
    pub boost_pad_amount_small: f32,
    pub boost_pad_amount_big: f32,
    pub boost_pad_cooldown_big: f32,
    pub boost_pad_cooldown_small: f32,

    pub ball_hit_extra_force_scale: f32,
    pub bump_force_scale: f32,
    pub ball_radius: f32,
    pub unlimited_flips: bool,
    pub unlimited_double_jumps: bool,
    pub recharge_boost_enabled: bool,
    pub recharge_boost_per_second: f32,
    pub recharge_boost_delay: f32,
    pub demo_mode: DemoMode,
    pub enable_team_demos: bool,
    /// Only used by game modes with soccar goals
    pub goal_base_threshold_y: f32,
}

impl Default for MutatorConfig {
    fn default() -> Self {
        const { Self::new(GameMode::Soccar) }
    }
}

impl MutatorConfig {
    #[must_use]
    pub const fn new(game_mode: GameMode) -> Self {
        Self {
            gravity: Vec3::new(0., 0., consts::GRAVITY_Z),
            car_mass: consts::car::MASS_BT,
            car_world_friction: consts::car::HIT_WORLD_COEFS.friction,
            car_world_restitution: consts::car::HIT_WORLD_COEFS.restitution,
            ball_mass: consts::ball::MASS_BT,
            ball_max_speed: consts::ball::MAX_SPEED,
            ball_drag: consts::ball::DRAG,
            ball_world_friction: consts::ball::COEFS.friction,
            ball_world_restitution: consts::ball::COEFS.restitution,
            jump_accel: consts::car::jump::ACCEL,
            jump_immediate_force: consts::car::jump::IMMEDIATE_FORCE,
            boost_accel_ground: consts::car::boost::ACCEL_GROUND,
            boost_accel_air: consts::car::boost::ACCEL_AIR,
            boost_used_per_second: consts::car::boost::USED_PER_SECOND,
            respawn_delay: consts::car::spawn::RESPAWN_TIME,
            bump_cooldown_time: consts::car::bump::COOLDOWN_TIME,
            car_max_boost_amount: consts::car::boost::MAX,
            car_spawn_boost_amount: consts::car::boost::SPAWN_AMOUNT,
            boost_pad_amount_big: consts::boost_pads::BOOST_AMOUNT_BIG,
            boost_pad_amount_small: consts::boost_pads::BOOST_AMOUNT_SMALL,
            boost_pad_cooldown_big: consts::boost_pads::COOLDOWN_BIG,
            boost_pad_cooldown_small: consts::boost_pads::COOLDOWN_SMALL,
            ball_hit_extra_force_scale: 1.,
            bump_force_scale: 1.,
            ball_radius: consts::ball::get_radius(game_mode),
            unlimited_flips: false,
            unlimited_double_jumps: false,
            recharge_boost_enabled: false,
            recharge_boost_per_second: consts::car::boost::RECHARGE_PER_SECOND,
            recharge_boost_delay: consts::car::boost::RECHARGE_DELAY,
            demo_mode: DemoMode::Normal,
            enable_team_demos: false,
            goal_base_threshold_y: consts::goal::SOCCAR_GOAL_SCORE_BASE_THRESHOLD_Y,
        }
    }

    #[must_use]
    pub fn gravity_bt(&self) -> Vec3 {
        self.gravity * UU_TO_BT
    }

    /// Rejects values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            self.car_mass,
            self.car_world_friction,
            self.car_world_restitution,
            self.ball_mass,
            self.ball_max_speed,
            self.ball_drag,
            self.ball_world_friction,
            self.ball_world_restitution,
            self.jump_accel,
            self.jump_immediate_force,
            self.boost_accel_ground,
            self.boost_accel_air,
            self.boost_used_per_second,
            self.respawn_delay,
            self.bump_cooldown_time,
            self.car_max_boost_amount,
            self.car_spawn_boost_amount,
            self.boost_pad_amount_small,
            self.boost_pad_amount_big,
            self.boost_pad_cooldown_big,
            self.boost_pad_cooldown_small,
            self.ball_hit_extra_force_scale,
            self.bump_force_scale,
            self.ball_radius,
            self.recharge_boost_per_second,
            self.recharge_boost_delay,
            self.goal_base_threshold_y,
        ];

        if !self.gravity.is_finite() || scalars.iter().any(|x| !x.is_finite()) {
            return Err(ArenaError::NonFinite("mutator config"));
        }

        if self.car_mass <= 0.0 || self.ball_mass <= 0.0 {
            return Err(ArenaError::InvalidMutatorConfig("masses must be positive"));
        }

        if self.ball_radius <= 0.0 {
            return Err(ArenaError::InvalidMutatorConfig(
                "ball radius must be positive",
            ));
        }

        if !(0.0..=1.0).contains(&self.ball_drag) {
            return Err(ArenaError::InvalidMutatorConfig(
                "ball drag must be within [0, 1]",
            ));
        }

        if self.car_max_boost_amount < 0.0
            || !(0.0..=self.car_max_boost_amount).contains(&self.car_spawn_boost_amount)
        {
            return Err(ArenaError::InvalidMutatorConfig(
                "spawn boost must be within [0, max boost]",
            ));
        }

        if self.boost_pad_cooldown_big < 0.0 || self.boost_pad_cooldown_small < 0.0 {
            return Err(ArenaError::InvalidMutatorConfig(
                "boost pad cooldowns must be non-negative",
            ));
        }

        if self.respawn_delay < 0.0 || self.bump_cooldown_time < 0.0 {
            return Err(ArenaError::InvalidMutatorConfig(
                "timers must be non-negative",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_for_every_mode() {
        for game_mode in GameMode::ALL {
            assert_eq!(MutatorConfig::new(game_mode).validate(), Ok(()));
        }
    }

    #[test]
    fn hoops_uses_the_bigger_ball() {
        let soccar = MutatorConfig::new(GameMode::Soccar);
        let hoops = MutatorConfig::new(GameMode::Hoops);
        assert!(hoops.ball_radius > soccar.ball_radius);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = MutatorConfig::default();
        config.ball_mass = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ArenaError::InvalidMutatorConfig(_))
        ));

        let mut config = MutatorConfig::default();
        config.gravity.z = f32::NAN;
        assert_eq!(
            config.validate(),
            Err(ArenaError::NonFinite("mutator config"))
        );

        let mut config = MutatorConfig::default();
        config.car_spawn_boost_amount = 150.0;
        assert!(config.validate().is_err());
    }
}
