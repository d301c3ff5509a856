use crate::{BoostPadConfig, BoostPadState, MutatorConfig, consts::boost_pads, math::Vec3};

#[derive(Clone, Copy, Debug)]
pub(crate) struct BoostPad {
    pub config: BoostPadConfig,
    pub state: BoostPadState,
    pub cyl_radius: f32,
}

impl BoostPad {
    #[must_use]
    pub const fn new(config: BoostPadConfig) -> Self {
        let cyl_radius = if config.is_big {
            boost_pads::CYL_RAD_BIG
        } else {
            boost_pads::CYL_RAD_SMALL
        };

        Self {
            config,
            state: BoostPadState::DEFAULT,
            cyl_radius,
        }
    }

    /// Car origin inside the pickup cylinder
    #[must_use]
    pub fn is_overlapping(&self, car_pos: Vec3) -> bool {
        let dist_sq_2d = self
            .config
            .pos
            .truncate()
            .distance_squared(car_pos.truncate());

        dist_sq_2d < self.cyl_radius * self.cyl_radius
            && (car_pos.z - self.config.pos.z).abs() <= boost_pads::CYL_HEIGHT
    }

    /// A pad still cooling down is never picked up, whatever its active flag says
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state.is_active && self.state.cooldown == 0.0
    }

    /// Counts the cooldown down, the pad is active exactly when it reaches zero
    pub fn update_cooldown(&mut self, tick_time: f32) {
        if self.state.cooldown > 0.0 {
            self.state.cooldown = (self.state.cooldown - tick_time).max(0.0);
        }

        let was_active = self.state.is_active;
        self.state.is_active = self.state.cooldown == 0.0;
        if self.state.is_active && !was_active {
            self.state.prev_locked_car_id = self.state.cur_locked_car_id;
            self.state.cur_locked_car_id = 0;
        }
    }

    /// Gives `boost` to the car and deactivates the pad, returns the new boost amount
    pub fn pick_up(&mut self, car_id: u64, boost: f32, mutator_config: &MutatorConfig) -> f32 {
        self.state.is_active = false;
        self.state.cur_locked_car_id = car_id;
        self.state.cooldown = self.config.get_max_cooldown(mutator_config);

        (boost + self.config.get_boost_amount(mutator_config))
            .min(mutator_config.car_max_boost_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_reactivates_and_shifts_lock() {
        let mutator_config = MutatorConfig::default();
        let mut pad = BoostPad::new(BoostPadConfig::new(Vec3::new(0.0, 0.0, 70.0), false));

        let boost = pad.pick_up(7, 50.0, &mutator_config);
        assert_eq!(boost, 62.0);
        assert!(!pad.state.is_active);
        assert_eq!(pad.state.cur_locked_car_id, 7);
        assert_eq!(pad.state.cooldown, mutator_config.boost_pad_cooldown_small);

        pad.update_cooldown(3.0);
        assert!(!pad.state.is_active);

        pad.update_cooldown(1.5);
        assert!(pad.state.is_active);
        assert_eq!(pad.state.cooldown, 0.0);
        assert_eq!(pad.state.cur_locked_car_id, 0);
        assert_eq!(pad.state.prev_locked_car_id, 7);
    }

    #[test]
    fn active_flag_follows_the_cooldown() {
        let mut pad = BoostPad::new(BoostPadConfig::new(Vec3::new(0.0, 0.0, 70.0), false));
        pad.state.cooldown = 1.0;
        assert!(!pad.is_available());

        pad.update_cooldown(0.25);
        assert!(!pad.state.is_active);
        assert_eq!(pad.state.cooldown, 0.75);

        pad.update_cooldown(1.0);
        assert!(pad.is_available());

        pad.state.is_active = false;
        pad.update_cooldown(0.25);
        assert!(pad.state.is_active);
    }

    #[test]
    fn big_pad_fills_to_max() {
        let mutator_config = MutatorConfig::default();
        let mut pad = BoostPad::new(BoostPadConfig::new(Vec3::new(0.0, 0.0, 73.0), true));
        assert_eq!(pad.pick_up(1, 90.0, &mutator_config), 100.0);
    }

    #[test]
    fn overlap_uses_cylinder() {
        let pad = BoostPad::new(BoostPadConfig::new(Vec3::new(100.0, 0.0, 70.0), true));
        assert!(pad.is_overlapping(Vec3::new(100.0, 200.0, 17.0)));
        assert!(!pad.is_overlapping(Vec3::new(100.0, 210.0, 17.0)));
        assert!(!pad.is_overlapping(Vec3::new(100.0, 0.0, 170.0)));
    }
}
