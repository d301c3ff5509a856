#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoostPadState {
    pub is_active: bool,
    /// Seconds left until the pad is active again, 0 while active
    pub cooldown: f32,
    /// Id of the car that last picked this pad up, 0 if none
    pub cur_locked_car_id: u64,
    /// Id of the car that held the pad before it reactivated, 0 if none
    pub prev_locked_car_id: u64,
}

impl Default for BoostPadState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BoostPadState {
    pub const DEFAULT: Self = Self {
        is_active: true,
        cooldown: 0.0,
        cur_locked_car_id: 0,
        prev_locked_car_id: 0,
    };
}
