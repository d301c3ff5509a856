use crate::math::Vec3;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BallHitInfo {
    pub car_id: u64,
    /// Contact point minus ball center
    pub relative_pos_on_ball: Vec3,
    pub ball_pos: Vec3,
    /// Scripted velocity on top of the collision response
    pub extra_hit_vel: Vec3,
    pub tick_count_when_hit: u64,
    /// The scripted impulse is skipped on the tick right after this one
    pub tick_count_when_extra_impulse_applied: u64,
}
