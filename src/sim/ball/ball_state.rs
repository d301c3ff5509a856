use std::ops::{Deref, DerefMut};

use crate::{
    BallHitInfo, GameMode, PhysState, consts,
    math::{RotMat, Vec3},
};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BallState {
    pub phys: PhysState,
    /// Most recent car touch, cleared when the ball is reset for a kickoff
    pub last_hit: Option<BallHitInfo>,
}

impl Default for BallState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BallState {
    /// Resting at the center of a soccar field
    pub const DEFAULT: Self = Self {
        phys: PhysState {
            pos: Vec3::new(0.0, 0.0, consts::ball::REST_Z),
            rot_mat: RotMat::IDENTITY,
            vel: Vec3::ZERO,
            ang_vel: Vec3::ZERO,
        },
        last_hit: None,
    };

    /// Kickoff state for a game mode, which accounts for the ball radius
    #[must_use]
    pub fn kickoff(game_mode: GameMode) -> Self {
        let mut state = Self::DEFAULT;
        state.phys.pos = consts::kickoff_ball_pos(game_mode);
        state
    }
}

impl Deref for BallState {
    type Target = PhysState;
    fn deref(&self) -> &Self::Target {
        &self.phys
    }
}

impl DerefMut for BallState {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.phys
    }
}
