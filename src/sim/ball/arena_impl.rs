use crate::{Arena, ArenaError, BallState, Result};

impl Arena {
    #[must_use]
    pub fn get_ball(&self) -> BallState {
        self.objects.ball.state
    }

    pub(crate) fn validate_ball_state(state: &BallState) -> Result<BallState> {
        if !state.phys.is_finite() {
            return Err(ArenaError::NonFinite("ball state"));
        }

        let mut state = *state;
        state.phys.rot_mat = Self::fix_rotation(state.rot_mat, "the ball")?;
        Ok(state)
    }

    /// Overwrites the ball, which also re-arms goal detection
    pub fn set_ball(&mut self, state: BallState) -> Result<()> {
        let state = Self::validate_ball_state(&state)?;

        let ball = &mut self.objects.ball;
        ball.set_state(&mut self.world.bodies_mut()[ball.rigid_body_idx], &state);
        self.goal_latched = false;
        Ok(())
    }
}
