use crate::{Arena, ArenaError, BoostPadConfig, BoostPadState, Result};

impl Arena {
    #[must_use]
    pub fn num_pads(&self) -> usize {
        self.objects.boost_pads.len()
    }

    fn check_pad_idx(&self, index: usize) -> Result<()> {
        let num_pads = self.num_pads();
        if index < num_pads {
            Ok(())
        } else {
            Err(ArenaError::PadIndexOutOfRange { index, num_pads })
        }
    }

    pub(crate) fn validate_pad_state(state: &BoostPadState) -> Result<()> {
        if state.cooldown.is_finite() && state.cooldown >= 0.0 {
            Ok(())
        } else {
            Err(ArenaError::InvalidCooldown(state.cooldown))
        }
    }

    pub fn get_pad_static(&self, index: usize) -> Result<BoostPadConfig> {
        self.check_pad_idx(index)?;
        Ok(self.objects.boost_pads.pads()[index].config)
    }

    pub fn get_pad_state(&self, index: usize) -> Result<BoostPadState> {
        self.check_pad_idx(index)?;
        Ok(self.objects.boost_pads.pads()[index].state)
    }

    pub fn set_pad_state(&mut self, index: usize, state: BoostPadState) -> Result<()> {
        self.check_pad_idx(index)?;
        Self::validate_pad_state(&state)?;

        self.objects.boost_pads.pads_mut()[index].state = state;
        Ok(())
    }
}
