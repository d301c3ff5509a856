use crate::{MutatorConfig, math::Vec3};

/// Static description of a boost pad
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoostPadConfig {
    pub pos: Vec3,
    pub is_big: bool,
}

impl BoostPadConfig {
    #[must_use]
    pub const fn new(pos: Vec3, is_big: bool) -> Self {
        Self { pos, is_big }
    }

    pub(crate) const fn get_max_cooldown(&self, mutator_config: &MutatorConfig) -> f32 {
        if self.is_big {
            mutator_config.boost_pad_cooldown_big
        } else {
            mutator_config.boost_pad_cooldown_small
        }
    }

    pub(crate) const fn get_boost_amount(&self, mutator_config: &MutatorConfig) -> f32 {
        if self.is_big {
            mutator_config.boost_pad_amount_big
        } else {
            mutator_config.boost_pad_amount_small
        }
    }
}
