use crate::BoostPadConfig;

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArenaConfig {
    /// Ball rotation stays at identity, `ang_vel` is still simulated
    pub no_ball_rot: bool,
    pub use_custom_boost_pads: bool,
    /// Replaces the game mode's pad layout when `use_custom_boost_pads` is set
    pub custom_boost_pads: Vec<BoostPadConfig>,
    /// Seeds respawn and kickoff shuffling, `None` seeds from the OS
    pub rng_seed: Option<u64>,
    pub reset_ball_on_goal: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ArenaConfig {
    pub const DEFAULT: Self = Self {
        no_ball_rot: true,
        use_custom_boost_pads: false,
        custom_boost_pads: Vec::new(),
        rng_seed: None,
        reset_ball_on_goal: true,
    };
}
