mod arena_impl;
mod ball_hit_info;
mod ball_state;
mod base;

pub use ball_hit_info::*;
pub use ball_state::*;
#[allow(clippy::redundant_pub_crate)]
pub(crate) use base::*;
