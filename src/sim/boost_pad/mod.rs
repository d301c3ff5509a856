mod arena_impl;
mod base;
mod boost_pad_config;
mod boost_pad_grid;
mod boost_pad_state;

#[allow(clippy::redundant_pub_crate)]
pub(crate) use base::*;
pub use boost_pad_config::*;
#[allow(clippy::redundant_pub_crate)]
pub(crate) use boost_pad_grid::*;
pub use boost_pad_state::*;
