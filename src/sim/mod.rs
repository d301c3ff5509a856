mod arena;
mod arena_config;
mod ball;
mod boost_pad;
mod car;
mod game_mode;
mod game_state;
mod linear_piece_curve;
mod mutator_config;
mod phys_state;
mod team;
mod user_info_types;

pub use arena::*;
pub use arena_config::*;
pub use ball::*;
pub use boost_pad::*;
pub use car::*;
pub use game_mode::*;
pub use game_state::*;
pub use linear_piece_curve::*;
pub use mutator_config::*;
pub use phys_state::*;
pub use team::*;
#[allow(clippy::redundant_pub_crate)]
pub(crate) use user_info_types::*;
