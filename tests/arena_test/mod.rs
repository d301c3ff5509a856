mod quick_controls;
mod setup;

pub mod ball_tests;
pub mod boost_pad_tests;
pub mod car_tests;
pub mod game_state_tests;

pub use quick_controls::*;
pub use setup::*;
