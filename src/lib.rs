//! Deterministic fixed-timestep simulation of cars and a ball in an enclosed arena.

pub use glam;

pub mod consts;
pub mod math;
pub mod physics;

mod error;
mod logging;
mod sim;

pub use error::*;
pub use logging::init_logging;
pub use math::{Angle, RotMat, RotMatExt, Vec3};
pub use sim::*;
