use crate::GameMode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArenaError>;

/// Every way an arena operation can be rejected.
/// A rejected operation never leaves the arena partially modified.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ArenaError {
    #[error("no car with id {0} exists in this arena")]
    UnknownCar(u64),
    #[error("boost pad index {index} is out of range (arena has {num_pads} pads)")]
    PadIndexOutOfRange { index: usize, num_pads: usize },
    #[error("tick rate must be between 15 and 120 ticks per second, got {0}")]
    InvalidTickRate(f32),
    #[error("boost pad cooldown must be non-negative and finite, got {0}")]
    InvalidCooldown(f32),
    #[error("{0} contains a non-finite value")]
    NonFinite(&'static str),
    #[error("rotation matrix is degenerate and cannot be orthonormalized")]
    DegenerateRotation,
    #[error("game state has {got} boost pads, arena has {expected}")]
    PadCountMismatch { expected: usize, got: usize },
    #[error("game state is for {got:?}, arena is {expected:?}")]
    GameModeMismatch { expected: GameMode, got: GameMode },
    #[error("invalid mutator config: {0}")]
    InvalidMutatorConfig(&'static str),
    #[error("failed to decode game state: {0}")]
    Decode(String),
}
