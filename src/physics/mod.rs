//! Rigid body dynamics used by the simulation, in bullet units (1 BT = 50 UU).

pub mod contact;
pub mod geometry;
pub mod obb;
pub mod rigid_body;
pub mod transform_util;
pub mod vehicle;
pub mod world;

pub use contact::ContactPoint;
pub use rigid_body::{BodyShape, RigidBody, RigidBodyConstructionInfo};
pub use vehicle::{Vehicle, WheelInfoConstructionInfo};
pub use world::{ContactAddedCallback, PhysicsWorld};
