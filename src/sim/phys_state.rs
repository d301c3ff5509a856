use std::fmt::Display;

use crate::math::{RotMat, Vec3};

/// Rigid body state in unreal units.
///
/// Has no `Default`, balls and cars start at different heights, see
/// `BallState::DEFAULT` and `CarState::DEFAULT`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysState {
    pub pos: Vec3,
    pub rot_mat: RotMat,
    pub vel: Vec3,
    pub ang_vel: Vec3,
}

impl PhysState {
    /// Mirrors the state onto the other half of the field
    #[must_use]
    pub fn get_inverted_y(mut self) -> Self {
        const INVERT_SCALE: Vec3 = Vec3::new(-1.0, -1.0, 1.0);

        self.pos *= INVERT_SCALE;
        self.vel *= INVERT_SCALE;
        self.ang_vel *= INVERT_SCALE;

        for i in 0..3 {
            *self.rot_mat.col_mut(i) *= INVERT_SCALE;
        }

        self
    }

    #[must_use]
    pub const fn get_forward_dir(&self) -> Vec3 {
        self.rot_mat.x_axis
    }

    #[must_use]
    pub const fn get_right_dir(&self) -> Vec3 {
        self.rot_mat.y_axis
    }

    #[must_use]
    pub const fn get_up_dir(&self) -> Vec3 {
        self.rot_mat.z_axis
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.pos.is_finite()
            && self.rot_mat.is_finite()
            && self.vel.is_finite()
            && self.ang_vel.is_finite()
    }
}

impl Display for PhysState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("PhysState {")?;
        f.write_fmt(format_args!("\n\tpos: {}", self.pos))?;
        f.write_fmt(format_args!("\n\trot_mat: {}", self.rot_mat))?;
        f.write_fmt(format_args!("\n\tvel: {}", self.vel))?;
        f.write_fmt(format_args!("\n\tang_vel: {}", self.ang_vel))?;
        f.write_str("}")
    }
}
