use glam::{Mat3A, Vec3A};
use std::fmt::Display;

/// Position, velocity and direction vectors used throughout the engine
pub type Vec3 = Vec3A;

/// Rotation matrix with the columns `forward`, `right` and `up`
pub type RotMat = Mat3A;

/// Euler angles in radians
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Angle {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Angle {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    #[must_use]
    pub fn to_rot_mat(self) -> RotMat {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let (sr, cr) = self.roll.sin_cos();

        let forward = Vec3A::new(cp * cy, cp * sy, sp);
        let right = Vec3A::new(cy * sp * sr - cr * sy, sy * sp * sr + cr * cy, -cp * sr);
        let up = Vec3A::new(-cr * cy * sp - sr * sy, -cr * sy * sp + sr * cy, cp * cr);

        RotMat::from_cols(forward, right, up)
    }

    #[must_use]
    pub fn from_rot_mat(mat: RotMat) -> Self {
        let forward = mat.x_axis;
        let right = mat.y_axis;

        let pitch = forward.z.clamp(-1.0, 1.0).asin();
        let yaw = forward.y.atan2(forward.x);

        // Basis of the same heading with no roll applied
        let unrolled = Self::new(yaw, pitch, 0.0).to_rot_mat();
        let roll = (-right.dot(unrolled.z_axis)).atan2(right.dot(unrolled.y_axis));

        Self { yaw, pitch, roll }
    }

    /// Wraps every component into `[-PI, PI)`
    #[must_use]
    pub fn normalize_fix(self) -> Self {
        use std::f32::consts::{PI, TAU};

        let wrap = |ang: f32| (ang + PI).rem_euclid(TAU) - PI;
        Self::new(wrap(self.yaw), wrap(self.pitch), wrap(self.roll))
    }
}

impl Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "(YPR){}, {}, {}", self.yaw, self.pitch, self.roll)
    }
}

pub trait RotMatExt: Sized {
    fn from_basis(forward: Vec3A, right: Vec3A, up: Vec3A) -> Self;
    /// Euler angles in radians, pitch first
    fn from_angles(pitch: f32, yaw: f32, roll: f32) -> Self;
    fn forward(&self) -> Vec3A;
    fn right(&self) -> Vec3A;
    fn up(&self) -> Vec3A;
    fn is_orthonormal(&self, eps: f32) -> bool;
    /// Gram-Schmidt over `forward` then `right`, `up` is rebuilt from their cross product.
    /// Returns `None` when the input is degenerate or non-finite.
    fn orthonormalized(&self) -> Option<Self>;
}

impl RotMatExt for Mat3A {
    #[inline]
    fn from_basis(forward: Vec3A, right: Vec3A, up: Vec3A) -> Self {
        Self::from_cols(forward, right, up)
    }

    #[inline]
    fn from_angles(pitch: f32, yaw: f32, roll: f32) -> Self {
        Angle::new(yaw, pitch, roll).to_rot_mat()
    }

    #[inline]
    fn forward(&self) -> Vec3A {
        self.x_axis
    }

    #[inline]
    fn right(&self) -> Vec3A {
        self.y_axis
    }

    #[inline]
    fn up(&self) -> Vec3A {
        self.z_axis
    }

    fn is_orthonormal(&self, eps: f32) -> bool {
        let (f, r, u) = (self.x_axis, self.y_axis, self.z_axis);

        self.is_finite()
            && (f.length_squared() - 1.0).abs() <= eps
            && (r.length_squared() - 1.0).abs() <= eps
            && (u.length_squared() - 1.0).abs() <= eps
            && f.dot(r).abs() <= eps
            && f.dot(u).abs() <= eps
            && r.dot(u).abs() <= eps
            && f.cross(r).dot(u) > 0.0
    }

    fn orthonormalized(&self) -> Option<Self> {
        if !self.is_finite() {
            return None;
        }

        let forward = self.x_axis.try_normalize()?;
        let right = (self.y_axis - forward * forward.dot(self.y_axis)).try_normalize()?;
        let up = forward.cross(right);

        // Keep the caller's handedness intent, a flipped `up` means the basis was mirrored
        if up.dot(self.z_axis) < 0.0 && self.z_axis.length_squared() > f32::EPSILON {
            return None;
        }

        Some(Self::from_cols(forward, right, up))
    }
}
