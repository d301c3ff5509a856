use glam::{Affine3A, Mat3A, Quat, Vec3A};
use std::f32::consts::FRAC_PI_4;

const ANGULAR_MOTION_THRESHOLD: f32 = FRAC_PI_4;

pub fn integrate_transform_no_rot(cur_trans: &Affine3A, lin_vel: Vec3A, time_step: f32) -> Affine3A {
    Affine3A {
        matrix3: cur_trans.matrix3,
        translation: cur_trans.translation + lin_vel * time_step,
    }
}

/// Advances `cur_trans` by one step of linear and angular velocity.
/// The rotation goes through a normalized quaternion, so the resulting basis stays orthonormal.
pub fn integrate_transform(
    cur_trans: &Affine3A,
    lin_vel: Vec3A,
    ang_vel: Vec3A,
    time_step: f32,
) -> Affine3A {
    let translation = cur_trans.translation + lin_vel * time_step;

    let mut angle = ang_vel.length();
    if angle * time_step > ANGULAR_MOTION_THRESHOLD {
        angle = ANGULAR_MOTION_THRESHOLD / time_step;
    }

    let axis = if angle < 0.001 {
        // Taylor expansion of the sinc function
        ang_vel * (0.5 * time_step - time_step * time_step * time_step * 0.020_833_334 * angle * angle)
    } else {
        ang_vel * ((0.5 * angle * time_step).sin() / angle)
    };

    let dorn = Quat::from_xyzw(axis.x, axis.y, axis.z, (angle * time_step * 0.5).cos());
    let orn0 = Quat::from_mat3a(&cur_trans.matrix3);
    let predicted_orn = (dorn * orn0).normalize();

    if !predicted_orn.is_finite() {
        return Affine3A {
            matrix3: cur_trans.matrix3,
            translation,
        };
    }

    Affine3A {
        matrix3: Mat3A::from_quat(predicted_orn),
        translation,
    }
}

/// Builds two unit vectors that together with `n` form an orthonormal basis
pub fn plane_space(n: Vec3A) -> (Vec3A, Vec3A) {
    if n.z.abs() > std::f32::consts::FRAC_1_SQRT_2 {
        // choose p in y-z plane
        let a = n.y * n.y + n.z * n.z;
        let k = 1.0 / a.sqrt();
        let p = Vec3A::new(0.0, -n.z * k, n.y * k);
        let q = Vec3A::new(a * k, -n.x * p.z, n.x * p.y);
        (p, q)
    } else {
        // choose p in x-y plane
        let a = n.x * n.x + n.y * n.y;
        let k = 1.0 / a.sqrt();
        let p = Vec3A::new(-n.y * k, n.x * k, 0.0);
        let q = Vec3A::new(-n.z * p.y, n.z * p.x, a * k);
        (p, q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_keeps_basis_orthonormal() {
        let mut trans = Affine3A::IDENTITY;
        let ang_vel = Vec3A::new(1.3, -4.0, 2.2);
        for _ in 0..1000 {
            trans = integrate_transform(&trans, Vec3A::ZERO, ang_vel, 1.0 / 120.0);
        }

        let m = trans.matrix3;
        assert!((m.x_axis.length() - 1.0).abs() < 1e-4);
        assert!((m.y_axis.length() - 1.0).abs() < 1e-4);
        assert!(m.x_axis.dot(m.y_axis).abs() < 1e-4);
        assert!(m.x_axis.cross(m.y_axis).dot(m.z_axis) > 0.999);
    }

    #[test]
    fn rotation_follows_angular_velocity() {
        // A quarter turn around Z over one second
        let ang_vel = Vec3A::new(0.0, 0.0, std::f32::consts::FRAC_PI_2);
        let mut trans = Affine3A::IDENTITY;
        for _ in 0..120 {
            trans = integrate_transform(&trans, Vec3A::X, ang_vel, 1.0 / 120.0);
        }

        assert!(trans.matrix3.x_axis.abs_diff_eq(Vec3A::Y, 1e-3));
        assert!(trans.translation.abs_diff_eq(Vec3A::X, 1e-4));
    }

    #[test]
    fn plane_space_is_orthonormal() {
        for n in [Vec3A::Z, Vec3A::X, Vec3A::new(0.3, -0.4, 0.8).normalize()] {
            let (p, q) = plane_space(n);
            assert!(p.dot(n).abs() < 1e-6);
            assert!(q.dot(n).abs() < 1e-6);
            assert!(p.dot(q).abs() < 1e-6);
            assert!((p.length() - 1.0).abs() < 1e-5);
            assert!((q.length() - 1.0).abs() < 1e-5);
        }
    }
}
