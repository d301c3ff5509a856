use super::transform_util::{integrate_transform, integrate_transform_no_rot};
use crate::sim::UserInfoTypes;
use glam::{Affine3A, Mat3A, Vec3A};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodyShape {
    Sphere {
        radius: f32,
    },
    /// Box centered at `offset` in body space
    Box {
        half_extents: Vec3A,
        offset: Vec3A,
    },
}

impl BodyShape {
    #[must_use]
    pub fn calculate_local_inertia(&self, mass: f32) -> Vec3A {
        match *self {
            Self::Sphere { radius } => Vec3A::splat(0.4 * mass * radius * radius),
            Self::Box { half_extents, .. } => {
                let l = half_extents * 2.0;
                let l2 = l * l;
                mass / 12.0 * Vec3A::new(l2.y + l2.z, l2.x + l2.z, l2.x + l2.y)
            }
        }
    }
}

pub struct RigidBodyConstructionInfo {
    pub mass: f32,
    pub start_world_transform: Affine3A,
    pub shape: BodyShape,
    pub local_inertia: Vec3A,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl RigidBodyConstructionInfo {
    #[must_use]
    pub fn new(mass: f32, shape: BodyShape) -> Self {
        Self {
            mass,
            local_inertia: shape.calculate_local_inertia(mass),
            shape,
            start_world_transform: Affine3A::IDENTITY,
            linear_damping: 0.0,
            angular_damping: 0.0,
            friction: 0.5,
            restitution: 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RigidBody {
    world_transform: Affine3A,
    pub shape: BodyShape,
    pub user_index: UserInfoTypes,
    /// Id of the owning object, only meaningful for cars
    pub user_pointer: u64,
    pub inv_inertia_tensor_world: Mat3A,
    pub linear_velocity: Vec3A,
    pub angular_velocity: Vec3A,
    pub inverse_mass: f32,
    pub inv_inertia_local: Vec3A,
    pub gravity: Vec3A,
    pub total_force: Vec3A,
    pub total_torque: Vec3A,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub friction: f32,
    pub restitution: f32,
    pub push_velocity: Vec3A,
    pub turn_velocity: Vec3A,
    /// Skips orientation integration, the body keeps its current rotation
    pub no_rot: bool,
    /// Disabled bodies are neither integrated nor collided
    pub enabled: bool,
}

impl RigidBody {
    #[must_use]
    pub fn new(info: RigidBodyConstructionInfo) -> Self {
        let inverse_mass = if info.mass == 0.0 {
            0.0
        } else {
            1.0 / info.mass
        };

        let inv_inertia_local = Vec3A::select(
            info.local_inertia.cmpeq(Vec3A::ZERO),
            Vec3A::ZERO,
            1.0 / info.local_inertia,
        );

        Self {
            world_transform: info.start_world_transform,
            shape: info.shape,
            user_index: UserInfoTypes::None,
            user_pointer: 0,
            inv_inertia_tensor_world: Self::get_inertia_tensor(
                info.start_world_transform.matrix3,
                inv_inertia_local,
            ),
            linear_velocity: Vec3A::ZERO,
            angular_velocity: Vec3A::ZERO,
            inverse_mass,
            inv_inertia_local,
            gravity: Vec3A::ZERO,
            total_force: Vec3A::ZERO,
            total_torque: Vec3A::ZERO,
            linear_damping: info.linear_damping.clamp(0.0, 1.0),
            angular_damping: info.angular_damping.clamp(0.0, 1.0),
            friction: info.friction,
            restitution: info.restitution,
            push_velocity: Vec3A::ZERO,
            turn_velocity: Vec3A::ZERO,
            no_rot: false,
            enabled: true,
        }
    }

    fn get_inertia_tensor(world_mat: Mat3A, diag: Vec3A) -> Mat3A {
        let mut scaled_mat = world_mat.transpose();
        scaled_mat.x_axis *= diag;
        scaled_mat.y_axis *= diag;
        scaled_mat.z_axis *= diag;

        world_mat * scaled_mat
    }

    #[inline]
    #[must_use]
    pub const fn get_world_transform(&self) -> &Affine3A {
        &self.world_transform
    }

    pub fn set_world_transform(&mut self, trans: Affine3A) {
        self.world_transform = trans;
        self.update_inertia_tensor();
    }

    /// Replaces the shape and mass, gravity must be set again afterwards
    pub fn set_mass_props(&mut self, mass: f32, shape: BodyShape) {
        let local_inertia = shape.calculate_local_inertia(mass);
        self.shape = shape;
        self.inverse_mass = if mass == 0.0 { 0.0 } else { 1.0 / mass };
        self.inv_inertia_local = Vec3A::select(
            local_inertia.cmpeq(Vec3A::ZERO),
            Vec3A::ZERO,
            1.0 / local_inertia,
        );
        self.update_inertia_tensor();
    }

    pub fn set_gravity(&mut self, acceleration: Vec3A) {
        if self.inverse_mass != 0.0 {
            self.gravity = acceleration * (1.0 / self.inverse_mass);
        }
    }

    pub fn update_inertia_tensor(&mut self) {
        self.inv_inertia_tensor_world =
            Self::get_inertia_tensor(self.world_transform.matrix3, self.inv_inertia_local);
    }

    /// World space inertia tensor, the inverse of `inv_inertia_tensor_world`
    #[must_use]
    pub fn get_inertia_tensor_world(&self) -> Mat3A {
        let local = Vec3A::select(
            self.inv_inertia_local.cmpeq(Vec3A::ZERO),
            Vec3A::ZERO,
            1.0 / self.inv_inertia_local,
        );
        Self::get_inertia_tensor(self.world_transform.matrix3, local)
    }

    #[must_use]
    pub fn get_mass(&self) -> f32 {
        if self.inverse_mass == 0.0 {
            0.0
        } else {
            1.0 / self.inverse_mass
        }
    }

    #[inline]
    #[must_use]
    pub const fn get_up_vector(&self) -> Vec3A {
        self.world_transform.matrix3.z_axis
    }

    #[inline]
    #[must_use]
    pub fn get_forward_speed(&self) -> f32 {
        self.world_transform.matrix3.x_axis.dot(self.linear_velocity)
    }

    #[inline]
    #[must_use]
    pub fn get_velocity_in_local_point(&self, rel_pos: Vec3A) -> Vec3A {
        self.linear_velocity + self.angular_velocity.cross(rel_pos)
    }

    #[inline]
    #[must_use]
    pub fn get_push_velocity_in_local_point(&self, rel_pos: Vec3A) -> Vec3A {
        self.push_velocity + self.turn_velocity.cross(rel_pos)
    }

    #[must_use]
    pub fn compute_impulse_denominator(&self, pos: Vec3A, normal: Vec3A) -> f32 {
        let r0 = pos - self.world_transform.translation;
        let c0 = r0.cross(normal);
        let vec = (self.inv_inertia_tensor_world * c0).cross(r0);
        self.inverse_mass + normal.dot(vec)
    }

    pub fn apply_torque_impulse(&mut self, torque: Vec3A) {
        debug_assert!(!torque.is_nan());
        self.angular_velocity += self.inv_inertia_tensor_world * torque;
    }

    pub fn apply_impulse(&mut self, impulse: Vec3A, rel_pos: Vec3A) {
        if self.inverse_mass == 0.0 {
            return;
        }

        self.apply_central_impulse(impulse);
        self.apply_torque_impulse(rel_pos.cross(impulse));
    }

    pub fn apply_push_impulse(&mut self, impulse: Vec3A, rel_pos: Vec3A) {
        if self.inverse_mass == 0.0 {
            return;
        }

        self.push_velocity += impulse * self.inverse_mass;
        self.turn_velocity += self.inv_inertia_tensor_world * rel_pos.cross(impulse);
    }

    pub fn apply_torque(&mut self, torque: Vec3A) {
        debug_assert!(!torque.is_nan());
        self.total_torque += torque;
    }

    pub fn apply_central_impulse(&mut self, impulse: Vec3A) {
        debug_assert!(!impulse.is_nan());
        self.linear_velocity += impulse * self.inverse_mass;
    }

    pub fn apply_central_force(&mut self, force: Vec3A) {
        debug_assert!(!force.is_nan());
        self.total_force += force;
    }

    pub fn apply_gravity(&mut self) {
        if self.inverse_mass == 0.0 {
            return;
        }

        self.apply_central_force(self.gravity);
    }

    /// Adds the accumulated forces and torques onto the velocities
    pub fn integrate_velocities(&mut self, time_step: f32, max_ang_vel: f32) {
        if self.inverse_mass == 0.0 {
            return;
        }

        self.linear_velocity += self.total_force * (self.inverse_mass * time_step);
        self.angular_velocity += self.inv_inertia_tensor_world * self.total_torque * time_step;

        let ang_vel = self.angular_velocity.length();
        if ang_vel * time_step > max_ang_vel {
            self.angular_velocity *= (max_ang_vel / time_step) / ang_vel;
        }
    }

    pub fn apply_damping(&mut self, time_step: f32) {
        self.linear_velocity *= (1.0 - self.linear_damping).powf(time_step);
        self.angular_velocity *= (1.0 - self.angular_damping).powf(time_step);
    }

    #[must_use]
    pub fn predict_integration_transform(&self, time_step: f32) -> Affine3A {
        let lin_vel = self.linear_velocity + self.push_velocity;
        if self.no_rot {
            integrate_transform_no_rot(&self.world_transform, lin_vel, time_step)
        } else {
            integrate_transform(
                &self.world_transform,
                lin_vel,
                self.angular_velocity + self.turn_velocity,
                time_step,
            )
        }
    }

    pub fn integrate_transform(&mut self, time_step: f32) {
        let trans = self.predict_integration_transform(time_step);
        self.set_world_transform(trans);
        self.push_velocity = Vec3A::ZERO;
        self.turn_velocity = Vec3A::ZERO;
    }

    pub const fn clear_forces(&mut self) {
        self.total_force = Vec3A::ZERO;
        self.total_torque = Vec3A::ZERO;
    }

    /// World space corners of a box shaped body
    #[must_use]
    pub fn get_box_corners(&self) -> Option<[Vec3A; 8]> {
        let BodyShape::Box {
            half_extents,
            offset,
        } = self.shape
        else {
            return None;
        };

        Some(std::array::from_fn(|i| {
            let sign = Vec3A::new(
                if i & 1 == 0 { -1.0 } else { 1.0 },
                if i & 2 == 0 { -1.0 } else { 1.0 },
                if i & 4 == 0 { -1.0 } else { 1.0 },
            );
            self.world_transform
                .transform_point3a(offset + half_extents * sign)
        }))
    }
}
