use super::{
    contact::{resolve_single_bilateral, resolve_single_collision},
    geometry::ArenaGeometry,
    rigid_body::RigidBody,
};
use crate::consts::bullet_vehicle::{
    MAX_SUSPENSION_TRAVEL_BT, ROLLING_FRICTION_SCALE, SUSPENSION_STIFFNESS,
    SUSPENSION_SUBTRACTION, WHEELS_DAMPING_COMPRESSION, WHEELS_DAMPING_RELAXATION,
};
use arrayvec::ArrayVec;
use glam::{Affine3A, Mat3A, Quat, Vec3A};

pub const NUM_WHEELS: usize = 4;

/// Everything needed to mount one wheel onto a chassis, in body space and BT units
#[derive(Clone, Copy, Debug)]
pub struct WheelInfoConstructionInfo {
    pub chassis_connection_cs: Vec3A,
    pub wheel_direction_cs: Vec3A,
    pub wheel_axle_cs: Vec3A,
    pub suspension_rest_length: f32,
    pub wheel_radius: f32,
    pub suspension_force_scale: f32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RaycastInfo {
    pub contact_normal_ws: Vec3A,
    pub contact_point_ws: Vec3A,
    pub suspension_length: f32,
    pub hard_point_ws: Vec3A,
    pub wheel_direction_ws: Vec3A,
    pub wheel_axle_ws: Vec3A,
    pub is_in_contact: bool,
}

#[derive(Clone, Debug)]
pub struct WheelInfo {
    pub raycast_info: RaycastInfo,
    pub world_transform: Affine3A,
    pub chassis_connection_point_cs: Vec3A,
    pub wheel_direction_cs: Vec3A,
    pub wheel_axle_cs: Vec3A,
    pub suspension_rest_length: f32,
    pub max_suspension_travel: f32,
    pub wheels_radius: f32,
    pub suspension_stiffness: f32,
    pub wheels_damping_compression: f32,
    pub wheels_damping_relaxation: f32,
    pub engine_force: f32,
    pub brake: f32,
    pub clipped_inv_contact_dot_suspension: f32,
    pub suspension_relative_velocity: f32,
    pub wheels_suspension_force: f32,
    pub steer_angle: f32,
    pub vel_at_contact_point: Vec3A,
    pub lat_friction: f32,
    pub long_friction: f32,
    pub impulse: Vec3A,
    pub suspension_force_scale: f32,
    pub extra_pushback: f32,
}

impl WheelInfo {
    #[must_use]
    pub fn new(ci: WheelInfoConstructionInfo) -> Self {
        Self {
            raycast_info: RaycastInfo {
                suspension_length: ci.suspension_rest_length,
                ..Default::default()
            },
            world_transform: Affine3A::IDENTITY,
            chassis_connection_point_cs: ci.chassis_connection_cs,
            wheel_direction_cs: ci.wheel_direction_cs,
            wheel_axle_cs: ci.wheel_axle_cs,
            suspension_rest_length: ci.suspension_rest_length,
            max_suspension_travel: MAX_SUSPENSION_TRAVEL_BT,
            wheels_radius: ci.wheel_radius,
            suspension_stiffness: SUSPENSION_STIFFNESS,
            wheels_damping_compression: WHEELS_DAMPING_COMPRESSION,
            wheels_damping_relaxation: WHEELS_DAMPING_RELAXATION,
            engine_force: 0.0,
            brake: 0.0,
            clipped_inv_contact_dot_suspension: 1.0,
            suspension_relative_velocity: 0.0,
            wheels_suspension_force: 0.0,
            steer_angle: 0.0,
            vel_at_contact_point: Vec3A::ZERO,
            lat_friction: 0.0,
            long_friction: 0.0,
            impulse: Vec3A::ZERO,
            suspension_force_scale: ci.suspension_force_scale,
            extra_pushback: 0.0,
        }
    }

    fn update_wheel_transform_ws(&mut self, chassis_trans: &Affine3A) {
        self.raycast_info.is_in_contact = false;
        self.raycast_info.hard_point_ws =
            chassis_trans.transform_point3a(self.chassis_connection_point_cs);
        self.raycast_info.wheel_direction_ws = chassis_trans.matrix3 * self.wheel_direction_cs;
        self.raycast_info.wheel_axle_ws = chassis_trans.matrix3 * self.wheel_axle_cs;
    }

    fn update_wheel_transform(&mut self, chassis: &RigidBody) {
        self.update_wheel_transform_ws(chassis.get_world_transform());
        self.update_steering();
    }

    /// Rebuilds `world_transform` from the current steer angle, keeps the trace results
    pub fn update_steering(&mut self) {
        let up = -self.raycast_info.wheel_direction_ws;
        let right = self.raycast_info.wheel_axle_ws;
        let fwd = up.cross(right).normalize_or_zero();

        let steering_mat = Mat3A::from_quat(Quat::from_axis_angle(up.into(), self.steer_angle));
        let basis2 = Mat3A::from_cols(fwd, -right, up);

        self.world_transform = Affine3A {
            matrix3: steering_mat * basis2,
            translation: self.raycast_info.hard_point_ws
                + self.raycast_info.wheel_direction_ws * self.raycast_info.suspension_length,
        };
    }

    fn ray_cast(&mut self, chassis: &RigidBody, geometry: &ArenaGeometry, time_step: f32) {
        self.update_wheel_transform_ws(chassis.get_world_transform());

        let suspension_travel = self.max_suspension_travel;
        let real_ray_length = self.suspension_rest_length + suspension_travel + self.wheels_radius
            - SUSPENSION_SUBTRACTION;

        let source = self.raycast_info.hard_point_ws;
        let target = source + self.raycast_info.wheel_direction_ws * real_ray_length;
        self.raycast_info.contact_point_ws = target;

        let Some(hit) = geometry.ray_cast(source, target) else {
            self.raycast_info.suspension_length = self.suspension_rest_length + suspension_travel;
            self.suspension_relative_velocity = 0.0;
            self.raycast_info.contact_normal_ws = -self.raycast_info.wheel_direction_ws;
            self.clipped_inv_contact_dot_suspension = 1.0;
            self.extra_pushback = 0.0;
            return;
        };

        self.raycast_info.contact_point_ws = hit.point;
        self.raycast_info.contact_normal_ws = hit.normal;
        self.raycast_info.is_in_contact = true;

        let up = chassis.get_up_vector();
        let wheel_trace_len = (self.raycast_info.hard_point_ws - hit.point).dot(up);

        let min_suspension_len = self.suspension_rest_length - suspension_travel;
        let max_suspension_len = self.suspension_rest_length + suspension_travel;
        self.raycast_info.suspension_length =
            (wheel_trace_len - self.wheels_radius).clamp(min_suspension_len, max_suspension_len);

        let rel_pos = hit.point - chassis.get_world_transform().translation;
        self.vel_at_contact_point = chassis.get_velocity_in_local_point(rel_pos);

        let proj_vel = hit.normal.dot(self.vel_at_contact_point);
        let denom = hit.normal.dot(up);

        if denom > 0.1 {
            let inv = 1.0 / denom;
            self.suspension_relative_velocity = proj_vel * inv;
            self.clipped_inv_contact_dot_suspension = inv;
        } else {
            self.suspension_relative_velocity = 0.0;
            self.clipped_inv_contact_dot_suspension = 10.0;
        }

        let ray_pushback_thresh =
            self.suspension_rest_length + self.wheels_radius - SUSPENSION_SUBTRACTION;
        self.extra_pushback = if wheel_trace_len < ray_pushback_thresh {
            let collision_result = resolve_single_collision(
                chassis,
                None,
                hit.point,
                hit.normal,
                time_step,
                wheel_trace_len - ray_pushback_thresh,
            );

            collision_result / NUM_WHEELS as f32
        } else {
            0.0
        };
    }

    fn calc_friction_impulses(&mut self, chassis: &RigidBody, friction_scale: f32, time_step: f32) {
        if !self.raycast_info.is_in_contact {
            self.impulse = Vec3A::ZERO;
            return;
        }

        let surf_normal_ws = self.raycast_info.contact_normal_ws;
        let mut axle_dir = self.world_transform.matrix3.y_axis;
        axle_dir -= surf_normal_ws * axle_dir.dot(surf_normal_ws);
        axle_dir = axle_dir.normalize_or_zero();

        let forward_dir = surf_normal_ws.cross(axle_dir).normalize_or_zero();

        let contact_point = self.raycast_info.contact_point_ws;
        let side_impulse = resolve_single_bilateral(chassis, None, contact_point, axle_dir);

        let rolling_friction = if self.engine_force != 0.0 {
            -self.engine_force / friction_scale
        } else if self.brake != 0.0 {
            let rel_contact_point = contact_point - chassis.get_world_transform().translation;
            let contact_vel = chassis.get_velocity_in_local_point(rel_contact_point);
            let mut rel_vel = contact_vel.dot(forward_dir);

            if time_step > 1.0 / 80.0 {
                let threshold = 0.8 - (1.0 / (time_step * 150.0));
                if rel_vel.abs() < threshold {
                    rel_vel = 0.0;
                }
            }

            (-rel_vel * ROLLING_FRICTION_SCALE).clamp(-self.brake, self.brake)
        } else {
            0.0
        };

        let total_friction_force = forward_dir * rolling_friction * self.long_friction
            + axle_dir * side_impulse * self.lat_friction;
        self.impulse = total_friction_force * friction_scale;
    }

    fn update_suspension(&mut self, chassis: &mut RigidBody, time_step: f32) {
        if !self.raycast_info.is_in_contact {
            self.wheels_suspension_force = 0.0;
            return;
        }

        let force = (self.suspension_rest_length - self.raycast_info.suspension_length)
            * self.suspension_stiffness
            * self.clipped_inv_contact_dot_suspension;
        let damping_vel_scale = if self.suspension_relative_velocity < 0.0 {
            self.wheels_damping_compression
        } else {
            self.wheels_damping_relaxation
        };

        self.wheels_suspension_force = ((force
            - damping_vel_scale * self.suspension_relative_velocity)
            * self.suspension_force_scale)
            .max(0.0);

        if self.wheels_suspension_force == 0.0 {
            return;
        }

        let contact_point_offset =
            self.raycast_info.contact_point_ws - chassis.get_world_transform().translation;
        let base_force_scale = self.wheels_suspension_force * time_step + self.extra_pushback;
        chassis.apply_impulse(
            self.raycast_info.contact_normal_ws * base_force_scale,
            contact_point_offset,
        );
    }

    fn apply_friction_impulses(&self, chassis: &mut RigidBody, time_step: f32) {
        if self.impulse == Vec3A::ZERO {
            return;
        }

        let trans = chassis.get_world_transform();
        let wheel_contact_offset = self.raycast_info.contact_point_ws - trans.translation;
        let contact_up_dot = trans.matrix3.z_axis.dot(wheel_contact_offset);
        let wheel_rel_pos = wheel_contact_offset - trans.matrix3.z_axis * contact_up_dot;
        chassis.apply_impulse(self.impulse * time_step, wheel_rel_pos);
    }
}

/// Raycast vehicle: four suspension rays against the static arena with tire friction
#[derive(Clone, Debug, Default)]
pub struct Vehicle {
    pub wheels: ArrayVec<WheelInfo, NUM_WHEELS>,
}

impl Vehicle {
    pub fn add_wheel(&mut self, chassis: &RigidBody, ci: WheelInfoConstructionInfo) {
        let mut wheel = WheelInfo::new(ci);
        wheel.update_wheel_transform(chassis);
        self.wheels.push(wheel);
    }

    #[must_use]
    pub fn get_num_wheels(&self) -> usize {
        self.wheels.len()
    }

    #[must_use]
    pub fn get_upwards_dir_from_wheel_contacts(&self, chassis: &RigidBody) -> Vec3A {
        let sum_contact_dir: Vec3A = self
            .wheels
            .iter()
            .filter(|wheel| wheel.raycast_info.is_in_contact)
            .map(|wheel| wheel.raycast_info.contact_normal_ws)
            .sum();

        if sum_contact_dir == Vec3A::ZERO {
            chassis.get_up_vector()
        } else {
            sum_contact_dir.normalize_or_zero()
        }
    }

    /// Wheel transforms and suspension traces. Nothing is applied to the chassis yet.
    pub fn update_vehicle_first(
        &mut self,
        chassis: &RigidBody,
        geometry: &ArenaGeometry,
        time_step: f32,
    ) {
        for wheel in &mut self.wheels {
            wheel.update_wheel_transform(chassis);
            wheel.ray_cast(chassis, geometry, time_step);
        }
    }

    /// Suspension impulses, then tire friction from the engine, brake and friction
    /// values set since `update_vehicle_first`
    pub fn update_vehicle_second(&mut self, chassis: &mut RigidBody, time_step: f32) {
        for wheel in &mut self.wheels {
            wheel.update_suspension(chassis, time_step);
        }

        // all suspension forces go in before any friction impulse
        let friction_scale = chassis.get_mass() / 3.0;
        for wheel in &mut self.wheels {
            wheel.update_steering();
            wheel.calc_friction_impulses(chassis, friction_scale, time_step);
        }

        for wheel in &self.wheels {
            wheel.apply_friction_impulses(chassis, time_step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        GameMode,
        consts::UU_TO_BT,
        physics::rigid_body::{BodyShape, RigidBodyConstructionInfo},
    };

    fn chassis_at(z_uu: f32) -> RigidBody {
        let mut info = RigidBodyConstructionInfo::new(
            180.0,
            BodyShape::Box {
                half_extents: Vec3A::new(1.2, 0.85, 0.36),
                offset: Vec3A::ZERO,
            },
        );
        info.start_world_transform =
            Affine3A::from_translation(glam::Vec3::new(0.0, 0.0, z_uu * UU_TO_BT));
        RigidBody::new(info)
    }

    fn vehicle_for(chassis: &RigidBody) -> Vehicle {
        let mut vehicle = Vehicle::default();
        for i in 0..NUM_WHEELS {
            let x = if i < 2 { 51.0 } else { -34.0 };
            let y = if i % 2 == 0 { 26.0 } else { -26.0 };
            vehicle.add_wheel(
                chassis,
                WheelInfoConstructionInfo {
                    chassis_connection_cs: Vec3A::new(x, y, 15.0) * UU_TO_BT,
                    wheel_direction_cs: Vec3A::NEG_Z,
                    wheel_axle_cs: Vec3A::NEG_Y,
                    suspension_rest_length: (38.75 - 12.0) * UU_TO_BT,
                    wheel_radius: 12.5 * UU_TO_BT,
                    suspension_force_scale: 40.0,
                },
            );
        }
        vehicle
    }

    #[test]
    fn grounded_wheels_push_the_chassis_up() {
        let geometry = ArenaGeometry::new(GameMode::Soccar);
        let mut chassis = chassis_at(17.0);
        let mut vehicle = vehicle_for(&chassis);

        vehicle.update_vehicle_first(&chassis, &geometry, 1.0 / 120.0);
        assert!(vehicle.wheels.iter().all(|w| w.raycast_info.is_in_contact));

        let up = vehicle.get_upwards_dir_from_wheel_contacts(&chassis);
        assert!(up.abs_diff_eq(Vec3A::Z, 1e-5));

        vehicle.update_vehicle_second(&mut chassis, 1.0 / 120.0);
        assert!(chassis.linear_velocity.z > 0.0);
    }

    #[test]
    fn airborne_wheels_do_nothing() {
        let geometry = ArenaGeometry::new(GameMode::Soccar);
        let mut chassis = chassis_at(500.0);
        let mut vehicle = vehicle_for(&chassis);

        vehicle.update_vehicle_first(&chassis, &geometry, 1.0 / 120.0);
        vehicle.update_vehicle_second(&mut chassis, 1.0 / 120.0);

        assert!(vehicle.wheels.iter().all(|w| !w.raycast_info.is_in_contact));
        assert_eq!(chassis.linear_velocity, Vec3A::ZERO);
        assert_eq!(chassis.angular_velocity, Vec3A::ZERO);
    }

    #[test]
    fn engine_force_drives_forward() {
        let geometry = ArenaGeometry::new(GameMode::Soccar);
        let mut chassis = chassis_at(17.0);
        let mut vehicle = vehicle_for(&chassis);

        for wheel in &mut vehicle.wheels {
            wheel.engine_force = 100.0;
            wheel.long_friction = 1.0;
            wheel.lat_friction = 1.0;
        }

        vehicle.update_vehicle_first(&chassis, &geometry, 1.0 / 120.0);
        vehicle.update_vehicle_second(&mut chassis, 1.0 / 120.0);
        assert!(chassis.linear_velocity.x > 0.0);
    }
}
