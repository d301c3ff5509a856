use std::f32::consts::PI;

use fastrand::Rng;
use glam::Affine3A;

use crate::consts::{
    BT_TO_UU, UU_TO_BT, bullet_vehicle as vehicle_consts, car as car_consts,
    car::drive as drive_consts, curves,
};
use crate::{
    CarConfig, CarControls, CarState, GameMode, MutatorConfig, PhysState, Team,
    math::{Angle, RotMat, RotMatExt, Vec3},
    physics::{
        BodyShape, PhysicsWorld, RigidBody, RigidBodyConstructionInfo, Vehicle,
        WheelInfoConstructionInfo, geometry::ArenaGeometry,
    },
    sim::UserInfoTypes,
};

#[derive(Clone, Debug)]
pub struct Car {
    pub id: u64,
    pub team: Team,
    config: CarConfig,
    pub(crate) vehicle: Vehicle,
    pub(crate) rigid_body_idx: usize,
    /// Bump velocity in uu/s, applied after the world step
    pub(crate) velocity_impulse_cache: Vec3,
    pub(crate) state: CarState,
}

impl Car {
    pub(crate) fn new(
        id: u64,
        team: Team,
        world: &mut PhysicsWorld,
        mutator_config: &MutatorConfig,
        config: CarConfig,
    ) -> Self {
        let shape = BodyShape::Box {
            half_extents: config.hitbox_size * UU_TO_BT * 0.5,
            offset: config.hitbox_pos_offset * UU_TO_BT,
        };

        let mut info = RigidBodyConstructionInfo::new(mutator_config.car_mass, shape);
        info.friction = car_consts::BASE_COEFS.friction;
        info.restitution = car_consts::BASE_COEFS.restitution;
        info.start_world_transform = Affine3A::IDENTITY;

        let mut body = RigidBody::new(info);
        body.user_index = UserInfoTypes::Car;
        body.user_pointer = id;

        let rigid_body_idx = world.add_rigid_body(body);
        let rb = &world.bodies()[rigid_body_idx];

        let mut vehicle = Vehicle::default();

        let wheel_direction_cs = Vec3::new(0.0, 0.0, -1.0);
        let wheel_axle_cs = Vec3::new(0.0, -1.0, 0.0);

        for i in 0..4 {
            let front = i < 2;
            let left = i % 2 != 0;

            let wheels = if front {
                &config.front_wheels
            } else {
                &config.back_wheels
            };

            let mut wheel_ray_start_offset = wheels.connection_point_offset;
            let suspension_rest_length =
                wheels.suspension_rest_length - vehicle_consts::MAX_SUSPENSION_TRAVEL;

            if left {
                wheel_ray_start_offset.y *= -1.0;
            }

            vehicle.add_wheel(
                rb,
                WheelInfoConstructionInfo {
                    chassis_connection_cs: wheel_ray_start_offset * UU_TO_BT,
                    wheel_direction_cs,
                    wheel_axle_cs,
                    suspension_rest_length: suspension_rest_length * UU_TO_BT,
                    wheel_radius: wheels.wheel_radius * UU_TO_BT,
                    suspension_force_scale: if front {
                        vehicle_consts::SUSPENSION_FORCE_SCALE_FRONT
                    } else {
                        vehicle_consts::SUSPENSION_FORCE_SCALE_BACK
                    },
                },
            );
        }

        Self {
            id,
            team,
            config,
            rigid_body_idx,
            vehicle,
            velocity_impulse_cache: Vec3::ZERO,
            state: CarState {
                boost: mutator_config.car_spawn_boost_amount,
                ..CarState::DEFAULT
            },
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CarConfig {
        &self.config
    }

    #[must_use]
    pub const fn get_state(&self) -> &CarState {
        &self.state
    }

    pub(crate) const fn set_controls(&mut self, new_controls: CarControls) {
        self.state.controls = new_controls;
    }

    /// The arena passes the mutator's `respawn_delay`
    pub(crate) const fn demolish(&mut self, respawn_delay: f32) {
        self.state.is_demoed = true;
        self.state.demo_respawn_timer = respawn_delay;
    }

    /// Puts a demoed car back on a random respawn spot of its team
    pub(crate) fn respawn(
        &mut self,
        rb: &mut RigidBody,
        rng: &mut Rng,
        game_mode: GameMode,
        boost_amount: f32,
    ) {
        let respawn_locations = car_consts::spawn::get_respawn_locations(game_mode);
        let spawn_pos = respawn_locations[rng.usize(0..respawn_locations.len())];

        let yaw = spawn_pos.yaw_ang + if self.team == Team::Blue { 0.0 } else { PI };
        let new_state = CarState {
            phys: PhysState {
                pos: Vec3::new(
                    spawn_pos.x * -self.team.get_y_dir(),
                    spawn_pos.y * -self.team.get_y_dir(),
                    car_consts::spawn::RESPAWN_Z,
                ),
                rot_mat: RotMat::from_angles(0.0, yaw, 0.0),
                vel: Vec3::ZERO,
                ang_vel: Vec3::ZERO,
            },
            boost: boost_amount,
            is_on_ground: false,
            ..CarState::DEFAULT
        };

        log::debug!("Car {} respawned at {}", self.id, new_state.pos);
        self.set_state(rb, &new_state);
    }

    /// Copies `state` into the rigid body, the rotation must already be orthonormal
    pub(crate) fn set_state(&mut self, rb: &mut RigidBody, state: &CarState) {
        debug_assert_eq!(rb.user_index, UserInfoTypes::Car);
        debug_assert_eq!(rb.user_pointer, self.id);

        self.velocity_impulse_cache = Vec3::ZERO;
        self.state = *state;
        self.write_body(rb);
    }

    /// Rebuilds the body from the stored state.
    ///
    /// Done after every tick as well, so a body never carries more than its state
    /// and restoring a state continues exactly like the tick it was taken on.
    fn write_body(&self, rb: &mut RigidBody) {
        rb.set_world_transform(Affine3A {
            matrix3: self.state.rot_mat,
            translation: self.state.pos * UU_TO_BT,
        });

        rb.linear_velocity = self.state.vel * UU_TO_BT;
        rb.angular_velocity = self.state.ang_vel;
        rb.push_velocity = Vec3::ZERO;
        rb.turn_velocity = Vec3::ZERO;
        rb.enabled = !self.state.is_demoed;
    }

    fn update_wheels(
        &mut self,
        rb: &mut RigidBody,
        tick_time: f32,
        num_wheels_in_contact: u8,
        forward_speed_uu: f32,
    ) {
        let controls = self.state.controls;

        let handbrake_rate = if controls.handbrake {
            drive_consts::POWERSLIDE_RISE_RATE
        } else {
            -drive_consts::POWERSLIDE_FALL_RATE
        };
        self.state.handbrake_val =
            (self.state.handbrake_val + handbrake_rate * tick_time).clamp(0.0, 1.0);

        let mut real_brake = 0.0;
        let real_throttle = if controls.boost && self.state.boost > 0.0 {
            1.0
        } else {
            controls.throttle
        };

        let abs_forward_speed_uu = forward_speed_uu.abs();
        let mut engine_throttle = real_throttle;
        if !controls.handbrake {
            if real_throttle.abs() >= drive_consts::THROTTLE_DEADZONE {
                if abs_forward_speed_uu > drive_consts::STOPPING_FORWARD_VEL
                    && real_throttle.signum() != forward_speed_uu.signum()
                {
                    real_brake = 1.0;

                    if abs_forward_speed_uu > drive_consts::BRAKING_NO_THROTTLE_SPEED_THRESH {
                        engine_throttle = 0.0;
                    }
                }
            } else {
                engine_throttle = 0.0;
                real_brake = if abs_forward_speed_uu < drive_consts::STOPPING_FORWARD_VEL {
                    1.0
                } else {
                    drive_consts::COASTING_BRAKE_FACTOR
                };
            }
        }

        let mut drive_speed_scale =
            curves::DRIVE_SPEED_TORQUE_FACTOR.get_output(abs_forward_speed_uu);
        if num_wheels_in_contact < 3 {
            drive_speed_scale /= 4.0;
        }

        let drive_engine_force = engine_throttle
            * const { drive_consts::THROTTLE_TORQUE_AMOUNT * UU_TO_BT }
            * drive_speed_scale;
        let drive_brake_force = real_brake * const { drive_consts::BRAKE_TORQUE_AMOUNT * UU_TO_BT };
        for wheel in &mut self.vehicle.wheels {
            wheel.engine_force = drive_engine_force;
            wheel.brake = drive_brake_force;
        }

        let mut steer_angle = if self.config.three_wheels {
            curves::STEER_ANGLE_FROM_SPEED_THREEWHEEL.get_output(abs_forward_speed_uu)
        } else {
            curves::STEER_ANGLE_FROM_SPEED.get_output(abs_forward_speed_uu)
        };
        if self.state.handbrake_val != 0.0 {
            steer_angle += (curves::POWERSLIDE_STEER_ANGLE_FROM_SPEED
                .get_output(abs_forward_speed_uu)
                - steer_angle)
                * self.state.handbrake_val;
        }

        steer_angle *= controls.steer;
        self.vehicle.wheels[0].steer_angle = steer_angle;
        self.vehicle.wheels[1].steer_angle = steer_angle;
        for wheel in &mut self.vehicle.wheels {
            wheel.update_steering();
        }

        let car_pos = rb.get_world_transform().translation;
        let car_vel = rb.linear_velocity;
        let car_ang_vel = rb.angular_velocity;

        for wheel in &mut self.vehicle.wheels {
            if !wheel.raycast_info.is_in_contact {
                continue;
            }

            let lat_dir = wheel.world_transform.matrix3.y_axis;
            let long_dir = lat_dir.cross(wheel.raycast_info.contact_normal_ws);

            let wheel_delta = wheel.raycast_info.hard_point_ws - car_pos;
            let cross_vec = (car_ang_vel.cross(wheel_delta) + car_vel) * BT_TO_UU;

            let base_friction = cross_vec.dot(lat_dir).abs();
            let friction_curve_input = if base_friction > 5.0 {
                base_friction / (cross_vec.dot(long_dir).abs() + base_friction)
            } else {
                0.0
            };

            let mut lat_friction = if self.config.three_wheels {
                curves::LAT_FRICTION_THREEWHEEL
            } else {
                curves::LAT_FRICTION
            }
            .get_output(friction_curve_input);
            let mut long_friction = 1.0;

            if self.state.handbrake_val != 0.0 {
                let handbrake_amount = self.state.handbrake_val;
                lat_friction *= 1.0 - curves::HANDBRAKE_LAT_FRICTION_FACTOR * handbrake_amount;
                long_friction *= 1.0
                    + (curves::HANDBRAKE_LONG_FRICTION_FACTOR.get_output(friction_curve_input)
                        - 1.0)
                        * handbrake_amount;
            }

            if real_throttle == 0.0 {
                // no throttle, the tires slide more
                let non_sticky_scale = curves::NON_STICKY_FRICTION_FACTOR
                    .get_output(wheel.raycast_info.contact_normal_ws.z);
                lat_friction *= non_sticky_scale;
                long_friction *= non_sticky_scale;
            }

            wheel.lat_friction = lat_friction;
            wheel.long_friction = long_friction;
        }

        if num_wheels_in_contact > 0 {
            let upwards_dir = self.vehicle.get_upwards_dir_from_wheel_contacts(rb);

            let full_stick =
                real_throttle != 0.0 || abs_forward_speed_uu > drive_consts::STOPPING_FORWARD_VEL;
            let mut sticky_force_scale = f32::from(!self.config.three_wheels) * 0.5;
            if full_stick {
                sticky_force_scale += 1.0 - upwards_dir.z.abs();
            }

            rb.apply_central_force(
                upwards_dir * sticky_force_scale * crate::consts::GRAVITY_Z * UU_TO_BT * rb.get_mass(),
            );
        }
    }

    fn update_air_torque(&mut self, rb: &mut RigidBody, update_air_control: bool) {
        let controls = self.state.controls;
        let forward_dir = self.state.get_forward_dir();
        let right_dir = self.state.get_right_dir();
        let up_dir = self.state.get_up_dir();

        let dir_pitch = -right_dir;
        let dir_yaw = up_dir;
        let dir_roll = -forward_dir;

        if self.state.is_flipping {
            self.state.is_flipping =
                self.state.has_flipped && self.state.flip_time < car_consts::flip::TORQUE_TIME;
        }

        let mut do_air_control = false;
        if self.state.is_flipping {
            if self.state.flip_rel_torque == Vec3::ZERO {
                do_air_control = true;
            } else {
                let mut rel_dodge_torque = self.state.flip_rel_torque;

                let mut pitch_scale = 1.0;
                if rel_dodge_torque.y != 0.0
                    && controls.pitch != 0.0
                    && rel_dodge_torque.y.signum() == controls.pitch.signum()
                {
                    pitch_scale = 1.0 - controls.pitch.abs().min(1.0);
                    do_air_control = true;
                }

                rel_dodge_torque.y *= pitch_scale;
                let dodge_torque = rel_dodge_torque
                    * const { Vec3::new(car_consts::flip::TORQUE_X, car_consts::flip::TORQUE_Y, 0.0) };

                let rb_torque = rb.get_inertia_tensor_world()
                    * (rb.get_world_transform().matrix3 * dodge_torque);
                rb.apply_torque(rb_torque);
            }
        } else {
            do_air_control = true;
        }

        do_air_control &= !self.state.is_auto_flipping;
        do_air_control &= update_air_control;
        if do_air_control {
            let mut pitch_torque_scale = 1.0;
            let torque = if controls.pitch != 0.0 || controls.yaw != 0.0 || controls.roll != 0.0 {
                if self.state.is_flipping
                    || self.state.has_flipped
                        && self.state.flip_time
                            < const {
                                car_consts::flip::TORQUE_TIME
                                    + car_consts::flip::PITCHLOCK_EXTRA_TIME
                            }
                {
                    pitch_torque_scale = 0.0;
                }

                controls.pitch * dir_pitch * pitch_torque_scale * car_consts::air_control::TORQUE.x
                    + controls.yaw * dir_yaw * car_consts::air_control::TORQUE.y
                    + controls.roll * dir_roll * car_consts::air_control::TORQUE.z
            } else {
                Vec3::ZERO
            };

            let ang_vel = rb.angular_velocity;

            let damp_pitch = dir_pitch.dot(ang_vel)
                * car_consts::air_control::DAMPING.x
                * (1.0 - (controls.pitch * pitch_torque_scale).abs());
            let damp_yaw = dir_yaw.dot(ang_vel)
                * car_consts::air_control::DAMPING.y
                * (1.0 - controls.yaw.abs());
            let damp_roll = dir_roll.dot(ang_vel) * car_consts::air_control::DAMPING.z;

            let damping = dir_yaw * damp_yaw + dir_pitch * damp_pitch + dir_roll * damp_roll;

            let rb_torque = rb.get_inertia_tensor_world()
                * (torque - damping)
                * car_consts::air_control::TORQUE_APPLY_SCALE;
            rb.apply_torque(rb_torque);
        }

        if controls.throttle != 0.0 {
            rb.apply_central_force(
                forward_dir
                    * controls.throttle
                    * drive_consts::THROTTLE_AIR_ACCEL
                    * UU_TO_BT
                    * rb.get_mass(),
            );
        }
    }

    fn update_jump(
        &mut self,
        rb: &mut RigidBody,
        tick_time: f32,
        mutator_config: &MutatorConfig,
        jump_pressed: bool,
    ) {
        let up_dir = self.state.get_up_dir();
        let mass = rb.get_mass();

        if self.state.is_on_ground && !self.state.is_jumping {
            // Keep the jump until we had time to actually leave the ground
            if !self.state.has_jumped
                || self.state.jump_time
                    >= const { car_consts::jump::MIN_TIME + car_consts::jump::RESET_TIME_PAD }
            {
                self.state.has_jumped = false;
                self.state.jump_time = 0.0;
            }
        }

        if self.state.is_jumping {
            self.state.is_jumping = self.state.jump_time < car_consts::jump::MIN_TIME
                || (self.state.controls.jump && self.state.jump_time < car_consts::jump::MAX_TIME);
        } else if self.state.is_on_ground && jump_pressed {
            self.state.is_jumping = true;
            self.state.jump_time = 0.0;
            rb.apply_central_impulse(up_dir * mutator_config.jump_immediate_force * UU_TO_BT * mass);
        }

        if self.state.is_jumping {
            self.state.has_jumped = true;

            let mut total_jump_force = up_dir * mutator_config.jump_accel;
            if self.state.jump_time < car_consts::jump::MIN_TIME {
                total_jump_force *= car_consts::jump::PRE_MIN_ACCEL_SCALE;
            }

            rb.apply_central_force(total_jump_force * UU_TO_BT * mass);
        }

        if self.state.is_jumping || self.state.has_jumped {
            self.state.jump_time += tick_time;
        }
    }

    fn update_auto_flip(&mut self, rb: &mut RigidBody, tick_time: f32, jump_pressed: bool) {
        if jump_pressed
            && self
                .state
                .world_contact_normal
                .is_some_and(|normal| normal.z > car_consts::autoflip::NORM_Z_THRESH)
        {
            // Right-handed rotation around the forward axis
            let roll = -Angle::from_rot_mat(self.state.rot_mat).roll;
            let abs_roll = roll.abs();
            if abs_roll > car_consts::autoflip::ROLL_THRESH {
                self.state.auto_flip_timer = car_consts::autoflip::TIME * (abs_roll / PI);
                self.state.auto_flip_torque_scale = roll.signum();
                self.state.is_auto_flipping = true;

                rb.apply_central_impulse(
                    -self.state.get_up_dir()
                        * car_consts::autoflip::IMPULSE
                        * UU_TO_BT
                        * rb.get_mass(),
                );
            }
        }

        if self.state.is_auto_flipping {
            if self.state.auto_flip_timer <= 0.0 {
                self.state.is_auto_flipping = false;
                self.state.auto_flip_timer = 0.0;
            } else {
                rb.angular_velocity += self.state.get_forward_dir()
                    * car_consts::autoflip::TORQUE
                    * self.state.auto_flip_torque_scale
                    * tick_time;
                self.state.auto_flip_timer -= tick_time;
            }
        }
    }

    fn update_double_jump_or_flip(
        &mut self,
        rb: &mut RigidBody,
        tick_time: f32,
        mutator_config: &MutatorConfig,
        jump_pressed: bool,
        forward_speed_uu: f32,
    ) {
        if self.state.is_on_ground {
            self.state.has_double_jumped = false;
            self.state.has_flipped = false;
            self.state.air_time = 0.0;
            self.state.air_time_since_jump = 0.0;
            self.state.flip_time = 0.0;
            return;
        }

        let controls = self.state.controls;
        let mass = rb.get_mass();
        let tick_time_scale = tick_time * 120.0;

        self.state.air_time += tick_time;

        if self.state.has_jumped && !self.state.is_jumping {
            self.state.air_time_since_jump += tick_time;
        } else {
            self.state.air_time_since_jump = 0.0;
        }

        if jump_pressed && self.state.air_time_since_jump < car_consts::jump::DOUBLEJUMP_MAX_DELAY {
            let input_magnitude = controls.yaw.abs() + controls.pitch.abs() + controls.roll.abs();
            let is_flip_input = input_magnitude >= self.config.dodge_deadzone;

            let can_use = (!self.state.is_auto_flipping
                && !self.state.has_double_jumped
                && !self.state.has_flipped)
                || if is_flip_input {
                    mutator_config.unlimited_flips
                } else {
                    mutator_config.unlimited_double_jumps
                };

            if can_use {
                if is_flip_input {
                    self.state.flip_time = 0.0;
                    self.state.has_flipped = true;
                    self.state.is_flipping = true;

                    let forward_speed_ratio = forward_speed_uu.abs() / car_consts::MAX_SPEED;
                    let mut dodge_dir =
                        Vec3::new(-controls.pitch, controls.yaw + controls.roll, 0.0);

                    if dodge_dir.x.abs() < 0.1 && dodge_dir.y.abs() < 0.1 {
                        dodge_dir = Vec3::ZERO;
                    } else {
                        dodge_dir = dodge_dir.normalize_or_zero();
                    }

                    self.state.flip_rel_torque =
                        Vec3::new(-dodge_dir.y, dodge_dir.x, 0.0) / tick_time_scale;

                    if dodge_dir.x.abs() < 0.1 {
                        dodge_dir.x = 0.0;
                    }

                    if dodge_dir.y.abs() < 0.1 {
                        dodge_dir.y = 0.0;
                    }

                    if dodge_dir.length_squared() > const { f32::EPSILON * f32::EPSILON } {
                        let should_dodge_backwards = if forward_speed_uu.abs() < 100.0 {
                            dodge_dir.x.is_sign_negative()
                        } else {
                            dodge_dir.x.signum() != forward_speed_uu.signum()
                        };

                        let max_speed_scale_x = if should_dodge_backwards {
                            car_consts::flip::BACKWARD_IMPULSE_MAX_SPEED_SCALE
                        } else {
                            car_consts::flip::FORWARD_IMPULSE_MAX_SPEED_SCALE
                        };

                        let mut initial_dodge_vel = dodge_dir * car_consts::flip::INITIAL_VEL_SCALE;
                        initial_dodge_vel.x *=
                            ((max_speed_scale_x - 1.0) * forward_speed_ratio) + 1.0;
                        initial_dodge_vel.y *= ((car_consts::flip::SIDE_IMPULSE_MAX_SPEED_SCALE
                            - 1.0)
                            * forward_speed_ratio)
                            + 1.0;
                        if should_dodge_backwards {
                            initial_dodge_vel.x *= car_consts::flip::BACKWARD_IMPULSE_SCALE_X;
                        }

                        let forward_dir_2d =
                            self.state.get_forward_dir().with_z(0.0).normalize_or_zero();
                        let right_dir_2d = Vec3::new(-forward_dir_2d.y, forward_dir_2d.x, 0.0);
                        let final_delta_vel = initial_dodge_vel.x * forward_dir_2d
                            + initial_dodge_vel.y * right_dir_2d;

                        rb.apply_central_impulse(final_delta_vel * UU_TO_BT * mass);
                    }
                } else {
                    rb.apply_central_impulse(
                        self.state.get_up_dir() * mutator_config.jump_immediate_force * UU_TO_BT * mass,
                    );
                    self.state.has_double_jumped = true;
                }
            }
        }

        if self.state.is_flipping {
            self.state.flip_time += tick_time;
            if self.state.flip_time <= car_consts::flip::TORQUE_TIME
                && self.state.flip_time >= car_consts::flip::Z_DAMP_START
                && (rb.linear_velocity.z < 0.0
                    || self.state.flip_time < car_consts::flip::Z_DAMP_END)
            {
                rb.linear_velocity.z *= (1.0 - car_consts::flip::Z_DAMP_120).powf(tick_time_scale);
            }
        } else if self.state.has_flipped {
            self.state.flip_time += tick_time;
        }
    }

    fn update_auto_roll(&self, rb: &mut RigidBody, num_wheels_in_contact: u8) {
        let ground_up_dir = match self.state.world_contact_normal {
            Some(normal) if num_wheels_in_contact == 0 => normal,
            _ => self.vehicle.get_upwards_dir_from_wheel_contacts(rb),
        };

        let ground_down_dir = -ground_up_dir;

        let forward_dir = self.state.get_forward_dir();
        let right_dir = self.state.get_right_dir();

        let cross_right_dir = ground_up_dir.cross(forward_dir);
        let cross_forward_dir = ground_down_dir.cross(cross_right_dir);

        let right_torque_factor = 1.0 - right_dir.dot(cross_right_dir).clamp(0.0, 1.0);
        let forward_torque_factor = 1.0 - forward_dir.dot(cross_forward_dir).clamp(0.0, 1.0);

        let torque_dir_right = forward_dir * -right_dir.dot(ground_up_dir).signum();
        let torque_dir_forward = right_dir * forward_dir.dot(ground_up_dir).signum();

        let torque_right = torque_dir_right * right_torque_factor;
        let torque_forward = torque_dir_forward * forward_torque_factor;

        rb.apply_central_force(
            ground_down_dir * car_consts::autoroll::FORCE * UU_TO_BT * rb.get_mass(),
        );

        let rb_torque = rb.get_inertia_tensor_world()
            * (torque_forward + torque_right)
            * car_consts::autoroll::TORQUE;
        rb.apply_torque(rb_torque);
    }

    fn update_boost(&mut self, rb: &mut RigidBody, tick_time: f32, mutator_config: &MutatorConfig) {
        self.state.is_boosting = if self.state.boost > 0.0 {
            self.state.controls.boost
                || (self.state.is_boosting
                    && self.state.boosting_time < car_consts::boost::MIN_TIME)
        } else {
            false
        };

        if self.state.is_boosting {
            self.state.boosting_time += tick_time;
            self.state.time_since_boosted = 0.0;
            self.state.boost -= mutator_config.boost_used_per_second * tick_time;

            let accel = if self.state.is_on_ground {
                mutator_config.boost_accel_ground
            } else {
                mutator_config.boost_accel_air
            };

            rb.apply_central_force(self.state.get_forward_dir() * accel * UU_TO_BT * rb.get_mass());
        } else {
            self.state.boosting_time = 0.0;
            self.state.time_since_boosted += tick_time;

            if mutator_config.recharge_boost_enabled
                && self.state.time_since_boosted >= mutator_config.recharge_boost_delay
            {
                self.state.boost += mutator_config.recharge_boost_per_second * tick_time;
            }
        }

        self.state.boost = self.state.boost.clamp(0.0, mutator_config.car_max_boost_amount);
    }

    /// Converts the persisted controls into forces on the body, before the world step
    pub(crate) fn pre_tick_update(
        &mut self,
        world: &mut PhysicsWorld,
        rng: &mut Rng,
        game_mode: GameMode,
        tick_time: f32,
        mutator_config: &MutatorConfig,
    ) {
        debug_assert_eq!(self.vehicle.get_num_wheels(), 4);

        let (bodies, geometry) = world.bodies_and_geometry_mut();
        let rb = &mut bodies[self.rigid_body_idx];

        if self.state.is_demoed {
            self.state.demo_respawn_timer = (self.state.demo_respawn_timer - tick_time).max(0.0);
            if self.state.demo_respawn_timer == 0.0 {
                self.respawn(rb, rng, game_mode, mutator_config.car_spawn_boost_amount);
            }
        }

        rb.enabled = !self.state.is_demoed;
        if self.state.is_demoed {
            return;
        }

        self.state.controls = self.state.controls.clamp();
        self.update_controls(rb, geometry, tick_time, mutator_config);
    }

    fn update_controls(
        &mut self,
        rb: &mut RigidBody,
        geometry: &ArenaGeometry,
        tick_time: f32,
        mutator_config: &MutatorConfig,
    ) {
        let forward_speed_uu = rb.get_forward_speed() * BT_TO_UU;

        self.vehicle.update_vehicle_first(rb, geometry, tick_time);

        let jump_pressed = self.state.controls.jump && !self.state.prev_controls.jump;

        let mut num_wheels_in_contact = 0u8;
        for (wheel, has_contact) in self
            .vehicle
            .wheels
            .iter()
            .zip(&mut self.state.wheels_with_contact)
        {
            let in_contact = wheel.raycast_info.is_in_contact;
            *has_contact = in_contact;
            num_wheels_in_contact += u8::from(in_contact);
        }

        self.state.is_on_ground = num_wheels_in_contact >= 3;

        self.update_wheels(rb, tick_time, num_wheels_in_contact, forward_speed_uu);

        if self.state.is_on_ground {
            self.state.is_flipping = false;
        } else {
            self.update_air_torque(rb, num_wheels_in_contact == 0);
        }

        self.update_jump(rb, tick_time, mutator_config, jump_pressed);
        self.update_auto_flip(rb, tick_time, jump_pressed);
        self.update_double_jump_or_flip(
            rb,
            tick_time,
            mutator_config,
            jump_pressed,
            forward_speed_uu,
        );

        if self.state.controls.throttle != 0.0
            && ((0 < num_wheels_in_contact && num_wheels_in_contact < 4)
                || self.state.world_contact_normal.is_some())
        {
            self.update_auto_roll(rb, num_wheels_in_contact);
        }

        self.state.world_contact_normal = None;

        self.vehicle.update_vehicle_second(rb, tick_time);
        self.update_boost(rb, tick_time, mutator_config);
    }

    pub(crate) fn post_tick_update(&mut self, tick_time: f32, rb: &RigidBody) {
        debug_assert_eq!(rb.user_pointer, self.id);
        if self.state.is_demoed {
            return;
        }

        self.state.phys.rot_mat = rb.get_world_transform().matrix3;

        let speed_squared = (rb.linear_velocity * BT_TO_UU).length_squared();
        self.state.is_supersonic = speed_squared
            >= if self.state.is_supersonic
                && self.state.supersonic_time < car_consts::supersonic::MAINTAIN_MAX_TIME
            {
                const {
                    car_consts::supersonic::MAINTAIN_MIN_SPEED
                        * car_consts::supersonic::MAINTAIN_MIN_SPEED
                }
            } else {
                const { car_consts::supersonic::START_SPEED * car_consts::supersonic::START_SPEED }
            };

        if self.state.is_supersonic {
            self.state.supersonic_time += tick_time;
        } else {
            self.state.supersonic_time = 0.0;
        }

        if let Some(car_contact) = &mut self.state.car_contact {
            car_contact.cooldown_timer -= tick_time;
        }

        if self
            .state
            .car_contact
            .is_some_and(|car_contact| car_contact.cooldown_timer <= 0.0)
        {
            self.state.car_contact = None;
        }

        self.state.prev_controls = self.state.controls;
    }

    pub(crate) fn finish_physics_tick(&mut self, rb: &mut RigidBody) {
        const MAX_SPEED: f32 = car_consts::MAX_SPEED * UU_TO_BT;
        debug_assert_eq!(rb.user_pointer, self.id);

        if self.state.is_demoed {
            // frozen where it was demolished until the respawn
            self.velocity_impulse_cache = Vec3::ZERO;
            self.write_body(rb);
            return;
        }

        if self.velocity_impulse_cache != Vec3::ZERO {
            rb.linear_velocity += self.velocity_impulse_cache * UU_TO_BT;
            self.velocity_impulse_cache = Vec3::ZERO;
        }

        let vel = &mut rb.linear_velocity;
        if vel.length_squared() > const { MAX_SPEED * MAX_SPEED } {
            *vel = vel.normalize_or_zero() * MAX_SPEED;
        }

        let ang_vel = &mut rb.angular_velocity;
        if ang_vel.length_squared()
            > const { car_consts::MAX_ANG_SPEED * car_consts::MAX_ANG_SPEED }
        {
            *ang_vel = ang_vel.normalize_or_zero() * car_consts::MAX_ANG_SPEED;
        }

        self.state.phys.pos = rb.get_world_transform().translation * BT_TO_UU;
        self.state.phys.vel = rb.linear_velocity * BT_TO_UU;
        self.state.phys.ang_vel = rb.angular_velocity;
        self.write_body(rb);
    }
}
