use glam::Affine3A;

use crate::{
    BallHitInfo, BallState, Car, GameMode, MutatorConfig,
    consts::{self, BT_TO_UU, UU_TO_BT, ball::car_hit},
    math::Vec3,
    physics::{BodyShape, PhysicsWorld, RigidBody, RigidBodyConstructionInfo},
    sim::UserInfoTypes,
};

#[derive(Clone, Debug)]
pub(crate) struct Ball {
    pub state: BallState,
    pub rigid_body_idx: usize,
    /// Velocity (uu/s) added once the physics tick is done
    pub velocity_impulse_cache: Vec3,
}

impl Ball {
    pub fn new(
        game_mode: GameMode,
        world: &mut PhysicsWorld,
        mutator_config: &MutatorConfig,
        no_rot: bool,
    ) -> Self {
        let shape = BodyShape::Sphere {
            radius: mutator_config.ball_radius * UU_TO_BT,
        };

        let state = BallState::kickoff(game_mode);

        let mut info = RigidBodyConstructionInfo::new(mutator_config.ball_mass, shape);
        info.start_world_transform = Affine3A::from_translation((state.pos * UU_TO_BT).into());
        info.linear_damping = mutator_config.ball_drag;
        info.friction = mutator_config.ball_world_friction;
        info.restitution = mutator_config.ball_world_restitution;

        let mut body = RigidBody::new(info);
        body.user_index = UserInfoTypes::Ball;
        body.no_rot = no_rot;

        let rigid_body_idx = world.add_rigid_body(body);

        Self {
            state,
            rigid_body_idx,
            velocity_impulse_cache: Vec3::ZERO,
        }
    }

    /// Copies `state` into the rigid body, the rotation must already be orthonormal
    pub fn set_state(&mut self, rb: &mut RigidBody, state: &BallState) {
        debug_assert_eq!(rb.user_index, UserInfoTypes::Ball);

        self.velocity_impulse_cache = Vec3::ZERO;
        self.state = *state;
        self.write_body(rb);
    }

    /// Same as the car: the body is rebuilt from the state after every tick
    fn write_body(&self, rb: &mut RigidBody) {
        rb.set_world_transform(Affine3A {
            matrix3: self.state.rot_mat,
            translation: self.state.pos * UU_TO_BT,
        });

        rb.linear_velocity = self.state.vel * UU_TO_BT;
        rb.angular_velocity = self.state.ang_vel;
        rb.push_velocity = Vec3::ZERO;
        rb.turn_velocity = Vec3::ZERO;
    }

    pub fn on_hit(
        &mut self,
        car: &mut Car,
        relative_pos_on_ball: Vec3,
        mutator_config: &MutatorConfig,
        tick_count: u64,
    ) {
        let mut ball_hit_info = BallHitInfo {
            car_id: car.id,
            relative_pos_on_ball,
            ball_pos: self.state.pos,
            extra_hit_vel: Vec3::ZERO,
            tick_count_when_hit: tick_count,
            tick_count_when_extra_impulse_applied: 0,
        };

        if let Some(old_bhi) = car.state.ball_hit_info {
            ball_hit_info.tick_count_when_extra_impulse_applied =
                old_bhi.tick_count_when_extra_impulse_applied;

            // Once we do an extra car-ball impulse, we need to wait at least 1 tick to do it again
            if tick_count <= old_bhi.tick_count_when_extra_impulse_applied + 1
                && old_bhi.tick_count_when_extra_impulse_applied <= tick_count
            {
                car.state.ball_hit_info = Some(ball_hit_info);
                self.state.last_hit = Some(ball_hit_info);
                return;
            }
        }

        ball_hit_info.tick_count_when_extra_impulse_applied = tick_count;

        let car_forward = car.state.get_forward_dir();
        let rel_pos = self.state.pos - car.state.pos;
        let rel_vel = self.state.vel - car.state.vel;

        let rel_speed = rel_vel.length().min(car_hit::EXTRA_IMPULSE_MAX_DELTA_VEL);
        if rel_speed > 0.0 {
            let mut hit_dir = (rel_pos * Vec3::new(1.0, 1.0, car_hit::EXTRA_IMPULSE_Z_SCALE))
                .normalize_or_zero();
            let forward_dir_adjustment = car_forward
                * hit_dir.dot(car_forward)
                * const { 1.0 - car_hit::EXTRA_IMPULSE_FORWARD_SCALE };
            hit_dir = (hit_dir - forward_dir_adjustment).normalize_or_zero();

            let added_vel = hit_dir
                * rel_speed
                * car_hit::EXTRA_IMPULSE_FACTOR_CURVE.get_output(rel_speed)
                * mutator_config.ball_hit_extra_force_scale;
            ball_hit_info.extra_hit_vel = added_vel;

            self.velocity_impulse_cache += added_vel;
        }

        car.state.ball_hit_info = Some(ball_hit_info);
        self.state.last_hit = Some(ball_hit_info);
    }

    pub fn finish_physics_tick(&mut self, rb: &mut RigidBody, mutator_config: &MutatorConfig) {
        if self.velocity_impulse_cache != Vec3::ZERO {
            rb.linear_velocity += self.velocity_impulse_cache * UU_TO_BT;
            self.velocity_impulse_cache = Vec3::ZERO;
        }

        let max_speed_bt = mutator_config.ball_max_speed * UU_TO_BT;
        if rb.linear_velocity.length_squared() > max_speed_bt * max_speed_bt {
            rb.linear_velocity = rb.linear_velocity.normalize_or_zero() * max_speed_bt;
        }

        if rb.angular_velocity.length_squared()
            > consts::ball::MAX_ANG_SPEED * consts::ball::MAX_ANG_SPEED
        {
            rb.angular_velocity =
                rb.angular_velocity.normalize_or_zero() * consts::ball::MAX_ANG_SPEED;
        }

        let trans = *rb.get_world_transform();
        self.state.phys.pos = trans.translation * BT_TO_UU;
        self.state.phys.rot_mat = trans.matrix3;
        self.state.phys.vel = rb.linear_velocity * BT_TO_UU;
        self.state.phys.ang_vel = rb.angular_velocity;
        self.write_body(rb);
    }
}
