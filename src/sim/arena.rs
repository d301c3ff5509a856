use std::{f32::consts::PI, mem};

use ahash::AHashMap;
use fastrand::Rng;

use super::{
    ArenaConfig, Ball, BallState, BoostPadConfig, BoostPadGrid, Car, CarConfig, CarContact,
    CarState, DemoMode, GameMode, MutatorConfig, PhysState, Team, UserInfoTypes,
};
use crate::{
    ArenaError, Result,
    consts::{
        BT_TO_UU, UU_TO_BT, ball as ball_consts, boost_pads,
        car::{self as car_consts, bump, spawn},
        goal,
    },
    math::{RotMat, RotMatExt, Vec3},
    physics::{BodyShape, ContactAddedCallback, ContactPoint, PhysicsWorld, RigidBody},
};

/// Tolerance of the orthonormality check on rotations coming from outside the arena
const ROT_MAT_EPS: f32 = 1e-4;

/// Below this the ball and cars can move through the arena floor in a single tick
pub const MIN_TICK_RATE: f32 = 15.0;
pub const MAX_TICK_RATE: f32 = 120.0;

/// A car ran into another car with its bumper
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarBumpEvent {
    pub bumper_id: u64,
    pub victim_id: u64,
    pub is_demo: bool,
    pub tick_count: u64,
}

#[derive(Clone, Debug)]
pub(crate) struct Objects {
    pub ball: Ball,
    /// Sorted by ascending id, cars are never removed
    pub cars: Vec<Car>,
    car_indices: AHashMap<u64, usize>,
    pub tick_count: u64,
    pub game_mode: GameMode,
    pub mutator_config: MutatorConfig,
    pub boost_pads: BoostPadGrid,
    bump_events: Vec<CarBumpEvent>,
}

impl Objects {
    pub fn car_idx(&self, id: u64) -> Result<usize> {
        self.car_indices
            .get(&id)
            .copied()
            .ok_or(ArenaError::UnknownCar(id))
    }

    pub fn car(&self, id: u64) -> Result<&Car> {
        self.car_idx(id).map(|idx| &self.cars[idx])
    }

    fn on_car_ball_collision(&mut self, car_id: u64, contact: &mut ContactPoint) {
        contact.combined_friction = ball_consts::car_hit::COEFS.friction;
        contact.combined_restitution = ball_consts::car_hit::COEFS.restitution;

        let Ok(car_idx) = self.car_idx(car_id) else {
            return;
        };

        self.ball.on_hit(
            &mut self.cars[car_idx],
            contact.local_point_b * BT_TO_UU,
            &self.mutator_config,
            self.tick_count,
        );
    }

    fn on_car_world_collision(&mut self, car_id: u64, contact: &mut ContactPoint) {
        contact.combined_friction = self.mutator_config.car_world_friction;
        contact.combined_restitution = self.mutator_config.car_world_restitution;

        if let Ok(car_idx) = self.car_idx(car_id) {
            self.cars[car_idx].state.world_contact_normal = Some(contact.normal_world_on_b);
        }
    }

    fn on_car_car_collision(&mut self, car_1_id: u64, car_2_id: u64, contact: &mut ContactPoint) {
        contact.combined_friction = car_consts::HIT_CAR_COEFS.friction;
        contact.combined_restitution = car_consts::HIT_CAR_COEFS.restitution;

        let (Ok(idx_1), Ok(idx_2)) = (self.car_idx(car_1_id), self.car_idx(car_2_id)) else {
            return;
        };

        let Ok([car_1, car_2]) = self.cars.get_disjoint_mut([idx_1, idx_2]) else {
            return;
        };

        // Test collision both ways
        for is_swapped in [false, true] {
            let (bumper, victim, local_point) = if is_swapped {
                (&mut *car_2, &mut *car_1, contact.local_point_b)
            } else {
                (&mut *car_1, &mut *car_2, contact.local_point_a)
            };

            if let Some(event) = Self::try_bump(
                bumper,
                victim,
                local_point,
                &self.mutator_config,
                self.tick_count,
            ) {
                self.bump_events.push(event);
            }
        }
    }

    fn try_bump(
        bumper: &mut Car,
        victim: &mut Car,
        local_point: Vec3,
        mutator_config: &MutatorConfig,
        tick_count: u64,
    ) -> Option<CarBumpEvent> {
        if bumper.state.is_demoed || victim.state.is_demoed {
            return None;
        }

        if bumper.state.car_contact.is_some_and(|car_contact| {
            car_contact.other_car_id == victim.id && car_contact.cooldown_timer > 0.0
        }) {
            // In cooldown
            return None;
        }

        let bumper_vel = bumper.state.vel;
        let delta_pos = victim.state.pos - bumper.state.pos;
        if bumper_vel.dot(delta_pos) < 0.0 {
            // Moving away from the other car
            return None;
        }

        let vel_dir = bumper_vel.normalize_or_zero();
        let dir_to_other_car = delta_pos.normalize_or_zero();

        let speed_towards_other_car = bumper_vel.dot(dir_to_other_car);
        let other_car_away_speed = victim.state.vel.dot(vel_dir);
        if speed_towards_other_car <= other_car_away_speed {
            // Going towards other car slower than they're going away
            return None;
        }

        if local_point.x * BT_TO_UU <= bump::MIN_FORWARD_DIST {
            // Didn't hit with bumper
            return None;
        }

        let mut is_demo = match mutator_config.demo_mode {
            DemoMode::OnContact => true,
            DemoMode::Disabled => false,
            DemoMode::Normal => bumper.state.is_supersonic,
        };
        if is_demo && !mutator_config.enable_team_demos {
            is_demo = bumper.team != victim.team;
        }

        if is_demo {
            log::info!("Car {} demolished car {}", bumper.id, victim.id);
            victim.demolish(mutator_config.respawn_delay);
        } else {
            let ground_hit = victim.state.is_on_ground;
            let base_scale = if ground_hit {
                bump::VEL_AMOUNT_GROUND_CURVE
            } else {
                bump::VEL_AMOUNT_AIR_CURVE
            }
            .get_output(speed_towards_other_car);

            let hit_up_dir = if ground_hit {
                victim.state.get_up_dir()
            } else {
                Vec3::Z
            };

            let bump_impulse = vel_dir * base_scale
                + hit_up_dir
                    * bump::UPWARD_VEL_AMOUNT_CURVE.get_output(speed_towards_other_car);

            victim.velocity_impulse_cache += bump_impulse * mutator_config.bump_force_scale;
        }

        bumper.state.car_contact = Some(CarContact {
            other_car_id: victim.id,
            cooldown_timer: mutator_config.bump_cooldown_time,
        });

        Some(CarBumpEvent {
            bumper_id: bumper.id,
            victim_id: victim.id,
            is_demo,
            tick_count,
        })
    }
}

impl ContactAddedCallback for Objects {
    fn callback(
        &mut self,
        contact: &mut ContactPoint,
        body_a: &RigidBody,
        body_b: Option<&RigidBody>,
    ) {
        let other = body_b.map(|rb| (rb.user_index, rb.user_pointer));

        match (body_a.user_index, other) {
            (UserInfoTypes::Car, Some((UserInfoTypes::Ball, _))) => {
                self.on_car_ball_collision(body_a.user_pointer, contact);
            }
            (UserInfoTypes::Car, Some((UserInfoTypes::Car, other_id))) => {
                self.on_car_car_collision(body_a.user_pointer, other_id, contact);
            }
            (UserInfoTypes::Car, None) => {
                self.on_car_world_collision(body_a.user_pointer, contact);
            }
            (UserInfoTypes::Ball, None) => contact.is_special = true,
            _ => {}
        }
    }
}

pub struct Arena {
    rng: Rng,
    tick_rate: f32,
    tick_time: f32,
    last_car_id: u64,
    config: ArenaConfig,
    pub(crate) world: PhysicsWorld,
    pub(crate) objects: Objects,
    /// Set once the goal handler ran for the ball's current stay in a goal
    pub(crate) goal_latched: bool,
    goal_scored_callback: Option<Box<dyn FnMut(Team)>>,
    car_bump_callback: Option<Box<dyn FnMut(CarBumpEvent)>>,
}

impl Arena {
    /// Arena at the default 120 ticks per second
    #[must_use]
    pub fn new(game_mode: GameMode) -> Self {
        Self::build(game_mode, ArenaConfig::DEFAULT, 120.0)
    }

    pub fn new_with_config(game_mode: GameMode, config: ArenaConfig, tick_rate: f32) -> Result<Self> {
        if !(MIN_TICK_RATE..=MAX_TICK_RATE).contains(&tick_rate) {
            return Err(ArenaError::InvalidTickRate(tick_rate));
        }

        if config.use_custom_boost_pads
            && config.custom_boost_pads.iter().any(|pad| !pad.pos.is_finite())
        {
            return Err(ArenaError::NonFinite("custom boost pad"));
        }

        Ok(Self::build(game_mode, config, tick_rate))
    }

    fn build(game_mode: GameMode, config: ArenaConfig, tick_rate: f32) -> Self {
        let mutator_config = MutatorConfig::new(game_mode);
        let mut world = PhysicsWorld::new(game_mode, mutator_config.gravity_bt());

        let ball = Ball::new(game_mode, &mut world, &mutator_config, config.no_ball_rot);

        let pad_configs = if config.use_custom_boost_pads {
            config.custom_boost_pads.clone()
        } else {
            boost_pads::get_locations(game_mode)
                .into_iter()
                .map(|(pos, is_big)| BoostPadConfig::new(pos, is_big))
                .collect()
        };
        let boost_pads = BoostPadGrid::new(&pad_configs);

        let rng = match config.rng_seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };

        log::info!(
            "Created {} arena at {tick_rate} tps with {} boost pads",
            game_mode.name(),
            boost_pads.len()
        );

        Self {
            rng,
            tick_rate,
            tick_time: 1.0 / tick_rate,
            last_car_id: 0,
            config,
            world,
            objects: Objects {
                ball,
                cars: Vec::new(),
                car_indices: AHashMap::new(),
                tick_count: 0,
                game_mode,
                mutator_config,
                boost_pads,
                bump_events: Vec::new(),
            },
            goal_latched: false,
            goal_scored_callback: None,
            car_bump_callback: None,
        }
    }

    /// Copy of the arena that shares no handlers with this one.
    ///
    /// Stepping both with the same inputs gives identical results.
    #[must_use]
    pub fn clone_without_callbacks(&self) -> Self {
        Self {
            rng: self.rng.clone(),
            tick_rate: self.tick_rate,
            tick_time: self.tick_time,
            last_car_id: self.last_car_id,
            config: self.config.clone(),
            world: self.world.clone(),
            objects: self.objects.clone(),
            goal_latched: self.goal_latched,
            goal_scored_callback: None,
            car_bump_callback: None,
        }
    }

    #[must_use]
    pub const fn get_tick_rate(&self) -> f32 {
        self.tick_rate
    }

    #[must_use]
    pub const fn get_tick_time(&self) -> f32 {
        self.tick_time
    }

    #[must_use]
    pub const fn get_tick_count(&self) -> u64 {
        self.objects.tick_count
    }

    pub(crate) fn rng_state(&self) -> u64 {
        self.rng.get_seed()
    }

    pub(crate) fn set_rng_state(&mut self, state: u64) {
        self.rng.seed(state);
    }

    #[must_use]
    pub const fn game_mode(&self) -> GameMode {
        self.objects.game_mode
    }

    #[must_use]
    pub const fn config(&self) -> &ArenaConfig {
        &self.config
    }

    #[must_use]
    pub const fn mutator_config(&self) -> &MutatorConfig {
        &self.objects.mutator_config
    }

    /// Applies new tuning to the arena, bodies pick up new masses, radius and gravity immediately
    pub fn set_mutator_config(&mut self, mutator_config: MutatorConfig) -> Result<()> {
        mutator_config.validate()?;

        let bodies = self.world.bodies_mut();

        let ball_rb = &mut bodies[self.objects.ball.rigid_body_idx];
        ball_rb.set_mass_props(
            mutator_config.ball_mass,
            BodyShape::Sphere {
                radius: mutator_config.ball_radius * UU_TO_BT,
            },
        );
        ball_rb.linear_damping = mutator_config.ball_drag;
        ball_rb.friction = mutator_config.ball_world_friction;
        ball_rb.restitution = mutator_config.ball_world_restitution;

        for car in &self.objects.cars {
            let rb = &mut bodies[car.rigid_body_idx];
            rb.set_mass_props(mutator_config.car_mass, rb.shape);
        }

        self.world.set_gravity(mutator_config.gravity_bt());
        self.objects.mutator_config = mutator_config;
        log::debug!("Mutator config updated");
        Ok(())
    }

    /// Replaces the goal handler, it runs once per goal with the scoring team
    pub fn set_goal_scored_callback(&mut self, callback: impl FnMut(Team) + 'static) {
        self.goal_scored_callback = Some(Box::new(callback));
    }

    pub fn clear_goal_scored_callback(&mut self) {
        self.goal_scored_callback = None;
    }

    /// Replaces the handler for car bumps and demolitions
    pub fn set_car_bump_callback(&mut self, callback: impl FnMut(CarBumpEvent) + 'static) {
        self.car_bump_callback = Some(Box::new(callback));
    }

    pub fn clear_car_bump_callback(&mut self) {
        self.car_bump_callback = None;
    }

    fn ball_within_hoops_goal_xy_margin_eq(x: f32, y: f32) -> f32 {
        let dy = y.abs() * goal::HOOPS_GOAL_SCALE_Y - goal::HOOPS_GOAL_OFFSET_Y;
        let dist_sq = x * x + dy * dy;
        dist_sq - goal::HOOPS_GOAL_RADIUS_SQ
    }

    #[must_use]
    pub fn is_ball_scored(&self) -> bool {
        let ball_pos = self.objects.ball.state.pos;
        let mutator_config = &self.objects.mutator_config;

        match self.objects.game_mode {
            GameMode::Soccar => {
                // past the goal line and inside the mouth, not just behind the back wall
                ball_pos.y.abs() > mutator_config.goal_base_threshold_y + mutator_config.ball_radius
                    && ball_pos.x.abs() < goal::SOCCAR_GOAL_HALF_WIDTH
                    && ball_pos.z < goal::SOCCAR_GOAL_HEIGHT
            }
            GameMode::Hoops => {
                ball_pos.z < goal::HOOPS_GOAL_SCORE_THRESHOLD_Z
                    && Self::ball_within_hoops_goal_xy_margin_eq(ball_pos.x, ball_pos.y) < 0.0
            }
            GameMode::TheVoid => false,
        }
    }

    /// Spawn for the `slot`-th car of a team, `kickoff_order` maps slots to kickoff locations
    fn kickoff_car_state(
        game_mode: GameMode,
        team: Team,
        slot: usize,
        kickoff_order: &[usize],
        boost: f32,
    ) -> CarState {
        const CAR_SPAWN_EXTRA_OFFSET_Y: f32 = 250.0;

        let spawn_pos = if let Some(&loc_idx) = kickoff_order.get(slot) {
            spawn::get_kickoff_locations(game_mode)[loc_idx]
        } else {
            let respawn_locations = spawn::get_respawn_locations(game_mode);
            let extra_idx = slot - kickoff_order.len();
            let mut pos = respawn_locations[extra_idx % respawn_locations.len()];
            pos.y += CAR_SPAWN_EXTRA_OFFSET_Y * (extra_idx / respawn_locations.len()) as f32;
            pos
        };

        let mut pos = Vec3::new(spawn_pos.x, spawn_pos.y, spawn::SPAWN_Z);
        let mut yaw = spawn_pos.yaw_ang;
        if team == Team::Orange {
            pos *= Vec3::new(-1.0, -1.0, 1.0);
            yaw += PI;
        }

        CarState {
            phys: PhysState {
                pos,
                rot_mat: RotMat::from_angles(0.0, yaw, 0.0),
                vel: Vec3::ZERO,
                ang_vel: Vec3::ZERO,
            },
            boost,
            is_on_ground: true,
            ..CarState::DEFAULT
        }
    }

    /// Adds a car to the match at the next free kickoff spot of its team,
    /// returning the id of the car
    pub fn add_car(&mut self, team: Team, config: CarConfig) -> u64 {
        self.last_car_id += 1;
        let id = self.last_car_id;

        let slot = self
            .objects
            .cars
            .iter()
            .filter(|car| car.team == team)
            .count();
        let kickoff_order: Vec<usize> =
            (0..spawn::get_kickoff_locations(self.objects.game_mode).len()).collect();

        let mut car = Car::new(id, team, &mut self.world, &self.objects.mutator_config, config);
        let spawn_state = Self::kickoff_car_state(
            self.objects.game_mode,
            team,
            slot,
            &kickoff_order,
            self.objects.mutator_config.car_spawn_boost_amount,
        );
        car.set_state(&mut self.world.bodies_mut()[car.rigid_body_idx], &spawn_state);

        log::info!("Added car {id} to team {team:?} at {}", spawn_state.pos);

        self.objects.car_indices.insert(id, self.objects.cars.len());
        self.objects.cars.push(car);
        id
    }

    /// Puts every car on a shuffled kickoff spot and resets the ball and boost pads
    pub fn reset_to_random_kickoff(&mut self, seed: Option<u64>) {
        if let Some(seed) = seed {
            self.rng.seed(seed);
        }

        let game_mode = self.objects.game_mode;
        let mut kickoff_order: Vec<usize> =
            (0..spawn::get_kickoff_locations(game_mode).len()).collect();
        self.rng.shuffle(&mut kickoff_order);

        let bodies = self.world.bodies_mut();
        let mut team_slots = [0usize; 2];
        for car in &mut self.objects.cars {
            let slot = &mut team_slots[car.team as usize];
            let spawn_state = Self::kickoff_car_state(
                game_mode,
                car.team,
                *slot,
                &kickoff_order,
                self.objects.mutator_config.car_spawn_boost_amount,
            );
            *slot += 1;

            car.set_state(&mut bodies[car.rigid_body_idx], &spawn_state);
        }

        self.reset_ball();
        self.objects.boost_pads.reset();
        log::debug!("Reset to kickoff with order {kickoff_order:?}");
    }

    fn reset_ball(&mut self) {
        let ball = &mut self.objects.ball;
        let state = BallState::kickoff(self.objects.game_mode);
        ball.set_state(&mut self.world.bodies_mut()[ball.rigid_body_idx], &state);
        self.goal_latched = false;
    }

    /// Corrects a slightly skewed rotation, rejects one that cannot be saved
    pub(crate) fn fix_rotation(rot_mat: RotMat, owner: &str) -> Result<RotMat> {
        if rot_mat.is_orthonormal(ROT_MAT_EPS) {
            return Ok(rot_mat);
        }

        let fixed = rot_mat
            .orthonormalized()
            .ok_or(ArenaError::DegenerateRotation)?;
        log::warn!("Rotation of {owner} was not orthonormal and has been corrected");
        Ok(fixed)
    }

    fn update_goal(&mut self) {
        if !self.is_ball_scored() {
            self.goal_latched = false;
            return;
        }

        if self.goal_latched {
            return;
        }

        // Orange's goal is on the positive y side
        let scoring_team = if self.objects.ball.state.pos.y > 0.0 {
            Team::Blue
        } else {
            Team::Orange
        };

        log::info!(
            "Goal scored by {scoring_team:?} on tick {}",
            self.objects.tick_count
        );

        if let Some(callback) = &mut self.goal_scored_callback {
            callback(scoring_team);
        }

        if self.config.reset_ball_on_goal {
            self.reset_ball();
        } else {
            self.goal_latched = true;
        }
    }

    fn dispatch_bump_events(&mut self) {
        let mut events = mem::take(&mut self.objects.bump_events);

        if let Some(callback) = &mut self.car_bump_callback {
            for event in &events {
                callback(*event);
            }
        }

        events.clear();
        self.objects.bump_events = events;
    }

    fn internal_step(&mut self) {
        for car in &mut self.objects.cars {
            car.pre_tick_update(
                &mut self.world,
                &mut self.rng,
                self.objects.game_mode,
                self.tick_time,
                &self.objects.mutator_config,
            );
        }

        self.world
            .step_simulation(self.tick_time, &mut self.objects);

        let bodies = self.world.bodies_mut();
        for car in &mut self.objects.cars {
            let rb = &mut bodies[car.rigid_body_idx];
            car.post_tick_update(self.tick_time, rb);
            car.finish_physics_tick(rb);
        }

        self.dispatch_bump_events();

        self.objects.boost_pads.update_cooldowns(self.tick_time);
        self.objects
            .boost_pads
            .give_boost(&mut self.objects.cars, &self.objects.mutator_config);

        let ball = &mut self.objects.ball;
        ball.finish_physics_tick(
            &mut self.world.bodies_mut()[ball.rigid_body_idx],
            &self.objects.mutator_config,
        );

        self.update_goal();

        self.objects.tick_count += 1;
    }

    /// Runs exactly `ticks_to_simulate` ticks
    pub fn step(&mut self, ticks_to_simulate: u32) {
        for _ in 0..ticks_to_simulate {
            self.internal_step();
        }
    }
}
