use carball::{
    Arena, ArenaConfig, BallState, CarConfig, CarState, GameMode, RotMat, Team, Vec3,
};

#[derive(Debug, Clone, Copy)]
pub struct CarSetup {
    pub team: Team,

    pub pos: Vec3,
    pub rot_mat: RotMat,
    pub vel: Vec3,
    pub ang_vel: Vec3,
    pub on_ground: bool,

    pub boost: f32,
}

impl CarSetup {
    pub const fn new(team: Team, pos: Vec3) -> Self {
        Self {
            team,
            pos,
            rot_mat: RotMat::IDENTITY,
            vel: Vec3::ZERO,
            ang_vel: Vec3::ZERO,
            boost: 0.0,
            on_ground: false,
        }
    }

    pub const fn with_rot(mut self, rot: RotMat) -> Self {
        self.rot_mat = rot;
        self
    }

    pub const fn with_vel(mut self, vel: Vec3) -> Self {
        self.vel = vel;
        self
    }

    pub const fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    pub const fn with_on_ground(mut self, on_ground: bool) -> Self {
        self.on_ground = on_ground;
        self
    }

    pub const fn make_car_state(&self) -> CarState {
        let mut result = CarState::DEFAULT;
        result.phys.pos = self.pos;
        result.phys.rot_mat = self.rot_mat;
        result.phys.vel = self.vel;
        result.phys.ang_vel = self.ang_vel;
        result.is_on_ground = self.on_ground;
        result.boost = self.boost;
        result
    }

    /// Adds the car to `arena` and puts it in this state
    pub fn spawn(&self, arena: &mut Arena) -> u64 {
        let id = arena.add_car(self.team, CarConfig::OCTANE);
        arena.set_car(id, self.make_car_state()).unwrap();
        id
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BallSetup {
    pub pos: Vec3,
    pub vel: Vec3,
    pub ang_vel: Vec3,
}

impl BallSetup {
    pub const fn new(pos: Vec3) -> Self {
        Self {
            pos,
            vel: Vec3::ZERO,
            ang_vel: Vec3::ZERO,
        }
    }

    pub const fn with_vel(mut self, vel: Vec3) -> Self {
        self.vel = vel;
        self
    }

    pub const fn with_ang_vel(mut self, ang_vel: Vec3) -> Self {
        self.ang_vel = ang_vel;
        self
    }

    pub const fn make_ball_state(&self) -> BallState {
        let mut result = BallState::DEFAULT;
        result.phys.pos = self.pos;
        result.phys.vel = self.vel;
        result.phys.ang_vel = self.ang_vel;
        result
    }
}

pub fn seeded_arena(game_mode: GameMode, seed: u64) -> Arena {
    let config = ArenaConfig {
        rng_seed: Some(seed),
        ..ArenaConfig::DEFAULT
    };

    Arena::new_with_config(game_mode, config, 120.0).unwrap()
}
