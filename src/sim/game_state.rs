use std::io::{Cursor, Error as IoError, ErrorKind, Read, Result as IoResult, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    Arena, ArenaError, BallHitInfo, BallState, BoostPadConfig, BoostPadState, CarConfig,
    CarContact, CarControls, CarState, GameMode, PhysState, Result, Team, WheelPairConfig,
    math::{RotMat, Vec3},
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoostPadInfo {
    pub config: BoostPadConfig,
    pub state: BoostPadState,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarInfo {
    pub id: u64,
    pub team: Team,
    pub state: CarState,
    pub config: CarConfig,
}

/// Everything needed to put an arena back into an earlier tick
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    pub tick_rate: f32,
    pub tick_count: u64,
    /// State of the arena's random generator, which picks respawn spots
    pub rng_state: u64,
    pub game_mode: GameMode,
    pub ball: BallState,
    /// Ascending id
    pub cars: Vec<CarInfo>,
    pub pads: Vec<BoostPadInfo>,
}

const MAGIC: [u8; 4] = *b"CBGS";
const VERSION: u16 = 1;
const MAX_LIST_LEN: u32 = 1 << 16;

fn invalid_data(msg: &str) -> IoError {
    IoError::new(ErrorKind::InvalidData, msg)
}

/// Little endian binary layout of a snapshot piece
trait BinCodec: Sized {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()>;
    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self>;
}

impl BinCodec for bool {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        w.write_u8(u8::from(*self))
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        match bytes.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(invalid_data("bad bool")),
        }
    }
}

impl BinCodec for f32 {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        w.write_f32::<LittleEndian>(*self)
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        bytes.read_f32::<LittleEndian>()
    }
}

impl BinCodec for u64 {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        w.write_u64::<LittleEndian>(*self)
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        bytes.read_u64::<LittleEndian>()
    }
}

impl BinCodec for Vec3 {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        for x in self.to_array() {
            w.write_f32::<LittleEndian>(x)?;
        }
        Ok(())
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        Ok(Self::new(
            bytes.read_f32::<LittleEndian>()?,
            bytes.read_f32::<LittleEndian>()?,
            bytes.read_f32::<LittleEndian>()?,
        ))
    }
}

impl BinCodec for RotMat {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        self.x_axis.write_to(w)?;
        self.y_axis.write_to(w)?;
        self.z_axis.write_to(w)
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        Ok(Self::from_cols(
            Vec3::from_cursor(bytes)?,
            Vec3::from_cursor(bytes)?,
            Vec3::from_cursor(bytes)?,
        ))
    }
}

impl<T: BinCodec> BinCodec for Option<T> {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        self.is_some().write_to(w)?;
        match self {
            Some(value) => value.write_to(w),
            None => Ok(()),
        }
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        if bool::from_cursor(bytes)? {
            T::from_cursor(bytes).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl<T: BinCodec> BinCodec for Vec<T> {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        let len = u32::try_from(self.len())
            .ok()
            .filter(|&len| len <= MAX_LIST_LEN)
            .ok_or_else(|| invalid_data("list too long"))?;

        w.write_u32::<LittleEndian>(len)?;
        self.iter().try_for_each(|item| item.write_to(w))
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        let len = bytes.read_u32::<LittleEndian>()?;
        if len > MAX_LIST_LEN {
            return Err(invalid_data("list too long"));
        }

        (0..len).map(|_| T::from_cursor(bytes)).collect()
    }
}

impl BinCodec for PhysState {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        self.pos.write_to(w)?;
        self.rot_mat.write_to(w)?;
        self.vel.write_to(w)?;
        self.ang_vel.write_to(w)
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        Ok(Self {
            pos: Vec3::from_cursor(bytes)?,
            rot_mat: RotMat::from_cursor(bytes)?,
            vel: Vec3::from_cursor(bytes)?,
            ang_vel: Vec3::from_cursor(bytes)?,
        })
    }
}

impl BinCodec for BallHitInfo {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        self.car_id.write_to(w)?;
        self.relative_pos_on_ball.write_to(w)?;
        self.ball_pos.write_to(w)?;
        self.extra_hit_vel.write_to(w)?;
        self.tick_count_when_hit.write_to(w)?;
        self.tick_count_when_extra_impulse_applied.write_to(w)
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        Ok(Self {
            car_id: u64::from_cursor(bytes)?,
            relative_pos_on_ball: Vec3::from_cursor(bytes)?,
            ball_pos: Vec3::from_cursor(bytes)?,
            extra_hit_vel: Vec3::from_cursor(bytes)?,
            tick_count_when_hit: u64::from_cursor(bytes)?,
            tick_count_when_extra_impulse_applied: u64::from_cursor(bytes)?,
        })
    }
}

impl BinCodec for BallState {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        self.phys.write_to(w)?;
        self.last_hit.write_to(w)
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        Ok(Self {
            phys: PhysState::from_cursor(bytes)?,
            last_hit: Option::from_cursor(bytes)?,
        })
    }
}

impl BinCodec for CarControls {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        for x in [self.throttle, self.steer, self.pitch, self.yaw, self.roll] {
            x.write_to(w)?;
        }

        self.jump.write_to(w)?;
        self.boost.write_to(w)?;
        self.handbrake.write_to(w)
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        Ok(Self {
            throttle: f32::from_cursor(bytes)?,
            steer: f32::from_cursor(bytes)?,
            pitch: f32::from_cursor(bytes)?,
            yaw: f32::from_cursor(bytes)?,
            roll: f32::from_cursor(bytes)?,
            jump: bool::from_cursor(bytes)?,
            boost: bool::from_cursor(bytes)?,
            handbrake: bool::from_cursor(bytes)?,
        })
    }
}

impl BinCodec for CarContact {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        self.other_car_id.write_to(w)?;
        self.cooldown_timer.write_to(w)
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        Ok(Self {
            other_car_id: u64::from_cursor(bytes)?,
            cooldown_timer: f32::from_cursor(bytes)?,
        })
    }
}

impl BinCodec for CarState {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        self.phys.write_to(w)?;
        self.controls.write_to(w)?;
        self.prev_controls.write_to(w)?;

        for flag in [
            self.is_on_ground,
            self.wheels_with_contact[0],
            self.wheels_with_contact[1],
            self.wheels_with_contact[2],
            self.wheels_with_contact[3],
            self.has_jumped,
            self.has_double_jumped,
            self.has_flipped,
            self.is_flipping,
            self.is_jumping,
            self.is_boosting,
            self.is_supersonic,
            self.is_auto_flipping,
            self.is_demoed,
        ] {
            flag.write_to(w)?;
        }

        self.flip_rel_torque.write_to(w)?;
        for x in [
            self.jump_time,
            self.flip_time,
            self.air_time,
            self.air_time_since_jump,
            self.boost,
            self.time_since_boosted,
            self.boosting_time,
            self.supersonic_time,
            self.handbrake_val,
            self.auto_flip_timer,
            self.auto_flip_torque_scale,
            self.demo_respawn_timer,
        ] {
            x.write_to(w)?;
        }

        self.world_contact_normal.write_to(w)?;
        self.car_contact.write_to(w)?;
        self.ball_hit_info.write_to(w)
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        let phys = PhysState::from_cursor(bytes)?;
        let controls = CarControls::from_cursor(bytes)?;
        let prev_controls = CarControls::from_cursor(bytes)?;

        let mut flags = [false; 14];
        for flag in &mut flags {
            *flag = bool::from_cursor(bytes)?;
        }
        let [
            is_on_ground,
            wheel_0,
            wheel_1,
            wheel_2,
            wheel_3,
            has_jumped,
            has_double_jumped,
            has_flipped,
            is_flipping,
            is_jumping,
            is_boosting,
            is_supersonic,
            is_auto_flipping,
            is_demoed,
        ] = flags;

        let flip_rel_torque = Vec3::from_cursor(bytes)?;

        let mut times = [0.0; 12];
        for x in &mut times {
            *x = f32::from_cursor(bytes)?;
        }
        let [
            jump_time,
            flip_time,
            air_time,
            air_time_since_jump,
            boost,
            time_since_boosted,
            boosting_time,
            supersonic_time,
            handbrake_val,
            auto_flip_timer,
            auto_flip_torque_scale,
            demo_respawn_timer,
        ] = times;

        Ok(Self {
            phys,
            controls,
            prev_controls,
            is_on_ground,
            wheels_with_contact: [wheel_0, wheel_1, wheel_2, wheel_3],
            has_jumped,
            has_double_jumped,
            has_flipped,
            flip_rel_torque,
            jump_time,
            flip_time,
            is_flipping,
            is_jumping,
            air_time,
            air_time_since_jump,
            boost,
            time_since_boosted,
            is_boosting,
            boosting_time,
            is_supersonic,
            supersonic_time,
            handbrake_val,
            is_auto_flipping,
            auto_flip_timer,
            auto_flip_torque_scale,
            world_contact_normal: Option::from_cursor(bytes)?,
            car_contact: Option::from_cursor(bytes)?,
            is_demoed,
            demo_respawn_timer,
            ball_hit_info: Option::from_cursor(bytes)?,
        })
    }
}

impl BinCodec for WheelPairConfig {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        self.wheel_radius.write_to(w)?;
        self.suspension_rest_length.write_to(w)?;
        self.connection_point_offset.write_to(w)
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        Ok(Self {
            wheel_radius: f32::from_cursor(bytes)?,
            suspension_rest_length: f32::from_cursor(bytes)?,
            connection_point_offset: Vec3::from_cursor(bytes)?,
        })
    }
}

impl BinCodec for CarConfig {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        self.hitbox_size.write_to(w)?;
        self.hitbox_pos_offset.write_to(w)?;
        self.front_wheels.write_to(w)?;
        self.back_wheels.write_to(w)?;
        self.three_wheels.write_to(w)?;
        self.dodge_deadzone.write_to(w)
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        Ok(Self {
            hitbox_size: Vec3::from_cursor(bytes)?,
            hitbox_pos_offset: Vec3::from_cursor(bytes)?,
            front_wheels: WheelPairConfig::from_cursor(bytes)?,
            back_wheels: WheelPairConfig::from_cursor(bytes)?,
            three_wheels: bool::from_cursor(bytes)?,
            dodge_deadzone: f32::from_cursor(bytes)?,
        })
    }
}

impl BinCodec for CarInfo {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        self.id.write_to(w)?;
        w.write_u8(self.team as u8)?;
        self.state.write_to(w)?;
        self.config.write_to(w)
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        Ok(Self {
            id: u64::from_cursor(bytes)?,
            team: Team::try_from(bytes.read_u8()?).map_err(|()| invalid_data("bad team"))?,
            state: CarState::from_cursor(bytes)?,
            config: CarConfig::from_cursor(bytes)?,
        })
    }
}

impl BinCodec for BoostPadInfo {
    fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        self.config.pos.write_to(w)?;
        self.config.is_big.write_to(w)?;
        self.state.is_active.write_to(w)?;
        self.state.cooldown.write_to(w)?;
        self.state.cur_locked_car_id.write_to(w)?;
        self.state.prev_locked_car_id.write_to(w)
    }

    fn from_cursor(bytes: &mut Cursor<&[u8]>) -> IoResult<Self> {
        Ok(Self {
            config: BoostPadConfig {
                pos: Vec3::from_cursor(bytes)?,
                is_big: bool::from_cursor(bytes)?,
            },
            state: BoostPadState {
                is_active: bool::from_cursor(bytes)?,
                cooldown: f32::from_cursor(bytes)?,
                cur_locked_car_id: u64::from_cursor(bytes)?,
                prev_locked_car_id: u64::from_cursor(bytes)?,
            },
        })
    }
}

impl GameState {
    /// Writes the little endian snapshot format read by [`GameState::from_bytes`]
    pub fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        w.write_all(&MAGIC)?;
        w.write_u16::<LittleEndian>(VERSION)?;

        self.tick_rate.write_to(w)?;
        self.tick_count.write_to(w)?;
        self.rng_state.write_to(w)?;
        w.write_u8(self.game_mode as u8)?;
        self.ball.write_to(w)?;
        self.cars.write_to(w)?;
        self.pads.write_to(w)
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        if let Err(err) = self.write_to(&mut bytes) {
            // Writing into a Vec only fails on absurd list lengths
            log::error!("Failed to encode game state: {err}");
            bytes.clear();
        }
        bytes
    }

    fn read_from(bytes: &[u8]) -> IoResult<Self> {
        let mut bytes = Cursor::new(bytes);

        let mut magic = [0; 4];
        bytes.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(invalid_data("not a game state"));
        }

        let version = bytes.read_u16::<LittleEndian>()?;
        if version != VERSION {
            return Err(invalid_data("unsupported game state version"));
        }

        let state = Self {
            tick_rate: f32::from_cursor(&mut bytes)?,
            tick_count: u64::from_cursor(&mut bytes)?,
            rng_state: u64::from_cursor(&mut bytes)?,
            game_mode: GameMode::try_from(bytes.read_u8()?)
                .map_err(|()| invalid_data("bad game mode"))?,
            ball: BallState::from_cursor(&mut bytes)?,
            cars: Vec::from_cursor(&mut bytes)?,
            pads: Vec::from_cursor(&mut bytes)?,
        };

        if bytes.position() != bytes.get_ref().len() as u64 {
            return Err(invalid_data("trailing bytes after game state"));
        }

        Ok(state)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read_from(bytes).map_err(|err| ArenaError::Decode(err.to_string()))
    }
}

impl Arena {
    #[must_use]
    pub fn get_game_state(&self) -> GameState {
        GameState {
            tick_rate: self.get_tick_rate(),
            tick_count: self.objects.tick_count,
            rng_state: self.rng_state(),
            game_mode: self.objects.game_mode,
            ball: self.objects.ball.state,
            cars: self
                .objects
                .cars
                .iter()
                .map(|car| CarInfo {
                    id: car.id,
                    team: car.team,
                    state: car.state,
                    config: *car.config(),
                })
                .collect(),
            pads: self
                .objects
                .boost_pads
                .pads()
                .iter()
                .map(|pad| BoostPadInfo {
                    config: pad.config,
                    state: pad.state,
                })
                .collect(),
        }
    }

    /// Restores a snapshot of this arena.
    ///
    /// Everything is validated before anything is applied. Cars missing from
    /// the snapshot keep their current state, car teams and configs are not changed.
    pub fn set_game_state(&mut self, state: &GameState) -> Result<()> {
        let game_mode = self.objects.game_mode;
        if state.game_mode != game_mode {
            return Err(ArenaError::GameModeMismatch {
                expected: game_mode,
                got: state.game_mode,
            });
        }

        if state.tick_rate != self.get_tick_rate() {
            return Err(ArenaError::InvalidTickRate(state.tick_rate));
        }

        let num_pads = self.num_pads();
        if state.pads.len() != num_pads {
            return Err(ArenaError::PadCountMismatch {
                expected: num_pads,
                got: state.pads.len(),
            });
        }

        for pad in &state.pads {
            Self::validate_pad_state(&pad.state)?;
        }

        let ball_state = Self::validate_ball_state(&state.ball)?;

        let car_states = state
            .cars
            .iter()
            .map(|info| {
                let car_idx = self.objects.car_idx(info.id)?;
                Ok((car_idx, self.validate_car_state(info.id, &info.state)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let bodies = self.world.bodies_mut();
        for (car_idx, car_state) in car_states {
            let car = &mut self.objects.cars[car_idx];
            car.set_state(&mut bodies[car.rigid_body_idx], &car_state);
        }

        let ball = &mut self.objects.ball;
        ball.set_state(&mut bodies[ball.rigid_body_idx], &ball_state);

        for (pad, info) in self.objects.boost_pads.pads_mut().iter_mut().zip(&state.pads) {
            pad.state = info.state;
        }

        self.objects.tick_count = state.tick_count;
        self.set_rng_state(state.rng_state);
        self.goal_latched = false;
        log::debug!("Game state restored at tick {}", state.tick_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> GameState {
        let mut car_state = CarState {
            boost: 42.5,
            has_jumped: true,
            world_contact_normal: Some(Vec3::Z),
            car_contact: Some(CarContact {
                other_car_id: 2,
                cooldown_timer: 0.125,
            }),
            ..CarState::DEFAULT
        };
        car_state.pos = Vec3::new(100.0, -200.0, 17.0);
        car_state.controls.throttle = 0.5;
        car_state.wheels_with_contact = [true, false, true, false];

        GameState {
            tick_rate: 120.0,
            tick_count: 987,
            rng_state: 0x5eed,
            game_mode: GameMode::Hoops,
            ball: BallState {
                last_hit: Some(BallHitInfo {
                    car_id: 1,
                    tick_count_when_hit: 900,
                    ..BallHitInfo::default()
                }),
                ..BallState::DEFAULT
            },
            cars: vec![CarInfo {
                id: 1,
                team: Team::Orange,
                state: car_state,
                config: CarConfig::PSYCLOPS,
            }],
            pads: vec![BoostPadInfo {
                config: BoostPadConfig::new(Vec3::new(1.0, 2.0, 3.0), true),
                state: BoostPadState {
                    is_active: false,
                    cooldown: 3.5,
                    cur_locked_car_id: 1,
                    prev_locked_car_id: 0,
                },
            }],
        }
    }

    #[test]
    fn bytes_restore_identical_state() {
        let state = sample_state();
        let bytes = state.to_bytes();
        assert_eq!(&bytes[..4], b"CBGS");
        assert_eq!(GameState::from_bytes(&bytes), Ok(state));
    }

    #[test]
    fn truncated_bytes_are_rejected() {
        let bytes = sample_state().to_bytes();
        let err = GameState::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, ArenaError::Decode(_)));
    }

    #[test]
    fn trailing_and_foreign_bytes_are_rejected() {
        let mut bytes = sample_state().to_bytes();
        bytes.push(0);
        assert!(GameState::from_bytes(&bytes).is_err());

        assert!(GameState::from_bytes(b"nope").is_err());
    }

    #[test]
    fn bad_bool_is_rejected() {
        let state = GameState {
            ball: BallState::DEFAULT,
            ..sample_state()
        };
        let mut bytes = state.to_bytes();

        // ball.last_hit flag sits right after the fixed header and the ball physics
        let flag_offset = 4 + 2 + 4 + 8 + 8 + 1 + 18 * 4;
        assert_eq!(bytes[flag_offset], 0);
        bytes[flag_offset] = 2;
        assert!(GameState::from_bytes(&bytes).is_err());
    }
}
