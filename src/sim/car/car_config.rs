use crate::math::Vec3;

const HITBOX_SIZES: [Vec3; 7] = [
    Vec3::new(120.507, 86.6994, 38.6591), // OCTANE
    Vec3::new(130.427, 85.7799, 33.8),    // DOMINUS
    Vec3::new(131.32, 87.1704, 31.8944),  // PLANK
    Vec3::new(133.992, 83.021, 32.8),     // BREAKOUT
    Vec3::new(129.519, 84.6879, 36.6591), // HYBRID
    Vec3::new(123.22, 79.2103, 44.1591),  // MERC
    Vec3::new(120.507 + 0.134, 86.6994 + 0.134, 38.6591 + 0.134), // PSYCLOPS
];

const HITBOX_OFFSETS: [Vec3; 7] = [
    Vec3::new(13.8757, 0.0, 20.755),
    Vec3::new(9.0, 0.0, 15.75),
    Vec3::new(9.00857, 0.0, 12.0942),
    Vec3::new(12.5, 0.0, 11.75),
    Vec3::new(13.8757, 0.0, 20.755),
    Vec3::new(11.3757, 0.0, 21.505),
    Vec3::new(13.8757, 0.0, 15.0),
];

const FRONT_WHEEL_RADS: [f32; 7] = [12.5, 12.0, 12.5, 13.5, 12.5, 15.0, 12.5];
const BACK_WHEEL_RADS: [f32; 7] = [15.0, 13.5, 17.0, 15.0, 15.0, 15.0, 15.0];

const FRONT_WHEEL_SUS_REST: [f32; 7] = [38.755, 33.95, 31.9242, 29.7, 38.755, 39.505, 33.0];
const BACK_WHEEL_SUS_REST: [f32; 7] = [37.055, 33.85, 27.9242, 29.666, 37.055, 39.105, 31.3];

const FRONT_WHEELS_OFFSET: [Vec3; 7] = [
    Vec3::new(51.25, 25.90, 20.755),
    Vec3::new(50.30, 31.10, 15.75),
    Vec3::new(49.97, 27.80, 12.0942),
    Vec3::new(51.50, 26.67, 11.75),
    Vec3::new(51.25, 25.90, 20.755),
    Vec3::new(51.25, 25.90, 21.505),
    Vec3::new(51.25, 5.000, 15.000),
];

const BACK_WHEELS_OFFSET: [Vec3; 7] = [
    Vec3::new(-33.75, 29.50, 20.755),
    Vec3::new(-34.75, 33.00, 15.75),
    Vec3::new(-35.43, 20.28, 12.0942),
    Vec3::new(-35.75, 35.00, 11.75),
    Vec3::new(-34.00, 29.50, 20.755),
    Vec3::new(-33.75, 29.50, 21.505),
    Vec3::new(-33.75, 29.50, 15.000),
];

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WheelPairConfig {
    pub wheel_radius: f32,
    pub suspension_rest_length: f32,
    /// Suspension anchor of the right wheel, the left one mirrors `y`
    pub connection_point_offset: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarConfig {
    /// Full extents, not half extents
    pub hitbox_size: Vec3,
    /// Moves the hitbox only, the center of mass stays at the car origin
    pub hitbox_pos_offset: Vec3,
    pub front_wheels: WheelPairConfig,
    pub back_wheels: WheelPairConfig,
    /// Psyclops steering and tire friction curves
    pub three_wheels: bool,
    /// Minimum `|yaw| + |pitch| + |roll|` for a jump to become a flip
    pub dodge_deadzone: f32,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self::OCTANE
    }
}

impl CarConfig {
    pub const OCTANE: Self = Self::make_car_config(0, false);
    pub const DOMINUS: Self = Self::make_car_config(1, false);
    pub const PLANK: Self = Self::make_car_config(2, false);
    pub const BREAKOUT: Self = Self::make_car_config(3, false);
    pub const HYBRID: Self = Self::make_car_config(4, false);
    pub const MERC: Self = Self::make_car_config(5, false);
    pub const PSYCLOPS: Self = Self::make_car_config(6, true);

    pub const ALL_PRESETS: [Self; 7] = [
        Self::OCTANE,
        Self::DOMINUS,
        Self::PLANK,
        Self::BREAKOUT,
        Self::HYBRID,
        Self::MERC,
        Self::PSYCLOPS,
    ];

    const fn make_car_config(index: usize, three_wheels: bool) -> Self {
        Self {
            hitbox_size: HITBOX_SIZES[index],
            hitbox_pos_offset: HITBOX_OFFSETS[index],
            front_wheels: WheelPairConfig {
                wheel_radius: FRONT_WHEEL_RADS[index],
                suspension_rest_length: FRONT_WHEEL_SUS_REST[index],
                connection_point_offset: FRONT_WHEELS_OFFSET[index],
            },
            back_wheels: WheelPairConfig {
                wheel_radius: BACK_WHEEL_RADS[index],
                suspension_rest_length: BACK_WHEEL_SUS_REST[index],
                connection_point_offset: BACK_WHEELS_OFFSET[index],
            },
            three_wheels,
            dodge_deadzone: 0.5,
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.hitbox_size.is_finite()
            && self.hitbox_pos_offset.is_finite()
            && [self.front_wheels, self.back_wheels].iter().all(|w| {
                w.wheel_radius.is_finite()
                    && w.suspension_rest_length.is_finite()
                    && w.connection_point_offset.is_finite()
            })
            && self.dodge_deadzone.is_finite()
    }
}
