#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarControls {
    pub throttle: f32,
    pub steer: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub jump: bool,
    pub boost: bool,
    pub handbrake: bool,
}

impl Default for CarControls {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CarControls {
    pub const DEFAULT: Self = Self {
        throttle: 0.0,
        steer: 0.0,
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
        jump: false,
        boost: false,
        handbrake: false,
    };

    /// Analog inputs clamped to `[-1, 1]`
    #[must_use]
    pub const fn clamp(mut self) -> Self {
        self.throttle = self.throttle.clamp(-1.0, 1.0);
        self.steer = self.steer.clamp(-1.0, 1.0);
        self.pitch = self.pitch.clamp(-1.0, 1.0);
        self.yaw = self.yaw.clamp(-1.0, 1.0);
        self.roll = self.roll.clamp(-1.0, 1.0);
        self
    }

    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.throttle.is_finite()
            && self.steer.is_finite()
            && self.pitch.is_finite()
            && self.yaw.is_finite()
            && self.roll.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limits_analog_inputs() {
        let controls = CarControls {
            throttle: 3.0,
            steer: -1.5,
            pitch: 0.25,
            yaw: -0.75,
            roll: 100.0,
            jump: true,
            ..CarControls::DEFAULT
        }
        .clamp();

        assert_eq!(controls.throttle, 1.0);
        assert_eq!(controls.steer, -1.0);
        assert_eq!(controls.pitch, 0.25);
        assert_eq!(controls.yaw, -0.75);
        assert_eq!(controls.roll, 1.0);
        assert!(controls.jump);
    }

    #[test]
    fn nan_is_not_finite() {
        let controls = CarControls {
            steer: f32::NAN,
            ..CarControls::DEFAULT
        };
        assert!(!controls.is_finite());
        assert!(CarControls::DEFAULT.is_finite());
    }
}
