//! Control intents delivered to the ego vehicle once per tick

use super::error::TickError;

/// Driver intents for one tick
///
/// Each intent is a normalized scalar in `[0, 1]`. An intent counts as held
/// when it is above zero, and ramp rates scale with its magnitude, so
/// keyboard input maps to exactly `0.0` or `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlInput {
    pub throttle: f64,
    pub brake: f64,
    pub steer_left: f64,
    pub steer_right: f64,
}

impl ControlInput {
    /// No intent held; the vehicle coasts and the wheel centers
    pub const NONE: ControlInput = ControlInput {
        throttle: 0.0,
        brake: 0.0,
        steer_left: 0.0,
        steer_right: 0.0,
    };

    /// Build intents from four held/released keys
    pub fn from_keys(up: bool, down: bool, left: bool, right: bool) -> Self {
        let level = |held: bool| if held { 1.0 } else { 0.0 };
        Self {
            throttle: level(up),
            brake: level(down),
            steer_left: level(left),
            steer_right: level(right),
        }
    }

    pub fn throttle_held(&self) -> bool {
        self.throttle > 0.0
    }

    pub fn brake_held(&self) -> bool {
        self.brake > 0.0
    }

    pub fn steer_left_held(&self) -> bool {
        self.steer_left > 0.0
    }

    pub fn steer_right_held(&self) -> bool {
        self.steer_right > 0.0
    }

    /// Reject non-finite or out-of-range intents before they reach the integrator
    pub fn validate(&self) -> Result<(), TickError> {
        let intents = [
            ("throttle", self.throttle),
            ("brake", self.brake),
            ("steer_left", self.steer_left),
            ("steer_right", self.steer_right),
        ];
        for (intent, value) in intents {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(TickError::InvalidInput { intent, value });
            }
        }
        Ok(())
    }
}
