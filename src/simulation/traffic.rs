//! Constant-velocity traffic for the corridor simulation

use super::types::{Pose, Velocity};

/// A non-controlled car moving at a fixed velocity
///
/// Traffic cars never rotate. The scenario advances them with a negated
/// timestep so a positive `y` speed carries them toward decreasing `y`.
#[derive(Debug, Clone)]
pub struct LinearVehicle {
    pub pose: Pose,
    velocity: Velocity,
}

impl LinearVehicle {
    pub fn new(pose: Pose, velocity: Velocity) -> Self {
        Self { pose, velocity }
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// Euler step; `delta_secs` may be negative
    pub fn update(&mut self, delta_secs: f64) {
        self.pose.x += self.velocity.x * delta_secs;
        self.pose.y += self.velocity.y * delta_secs;
    }
}
