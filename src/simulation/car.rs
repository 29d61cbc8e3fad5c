//! Ego car kinematics for the corridor simulation
//!
//! Single-track (bicycle) model. Standalone implementation that doesn't
//! depend on Bevy.

use super::control::ControlInput;
use super::types::Pose;

/// Limits of the ego car, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleLimits {
    /// Wheelbase used for the turning radius
    pub length: f64,
    pub max_acceleration: f64,
    /// Degrees
    pub max_steering: f64,
    pub max_velocity: f64,
    pub brake_deceleration: f64,
    /// Deceleration applied while coasting
    pub free_deceleration: f64,
    /// Degrees per second while a steering intent is held
    pub steering_rate: f64,
    /// Growth of acceleration per second while throttle or brake is held
    pub acceleration_ramp: f64,
}

impl Default for VehicleLimits {
    fn default() -> Self {
        Self {
            length: 4.0,
            max_acceleration: 5.0,
            max_steering: 30.0,
            max_velocity: 13.85,
            brake_deceleration: 5.0,
            free_deceleration: 1.0,
            steering_rate: 30.0,
            acceleration_ramp: 1.0,
        }
    }
}

/// The user-controlled car
#[derive(Debug, Clone)]
pub struct KinematicVehicle {
    pub pose: Pose,
    /// Forward speed; lateral motion comes only from heading changes
    pub velocity_x: f64,
    pub acceleration: f64,
    /// Degrees, positive turns left
    pub steering_angle: f64,
    limits: VehicleLimits,
}

impl KinematicVehicle {
    pub fn new(pose: Pose, velocity_x: f64, limits: VehicleLimits) -> Self {
        Self {
            pose,
            velocity_x: velocity_x.clamp(-limits.max_velocity, limits.max_velocity),
            acceleration: 0.0,
            steering_angle: 0.0,
            limits,
        }
    }

    pub fn limits(&self) -> &VehicleLimits {
        &self.limits
    }

    /// Apply the driver's intents, then advance the pose by `dt`
    pub fn update(&mut self, delta_secs: f64, control: &ControlInput) {
        debug_assert!(delta_secs.is_finite(), "non-finite dt reached the ego car");
        debug_assert!(
            control.validate().is_ok(),
            "unvalidated control input reached the ego car"
        );

        let stop_now = self.apply_longitudinal(delta_secs, control);
        self.apply_lateral(delta_secs, control);
        self.integrate(delta_secs, stop_now);
    }

    /// Advance the pose with the current acceleration and steering
    pub fn advance(&mut self, delta_secs: f64) {
        self.integrate(delta_secs, false);
    }

    /// Turning radius for the current steering angle, `None` when driving straight
    pub fn turning_radius(&self) -> Option<f64> {
        if self.steering_angle == 0.0 {
            None
        } else {
            Some(self.limits.length / self.steering_angle.to_radians().sin())
        }
    }

    /// Returns true when the car should come to an exact stop this tick
    fn apply_longitudinal(&mut self, delta_secs: f64, control: &ControlInput) -> bool {
        let limits = self.limits;
        let mut stop_now = false;

        if control.throttle_held() {
            if self.velocity_x < 0.0 {
                // Reversing against the request: brake hard first
                self.acceleration = limits.brake_deceleration;
            } else {
                self.acceleration += limits.acceleration_ramp * delta_secs * control.throttle;
            }
        } else if control.brake_held() {
            if self.velocity_x > 0.0 {
                self.acceleration = -limits.brake_deceleration;
            } else {
                self.acceleration -= limits.acceleration_ramp * delta_secs * control.brake;
            }
        } else if self.velocity_x.abs() > delta_secs * limits.free_deceleration {
            self.acceleration = -limits.free_deceleration.copysign(self.velocity_x);
        } else if delta_secs != 0.0 {
            self.acceleration = -self.velocity_x / delta_secs;
            stop_now = true;
        }

        self.acceleration = self
            .acceleration
            .clamp(-limits.max_acceleration, limits.max_acceleration);
        stop_now
    }

    fn apply_lateral(&mut self, delta_secs: f64, control: &ControlInput) {
        let rate = self.limits.steering_rate * delta_secs;

        if control.steer_right_held() {
            self.steering_angle -= rate * control.steer_right;
        } else if control.steer_left_held() {
            self.steering_angle += rate * control.steer_left;
        } else {
            self.steering_angle = 0.0;
        }

        self.steering_angle = self
            .steering_angle
            .clamp(-self.limits.max_steering, self.limits.max_steering);
    }

    fn integrate(&mut self, delta_secs: f64, stop_now: bool) {
        let max_velocity = self.limits.max_velocity;
        self.velocity_x = if stop_now {
            0.0
        } else {
            (self.velocity_x + self.acceleration * delta_secs).clamp(-max_velocity, max_velocity)
        };

        let angular_velocity = match self.turning_radius() {
            Some(radius) => self.velocity_x / radius,
            None => 0.0,
        };

        // Vehicle frame to world frame: rotate (v, 0) by -heading
        let heading = self.pose.heading.to_radians();
        self.pose.x += self.velocity_x * heading.cos() * delta_secs;
        self.pose.y -= self.velocity_x * heading.sin() * delta_secs;
        self.pose.heading += angular_velocity.to_degrees() * delta_secs;
    }
}
