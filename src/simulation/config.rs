//! Scenario configuration
//!
//! Every tunable of a run lives here. Defaults reproduce the ambulance
//! corridor layout; a JSON file can override any subset of fields.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::car::VehicleLimits;
use super::error::ConfigError;
use super::types::{
    CorridorBounds, ProximityBox, DEFAULT_AGENT_SPEED, EXIT_THRESHOLD,
};

/// Start state and limits of the ego car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EgoConfig {
    /// Initial x is drawn uniformly from `[min, max)`
    pub x_offset_range: (f64, f64),
    pub y: f64,
    /// Degrees
    pub heading: f64,
    pub initial_speed: f64,
    pub length: f64,
    pub max_steering: f64,
    pub max_acceleration: f64,
    pub max_velocity: f64,
    pub brake_deceleration: f64,
    pub free_deceleration: f64,
    pub steering_rate: f64,
    pub acceleration_ramp: f64,
}

impl Default for EgoConfig {
    fn default() -> Self {
        let limits = VehicleLimits::default();
        Self {
            x_offset_range: (6.0, 8.0),
            y: 64.0,
            heading: 90.0,
            initial_speed: DEFAULT_AGENT_SPEED,
            length: limits.length,
            max_steering: limits.max_steering,
            max_acceleration: limits.max_acceleration,
            max_velocity: limits.max_velocity,
            brake_deceleration: limits.brake_deceleration,
            free_deceleration: limits.free_deceleration,
            steering_rate: limits.steering_rate,
            acceleration_ramp: limits.acceleration_ramp,
        }
    }
}

impl EgoConfig {
    pub fn limits(&self) -> VehicleLimits {
        VehicleLimits {
            length: self.length,
            max_acceleration: self.max_acceleration,
            max_steering: self.max_steering,
            max_velocity: self.max_velocity,
            brake_deceleration: self.brake_deceleration,
            free_deceleration: self.free_deceleration,
            steering_rate: self.steering_rate,
            acceleration_ramp: self.acceleration_ramp,
        }
    }
}

/// A constant-velocity agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Speed along the corridor toward decreasing y
    #[serde(default = "default_agent_speed")]
    pub speed: f64,
    /// The agent whose exit ends the scenario successfully
    #[serde(default)]
    pub priority: bool,
}

fn default_agent_speed() -> f64 {
    DEFAULT_AGENT_SPEED
}

impl AgentConfig {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            speed: DEFAULT_AGENT_SPEED,
            priority: false,
        }
    }

    pub fn priority(mut self) -> Self {
        self.priority = true;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }
}

/// Complete description of a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub ego: EgoConfig,
    /// Listed in collision evaluation order
    pub agents: Vec<AgentConfig>,
    pub corridor: CorridorBounds,
    pub proximity: ProximityBox,
    pub exit_threshold: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            ego: EgoConfig::default(),
            agents: vec![
                AgentConfig::new("ambulance", 7.0, 70.0).priority(),
                AgentConfig::new("center", 7.0, 57.0),
                AgentConfig::new("far-right", 11.5, 20.0),
                AgentConfig::new("far-left", 3.0, 89.0),
                AgentConfig::new("left", 3.0, 57.0),
                AgentConfig::new("right", 11.5, 57.0),
            ],
            corridor: CorridorBounds::default(),
            proximity: ProximityBox::default(),
            exit_threshold: EXIT_THRESHOLD,
        }
    }
}

impl ScenarioConfig {
    /// Load a configuration from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario config {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid scenario config {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: ScenarioConfig =
            serde_json::from_str(text).context("Failed to parse scenario JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty-printed JSON accepted by `from_json_str`
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize scenario config")
    }

    /// Index of the priority agent in `agents`
    pub fn priority_index(&self) -> Result<usize, ConfigError> {
        let mut priorities = self
            .agents
            .iter()
            .enumerate()
            .filter(|(_, agent)| agent.priority)
            .map(|(index, _)| index);

        match (priorities.next(), priorities.count()) {
            (None, _) => Err(ConfigError::NoPriorityAgent),
            (Some(index), 0) => Ok(index),
            (Some(_), extra) => Err(ConfigError::MultiplePriorityAgents(extra + 1)),
        }
    }

    /// Check that the configuration describes a scenario the core can run
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ego = &self.ego;

        let finite = [
            ("ego.x_offset_range.min", ego.x_offset_range.0),
            ("ego.x_offset_range.max", ego.x_offset_range.1),
            ("ego.y", ego.y),
            ("ego.heading", ego.heading),
            ("ego.initial_speed", ego.initial_speed),
            ("corridor.min_x", self.corridor.min_x),
            ("corridor.max_x", self.corridor.max_x),
            ("exit_threshold", self.exit_threshold),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        let positive = [
            ("ego.length", ego.length),
            ("ego.max_velocity", ego.max_velocity),
            ("proximity.longitudinal", self.proximity.longitudinal),
            ("proximity.lateral", self.proximity.lateral),
        ];
        for (field, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let non_negative = [
            ("ego.max_acceleration", ego.max_acceleration),
            ("ego.brake_deceleration", ego.brake_deceleration),
            ("ego.free_deceleration", ego.free_deceleration),
            ("ego.steering_rate", ego.steering_rate),
            ("ego.acceleration_ramp", ego.acceleration_ramp),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if !(ego.max_steering > 0.0 && ego.max_steering <= 90.0) {
            return Err(ConfigError::SteeringOutOfRange(ego.max_steering));
        }

        let (min, max) = ego.x_offset_range;
        if min > max {
            return Err(ConfigError::InvertedRange {
                field: "ego.x_offset_range",
                min,
                max,
            });
        }

        if self.corridor.min_x > self.corridor.max_x {
            return Err(ConfigError::InvertedRange {
                field: "corridor",
                min: self.corridor.min_x,
                max: self.corridor.max_x,
            });
        }

        for agent in &self.agents {
            for (field, value) in [("agent.x", agent.x), ("agent.y", agent.y), ("agent.speed", agent.speed)] {
                if !value.is_finite() {
                    return Err(ConfigError::NotFinite { field, value });
                }
            }
        }

        self.priority_index()?;
        Ok(())
    }
}
