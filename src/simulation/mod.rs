//! Standalone corridor simulation module
//!
//! This module contains all the core simulation logic that can run
//! independently of the Bevy game engine. It can be tested via console
//! without needing to boot up the full game.

mod car;
mod collision;
mod config;
mod control;
mod error;
mod telemetry;
mod traffic;
mod types;
mod world;

// Re-export public types for external use
// These may not be used within this crate but are part of the public API
#[allow(unused_imports)]
pub use car::{KinematicVehicle, VehicleLimits};
#[allow(unused_imports)]
pub use collision::CollisionEvaluator;
#[allow(unused_imports)]
pub use config::{AgentConfig, EgoConfig, ScenarioConfig};
pub use control::ControlInput;
#[allow(unused_imports)]
pub use error::{ConfigError, TickError};
pub use telemetry::{LogRecord, TelemetryWriter};
#[allow(unused_imports)]
pub use traffic::LinearVehicle;
#[allow(unused_imports)]
pub use types::{
    AgentId, CorridorBounds, Pose, ProximityBox, ScenarioState, SimulationStatus, Velocity,
    CORRIDOR_MAX_X, DEFAULT_AGENT_SPEED, EXIT_THRESHOLD, PROXIMITY_LATERAL,
    PROXIMITY_LONGITUDINAL,
};
pub use world::{Outcome, Scenario, TickResult, TrafficAgent, MAP_COLUMNS, MAP_ROWS};
