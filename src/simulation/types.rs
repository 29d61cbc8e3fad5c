//! Core types for the corridor simulation
//!
//! These are standalone types that don't depend on Bevy.

use serde::{Deserialize, Serialize};

/// A unique identifier for an agent in the scenario
///
/// The ego vehicle is always `AgentId::EGO`; non-controlled agents are
/// numbered from 1 in configuration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(pub usize);

impl AgentId {
    pub const EGO: AgentId = AgentId(0);

    pub fn is_ego(&self) -> bool {
        *self == Self::EGO
    }
}

/// Position and heading of a vehicle in corridor units
///
/// `heading` is in degrees. With the default heading of 90 the ego vehicle
/// travels toward decreasing `y`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    /// Longitudinal (y axis) separation to another pose
    pub fn longitudinal_gap(&self, other: &Pose) -> f64 {
        (self.y - other.y).abs()
    }

    /// Lateral (x axis) separation to another pose
    pub fn lateral_gap(&self, other: &Pose) -> f64 {
        (self.x - other.x).abs()
    }
}

/// A planar velocity in corridor units per second
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

impl Velocity {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Lateral limits of the drivable corridor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorridorBounds {
    pub min_x: f64,
    pub max_x: f64,
}

impl CorridorBounds {
    pub fn contains(&self, x: f64) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }
}

impl Default for CorridorBounds {
    fn default() -> Self {
        Self {
            min_x: 0.0,
            max_x: CORRIDOR_MAX_X,
        }
    }
}

/// Half-extents of the axis-aligned box used for collision checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityBox {
    pub longitudinal: f64,
    pub lateral: f64,
}

impl ProximityBox {
    /// Whether two poses are strictly inside each other's box
    pub fn overlaps(&self, a: &Pose, b: &Pose) -> bool {
        a.longitudinal_gap(b) < self.longitudinal && a.lateral_gap(b) < self.lateral
    }
}

impl Default for ProximityBox {
    fn default() -> Self {
        Self {
            longitudinal: PROXIMITY_LONGITUDINAL,
            lateral: PROXIMITY_LATERAL,
        }
    }
}

/// Result of evaluating the termination conditions for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationStatus {
    Running,
    /// The ego vehicle entered another agent's proximity box
    Collision { with: AgentId },
    /// An agent left the corridor
    OutOfBounds { agent: AgentId },
    /// The priority vehicle left the visible area
    Completed,
}

impl SimulationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SimulationStatus::Running)
    }
}

/// Lifecycle of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioState {
    Idle,
    Running,
    Completed,
    Crashed,
    OutOfBounds,
}

impl ScenarioState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScenarioState::Completed | ScenarioState::Crashed | ScenarioState::OutOfBounds
        )
    }
}

impl From<SimulationStatus> for ScenarioState {
    fn from(status: SimulationStatus) -> Self {
        match status {
            SimulationStatus::Running => ScenarioState::Running,
            SimulationStatus::Collision { .. } => ScenarioState::Crashed,
            SimulationStatus::OutOfBounds { .. } => ScenarioState::OutOfBounds,
            SimulationStatus::Completed => ScenarioState::Completed,
        }
    }
}

/// Right edge of the corridor in the default layout
pub const CORRIDOR_MAX_X: f64 = 14.5;

/// Longitudinal half-extent of the proximity box (vehicle length)
pub const PROXIMITY_LONGITUDINAL: f64 = 4.0;

/// Lateral half-extent of the proximity box (vehicle width)
pub const PROXIMITY_LATERAL: f64 = 2.0;

/// The priority vehicle has left the scene once its y drops below this
pub const EXIT_THRESHOLD: f64 = 1.0;

/// Speed of the non-controlled agents and initial ego speed (about 30 km/h)
pub const DEFAULT_AGENT_SPEED: f64 = 8.31;
