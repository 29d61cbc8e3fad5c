//! Error types for the simulation core

use thiserror::Error;

/// A tick request the scenario refused to process
///
/// The scenario is left untouched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickError {
    #[error("invalid timestep {0}: dt must be finite and non-negative")]
    InvalidTimestep(f64),

    #[error("invalid control input: {intent} = {value} is not a finite value in [0, 1]")]
    InvalidInput { intent: &'static str, value: f64 },
}

/// A scenario configuration that cannot be simulated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("scenario has no priority agent")]
    NoPriorityAgent,

    #[error("scenario has {0} priority agents, expected exactly one")]
    MultiplePriorityAgents(usize),

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("max steering must be in (0, 90] degrees, got {0}")]
    SteeringOutOfRange(f64),

    #[error("{field} range is inverted: [{min}, {max})")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
}
