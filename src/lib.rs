//! Corridor Simulation Library
//!
//! An ego car, constant-velocity traffic and a priority vehicle in a
//! straight corridor. Runs independently or with a Bevy UI.

pub mod simulation;

#[cfg(feature = "ui")]
pub mod ui;
