//! UI module that visualizes the scenario using Bevy
//!
//! This module is purely for visualization and keyboard input - all simulation
//! logic is in the `simulation` module. The UI ticks `Scenario` on Bevy's fixed
//! timestep and renders the poses it reports.

mod components;
mod input;
mod spawner;
mod sync;
mod world;

use bevy::log::warn;
use bevy::prelude::*;
use std::path::PathBuf;

pub use components::{ScenarioResource, TelemetryResource};

use crate::simulation::{Scenario, TelemetryWriter};
use input::handle_input;
use spawner::{setup_hud, spawn_vehicles};
use sync::{sync_vehicles, tick_simulation, update_hud};
use world::setup_world;

/// Simulation ticks per second
pub const TICK_HZ: f64 = 60.0;

/// Plugin to register all UI systems
pub struct ScenarioPlugin {
    pub scenario: Scenario,
    /// Append telemetry here when set
    pub log_file: Option<PathBuf>,
}

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        let telemetry = self
            .log_file
            .as_ref()
            .and_then(|path| match TelemetryWriter::append_to(path) {
                Ok(writer) => Some(writer),
                Err(err) => {
                    warn!("Running without telemetry: {:#}", err);
                    None
                }
            });

        app.insert_resource(ScenarioResource(self.scenario.clone()))
            .insert_resource(TelemetryResource(telemetry))
            .insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
            .add_systems(
                Startup,
                (setup_world, spawn_vehicles.after(setup_world), setup_hud),
            )
            .add_systems(FixedUpdate, tick_simulation)
            .add_systems(Update, (sync_vehicles, update_hud, handle_input));
    }
}
