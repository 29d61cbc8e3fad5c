//! UI components and resources for linking Bevy entities to simulation state

use bevy::prelude::*;

use crate::simulation::{AgentId, Scenario, TelemetryWriter};

/// Resource wrapper for the scenario
#[derive(Resource)]
pub struct ScenarioResource(pub Scenario);

/// Telemetry log, when one was requested
#[derive(Resource, Default)]
pub struct TelemetryResource(pub Option<TelemetryWriter>);

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Marker component for the road surface and its markings
#[derive(Component)]
pub struct Road;

/// Links a Bevy entity to a simulation agent (ego included)
#[derive(Component)]
pub struct AgentLink(pub AgentId);

/// Marker for the status overlay text
#[derive(Component)]
pub struct HudText;
