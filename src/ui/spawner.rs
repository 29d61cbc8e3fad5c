//! Systems for spawning visual entities from simulation state

use bevy::prelude::*;

use super::components::{AgentLink, HudText, ScenarioResource};
use super::sync::pose_transform;
use crate::simulation::AgentId;

const VEHICLE_HEIGHT: f32 = 0.8;

/// System to create one box per vehicle
pub fn spawn_vehicles(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    scenario: Res<ScenarioResource>,
) {
    let scenario = &scenario.0;
    let proximity = scenario.config().proximity;
    // Footprint matches the collision box: length along local x, width along local z
    let body = meshes.add(Cuboid::new(
        proximity.longitudinal as f32,
        VEHICLE_HEIGHT,
        proximity.lateral as f32,
    ));

    commands.spawn((
        AgentLink(AgentId::EGO),
        Mesh3d(body.clone()),
        MeshMaterial3d(materials.add(Color::srgb(0.85, 0.15, 0.15))),
        pose_transform(&scenario.ego.pose, VEHICLE_HEIGHT / 2.0),
    ));

    for agent in &scenario.agents {
        let color = if agent.id == scenario.priority() {
            Color::srgb(1.0, 1.0, 1.0)
        } else {
            Color::srgb(0.2, 0.4, 0.8)
        };

        commands.spawn((
            AgentLink(agent.id),
            Mesh3d(body.clone()),
            MeshMaterial3d(materials.add(color)),
            pose_transform(&agent.vehicle.pose, VEHICLE_HEIGHT / 2.0),
        ));
    }
}

/// System to setup the status overlay
pub fn setup_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Auto,
                height: Val::Auto,
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                left: Val::Px(10.0),
                padding: UiRect::all(Val::Px(8.0)),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Starting..."),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                HudText,
            ));
        });
}
