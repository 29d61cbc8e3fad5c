//! World setup systems for camera, lighting and the road

use bevy::prelude::*;

use super::components::{MainCamera, Road, ScenarioResource};

/// Spacing between dashed lane marks, in corridor units
const DASH_SPACING: f32 = 8.0;
const DASH_LENGTH: f32 = 5.0;

/// System to setup the world environment (road, lighting, camera)
pub fn setup_world(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    scenario: Res<ScenarioResource>,
) {
    let scenario = &scenario.0;
    let bounds = scenario.config().corridor;
    let min_x = bounds.min_x as f32;
    let width = bounds.width() as f32;
    let center_x = min_x + width / 2.0;

    let road_length = scenario
        .agents
        .iter()
        .map(|agent| agent.vehicle.pose.y)
        .fold(scenario.ego.pose.y, f64::max) as f32
        + 10.0;
    let center_z = road_length / 2.0;

    // Top-down camera with decreasing y (direction of travel) at the top of the screen
    commands.spawn((
        MainCamera,
        Camera3d::default(),
        Transform::from_xyz(center_x, road_length * 1.1, center_z)
            .looking_at(Vec3::new(center_x, 0.0, center_z), Vec3::NEG_Z),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(4.0, 50.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Road,
        Mesh3d(meshes.add(Cuboid::new(width, 0.02, road_length))),
        MeshMaterial3d(materials.add(Color::srgb(0.59, 0.59, 0.59))),
        Transform::from_xyz(center_x, 0.01, center_z),
    ));

    let marking = materials.add(Color::WHITE);

    // Solid corridor edges
    for edge_x in [bounds.min_x as f32, bounds.max_x as f32] {
        commands.spawn((
            Road,
            Mesh3d(meshes.add(Cuboid::new(0.6, 0.03, road_length))),
            MeshMaterial3d(marking.clone()),
            Transform::from_xyz(edge_x, 0.02, center_z),
        ));
    }

    // Dashed lane dividers splitting the corridor into three lanes
    let dash = meshes.add(Cuboid::new(0.6, 0.03, DASH_LENGTH));
    for lane in 1..3 {
        let lane_x = min_x + width * lane as f32 / 3.0;
        let mut z = DASH_LENGTH / 2.0;
        while z < road_length {
            commands.spawn((
                Road,
                Mesh3d(dash.clone()),
                MeshMaterial3d(marking.clone()),
                Transform::from_xyz(lane_x, 0.02, z),
            ));
            z += DASH_SPACING;
        }
    }
}
