//! Systems for syncing Bevy entities with simulation state

use bevy::log::warn;
use bevy::prelude::*;

use super::components::{AgentLink, HudText, ScenarioResource, TelemetryResource};
use super::input::control_from_keyboard;
use crate::simulation::{Pose, ScenarioState, SimulationStatus};

/// Corridor pose to a Bevy transform: sim y runs along world z
pub fn pose_transform(pose: &Pose, height: f32) -> Transform {
    Transform::from_translation(Vec3::new(pose.x as f32, height, pose.y as f32))
        .with_rotation(Quat::from_rotation_y(pose.heading.to_radians() as f32))
}

/// System to run one simulation tick on the fixed timestep
pub fn tick_simulation(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut scenario: ResMut<ScenarioResource>,
    mut telemetry: ResMut<TelemetryResource>,
) {
    let control = control_from_keyboard(&keyboard);

    let result = match scenario.0.tick(time.delta_secs_f64(), control) {
        Ok(result) => result,
        Err(err) => {
            warn!("Skipping tick: {}", err);
            return;
        }
    };

    let write_error = match (telemetry.0.as_mut(), result.log_record) {
        (Some(writer), Some(record)) => writer.write(&record).err(),
        _ => None,
    };
    if let Some(err) = write_error {
        warn!("Disabling telemetry: {:#}", err);
        telemetry.0 = None;
    }
}

/// System to move vehicle boxes to their simulated poses
pub fn sync_vehicles(
    scenario: Res<ScenarioResource>,
    mut vehicle_query: Query<(&AgentLink, &mut Transform)>,
) {
    let scenario = &scenario.0;

    for (link, mut transform) in vehicle_query.iter_mut() {
        let pose = if link.0.is_ego() {
            scenario.ego.pose
        } else {
            match scenario.agent(link.0) {
                Some(agent) => agent.vehicle.pose,
                None => continue,
            }
        };
        let height = transform.translation.y;
        *transform = pose_transform(&pose, height);
    }
}

/// System to refresh the status overlay
pub fn update_hud(scenario: Res<ScenarioResource>, mut text_query: Query<&mut Text, With<HudText>>) {
    let scenario = &scenario.0;

    let status = match (scenario.state(), scenario.status()) {
        (ScenarioState::Idle, _) => "Ready".to_string(),
        (ScenarioState::Running, _) => "Yield to the ambulance".to_string(),
        (ScenarioState::Completed, _) => "End of the round - ambulance passed".to_string(),
        (_, SimulationStatus::Collision { with }) => {
            format!("Crash with {} - ESC to exit", scenario.agent_name(with))
        }
        (_, _) => "Crash - left the road - ESC to exit".to_string(),
    };

    for mut text in text_query.iter_mut() {
        **text = format!(
            "{}\nSpeed: {:.2}\nAccel: {:.2}\nSteering: {:.1}\nTime: {:.1}s",
            status,
            scenario.ego.velocity_x,
            scenario.ego.acceleration,
            scenario.ego.steering_angle,
            scenario.sim_time()
        );
    }
}
