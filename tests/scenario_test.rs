//! Scenario loop and termination validation tests

use corridor_sim::simulation::{
    AgentConfig, AgentId, CollisionEvaluator, ConfigError, ControlInput, CorridorBounds,
    LogRecord, Pose, Scenario, ScenarioConfig, ScenarioState, SimulationStatus, TelemetryWriter,
    TickError, MAP_COLUMNS, MAP_ROWS,
};

const DT: f64 = 1.0 / 60.0;

/// Ego fixed at `ego_x` with only the given agents
fn config_with(ego_x: f64, agents: Vec<AgentConfig>) -> ScenarioConfig {
    let mut config = ScenarioConfig::default();
    config.ego.x_offset_range = (ego_x, ego_x);
    config.agents = agents;
    config
}

fn run_until_done(scenario: &mut Scenario, control: ControlInput, max_ticks: u64) {
    while scenario.ticks() < max_ticks && !scenario.state().is_terminal() {
        scenario.tick(DT, control).expect("tick should succeed");
    }
}

#[test]
fn test_evaluator_reports_overlap_immediately() {
    let evaluator = CollisionEvaluator::default();
    let ego = Pose::new(7.0, 64.0, 90.0);
    let others = vec![
        (AgentId(1), Pose::new(12.0, 100.0, 90.0)),
        (AgentId(2), Pose::new(7.0, 67.0, 90.0)),
    ];

    let status = evaluator.evaluate(&ego, &others, AgentId(1), &CorridorBounds::default());
    assert_eq!(status, SimulationStatus::Collision { with: AgentId(2) });

    // Pure: same inputs, same answer
    let again = evaluator.evaluate(&ego, &others, AgentId(1), &CorridorBounds::default());
    assert_eq!(status, again);
}

#[test]
fn test_evaluator_box_edges_are_exclusive() {
    let evaluator = CollisionEvaluator::default();
    let ego = Pose::new(7.0, 64.0, 90.0);
    let bounds = CorridorBounds::default();
    let priority = (AgentId(1), Pose::new(1.0, 200.0, 90.0));

    let touching_lengthwise = vec![priority, (AgentId(2), Pose::new(7.0, 68.0, 90.0))];
    assert_eq!(
        evaluator.evaluate(&ego, &touching_lengthwise, AgentId(1), &bounds),
        SimulationStatus::Running
    );

    let touching_sideways = vec![priority, (AgentId(2), Pose::new(9.0, 64.0, 90.0))];
    assert_eq!(
        evaluator.evaluate(&ego, &touching_sideways, AgentId(1), &bounds),
        SimulationStatus::Running
    );
}

#[test]
fn test_evaluator_check_order() {
    let evaluator = CollisionEvaluator::default();
    let bounds = CorridorBounds::default();
    let ego = Pose::new(7.0, 64.0, 90.0);

    // Priority exit beats a simultaneous collision
    let exited = vec![
        (AgentId(1), Pose::new(7.0, 0.5, 90.0)),
        (AgentId(2), Pose::new(7.0, 65.0, 90.0)),
    ];
    assert_eq!(
        evaluator.evaluate(&ego, &exited, AgentId(1), &bounds),
        SimulationStatus::Completed
    );

    // First colliding agent in order is reported
    let two_hits = vec![
        (AgentId(1), Pose::new(1.0, 90.0, 90.0)),
        (AgentId(3), Pose::new(7.5, 66.0, 90.0)),
        (AgentId(2), Pose::new(6.5, 62.0, 90.0)),
    ];
    assert_eq!(
        evaluator.evaluate(&ego, &two_hits, AgentId(1), &bounds),
        SimulationStatus::Collision { with: AgentId(3) }
    );

    // Collision beats leaving the corridor
    let outside = Pose::new(15.0, 64.0, 90.0);
    let beside = vec![
        (AgentId(1), Pose::new(1.0, 90.0, 90.0)),
        (AgentId(2), Pose::new(14.0, 64.0, 90.0)),
    ];
    assert_eq!(
        evaluator.evaluate(&outside, &beside, AgentId(1), &bounds),
        SimulationStatus::Collision { with: AgentId(2) }
    );
}

#[test]
fn test_evaluator_boundary_ignores_other_agents() {
    let evaluator = CollisionEvaluator::default();
    let bounds = CorridorBounds::default();
    let others = vec![
        (AgentId(1), Pose::new(7.0, 70.0, 90.0)),
        (AgentId(2), Pose::new(3.0, 20.0, 90.0)),
    ];

    for x in [14.51, 20.0, -0.01] {
        assert_eq!(
            evaluator.evaluate(&Pose::new(x, 40.0, 90.0), &others, AgentId(1), &bounds),
            SimulationStatus::OutOfBounds {
                agent: AgentId::EGO
            }
        );
    }
    assert_eq!(
        evaluator.evaluate(&Pose::new(14.5, 40.0, 90.0), &others, AgentId(1), &bounds),
        SimulationStatus::Running
    );
}

#[test]
fn test_overlapping_start_crashes_on_first_tick() {
    let config = config_with(
        7.0,
        vec![
            AgentConfig::new("ambulance", 12.0, 100.0).priority(),
            AgentConfig::new("blocker", 7.0, 67.0).with_speed(0.0),
        ],
    );
    let mut scenario = Scenario::with_seed(config, 1).unwrap();
    assert_eq!(scenario.state(), ScenarioState::Idle);

    let result = scenario.tick(0.0, ControlInput::NONE).unwrap();

    assert_eq!(result.status, SimulationStatus::Collision { with: AgentId(2) });
    assert_eq!(result.ego_pose, Pose::new(7.0, 64.0, 90.0));
    assert_eq!(scenario.state(), ScenarioState::Crashed);
    assert_eq!(scenario.agent_name(AgentId(2)), "blocker");
}

#[test]
fn test_priority_exit_completes_and_freezes() {
    let config = config_with(
        1.5,
        vec![AgentConfig::new("ambulance", 7.0, 70.0).priority()],
    );
    let mut scenario = Scenario::with_seed(config, 1).unwrap();

    run_until_done(&mut scenario, ControlInput::NONE, 2000);

    assert_eq!(scenario.state(), ScenarioState::Completed);
    let priority = scenario.agent(scenario.priority()).unwrap();
    assert!(priority.vehicle.pose.y < 1.0);
    assert!(priority.vehicle.pose.y > 1.0 - 8.31 * DT);

    // Finished scenarios no longer advance
    let ticks = scenario.ticks();
    let ego_pose = scenario.ego.pose;
    let frozen = scenario.tick(DT, ControlInput::NONE).unwrap();
    assert_eq!(frozen.status, SimulationStatus::Completed);
    assert_eq!(frozen.tick, ticks);
    assert_eq!(frozen.ego_pose, ego_pose);
    assert_eq!(frozen.log_record, None);

    let outcome = scenario.outcome().unwrap();
    assert_eq!(outcome.state, ScenarioState::Completed);
    assert_eq!(outcome.ticks, ticks);
    assert!((outcome.sim_time - ticks as f64 * DT).abs() < 1e-9);
}

#[test]
fn test_steering_off_the_road() {
    let config = config_with(
        7.0,
        vec![AgentConfig::new("ambulance", 1.0, 300.0).with_speed(0.0).priority()],
    );
    let mut scenario = Scenario::with_seed(config, 1).unwrap();

    run_until_done(
        &mut scenario,
        ControlInput::from_keys(true, false, false, true),
        2000,
    );

    assert_eq!(scenario.state(), ScenarioState::OutOfBounds);
    assert_eq!(
        scenario.status(),
        SimulationStatus::OutOfBounds {
            agent: AgentId::EGO
        }
    );
    assert!(scenario.ego.pose.x > 14.5);
}

#[test]
fn test_default_scenario_coasting_is_rear_ended() {
    let mut scenario = Scenario::with_seed(ScenarioConfig::default(), 7).unwrap();
    let ego_x = scenario.ego.pose.x;
    assert!((6.0..8.0).contains(&ego_x));

    run_until_done(&mut scenario, ControlInput::NONE, 3600);

    assert_eq!(scenario.state(), ScenarioState::Crashed);
    assert_eq!(
        scenario.status(),
        SimulationStatus::Collision {
            with: scenario.priority()
        }
    );
    // The gap to the ambulance closes from 6 to 4 after two seconds of coasting
    assert!((scenario.sim_time() - 2.0).abs() < 0.1);
}

#[test]
fn test_seeded_scenarios_are_reproducible() {
    let mut first = Scenario::with_seed(ScenarioConfig::default(), 99).unwrap();
    let mut second = Scenario::with_seed(ScenarioConfig::default(), 99).unwrap();

    for tick in 0..240 {
        let control = ControlInput::from_keys(tick % 3 == 0, false, tick % 5 == 0, false);
        let a = first.tick(DT, control).unwrap();
        let b = second.tick(DT, control).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_invalid_ticks_are_rejected_without_changes() {
    let mut scenario = Scenario::with_seed(ScenarioConfig::default(), 3).unwrap();
    let ego_before = scenario.ego.pose;

    assert_eq!(
        scenario.tick(-DT, ControlInput::NONE),
        Err(TickError::InvalidTimestep(-DT))
    );
    assert!(matches!(
        scenario.tick(f64::NAN, ControlInput::NONE),
        Err(TickError::InvalidTimestep(_))
    ));

    let bad = ControlInput {
        steer_left: f64::INFINITY,
        ..ControlInput::NONE
    };
    assert!(matches!(
        scenario.tick(DT, bad),
        Err(TickError::InvalidInput {
            intent: "steer_left",
            ..
        })
    ));

    let too_much = ControlInput {
        throttle: 1.5,
        ..ControlInput::NONE
    };
    assert!(scenario.tick(DT, too_much).is_err());

    assert_eq!(scenario.state(), ScenarioState::Idle);
    assert_eq!(scenario.ticks(), 0);
    assert_eq!(scenario.ego.pose, ego_before);
}

#[test]
fn test_zero_dt_tick_is_a_query() {
    let mut scenario = Scenario::with_seed(ScenarioConfig::default(), 5).unwrap();
    scenario.ego.steering_angle = 10.0;
    scenario.ego.acceleration = -1.0;
    let before = scenario.other_poses();
    let ego_before = scenario.ego.pose;

    let result = scenario.tick(0.0, ControlInput::NONE).unwrap();

    assert_eq!(result.status, SimulationStatus::Running);
    assert_eq!(result.other_poses, before);
    assert_eq!(result.ego_pose, ego_before);
    assert_eq!(result.tick, 0);
    assert_eq!(result.sim_time, 0.0);
    assert_eq!(scenario.ego.steering_angle, 10.0);
    assert_eq!(scenario.ego.acceleration, -1.0);
    assert_eq!(scenario.ego.velocity_x, 8.31);
    assert_eq!(scenario.state(), ScenarioState::Running);

    // Held intents are not applied either
    scenario
        .tick(0.0, ControlInput::from_keys(true, false, false, true))
        .unwrap();
    assert_eq!(scenario.ego.steering_angle, 10.0);
    assert_eq!(scenario.ego.acceleration, -1.0);
    assert_eq!(scenario.ticks(), 0);
}

#[test]
fn test_map_stays_bounded_for_far_away_agents() {
    let config = ScenarioConfig::from_json_str(
        r#"{ "agents": [
            { "name": "ambulance", "x": 7.0, "y": 1e15, "priority": true },
            { "name": "near", "x": 3.0, "y": 60.0 }
        ] }"#,
    )
    .unwrap();
    let scenario = Scenario::with_seed(config, 1).unwrap();

    let rows = scenario.render_map();

    assert!(rows.len() <= MAP_ROWS);
    assert!(rows.iter().all(|row| row.chars().count() <= MAP_COLUMNS + 2));
    assert!(rows.iter().any(|row| row.contains('E')));
    assert!(rows.iter().any(|row| row.contains('C')));
    assert!(!rows.iter().any(|row| row.contains('P')));

    // Must not abort when printing either
    scenario.draw_map();
}

#[test]
fn test_map_caps_wide_corridor() {
    let mut config = ScenarioConfig::default();
    config.corridor = CorridorBounds { min_x: 0.0, max_x: 1e12 };
    let scenario = Scenario::with_seed(config, 1).unwrap();

    let rows = scenario.render_map();

    assert!(!rows.is_empty());
    assert!(rows.iter().all(|row| row.chars().count() <= MAP_COLUMNS + 2));
}

#[test]
fn test_default_map_shows_whole_layout() {
    let scenario = Scenario::with_seed(ScenarioConfig::default(), 1).unwrap();

    let rows = scenario.render_map();
    let count = |c: char| rows.iter().map(|row| row.matches(c).count()).sum::<usize>();

    assert_eq!(count('E'), 1);
    assert_eq!(count('P'), 1);
    assert!(count('C') >= 1);
    assert!(rows.iter().all(|row| row.starts_with('|') && row.ends_with('|')));
}

#[test]
fn test_log_record_follows_priority_vehicle() {
    let mut scenario = Scenario::with_seed(ScenarioConfig::default(), 11).unwrap();
    let result = scenario.tick(DT, ControlInput::NONE).unwrap();

    let record = result.log_record.expect("ambulance is still in the scene");
    let ambulance = scenario.agent(scenario.priority()).unwrap();
    assert_eq!(record.lateral_offset, ambulance.vehicle.pose.x - result.ego_pose.x);
    assert_eq!(record.ego_velocity_x, result.ego_velocity_x);
    assert_eq!(record.ego_acceleration, -1.0);
}

#[test]
fn test_log_record_line_format() {
    let record = LogRecord {
        lateral_offset: -0.5,
        ego_velocity_x: 8.31,
        ego_acceleration: -1.0,
    };
    assert_eq!(record.to_string(), ",-0.5,8.31,-1");
}

#[test]
fn test_telemetry_writer_appends() {
    let path = std::env::temp_dir().join(format!(
        "corridor_sim_telemetry_{}.txt",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let record = LogRecord {
        lateral_offset: 1.25,
        ego_velocity_x: 8.0,
        ego_acceleration: 0.5,
    };

    {
        let mut writer = TelemetryWriter::append_to(&path).unwrap();
        writer.write(&record).unwrap();
        writer.write(&record).unwrap();
        assert_eq!(writer.records_written(), 2);
    }
    {
        let mut writer = TelemetryWriter::append_to(&path).unwrap();
        writer.write(&record).unwrap();
        writer.flush().unwrap();
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines, vec![",1.25,8,0.5"; 3]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_config_defaults_match_corridor_layout() {
    let config = ScenarioConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.agents.len(), 6);
    assert_eq!(config.priority_index(), Ok(0));
    assert_eq!(config.corridor, CorridorBounds { min_x: 0.0, max_x: 14.5 });
    assert_eq!(config.ego.x_offset_range, (6.0, 8.0));
    assert_eq!(config.exit_threshold, 1.0);
}

#[test]
fn test_config_json_overrides_defaults() {
    let config = ScenarioConfig::from_json_str(
        r#"{
            "exit_threshold": 2.0,
            "ego": { "y": 50.0 },
            "agents": [
                { "name": "fire-truck", "x": 3.0, "y": 80.0, "priority": true },
                { "name": "slow", "x": 11.5, "y": 40.0, "speed": 4.0 }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(config.exit_threshold, 2.0);
    assert_eq!(config.ego.y, 50.0);
    assert_eq!(config.ego.length, 4.0);
    assert_eq!(config.agents[0].speed, 8.31);
    assert_eq!(config.agents[1].speed, 4.0);
    assert_eq!(config.priority_index(), Ok(0));
}

#[test]
fn test_config_json_dump_loads_back() {
    let mut config = ScenarioConfig::default();
    config.exit_threshold = 2.5;
    config.agents[1] = AgentConfig::new("slow", 11.5, 40.0).with_speed(4.0);

    let text = config.to_json_string().unwrap();
    assert!(text.contains("\"exit_threshold\": 2.5"));

    let loaded = ScenarioConfig::from_json_str(&text).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_validation_rejects_bad_scenarios() {
    let no_priority = ScenarioConfig::from_json_str(
        r#"{ "agents": [ { "name": "a", "x": 3.0, "y": 80.0 } ] }"#,
    )
    .unwrap_err();
    assert_eq!(
        no_priority.downcast_ref::<ConfigError>(),
        Some(&ConfigError::NoPriorityAgent)
    );

    let mut two = ScenarioConfig::default();
    two.agents[1].priority = true;
    assert_eq!(two.validate(), Err(ConfigError::MultiplePriorityAgents(2)));

    let mut flat = ScenarioConfig::default();
    flat.ego.length = 0.0;
    assert!(matches!(
        flat.validate(),
        Err(ConfigError::NotPositive {
            field: "ego.length",
            ..
        })
    ));

    let mut wild = ScenarioConfig::default();
    wild.ego.max_steering = 180.0;
    assert_eq!(wild.validate(), Err(ConfigError::SteeringOutOfRange(180.0)));

    let mut inverted = ScenarioConfig::default();
    inverted.ego.x_offset_range = (8.0, 6.0);
    assert!(Scenario::with_seed(inverted, 1).is_err());
}
