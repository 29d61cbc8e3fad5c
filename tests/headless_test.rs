use std::process::Command;

fn run_headless(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_corridor_sim"))
        .args(args)
        .env("RUST_LOG", "warn,corridor_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Test that the simulation runs in headless mode until a terminal state
#[test]
fn test_headless_simulation_runs() {
    let output = run_headless(&["--seed", "7"]);

    assert!(
        output.status.success(),
        "Simulation failed to run in headless mode. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("=== Final State ==="),
        "Simulation did not finish properly. stdout: {}",
        stdout
    );
    assert!(
        stdout.contains("Outcome: Crashed"),
        "Coasting ego should be rear-ended. stdout: {}",
        stdout
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Simulation time:"),
        "Missing outcome log line. stderr: {}",
        stderr
    );
}

/// Test that a tick budget stops a scenario that is still running
#[test]
fn test_headless_respects_tick_budget() {
    let output = run_headless(&["--seed", "7", "--ticks", "10"]);

    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Outcome: still running after 10 ticks"),
        "Tick budget was not honoured. stdout: {}",
        stdout
    );
}

/// Test that telemetry lines keep the leading empty column
#[test]
fn test_headless_writes_telemetry() {
    let path = std::env::temp_dir().join(format!(
        "corridor_sim_headless_{}.txt",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    let path_arg = path.to_string_lossy().to_string();

    let output = run_headless(&["--seed", "7", "--log-file", &path_arg]);
    assert!(output.status.success(), "Simulation failed to run");

    let contents = std::fs::read_to_string(&path).expect("telemetry file should exist");
    let lines: Vec<&str> = contents.lines().collect();
    assert!(!lines.is_empty(), "No telemetry records written");

    for line in &lines {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 4, "Unexpected record layout: {}", line);
        assert!(fields[0].is_empty());
        for field in &fields[1..] {
            field
                .parse::<f64>()
                .unwrap_or_else(|_| panic!("Could not parse '{}' in '{}'", field, line));
        }
    }

    let _ = std::fs::remove_file(&path);
}

/// Test that a malformed scenario file is reported as an error
#[test]
fn test_headless_rejects_bad_config() {
    let path = std::env::temp_dir().join(format!(
        "corridor_sim_bad_config_{}.json",
        std::process::id()
    ));
    std::fs::write(&path, r#"{ "agents": [] }"#).expect("write config");
    let path_arg = path.to_string_lossy().to_string();

    let output = run_headless(&["--config", &path_arg]);
    assert!(!output.status.success(), "Bad config should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("no priority agent"),
        "Missing validation message. stderr: {}",
        stderr
    );

    let _ = std::fs::remove_file(&path);
}

/// Test that the effective configuration can be dumped and fed back in
#[test]
fn test_headless_dumps_config() {
    let output = run_headless(&["--dump-config"]);
    assert!(output.status.success(), "Config dump failed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"ambulance\""), "stdout: {}", stdout);
    assert!(!stdout.contains("=== Final State ==="), "Dump should not run the scenario");

    let path = std::env::temp_dir().join(format!(
        "corridor_sim_dumped_config_{}.json",
        std::process::id()
    ));
    std::fs::write(&path, stdout.as_bytes()).expect("write config");
    let path_arg = path.to_string_lossy().to_string();

    let rerun = run_headless(&["--config", &path_arg, "--seed", "7", "--ticks", "5"]);
    assert!(rerun.status.success(), "Dumped config did not load back");

    let _ = std::fs::remove_file(&path);
}
