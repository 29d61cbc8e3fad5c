use anyhow::{ensure, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use corridor_sim::simulation::{
    ControlInput, Scenario, ScenarioConfig, ScenarioState, TelemetryWriter,
};

#[derive(Parser)]
#[command(name = "corridor_sim")]
#[command(about = "Ego car yielding to a priority vehicle, with optional UI")]
struct Cli {
    /// Run with the Bevy game engine UI
    #[arg(long)]
    ui: bool,

    /// Maximum number of simulation ticks to run in headless mode
    #[arg(long, default_value = "3600")]
    ticks: u64,

    /// Time delta per tick in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    delta: f64,

    /// Seed for the ego car's starting offset
    #[arg(long)]
    seed: Option<u64>,

    /// Scenario configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append per-tick telemetry records to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Hold the throttle for the whole headless run
    #[arg(long)]
    throttle: bool,

    /// Hold the brake for the whole headless run
    #[arg(long)]
    brake: bool,

    /// Hold left steering for the whole headless run
    #[arg(long)]
    steer_left: bool,

    /// Hold right steering for the whole headless run
    #[arg(long)]
    steer_right: bool,

    /// Print the effective scenario configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Simulated seconds between headless summaries
    #[arg(long, default_value = "1.0")]
    summary_every: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    if cli.dump_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    if cli.ui {
        #[cfg(feature = "ui")]
        {
            let scenario = build_scenario(config, cli.seed)?;
            run_with_ui(scenario, cli.log_file);
            Ok(())
        }
        #[cfg(not(feature = "ui"))]
        {
            eprintln!("Error: UI feature is not enabled. Rebuild with --features ui");
            std::process::exit(1);
        }
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        run_headless(&cli, config)
    }
}

fn load_config(path: Option<&Path>) -> Result<ScenarioConfig> {
    match path {
        Some(path) => ScenarioConfig::from_json_file(path),
        None => Ok(ScenarioConfig::default()),
    }
}

fn build_scenario(config: ScenarioConfig, seed: Option<u64>) -> Result<Scenario> {
    let scenario = match seed {
        Some(seed) => Scenario::with_seed(config, seed),
        None => Scenario::from_entropy(config),
    };
    scenario.context("Failed to build scenario")
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli, config: ScenarioConfig) -> Result<()> {
    ensure!(
        cli.delta.is_finite() && cli.delta > 0.0,
        "--delta must be a positive number of seconds, got {}",
        cli.delta
    );

    println!("Running corridor simulation in headless mode...");
    println!("Max ticks: {}, Delta: {:.4}s", cli.ticks, cli.delta);

    let control =
        ControlInput::from_keys(cli.throttle, cli.brake, cli.steer_left, cli.steer_right);
    let ticks_per_summary = (cli.summary_every / cli.delta).ceil().max(1.0) as u64;
    println!("Summary every {} ticks", ticks_per_summary);
    println!();

    let mut scenario = build_scenario(config, cli.seed)?;
    let mut telemetry = cli
        .log_file
        .as_ref()
        .map(|path| TelemetryWriter::append_to(path))
        .transpose()?;

    println!("Initial state:");
    scenario.print_summary();
    scenario.draw_map();
    println!();

    scenario.start();
    while scenario.ticks() < cli.ticks && scenario.state() == ScenarioState::Running {
        let result = scenario
            .tick(cli.delta, control)
            .context("Simulation tick failed")?;

        if let (Some(writer), Some(record)) = (telemetry.as_mut(), result.log_record) {
            writer.write(&record)?;
        }

        if result.tick % ticks_per_summary == 0 && !result.status.is_terminal() {
            println!(
                "--- After tick {} ({:.1}s simulated time) ---",
                result.tick, result.sim_time
            );
            scenario.print_summary();
            scenario.draw_map();
            println!();
        }
    }

    if let Some(writer) = telemetry.as_mut() {
        writer.flush()?;
        println!(
            "Wrote {} telemetry records to {}",
            writer.records_written(),
            writer.path().display()
        );
    }

    println!("=== Final State ===");
    scenario.print_summary();
    scenario.draw_map();

    match scenario.outcome() {
        Some(outcome) => println!(
            "Outcome: {:?} ({:?}) after {:.2}s simulated, {} ticks, wall {:.2?}",
            outcome.state, outcome.status, outcome.sim_time, outcome.ticks, outcome.wall_time
        ),
        None => println!(
            "Outcome: still running after {} ticks ({:.2}s simulated)",
            scenario.ticks(),
            scenario.sim_time()
        ),
    }

    Ok(())
}

#[cfg(feature = "ui")]
fn run_with_ui(scenario: Scenario, log_file: Option<PathBuf>) {
    use bevy::log::LogPlugin;
    use bevy::prelude::*;

    println!("Starting Corridor Sim UI...");
    println!();
    println!("Controls:");
    println!("  Up/Down     - Accelerate / brake");
    println!("  Left/Right  - Steer");
    println!("  ESC         - Exit");
    println!();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(LogPlugin {
                    filter: "warn,corridor_sim=info".to_string(),
                    level: bevy::log::Level::INFO,
                    ..default()
                })
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Corridor Sim - Yield to the Ambulance".into(),
                        resolution: (480, 900).into(),
                        ..default()
                    }),
                    ..default()
                }),
        )
        .add_plugins(corridor_sim::ui::ScenarioPlugin { scenario, log_file })
        .run();
}
