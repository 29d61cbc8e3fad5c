//! Scenario loop that ties everything together
//!
//! This is the entry point for running the corridor simulation
//! without any Bevy dependencies.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

use super::car::KinematicVehicle;
use super::collision::CollisionEvaluator;
use super::config::ScenarioConfig;
use super::control::ControlInput;
use super::error::{ConfigError, TickError};
use super::telemetry::LogRecord;
use super::traffic::LinearVehicle;
use super::types::{AgentId, Pose, ScenarioState, SimulationStatus, Velocity};

/// Maximum rows drawn by `Scenario::render_map`
pub const MAP_ROWS: usize = 60;
/// Maximum columns between the corridor edges in `Scenario::render_map`
pub const MAP_COLUMNS: usize = 80;

/// A non-controlled car together with its identity
#[derive(Debug, Clone)]
pub struct TrafficAgent {
    pub id: AgentId,
    pub name: String,
    pub vehicle: LinearVehicle,
}

/// Snapshot of the scenario after one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    /// Number of ticks that advanced the scenario so far
    pub tick: u64,
    pub sim_time: f64,
    pub status: SimulationStatus,
    pub ego_pose: Pose,
    /// Traffic poses in evaluation order
    pub other_poses: Vec<(AgentId, Pose)>,
    pub ego_velocity_x: f64,
    pub ego_acceleration: f64,
    /// Present while the priority vehicle is still in the scene
    pub log_record: Option<LogRecord>,
}

/// How a finished scenario ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub state: ScenarioState,
    pub status: SimulationStatus,
    pub ticks: u64,
    pub sim_time: f64,
    pub wall_time: Duration,
}

/// The corridor scenario: ego car, traffic and termination checks
#[derive(Clone)]
pub struct Scenario {
    config: ScenarioConfig,
    pub ego: KinematicVehicle,
    /// Traffic in evaluation order
    pub agents: Vec<TrafficAgent>,
    priority: AgentId,
    evaluator: CollisionEvaluator,
    state: ScenarioState,
    status: SimulationStatus,
    ticks: u64,
    sim_time: f64,
    started_at: Option<Instant>,
    wall_time: Option<Duration>,
}

impl Scenario {
    /// Build a scenario, drawing the ego car's starting offset from `rng`
    pub fn new<R: Rng>(config: ScenarioConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        let priority_index = config.priority_index()?;

        let (min_x, max_x) = config.ego.x_offset_range;
        let ego_x = if min_x < max_x {
            rng.random_range(min_x..max_x)
        } else {
            min_x
        };
        let ego = KinematicVehicle::new(
            Pose::new(ego_x, config.ego.y, config.ego.heading),
            config.ego.initial_speed,
            config.ego.limits(),
        );

        let agents = config
            .agents
            .iter()
            .enumerate()
            .map(|(index, agent)| TrafficAgent {
                id: AgentId(index + 1),
                name: agent.name.clone(),
                vehicle: LinearVehicle::new(
                    Pose::new(agent.x, agent.y, config.ego.heading),
                    Velocity::new(0.0, agent.speed),
                ),
            })
            .collect();

        let evaluator = CollisionEvaluator::new(config.proximity, config.exit_threshold);

        Ok(Self {
            config,
            ego,
            agents,
            priority: AgentId(priority_index + 1),
            evaluator,
            state: ScenarioState::Idle,
            status: SimulationStatus::Running,
            ticks: 0,
            sim_time: 0.0,
            started_at: None,
            wall_time: None,
        })
    }

    /// Build a scenario with a seeded RNG for reproducible runs
    pub fn with_seed(config: ScenarioConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, &mut StdRng::seed_from_u64(seed))
    }

    /// Build a scenario with the thread RNG
    pub fn from_entropy(config: ScenarioConfig) -> Result<Self, ConfigError> {
        Self::new(config, &mut rand::rng())
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    pub fn priority(&self) -> AgentId {
        self.priority
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn agent(&self, id: AgentId) -> Option<&TrafficAgent> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    pub fn agent_name(&self, id: AgentId) -> &str {
        if id.is_ego() {
            return "ego";
        }
        self.agent(id).map(|agent| agent.name.as_str()).unwrap_or("unknown")
    }

    /// Traffic poses in evaluation order
    pub fn other_poses(&self) -> Vec<(AgentId, Pose)> {
        self.agents
            .iter()
            .map(|agent| (agent.id, agent.vehicle.pose))
            .collect()
    }

    /// Move from `Idle` to `Running`; no-op in any other state
    pub fn start(&mut self) {
        if self.state != ScenarioState::Idle {
            return;
        }
        self.state = ScenarioState::Running;
        self.started_at = Some(Instant::now());
        info!(
            "Scenario started: ego at ({:.2}, {:.2}), {} traffic agents, priority '{}'",
            self.ego.pose.x,
            self.ego.pose.y,
            self.agents.len(),
            self.agent_name(self.priority)
        );
    }

    /// Advance the whole scenario by one fixed timestep
    ///
    /// A `dt` of zero is a query: vehicle state, the tick count and the clock
    /// are left alone and only the termination checks run. Once the scenario has
    /// ended, ticks no longer advance anything and return the final snapshot.
    pub fn tick(&mut self, delta_secs: f64, control: ControlInput) -> Result<TickResult, TickError> {
        if !delta_secs.is_finite() || delta_secs < 0.0 {
            return Err(TickError::InvalidTimestep(delta_secs));
        }
        control.validate()?;

        if self.state.is_terminal() {
            debug!("Ignoring tick on finished scenario ({:?})", self.state);
            return Ok(self.snapshot(None));
        }
        self.start();

        if delta_secs > 0.0 {
            self.ego.update(delta_secs, &control);
            for agent in &mut self.agents {
                agent.vehicle.update(-delta_secs);
            }
            self.ticks += 1;
            self.sim_time += delta_secs;
        }

        let log_record = self.log_record();
        let others = self.other_poses();
        let status = self.evaluator.evaluate(
            &self.ego.pose,
            &others,
            self.priority,
            &self.config.corridor,
        );

        debug!(
            "tick {}: ego=({:.3}, {:.3}, {:.1}deg) v={:.3} a={:.3} status={:?}",
            self.ticks,
            self.ego.pose.x,
            self.ego.pose.y,
            self.ego.pose.heading,
            self.ego.velocity_x,
            self.ego.acceleration,
            status
        );

        if status.is_terminal() {
            self.finish(status);
        }

        Ok(TickResult {
            tick: self.ticks,
            sim_time: self.sim_time,
            status,
            ego_pose: self.ego.pose,
            other_poses: others,
            ego_velocity_x: self.ego.velocity_x,
            ego_acceleration: self.ego.acceleration,
            log_record,
        })
    }

    /// Terminal result, once the scenario has ended
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.state.is_terminal() {
            return None;
        }
        Some(Outcome {
            state: self.state,
            status: self.status,
            ticks: self.ticks,
            sim_time: self.sim_time,
            wall_time: self.wall_time.unwrap_or_default(),
        })
    }

    /// Log fields for the current poses, while the priority vehicle is in the scene
    pub fn log_record(&self) -> Option<LogRecord> {
        let priority = self.agent(self.priority)?;
        if priority.vehicle.pose.y <= self.config.exit_threshold {
            return None;
        }
        Some(LogRecord {
            lateral_offset: priority.vehicle.pose.x - self.ego.pose.x,
            ego_velocity_x: self.ego.velocity_x,
            ego_acceleration: self.ego.acceleration,
        })
    }

    fn snapshot(&self, log_record: Option<LogRecord>) -> TickResult {
        TickResult {
            tick: self.ticks,
            sim_time: self.sim_time,
            status: self.status,
            ego_pose: self.ego.pose,
            other_poses: self.other_poses(),
            ego_velocity_x: self.ego.velocity_x,
            ego_acceleration: self.ego.acceleration,
            log_record,
        }
    }

    fn finish(&mut self, status: SimulationStatus) {
        self.status = status;
        self.state = ScenarioState::from(status);
        self.wall_time = self.started_at.map(|started| started.elapsed());

        match status {
            SimulationStatus::Completed => info!("End of the round: priority vehicle cleared the corridor"),
            SimulationStatus::Collision { with } => {
                info!("Crash: ego collided with '{}'", self.agent_name(with))
            }
            SimulationStatus::OutOfBounds { agent } => {
                info!("Crash: '{}' left the corridor", self.agent_name(agent))
            }
            SimulationStatus::Running => {}
        }
        info!(
            "Simulation time: {:.2}s over {} ticks (wall {:.2?})",
            self.sim_time,
            self.ticks,
            self.wall_time.unwrap_or_default()
        );
    }

    /// Print a summary of the scenario state
    pub fn print_summary(&self) {
        println!("=== Corridor Scenario Summary ===");
        println!("State: {:?}", self.state);
        println!("Time: {:.2}s ({} ticks)", self.sim_time, self.ticks);
        println!(
            "Ego: position=({:.2}, {:.2}), heading={:.1}deg, speed={:.2}, accel={:.2}, steering={:.1}deg",
            self.ego.pose.x,
            self.ego.pose.y,
            self.ego.pose.heading,
            self.ego.velocity_x,
            self.ego.acceleration,
            self.ego.steering_angle
        );

        println!("--- Traffic ---");
        for agent in &self.agents {
            let pose = agent.vehicle.pose;
            println!(
                "  Agent {} '{}'{}: position=({:.2}, {:.2}), gap=({:.2}, {:.2})",
                agent.id.0,
                agent.name,
                if agent.id == self.priority { " [priority]" } else { "" },
                pose.x,
                pose.y,
                pose.x - self.ego.pose.x,
                pose.y - self.ego.pose.y
            );
        }
    }

    /// Draw the corridor in the terminal, one row per two units of length
    pub fn draw_map(&self) {
        println!("\n=== Corridor Map ===");
        println!("Legend: E=Ego, P=Priority vehicle, C=Traffic, |=Corridor edge");
        println!();
        for line in self.render_map() {
            println!("{}", line);
        }
        println!();
    }

    /// Render the map rows drawn by `draw_map`
    ///
    /// The window is at most `MAP_ROWS` by `MAP_COLUMNS`. It starts at `y = 0`
    /// when everything fits and is centred on the ego otherwise; vehicles
    /// outside it are left out.
    pub fn render_map(&self) -> Vec<String> {
        const ROW_UNITS: f64 = 2.0;
        const COLUMN_UNITS: f64 = 0.5;

        let bounds = self.config.corridor;
        let column_units = COLUMN_UNITS.max(bounds.width() / (MAP_COLUMNS - 1) as f64);
        let width = (bounds.width() / column_units)
            .ceil()
            .clamp(0.0, (MAP_COLUMNS - 1) as f64) as usize
            + 1;

        let max_y = self
            .agents
            .iter()
            .map(|agent| agent.vehicle.pose.y)
            .fold(self.ego.pose.y, f64::max)
            .max(0.0);
        let span = MAP_ROWS as f64 * ROW_UNITS;
        let top = if max_y < span {
            0.0
        } else {
            ((self.ego.pose.y - span / 2.0).max(0.0) / ROW_UNITS).floor() * ROW_UNITS
        };
        let height = ((max_y - top) / ROW_UNITS)
            .ceil()
            .clamp(0.0, (MAP_ROWS - 1) as f64) as usize
            + 1;

        let mut grid = vec![vec![' '; width]; height];

        // Returns None for anything outside the drawn area
        let to_grid = |x: f64, y: f64| -> Option<(usize, usize)> {
            if !bounds.contains(x) || y < top {
                return None;
            }
            let col = ((x - bounds.min_x) / column_units).round() as usize;
            let row = ((y - top) / ROW_UNITS).round() as usize;
            (row < height && col < width).then_some((row, col))
        };

        for agent in &self.agents {
            let pose = agent.vehicle.pose;
            if let Some((row, col)) = to_grid(pose.x, pose.y) {
                grid[row][col] = if agent.id == self.priority { 'P' } else { 'C' };
            }
        }
        if let Some((row, col)) = to_grid(self.ego.pose.x, self.ego.pose.y) {
            grid[row][col] = 'E';
        }

        grid.iter()
            .map(|row| format!("|{}|", row.iter().collect::<String>()))
            .collect()
    }
}
