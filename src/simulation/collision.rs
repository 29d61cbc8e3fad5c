//! Termination checks for the corridor simulation
//!
//! Standalone implementation that doesn't depend on Bevy.

use super::types::{AgentId, CorridorBounds, Pose, ProximityBox, SimulationStatus, EXIT_THRESHOLD};

/// Decides whether a tick ended the scenario
///
/// Checks run in a fixed order and the first hit wins:
/// priority exit, then collisions in agent order, then the corridor bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvaluator {
    pub proximity: ProximityBox,
    pub exit_threshold: f64,
}

impl Default for CollisionEvaluator {
    fn default() -> Self {
        Self {
            proximity: ProximityBox::default(),
            exit_threshold: EXIT_THRESHOLD,
        }
    }
}

impl CollisionEvaluator {
    pub fn new(proximity: ProximityBox, exit_threshold: f64) -> Self {
        Self {
            proximity,
            exit_threshold,
        }
    }

    /// Evaluate the termination conditions for the given poses
    ///
    /// `others` is the ordered mapping of agent ids to poses; its order is the
    /// order in which collisions are reported.
    pub fn evaluate(
        &self,
        ego: &Pose,
        others: &[(AgentId, Pose)],
        priority: AgentId,
        bounds: &CorridorBounds,
    ) -> SimulationStatus {
        if self.priority_exited(others, priority) {
            return SimulationStatus::Completed;
        }

        if let Some(with) = self.first_collision(ego, others) {
            return SimulationStatus::Collision { with };
        }

        if ego.x > bounds.max_x || ego.x < bounds.min_x {
            return SimulationStatus::OutOfBounds {
                agent: AgentId::EGO,
            };
        }

        SimulationStatus::Running
    }

    /// Whether the priority agent has left the visible area
    pub fn priority_exited(&self, others: &[(AgentId, Pose)], priority: AgentId) -> bool {
        others
            .iter()
            .find(|(id, _)| *id == priority)
            .is_some_and(|(_, pose)| pose.y < self.exit_threshold)
    }

    /// First agent, in evaluation order, whose proximity box contains the ego car
    pub fn first_collision(&self, ego: &Pose, others: &[(AgentId, Pose)]) -> Option<AgentId> {
        others
            .iter()
            .find(|(_, pose)| self.proximity.overlaps(ego, pose))
            .map(|(id, _)| *id)
    }
}
