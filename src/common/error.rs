//! Error types for dubins_mission

use thiserror::Error;

/// Main error type for planning operations
///
/// Geometric dead ends (`NoFeasibleCurve`, `PlanningExhausted`, `NoCoarsePath`)
/// are kept apart from contract violations so callers can decide whether a
/// different subset of waypoints is worth trying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    /// Malformed input: degenerate polygon, non-positive curvature, ...
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// None of the six Dubins maneuver families is feasible
    #[error("No feasible Dubins curve")]
    NoFeasibleCurve,
    /// The heading search found no collision-free combination
    #[error("Planning exhausted: {0}")]
    PlanningExhausted(String),
    /// The coarse planner reported that no path exists
    #[error("No coarse path: {0}")]
    NoCoarsePath(String),
    /// A collaborator returned data that violates its contract
    #[error("Collaborator contract violated: {0}")]
    CollaboratorContract(String),
    /// Plotting backend failure
    #[error("Visualization error: {0}")]
    VisualizationError(String),
}

impl PlanningError {
    /// True when the error is a geometric dead end rather than a bad input
    pub fn is_planning_failure(&self) -> bool {
        matches!(
            self,
            PlanningError::NoFeasibleCurve
                | PlanningError::PlanningExhausted(_)
                | PlanningError::NoCoarsePath(_)
        )
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PlanningError::InvalidInput(msg.into())
    }
}

/// Result type alias for planning operations
pub type PlanningResult<T> = Result<T, PlanningError>;
