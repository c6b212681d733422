//! dubins_mission - curvature-bounded mission planning for a car-like robot
//!
//! The robot drives through a polygonal arena from a start pose to an exit
//! gate, optionally passing through victims that grant a time bonus. Paths
//! are chains of Dubins curves whose curvature never exceeds a bound.

// Core modules
pub mod common;
pub mod geometry;
pub mod utils;

// Planning modules
pub mod path_planning;
pub mod mission_planning;

// Re-export common types for convenience
pub use common::{Path2D, Point2D, Polygon, Pose, Pose2D, Trajectory};
pub use common::{CoarsePlanner, PlanningObserver, PolygonOffsetter};
pub use common::{PlanningError, PlanningResult};
pub use mission_planning::{MissionConfig, MissionInput, MissionKind, MissionPlan, PlanningSession, Victim};
