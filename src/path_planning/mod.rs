// Path Planning algorithms module

pub mod collision;
pub mod dubins;
pub mod multipoint;
pub mod rrt;
pub mod smoothing;

pub use collision::{CollisionChecker, CollisionConfig};
pub use multipoint::{MultipointConfig, MultipointPlan, MultipointPlanner};
pub use rrt::{PolygonRrtPlanner, RrtConfig, RrtNode};
pub use smoothing::{PathSmoother, SmoothingConfig};
