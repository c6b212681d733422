//! Mission layer: victim selection and the end-to-end planning session

pub mod mission;
pub mod victim_selector;

pub use mission::{MissionConfig, MissionInput, MissionKind, MissionPlan, PlanningSession};
pub use victim_selector::{RouteOracle, Selection, SelectorConfig, Victim, VictimSelector};
