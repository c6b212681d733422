//! Utility modules for dubins_mission

pub mod visualization;

pub use visualization::{colors, PathStyle, PointStyle, Visualizer};
