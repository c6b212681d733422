//! Common types, traits, and error definitions for dubins_mission
//!
//! This module provides the foundational building blocks shared by the
//! geometry, planning, and mission layers.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
