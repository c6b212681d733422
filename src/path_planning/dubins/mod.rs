//! Curvature-bounded shortest paths (Dubins curves)
//!
//! A Dubins curve joins two oriented points with three constant-curvature
//! arcs whose curvature never exceeds a bound `kmax`. Six maneuver families
//! cover every optimal case; the solver evaluates all of them in closed form
//! and keeps the shortest.

pub mod arc;
pub mod discretize;
pub mod maneuver;
pub mod solver;

pub use arc::{Arc, Curve};
pub use discretize::{discretize_curves, discretize_single_curve, Discretizer};
pub use maneuver::ManeuverKind;
pub use solver::{
    all_feasible, check_standard_solution, shortest_path, standard_form_residual, DubinsSolution,
    StandardForm,
};
