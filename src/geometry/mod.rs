//! Geometry primitives shared by the planners

pub mod angle;
pub mod intersection;
pub mod offset;
pub mod polygon;

pub use angle::{circline, mod2pi, range_symm, sinc};
pub use intersection::{segment_intersection_point, segments_intersect};
pub use offset::ClipperOffsetter;
pub use polygon::{
    carve_gate_slot, gate_approach, gate_slot, nearest_point, project_point_to_line, sort_vertices_clockwise,
    GateApproach,
};
