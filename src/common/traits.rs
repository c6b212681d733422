//! Common traits defining the collaborator seams of the planner

use crate::common::error::PlanningResult;
use crate::common::types::*;

/// Coarse waypoint generator
///
/// Returns an ordered polyline from `start` to `goal` that avoids `obstacles`
/// and stays inside `border`, or `PlanningError::NoCoarsePath`.
pub trait CoarsePlanner {
    fn plan(
        &self,
        border: &Polygon,
        obstacles: &[Polygon],
        start: Point2D,
        goal: Point2D,
    ) -> PlanningResult<Path2D>;
}

/// Polygon offsetting and union collaborator
pub trait PolygonOffsetter {
    /// Offset `polygon` by `delta`: positive inflates, negative erodes
    fn offset(&self, polygon: &Polygon, delta: f64) -> PlanningResult<Polygon>;

    /// Single polygon covering both inputs, in the orientation of `a`;
    /// disjoint inputs are a `CollaboratorContract` error
    fn union(&self, a: &Polygon, b: &Polygon) -> PlanningResult<Polygon>;

    /// Offset every polygon by the same amount
    fn offset_all(&self, polygons: &[Polygon], delta: f64) -> PlanningResult<Vec<Polygon>> {
        polygons.iter().map(|p| self.offset(p, delta)).collect()
    }
}

/// Hook invoked at well-defined points of the heading search and the
/// victim selection. All methods default to doing nothing.
pub trait PlanningObserver {
    fn on_recursion_entered(&self, _start_idx: usize, _arrive_idx: usize, _num_angles: usize) {}

    /// `length` is `None` when the candidate was infeasible or collided
    fn on_candidate_evaluated(&self, _start_idx: usize, _arrive_idx: usize, _length: Option<f64>) {}

    /// A candidate skipped because its boundary curves alone are already
    /// no shorter than the best combination found
    fn on_candidate_pruned(&self, _start_idx: usize, _arrive_idx: usize) {}

    fn on_candidate_accepted(&self, _start_idx: usize, _arrive_idx: usize, _length: f64) {}

    fn on_recursion_returned(&self, _start_idx: usize, _arrive_idx: usize, _best: Option<f64>) {}

    /// `score` is `None` when the ordered victim list has no feasible route
    fn on_selection_evaluated(&self, _victim_ids: &[u32], _score: Option<f64>) {}

    fn on_selection_committed(&self, _victim_ids: &[u32], _score: f64) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PlanningObserver for NoopObserver {}

/// Observer that forwards every event to `log::trace!`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl PlanningObserver for LogObserver {
    fn on_recursion_entered(&self, start_idx: usize, arrive_idx: usize, num_angles: usize) {
        log::trace!("enter [{}, {}] with {} angles", start_idx, arrive_idx, num_angles);
    }

    fn on_candidate_evaluated(&self, start_idx: usize, arrive_idx: usize, length: Option<f64>) {
        log::trace!("candidate [{}, {}] -> {:?}", start_idx, arrive_idx, length);
    }

    fn on_candidate_pruned(&self, start_idx: usize, arrive_idx: usize) {
        log::trace!("pruned [{}, {}]", start_idx, arrive_idx);
    }

    fn on_candidate_accepted(&self, start_idx: usize, arrive_idx: usize, length: f64) {
        log::trace!("accepted [{}, {}] length {:.4}", start_idx, arrive_idx, length);
    }

    fn on_recursion_returned(&self, start_idx: usize, arrive_idx: usize, best: Option<f64>) {
        log::trace!("return [{}, {}] best {:?}", start_idx, arrive_idx, best);
    }

    fn on_selection_evaluated(&self, victim_ids: &[u32], score: Option<f64>) {
        log::trace!("victims {:?} score {:?}", victim_ids, score);
    }

    fn on_selection_committed(&self, victim_ids: &[u32], score: f64) {
        log::debug!("committed victims {:?} score {:.3}", victim_ids, score);
    }
}
