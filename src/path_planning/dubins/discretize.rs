//! Fixed-step sampling of arcs and curves

use crate::common::{PlanningError, PlanningResult, Pose, Trajectory};
use crate::path_planning::dubins::arc::{Arc, Curve};

/// Samples closer than this to the end of an arc are left to the next arc
const END_EPS: f64 = 1e-9;

/// Arclength sampler that keeps its spacing across chained arcs
///
/// `remaining_delta` is the arclength still to travel on the next arc before
/// the next sample is due, and `last_s` the arclength covered so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discretizer {
    delta: f64,
    remaining_delta: f64,
    last_s: f64,
}

impl Discretizer {
    pub fn new(delta: f64) -> PlanningResult<Self> {
        if !(delta > 0.0) || !delta.is_finite() {
            return Err(PlanningError::invalid(format!("sampling step must be positive, got {}", delta)));
        }
        Ok(Self::with_step(delta))
    }

    /// Caller guarantees a positive finite step
    pub(crate) fn with_step(delta: f64) -> Self {
        Discretizer { delta, remaining_delta: 0.0, last_s: 0.0 }
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn remaining_delta(&self) -> f64 {
        self.remaining_delta
    }

    pub fn last_s(&self) -> f64 {
        self.last_s
    }

    /// Append the samples of `arc` to `out`
    ///
    /// The arc end is emitted only when `add_endpoint` is set, so that chained
    /// arcs do not repeat their shared junction.
    pub fn sample_arc(&mut self, arc: &Arc, add_endpoint: bool, out: &mut Vec<Pose>) {
        let length = arc.length();
        let k = arc.curvature();
        let first = self.remaining_delta;

        let mut i = 0usize;
        let mut s_local = first;
        while s_local < length - END_EPS {
            let p = arc.pose_at(s_local);
            out.push(Pose::new(self.last_s + s_local, p.x, p.y, p.yaw, k));
            i += 1;
            s_local = first + i as f64 * self.delta;
        }

        self.remaining_delta = (s_local - length).max(0.0);
        self.last_s += length;
        if add_endpoint {
            let end = arc.end();
            out.push(Pose::new(self.last_s, end.x, end.y, end.yaw, k));
        }
    }

    /// Append the samples of the three arcs of `curve`
    pub fn sample_curve(&mut self, curve: &Curve, add_endpoint: bool, out: &mut Vec<Pose>) {
        let arcs = curve.arcs();
        self.sample_arc(&arcs[0], false, out);
        self.sample_arc(&arcs[1], false, out);
        self.sample_arc(&arcs[2], add_endpoint, out);
    }
}

/// Samples of one standalone curve, endpoint included
pub fn discretize_single_curve(curve: &Curve, delta: f64) -> PlanningResult<Vec<Pose>> {
    let mut discretizer = Discretizer::new(delta)?;
    let mut out = Vec::new();
    discretizer.sample_curve(curve, true, &mut out);
    Ok(out)
}

/// Samples of a chain of curves as one trajectory; only the last curve adds its endpoint
pub fn discretize_curves(curves: &[Curve], delta: f64) -> PlanningResult<Trajectory> {
    let mut discretizer = Discretizer::new(delta)?;
    let mut poses = Vec::new();
    let count = curves.len();
    for (i, curve) in curves.iter().enumerate() {
        discretizer.sample_curve(curve, i + 1 == count, &mut poses);
    }
    Ok(Trajectory::from_poses(poses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Pose2D;
    use crate::geometry::range_symm;
    use crate::path_planning::dubins::solver::shortest_path;
    use approx::assert_abs_diff_eq;
    use itertools::Itertools;

    fn sample_curve() -> Curve {
        shortest_path(Pose2D::new(0.0, 0.0, 0.4), Pose2D::new(3.0, 1.0, 2.5), 1.5)
            .unwrap()
            .curve
    }

    #[test]
    fn test_rejects_bad_step() {
        assert!(Discretizer::new(0.0).is_err());
        assert!(Discretizer::new(-0.1).is_err());
        assert!(Discretizer::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_single_curve_ends_at_curve_end() {
        let curve = sample_curve();
        let poses = discretize_single_curve(&curve, 0.05).unwrap();
        assert!(!poses.is_empty());

        let last = poses.last().unwrap();
        let end = curve.end();
        assert_abs_diff_eq!(last.x, end.x, epsilon = 1e-9);
        assert_abs_diff_eq!(last.y, end.y, epsilon = 1e-9);
        assert_abs_diff_eq!(range_symm(last.theta - end.yaw), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(last.s, curve.length(), epsilon = 1e-9);

        let first = poses[0];
        assert_abs_diff_eq!(first.s, 0.0);
        assert_abs_diff_eq!(first.x, 0.0);
        assert!(poses.iter().tuple_windows().all(|(a, b)| a.s <= b.s));
    }

    #[test]
    fn test_spacing_is_uniform_across_arc_boundaries() {
        let curve = sample_curve();
        let delta = 0.07;
        let mut d = Discretizer::new(delta).unwrap();
        let mut out = Vec::new();
        d.sample_curve(&curve, false, &mut out);

        for (a, b) in out.iter().tuple_windows() {
            // same spacing in arclength and no repeated junction sample
            assert_abs_diff_eq!(b.s - a.s, delta, epsilon = 1e-9);
            assert!(a.position().distance(&b.position()) <= delta + 1e-9);
        }
        assert_abs_diff_eq!(d.last_s(), curve.length(), epsilon = 1e-12);
    }

    #[test]
    fn test_chained_curves_share_junction_once() {
        let a = shortest_path(Pose2D::new(0.0, 0.0, 0.0), Pose2D::new(2.0, 0.0, 0.0), 1.0).unwrap().curve;
        let b = shortest_path(a.end(), Pose2D::new(4.0, 0.0, 0.0), 1.0).unwrap().curve;
        let trajectory = discretize_curves(&[a, b], 0.5).unwrap();
        // 0.0, 0.5, ..., 3.5 and the final endpoint 4.0
        assert_eq!(trajectory.len(), 9);
        assert_abs_diff_eq!(trajectory.total_length(), 4.0, epsilon = 1e-9);
        assert!(trajectory.poses.iter().tuple_windows().all(|(p, q)| q.s > p.s));
    }

    #[test]
    fn test_zero_length_arc_emits_nothing() {
        let arc = Arc::new(1.0, 1.0, 0.0, 1.0, 0.0);
        let mut d = Discretizer::new(0.1).unwrap();
        let mut out = Vec::new();
        d.sample_arc(&arc, false, &mut out);
        assert!(out.is_empty());
        d.sample_arc(&arc, true, &mut out);
        assert_eq!(out.len(), 1);
    }
}
