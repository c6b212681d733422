//! Shortest Dubins curve between two oriented points

use crate::common::{PlanningError, PlanningResult, Pose2D};
use crate::geometry::{mod2pi, range_symm, sinc};
use crate::path_planning::dubins::arc::Curve;
use crate::path_planning::dubins::maneuver::ManeuverKind;

/// Residual threshold of the standard-form self check
pub const CHECK_THRESHOLD: f64 = 1e-10;

/// Start and goal closer than this have no defined standard form
const COINCIDENT_EPS: f64 = 1e-12;

/// Shortest curve together with the family that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DubinsSolution {
    pub curve: Curve,
    pub maneuver: ManeuverKind,
}

impl DubinsSolution {
    pub fn length(&self) -> f64 {
        self.curve.length()
    }
}

/// Boundary-value problem rescaled so that start is `(-1, 0)` and goal `(1, 0)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardForm {
    pub th0: f64,
    pub thf: f64,
    pub kmax: f64,
    /// Half the start-goal distance
    pub lambda: f64,
}

impl StandardForm {
    pub fn new(start: Pose2D, goal: Pose2D, kmax: f64) -> Self {
        let dx = goal.x - start.x;
        let dy = goal.y - start.y;
        let phi = dy.atan2(dx);
        let lambda = dx.hypot(dy) / 2.0;
        StandardForm {
            th0: mod2pi(start.yaw - phi),
            thf: mod2pi(goal.yaw - phi),
            kmax: kmax * lambda,
            lambda,
        }
    }

    /// Map normalized lengths back to the original scale
    pub fn unscale(&self, lengths: [f64; 3]) -> [f64; 3] {
        [lengths[0] * self.lambda, lengths[1] * self.lambda, lengths[2] * self.lambda]
    }
}

/// Norm of the three boundary equations of a standard-form solution
pub fn standard_form_residual(lengths: [f64; 3], curvatures: [f64; 3], th0: f64, thf: f64) -> f64 {
    let [s1, s2, s3] = lengths;
    let [k0, k1, k2] = curvatures;
    let (x0, y0, xf, yf) = (-1.0, 0.0, 1.0, 0.0);

    let h1 = th0 + 0.5 * k0 * s1;
    let h2 = th0 + k0 * s1 + 0.5 * k1 * s2;
    let h3 = th0 + k0 * s1 + k1 * s2 + 0.5 * k2 * s3;
    let eq1 = x0
        + s1 * sinc(0.5 * k0 * s1) * h1.cos()
        + s2 * sinc(0.5 * k1 * s2) * h2.cos()
        + s3 * sinc(0.5 * k2 * s3) * h3.cos()
        - xf;
    let eq2 = y0
        + s1 * sinc(0.5 * k0 * s1) * h1.sin()
        + s2 * sinc(0.5 * k1 * s2) * h2.sin()
        + s3 * sinc(0.5 * k2 * s3) * h3.sin()
        - yf;
    let eq3 = range_symm(k0 * s1 + k1 * s2 + k2 * s3 + th0 - thf);

    (eq1 * eq1 + eq2 * eq2 + eq3 * eq3).sqrt()
}

/// Standard-form validity: small residual and a positive total length
pub fn check_standard_solution(lengths: [f64; 3], curvatures: [f64; 3], th0: f64, thf: f64) -> bool {
    let positive = lengths.iter().any(|&s| s > 0.0);
    positive && standard_form_residual(lengths, curvatures, th0, thf) < CHECK_THRESHOLD
}

fn validate(start: Pose2D, goal: Pose2D, kmax: f64) -> PlanningResult<()> {
    if !(kmax > 0.0) || !kmax.is_finite() {
        return Err(PlanningError::invalid(format!("curvature bound must be positive, got {}", kmax)));
    }
    let finite = [start.x, start.y, start.yaw, goal.x, goal.y, goal.yaw]
        .iter()
        .all(|v| v.is_finite());
    if !finite {
        return Err(PlanningError::invalid("Dubins boundary poses must be finite"));
    }
    Ok(())
}

/// Every feasible family for the boundary problem, shortest first
///
/// Coincident start and goal positions yield an empty list.
pub fn all_feasible(start: Pose2D, goal: Pose2D, kmax: f64) -> PlanningResult<Vec<DubinsSolution>> {
    validate(start, goal, kmax)?;
    let sf = StandardForm::new(start, goal, kmax);
    if sf.lambda < COINCIDENT_EPS {
        return Ok(Vec::new());
    }

    let mut solutions: Vec<(f64, DubinsSolution)> = ManeuverKind::ALL
        .iter()
        .filter_map(|&kind| {
            let sc = kind.solve(sf.th0, sf.thf, sf.kmax)?;
            let sc_len = sc[0] + sc[1] + sc[2];
            if !sc_len.is_finite() {
                return None;
            }
            Some((sc_len, build_solution(start, kmax, &sf, kind, sc)))
        })
        .collect();
    // stable sort keeps family order on ties
    solutions.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(solutions.into_iter().map(|(_, s)| s).collect())
}

/// Minimum-length curve with curvature bounded by `kmax`
///
/// Returns `PlanningError::NoFeasibleCurve` when no family applies
/// (coincident endpoints), and `InvalidInput` for a non-positive bound.
pub fn shortest_path(start: Pose2D, goal: Pose2D, kmax: f64) -> PlanningResult<DubinsSolution> {
    validate(start, goal, kmax)?;
    let sf = StandardForm::new(start, goal, kmax);
    if sf.lambda < COINCIDENT_EPS {
        return Err(PlanningError::NoFeasibleCurve);
    }

    let mut best: Option<(f64, ManeuverKind, [f64; 3])> = None;
    for &kind in ManeuverKind::ALL.iter() {
        if let Some(sc) = kind.solve(sf.th0, sf.thf, sf.kmax) {
            let len = sc[0] + sc[1] + sc[2];
            if best.map_or(len.is_finite(), |(l, _, _)| len < l) {
                best = Some((len, kind, sc));
            }
        }
    }

    let (_, kind, sc) = best.ok_or(PlanningError::NoFeasibleCurve)?;
    Ok(build_solution(start, kmax, &sf, kind, sc))
}

fn build_solution(start: Pose2D, kmax: f64, sf: &StandardForm, kind: ManeuverKind, sc: [f64; 3]) -> DubinsSolution {
    let signs = kind.curvature_signs();
    if cfg!(debug_assertions) {
        let sc_k = [signs[0] * sf.kmax, signs[1] * sf.kmax, signs[2] * sf.kmax];
        if !check_standard_solution(sc, sc_k, sf.th0, sf.thf) {
            log::warn!(
                "{} solution failed the standard-form check (residual {:e})",
                kind,
                standard_form_residual(sc, sc_k, sf.th0, sf.thf)
            );
        }
    }
    let curve = Curve::new(
        start,
        sf.unscale(sc),
        [signs[0] * kmax, signs[1] * kmax, signs[2] * kmax],
    );
    DubinsSolution { curve, maneuver: kind }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_straight_ahead() {
        let sol = shortest_path(Pose2D::new(0.0, 0.0, 0.0), Pose2D::new(4.0, 0.0, 0.0), 1.0).unwrap();
        assert_abs_diff_eq!(sol.length(), 4.0, epsilon = 1e-9);
        assert_eq!(sol.maneuver, ManeuverKind::LSL);
        assert!(sol.curve.arcs()[1].is_straight());
    }

    #[test]
    fn test_u_turn_uses_turns() {
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let goal = Pose2D::new(0.0, 2.0, PI);
        let sol = shortest_path(start, goal, 1.0).unwrap();
        // half circle of radius one
        assert_abs_diff_eq!(sol.length(), PI, epsilon = 1e-9);
        let end = sol.curve.end();
        assert_abs_diff_eq!(end.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(end.y, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_curvature_is_input_error() {
        let a = Pose2D::new(0.0, 0.0, 0.0);
        let b = Pose2D::new(1.0, 0.0, 0.0);
        assert!(matches!(shortest_path(a, b, 0.0), Err(PlanningError::InvalidInput(_))));
        assert!(matches!(shortest_path(a, b, -1.0), Err(PlanningError::InvalidInput(_))));
        assert!(matches!(shortest_path(a, b, f64::NAN), Err(PlanningError::InvalidInput(_))));
    }

    #[test]
    fn test_coincident_points_have_no_curve() {
        let a = Pose2D::new(1.0, 1.0, 0.0);
        let b = Pose2D::new(1.0, 1.0, PI);
        assert_eq!(shortest_path(a, b, 1.0), Err(PlanningError::NoFeasibleCurve));
        assert!(all_feasible(a, b, 1.0).unwrap().is_empty());
    }

    #[test]
    fn test_all_feasible_sorted_and_led_by_shortest() {
        let start = Pose2D::new(0.0, 0.0, 0.3);
        let goal = Pose2D::new(1.0, 1.5, 2.0);
        let all = all_feasible(start, goal, 2.0).unwrap();
        assert!(!all.is_empty());
        assert!(all.windows(2).all(|w| w[0].length() <= w[1].length()));
        let best = shortest_path(start, goal, 2.0).unwrap();
        assert_abs_diff_eq!(all[0].length(), best.length(), epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn prop_shortest_path_meets_boundary(
            x0 in -10.0f64..10.0, y0 in -10.0f64..10.0, th0 in 0.0f64..(2.0 * PI),
            xf in -10.0f64..10.0, yf in -10.0f64..10.0, thf in 0.0f64..(2.0 * PI),
            kmax in 0.1f64..5.0,
        ) {
            prop_assume!((xf - x0).hypot(yf - y0) > 1e-3);
            let start = Pose2D::new(x0, y0, th0);
            let goal = Pose2D::new(xf, yf, thf);
            let sol = shortest_path(start, goal, kmax).unwrap();
            let arcs = sol.curve.arcs();

            prop_assert!(sol.length() >= 0.0);
            prop_assert_eq!(arcs[1].start(), arcs[0].end());
            prop_assert_eq!(arcs[2].start(), arcs[1].end());
            for arc in arcs.iter() {
                prop_assert!(arc.curvature().abs() <= kmax + 1e-12);
            }

            let end = sol.curve.end();
            prop_assert!((end.x - xf).abs() < 1e-9, "x mismatch {} vs {}", end.x, xf);
            prop_assert!((end.y - yf).abs() < 1e-9, "y mismatch {} vs {}", end.y, yf);
            prop_assert!(range_symm(end.yaw - thf).abs() < 1e-9);

            let sf = StandardForm::new(start, goal, kmax);
            let signs = sol.maneuver.curvature_signs();
            let sc_len = sol.curve.arcs().iter().map(|a| a.length() / sf.lambda).collect::<Vec<_>>();
            let residual = standard_form_residual(
                [sc_len[0], sc_len[1], sc_len[2]],
                [signs[0] * sf.kmax, signs[1] * sf.kmax, signs[2] * sf.kmax],
                sf.th0,
                sf.thf,
            );
            prop_assert!(residual < 1e-8, "residual {}", residual);
        }
    }
}
