//! Angle normalization and closed-form constant-curvature propagation

use std::f64::consts::PI;

const TWO_PI: f64 = 2.0 * PI;

/// Below this magnitude `sinc` switches to its Taylor expansion
const SINC_TAYLOR_THRESHOLD: f64 = 0.002;

/// Normalize an angle to `[0, 2π)`
pub fn mod2pi(angle: f64) -> f64 {
    let v = angle.rem_euclid(TWO_PI);
    // rem_euclid rounds tiny negative inputs up to exactly 2π
    if v >= TWO_PI {
        0.0
    } else {
        v
    }
}

/// Normalize an angular difference to `(-π, π]`
pub fn range_symm(angle: f64) -> f64 {
    let v = mod2pi(angle);
    if v > PI {
        v - TWO_PI
    } else {
        v
    }
}

/// `sin(t) / t`, stabilized near zero
pub fn sinc(t: f64) -> f64 {
    if t.abs() < SINC_TAYLOR_THRESHOLD {
        let t2 = t * t;
        1.0 - t2 / 6.0 * (1.0 - t2 / 20.0)
    } else {
        t.sin() / t
    }
}

/// Pose reached after travelling `s` along an arc of curvature `k`
/// starting from `(x0, y0, th0)`. Returns `(x, y, th)` with `th` in `[0, 2π)`.
///
/// Every arc endpoint and every trajectory sample goes through this function.
pub fn circline(s: f64, x0: f64, y0: f64, th0: f64, k: f64) -> (f64, f64, f64) {
    let half = k * s / 2.0;
    let scale = s * sinc(half);
    let x = x0 + scale * (th0 + half).cos();
    let y = y0 + scale * (th0 + half).sin();
    let th = mod2pi(th0 + k * s);
    (x, y, th)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_mod2pi_range() {
        assert_abs_diff_eq!(mod2pi(-PI / 2.0), 1.5 * PI, epsilon = 1e-12);
        assert_abs_diff_eq!(mod2pi(5.0 * PI), PI, epsilon = 1e-12);
        assert_eq!(mod2pi(TWO_PI), 0.0);
        assert_eq!(mod2pi(-1e-18), 0.0);
        assert!(mod2pi(f64::INFINITY).is_nan());
    }

    #[test]
    fn test_range_symm() {
        assert_abs_diff_eq!(range_symm(PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(range_symm(-PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(range_symm(1.5 * PI), -0.5 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_sinc_is_continuous_at_threshold() {
        assert_eq!(sinc(0.0), 1.0);
        let below = sinc(SINC_TAYLOR_THRESHOLD * (1.0 - 1e-9));
        let above = sinc(SINC_TAYLOR_THRESHOLD * (1.0 + 1e-9));
        assert_abs_diff_eq!(below, above, epsilon = 1e-12);
        assert_abs_diff_eq!(sinc(1e-3), (1e-3f64).sin() / 1e-3, epsilon = 1e-15);
    }

    #[test]
    fn test_circline_straight_and_quarter_turn() {
        let (x, y, th) = circline(2.0, 1.0, 1.0, 0.0, 0.0);
        assert_abs_diff_eq!(x, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(th, 0.0, epsilon = 1e-12);

        // quarter circle of radius 1 turning left
        let (x, y, th) = circline(PI / 2.0, 0.0, 0.0, 0.0, 1.0);
        assert_abs_diff_eq!(x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(th, PI / 2.0, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn prop_mod2pi_idempotent(x in -1.0e6f64..1.0e6) {
            let once = mod2pi(x);
            prop_assert!(once >= 0.0 && once < TWO_PI);
            prop_assert_eq!(mod2pi(once), once);
        }

        #[test]
        fn prop_range_symm_bounds(x in -1.0e6f64..1.0e6) {
            let v = range_symm(x);
            prop_assert!(v > -PI && v <= PI);
        }
    }
}
