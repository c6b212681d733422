//! Segment/segment intersection

use crate::common::Point2D;

/// Determinants smaller than this are treated as parallel segments
const PARALLEL_EPS: f64 = 1e-12;

/// Parametric intersection test between segments `p1-p2` and `p3-p4`
///
/// Solves `p1 + t (p2 - p1) = p3 + u (p4 - p3)` and reports an intersection
/// when both `t` and `u` lie in `[0, 1]`. Parallel and degenerate
/// (zero-length) segments never intersect, overlapping collinear ones
/// included.
pub fn segments_intersect(p1: Point2D, p2: Point2D, p3: Point2D, p4: Point2D) -> bool {
    segment_intersection_params(p1, p2, p3, p4)
        .map_or(false, |(t, u)| (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u))
}

/// Parameters `(t, u)` of the supporting-line intersection, `None` when parallel
pub fn segment_intersection_params(
    p1: Point2D,
    p2: Point2D,
    p3: Point2D,
    p4: Point2D,
) -> Option<(f64, f64)> {
    let d1 = p2.to_vector() - p1.to_vector();
    let d2 = p4.to_vector() - p3.to_vector();
    let denom = d1.perp(&d2);
    if denom.abs() < PARALLEL_EPS {
        return None;
    }
    let w = p3.to_vector() - p1.to_vector();
    let t = w.perp(&d2) / denom;
    let u = w.perp(&d1) / denom;
    Some((t, u))
}

/// Intersection point of the two segments, if any
pub fn segment_intersection_point(
    p1: Point2D,
    p2: Point2D,
    p3: Point2D,
    p4: Point2D,
) -> Option<Point2D> {
    let (t, u) = segment_intersection_params(p1, p2, p3, p4)?;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Point2D::new(p1.x + t * (p2.x - p1.x), p1.y + t * (p2.y - p1.y)))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    #[test]
    fn test_crossing_segments() {
        assert!(segments_intersect(p(0.0, 0.0), p(2.0, 2.0), p(0.0, 2.0), p(2.0, 0.0)));
        let hit = segment_intersection_point(p(0.0, 0.0), p(2.0, 2.0), p(0.0, 2.0), p(2.0, 0.0)).unwrap();
        assert_abs_diff_eq!(hit.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_disjoint_segments() {
        assert!(!segments_intersect(p(0.0, 0.0), p(1.0, 0.0), p(2.0, -1.0), p(2.0, 1.0)));
    }

    #[test]
    fn test_touching_endpoint_counts() {
        assert!(segments_intersect(p(0.0, 0.0), p(1.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)));
    }

    #[test]
    fn test_parallel_and_degenerate_segments_do_not_intersect() {
        assert!(!segments_intersect(p(0.0, 0.0), p(2.0, 0.0), p(1.0, 0.0), p(3.0, 0.0)));
        assert!(!segments_intersect(p(0.0, 0.0), p(1.0, 1.0), p(0.5, 0.5), p(0.5, 0.5)));
    }

    proptest! {
        #[test]
        fn prop_intersection_symmetry(
            a in (-10.0f64..10.0, -10.0f64..10.0),
            b in (-10.0f64..10.0, -10.0f64..10.0),
            c in (-10.0f64..10.0, -10.0f64..10.0),
            d in (-10.0f64..10.0, -10.0f64..10.0),
        ) {
            let (a, b, c, d) = (Point2D::from(a), Point2D::from(b), Point2D::from(c), Point2D::from(d));
            let expected = segments_intersect(a, b, c, d);
            prop_assert_eq!(segments_intersect(c, d, a, b), expected);
            prop_assert_eq!(segments_intersect(b, a, c, d), expected);
            prop_assert_eq!(segments_intersect(a, b, d, c), expected);
        }
    }
}
