//! Polygon offsetting and union backed by clipper2

use clipper2::{union, EndType, FillRule, JoinType, Paths};
use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::common::{PlanningError, PlanningResult, Point2D, Polygon, PolygonOffsetter};

/// clipper2 rounds to two decimals; coordinates are scaled up first so that
/// results keep micrometre resolution
const COORD_SCALE: f64 = 1e4;

/// Offsets and merges polygons with the Clipper2 library.
///
/// Concave inputs are handled: notches narrower than twice the offset are
/// filled, and an erosion that splits a polygon keeps its largest piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipperOffsetter {
    miter_limit: f64,
}

impl ClipperOffsetter {
    pub fn new() -> Self {
        Self::with_miter_limit(2.0)
    }

    /// Corners sharper than `miter_limit` times the offset are squared off
    pub fn with_miter_limit(miter_limit: f64) -> Self {
        ClipperOffsetter { miter_limit }
    }

    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }
}

impl Default for ClipperOffsetter {
    fn default() -> Self {
        Self::new()
    }
}

impl PolygonOffsetter for ClipperOffsetter {
    fn offset(&self, polygon: &Polygon, delta: f64) -> PlanningResult<Polygon> {
        if !delta.is_finite() {
            return Err(PlanningError::invalid(format!("offset amount must be finite, got {}", delta)));
        }
        let (cleaned, ccw) = clean(polygon)?;
        if delta == 0.0 {
            return Ok(oriented(cleaned, ccw));
        }

        let inflated = to_paths(&[&cleaned]).inflate(
            delta * COORD_SCALE,
            JoinType::Miter,
            EndType::Polygon,
            self.miter_limit,
        );
        let pieces = from_paths(inflated);
        if pieces.len() > 1 {
            log::debug!("offset by {} gave {} contours, keeping the largest", delta, pieces.len());
        }
        largest(pieces)
            .map(|p| oriented(p, ccw))
            .ok_or_else(|| PlanningError::CollaboratorContract(format!("offset by {} collapsed the polygon", delta)))
    }

    fn union(&self, a: &Polygon, b: &Polygon) -> PlanningResult<Polygon> {
        let (a, ccw) = clean(a)?;
        let (b, _) = clean(b)?;
        let merged = union(to_paths(&[&a]), to_paths(&[&b]), FillRule::NonZero)
            .map_err(|e| PlanningError::CollaboratorContract(format!("polygon union failed: {:?}", e)))?;

        let pieces = from_paths(merged);
        let outer = largest(pieces.clone())
            .ok_or_else(|| PlanningError::CollaboratorContract("polygon union is empty".to_string()))?;
        // holes come back with the opposite orientation
        let outer_ccw = outer.signed_area() > 0.0;
        let outers = pieces.iter().filter(|p| (p.signed_area() > 0.0) == outer_ccw).count();
        if outers > 1 {
            return Err(PlanningError::CollaboratorContract(format!(
                "union of disjoint polygons gave {} pieces",
                outers
            )));
        }
        Ok(oriented(outer, ccw))
    }
}

/// Drop repeated vertices, reject degenerate input and return the polygon
/// counter-clockwise together with its original orientation
fn clean(polygon: &Polygon) -> PlanningResult<(Polygon, bool)> {
    let mut vertices: Vec<Point2D> = polygon.vertices.iter().copied().dedup().collect();
    while vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    let mut cleaned = Polygon::new(vertices);
    if !cleaned.is_valid() {
        return Err(PlanningError::invalid(format!(
            "cannot offset a polygon with {} distinct vertices",
            cleaned.len()
        )));
    }
    let area = cleaned.signed_area();
    if area.abs() < f64::EPSILON {
        return Err(PlanningError::invalid("cannot offset a zero-area polygon"));
    }
    if area < 0.0 {
        cleaned.vertices.reverse();
    }
    Ok((cleaned, area > 0.0))
}

fn oriented(mut polygon: Polygon, ccw: bool) -> Polygon {
    if (polygon.signed_area() > 0.0) != ccw {
        polygon.vertices.reverse();
    }
    polygon
}

fn largest(pieces: Vec<Polygon>) -> Option<Polygon> {
    pieces.into_iter().max_by_key(|p| OrderedFloat(p.signed_area().abs()))
}

fn to_paths(polygons: &[&Polygon]) -> Paths {
    let coords: Vec<Vec<(f64, f64)>> = polygons
        .iter()
        .map(|p| p.vertices.iter().map(|v| (v.x * COORD_SCALE, v.y * COORD_SCALE)).collect())
        .collect();
    coords.into()
}

fn from_paths(paths: Paths) -> Vec<Polygon> {
    let coords: Vec<Vec<(f64, f64)>> = paths.into();
    coords
        .into_iter()
        .filter(|path| path.len() >= 3)
        .map(|path| {
            Polygon::new(
                path.into_iter()
                    .map(|(x, y)| Point2D::new(x / COORD_SCALE, y / COORD_SCALE))
                    .collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn u_shape() -> Polygon {
        // 0.08 wide notch open to the top
        Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.4, 0.0),
            Point2D::new(0.4, 0.3),
            Point2D::new(0.24, 0.3),
            Point2D::new(0.24, 0.1),
            Point2D::new(0.16, 0.1),
            Point2D::new(0.16, 0.3),
            Point2D::new(0.0, 0.3),
        ])
    }

    #[test]
    fn test_inflate_square() {
        let square = Polygon::rectangle(0.0, 0.0, 1.0, 1.0);
        let inflated = ClipperOffsetter::new().offset(&square, 0.5).unwrap();
        let bbox = inflated.bounding_box().unwrap();
        assert_abs_diff_eq!(bbox.xmin, -0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(bbox.ymax, 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(inflated.signed_area(), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_erode_keeps_clockwise_order() {
        let mut square = Polygon::rectangle(0.0, 0.0, 2.0, 2.0);
        square.vertices.reverse();
        let eroded = ClipperOffsetter::new().offset(&square, -0.5).unwrap();
        assert_abs_diff_eq!(eroded.signed_area(), -1.0, epsilon = 1e-5);
        assert!(eroded.contains(Point2D::new(1.0, 1.0)));
        assert!(!eroded.contains(Point2D::new(0.2, 0.2)));
    }

    #[test]
    fn test_erode_too_far_collapses() {
        let square = Polygon::rectangle(0.0, 0.0, 1.0, 1.0);
        assert!(matches!(
            ClipperOffsetter::new().offset(&square, -0.75),
            Err(PlanningError::CollaboratorContract(_))
        ));
    }

    #[test]
    fn test_inflate_fills_narrow_notch() {
        let u = u_shape();
        let notch = Point2D::new(0.2, 0.2);
        assert!(!u.contains(notch));

        let inflated = ClipperOffsetter::new().offset(&u, 0.05).unwrap();
        assert!(inflated.is_valid());
        assert!(inflated.contains(notch));
        let bbox = inflated.bounding_box().unwrap();
        assert_abs_diff_eq!(bbox.xmin, -0.05, epsilon = 1e-6);
        assert_abs_diff_eq!(bbox.xmax, 0.45, epsilon = 1e-6);
        assert_abs_diff_eq!(bbox.ymax, 0.35, epsilon = 1e-6);
    }

    #[test]
    fn test_duplicate_and_collinear_vertices() {
        let poly = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(2.0, 1.0),
            Point2D::new(0.0, 1.0),
        ]);
        let inflated = ClipperOffsetter::new().offset(&poly, 0.1).unwrap();
        assert_abs_diff_eq!(inflated.signed_area(), 2.2 * 1.2, epsilon = 1e-5);
    }

    #[test]
    fn test_union_merges_overlapping_polygons() {
        let room = Polygon::rectangle(0.0, 0.0, 1.0, 1.0);
        let slot = Polygon::rectangle(0.9, 0.4, 1.2, 0.6);
        let merged = ClipperOffsetter::new().union(&room, &slot).unwrap();
        assert_abs_diff_eq!(merged.signed_area(), 1.0 + 0.2 * 0.2, epsilon = 1e-5);
        assert!(merged.contains(Point2D::new(1.1, 0.5)));
        assert!(!merged.contains(Point2D::new(1.1, 0.2)));
    }

    #[test]
    fn test_union_rejects_disjoint_polygons() {
        let a = Polygon::rectangle(0.0, 0.0, 1.0, 1.0);
        let b = Polygon::rectangle(2.0, 0.0, 3.0, 1.0);
        assert!(matches!(
            ClipperOffsetter::new().union(&a, &b),
            Err(PlanningError::CollaboratorContract(_))
        ));
    }

    #[test]
    fn test_rejects_degenerate_polygon() {
        let line = Polygon::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]);
        assert!(ClipperOffsetter::new().offset(&line, 0.1).is_err());
        let square = Polygon::rectangle(0.0, 0.0, 1.0, 1.0);
        assert!(ClipperOffsetter::new().offset(&square, f64::NAN).is_err());
    }
}
