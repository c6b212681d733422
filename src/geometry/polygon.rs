//! Polygon utilities: projections, vertex ordering and gate geometry

use std::cmp::Reverse;

use nalgebra::Vector2;
use ordered_float::OrderedFloat;

use crate::common::{PlanningError, PlanningResult, Point2D, Polygon, PolygonOffsetter};
use crate::geometry::angle::mod2pi;

/// Orthogonal projection of `p` onto the infinite line through `a` and `b`
pub fn project_point_to_line(a: Point2D, b: Point2D, p: Point2D) -> Point2D {
    let ab = b.to_vector() - a.to_vector();
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return a;
    }
    let t = (p.to_vector() - a.to_vector()).dot(&ab) / len2;
    Point2D::from(a.to_vector() + ab * t)
}

/// Closest point of segment `a-b` to `p`
pub fn project_point_to_segment(a: Point2D, b: Point2D, p: Point2D) -> Point2D {
    let ab = b.to_vector() - a.to_vector();
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return a;
    }
    let t = ((p.to_vector() - a.to_vector()).dot(&ab) / len2).clamp(0.0, 1.0);
    Point2D::from(a.to_vector() + ab * t)
}

/// Point of `points` closest to `p`, `None` when `points` is empty
pub fn nearest_point(p: Point2D, points: &[Point2D]) -> Option<Point2D> {
    points
        .iter()
        .copied()
        .min_by_key(|q| OrderedFloat(q.distance(&p)))
}

/// Reorder vertices clockwise around the barycenter, starting from the +y axis
pub fn sort_vertices_clockwise(polygon: &mut Polygon) {
    let c = polygon.barycenter();
    polygon.vertices.sort_by_key(|v| {
        let dx = v.x - c.x;
        let dy = v.y - c.y;
        let clockwise = mod2pi(std::f64::consts::FRAC_PI_2 - dy.atan2(dx));
        (OrderedFloat(clockwise), Reverse(OrderedFloat(dx * dx + dy * dy)))
    });
}

/// Outward unit normal of edge `a-b` for a polygon of the given orientation
pub fn outward_normal(a: Point2D, b: Point2D, counter_clockwise: bool) -> Vector2<f64> {
    let d = (b.to_vector() - a.to_vector()).normalize();
    if counter_clockwise {
        Vector2::new(d.y, -d.x)
    } else {
        Vector2::new(-d.y, d.x)
    }
}

/// Index of the polygon edge nearest to `p` (edge `i` runs from vertex `i`)
pub fn nearest_edge(polygon: &Polygon, p: Point2D) -> Option<usize> {
    polygon
        .edges()
        .enumerate()
        .min_by_key(|(_, (a, b))| OrderedFloat(project_point_to_segment(*a, *b, p).distance(&p)))
        .map(|(i, _)| i)
}

/// Where and how the robot must end the mission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateApproach {
    /// Gate barycenter
    pub target: Point2D,
    /// Required arrival heading in `[0, 2π)`, facing the nearest border wall
    pub heading: f64,
    /// Border edge the gate sits against
    pub edge_index: usize,
}

fn validate_border_and_gate(border: &Polygon, gate: &Polygon) -> PlanningResult<()> {
    if border.len() < 4 || !border.is_valid() {
        return Err(PlanningError::invalid(format!(
            "arena border needs at least 4 finite vertices, got {}",
            border.len()
        )));
    }
    if border.signed_area().abs() < f64::EPSILON {
        return Err(PlanningError::invalid("arena border has zero area"));
    }
    if !gate.is_valid() {
        return Err(PlanningError::invalid(format!(
            "gate polygon needs at least 3 finite vertices, got {}",
            gate.len()
        )));
    }
    Ok(())
}

/// Gate barycenter and the heading pointing into the nearest border wall
pub fn gate_approach(border: &Polygon, gate: &Polygon) -> PlanningResult<GateApproach> {
    validate_border_and_gate(border, gate)?;
    let target = gate.barycenter();
    let edge_index = nearest_edge(border, target)
        .ok_or_else(|| PlanningError::invalid("arena border has no edges"))?;
    let n = border.len();
    let a = border.vertices[edge_index];
    let b = border.vertices[(edge_index + 1) % n];
    let normal = outward_normal(a, b, border.signed_area() > 0.0);
    Ok(GateApproach {
        target,
        heading: mod2pi(normal.y.atan2(normal.x)),
        edge_index,
    })
}

/// Auxiliary rectangle joining the (eroded) border to the gate
///
/// Spans the gate's extent along the border edge nearest to the gate and
/// runs from `extra_depth` inside that edge to `extra_depth` past the gate's
/// farthest vertex. `None` when the border already contains the whole gate.
pub fn gate_slot(border: &Polygon, gate: &Polygon, extra_depth: f64) -> PlanningResult<Option<Polygon>> {
    validate_border_and_gate(border, gate)?;
    let target = gate.barycenter();
    let edge_index = nearest_edge(border, target)
        .ok_or_else(|| PlanningError::invalid("arena border has no edges"))?;
    let n = border.len();
    let a = border.vertices[edge_index];
    let b = border.vertices[(edge_index + 1) % n];
    let edge = b.to_vector() - a.to_vector();
    let edge_len = edge.norm();
    if edge_len == 0.0 {
        return Err(PlanningError::invalid("arena border has a zero-length edge"));
    }
    let u = edge / edge_len;
    let normal = outward_normal(a, b, border.signed_area() > 0.0);

    let (mut s_min, mut s_max, mut depth) = (f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for v in &gate.vertices {
        let rel = v.to_vector() - a.to_vector();
        s_min = s_min.min(rel.dot(&u));
        s_max = s_max.max(rel.dot(&u));
        depth = depth.max(rel.dot(&normal));
    }
    if depth <= 0.0 {
        return Ok(None);
    }
    if s_max - s_min <= 0.0 {
        return Err(PlanningError::invalid("gate has no extent along its nearest border edge"));
    }
    let extra = extra_depth.max(0.0);
    let (inner, outer) = (-extra, depth + extra);

    let at = |s: f64, d: f64| Point2D::from(a.to_vector() + u * s + normal * d);
    Ok(Some(Polygon::new(vec![
        at(s_min, inner),
        at(s_max, inner),
        at(s_max, outer),
        at(s_min, outer),
    ])))
}

/// Union of the (eroded) border with its gate slot, so that the gate
/// barycenter becomes reachable. A border that already contains the whole
/// gate is returned unchanged.
pub fn carve_gate_slot(
    border: &Polygon,
    gate: &Polygon,
    extra_depth: f64,
    offsetter: &dyn PolygonOffsetter,
) -> PlanningResult<Polygon> {
    match gate_slot(border, gate, extra_depth)? {
        Some(slot) => offsetter.union(border, &slot),
        None => Ok(border.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::offset::ClipperOffsetter;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_project_point_to_line() {
        let q = project_point_to_line(Point2D::new(0.0, 0.0), Point2D::new(2.0, 2.0), Point2D::new(2.0, 0.0));
        assert_abs_diff_eq!(q.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(q.y, 1.0, epsilon = 1e-12);
        let vertical = project_point_to_line(Point2D::new(1.0, 0.0), Point2D::new(1.0, 5.0), Point2D::new(3.0, 2.0));
        assert_abs_diff_eq!(vertical.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(vertical.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nearest_point() {
        let pts = [Point2D::new(5.0, 5.0), Point2D::new(1.0, 0.5), Point2D::new(-3.0, 0.0)];
        assert_eq!(nearest_point(Point2D::origin(), &pts), Some(Point2D::new(1.0, 0.5)));
        assert_eq!(nearest_point(Point2D::origin(), &[]), None);
    }

    #[test]
    fn test_sort_vertices_clockwise() {
        let mut poly = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
        ]);
        sort_vertices_clockwise(&mut poly);
        assert!(poly.signed_area() < 0.0);
        assert_eq!(poly.vertices[0], Point2D::new(1.0, 1.0));
    }

    #[test]
    fn test_gate_heading_faces_nearest_wall() {
        let border = Polygon::rectangle(0.0, 0.0, 1.5, 1.0);
        // gate against the right wall
        let gate = Polygon::rectangle(1.4, 0.4, 1.5, 0.6);
        let approach = gate_approach(&border, &gate).unwrap();
        assert_abs_diff_eq!(approach.target.x, 1.45, epsilon = 1e-12);
        assert_abs_diff_eq!(approach.heading, 0.0, epsilon = 1e-12);
        assert_eq!(approach.edge_index, 1);

        // same wall with clockwise border vertex order
        let mut cw = border.clone();
        cw.vertices.reverse();
        let approach = gate_approach(&cw, &gate).unwrap();
        assert_abs_diff_eq!(approach.heading, 0.0, epsilon = 1e-12);

        // gate against the top wall
        let gate = Polygon::rectangle(0.6, 0.9, 0.9, 1.0);
        let approach = gate_approach(&border, &gate).unwrap();
        assert_abs_diff_eq!(approach.heading, PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gate_rejects_triangle_border() {
        let border = Polygon::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(0.0, 1.0)]);
        let gate = Polygon::rectangle(0.1, 0.0, 0.2, 0.1);
        assert!(matches!(gate_approach(&border, &gate), Err(PlanningError::InvalidInput(_))));
    }

    #[test]
    fn test_carve_gate_slot_makes_gate_reachable() {
        let eroded = Polygon::rectangle(0.1, 0.1, 1.4, 0.9);
        let gate = Polygon::rectangle(1.4, 0.4, 1.5, 0.6);
        let target = gate.barycenter();
        assert!(!eroded.contains(target));

        let slot = gate_slot(&eroded, &gate, 0.05).unwrap().unwrap();
        let bbox = slot.bounding_box().unwrap();
        assert_abs_diff_eq!(bbox.xmin, 1.35, epsilon = 1e-12);
        assert_abs_diff_eq!(bbox.xmax, 1.55, epsilon = 1e-12);
        assert_abs_diff_eq!(bbox.ymin, 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(bbox.ymax, 0.6, epsilon = 1e-12);

        let carved = carve_gate_slot(&eroded, &gate, 0.05, &ClipperOffsetter::new()).unwrap();
        assert!(carved.signed_area() > 0.0);
        assert!(carved.contains(target));
        assert!(carved.contains(Point2D::new(1.0, 0.5)));
        assert!(!carved.contains(Point2D::new(1.45, 0.2)));
    }

    #[test]
    fn test_carve_gate_slot_noop_when_inside() {
        let border = Polygon::rectangle(0.0, 0.0, 2.0, 2.0);
        let gate = Polygon::rectangle(1.0, 1.0, 1.2, 1.2);
        assert_eq!(gate_slot(&border, &gate, 0.1).unwrap(), None);
        assert_eq!(carve_gate_slot(&border, &gate, 0.1, &ClipperOffsetter::new()).unwrap(), border);
    }
}
