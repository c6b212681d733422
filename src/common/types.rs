//! Common types used throughout dubins_mission

use itertools::Itertools;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// 2D point representation (arena frame, meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// 2D pose (position + heading)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn from_point(point: Point2D, yaw: f64) -> Self {
        Self { x: point.x, y: point.y, yaw }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Sampled pose along a planned trajectory
///
/// `s` is the arclength travelled so far, `theta` lies in `[0, 2π)` and `k`
/// is the curvature of the arc the sample was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub k: f64,
}

impl Pose {
    pub fn new(s: f64, x: f64, y: f64, theta: f64, k: f64) -> Self {
        Self { s, x, y, theta, k }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Path represented as a sequence of 2D points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path2D {
    pub points: Vec<Point2D>,
}

impl Path2D {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Point2D> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point2D> {
        self.points.last()
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn total_length(&self) -> f64 {
        self.points
            .iter()
            .tuple_windows()
            .map(|(a, b)| a.distance(b))
            .sum()
    }
}

impl Default for Path2D {
    fn default() -> Self {
        Self::new()
    }
}

/// Sampled trajectory handed to the motion controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub poses: Vec<Pose>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self { poses: Vec::new() }
    }

    pub fn from_poses(poses: Vec<Pose>) -> Self {
        Self { poses }
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Arclength of the last sample
    pub fn total_length(&self) -> f64 {
        self.poses.last().map_or(0.0, |p| p.s)
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.poses.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.poses.iter().map(|p| p.y).collect()
    }
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BoundingBox {
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }

    pub fn contains(&self, p: Point2D) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }

    /// Bounding box of a point set, `None` when empty
    pub fn of_points(points: &[Point2D]) -> Option<Self> {
        let first = points.first()?;
        let init = BoundingBox { xmin: first.x, xmax: first.x, ymin: first.y, ymax: first.y };
        Some(points.iter().fold(init, |b, p| BoundingBox {
            xmin: b.xmin.min(p.x),
            xmax: b.xmax.max(p.x),
            ymin: b.ymin.min(p.y),
            ymax: b.ymax.max(p.y),
        }))
    }
}

/// Closed polygon; the edge from the last vertex back to the first is implicit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Point2D>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point2D>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle with corners `(xmin, ymin)` and `(xmax, ymax)`
    pub fn rectangle(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self::new(vec![
            Point2D::new(xmin, ymin),
            Point2D::new(xmax, ymin),
            Point2D::new(xmax, ymax),
            Point2D::new(xmin, ymax),
        ])
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// At least three vertices and all coordinates finite
    pub fn is_valid(&self) -> bool {
        self.vertices.len() >= 3 && self.vertices.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }

    /// All edges, including the closing one
    pub fn edges(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        self.vertices.iter().copied().circular_tuple_windows::<(Point2D, Point2D)>()
    }

    /// Vertex average
    pub fn barycenter(&self) -> Point2D {
        let n = self.vertices.len().max(1) as f64;
        let (sx, sy) = self.vertices.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point2D::new(sx / n, sy / n)
    }

    /// Shoelace area, positive for counter-clockwise vertex order
    pub fn signed_area(&self) -> f64 {
        0.5 * self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::of_points(&self.vertices)
    }

    /// Even-odd ray casting test; points on an edge may land on either side
    pub fn contains(&self, p: Point2D) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert_abs_diff_eq!(p1.distance(&p2), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_path2d_total_length() {
        let path = Path2D::from_points(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
        ]);
        assert_abs_diff_eq!(path.total_length(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_polygon_edges_include_closing_edge() {
        let square = Polygon::rectangle(0.0, 0.0, 1.0, 1.0);
        let edges: Vec<_> = square.edges().collect();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[3], (Point2D::new(0.0, 1.0), Point2D::new(0.0, 0.0)));
    }

    #[test]
    fn test_polygon_area_and_contains() {
        let square = Polygon::rectangle(0.0, 0.0, 2.0, 2.0);
        assert_abs_diff_eq!(square.signed_area(), 4.0, epsilon = 1e-12);
        assert!(square.contains(Point2D::new(1.0, 1.0)));
        assert!(!square.contains(Point2D::new(3.0, 1.0)));
        assert_eq!(square.barycenter(), Point2D::new(1.0, 1.0));
    }

    #[test]
    fn test_polygon_validity() {
        assert!(!Polygon::new(vec![Point2D::origin(), Point2D::new(1.0, 0.0)]).is_valid());
        assert!(Polygon::rectangle(0.0, 0.0, 1.0, 1.0).is_valid());
    }
}
