//! Line-of-sight shortcutting of waypoint polylines
//!
//! Reduces the number of waypoints handed to the multi-point Dubins planner:
//! - divide and conquer shortcutting (direct edge or split at the midpoint)
//! - repeated until the polyline stops shrinking
//! - a final pass over the reversed polyline

use serde::{Deserialize, Serialize};

use crate::common::{Path2D, PlanningError, PlanningResult, Point2D};
use crate::path_planning::collision::CollisionChecker;

/// Path smoothing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Maximum shortcut passes per direction
    pub max_iterations: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { max_iterations: 100 }
    }
}

/// Path smoother
pub struct PathSmoother<'a> {
    checker: &'a CollisionChecker,
    config: SmoothingConfig,
}

impl<'a> PathSmoother<'a> {
    pub fn new(checker: &'a CollisionChecker, config: SmoothingConfig) -> Self {
        Self { checker, config }
    }

    pub fn with_defaults(checker: &'a CollisionChecker) -> Self {
        Self::new(checker, SmoothingConfig::default())
    }

    /// Shorten `path` while keeping its endpoints
    ///
    /// Edges of the input are assumed collision-free; every edge of the
    /// output is either one of them or a checked shortcut.
    pub fn smooth(&self, path: &Path2D) -> PlanningResult<Path2D> {
        if path.len() < 2 {
            return Err(PlanningError::invalid(format!(
                "cannot smooth a polyline of {} points",
                path.len()
            )));
        }
        let input_len = path.len();

        let mut points = self.until_stable(path.points.clone());
        points.reverse();
        let mut points = self.until_stable(points);
        points.reverse();

        log::debug!("smoothed polyline from {} to {} points", input_len, points.len());
        Ok(Path2D::from_points(points))
    }

    fn until_stable(&self, mut points: Vec<Point2D>) -> Vec<Point2D> {
        for _ in 0..self.config.max_iterations {
            let next = self.shortcut(&points);
            if next.len() >= points.len() {
                break;
            }
            points = next;
        }
        points
    }

    /// One divide-and-conquer shortcut pass
    fn shortcut(&self, points: &[Point2D]) -> Vec<Point2D> {
        let n = points.len();
        if n <= 2 {
            return points.to_vec();
        }

        let mut out = vec![points[0]];
        // right halves are pushed first so spans pop in path order
        let mut stack = vec![(0usize, n - 1)];
        while let Some((start, finish)) = stack.pop() {
            if finish - start <= 1 || !self.checker.segment_collides(points[start], points[finish]) {
                out.push(points[finish]);
            } else {
                let mid = (start + finish) / 2;
                stack.push((mid, finish));
                stack.push((start, mid));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Polygon;
    use crate::path_planning::collision::CollisionConfig;
    use itertools::Itertools;

    fn checker(obstacles: Vec<Polygon>) -> CollisionChecker {
        CollisionChecker::new(obstacles, CollisionConfig::default()).unwrap()
    }

    fn staircase() -> Path2D {
        Path2D::from_points(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.5, 0.3),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.5, 0.3),
            Point2D::new(2.0, 0.0),
            Point2D::new(2.5, 0.3),
            Point2D::new(3.0, 0.0),
        ])
    }

    #[test]
    fn test_free_space_collapses_to_single_edge() {
        let c = checker(vec![]);
        let smoothed = PathSmoother::with_defaults(&c).smooth(&staircase()).unwrap();
        assert_eq!(smoothed.points, vec![Point2D::new(0.0, 0.0), Point2D::new(3.0, 0.0)]);
    }

    #[test]
    fn test_keeps_endpoints_and_avoids_obstacle() {
        let c = checker(vec![Polygon::rectangle(1.0, -1.0, 2.0, 0.2)]);
        let path = Path2D::from_points(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.5, 0.5),
            Point2D::new(1.0, 0.6),
            Point2D::new(1.5, 0.6),
            Point2D::new(2.0, 0.6),
            Point2D::new(2.5, 0.5),
            Point2D::new(3.0, 0.0),
        ]);
        assert!(!c.polyline_collides(&path));

        let smoothed = PathSmoother::with_defaults(&c).smooth(&path).unwrap();
        assert_eq!(smoothed.first(), path.first());
        assert_eq!(smoothed.last(), path.last());
        assert!(smoothed.len() < path.len());
        assert!(smoothed.len() > 2);
        assert!(!c.polyline_collides(&smoothed));
        assert!(smoothed.total_length() <= path.total_length() + 1e-12);
    }

    #[test]
    fn test_output_is_subsequence_of_input() {
        let c = checker(vec![Polygon::rectangle(1.2, -0.5, 1.8, 0.05)]);
        let path = staircase();
        assert!(!c.polyline_collides(&path));
        let smoothed = PathSmoother::with_defaults(&c).smooth(&path).unwrap();
        let mut it = path.points.iter();
        assert!(smoothed.points.iter().all(|p| it.any(|q| q == p)));
        assert!(smoothed.points.iter().tuple_windows().all(|(a, b)| a != b));
    }

    #[test]
    fn test_short_inputs() {
        let c = checker(vec![]);
        let smoother = PathSmoother::with_defaults(&c);
        let two = Path2D::from_points(vec![Point2D::origin(), Point2D::new(1.0, 0.0)]);
        assert_eq!(smoother.smooth(&two).unwrap(), two);
        assert!(smoother.smooth(&Path2D::new()).is_err());
    }
}
