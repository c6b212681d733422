//! RRT (Rapidly-exploring Random Tree) over polygonal obstacles
//!
//! Default coarse planner: grows a tree of straight edges from the start
//! until a node can see the goal directly. Random samples come from the
//! border's bounding box and are rejected when they leave the border or fall
//! inside an obstacle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::common::{CoarsePlanner, Path2D, PlanningError, PlanningResult, Point2D, Polygon};
use crate::path_planning::collision::{CollisionChecker, CollisionConfig};

/// Internal node for RRT tree
#[derive(Debug, Clone)]
pub struct RrtNode {
    pub point: Point2D,
    pub parent: Option<usize>,
}

impl RrtNode {
    pub fn new(point: Point2D, parent: Option<usize>) -> Self {
        RrtNode { point, parent }
    }
}

/// Configuration for RRT planner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RrtConfig {
    /// Expansion distance per step
    pub expand_dis: f64,
    /// Goal sampling rate (0-100)
    pub goal_sample_rate: u32,
    /// Maximum iterations
    pub max_iter: usize,
    /// Seed of the sampler, so that runs are reproducible
    pub seed: u64,
}

impl Default for RrtConfig {
    fn default() -> Self {
        Self {
            expand_dis: 0.1,
            goal_sample_rate: 5,
            max_iter: 3000,
            seed: 42,
        }
    }
}

/// RRT path planner
#[derive(Debug, Clone, Default)]
pub struct PolygonRrtPlanner {
    config: RrtConfig,
}

impl PolygonRrtPlanner {
    pub fn new(config: RrtConfig) -> Self {
        PolygonRrtPlanner { config }
    }

    pub fn config(&self) -> &RrtConfig {
        &self.config
    }
}

/// Free space of one planning call
struct Workspace<'a> {
    border: &'a Polygon,
    obstacles: &'a [Polygon],
    checker: CollisionChecker,
}

impl<'a> Workspace<'a> {
    fn new(border: &'a Polygon, obstacles: &'a [Polygon]) -> PlanningResult<Self> {
        let mut regions = Vec::with_capacity(obstacles.len() + 1);
        regions.push(border.clone());
        regions.extend(obstacles.iter().cloned());
        let checker = CollisionChecker::new(regions, CollisionConfig::default())?;
        Ok(Workspace { border, obstacles, checker })
    }

    fn is_free(&self, p: Point2D) -> bool {
        self.border.contains(p) && !self.obstacles.iter().any(|o| o.contains(p))
    }

    fn is_visible(&self, a: Point2D, b: Point2D) -> bool {
        !self.checker.segment_collides(a, b)
    }
}

fn steer(from: Point2D, to: Point2D, extend_length: f64) -> Point2D {
    let d = from.distance(&to);
    if d <= extend_length {
        return to;
    }
    let theta = (to.y - from.y).atan2(to.x - from.x);
    Point2D::new(from.x + extend_length * theta.cos(), from.y + extend_length * theta.sin())
}

fn nearest_node_index(nodes: &[RrtNode], p: Point2D) -> usize {
    let mut min_dist = f64::INFINITY;
    let mut min_ind = 0;
    for (i, node) in nodes.iter().enumerate() {
        let dist = (node.point.x - p.x).powi(2) + (node.point.y - p.y).powi(2);
        if dist < min_dist {
            min_dist = dist;
            min_ind = i;
        }
    }
    min_ind
}

fn generate_final_course(nodes: &[RrtNode], last: usize, goal: Point2D) -> Path2D {
    let mut points = vec![goal];
    let mut node_index = Some(last);
    while let Some(index) = node_index {
        let node = &nodes[index];
        points.push(node.point);
        node_index = node.parent;
    }
    points.reverse();
    Path2D::from_points(points)
}

impl CoarsePlanner for PolygonRrtPlanner {
    fn plan(
        &self,
        border: &Polygon,
        obstacles: &[Polygon],
        start: Point2D,
        goal: Point2D,
    ) -> PlanningResult<Path2D> {
        if !(self.config.expand_dis > 0.0) {
            return Err(PlanningError::invalid(format!(
                "RRT expansion distance must be positive, got {}",
                self.config.expand_dis
            )));
        }
        let workspace = Workspace::new(border, obstacles)?;
        let bbox = border
            .bounding_box()
            .ok_or_else(|| PlanningError::invalid("arena border is empty"))?;

        for (name, p) in [("start", start), ("goal", goal)] {
            if !workspace.is_free(p) {
                return Err(PlanningError::NoCoarsePath(format!(
                    "{} ({:.3}, {:.3}) is outside the free space",
                    name, p.x, p.y
                )));
            }
        }
        if workspace.is_visible(start, goal) {
            return Ok(Path2D::from_points(vec![start, goal]));
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut nodes = vec![RrtNode::new(start, None)];

        for _ in 0..self.config.max_iter {
            let target = if rng.gen_range(0..100) < self.config.goal_sample_rate {
                goal
            } else {
                Point2D::new(rng.gen_range(bbox.xmin..=bbox.xmax), rng.gen_range(bbox.ymin..=bbox.ymax))
            };
            if !workspace.is_free(target) {
                continue;
            }

            let nearest_ind = nearest_node_index(&nodes, target);
            let nearest = nodes[nearest_ind].point;
            if nearest == target {
                continue;
            }
            let new_point = steer(nearest, target, self.config.expand_dis);
            if !workspace.is_free(new_point) || !workspace.is_visible(nearest, new_point) {
                continue;
            }

            nodes.push(RrtNode::new(new_point, Some(nearest_ind)));
            if workspace.is_visible(new_point, goal) {
                let path = generate_final_course(&nodes, nodes.len() - 1, goal);
                log::debug!("RRT reached the goal with {} nodes, {} waypoints", nodes.len(), path.len());
                return Ok(path);
            }
        }

        Err(PlanningError::NoCoarsePath(format!(
            "RRT: cannot find path within {} iterations",
            self.config.max_iter
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> (Polygon, Vec<Polygon>) {
        let border = Polygon::rectangle(0.0, 0.0, 3.0, 2.0);
        let wall = Polygon::rectangle(1.4, 0.0, 1.6, 1.6);
        (border, vec![wall])
    }

    #[test]
    fn test_rrt_finds_path_around_wall() {
        let (border, obstacles) = arena();
        let planner = PolygonRrtPlanner::new(RrtConfig { max_iter: 20_000, ..Default::default() });
        let start = Point2D::new(0.5, 0.5);
        let goal = Point2D::new(2.5, 0.5);

        let path = planner.plan(&border, &obstacles, start, goal).unwrap();
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert!(path.len() > 2);

        let mut regions = obstacles.clone();
        regions.push(border.clone());
        let checker = CollisionChecker::new(regions, CollisionConfig::default()).unwrap();
        assert!(!checker.polyline_collides(&path));
    }

    #[test]
    fn test_rrt_is_reproducible() {
        let (border, obstacles) = arena();
        let planner = PolygonRrtPlanner::new(RrtConfig { max_iter: 20_000, ..Default::default() });
        let a = planner.plan(&border, &obstacles, Point2D::new(0.5, 0.5), Point2D::new(2.5, 0.5));
        let b = planner.plan(&border, &obstacles, Point2D::new(0.5, 0.5), Point2D::new(2.5, 0.5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_direct_connection() {
        let (border, _) = arena();
        let path = PolygonRrtPlanner::default()
            .plan(&border, &[], Point2D::new(0.5, 0.5), Point2D::new(2.5, 1.5))
            .unwrap();
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_no_path_reported() {
        let border = Polygon::rectangle(0.0, 0.0, 3.0, 2.0);
        // wall spanning the whole arena height
        let wall = Polygon::rectangle(1.4, -0.5, 1.6, 2.5);
        let planner = PolygonRrtPlanner::new(RrtConfig { max_iter: 200, ..Default::default() });
        let result = planner.plan(&border, &[wall], Point2D::new(0.5, 0.5), Point2D::new(2.5, 0.5));
        assert!(matches!(result, Err(PlanningError::NoCoarsePath(_))));

        let inside = planner.plan(&border, &[], Point2D::new(-1.0, 0.5), Point2D::new(2.5, 0.5));
        assert!(matches!(inside, Err(PlanningError::NoCoarsePath(_))));
    }

    #[test]
    fn test_rrt_config_default() {
        let config = RrtConfig::default();
        assert_eq!(config.goal_sample_rate, 5);
        assert_eq!(config.max_iter, 3000);
    }
}
