//! Collision oracle between candidate paths and polygonal regions
//!
//! Obstacles and the arena border are handled uniformly: a path collides when
//! it crosses any polygon edge, the implicit closing edge included.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::common::{BoundingBox, Path2D, PlanningError, PlanningResult, Point2D, Polygon};
use crate::geometry::segments_intersect;
use crate::path_planning::dubins::{Arc, Curve, Discretizer};

/// Configuration for the collision oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionConfig {
    /// Arclength step used to approximate curved arcs by chords
    pub arc_step: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self { arc_step: 0.01 }
    }
}

/// Polygon with its cached bounding box
#[derive(Debug, Clone)]
struct Region {
    polygon: Polygon,
    bbox: BoundingBox,
}

/// Tests segments, arcs and curves against a fixed set of polygons
#[derive(Debug, Clone)]
pub struct CollisionChecker {
    regions: Vec<Region>,
    config: CollisionConfig,
}

impl CollisionChecker {
    pub fn new(obstacles: Vec<Polygon>, config: CollisionConfig) -> PlanningResult<Self> {
        if !(config.arc_step > 0.0) || !config.arc_step.is_finite() {
            return Err(PlanningError::invalid(format!(
                "collision arc step must be positive, got {}",
                config.arc_step
            )));
        }
        let regions = obstacles
            .into_iter()
            .enumerate()
            .map(|(i, polygon)| match polygon.bounding_box() {
                Some(bbox) if polygon.is_valid() => Ok(Region { polygon, bbox }),
                _ => Err(PlanningError::invalid(format!(
                    "obstacle {} needs at least 3 finite vertices, got {}",
                    i,
                    polygon.len()
                ))),
            })
            .collect::<PlanningResult<Vec<_>>>()?;
        Ok(CollisionChecker { regions, config })
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &Polygon> + '_ {
        self.regions.iter().map(|r| &r.polygon)
    }

    /// Whether segment `p1-p2` crosses any obstacle edge
    pub fn segment_collides(&self, p1: Point2D, p2: Point2D) -> bool {
        let bbox = segment_bbox(p1, p2);
        self.regions
            .iter()
            .filter(|r| r.bbox.overlaps(&bbox))
            .any(|r| r.polygon.edges().any(|(a, b)| segments_intersect(p1, p2, a, b)))
    }

    /// Whether any edge of `path` collides
    pub fn polyline_collides(&self, path: &Path2D) -> bool {
        path.points
            .iter()
            .tuple_windows()
            .any(|(a, b)| self.segment_collides(*a, *b))
    }

    /// Whether `arc` crosses segment `p1-p2`
    ///
    /// Straight arcs use the exact segment test; curved ones are replaced by
    /// chords sampled every `arc_step`.
    pub fn arc_collides_with_segment(&self, arc: &Arc, p1: Point2D, p2: Point2D) -> bool {
        if arc.is_straight() {
            return segments_intersect(arc.start_point(), arc.end_point(), p1, p2);
        }
        self.chords(arc)
            .iter()
            .tuple_windows()
            .any(|(a, b)| segments_intersect(*a, *b, p1, p2))
    }

    /// Whether `arc` crosses any edge of `polygon`
    pub fn arc_collides_with_polygon(&self, arc: &Arc, polygon: &Polygon) -> bool {
        let samples = self.arc_points(arc);
        polyline_hits_polygon(&samples, polygon)
    }

    /// Whether any of the three arcs of `curve` hits any obstacle
    pub fn curve_collides(&self, curve: &Curve) -> bool {
        curve.arcs().iter().any(|arc| {
            let samples = self.arc_points(arc);
            let bbox = match BoundingBox::of_points(&samples) {
                Some(bbox) => bbox,
                None => return false,
            };
            self.regions
                .iter()
                .filter(|r| r.bbox.overlaps(&bbox))
                .any(|r| polyline_hits_polygon(&samples, &r.polygon))
        })
    }

    fn arc_points(&self, arc: &Arc) -> Vec<Point2D> {
        if arc.is_straight() {
            vec![arc.start_point(), arc.end_point()]
        } else {
            self.chords(arc)
        }
    }

    fn chords(&self, arc: &Arc) -> Vec<Point2D> {
        let mut poses = Vec::new();
        Discretizer::with_step(self.config.arc_step).sample_arc(arc, true, &mut poses);
        poses.iter().map(|p| p.position()).collect()
    }
}

fn segment_bbox(p1: Point2D, p2: Point2D) -> BoundingBox {
    BoundingBox {
        xmin: p1.x.min(p2.x),
        xmax: p1.x.max(p2.x),
        ymin: p1.y.min(p2.y),
        ymax: p1.y.max(p2.y),
    }
}

fn polyline_hits_polygon(points: &[Point2D], polygon: &Polygon) -> bool {
    points.iter().tuple_windows().any(|(p, q)| {
        polygon
            .edges()
            .any(|(a, b)| segments_intersect(*p, *q, a, b))
    })
}
