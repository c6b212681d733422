//! Constant-curvature arcs and three-arc Dubins curves

use crate::common::{Point2D, Pose2D};
use crate::geometry::circline;

/// One constant-curvature piece of a Dubins curve
///
/// The end pose is derived from the start pose, curvature and length at
/// construction and cannot be set independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    x0: f64,
    y0: f64,
    th0: f64,
    k: f64,
    length: f64,
    xf: f64,
    yf: f64,
    thf: f64,
}

impl Arc {
    /// `k > 0` turns left, `k < 0` turns right, `k == 0` is a straight segment
    pub fn new(x0: f64, y0: f64, th0: f64, k: f64, length: f64) -> Self {
        let (xf, yf, thf) = circline(length, x0, y0, th0, k);
        Arc { x0, y0, th0, k, length, xf, yf, thf }
    }

    pub fn from_pose(start: Pose2D, k: f64, length: f64) -> Self {
        Self::new(start.x, start.y, start.yaw, k, length)
    }

    pub fn start(&self) -> Pose2D {
        Pose2D::new(self.x0, self.y0, self.th0)
    }

    pub fn end(&self) -> Pose2D {
        Pose2D::new(self.xf, self.yf, self.thf)
    }

    pub fn start_point(&self) -> Point2D {
        Point2D::new(self.x0, self.y0)
    }

    pub fn end_point(&self) -> Point2D {
        Point2D::new(self.xf, self.yf)
    }

    pub fn curvature(&self) -> f64 {
        self.k
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn is_straight(&self) -> bool {
        self.k == 0.0
    }

    /// Pose after travelling `s` from the start of the arc
    pub fn pose_at(&self, s: f64) -> Pose2D {
        let (x, y, th) = circline(s, self.x0, self.y0, self.th0, self.k);
        Pose2D::new(x, y, th)
    }
}

/// Dubins maneuver made of three chained arcs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    arcs: [Arc; 3],
    length: f64,
}

impl Curve {
    /// Chain three arcs from `start`; each arc begins where the previous one ends
    pub fn new(start: Pose2D, lengths: [f64; 3], curvatures: [f64; 3]) -> Self {
        let a1 = Arc::from_pose(start, curvatures[0], lengths[0]);
        let a2 = Arc::from_pose(a1.end(), curvatures[1], lengths[1]);
        let a3 = Arc::from_pose(a2.end(), curvatures[2], lengths[2]);
        Curve {
            arcs: [a1, a2, a3],
            length: a1.length + a2.length + a3.length,
        }
    }

    pub fn arcs(&self) -> &[Arc; 3] {
        &self.arcs
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn start(&self) -> Pose2D {
        self.arcs[0].start()
    }

    pub fn end(&self) -> Pose2D {
        self.arcs[2].end()
    }
}
