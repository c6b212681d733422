//! Mission planning session
//!
//! Turns an arena description into a sampled trajectory:
//! clearance offsets, gate slot, coarse legs between the stops, smoothing,
//! multi-point Dubins stitching and discretization. The session object owns
//! the collaborators and the last plan it produced.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::common::{
    CoarsePlanner, NoopObserver, Path2D, PlanningError, PlanningObserver, PlanningResult, Point2D,
    Polygon, PolygonOffsetter, Pose2D, Trajectory,
};
use crate::geometry::{carve_gate_slot, gate_approach, ClipperOffsetter};
use crate::mission_planning::victim_selector::{RouteOracle, SelectorConfig, Victim, VictimSelector};
use crate::path_planning::collision::{CollisionChecker, CollisionConfig};
use crate::path_planning::dubins::{discretize_curves, Curve};
use crate::path_planning::multipoint::{MultipointConfig, MultipointPlan, MultipointPlanner};
use crate::path_planning::rrt::{PolygonRrtPlanner, RrtConfig};
use crate::path_planning::smoothing::{PathSmoother, SmoothingConfig};

/// Which victims the mission visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionKind {
    /// Every victim, in ascending id order
    VisitAll,
    /// The subset chosen by the greedy victim selector
    MaximizeBonus,
}

/// Configuration of a whole mission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    /// Clearance added around obstacles and removed from the border (m)
    pub robot_radius: f64,
    /// Arclength step of the output trajectory (m)
    pub discretization_step: f64,
    pub mission_kind: MissionKind,
    pub multipoint: MultipointConfig,
    pub smoothing: SmoothingConfig,
    pub collision: CollisionConfig,
    pub rrt: RrtConfig,
    pub selector: SelectorConfig,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            robot_radius: 0.05,
            discretization_step: 0.01,
            mission_kind: MissionKind::VisitAll,
            multipoint: MultipointConfig::default(),
            smoothing: SmoothingConfig::default(),
            collision: CollisionConfig::default(),
            rrt: RrtConfig::default(),
            selector: SelectorConfig::default(),
        }
    }
}

/// Arena as seen by perception
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionInput {
    pub border: Polygon,
    pub obstacles: Vec<Polygon>,
    pub victims: Vec<Victim>,
    pub gate: Polygon,
    pub robot: Pose2D,
}

/// Planned mission
#[derive(Debug, Clone, PartialEq)]
pub struct MissionPlan {
    /// Smoothed waypoints the curves pass through
    pub waypoints: Vec<Point2D>,
    pub curves: Vec<Curve>,
    pub trajectory: Trajectory,
    /// Visited victim ids in visiting order
    pub visited: Vec<u32>,
    pub total_length: f64,
    /// `bonus * visited - travel time`
    pub score: f64,
}

/// Smoothed waypoints and the curves through them
#[derive(Debug, Clone)]
struct Route {
    waypoints: Vec<Point2D>,
    plan: MultipointPlan,
}

/// Plans the route start -> via-points -> gate
struct RoutePlanner<'a> {
    coarse: &'a dyn CoarsePlanner,
    border: &'a Polygon,
    obstacles: &'a [Polygon],
    checker: &'a CollisionChecker,
    smoothing: &'a SmoothingConfig,
    multipoint: &'a MultipointConfig,
    observer: &'a dyn PlanningObserver,
    start: Pose2D,
    goal: Pose2D,
}

impl<'a> RoutePlanner<'a> {
    fn leg(&self, from: Point2D, to: Point2D) -> PlanningResult<Path2D> {
        let coarse = self.coarse.plan(self.border, self.obstacles, from, to)?;
        if coarse.first() != Some(&from) || coarse.last() != Some(&to) {
            return Err(PlanningError::CollaboratorContract(format!(
                "coarse path from ({:.3}, {:.3}) to ({:.3}, {:.3}) has wrong endpoints",
                from.x, from.y, to.x, to.y
            )));
        }
        if self.checker.polyline_collides(&coarse) {
            return Err(PlanningError::CollaboratorContract(format!(
                "coarse path from ({:.3}, {:.3}) to ({:.3}, {:.3}) collides",
                from.x, from.y, to.x, to.y
            )));
        }
        PathSmoother::new(self.checker, self.smoothing.clone()).smooth(&coarse)
    }
}

impl<'a> RouteOracle for RoutePlanner<'a> {
    type Route = Route;

    fn plan_route(&self, via_points: &[Point2D]) -> PlanningResult<Route> {
        let stops: Vec<Point2D> = std::iter::once(self.start.position())
            .chain(via_points.iter().copied())
            .chain(std::iter::once(self.goal.position()))
            .dedup()
            .collect();
        if stops.len() < 2 {
            return Err(PlanningError::invalid("robot already stands on the gate"));
        }

        let mut waypoints = vec![stops[0]];
        for (from, to) in stops.iter().tuple_windows() {
            let leg = self.leg(*from, *to)?;
            // the junction is already the last stored point
            waypoints.extend(leg.points.into_iter().skip(1));
        }
        let waypoints: Vec<Point2D> = waypoints.into_iter().dedup().collect();

        let plan = MultipointPlanner::new(self.checker, self.multipoint.clone())
            .with_observer(self.observer)
            .plan(&waypoints, self.start.yaw, self.goal.yaw)?;
        Ok(Route { waypoints, plan })
    }

    fn route_length(route: &Route) -> f64 {
        route.plan.total_length
    }
}

/// Planning session: configuration, collaborators and the memoized plan
pub struct PlanningSession {
    config: MissionConfig,
    coarse: Box<dyn CoarsePlanner>,
    offsetter: Box<dyn PolygonOffsetter>,
    observer: Box<dyn PlanningObserver>,
    cached: Option<MissionPlan>,
}

impl PlanningSession {
    /// Session with the RRT coarse planner and the clipper2 offsetter
    pub fn new(config: MissionConfig) -> Self {
        let coarse = PolygonRrtPlanner::new(config.rrt.clone());
        Self::with_collaborators(config, Box::new(coarse), Box::new(ClipperOffsetter::new()))
    }

    pub fn with_collaborators(
        config: MissionConfig,
        coarse: Box<dyn CoarsePlanner>,
        offsetter: Box<dyn PolygonOffsetter>,
    ) -> Self {
        PlanningSession {
            config,
            coarse,
            offsetter,
            observer: Box::new(NoopObserver),
            cached: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn PlanningObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    /// Last successful plan, if any
    pub fn cached(&self) -> Option<&MissionPlan> {
        self.cached.as_ref()
    }

    pub fn clear_cache(&mut self) {
        self.cached = None;
    }

    /// Memoized plan when present, a fresh one otherwise
    pub fn plan_or_reuse(&mut self, input: &MissionInput) -> PlanningResult<&MissionPlan> {
        if self.cached.is_none() {
            self.plan(input)?;
        }
        self.cached
            .as_ref()
            .ok_or_else(|| PlanningError::PlanningExhausted("no cached plan".to_string()))
    }

    /// Always replans; on failure the previous plan is dropped as well
    pub fn plan(&mut self, input: &MissionInput) -> PlanningResult<&MissionPlan> {
        self.cached = None;
        let plan = self.compute(input)?;
        log::info!(
            "mission planned: {} victims, {} curves, length {:.3}, score {:.3}",
            plan.visited.len(),
            plan.curves.len(),
            plan.total_length,
            plan.score
        );
        Ok(self.cached.get_or_insert(plan))
    }

    fn compute(&self, input: &MissionInput) -> PlanningResult<MissionPlan> {
        self.validate(input)?;
        let radius = self.config.robot_radius;

        let obstacles = self.offsetter.offset_all(&input.obstacles, radius)?;
        let border = self.offsetter.offset(&input.border, -radius)?;
        if let Some(bad) = obstacles.iter().chain(std::iter::once(&border)).find(|p| !p.is_valid()) {
            return Err(PlanningError::CollaboratorContract(format!(
                "offset produced a polygon with {} vertices",
                bad.len()
            )));
        }

        let approach = gate_approach(&input.border, &input.gate)?;
        let border = carve_gate_slot(&border, &input.gate, radius, self.offsetter.as_ref())?;
        let mut regions = obstacles.clone();
        regions.push(border.clone());
        let checker = CollisionChecker::new(regions, self.config.collision.clone())?;

        let oracle = RoutePlanner {
            coarse: self.coarse.as_ref(),
            border: &border,
            obstacles: &obstacles,
            checker: &checker,
            smoothing: &self.config.smoothing,
            multipoint: &self.config.multipoint,
            observer: self.observer.as_ref(),
            start: input.robot,
            goal: Pose2D::from_point(approach.target, approach.heading),
        };

        let selector = VictimSelector::new(self.config.selector.clone()).with_observer(self.observer.as_ref());
        let (visited, route) = match self.config.mission_kind {
            MissionKind::VisitAll => {
                let mut victims: Vec<&Victim> = input.victims.iter().collect();
                victims.sort_by_key(|v| v.id);
                let via: Vec<Point2D> = victims.iter().map(|v| v.center()).collect();
                let route = oracle.plan_route(&via)?;
                (victims.iter().map(|v| v.id).collect::<Vec<_>>(), route)
            }
            MissionKind::MaximizeBonus => {
                let selection = selector.select(input.robot.position(), &input.victims, &oracle)?;
                (selection.visited, selection.route)
            }
        };

        let trajectory = discretize_curves(&route.plan.curves, self.config.discretization_step)?;
        let total_length = route.plan.total_length;
        Ok(MissionPlan {
            waypoints: route.waypoints,
            curves: route.plan.curves,
            trajectory,
            score: selector.score(visited.len(), total_length),
            visited,
            total_length,
        })
    }

    fn validate(&self, input: &MissionInput) -> PlanningResult<()> {
        let radius = self.config.robot_radius;
        if !(radius >= 0.0) || !radius.is_finite() {
            return Err(PlanningError::invalid(format!("robot radius must be non-negative, got {}", radius)));
        }
        let speed = self.config.selector.robot_speed;
        if !(speed > 0.0) || !speed.is_finite() {
            return Err(PlanningError::invalid(format!("robot speed must be positive, got {}", speed)));
        }
        let robot = input.robot;
        if !robot.x.is_finite() || !robot.y.is_finite() || !robot.yaw.is_finite() {
            return Err(PlanningError::invalid("robot pose must be finite"));
        }
        if let Some(i) = input.obstacles.iter().position(|o| !o.is_valid()) {
            return Err(PlanningError::invalid(format!(
                "obstacle {} needs at least 3 finite vertices",
                i
            )));
        }
        let mut ids: Vec<u32> = input.victims.iter().map(|v| v.id).collect();
        ids.sort_unstable();
        if let Some((a, _)) = ids.iter().tuple_windows().find(|(a, b)| a == b) {
            return Err(PlanningError::invalid(format!("duplicate victim id {}", a)));
        }
        Ok(())
    }
}
