//! Multi-point Dubins planning
//!
//! Stitches one Dubins curve per consecutive waypoint pair. Headings at the
//! first and last waypoint are fixed; interior headings are chosen from
//! `num_angles` evenly spaced candidates by a recursive exhaustive search
//! that works inward from both ends:
//!
//! - one segment: a single boundary-value problem
//! - two segments: every candidate for the middle heading
//! - three or more: every pair of candidates for the two headings next to the
//!   ends, recursing on the interior with those headings fixed
//!
//! When no collision-free combination exists the search is repeated with a
//! wider candidate set, up to a retry limit.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::common::{NoopObserver, PlanningError, PlanningObserver, PlanningResult, Point2D, Pose2D};
use crate::geometry::{mod2pi, range_symm};
use crate::path_planning::collision::CollisionChecker;
use crate::path_planning::dubins::{shortest_path, Curve};

/// Configuration for the multi-point planner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipointConfig {
    /// Curvature bound (inverse of the minimum turning radius)
    pub max_curvature: f64,
    /// Candidate headings per free waypoint on the first attempt
    pub num_angles: usize,
    /// Candidates added on every retry
    pub angle_increment: usize,
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Rotate the candidate set so that its first heading is the mean of the
    /// boundary headings
    pub heuristic_offset: bool,
    /// Dubins evaluations allowed per `plan` call, retries included
    pub max_evaluations: usize,
}

impl Default for MultipointConfig {
    fn default() -> Self {
        Self {
            max_curvature: 10.0,
            num_angles: 4,
            angle_increment: 4,
            max_retries: 3,
            heuristic_offset: true,
            max_evaluations: 2_000_000,
        }
    }
}

/// Collision-free curve chain through every waypoint
#[derive(Debug, Clone, PartialEq)]
pub struct MultipointPlan {
    /// `curves[i]` joins waypoint `i` to waypoint `i + 1`
    pub curves: Vec<Curve>,
    pub total_length: f64,
    /// Candidate count of the attempt that succeeded
    pub num_angles: usize,
    /// Dubins evaluations spent, failed attempts included
    pub evaluations: usize,
}

/// Multi-point Dubins planner
pub struct MultipointPlanner<'a> {
    checker: &'a CollisionChecker,
    config: MultipointConfig,
    observer: &'a dyn PlanningObserver,
}

impl<'a> MultipointPlanner<'a> {
    pub fn new(checker: &'a CollisionChecker, config: MultipointConfig) -> Self {
        Self { checker, config, observer: &NoopObserver }
    }

    pub fn with_observer(mut self, observer: &'a dyn PlanningObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &MultipointConfig {
        &self.config
    }

    /// Plan through `waypoints`, leaving the first with `start_heading` and
    /// reaching the last with `end_heading`
    pub fn plan(
        &self,
        waypoints: &[Point2D],
        start_heading: f64,
        end_heading: f64,
    ) -> PlanningResult<MultipointPlan> {
        self.validate(waypoints, start_heading, end_heading)?;
        let last = waypoints.len() - 1;

        let mut search = Search {
            checker: self.checker,
            observer: self.observer,
            waypoints,
            kmax: self.config.max_curvature,
            heuristic_offset: self.config.heuristic_offset,
            num_angles: self.config.num_angles,
            evaluations: 0,
            max_evaluations: self.config.max_evaluations,
        };

        // a single segment has no free heading, so a wider candidate set cannot help
        let retries = if last == 1 { 0 } else { self.config.max_retries };
        for attempt in 0..=retries {
            search.num_angles = self.config.num_angles + attempt * self.config.angle_increment;
            if attempt > 0 {
                log::debug!(
                    "retrying {} waypoints with {} candidate headings",
                    waypoints.len(),
                    search.num_angles
                );
            }
            match search.solve(0, last, start_heading, end_heading) {
                Ok(Some(chain)) => {
                    log::debug!(
                        "planned {} curves, length {:.4}, {} evaluations",
                        chain.curves.len(),
                        chain.length,
                        search.evaluations
                    );
                    return Ok(MultipointPlan {
                        curves: chain.curves,
                        total_length: chain.length,
                        num_angles: search.num_angles,
                        evaluations: search.evaluations,
                    });
                }
                Ok(None) => continue,
                Err(BudgetExceeded) => {
                    return Err(PlanningError::PlanningExhausted(format!(
                        "evaluation budget of {} spent with {} candidate headings",
                        self.config.max_evaluations, search.num_angles
                    )));
                }
            }
        }

        Err(PlanningError::PlanningExhausted(format!(
            "no collision-free heading combination for {} waypoints with up to {} candidate headings",
            waypoints.len(),
            search.num_angles
        )))
    }

    fn validate(&self, waypoints: &[Point2D], start_heading: f64, end_heading: f64) -> PlanningResult<()> {
        if waypoints.len() < 2 {
            return Err(PlanningError::invalid(format!(
                "need at least 2 waypoints, got {}",
                waypoints.len()
            )));
        }
        if !(self.config.max_curvature > 0.0) || !self.config.max_curvature.is_finite() {
            return Err(PlanningError::invalid(format!(
                "curvature bound must be positive, got {}",
                self.config.max_curvature
            )));
        }
        if self.config.num_angles == 0 {
            return Err(PlanningError::invalid("need at least one candidate heading"));
        }
        if !start_heading.is_finite() || !end_heading.is_finite() {
            return Err(PlanningError::invalid("boundary headings must be finite"));
        }
        if let Some(i) = waypoints.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(PlanningError::invalid(format!("waypoint {} is not finite", i)));
        }
        if let Some(i) = waypoints.windows(2).position(|w| w[0] == w[1]) {
            return Err(PlanningError::invalid(format!("waypoints {} and {} coincide", i, i + 1)));
        }
        Ok(())
    }
}

/// The evaluation budget ran out
struct BudgetExceeded;

/// Best curve chain over a waypoint range
struct Chain {
    curves: Vec<Curve>,
    length: f64,
}

struct Search<'s> {
    checker: &'s CollisionChecker,
    observer: &'s dyn PlanningObserver,
    waypoints: &'s [Point2D],
    kmax: f64,
    heuristic_offset: bool,
    num_angles: usize,
    evaluations: usize,
    max_evaluations: usize,
}

impl<'s> Search<'s> {
    fn solve(
        &mut self,
        start_idx: usize,
        arrive_idx: usize,
        start_angle: f64,
        arrive_angle: f64,
    ) -> Result<Option<Chain>, BudgetExceeded> {
        self.observer.on_recursion_entered(start_idx, arrive_idx, self.num_angles);
        let best = match arrive_idx - start_idx {
            1 => self.solve_single(start_idx, start_angle, arrive_angle)?,
            2 => self.solve_double(start_idx, start_angle, arrive_angle)?,
            _ => self.solve_many(start_idx, arrive_idx, start_angle, arrive_angle)?,
        };
        self.observer
            .on_recursion_returned(start_idx, arrive_idx, best.as_ref().map(|c| c.length));
        Ok(best)
    }

    fn solve_single(&mut self, idx: usize, start_angle: f64, arrive_angle: f64) -> Result<Option<Chain>, BudgetExceeded> {
        let curve = self.connect(idx, start_angle, idx + 1, arrive_angle)?;
        self.observer.on_candidate_evaluated(idx, idx + 1, curve.map(|c| c.length()));
        Ok(curve.map(|c| {
            self.observer.on_candidate_accepted(idx, idx + 1, c.length());
            Chain { length: c.length(), curves: vec![c] }
        }))
    }

    fn solve_double(&mut self, start_idx: usize, start_angle: f64, arrive_angle: f64) -> Result<Option<Chain>, BudgetExceeded> {
        let mid = start_idx + 1;
        let arrive_idx = start_idx + 2;
        let mut best: Option<(f64, Curve, Curve)> = None;

        for angle in self.candidates(start_angle, arrive_angle) {
            let first = match self.connect(start_idx, start_angle, mid, angle)? {
                Some(c) => c,
                None => {
                    self.observer.on_candidate_evaluated(start_idx, arrive_idx, None);
                    continue;
                }
            };
            // the second curve cannot make up for an already longer first one
            if best.as_ref().map_or(false, |(len, _, _)| first.length() >= *len) {
                self.observer.on_candidate_pruned(start_idx, arrive_idx);
                continue;
            }
            let second = self.connect(mid, angle, arrive_idx, arrive_angle)?;
            let total = second.map(|c| first.length() + c.length());
            self.observer.on_candidate_evaluated(start_idx, arrive_idx, total);

            if let (Some(second), Some(total)) = (second, total) {
                if best.as_ref().map_or(true, |(len, _, _)| total < *len) {
                    self.observer.on_candidate_accepted(start_idx, arrive_idx, total);
                    best = Some((total, first, second));
                }
            }
        }

        Ok(best.map(|(length, a, b)| Chain { curves: vec![a, b], length }))
    }

    fn solve_many(
        &mut self,
        start_idx: usize,
        arrive_idx: usize,
        start_angle: f64,
        arrive_angle: f64,
    ) -> Result<Option<Chain>, BudgetExceeded> {
        let angles = self.candidates(start_angle, arrive_angle);

        // boundary curves depend on one free heading each
        let mut firsts = Vec::with_capacity(angles.len());
        let mut lasts = Vec::with_capacity(angles.len());
        for &angle in &angles {
            firsts.push(self.connect(start_idx, start_angle, start_idx + 1, angle)?);
            lasts.push(self.connect(arrive_idx - 1, angle, arrive_idx, arrive_angle)?);
        }

        let mut best: Option<(f64, Curve, Chain, Curve)> = None;
        for (i, &a1) in angles.iter().enumerate() {
            for (j, &a2) in angles.iter().enumerate() {
                let (first, last) = match (firsts[i], lasts[j]) {
                    (Some(f), Some(l)) => (f, l),
                    _ => {
                        self.observer.on_candidate_evaluated(start_idx, arrive_idx, None);
                        continue;
                    }
                };
                let boundary = first.length() + last.length();
                // the interior only adds length
                if best.as_ref().map_or(false, |(len, _, _, _)| boundary >= *len) {
                    self.observer.on_candidate_pruned(start_idx, arrive_idx);
                    continue;
                }

                let interior = self.solve(start_idx + 1, arrive_idx - 1, a1, a2)?;
                let total = interior.as_ref().map(|c| boundary + c.length);
                self.observer.on_candidate_evaluated(start_idx, arrive_idx, total);

                if let (Some(interior), Some(total)) = (interior, total) {
                    if best.as_ref().map_or(true, |(len, _, _, _)| total < *len) {
                        self.observer.on_candidate_accepted(start_idx, arrive_idx, total);
                        best = Some((total, first, interior, last));
                    }
                }
            }
        }

        Ok(best.map(|(length, first, interior, last)| {
            let mut curves = Vec::with_capacity(interior.curves.len() + 2);
            curves.push(first);
            curves.extend(interior.curves);
            curves.push(last);
            Chain { curves, length }
        }))
    }

    /// Evenly spaced candidate headings in `[0, 2π)`
    fn candidates(&self, start_angle: f64, arrive_angle: f64) -> Vec<f64> {
        let offset = if self.heuristic_offset {
            // circular mean, so that 350° and 10° average to 0°
            start_angle + 0.5 * range_symm(arrive_angle - start_angle)
        } else {
            0.0
        };
        let step = 2.0 * PI / self.num_angles as f64;
        (0..self.num_angles)
            .map(|i| mod2pi(offset + i as f64 * step))
            .collect()
    }

    /// Shortest collision-free curve between two waypoints, `None` when the
    /// curve is infeasible or collides
    fn connect(&mut self, from: usize, from_angle: f64, to: usize, to_angle: f64) -> Result<Option<Curve>, BudgetExceeded> {
        if self.evaluations >= self.max_evaluations {
            return Err(BudgetExceeded);
        }
        self.evaluations += 1;

        let p = self.waypoints[from];
        let q = self.waypoints[to];
        let curve = shortest_path(Pose2D::from_point(p, from_angle), Pose2D::from_point(q, to_angle), self.kmax)
        .ok()
        .map(|solution| solution.curve)
        .filter(|curve| !self.checker.curve_collides(curve));
        Ok(curve)
    }
}
