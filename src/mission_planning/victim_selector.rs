//! Greedy selection of the optional victims worth visiting
//!
//! Every victim grants a fixed time bonus. The selector grows the visited set
//! one victim at a time, always adding the victim whose route gives the best
//! score `bonus * |visited| - length / speed`, and stops when no addition
//! improves the score. This is a polynomial heuristic and may miss the
//! optimal subset.

use std::collections::{HashMap, HashSet};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::common::{NoopObserver, PlanningError, PlanningObserver, PlanningResult, Point2D, Polygon};

/// Optional waypoint carrying a time bonus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Victim {
    pub id: u32,
    pub polygon: Polygon,
}

impl Victim {
    pub fn new(id: u32, polygon: Polygon) -> Self {
        Victim { id, polygon }
    }

    /// Point the robot drives through
    pub fn center(&self) -> Point2D {
        self.polygon.barycenter()
    }
}

/// Configuration for the victim selector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Seconds gained per visited victim
    pub victim_bonus: f64,
    /// Robot speed used to turn route length into travel time (m/s)
    pub robot_speed: f64,
    /// Route evaluations allowed per selection
    pub max_evaluations: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            victim_bonus: 10.0,
            robot_speed: 0.2,
            max_evaluations: 200,
        }
    }
}

/// Cost oracle: plans the full route through the given via-points
pub trait RouteOracle {
    type Route: Clone;

    fn plan_route(&self, via_points: &[Point2D]) -> PlanningResult<Self::Route>;

    fn route_length(route: &Self::Route) -> f64;
}

/// Chosen victims, in visiting order, with their route
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<R> {
    pub visited: Vec<u32>,
    pub route: R,
    pub route_length: f64,
    pub score: f64,
}

/// Greedy victim selector
pub struct VictimSelector<'a> {
    config: SelectorConfig,
    observer: &'a dyn PlanningObserver,
}

impl<'a> VictimSelector<'a> {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config, observer: &NoopObserver }
    }

    pub fn with_observer(mut self, observer: &'a dyn PlanningObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Score of a route visiting `count` victims
    pub fn score(&self, count: usize, length: f64) -> f64 {
        self.config.victim_bonus * count as f64 - length / self.config.robot_speed
    }

    /// Greedy forward selection
    ///
    /// The route without victims must exist; its failure is returned as is.
    /// Candidates whose route is infeasible are skipped. Among equally
    /// scoring candidates the one listed first wins.
    pub fn select<O: RouteOracle>(
        &self,
        start: Point2D,
        victims: &[Victim],
        oracle: &O,
    ) -> PlanningResult<Selection<O::Route>> {
        self.validate(victims)?;

        let base = oracle.plan_route(&[])?;
        let base_length = O::route_length(&base);
        let mut current = Selection {
            visited: Vec::new(),
            route: base,
            route_length: base_length,
            score: self.score(0, base_length),
        };
        self.observer.on_selection_evaluated(&[], Some(current.score));

        let mut memo: HashMap<Vec<u32>, Option<(f64, O::Route)>> = HashMap::new();
        let mut evaluations = 1usize;
        let mut chosen: HashSet<u32> = HashSet::new();

        let mut exhausted = false;
        while !exhausted {
            let mut best: Option<Selection<O::Route>> = None;

            for victim in victims.iter().filter(|v| !chosen.contains(&v.id)) {
                let order = visiting_order(start, victims, &chosen, victim.id);
                let outcome = match memo.get(&order) {
                    Some(outcome) => outcome.clone(),
                    None => {
                        if evaluations >= self.config.max_evaluations {
                            log::warn!(
                                "victim selection stopped after {} route evaluations",
                                evaluations
                            );
                            exhausted = true;
                            break;
                        }
                        evaluations += 1;
                        let via: Vec<Point2D> = order
                            .iter()
                            .filter_map(|id| victims.iter().find(|v| v.id == *id))
                            .map(Victim::center)
                            .collect();
                        let outcome = match oracle.plan_route(&via) {
                            Ok(route) => Some((O::route_length(&route), route)),
                            Err(e) if e.is_planning_failure() => None,
                            Err(e) => return Err(e),
                        };
                        memo.insert(order.clone(), outcome.clone());
                        outcome
                    }
                };

                let candidate = outcome.map(|(length, route)| Selection {
                    score: self.score(order.len(), length),
                    visited: order.clone(),
                    route,
                    route_length: length,
                });
                self.observer
                    .on_selection_evaluated(&order, candidate.as_ref().map(|c| c.score));

                if let Some(candidate) = candidate {
                    let improves = candidate.score > current.score;
                    if improves && best.as_ref().map_or(true, |b| candidate.score > b.score) {
                        best = Some(candidate);
                    }
                }
            }

            match best {
                Some(next) => {
                    chosen = next.visited.iter().copied().collect();
                    self.observer.on_selection_committed(&next.visited, next.score);
                    current = next;
                }
                None => break,
            }
        }

        log::debug!(
            "selected victims {:?}, length {:.3}, score {:.3}",
            current.visited,
            current.route_length,
            current.score
        );
        Ok(current)
    }

    fn validate(&self, victims: &[Victim]) -> PlanningResult<()> {
        if !(self.config.robot_speed > 0.0) || !self.config.robot_speed.is_finite() {
            return Err(PlanningError::invalid(format!(
                "robot speed must be positive, got {}",
                self.config.robot_speed
            )));
        }
        if !self.config.victim_bonus.is_finite() {
            return Err(PlanningError::invalid("victim bonus must be finite"));
        }
        let mut seen = HashSet::new();
        for victim in victims {
            if !victim.polygon.is_valid() {
                return Err(PlanningError::invalid(format!(
                    "victim {} needs at least 3 finite vertices",
                    victim.id
                )));
            }
            if !seen.insert(victim.id) {
                return Err(PlanningError::invalid(format!("duplicate victim id {}", victim.id)));
            }
        }
        Ok(())
    }
}

/// Chosen ids plus `candidate`, sorted by straight-line distance from `start`
fn visiting_order(start: Point2D, victims: &[Victim], chosen: &HashSet<u32>, candidate: u32) -> Vec<u32> {
    let mut order: Vec<&Victim> = victims
        .iter()
        .filter(|v| v.id == candidate || chosen.contains(&v.id))
        .collect();
    order.sort_by_key(|v| (OrderedFloat(v.center().distance(&start)), v.id));
    order.into_iter().map(|v| v.id).collect()
}
