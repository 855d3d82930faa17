use std::collections::VecDeque;

use crate::constants::REPLAN_PROXIMITY_SQ;
use crate::error::PathError;
use crate::map::direction::Direction;
use crate::map::grid::{NavigationGrid, Traversal};
use crate::map::point::Point;
use crate::pathing::astar::shortest_path;

/// A route computed toward a target, consumed one move at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannedRoute {
    /// The target the route was planned for.
    pub target: Point,
    pub steps: VecDeque<Direction>,
}

impl PlannedRoute {
    pub fn plan(grid: &NavigationGrid, from: Point, target: Point, traversal: Traversal) -> Result<Self, PathError> {
        let steps = shortest_path(grid, from, target, traversal)?;
        Ok(Self {
            target,
            steps: steps.into(),
        })
    }

    /// Whether the route should be recomputed for `live_target`.
    ///
    /// A route is stale once it runs out, or when the target has moved and either
    /// left both the planned row and column or the agent is already close to the
    /// planned target.
    pub fn is_stale(&self, live_target: Point, agent: Point) -> bool {
        if self.steps.is_empty() {
            return true;
        }
        if live_target == self.target {
            return false;
        }
        let left_both_axes = live_target.row != self.target.row && live_target.col != self.target.col;
        left_both_axes || agent.distance_squared(self.target) < REPLAN_PROXIMITY_SQ
    }

    pub fn next_step(&mut self) -> Option<Direction> {
        self.steps.pop_front()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }
}
