//! Autonomous ghosts: the mode state machine, its schedule and target strategies.

use std::time::Duration;

use crate::map::direction::Direction;
use crate::map::grid::NavigationGrid;
use crate::map::point::Point;

pub mod ghost;
pub mod mode;
pub mod schedule;
pub mod strategy;

pub use ghost::Ghost;
pub use mode::{AgentState, Mode, Motion};
pub use schedule::{ModeSchedule, ScheduleClock};
pub use strategy::Strategy;

/// What an agent may read about the world while it updates.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub grid: &'a NavigationGrid,
    /// 1-based level number.
    pub level: u32,
    /// The caller's clock. Pauses are absorbed by shifting stored timestamps on resume.
    pub now: Duration,
}

/// Where the player and the level's pursuer are, as seen by a ghost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sighting {
    pub player: Point,
    pub player_facing: Direction,
    pub pursuer: Option<Point>,
}
