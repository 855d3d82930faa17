//! Resources and components shared by the gameplay systems.

use std::time::Duration;

use bevy_ecs::component::Component;
use bevy_ecs::entity::Entity;
use bevy_ecs::resource::Resource;
use rand::rngs::SmallRng;

use crate::agent::{Context, Ghost, Motion};
use crate::constants::{STARTING_LIVES, STEP_DURATION};
use crate::map::direction::Direction;
use crate::map::grid::NavigationGrid;
use crate::map::parser::LevelConfig;
use crate::map::point::Point;

/// The level being played. Ghosts only read the grid; the player consumes pickups from it.
#[derive(Resource, Debug, Clone)]
pub struct Level {
    pub grid: NavigationGrid,
    pub config: LevelConfig,
}

impl Level {
    pub fn context(&self, now: Duration) -> Context<'_> {
        Context {
            grid: &self.grid,
            level: self.config.level,
            now,
        }
    }
}

/// Game time, supplied by whoever drives [`Game::tick`](super::Game::tick).
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    pub now: Duration,
    pub paused_at: Option<Duration>,
    /// Number of ticks that ran the gameplay systems.
    pub ticks: u64,
}

impl GameClock {
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }
}

/// The only source of randomness during play, so a seed reproduces a whole game.
#[derive(Resource, Debug)]
pub struct GameRng(pub SmallRng);

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScoreResource(pub u32);

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerLives(pub u8);

impl Default for PlayerLives {
    fn default() -> Self {
        Self(STARTING_LIVES)
    }
}

/// A resource to track the overall stage of the game from a high-level perspective.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GameStage {
    /// The main gameplay loop is active.
    #[default]
    Playing,
    /// Every bean has been eaten.
    LevelCleared,
    /// The player ran out of lives.
    GameOver,
}

/// Ghost entities looked up by role, resolved once when the level is set up.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GhostRegistry {
    /// The first ghost with the Pursuer strategy; Whimsical ghosts aim relative to it.
    pub pursuer: Option<Entity>,
}

/// A ghost entity's agent.
#[derive(Component, Debug, Clone)]
pub struct GhostAgent(pub Ghost);

/// The player-controlled eater.
#[derive(Component, Debug, Clone)]
pub struct Player {
    pub spawn: Point,
    pub position: Point,
    pub facing: Direction,
    pub motion: Motion,
    /// Requested turn, kept until it becomes possible.
    pub intent: Option<Direction>,
    /// Wander at random when there is no usable intent.
    pub autopilot: bool,
}

impl Player {
    pub fn new(spawn: Point) -> Self {
        Self {
            spawn,
            position: spawn,
            facing: Direction::Left,
            motion: Motion::Idle,
            intent: None,
            autopilot: false,
        }
    }

    pub fn step_duration(&self) -> Duration {
        STEP_DURATION
    }

    /// The cell being left, if the player is mid-step.
    pub fn previous_position(&self) -> Option<Point> {
        match self.motion {
            Motion::Animating { from, .. } => Some(from),
            Motion::Idle => None,
        }
    }

    pub fn reset_to_spawn(&mut self) {
        self.position = self.spawn;
        self.facing = Direction::Left;
        self.motion = Motion::Idle;
        self.intent = None;
    }
}
