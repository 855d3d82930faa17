//! A single ghost: position, mode state machine and per-step decisions.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use rand::Rng;
use tracing::{debug, trace};

use crate::agent::mode::{AgentState, Mode, Motion};
use crate::agent::schedule::{ModeSchedule, ScheduleClock};
use crate::agent::strategy::{Strategy, TargetInputs};
use crate::agent::{Context, Sighting};
use crate::constants::{frighten_duration, hold_duration, DEAD_COOLDOWN, STEP_DURATION};
use crate::error::{GameError, GameResult};
use crate::map::direction::Direction;
use crate::map::grid::{NavigationGrid, Traversal};
use crate::map::parser::GhostConfig;
use crate::map::point::Point;
use crate::pathing::{greedy_step, random_step, PlannedRoute};

/// Upper bound on cells crossed in one update when a tick spans several steps.
const MAX_STEPS_PER_UPDATE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fright {
    started_at: Duration,
    until: Duration,
}

/// Moves that must be made before any other decision, with the traversal each one uses.
type Pathway = VecDeque<(Direction, Traversal)>;

/// Moves from `from` to the door column, then through the door to the cell above it.
fn exit_sequence(grid: &NavigationGrid, from: Point) -> Pathway {
    let door = grid.door();
    let exit = grid.chamber_exit();
    let mut moves = Pathway::new();

    let horizontal = if from.col < door.col { Direction::Right } else { Direction::Left };
    for _ in 0..(door.col - from.col).abs() {
        moves.push_back((horizontal, Traversal::Homebound));
    }
    let vertical = if exit.row < from.row { Direction::Up } else { Direction::Down };
    for _ in 0..(from.row - exit.row).abs() {
        moves.push_back((vertical, Traversal::Homebound));
    }
    moves
}

#[derive(Debug, Clone)]
pub struct Ghost {
    id: u8,
    strategy: Strategy,
    home: Point,
    speed_factor: f64,
    seek_chance: f64,
    level: u32,

    spawn: Point,
    /// Whether the spawn is sealed inside the chamber.
    indoor: bool,
    /// Position in the chamber release queue; scales the hold time.
    release_order: u32,

    position: Point,
    facing: Direction,
    state: AgentState,
    schedule: ModeSchedule,
    clock: ScheduleClock,
    fright: Option<Fright>,
    dead_since: Duration,
    /// When a held ghost may start walking out.
    release_at: Option<Duration>,
    pathway: Pathway,
    route: PlannedRoute,
    /// (cell, facing) pairs already left while Dying; a repeat means greedy steering is circling.
    homebound_seen: HashSet<(Point, Direction)>,
}

impl Ghost {
    pub fn new(id: u8, config: &GhostConfig, spawn: Point, release_order: u32, ctx: &Context) -> Self {
        let indoor = !ctx
            .grid
            .reachable_from(ctx.grid.player_spawn(), Traversal::Ghost)
            .contains(&spawn);

        let mut ghost = Self {
            id,
            strategy: config.strategy,
            home: config.home,
            speed_factor: config.speed_factor,
            seek_chance: config.seek_chance.clamp(0.0, 1.0),
            level: ctx.level,
            spawn,
            indoor,
            release_order,
            position: spawn,
            facing: Direction::Up,
            state: AgentState::default(),
            schedule: ModeSchedule::for_level(ctx.level),
            clock: ScheduleClock::starting_at(ctx.now),
            fright: None,
            dead_since: Duration::ZERO,
            release_at: None,
            pathway: Pathway::new(),
            route: PlannedRoute::default(),
            homebound_seen: HashSet::new(),
        };
        ghost.reset_to_spawn(ctx.now);
        ghost
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn home(&self) -> Point {
        self.home
    }

    pub fn spawn(&self) -> Point {
        self.spawn
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn motion(&self) -> Motion {
        self.state.motion
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// The cell the ghost occupies, or is entering while animating.
    pub fn position(&self) -> Point {
        self.position
    }

    /// The cell the ghost is leaving, if it is mid-step.
    pub fn previous_position(&self) -> Option<Point> {
        match self.state.motion {
            Motion::Animating { from, .. } => Some(from),
            Motion::Idle => None,
        }
    }

    /// Whether the ghost is still waiting inside the chamber.
    pub fn is_held(&self) -> bool {
        self.release_at.is_some()
    }

    pub fn route(&self) -> &PlannedRoute {
        &self.route
    }

    /// Time to cross one cell in the current mode.
    pub fn step_duration(&self) -> Duration {
        let base = Duration::from_nanos((STEP_DURATION.as_nanos() as f64 / self.speed_factor).round() as u64);
        match self.state.mode {
            Mode::Frighten => base * 2,
            Mode::Dying => base / 2,
            _ => base,
        }
    }

    pub fn render_progress(&self, now: Duration) -> f32 {
        self.state.motion.progress(now, self.step_duration())
    }

    /// The cell the ghost steers toward in its current mode. May lie off the grid or in a wall.
    pub fn target(&self, grid: &NavigationGrid, sighting: &Sighting) -> Point {
        match self.state.mode {
            Mode::Scatter => self.home,
            Mode::Chase => self.strategy.chase_target(&TargetInputs {
                own: self.position,
                home: self.home,
                player: sighting.player,
                player_facing: sighting.player_facing,
                pursuer: sighting.pursuer,
            }),
            Mode::Frighten => self.position,
            Mode::Dying | Mode::Dead => grid.recovery_cell(),
        }
    }

    /// Makes the ghost vulnerable. Re-frightening extends the current fright.
    ///
    /// Returns whether the ghost is frightened afterwards.
    pub fn frighten(&mut self, now: Duration) -> bool {
        let until = now + frighten_duration(self.level);
        match self.state.mode {
            Mode::Scatter | Mode::Chase => {
                self.fright = Some(Fright { started_at: now, until });
                self.state.mode = Mode::Frighten;
                self.route.clear();
                debug!(ghost = self.id, ?until, "Ghost frightened");
                true
            }
            Mode::Frighten => {
                if let Some(fright) = self.fright.as_mut() {
                    fright.until = fright.until.max(until);
                }
                true
            }
            Mode::Dying | Mode::Dead => false,
        }
    }

    /// The player caught this ghost. Only a frightened ghost can be caught.
    pub fn caught(&mut self, now: Duration) -> GameResult<()> {
        if self.state.mode != Mode::Frighten {
            return Err(GameError::InvalidState(format!(
                "ghost {} cannot be caught while in {} mode",
                self.id,
                self.state.mode.as_ref()
            )));
        }
        self.fright = None;
        self.state.mode = Mode::Dying;
        self.route.clear();
        self.pathway.clear();
        self.homebound_seen.clear();
        self.release_at = None;
        debug!(ghost = self.id, ?now, position = %self.position, "Ghost caught");
        Ok(())
    }

    /// Back to the spawn cell in Scatter, with the schedule and the hold timer restarted.
    pub fn reset_to_spawn(&mut self, now: Duration) {
        self.position = self.spawn;
        self.facing = Direction::Up;
        self.state = AgentState::default();
        self.clock = ScheduleClock::starting_at(now);
        self.fright = None;
        self.pathway.clear();
        self.route.clear();
        self.homebound_seen.clear();
        self.release_at = self
            .indoor
            .then(|| now + hold_duration(self.level) * self.release_order);
    }

    /// Moves every stored timestamp forward, used when the game resumes from a pause.
    pub fn shift_timestamps(&mut self, by: Duration) {
        self.state.motion = self.state.motion.shifted(by);
        self.clock.started_at += by;
        if let Some(fright) = self.fright.as_mut() {
            fright.started_at += by;
            fright.until += by;
        }
        self.dead_since += by;
        if let Some(release_at) = self.release_at.as_mut() {
            *release_at += by;
        }
    }

    /// Advances timers, finishes the step in progress and picks the next move.
    pub fn update<R: Rng + ?Sized>(&mut self, ctx: &Context, sighting: &Sighting, rng: &mut R) {
        let now = ctx.now;
        self.advance_timers(ctx.grid, now);

        let mut start = now;
        for _ in 0..MAX_STEPS_PER_UPDATE {
            if let Motion::Animating { to, started_at, .. } = self.state.motion {
                let arrival = started_at + self.step_duration();
                if arrival > now {
                    return;
                }
                self.state.motion = Motion::Idle;
                start = arrival;
                self.arrive(ctx.grid, to, arrival);
            }

            let Some((direction, next)) = self.decide(ctx, sighting, rng) else {
                return;
            };
            self.state.motion = Motion::Animating {
                from: self.position,
                to: next,
                started_at: start,
            };
            self.position = next;
            self.facing = direction;
        }
    }

    fn arrive(&mut self, grid: &NavigationGrid, cell: Point, at: Duration) {
        if self.state.mode == Mode::Dying && cell == grid.recovery_cell() {
            self.state.mode = Mode::Dead;
            self.dead_since = at;
            debug!(ghost = self.id, cell = %cell, "Ghost reached the chamber");
        }
    }

    fn advance_timers(&mut self, grid: &NavigationGrid, now: Duration) {
        match self.state.mode {
            Mode::Frighten => {
                if let Some(fright) = self.fright.filter(|f| now >= f.until) {
                    self.clock.started_at += fright.until - fright.started_at;
                    self.fright = None;
                    self.state.mode = self.schedule.mode_at(self.clock.index);
                    self.route.clear();
                    debug!(ghost = self.id, mode = self.state.mode.as_ref(), "Fright wore off");
                }
            }
            Mode::Dead => {
                if now >= self.dead_since + DEAD_COOLDOWN {
                    self.state.mode = Mode::Scatter;
                    self.clock = ScheduleClock::starting_at(now);
                    self.route.clear();
                    self.pathway = exit_sequence(grid, self.position);
                    debug!(ghost = self.id, "Ghost revived");
                }
            }
            Mode::Scatter | Mode::Chase | Mode::Dying => {}
        }

        if self.state.mode.is_hostile() {
            let before = self.state.mode;
            self.clock.advance(&self.schedule, now);
            let after = self.schedule.mode_at(self.clock.index);
            if after != before {
                self.state.mode = after;
                self.route.clear();
                if self.release_at.is_none() {
                    self.pathway.push_back((self.facing.opposite(), Traversal::Ghost));
                }
                debug!(ghost = self.id, from = before.as_ref(), to = after.as_ref(), "Mode switch");
            }
        }
    }

    /// Picks the next move and the cell it leads to, if the ghost should move at all.
    fn decide<R: Rng + ?Sized>(&mut self, ctx: &Context, sighting: &Sighting, rng: &mut R) -> Option<(Direction, Point)> {
        let grid = ctx.grid;

        if let Some(release_at) = self.release_at {
            if ctx.now < release_at {
                return None;
            }
            self.release_at = None;
            self.pathway = exit_sequence(grid, self.position);
            debug!(ghost = self.id, moves = self.pathway.len(), "Ghost released");
        }

        while let Some((direction, traversal)) = self.pathway.pop_front() {
            let next = grid
                .step(self.position, direction)
                .filter(|&n| grid.is_traversable(n, traversal));
            match next {
                Some(next) => return Some((direction, next)),
                None => trace!(ghost = self.id, ?direction, "Dropped blocked forced move"),
            }
        }

        let came_from = Some(self.facing.opposite());
        let (direction, traversal) = match self.state.mode {
            Mode::Dead => return None,
            Mode::Dying => {
                let recovery = grid.recovery_cell();
                if self.position == recovery {
                    self.arrive(grid, recovery, ctx.now);
                    return None;
                }
                (self.homebound_step(grid, recovery)?, Traversal::Homebound)
            }
            Mode::Frighten => (
                random_step(grid, self.position, came_from, Traversal::Ghost, rng)?,
                Traversal::Ghost,
            ),
            Mode::Scatter | Mode::Chase => (self.pursue(grid, sighting, rng)?, Traversal::Ghost),
        };

        grid.step(self.position, direction)
            .filter(|&n| grid.is_traversable(n, traversal))
            .map(|next| (direction, next))
    }

    /// Greedy steering toward the recovery cell until the ghost leaves a cell the same
    /// way twice, then a shortest route for the rest of the way.
    fn homebound_step(&mut self, grid: &NavigationGrid, recovery: Point) -> Option<Direction> {
        if self.route.steps.is_empty() && !self.homebound_seen.insert((self.position, self.facing)) {
            match PlannedRoute::plan(grid, self.position, recovery, Traversal::Homebound) {
                Ok(route) => {
                    debug!(ghost = self.id, cell = %self.position, moves = route.steps.len(), "Greedy return looped, routing home");
                    self.route = route;
                }
                Err(error) => trace!(ghost = self.id, %error, "No route to the chamber"),
            }
        }
        if let Some(direction) = self.route.next_step() {
            return Some(direction);
        }
        greedy_step(grid, self.position, Some(self.facing.opposite()), recovery, Traversal::Homebound)
    }

    /// Scatter and Chase steering: a planned route with probability `seek_chance`,
    /// otherwise a greedy step toward the target.
    fn pursue<R: Rng + ?Sized>(&mut self, grid: &NavigationGrid, sighting: &Sighting, rng: &mut R) -> Option<Direction> {
        let came_from = Some(self.facing.opposite());
        let raw_target = self.target(grid, sighting);
        let Some(goal) = grid.nearest_open(raw_target, Traversal::Ghost) else {
            return random_step(grid, self.position, came_from, Traversal::Ghost, rng);
        };

        if !rng.random_bool(self.seek_chance) {
            self.route.clear();
            return greedy_step(grid, self.position, came_from, goal, Traversal::Ghost)
                .or_else(|| random_step(grid, self.position, came_from, Traversal::Ghost, rng));
        }

        if self.route.is_stale(goal, self.position) {
            match PlannedRoute::plan(grid, self.position, goal, Traversal::Ghost) {
                Ok(route) => self.route = route,
                Err(error) => {
                    trace!(ghost = self.id, %error, "Route planning failed, stepping at random");
                    self.route.clear();
                    return random_step(grid, self.position, came_from, Traversal::Ghost, rng);
                }
            }
        }

        match self.route.next_step() {
            Some(direction) if grid.can_move(self.position, direction, Traversal::Ghost) => Some(direction),
            _ => {
                self.route.clear();
                greedy_step(grid, self.position, came_from, goal, Traversal::Ghost)
            }
        }
    }
}
