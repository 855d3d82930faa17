//! This module contains the gameplay coordinator: an ECS world holding the level,
//! the player and the ghosts, and the schedule that advances them each tick.

use std::time::Duration;

use bevy_ecs::entity::Entity;
use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs, Schedule};
use bevy_ecs::world::World;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info, trace};

use crate::agent::{Ghost, Strategy};
use crate::error::{GameError, GameResult};
use crate::formatter;
use crate::map::direction::Direction;
use crate::map::grid::{NavigationGrid, Traversal};
use crate::map::parser::{GhostConfig, LevelData};

pub mod components;
pub mod systems;

use self::components::{
    GameClock, GameRng, GameStage, GhostAgent, GhostRegistry, Level, Player, PlayerLives, ScoreResource,
};
use self::systems::{collision_system, ghost_system, is_playing, is_running, player_system};

/// The `Game` struct is the main entry point for the game.
///
/// Time is supplied by the caller as a duration since the game started; see [`Game::tick`].
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
    player: Entity,
    ghosts: Vec<Entity>,
}

impl Game {
    /// Sets up a game on `level`. `seed` drives every random choice made during play.
    pub fn new(level: LevelData, seed: u64) -> Self {
        let mut world = World::default();
        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        Self::configure_schedule(&mut schedule);

        let LevelData { grid, config, .. } = level;
        let player = world.spawn(Player::new(grid.player_spawn())).id();

        world.insert_resource(Level { grid, config });
        world.insert_resource(GameClock::default());
        world.insert_resource(GameRng(SmallRng::seed_from_u64(seed)));
        world.insert_resource(ScoreResource::default());
        world.insert_resource(PlayerLives::default());
        world.insert_resource(GameStage::Playing);

        let ghosts = Self::spawn_ghosts(&mut world);
        info!(ghosts = ghosts.len(), seed, "Game initialized");

        Self {
            world,
            schedule,
            player,
            ghosts,
        }
    }

    fn configure_schedule(schedule: &mut Schedule) {
        schedule.add_systems(
            (player_system, ghost_system, collision_system)
                .chain()
                .distributive_run_if(is_playing)
                .distributive_run_if(is_running),
        );
    }

    /// Spawns one entity per ghost spawn cell and records the pursuer.
    ///
    /// Ghosts outside the chamber leave at once; chamber ghosts are released one
    /// after another in id order.
    fn spawn_ghosts(world: &mut World) -> Vec<Entity> {
        trace!("Spawning ghost entities");
        let ghosts: Vec<Ghost> = {
            let level = world.resource::<Level>();
            let grid = &level.grid;
            let ctx = level.context(Duration::ZERO);
            let outdoor = grid.reachable_from(grid.player_spawn(), Traversal::Ghost);
            let mut chamber_order = 0;
            grid.ghost_spawns()
                .iter()
                .map(|&(id, spawn)| {
                    let config = level
                        .config
                        .ghosts
                        .get(&id)
                        .cloned()
                        .unwrap_or_else(|| GhostConfig::default_for(id, grid.rows(), grid.cols()));
                    let release_order = if outdoor.contains(&spawn) {
                        0
                    } else {
                        chamber_order += 1;
                        chamber_order
                    };
                    Ghost::new(id, &config, spawn, release_order, &ctx)
                })
                .collect()
        };

        let mut registry = GhostRegistry::default();
        let mut entities = Vec::with_capacity(ghosts.len());
        for ghost in ghosts {
            let (id, strategy, spawn) = (ghost.id(), ghost.strategy(), ghost.spawn());
            let entity = world.spawn(GhostAgent(ghost)).id();
            if strategy == Strategy::Pursuer && registry.pursuer.is_none() {
                registry.pursuer = Some(entity);
            }
            trace!(ghost = id, strategy = strategy.as_ref(), %spawn, ?entity, "Spawned ghost entity");
            entities.push(entity);
        }
        world.insert_resource(registry);
        entities
    }

    /// Runs one tick at game time `now`. Does nothing while paused or once the game has ended.
    pub fn tick(&mut self, now: Duration) -> GameStage {
        {
            let mut clock = self.world.resource_mut::<GameClock>();
            clock.now = now;
            if !clock.is_paused() {
                clock.ticks += 1;
            }
        }
        formatter::increment_tick();
        self.schedule.run(&mut self.world);
        self.stage()
    }

    pub fn pause(&mut self, now: Duration) -> GameResult<()> {
        let mut clock = self.world.resource_mut::<GameClock>();
        if clock.is_paused() {
            return Err(GameError::InvalidState("game is already paused".to_string()));
        }
        clock.paused_at = Some(now);
        clock.now = now;
        debug!(?now, "Game paused");
        Ok(())
    }

    /// Ends a pause, moving every stored timestamp forward by its length so that
    /// no timer advanced while paused.
    pub fn resume(&mut self, now: Duration) -> GameResult<()> {
        let paused_at = self
            .world
            .resource::<GameClock>()
            .paused_at
            .ok_or_else(|| GameError::InvalidState("game is not paused".to_string()))?;
        let by = now.saturating_sub(paused_at);

        let mut ghosts = self.world.query::<&mut GhostAgent>();
        for mut agent in ghosts.iter_mut(&mut self.world) {
            agent.0.shift_timestamps(by);
        }
        if let Some(mut player) = self.world.get_mut::<Player>(self.player) {
            player.motion = player.motion.shifted(by);
        }

        let mut clock = self.world.resource_mut::<GameClock>();
        clock.paused_at = None;
        clock.now = now;
        debug!(?by, "Game resumed");
        Ok(())
    }

    /// Queues a turn for the player, taken at the first cell where it is possible.
    pub fn steer(&mut self, direction: Direction) {
        if let Some(mut player) = self.world.get_mut::<Player>(self.player) {
            player.intent = Some(direction);
        }
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        if let Some(mut player) = self.world.get_mut::<Player>(self.player) {
            player.autopilot = enabled;
        }
    }

    pub fn player(&self) -> Option<&Player> {
        self.world.get::<Player>(self.player)
    }

    /// Ghosts in id order.
    pub fn ghosts(&self) -> impl Iterator<Item = &Ghost> + '_ {
        self.ghosts
            .iter()
            .filter_map(|&entity| self.world.get::<GhostAgent>(entity))
            .map(|agent| &agent.0)
    }

    pub fn ghost(&self, id: u8) -> Option<&Ghost> {
        self.ghosts().find(|ghost| ghost.id() == id)
    }

    pub fn grid(&self) -> &NavigationGrid {
        &self.world.resource::<Level>().grid
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<ScoreResource>().0
    }

    pub fn lives(&self) -> u8 {
        self.world.resource::<PlayerLives>().0
    }

    pub fn stage(&self) -> GameStage {
        *self.world.resource::<GameStage>()
    }

    pub fn clock(&self) -> GameClock {
        *self.world.resource::<GameClock>()
    }
}
