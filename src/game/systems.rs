//! The per-tick gameplay systems, run in order: player, ghosts, collisions.

use bevy_ecs::system::{Query, Res, ResMut, Single};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::agent::{Ghost, Mode, Motion, Sighting};
use crate::constants::{BEAN_SCORE, BIG_BEAN_SCORE, GHOST_SCORE};
use crate::game::components::{
    GameClock, GameRng, GameStage, GhostAgent, GhostRegistry, Level, Player, PlayerLives, ScoreResource,
};
use crate::map::direction::Direction;
use crate::map::grid::{NavigationGrid, Traversal};
use crate::map::tile::Tile;
use crate::pathing::random_step;

/// Upper bound on cells the player crosses in one tick.
const MAX_PLAYER_STEPS_PER_TICK: usize = 4;

pub fn is_playing(stage: Res<GameStage>) -> bool {
    *stage == GameStage::Playing
}

pub fn is_running(clock: Res<GameClock>) -> bool {
    !clock.is_paused()
}

/// The pending turn if it is possible, otherwise straight on. On autopilot a dead
/// end or junction is resolved at random.
fn choose_direction<R: Rng + ?Sized>(grid: &NavigationGrid, player: &Player, rng: &mut R) -> Option<Direction> {
    if let Some(intent) = player
        .intent
        .filter(|&d| grid.can_move(player.position, d, Traversal::Player))
    {
        return Some(intent);
    }
    if player.autopilot {
        return random_step(grid, player.position, Some(player.facing.opposite()), Traversal::Player, rng);
    }
    grid.can_move(player.position, player.facing, Traversal::Player)
        .then_some(player.facing)
}

/// Moves the player and eats whatever is on each cell it enters.
pub fn player_system(
    mut level: ResMut<Level>,
    clock: Res<GameClock>,
    mut rng: ResMut<GameRng>,
    mut player: Single<&mut Player>,
    mut ghosts: Query<&mut GhostAgent>,
    mut score: ResMut<ScoreResource>,
    mut stage: ResMut<GameStage>,
) {
    let now = clock.now;
    let mut start = now;

    for _ in 0..MAX_PLAYER_STEPS_PER_TICK {
        if let Motion::Animating { started_at, .. } = player.motion {
            let arrival = started_at + player.step_duration();
            if arrival > now {
                return;
            }
            player.motion = Motion::Idle;
            start = arrival;
        }

        let Some(direction) = choose_direction(&level.grid, &player, &mut rng.0) else {
            return;
        };
        let Some(next) = level.grid.step(player.position, direction) else {
            return;
        };
        player.motion = Motion::Animating {
            from: player.position,
            to: next,
            started_at: start,
        };
        player.position = next;
        player.facing = direction;
        if player.intent == Some(direction) {
            player.intent = None;
        }

        match level.grid.consume(next) {
            Some(Tile::Bean) => score.0 += BEAN_SCORE,
            Some(Tile::BigBean) => {
                score.0 += BIG_BEAN_SCORE;
                let frightened = ghosts
                    .iter_mut()
                    .map(|mut agent| agent.0.frighten(now))
                    .filter(|&frightened| frightened)
                    .count();
                debug!(cell = %next, frightened, "Big bean eaten");
            }
            _ => continue,
        }

        if level.grid.bean_count() == 0 {
            *stage = GameStage::LevelCleared;
            info!(score = score.0, "Level cleared");
            return;
        }
    }
}

/// Lets every ghost advance its timers and take its next steps.
pub fn ghost_system(
    level: Res<Level>,
    clock: Res<GameClock>,
    registry: Res<GhostRegistry>,
    mut rng: ResMut<GameRng>,
    player: Single<&Player>,
    mut ghosts: Query<&mut GhostAgent>,
) {
    let pursuer = registry
        .pursuer
        .and_then(|entity| ghosts.get(entity).ok())
        .map(|agent| agent.0.position());
    let sighting = Sighting {
        player: player.position,
        player_facing: player.facing,
        pursuer,
    };
    let ctx = level.context(clock.now);

    for mut agent in ghosts.iter_mut() {
        agent.0.update(&ctx, &sighting, &mut rng.0);
    }
}

/// Same cell, or the two swapped cells during this tick.
fn touches(player: &Player, ghost: &Ghost) -> bool {
    ghost.position() == player.position
        || (ghost.previous_position() == Some(player.position) && player.previous_position() == Some(ghost.position()))
}

/// Frightened ghosts the player touches are caught; a hostile one costs a life.
pub fn collision_system(
    clock: Res<GameClock>,
    mut player: Single<&mut Player>,
    mut ghosts: Query<&mut GhostAgent>,
    mut score: ResMut<ScoreResource>,
    mut lives: ResMut<PlayerLives>,
    mut stage: ResMut<GameStage>,
) {
    let now = clock.now;
    let mut player_caught = false;

    for mut agent in ghosts.iter_mut() {
        let ghost = &mut agent.0;
        if !touches(&player, ghost) {
            continue;
        }
        match ghost.mode() {
            Mode::Frighten => match ghost.caught(now) {
                Ok(()) => {
                    score.0 += GHOST_SCORE;
                    debug!(ghost = ghost.id(), score = score.0, "Ghost eaten");
                }
                Err(error) => warn!(%error, "Could not catch ghost"),
            },
            mode if mode.is_hostile() => {
                debug!(ghost = ghost.id(), cell = %ghost.position(), "Player caught");
                player_caught = true;
                break;
            }
            _ => {}
        }
    }

    if !player_caught {
        return;
    }

    lives.0 = lives.0.saturating_sub(1);
    if lives.0 == 0 {
        *stage = GameStage::GameOver;
        info!(score = score.0, "Game over");
        return;
    }

    player.reset_to_spawn();
    for mut agent in ghosts.iter_mut() {
        agent.0.reset_to_spawn(now);
    }
    info!(lives = lives.0, "Life lost, positions reset");
}
