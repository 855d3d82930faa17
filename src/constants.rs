//! This module contains all the tuning constants used by the game.

use std::time::Duration;

/// Smallest accepted maze dimension. The chamber, its ring and the player spawn need this much room.
pub const MIN_DIMENSION: usize = 13;
pub const DEFAULT_ROWS: usize = 21;
pub const DEFAULT_COLS: usize = 21;
/// Fraction of all possible wall links the generator builds before it stops.
pub const DEFAULT_FILL_RATIO: f64 = 0.2;
pub const DEFAULT_MAX_ATTEMPTS: usize = 50;
/// Linking loop iterations allowed per interior anchor before an attempt stalls.
pub const LINK_ITERATIONS_PER_ANCHOR: usize = 64;

/// Cost of one orthogonal move in the shortest path search.
pub const STEP_COST: u32 = 10;

/// Time taken to move one cell at a speed factor of 1.
pub const STEP_DURATION: Duration = Duration::from_millis(200);
/// How long a ghost stays inert in the chamber after being caught.
pub const DEAD_COOLDOWN: Duration = Duration::from_secs(3);

/// How far ahead of the player the ambusher aims, in cells.
pub const AMBUSH_LEAD: i32 = 4;
/// The ignorant ghost gives up the chase inside this squared distance (8 cells).
pub const IGNORANT_RADIUS_SQ: i32 = 64;
/// A planned route is recomputed once its owner gets this close (squared) to a target that has moved.
pub const REPLAN_PROXIMITY_SQ: i32 = 9;

pub const DEFAULT_SPEED_FACTOR: f64 = 1.0;
pub const DEFAULT_SEEK_CHANCE: f64 = 0.75;
pub const DEFAULT_FIRE_CHANCE: f64 = 0.0;

pub const BEAN_SCORE: u32 = 10;
pub const BIG_BEAN_SCORE: u32 = 50;
pub const GHOST_SCORE: u32 = 200;
pub const STARTING_LIVES: u8 = 3;

/// Seconds of fright granted by a big bean, shrinking by one per level down to two.
pub fn frighten_duration(level: u32) -> Duration {
    let secs = 8u64.saturating_sub(u64::from(level.saturating_sub(1))).max(2);
    Duration::from_secs(secs)
}

/// Delay between successive ghost releases from the chamber, shrinking by 500ms per level down to one second.
pub fn hold_duration(level: u32) -> Duration {
    let millis = 4_000u64
        .saturating_sub(500 * u64::from(level.saturating_sub(1)))
        .max(1_000);
    Duration::from_millis(millis)
}
