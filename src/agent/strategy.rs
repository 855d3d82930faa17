//! Chase-mode target selection.

use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::constants::{AMBUSH_LEAD, IGNORANT_RADIUS_SQ};
use crate::map::direction::Direction;
use crate::map::point::Point;

/// How a ghost picks its target while chasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Strategy {
    /// Heads straight for the player.
    Pursuer,
    /// Aims a few cells ahead of where the player is facing.
    Ambusher,
    /// Chases from afar, runs home when close.
    Ignorant,
    /// Doubles the pursuer's offset to the player.
    Whimsical,
}

/// Everything a strategy may look at when choosing a target.
#[derive(Debug, Clone, Copy)]
pub struct TargetInputs {
    pub own: Point,
    pub home: Point,
    pub player: Point,
    pub player_facing: Direction,
    /// Position of the level's designated pursuer, if it has one.
    pub pursuer: Option<Point>,
}

impl Strategy {
    /// Strategy used when a level file does not name one.
    pub fn default_for(id: u8) -> Strategy {
        match id % 4 {
            0 => Strategy::Ambusher,
            1 => Strategy::Whimsical,
            2 => Strategy::Ignorant,
            _ => Strategy::Pursuer,
        }
    }

    /// The chase target. The result may lie outside the grid or inside a wall.
    pub fn chase_target(self, inputs: &TargetInputs) -> Point {
        match self {
            Strategy::Pursuer => inputs.player,
            Strategy::Ambusher => inputs.player.offset(inputs.player_facing.as_ivec2() * AMBUSH_LEAD),
            Strategy::Ignorant => {
                if inputs.own.distance_squared(inputs.player) > IGNORANT_RADIUS_SQ {
                    inputs.player
                } else {
                    inputs.home
                }
            }
            Strategy::Whimsical => match inputs.pursuer {
                Some(pursuer) => {
                    let offset = glam::IVec2::from(inputs.player) - glam::IVec2::from(pursuer);
                    pursuer.offset(offset * 2)
                }
                None => inputs.player,
            },
        }
    }
}

/// Home corner used when a level file does not name one: 0 top-right, 1 top-left, 2 bottom-right, 3 bottom-left.
pub fn default_home(id: u8, rows: usize, cols: usize) -> Point {
    let last_row = rows.saturating_sub(1) as i32;
    let last_col = cols.saturating_sub(1) as i32;
    match id % 4 {
        0 => Point::new(0, last_col),
        1 => Point::new(0, 0),
        2 => Point::new(last_row, last_col),
        _ => Point::new(last_row, 0),
    }
}
