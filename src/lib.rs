//! EatMan game library crate: procedural mazes and the ghosts that chase through them.

pub mod agent;
pub mod constants;
pub mod error;
pub mod formatter;
pub mod game;
pub mod map;
pub mod pathing;
