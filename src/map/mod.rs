//! This module defines the level grid and provides functions for loading, generating and querying it.

pub mod direction;
pub mod generator;
pub mod grid;
pub mod parser;
pub mod point;
pub mod tile;

pub use direction::Direction;
pub use grid::{NavigationGrid, Traversal};
pub use parser::{GhostConfig, LevelConfig, LevelData, LevelParser};
pub use point::Point;
pub use tile::{CellKind, Tile};
