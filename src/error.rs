//! Centralized error types for EatMan.
//!
//! Each subsystem has its own error enum; [`GameError`] aggregates them for
//! public entry points that can fail for more than one reason.

use std::io;

use crate::map::point::Point;

/// Main error type for the game.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Level parsing error: {0}")]
    Parse(#[from] ParseError),

    #[error("Maze generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Rejected configuration values. Always fatal for the requested operation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Maze of {rows}x{cols} is below the minimum of {min}x{min}")]
    TooSmall { rows: usize, cols: usize, min: usize },

    #[error("Maze dimensions must be odd, got {rows}x{cols}")]
    EvenDimension { rows: usize, cols: usize },

    #[error("Fill ratio must be within (0, 1), got {0}")]
    FillRatio(f64),

    #[error("At least one generation attempt is required")]
    NoAttempts,
}

/// Error type for level text parsing.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unknown character {symbol:?} at row {row}, column {col}")]
    UnknownCharacter { symbol: char, row: usize, col: usize },

    #[error("Row {row} has {found} columns, expected {expected}")]
    RowLength { row: usize, expected: usize, found: usize },

    #[error("Level contains no grid rows")]
    Empty,

    #[error("Expected exactly one door, found {0}")]
    DoorCount(usize),

    #[error("Expected exactly one player spawn, found {0}")]
    PlayerSpawnCount(usize),

    #[error("Level has no ghost spawn")]
    NoGhostSpawn,

    #[error("Duplicate spawn for ghost {0}")]
    DuplicateGhostSpawn(u8),

    #[error("Teleport markers must come in a pair, found {0}")]
    TeleportCount(usize),

    #[error("Malformed `set` line: {0}")]
    SetLine(String),

    #[error("Malformed `ghost` line: {0}")]
    GhostLine(String),

    #[error("Unknown ghost strategy: {0}")]
    UnknownStrategy(String),
}

/// Failures of a maze generation attempt.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// One attempt could not satisfy the requested fill ratio within its budget.
    /// Retrying with another seed may succeed.
    #[error("Generation stalled at {built}/{required} links (seed {seed})")]
    Stalled { seed: u64, built: usize, required: usize },

    /// Connectivity repair found no wall it was allowed to break.
    #[error("Connectivity repair found no breakable wall (seed {seed}, {unreached} cells unreached)")]
    Unrepairable { seed: u64, unreached: usize },

    #[error("All {0} generation attempts failed")]
    Exhausted(usize),
}

impl GenerationError {
    /// Whether another attempt with a different seed might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::Stalled { .. } | GenerationError::Unrepairable { .. })
    }
}

/// Path search failures. Callers recover locally and never propagate these as crashes.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    #[error("No route from {from} to {to}")]
    Unreachable { from: Point, to: Point },
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stalled_is_retryable() {
        let err = GenerationError::Stalled {
            seed: 7,
            built: 3,
            required: 12,
        };
        assert!(err.is_retryable());
        assert!(!GenerationError::Exhausted(4).is_retryable());
    }

    #[test]
    fn test_game_error_wraps_config() {
        let err: GameError = ConfigError::FillRatio(1.5).into();
        assert_eq!(err.to_string(), "Configuration error: Fill ratio must be within (0, 1), got 1.5");
    }
}
