//! Procedural maze generation.
//!
//! An attempt seeds a wall lattice around a fixed ghost chamber, links wall
//! anchors at random under structural rules, repairs connectivity, carves the
//! side tunnel and writes the result as level text, which is then parsed like
//! any level file.

pub mod lattice;
pub mod links;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_COLS, DEFAULT_FILL_RATIO, DEFAULT_MAX_ATTEMPTS, DEFAULT_ROWS, MIN_DIMENSION};
use crate::error::{ConfigError, GameError, GameResult, GenerationError};
use crate::map::grid::Traversal;
use crate::map::parser::{LevelData, LevelParser};

use lattice::{Chamber, Lattice};
use links::link_walls;

/// Maze generator settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    pub rows: usize,
    pub cols: usize,
    /// Fraction of possible wall links to build, in (0, 1).
    pub fill_ratio: f64,
    pub max_attempts: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            fill_ratio: DEFAULT_FILL_RATIO,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl GeneratorConfig {
    /// # Errors
    ///
    /// Returns an error for dimensions below the minimum or even, a fill ratio
    /// outside (0, 1), or zero attempts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < MIN_DIMENSION || self.cols < MIN_DIMENSION {
            return Err(ConfigError::TooSmall {
                rows: self.rows,
                cols: self.cols,
                min: MIN_DIMENSION,
            });
        }
        if self.rows % 2 == 0 || self.cols % 2 == 0 {
            return Err(ConfigError::EvenDimension {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !(self.fill_ratio > 0.0 && self.fill_ratio < 1.0) {
            return Err(ConfigError::FillRatio(self.fill_ratio));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        Ok(())
    }
}

/// Generates connected mazes in the level text vocabulary.
#[derive(Debug, Clone)]
pub struct MazeGenerator {
    config: GeneratorConfig,
}

impl MazeGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Runs attempts with seeds drawn from `rng` until one succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Exhausted`] once every attempt has failed in a retryable way.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> GameResult<LevelData> {
        for attempt in 1..=self.config.max_attempts {
            let seed: u64 = rng.random();
            match self.generate_seeded(seed) {
                Ok(level) => {
                    info!(attempt, seed, rows = self.config.rows, cols = self.config.cols, "Maze generated");
                    return Ok(level);
                }
                Err(GameError::Generation(error)) if error.is_retryable() => {
                    debug!(attempt, seed, %error, "Generation attempt failed");
                }
                Err(error) => return Err(error),
            }
        }
        warn!(attempts = self.config.max_attempts, "Maze generation exhausted its attempts");
        Err(GenerationError::Exhausted(self.config.max_attempts).into())
    }

    /// One deterministic attempt.
    pub fn generate_seeded(&self, seed: u64) -> GameResult<LevelData> {
        let text = self.generate_text(seed)?;
        let level = LevelParser::parse(&text)?;

        let grid = &level.grid;
        if !grid.is_connected(Traversal::Homebound) {
            let total = grid.open_cells(Traversal::Homebound).count();
            let reached = grid
                .open_cells(Traversal::Homebound)
                .next()
                .map_or(0, |start| grid.reachable_from(start, Traversal::Homebound).len());
            return Err(GenerationError::Unrepairable {
                seed,
                unreached: total - reached,
            }
            .into());
        }
        Ok(level)
    }

    /// One deterministic attempt, returning the raw level text.
    pub fn generate_text(&self, seed: u64) -> Result<String, GenerationError> {
        let GeneratorConfig {
            rows, cols, fill_ratio, ..
        } = self.config;
        let mut rng = SmallRng::seed_from_u64(seed);

        let chamber = Chamber::for_dimensions(rows, cols);
        let mut lattice = Lattice::seeded(rows, cols, &chamber);
        let links = link_walls(&mut lattice, fill_ratio, seed, &mut rng)?;
        let broken = lattice.repair(seed)?;
        lattice.carve_tunnel(&chamber);

        debug!(seed, links, broken, "Lattice complete");
        Ok(lattice.to_level_text())
    }
}
