//! Level text parsing and writing.
//!
//! A level is line oriented: `set` lines name colors, `ghost` lines carry
//! per-ghost parameters, and every other non-blank line is one grid row.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::agent::strategy::{default_home, Strategy};
use crate::constants::{DEFAULT_FIRE_CHANCE, DEFAULT_SEEK_CHANCE, DEFAULT_SPEED_FACTOR};
use crate::error::{GameResult, ParseError};
use crate::map::grid::NavigationGrid;
use crate::map::point::Point;
use crate::map::tile::Tile;

/// Per-ghost parameters from a `ghost` line, with defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostConfig {
    pub color: Option<String>,
    /// Scatter corner. Written as `home=u,v` with `u` the column and `v` the row.
    pub home: Point,
    pub strategy: Strategy,
    pub speed_factor: f64,
    /// Probability of following a full shortest path instead of a greedy step.
    pub seek_chance: f64,
    /// Stored for level files that carry it; nothing acts on it.
    pub fire_chance: f64,
}

impl GhostConfig {
    /// The configuration a ghost gets when the level says nothing about it.
    pub fn default_for(id: u8, rows: usize, cols: usize) -> Self {
        Self {
            color: None,
            home: default_home(id, rows, cols),
            strategy: Strategy::default_for(id),
            speed_factor: DEFAULT_SPEED_FACTOR,
            seek_chance: DEFAULT_SEEK_CHANCE,
            fire_chance: DEFAULT_FIRE_CHANCE,
        }
    }
}

/// Level-wide settings that are not part of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelConfig {
    /// 1-based level number; scales the mode schedule and timers.
    pub level: u32,
    pub ghosts: BTreeMap<u8, GhostConfig>,
}

/// A parsed level: the grid plus everything the `set` and `ghost` lines said.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelData {
    pub grid: NavigationGrid,
    pub config: LevelConfig,
    pub colors: BTreeMap<String, [u8; 3]>,
}

/// Parser for level text.
pub struct LevelParser;

impl LevelParser {
    /// Parses a single grid symbol.
    pub fn parse_character(symbol: char, row: usize, col: usize) -> Result<Tile, ParseError> {
        Tile::from_symbol(symbol).ok_or(ParseError::UnknownCharacter { symbol, row, col })
    }

    /// Parses level text into a grid and its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error on unknown symbols, ragged rows, malformed `set` or `ghost`
    /// lines, and grids missing their door, player spawn or ghost spawns.
    pub fn parse(text: &str) -> Result<LevelData, ParseError> {
        let mut rows: Vec<Vec<Tile>> = Vec::new();
        let mut colors = BTreeMap::new();
        let mut ghost_lines = Vec::new();

        for raw in text.lines() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            match fields.next() {
                Some("set") => {
                    let (key, color) = Self::parse_set(line, fields)?;
                    colors.insert(key, color);
                }
                Some("ghost") => ghost_lines.push(line),
                _ => {
                    let r = rows.len();
                    let row = line
                        .chars()
                        .enumerate()
                        .map(|(c, symbol)| Self::parse_character(symbol, r, c))
                        .collect::<Result<Vec<_>, _>>()?;
                    rows.push(row);
                }
            }
        }

        let grid = NavigationGrid::from_rows(rows)?;

        let mut ghosts: BTreeMap<u8, GhostConfig> = grid
            .ghost_spawns()
            .iter()
            .map(|&(id, _)| (id, GhostConfig::default_for(id, grid.rows(), grid.cols())))
            .collect();
        for line in ghost_lines {
            Self::apply_ghost_line(line, &grid, &mut ghosts)?;
        }

        debug!(
            rows = grid.rows(),
            cols = grid.cols(),
            ghosts = ghosts.len(),
            beans = grid.bean_count(),
            "Parsed level"
        );

        Ok(LevelData {
            grid,
            config: LevelConfig { level: 1, ghosts },
            colors,
        })
    }

    fn parse_set<'a>(line: &str, mut fields: impl Iterator<Item = &'a str>) -> Result<(String, [u8; 3]), ParseError> {
        let bad = || ParseError::SetLine(line.to_string());
        let key = fields.next().ok_or_else(bad)?;
        let mut color = [0u8; 3];
        for channel in color.iter_mut() {
            *channel = fields.next().and_then(|v| v.parse().ok()).ok_or_else(bad)?;
        }
        if fields.next().is_some() {
            return Err(bad());
        }
        Ok((key.to_string(), color))
    }

    fn apply_ghost_line(
        line: &str,
        grid: &NavigationGrid,
        ghosts: &mut BTreeMap<u8, GhostConfig>,
    ) -> Result<(), ParseError> {
        let bad = || ParseError::GhostLine(line.to_string());
        let mut fields = line.split_whitespace().skip(1);
        let id: u8 = fields.next().and_then(|v| v.parse().ok()).ok_or_else(bad)?;
        let ghost = ghosts
            .entry(id)
            .or_insert_with(|| GhostConfig::default_for(id, grid.rows(), grid.cols()));

        for pair in fields {
            let (key, value) = pair.split_once('=').ok_or_else(bad)?;
            match key {
                "color" => ghost.color = Some(value.to_string()),
                "home" => {
                    let (u, v) = value.split_once(',').ok_or_else(bad)?;
                    let col: i32 = u.trim().parse().map_err(|_| bad())?;
                    let row: i32 = v.trim().parse().map_err(|_| bad())?;
                    ghost.home = Point::new(row, col);
                }
                "strategy" => {
                    ghost.strategy =
                        Strategy::from_str(value).map_err(|_| ParseError::UnknownStrategy(value.to_string()))?;
                }
                "speedFactor" => ghost.speed_factor = Self::parse_positive(value).ok_or_else(bad)?,
                "seekChance" => ghost.seek_chance = Self::parse_chance(value).ok_or_else(bad)?,
                "fireChance" => ghost.fire_chance = Self::parse_chance(value).ok_or_else(bad)?,
                _ => return Err(bad()),
            }
        }
        Ok(())
    }

    fn parse_positive(value: &str) -> Option<f64> {
        value.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
    }

    fn parse_chance(value: &str) -> Option<f64> {
        value.parse::<f64>().ok().filter(|v| (0.0..=1.0).contains(v))
    }
}

impl LevelData {
    /// Shorthand for [`LevelParser::parse`].
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        LevelParser::parse(text)
    }

    /// Reads and parses a level file.
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(LevelParser::parse(&text)?)
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.config.level = level.max(1);
        self
    }

    /// Writes the level back out in the format [`LevelParser::parse`] reads.
    pub fn to_level_text(&self) -> String {
        let mut out = String::new();
        for (key, [r, g, b]) in &self.colors {
            let _ = writeln!(out, "set {key} {r} {g} {b}");
        }
        for (id, ghost) in &self.config.ghosts {
            let _ = write!(out, "ghost {id}");
            if let Some(color) = &ghost.color {
                let _ = write!(out, " color={color}");
            }
            let _ = writeln!(
                out,
                " home={},{} strategy={} speedFactor={} seekChance={} fireChance={}",
                ghost.home.col,
                ghost.home.row,
                ghost.strategy.as_ref(),
                ghost.speed_factor,
                ghost.seek_chance,
                ghost.fire_chance
            );
        }
        out.push_str(&self.grid.to_string());
        out
    }
}
