//! The navigation grid shared by the player, the ghosts and the path searches.

use std::collections::HashSet;
use std::fmt;

use pathfinding::prelude::bfs_reach;
use smallvec::SmallVec;

use crate::error::ParseError;
use crate::map::direction::Direction;
use crate::map::point::Point;
use crate::map::tile::{CellKind, Tile};

/// Who is asking whether a cell can be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Traversal {
    Player,
    Ghost,
    /// A ghost passing through the chamber door, either returning to it or walking out of it.
    Homebound,
}

/// Rectangular grid of tiles with the special positions of a level.
///
/// Topology (which cells are walls) never changes after construction; only
/// pickups are removed through [`NavigationGrid::consume`].
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationGrid {
    rows: usize,
    cols: usize,
    tiles: Vec<Tile>,
    door: Point,
    player_spawn: Point,
    /// Ghost spawns sorted by ghost id.
    ghost_spawns: Vec<(u8, Point)>,
    teleports: Option<[Point; 2]>,
}

impl NavigationGrid {
    /// Builds a grid from rows of tiles, validating the level's special cells.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows are ragged, if the door or player spawn is not
    /// unique, if no ghost spawn exists, or if teleports are not paired.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, ParseError> {
        let cols = rows.first().map(Vec::len).ok_or(ParseError::Empty)?;
        if cols == 0 {
            return Err(ParseError::Empty);
        }

        let mut doors = Vec::new();
        let mut players = Vec::new();
        let mut ghost_spawns: Vec<(u8, Point)> = Vec::new();
        let mut teleports = Vec::new();
        let mut tiles = Vec::with_capacity(rows.len() * cols);

        for (r, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(ParseError::RowLength {
                    row: r,
                    expected: cols,
                    found: row.len(),
                });
            }
            for (c, &tile) in row.iter().enumerate() {
                let pos = Point::new(r as i32, c as i32);
                match tile {
                    Tile::Door => doors.push(pos),
                    Tile::PlayerSpawn => players.push(pos),
                    Tile::Teleport => teleports.push(pos),
                    Tile::GhostSpawn(id) => {
                        if ghost_spawns.iter().any(|(existing, _)| *existing == id) {
                            return Err(ParseError::DuplicateGhostSpawn(id));
                        }
                        ghost_spawns.push((id, pos));
                    }
                    _ => {}
                }
                tiles.push(tile);
            }
        }

        if doors.len() != 1 {
            return Err(ParseError::DoorCount(doors.len()));
        }
        if players.len() != 1 {
            return Err(ParseError::PlayerSpawnCount(players.len()));
        }
        if ghost_spawns.is_empty() {
            return Err(ParseError::NoGhostSpawn);
        }
        let teleports = match teleports.as_slice() {
            [] => None,
            [a, b] => Some([*a, *b]),
            other => return Err(ParseError::TeleportCount(other.len())),
        };
        ghost_spawns.sort_by_key(|(id, _)| *id);

        Ok(Self {
            rows: rows.len(),
            cols,
            tiles,
            door: doors[0],
            player_spawn: players[0],
            ghost_spawns,
            teleports,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, pos: Point) -> bool {
        pos.row >= 0 && pos.col >= 0 && (pos.row as usize) < self.rows && (pos.col as usize) < self.cols
    }

    fn index(&self, pos: Point) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.row as usize * self.cols + pos.col as usize)
    }

    pub fn tile_at(&self, pos: Point) -> Option<Tile> {
        self.index(pos).map(|i| self.tiles[i])
    }

    pub fn kind_at(&self, pos: Point) -> CellKind {
        self.tile_at(pos).map_or(CellKind::OutOfBounds, Tile::kind)
    }

    /// Whether `pos` can be entered. Doors only admit homebound ghosts.
    pub fn is_traversable(&self, pos: Point, traversal: Traversal) -> bool {
        match self.kind_at(pos) {
            CellKind::Open => true,
            CellKind::Door => traversal == Traversal::Homebound,
            CellKind::Wall | CellKind::OutOfBounds => false,
        }
    }

    /// In-bounds orthogonal neighbors, in Up, Left, Down, Right order.
    pub fn neighbors4(&self, pos: Point) -> SmallVec<[Point; 4]> {
        Direction::STEERING_ORDER
            .iter()
            .map(|&d| pos.step(d))
            .filter(|&p| self.in_bounds(p))
            .collect()
    }

    /// The cell reached by moving one step from `pos`.
    ///
    /// Stepping outward from a tunnel mouth wraps to the opposite mouth.
    pub fn step(&self, pos: Point, direction: Direction) -> Option<Point> {
        let next = pos.step(direction);
        if self.in_bounds(next) {
            return Some(next);
        }
        let [a, b] = self.teleports?;
        if pos == a {
            Some(b)
        } else if pos == b {
            Some(a)
        } else {
            None
        }
    }

    /// Whether moving from `pos` in `direction` lands on a cell `traversal` may enter.
    pub fn can_move(&self, pos: Point, direction: Direction, traversal: Traversal) -> bool {
        self.step(pos, direction)
            .is_some_and(|next| self.is_traversable(next, traversal))
    }

    /// Removes the pickup at `pos`, returning what was there.
    pub fn consume(&mut self, pos: Point) -> Option<Tile> {
        let index = self.index(pos)?;
        let tile = self.tiles[index];
        if tile.is_pickup() {
            self.tiles[index] = Tile::Empty;
            Some(tile)
        } else {
            None
        }
    }

    pub fn bean_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_pickup()).count()
    }

    pub fn door(&self) -> Point {
        self.door
    }

    /// The ring cell directly above the door, where ghosts leave the chamber.
    pub fn chamber_exit(&self) -> Point {
        self.door.step(Direction::Up)
    }

    /// The chamber cell directly below the door, where caught ghosts recover.
    pub fn recovery_cell(&self) -> Point {
        self.door.step(Direction::Down)
    }

    pub fn player_spawn(&self) -> Point {
        self.player_spawn
    }

    pub fn ghost_spawns(&self) -> &[(u8, Point)] {
        &self.ghost_spawns
    }

    pub fn ghost_spawn(&self, id: u8) -> Option<Point> {
        self.ghost_spawns.iter().find(|(g, _)| *g == id).map(|(_, p)| *p)
    }

    pub fn teleports(&self) -> Option<[Point; 2]> {
        self.teleports
    }

    /// All cells `traversal` may enter.
    pub fn open_cells(&self, traversal: Traversal) -> impl Iterator<Item = Point> + '_ {
        (0..self.rows).flat_map(move |r| {
            (0..self.cols)
                .map(move |c| Point::new(r as i32, c as i32))
                .filter(move |&p| self.is_traversable(p, traversal))
        })
    }

    /// Flood fill from `start` over cells `traversal` may enter, following tunnel wraps.
    pub fn reachable_from(&self, start: Point, traversal: Traversal) -> HashSet<Point> {
        bfs_reach(start, |&p| {
            Direction::DIRECTIONS
                .iter()
                .filter_map(move |&d| self.step(p, d))
                .filter(|&n| self.is_traversable(n, traversal))
                .collect::<SmallVec<[Point; 4]>>()
        })
        .collect()
    }

    /// Whether every cell `traversal` may enter is reachable from every other.
    pub fn is_connected(&self, traversal: Traversal) -> bool {
        let mut cells = self.open_cells(traversal);
        let Some(start) = cells.next() else {
            return true;
        };
        let reached = self.reachable_from(start, traversal);
        self.open_cells(traversal).all(|p| reached.contains(&p))
    }

    /// The enterable cell closest to `target` (squared distance, first in row-major order on ties).
    ///
    /// Targets outside the grid are clamped to it first.
    pub fn nearest_open(&self, target: Point, traversal: Traversal) -> Option<Point> {
        let clamped = Point::new(
            target.row.clamp(0, self.rows as i32 - 1),
            target.col.clamp(0, self.cols as i32 - 1),
        );
        if self.is_traversable(clamped, traversal) {
            return Some(clamped);
        }
        self.open_cells(traversal)
            .min_by_key(|p| p.distance_squared(clamped))
    }

    /// The level text line for row `r`.
    pub fn row_text(&self, r: usize) -> String {
        self.tiles[r * self.cols..(r + 1) * self.cols]
            .iter()
            .map(|t| t.symbol())
            .collect()
    }
}

impl fmt::Display for NavigationGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            writeln!(f, "{}", self.row_text(r))?;
        }
        Ok(())
    }
}
