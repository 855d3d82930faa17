//! The generation-time lattice: tiles plus the fixed-path mask, chamber stamping,
//! connectivity repair and final formatting to level text.

use std::collections::HashSet;

use pathfinding::prelude::bfs_reach;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::GenerationError;
use crate::map::direction::Direction;
use crate::map::point::Point;
use crate::map::tile::{CellKind, Tile};

/// Placement of the ghost chamber, derived from the maze dimensions so its ring
/// lies on odd rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chamber {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
    pub center: i32,
}

impl Chamber {
    pub fn for_dimensions(rows: usize, cols: usize) -> Self {
        let rc = (rows / 2) as i32;
        let cc = (cols / 2) as i32;
        let half_width = if cc % 2 == 0 { 3 } else { 4 };
        let top = if (rc - 2) % 2 == 1 { rc - 2 } else { rc - 3 };
        Self {
            top,
            bottom: top + 4,
            left: cc - half_width,
            right: cc + half_width,
            center: cc,
        }
    }

    pub fn door(&self) -> Point {
        Point::new(self.top + 1, self.center)
    }

    /// The row holding the tunnel mouths, level with the chamber's spawn row.
    pub fn tunnel_row(&self) -> i32 {
        self.top + 2
    }

    pub fn player_spawn(&self) -> Point {
        Point::new(self.bottom + 2, self.center)
    }

    fn is_ring(&self, p: Point) -> bool {
        let inside = (self.top..=self.bottom).contains(&p.row) && (self.left..=self.right).contains(&p.col);
        inside && (p.row == self.top || p.row == self.bottom || p.col == self.left || p.col == self.right)
    }

    fn is_body(&self, p: Point) -> bool {
        p.row > self.top && p.row < self.bottom && p.col > self.left && p.col < self.right
    }
}

/// Mutable tile grid used while a maze is being built.
#[derive(Debug, Clone)]
pub struct Lattice {
    rows: usize,
    cols: usize,
    tiles: Vec<Tile>,
    /// Cells that must stay open: the chamber ring, spawns and tunnel approaches.
    fixed: Vec<bool>,
}

impl Lattice {
    /// Border walls, wall anchors on even-even cells, everything else open, with
    /// the chamber, player spawn and tunnel approaches stamped in.
    pub fn seeded(rows: usize, cols: usize, chamber: &Chamber) -> Self {
        let mut lattice = Self {
            rows,
            cols,
            tiles: vec![Tile::Bean; rows * cols],
            fixed: vec![false; rows * cols],
        };

        for r in 0..rows as i32 {
            for c in 0..cols as i32 {
                let p = Point::new(r, c);
                if lattice.is_border(p) || (r % 2 == 0 && c % 2 == 0) {
                    lattice.set(p, Tile::Wall);
                }
            }
        }

        for r in chamber.top..=chamber.bottom {
            for c in chamber.left..=chamber.right {
                let p = Point::new(r, c);
                if chamber.is_ring(p) {
                    lattice.set(p, Tile::Bean);
                    lattice.fix(p);
                } else if chamber.is_body(p) {
                    lattice.set(p, Tile::HardBlock);
                }
            }
        }

        let spawn_row = chamber.tunnel_row();
        for c in chamber.left + 2..=chamber.right - 2 {
            let p = Point::new(spawn_row, c);
            lattice.set(p, Tile::Empty);
            lattice.fix(p);
        }
        let door = chamber.door();
        lattice.set(door, Tile::Door);
        lattice.fix(door);
        for (id, offset) in [(0u8, -1), (1, 0), (2, 1)] {
            let p = Point::new(spawn_row, chamber.center + offset);
            lattice.set(p, Tile::GhostSpawn(id));
        }
        let outside = Point::new(chamber.top, chamber.center);
        lattice.set(outside, Tile::GhostSpawn(3));

        let player = chamber.player_spawn();
        lattice.set(player, Tile::PlayerSpawn);
        lattice.fix(player);

        let last = cols as i32 - 1;
        for c in [1, 2, last - 1, last - 2] {
            let p = Point::new(spawn_row, c);
            lattice.set(p, Tile::Bean);
            lattice.fix(p);
        }

        lattice
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, p: Point) -> Option<usize> {
        let inside = p.row >= 0 && p.col >= 0 && (p.row as usize) < self.rows && (p.col as usize) < self.cols;
        inside.then(|| p.row as usize * self.cols + p.col as usize)
    }

    pub fn index_of(&self, p: Point) -> Option<usize> {
        self.index(p)
    }

    pub fn tile(&self, p: Point) -> Option<Tile> {
        self.index(p).map(|i| self.tiles[i])
    }

    pub fn set(&mut self, p: Point, tile: Tile) {
        if let Some(i) = self.index(p) {
            self.tiles[i] = tile;
        }
    }

    fn fix(&mut self, p: Point) {
        if let Some(i) = self.index(p) {
            self.fixed[i] = true;
        }
    }

    pub fn is_fixed(&self, p: Point) -> bool {
        self.index(p).is_some_and(|i| self.fixed[i])
    }

    pub fn is_border(&self, p: Point) -> bool {
        p.row == 0 || p.col == 0 || p.row == self.rows as i32 - 1 || p.col == self.cols as i32 - 1
    }

    /// Wall and hard block cells. Doors do not count.
    pub fn is_wall(&self, p: Point) -> bool {
        self.tile(p).is_some_and(|t| t.kind() == CellKind::Wall)
    }

    /// Cells that stop movement: walls, hard blocks, doors and anything off the grid.
    fn blocks(&self, p: Point) -> bool {
        self.tile(p).is_none_or(|t| t.kind() != CellKind::Open)
    }

    /// Number of orthogonal neighbors of `p` that stop movement.
    pub fn blocked_neighbors(&self, p: Point) -> usize {
        Direction::DIRECTIONS
            .iter()
            .filter(|&&d| self.blocks(p.step(d)))
            .count()
    }

    /// Interior `Wall` anchors, in row-major order.
    pub fn interior_anchors(&self) -> Vec<Point> {
        (2..self.rows as i32 - 1)
            .step_by(2)
            .flat_map(|r| (2..self.cols as i32 - 1).step_by(2).map(move |c| Point::new(r, c)))
            .filter(|&p| self.tile(p) == Some(Tile::Wall))
            .collect()
    }

    /// Upper bound on links a lattice of this size can hold.
    pub fn max_links(&self) -> usize {
        let half_rows = (self.rows - 1) / 2;
        let half_cols = (self.cols - 1) / 2;
        (half_rows - 1) * half_cols + (half_cols - 1) * half_rows
    }

    /// Whether walling `p` would complete a 2x2 block of walls.
    pub fn completes_wall_block(&self, p: Point) -> bool {
        [(-1, -1), (-1, 0), (0, -1), (0, 0)].iter().any(|&(dr, dc)| {
            let corner = Point::new(p.row + dr, p.col + dc);
            [(0, 0), (0, 1), (1, 0), (1, 1)].iter().all(|&(r, c)| {
                let cell = Point::new(corner.row + r, corner.col + c);
                cell == p || self.is_wall(cell)
            })
        })
    }

    fn is_open(&self, p: Point) -> bool {
        self.tile(p).is_some_and(|t| t.kind() != CellKind::Wall)
    }

    fn open_cells(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.rows as i32)
            .flat_map(move |r| (0..self.cols as i32).map(move |c| Point::new(r, c)))
            .filter(|&p| self.is_open(p))
    }

    fn flood(&self, start: Point) -> HashSet<Point> {
        bfs_reach(start, |&p| {
            Direction::DIRECTIONS
                .iter()
                .map(move |&d| p.step(d))
                .filter(|&n| self.is_open(n))
                .collect::<SmallVec<[Point; 4]>>()
        })
        .collect()
    }

    /// Opens walls until every non-wall cell is reachable, returning how many were broken.
    ///
    /// Only interior wall passages between a reached and an unreached open cell are
    /// broken. Each round opens the two candidates farthest apart.
    pub fn repair(&mut self, seed: u64) -> Result<usize, GenerationError> {
        let Some(start) = self.open_cells().next() else {
            return Ok(0);
        };
        let total = self.open_cells().count();
        let mut broken = 0;

        loop {
            let visited = self.flood(start);
            if visited.len() == total + broken {
                if broken > 0 {
                    debug!(seed, broken, "Repaired maze connectivity");
                }
                return Ok(broken);
            }

            let candidates = self.breakable_walls(&visited);
            trace!(seed, candidates = candidates.len(), reached = visited.len(), "Repair round");
            let opened: SmallVec<[Point; 2]> = match candidates.as_slice() {
                [] => {
                    return Err(GenerationError::Unrepairable {
                        seed,
                        unreached: total + broken - visited.len(),
                    });
                }
                [single] => SmallVec::from_slice(&[*single]),
                _ => {
                    let mut best = (candidates[0], candidates[1]);
                    let mut best_distance = -1;
                    for (i, &a) in candidates.iter().enumerate() {
                        for &b in &candidates[i + 1..] {
                            let distance = a.distance_squared(b);
                            if distance > best_distance {
                                best_distance = distance;
                                best = (a, b);
                            }
                        }
                    }
                    SmallVec::from_slice(&[best.0, best.1])
                }
            };

            for p in opened {
                self.set(p, Tile::Bean);
                broken += 1;
            }
        }
    }

    fn breakable_walls(&self, visited: &HashSet<Point>) -> Vec<Point> {
        let mut candidates = Vec::new();
        for r in 1..self.rows as i32 - 1 {
            for c in 1..self.cols as i32 - 1 {
                let p = Point::new(r, c);
                if (r + c) % 2 == 0 || self.tile(p) != Some(Tile::Wall) {
                    continue;
                }
                let splits = [(Direction::Up, Direction::Down), (Direction::Left, Direction::Right)]
                    .iter()
                    .any(|&(a, b)| {
                        let (pa, pb) = (p.step(a), p.step(b));
                        self.is_open(pa) && self.is_open(pb) && (visited.contains(&pa) != visited.contains(&pb))
                    });
                if splits {
                    candidates.push(p);
                }
            }
        }
        candidates
    }

    /// Turns both border cells of the tunnel row into teleport markers.
    pub fn carve_tunnel(&mut self, chamber: &Chamber) {
        let row = chamber.tunnel_row();
        self.set(Point::new(row, 0), Tile::Teleport);
        self.set(Point::new(row, self.cols as i32 - 1), Tile::Teleport);
    }

    /// Places the big beans and writes the lattice as level text.
    ///
    /// Plain open cells become beans, except fixed paths which stay empty.
    pub fn to_level_text(&self) -> String {
        let rows = self.rows as i32;
        let cols = self.cols as i32;
        let big_beans = [
            Point::new(3, 1),
            Point::new(3, cols - 2),
            Point::new(rows - 4, 1),
            Point::new(rows - 4, cols - 2),
        ];

        let mut text = String::with_capacity((self.cols + 1) * self.rows);
        for r in 0..rows {
            for c in 0..cols {
                let p = Point::new(r, c);
                let tile = match self.tile(p) {
                    Some(Tile::Bean) if big_beans.contains(&p) => Tile::BigBean,
                    Some(Tile::Bean) if self.is_fixed(p) => Tile::Empty,
                    Some(tile) => tile,
                    None => Tile::Wall,
                };
                text.push(tile.symbol());
            }
            text.push('\n');
        }
        text
    }

    #[cfg(test)]
    pub(crate) fn from_text(lines: &[&str]) -> Self {
        let rows = lines.len();
        let cols = lines[0].len();
        let tiles = lines
            .iter()
            .flat_map(|line| line.chars().map(|ch| Tile::from_symbol(ch).unwrap()))
            .collect();
        Self {
            rows,
            cols,
            tiles,
            fixed: vec![false; rows * cols],
        }
    }
}
