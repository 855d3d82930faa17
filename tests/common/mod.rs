#![allow(dead_code)]

use eatman::map::direction::Direction;
use eatman::map::generator::{GeneratorConfig, MazeGenerator};
use eatman::map::grid::{NavigationGrid, Traversal};
use eatman::map::parser::{LevelData, LevelParser};
use eatman::map::point::Point;
use pathfinding::prelude::bfs;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// A straight five-cell corridor along row 1, with the chamber below it.
pub const CORRIDOR: &str = "\
*******
*.....*
***=***
**e0***
*******
";

/// A ring around a sealed chamber; ghost 3 starts outside on the bottom row.
pub const PEN: &str = "\
*********
*.......*
*.**=**.*
*.*012*.*
*.*****.*
*...e..3*
*********
";

/// A corridor with a big bean in the middle and the pursuer at the far end.
pub const ARENA: &str = "\
*********
*e..O..3*
***=*****
***0*****
*********
";

pub fn parse(text: &str) -> LevelData {
    LevelParser::parse(text).expect("level text should parse")
}

pub fn generated(rows: usize, cols: usize, fill_ratio: f64, seed: u64) -> LevelData {
    let generator = MazeGenerator::new(GeneratorConfig {
        rows,
        cols,
        fill_ratio,
        max_attempts: 50,
    })
    .expect("generator config should be valid");
    generator
        .generate(&mut SmallRng::seed_from_u64(seed))
        .expect("generation should succeed")
}

/// Number of moves on a shortest path, following tunnel wraps, by plain BFS.
pub fn bfs_distance(grid: &NavigationGrid, from: Point, to: Point, traversal: Traversal) -> Option<usize> {
    bfs(
        &from,
        |&p| {
            Direction::DIRECTIONS
                .iter()
                .filter_map(|&d| grid.step(p, d))
                .filter(|&n| grid.is_traversable(n, traversal))
                .collect::<Vec<_>>()
        },
        |&p| p == to,
    )
    .map(|path| path.len() - 1)
}

/// Open neighbors of `p`, counting the cell across a tunnel.
pub fn open_neighbors(grid: &NavigationGrid, p: Point, traversal: Traversal) -> usize {
    Direction::DIRECTIONS
        .iter()
        .filter(|&&d| grid.can_move(p, d, traversal))
        .count()
}

/// Chamber body rows and columns for a generated maze of the given size:
/// `(top, bottom, left, right)` of the interior, inclusive.
pub fn chamber_body(rows: usize, cols: usize) -> (i32, i32, i32, i32) {
    let rc = (rows / 2) as i32;
    let cc = (cols / 2) as i32;
    let half = if cc % 2 == 0 { 3 } else { 4 };
    let top = if rc % 2 == 1 { rc - 2 } else { rc - 3 };
    (top + 1, top + 3, cc - half + 1, cc + half - 1)
}

pub fn in_chamber_body(p: Point, body: (i32, i32, i32, i32)) -> bool {
    let (top, bottom, left, right) = body;
    (top..=bottom).contains(&p.row) && (left..=right).contains(&p.col)
}
