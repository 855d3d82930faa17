//! Grid coordinates.

use std::fmt;

use glam::IVec2;

use crate::map::direction::Direction;

/// A cell coordinate. Rows grow downward, columns grow rightward.
///
/// Coordinates are signed so that targets projected past the edge of the grid
/// (ambush lead points, reflected targets) stay representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Point {
    pub row: i32,
    pub col: i32,
}

impl Point {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub const fn row(self) -> i32 {
        self.row
    }

    pub const fn col(self) -> i32 {
        self.col
    }

    /// The adjacent cell in `direction`, without any bounds handling.
    pub fn step(self, direction: Direction) -> Point {
        self.offset(direction.as_ivec2())
    }

    /// Moves by a vector whose `x` is the column delta and `y` the row delta.
    pub fn offset(self, delta: IVec2) -> Point {
        Point::new(self.row + delta.y, self.col + delta.x)
    }

    pub fn distance_squared(self, other: Point) -> i32 {
        let dr = self.row - other.row;
        let dc = self.col - other.col;
        dr * dr + dc * dc
    }

    pub fn manhattan(self, other: Point) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    /// The direction of a single orthogonal step from `self` to `other`, if they are adjacent.
    pub fn direction_to(self, other: Point) -> Option<Direction> {
        match (other.row - self.row, other.col - self.col) {
            (-1, 0) => Some(Direction::Up),
            (1, 0) => Some(Direction::Down),
            (0, -1) => Some(Direction::Left),
            (0, 1) => Some(Direction::Right),
            _ => None,
        }
    }
}

impl From<Point> for IVec2 {
    fn from(point: Point) -> Self {
        IVec2::new(point.col, point.row)
    }
}

impl From<IVec2> for Point {
    fn from(v: IVec2) -> Self {
        Point::new(v.y, v.x)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
