use eatman::map::direction::Direction;
use eatman::map::grid::Traversal;
use eatman::map::point::Point;
use eatman::map::tile::{CellKind, Tile};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

const TUNNEL: &str = "\
*******
*.....*
T.*=*.T
*e*0*.*
*******
";

#[test]
fn test_cell_kinds() {
    let level = common::parse(common::PEN);
    let grid = &level.grid;
    assert_eq!(grid.kind_at(Point::new(0, 0)), CellKind::Wall);
    assert_eq!(grid.kind_at(Point::new(2, 4)), CellKind::Door);
    assert_eq!(grid.kind_at(Point::new(3, 4)), CellKind::Open);
    assert_eq!(grid.kind_at(Point::new(-1, 4)), CellKind::OutOfBounds);
    assert_eq!(grid.kind_at(Point::new(3, 9)), CellKind::OutOfBounds);
}

#[test]
fn test_door_only_for_homebound() {
    let level = common::parse(common::PEN);
    let grid = &level.grid;
    let door = grid.door();
    assert!(!grid.is_traversable(door, Traversal::Player));
    assert!(!grid.is_traversable(door, Traversal::Ghost));
    assert!(grid.is_traversable(door, Traversal::Homebound));
    assert_eq!(grid.chamber_exit(), Point::new(1, 4));
    assert_eq!(grid.recovery_cell(), Point::new(3, 4));
}

#[test]
fn test_tunnel_step_wraps() {
    let level = common::parse(TUNNEL);
    let grid = &level.grid;
    assert_eq!(grid.teleports(), Some([Point::new(2, 0), Point::new(2, 6)]));
    assert_eq!(grid.step(Point::new(2, 0), Direction::Left), Some(Point::new(2, 6)));
    assert_eq!(grid.step(Point::new(2, 6), Direction::Right), Some(Point::new(2, 0)));
    // Leaving the grid anywhere else goes nowhere.
    assert_eq!(grid.step(Point::new(0, 0), Direction::Up), None);
    assert!(grid.can_move(Point::new(2, 0), Direction::Left, Traversal::Player));
}

#[test]
fn test_reachability_follows_tunnel() {
    let level = common::parse(TUNNEL);
    let grid = &level.grid;
    // The right column is only reachable through the tunnel or along row 1.
    let reached = grid.reachable_from(grid.player_spawn(), Traversal::Player);
    assert!(reached.contains(&Point::new(3, 5)));
    assert!(!reached.contains(&Point::new(3, 3)));
    assert!(grid.is_connected(Traversal::Homebound));
    assert!(!grid.is_connected(Traversal::Ghost));
}

#[test]
fn test_consume_pickups() {
    let mut level = common::parse(common::ARENA);
    let grid = &mut level.grid;
    let before = grid.bean_count();
    assert_that(&before).is_equal_to(5);

    assert_eq!(grid.consume(Point::new(1, 4)), Some(Tile::BigBean));
    assert_eq!(grid.consume(Point::new(1, 4)), None);
    assert_eq!(grid.consume(Point::new(0, 0)), None);
    assert_eq!(grid.tile_at(Point::new(1, 4)), Some(Tile::Empty));
    assert_eq!(grid.kind_at(Point::new(1, 4)), CellKind::Open);
    assert_that(&grid.bean_count()).is_equal_to(before - 1);
}

#[test]
fn test_nearest_open_clamps_and_breaks_ties_row_major() {
    let level = common::parse(common::PEN);
    let grid = &level.grid;
    // Off the top-left corner: clamps to (0, 0), nearest open is (1, 1).
    assert_eq!(grid.nearest_open(Point::new(-5, -5), Traversal::Ghost), Some(Point::new(1, 1)));
    // A wall between (1, 3) and (3, 3): equally near, the earlier row wins.
    assert_eq!(grid.nearest_open(Point::new(2, 3), Traversal::Ghost), Some(Point::new(1, 3)));
    // Already open.
    assert_eq!(grid.nearest_open(Point::new(5, 5), Traversal::Ghost), Some(Point::new(5, 5)));
}

#[test]
fn test_display_matches_rows() {
    let level = common::parse(common::PEN);
    assert_eq!(level.grid.to_string(), common::PEN);
    assert_eq!(level.grid.row_text(2), "*.**=**.*");
}
