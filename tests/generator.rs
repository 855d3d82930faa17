use eatman::error::{ConfigError, GameError};
use eatman::map::generator::{GeneratorConfig, MazeGenerator};
use eatman::map::grid::Traversal;
use eatman::map::point::Point;
use eatman::map::tile::{CellKind, Tile};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

/// Sizes with a fill ratio each can comfortably reach.
const SIZES: [(usize, usize, f64); 3] = [(15, 15, 0.15), (21, 21, 0.2), (17, 23, 0.2)];

#[test]
fn test_generated_mazes_are_connected() {
    for (rows, cols, fill_ratio) in SIZES {
        for seed in 0..5 {
            let level = common::generated(rows, cols, fill_ratio, seed);
            assert!(
                level.grid.is_connected(Traversal::Homebound),
                "{rows}x{cols} seed {seed} is disconnected:\n{}",
                level.grid
            );
        }
    }
}

#[test]
fn test_scenario_fifteen_square_fully_reachable() {
    let level = common::generated(15, 15, 0.15, 2024);
    let grid = &level.grid;
    let reached = grid.reachable_from(grid.player_spawn(), Traversal::Homebound);
    let unreachable: Vec<Point> = grid
        .open_cells(Traversal::Homebound)
        .filter(|p| !reached.contains(p))
        .collect();
    assert_eq!(unreachable, Vec::<Point>::new());
    assert_that(&grid.rows()).is_equal_to(15);
    assert_that(&grid.cols()).is_equal_to(15);
}

#[test]
fn test_no_dead_ends_outside_chamber() {
    for (rows, cols, fill_ratio) in SIZES {
        let body = common::chamber_body(rows, cols);
        for seed in 10..14 {
            let level = common::generated(rows, cols, fill_ratio, seed);
            let grid = &level.grid;
            for p in grid.open_cells(Traversal::Homebound) {
                if common::in_chamber_body(p, body) || grid.kind_at(p) == CellKind::Door {
                    continue;
                }
                let open = common::open_neighbors(grid, p, Traversal::Homebound);
                assert!(open >= 2, "dead end at {p} in {rows}x{cols} seed {seed}:\n{grid}");
            }
        }
    }
}

#[test]
fn test_no_two_by_two_wall_blocks() {
    for (rows, cols, fill_ratio) in SIZES {
        let body = common::chamber_body(rows, cols);
        let level = common::generated(rows, cols, fill_ratio, 99);
        let grid = &level.grid;
        for r in 0..rows as i32 - 1 {
            for c in 0..cols as i32 - 1 {
                let block = [
                    Point::new(r, c),
                    Point::new(r, c + 1),
                    Point::new(r + 1, c),
                    Point::new(r + 1, c + 1),
                ];
                if block.iter().any(|&p| common::in_chamber_body(p, body)) {
                    continue;
                }
                let all_walls = block.iter().all(|&p| grid.kind_at(p) == CellKind::Wall);
                assert!(!all_walls, "2x2 wall block at ({r}, {c}):\n{grid}");
            }
        }
    }
}

#[test]
fn test_fixed_geometry() {
    let level = common::generated(21, 21, 0.2, 5);
    let grid = &level.grid;

    // Door above ghost 1, ghost 3 on the ring above the door, player two rows below the ring.
    assert_eq!(grid.door(), Point::new(8, 10));
    assert_eq!(grid.ghost_spawn(1), Some(Point::new(9, 10)));
    assert_eq!(grid.ghost_spawn(3), Some(Point::new(7, 10)));
    assert_eq!(grid.player_spawn(), Point::new(13, 10));
    assert_eq!(grid.teleports(), Some([Point::new(9, 0), Point::new(9, 20)]));

    for corner in [Point::new(3, 1), Point::new(3, 19), Point::new(17, 1), Point::new(17, 19)] {
        assert_eq!(grid.tile_at(corner), Some(Tile::BigBean), "big bean at {corner}");
    }
}

#[test]
fn test_tunnel_wraps() {
    let level = common::generated(21, 21, 0.2, 8);
    let grid = &level.grid;
    let [west, east] = grid.teleports().unwrap();
    assert_eq!(grid.step(west, eatman::map::Direction::Left), Some(east));
    assert_eq!(grid.step(east, eatman::map::Direction::Right), Some(west));
}

#[test]
fn test_same_seed_same_maze() {
    let a = common::generated(17, 17, 0.25, 31337);
    let b = common::generated(17, 17, 0.25, 31337);
    assert_eq!(a.to_level_text(), b.to_level_text());
}

#[test]
fn test_generated_text_round_trips() {
    let level = common::generated(15, 15, 0.2, 77);
    let reparsed = common::parse(&level.to_level_text());
    assert_eq!(reparsed, level);
}

#[test]
fn test_rejects_bad_config() {
    let base = GeneratorConfig::default();
    let cases = [
        (GeneratorConfig { rows: 11, ..base }, "too small"),
        (GeneratorConfig { cols: 16, ..base }, "even"),
        (GeneratorConfig { fill_ratio: 1.0, ..base }, "fill ratio"),
        (GeneratorConfig { max_attempts: 0, ..base }, "attempts"),
    ];
    for (config, label) in cases {
        assert!(MazeGenerator::new(config).is_err(), "{label} should be rejected");
    }
    assert!(matches!(
        MazeGenerator::new(GeneratorConfig { rows: 11, ..base }),
        Err(ConfigError::TooSmall { rows: 11, .. })
    ));
}

#[test]
fn test_generate_seeded_is_one_attempt() {
    let generator = MazeGenerator::new(GeneratorConfig::default()).unwrap();
    // A single attempt either succeeds with a connected maze or fails in a retryable way.
    for seed in 0..10 {
        match generator.generate_seeded(seed) {
            Ok(level) => assert!(level.grid.is_connected(Traversal::Homebound)),
            Err(GameError::Generation(error)) => assert!(error.is_retryable(), "seed {seed}: {error}"),
            Err(other) => panic!("seed {seed}: unexpected error {other}"),
        }
    }
}
