use eatman::error::PathError;
use eatman::map::direction::Direction;
use eatman::map::grid::Traversal;
use eatman::map::point::Point;
use eatman::pathing::{greedy_step, random_step, shortest_path, PlannedRoute};
use pretty_assertions::assert_eq;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use speculoos::prelude::*;

mod common;

#[test]
fn test_straight_corridor() {
    let level = common::parse(common::CORRIDOR);
    let route = shortest_path(&level.grid, Point::new(1, 1), Point::new(1, 5), Traversal::Ghost).unwrap();
    assert_eq!(route, vec![Direction::Right; 4]);
}

#[test]
fn test_route_length_matches_bfs() {
    let level = common::generated(21, 21, 0.2, 4);
    let grid = &level.grid;
    let cells: Vec<Point> = grid.open_cells(Traversal::Ghost).collect();
    let start = grid.player_spawn();

    for &goal in cells.iter().step_by(7) {
        let expected = common::bfs_distance(grid, start, goal, Traversal::Ghost);
        let route = shortest_path(grid, start, goal, Traversal::Ghost);
        match expected {
            Some(moves) => assert_eq!(route.map(|r| r.len()).ok(), Some(moves), "from {start} to {goal}"),
            None => assert!(matches!(route, Err(PathError::Unreachable { .. })), "{goal} should be unreachable"),
        }
    }
}

#[test]
fn test_route_follows_legal_moves() {
    let level = common::generated(15, 15, 0.15, 12);
    let grid = &level.grid;
    let start = grid.player_spawn();
    let goal = grid.ghost_spawn(3).unwrap();

    let route = shortest_path(grid, start, goal, Traversal::Ghost).unwrap();
    let mut at = start;
    for direction in route {
        assert!(grid.can_move(at, direction, Traversal::Ghost), "illegal {direction:?} from {at}");
        at = grid.step(at, direction).unwrap();
    }
    assert_eq!(at, goal);
}

#[test]
fn test_chamber_unreachable_for_ghost_traversal() {
    let level = common::parse(common::PEN);
    let grid = &level.grid;
    let inside = grid.ghost_spawn(1).unwrap();

    let result = shortest_path(grid, grid.player_spawn(), inside, Traversal::Ghost);
    assert!(matches!(result, Err(PathError::Unreachable { .. })));
    // Through the door it is a short walk.
    let homebound = shortest_path(grid, grid.player_spawn(), inside, Traversal::Homebound).unwrap();
    assert_that(&homebound.len()).is_equal_to(common::bfs_distance(grid, grid.player_spawn(), inside, Traversal::Homebound).unwrap());
}

#[test]
fn test_greedy_never_enters_walls_or_reverses() {
    let level = common::generated(21, 21, 0.2, 6);
    let grid = &level.grid;
    let targets = [Point::new(0, 0), Point::new(10, 10), Point::new(-3, 25), grid.player_spawn()];

    for pos in grid.open_cells(Traversal::Ghost) {
        for came_from in Direction::DIRECTIONS {
            for target in targets {
                let Some(step) = greedy_step(grid, pos, Some(came_from), target, Traversal::Ghost) else {
                    continue;
                };
                assert!(grid.can_move(pos, step, Traversal::Ghost), "greedy walked into a wall at {pos}");
                if step == came_from {
                    let others = Direction::DIRECTIONS
                        .into_iter()
                        .filter(|&d| d != came_from && grid.can_move(pos, d, Traversal::Ghost))
                        .count();
                    assert_eq!(others, 0, "greedy reversed at {pos} with other options");
                }
            }
        }
    }
}

#[test]
fn test_random_walk_stays_on_open_cells() {
    let level = common::generated(15, 15, 0.15, 3);
    let grid = &level.grid;
    let mut rng = SmallRng::seed_from_u64(11);
    let mut pos = grid.player_spawn();
    let mut facing = Direction::Left;

    for _ in 0..500 {
        let step = random_step(grid, pos, Some(facing.opposite()), Traversal::Ghost, &mut rng)
            .expect("connected mazes have no isolated cells");
        pos = grid.step(pos, step).unwrap();
        facing = step;
        assert!(grid.is_traversable(pos, Traversal::Ghost));
    }
}

#[test]
fn test_planned_route_replans_when_target_moves_away() {
    let level = common::parse(common::CORRIDOR);
    let grid = &level.grid;
    let mut route = PlannedRoute::plan(grid, Point::new(1, 1), Point::new(1, 5), Traversal::Ghost).unwrap();

    assert!(!route.is_stale(Point::new(1, 5), Point::new(1, 1)));
    assert_eq!(route.next_step(), Some(Direction::Right));
    // Target moved, agent is far from the planned end and still on its row.
    assert!(!route.is_stale(Point::new(1, 4), Point::new(1, 2)));
    // Target left both axes of the plan.
    assert!(route.is_stale(Point::new(3, 3), Point::new(1, 2)));
}

/// Two six-move routes around a block between the player spawn and the far corner.
const TWIN_ROUTES: &str = "\
*******
*e....*
*.***.*
*.....*
***=***
***0***
*******
";

#[test]
fn test_equal_routes_break_ties_by_expansion_order() {
    let level = common::parse(TWIN_ROUTES);
    let grid = &level.grid;
    let (near, far) = (Point::new(1, 1), Point::new(3, 5));

    let route = shortest_path(grid, near, far, Traversal::Ghost).unwrap();
    assert_eq!(
        route,
        vec![
            Direction::Right,
            Direction::Right,
            Direction::Right,
            Direction::Right,
            Direction::Down,
            Direction::Down,
        ]
    );

    let back = shortest_path(grid, far, near, Traversal::Ghost).unwrap();
    assert_eq!(
        back,
        vec![
            Direction::Left,
            Direction::Left,
            Direction::Left,
            Direction::Left,
            Direction::Up,
            Direction::Up,
        ]
    );
}
