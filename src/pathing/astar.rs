//! Shortest path search over the navigation grid.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::constants::STEP_COST;
use crate::error::PathError;
use crate::map::direction::Direction;
use crate::map::grid::{NavigationGrid, Traversal};
use crate::map::point::Point;

/// A sequence of single-cell moves.
pub type Route = Vec<Direction>;

/// Expansion order for neighbors of the current node.
const EXPANSION_ORDER: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

#[derive(Debug, Clone, Copy)]
struct SearchNode {
    g: u32,
    h: u32,
    /// The node this one was reached from, and the move that reached it.
    parent: Option<(Point, Direction)>,
}

impl SearchNode {
    fn f(&self) -> u32 {
        self.g + self.h
    }
}

/// Manhattan distance in cells, allowing for a shortcut through the tunnel.
fn heuristic(grid: &NavigationGrid, from: Point, goal: Point) -> u32 {
    let direct = from.manhattan(goal);
    let through_tunnel = grid.teleports().map_or(i32::MAX, |[a, b]| {
        let via_a = from.manhattan(a) + 1 + b.manhattan(goal);
        let via_b = from.manhattan(b) + 1 + a.manhattan(goal);
        via_a.min(via_b)
    });
    direct.min(through_tunnel) as u32
}

/// Finds a shortest route from `start` to `goal` with A*.
///
/// Ties between open nodes of equal cost go to the one opened first; a node whose
/// cost improves is moved to the back of the open list. The start cell itself
/// does not need to be enterable.
///
/// # Errors
///
/// Returns [`PathError::Unreachable`] when no route exists.
pub fn shortest_path(
    grid: &NavigationGrid,
    start: Point,
    goal: Point,
    traversal: Traversal,
) -> Result<Route, PathError> {
    let unreachable = PathError::Unreachable { from: start, to: goal };
    if start == goal {
        return Ok(Route::new());
    }
    if !grid.is_traversable(goal, traversal) {
        return Err(unreachable);
    }

    let mut nodes: HashMap<Point, SearchNode> = HashMap::new();
    let mut open: Vec<Point> = vec![start];
    let mut closed: HashSet<Point> = HashSet::new();
    nodes.insert(
        start,
        SearchNode {
            g: 0,
            h: heuristic(grid, start, goal),
            parent: None,
        },
    );

    while !open.is_empty() {
        let mut best = 0;
        let mut best_f = nodes[&open[0]].f();
        for (i, p) in open.iter().enumerate().skip(1) {
            let f = nodes[p].f();
            if f < best_f {
                best = i;
                best_f = f;
            }
        }
        let current = open.remove(best);

        if current == goal {
            return Ok(reconstruct(&nodes, goal));
        }
        closed.insert(current);
        let g = nodes[&current].g + STEP_COST;

        for direction in EXPANSION_ORDER {
            let Some(next) = grid.step(current, direction) else {
                continue;
            };
            if closed.contains(&next) || !grid.is_traversable(next, traversal) {
                continue;
            }

            match nodes.get_mut(&next) {
                Some(node) => {
                    if g < node.g {
                        node.g = g;
                        node.parent = Some((current, direction));
                        if let Some(i) = open.iter().position(|&p| p == next) {
                            open.remove(i);
                        }
                        open.push(next);
                    }
                }
                None => {
                    nodes.insert(
                        next,
                        SearchNode {
                            g,
                            h: heuristic(grid, next, goal),
                            parent: Some((current, direction)),
                        },
                    );
                    open.push(next);
                }
            }
        }
    }

    trace!(from = %start, to = %goal, expanded = closed.len(), "No route found");
    Err(unreachable)
}

fn reconstruct(nodes: &HashMap<Point, SearchNode>, goal: Point) -> Route {
    let mut route = Route::new();
    let mut current = goal;
    while let Some((parent, direction)) = nodes.get(&current).and_then(|n| n.parent) {
        route.push(direction);
        current = parent;
    }
    route.reverse();
    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::parser::LevelParser;

    const ROOM: &str = "\
*********
*e.....0*
*.*****.*
*...=...*
*********
";

    #[test]
    fn test_start_equals_goal() {
        let level = LevelParser::parse(ROOM).unwrap();
        let p = Point::new(1, 1);
        assert_eq!(shortest_path(&level.grid, p, p, Traversal::Ghost), Ok(vec![]));
    }

    #[test]
    fn test_door_only_for_homebound() {
        let level = LevelParser::parse(ROOM).unwrap();
        let door = Point::new(3, 4);
        assert!(shortest_path(&level.grid, Point::new(3, 1), door, Traversal::Ghost).is_err());
        let route = shortest_path(&level.grid, Point::new(3, 1), door, Traversal::Homebound).unwrap();
        assert_eq!(route, vec![Direction::Right; 3]);
    }

    #[test]
    fn test_route_around_block() {
        let level = LevelParser::parse(ROOM).unwrap();
        // Both ways around the block are eight moves.
        let start = Point::new(1, 1);
        let route = shortest_path(&level.grid, start, Point::new(3, 7), Traversal::Homebound).unwrap();
        assert_eq!(route.len(), 8);
        let end = route.iter().fold(start, |p, &d| p.step(d));
        assert_eq!(end, Point::new(3, 7));
    }
}
