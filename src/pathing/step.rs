//! Single-step steering: greedy toward a target, or random.

use rand::seq::IndexedRandom;
use rand::Rng;
use smallvec::SmallVec;

use crate::map::direction::Direction;
use crate::map::grid::{NavigationGrid, Traversal};
use crate::map::point::Point;

/// Legal moves from `pos` in steering order, with the reversal toward `came_from`
/// left out unless it is the only legal move.
fn forward_options(
    grid: &NavigationGrid,
    pos: Point,
    came_from: Option<Direction>,
    traversal: Traversal,
) -> SmallVec<[Direction; 4]> {
    let legal: SmallVec<[Direction; 4]> = Direction::STEERING_ORDER
        .into_iter()
        .filter(|&d| grid.can_move(pos, d, traversal))
        .collect();
    let forward: SmallVec<[Direction; 4]> = legal.iter().copied().filter(|&d| Some(d) != came_from).collect();
    if forward.is_empty() {
        legal
    } else {
        forward
    }
}

/// The legal move whose destination is closest to `target`, ties going to the
/// earlier direction in Up, Left, Down, Right order.
///
/// `came_from` points back at the previous cell and is only taken at dead ends.
pub fn greedy_step(
    grid: &NavigationGrid,
    pos: Point,
    came_from: Option<Direction>,
    target: Point,
    traversal: Traversal,
) -> Option<Direction> {
    forward_options(grid, pos, came_from, traversal)
        .into_iter()
        .filter_map(|d| grid.step(pos, d).map(|next| (d, next.distance_squared(target))))
        .min_by_key(|&(_, distance)| distance)
        .map(|(d, _)| d)
}

/// A uniformly random legal move, reversing only at dead ends.
pub fn random_step<R: Rng + ?Sized>(
    grid: &NavigationGrid,
    pos: Point,
    came_from: Option<Direction>,
    traversal: Traversal,
    rng: &mut R,
) -> Option<Direction> {
    forward_options(grid, pos, came_from, traversal).choose(rng).copied()
}
