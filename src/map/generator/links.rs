//! Random wall linking.
//!
//! A link walls off the passage between two anchors two cells apart. Anchors are
//! drawn from pools bucketed by how many links they already have, least linked first.

use pathfinding::prelude::bfs_reach;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::constants::LINK_ITERATIONS_PER_ANCHOR;
use crate::error::GenerationError;
use crate::map::direction::Direction;
use crate::map::generator::lattice::Lattice;
use crate::map::point::Point;
use crate::map::tile::Tile;

/// Direction strings of wall chains that bend back on themselves.
const U_TURNS: [&str; 8] = ["urd", "uld", "lur", "ldr", "dru", "dlu", "rdl", "rul"];

/// The set of directions an anchor is linked in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallLink(u8);

impl WallLink {
    pub fn insert(&mut self, direction: Direction) {
        self.0 |= 1 << direction.as_usize();
    }

    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !(1 << direction.as_usize());
    }

    pub fn contains(self, direction: Direction) -> bool {
        self.0 & (1 << direction.as_usize()) != 0
    }

    pub fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::DIRECTIONS.into_iter().filter(move |&d| self.contains(d))
    }
}

fn two_steps(p: Point, direction: Direction) -> Point {
    p.step(direction).step(direction)
}

struct Linker<'a> {
    lattice: &'a mut Lattice,
    links: Vec<WallLink>,
    pools: [Vec<Point>; 4],
}

/// Builds links until the fill ratio is exceeded and no unlinked anchor remains.
///
/// Returns the number of links built.
pub fn link_walls<R: Rng>(lattice: &mut Lattice, fill_ratio: f64, seed: u64, rng: &mut R) -> Result<usize, GenerationError> {
    let anchors = lattice.interior_anchors();
    let max_links = lattice.max_links();
    let required = (fill_ratio * max_links as f64).floor() as usize + 1;
    let budget = anchors.len() * LINK_ITERATIONS_PER_ANCHOR;
    let links = vec![WallLink::default(); lattice.rows() * lattice.cols()];

    let mut linker = Linker {
        lattice,
        links,
        pools: [anchors, Vec::new(), Vec::new(), Vec::new()],
    };

    let mut built = 0;
    let mut iterations = 0;
    for level in 0..4 {
        while let Some(&source) = linker.pools[level].choose(rng) {
            iterations += 1;
            if iterations > budget {
                debug!(seed, built, required, "Linking budget exhausted");
                return Err(GenerationError::Stalled { seed, built, required });
            }

            let Some(direction) = linker.pick_direction(source, rng) else {
                trace!(seed, anchor = %source, "Anchor abandoned");
                linker.take_from_pool(level, source);
                continue;
            };

            linker.build(source, direction);
            built += 1;

            if built as f64 / max_links as f64 > fill_ratio && linker.pools[0].is_empty() {
                debug!(seed, built, max_links, iterations, "Linking complete");
                return Ok(built);
            }
        }
    }

    debug!(seed, built, required, "Ran out of anchors before reaching the fill ratio");
    Err(GenerationError::Stalled { seed, built, required })
}

impl Linker<'_> {
    fn link(&self, p: Point) -> WallLink {
        self.lattice.index_of(p).map(|i| self.links[i]).unwrap_or_default()
    }

    fn link_mut(&mut self, p: Point) -> Option<&mut WallLink> {
        self.lattice.index_of(p).map(|i| &mut self.links[i])
    }

    fn take_from_pool(&mut self, level: usize, p: Point) -> bool {
        match self.pools[level].iter().position(|&q| q == p) {
            Some(i) => {
                self.pools[level].swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Walls the passage from `source` toward `direction` and moves both anchors up a pool.
    fn build(&mut self, source: Point, direction: Direction) {
        let target = two_steps(source, direction);
        self.lattice.set(source.step(direction), Tile::Wall);

        for (anchor, toward) in [(source, direction), (target, direction.opposite())] {
            let before = self.link(anchor).count();
            if let Some(link) = self.link_mut(anchor) {
                link.insert(toward);
            }
            // Abandoned anchors and border anchors are in no pool and stay out.
            if before < 4 && self.take_from_pool(before, anchor) && before + 1 < 4 {
                self.pools[before + 1].push(anchor);
            }
        }
    }

    /// Shuffles the cheaply legal directions and returns the first that passes every rule.
    fn pick_direction<R: Rng>(&mut self, source: Point, rng: &mut R) -> Option<Direction> {
        let mut options: SmallVec<[Direction; 4]> = Direction::DIRECTIONS
            .into_iter()
            .filter(|&d| self.is_candidate(source, d))
            .collect();
        options.shuffle(rng);

        options
            .into_iter()
            .find(|&d| !self.closes_region(source, d) && !self.forms_u_turn(source, d))
    }

    /// Target is a wall anchor, the passage is open and free, no neighboring open
    /// cell would end up with three walls, and no 2x2 wall block would form.
    fn is_candidate(&self, source: Point, direction: Direction) -> bool {
        let target = two_steps(source, direction);
        let passage = source.step(direction);

        if self.lattice.tile(target) != Some(Tile::Wall) {
            return false;
        }
        if self.lattice.tile(passage) != Some(Tile::Bean) || self.lattice.is_fixed(passage) {
            return false;
        }

        let sides = if direction.is_horizontal() {
            [Direction::Up, Direction::Down]
        } else {
            [Direction::Left, Direction::Right]
        };
        if sides
            .iter()
            .any(|&side| self.lattice.blocked_neighbors(passage.step(side)) >= 2)
        {
            return false;
        }

        !self.lattice.completes_wall_block(passage)
    }

    /// Whether source and target already belong to the same wall structure, so
    /// that linking them would enclose a region.
    fn closes_region(&self, source: Point, direction: Direction) -> bool {
        let target = two_steps(source, direction);
        let lattice = &*self.lattice;
        bfs_reach(source, |&p| {
            Direction::DIRECTIONS
                .into_iter()
                .map(move |d| p.step(d))
                .filter(|&n| lattice.is_wall(n))
                .collect::<SmallVec<[Point; 4]>>()
        })
        .any(|p| p == target)
    }

    /// Whether the wall chain through the new link bends into a U, or bends at all
    /// while touching the outer border.
    fn forms_u_turn(&mut self, source: Point, direction: Direction) -> bool {
        let target = two_steps(source, direction);
        if let Some(link) = self.link_mut(source) {
            link.insert(direction);
        }
        if let Some(link) = self.link_mut(target) {
            link.insert(direction.opposite());
        }

        let (back, source_end) = self.walk(source, direction.opposite());
        let (ahead, target_end) = self.walk(target, direction);

        if let Some(link) = self.link_mut(source) {
            link.remove(direction);
        }
        if let Some(link) = self.link_mut(target) {
            link.remove(direction.opposite());
        }

        let mut chain: Vec<Direction> = back.iter().rev().map(|d| d.opposite()).collect();
        chain.push(direction);
        chain.extend(ahead);
        chain.dedup();
        let shape: String = chain.iter().map(|d| d.as_char()).collect();

        let touches_border = self.lattice.is_border(source_end) || self.lattice.is_border(target_end);
        (touches_border && shape.len() >= 2) || U_TURNS.iter().any(|u| shape.contains(u))
    }

    /// Follows the chain from `start`, entered by moving `heading`, until an anchor
    /// that is on the border or does not have exactly two links.
    fn walk(&self, start: Point, heading: Direction) -> (Vec<Direction>, Point) {
        let mut steps = Vec::new();
        let mut current = start;
        let mut heading = heading;
        let limit = self.lattice.rows() * self.lattice.cols();

        while steps.len() < limit {
            let link = self.link(current);
            if self.lattice.is_border(current) || link.count() != 2 {
                break;
            }
            let Some(next) = link.iter().find(|&d| d != heading.opposite()) else {
                break;
            };
            steps.push(next);
            current = two_steps(current, next);
            heading = next;
        }
        (steps, current)
    }
}
