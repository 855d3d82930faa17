//! Path selection for ghosts: full shortest-path search, greedy single steps and random walks.

pub mod astar;
pub mod route;
pub mod step;

pub use astar::{shortest_path, Route};
pub use route::PlannedRoute;
pub use step::{greedy_step, random_step};
