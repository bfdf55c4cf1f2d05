pub mod astar;

pub use astar::{plan, PLANNER_MAX_EXPANSIONS};
