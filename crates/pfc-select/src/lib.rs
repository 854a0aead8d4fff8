//! Calculation rules and the selection pipeline.
//!
//! A rule names either one person or a list of events, with optional
//! date, time-control, and mode filters. Evaluation intersects the four
//! game filters into `selected_games`, then derives the implicated
//! players and partitions them into connected populations over opponent
//! edges. Each population is checked for convergence before any
//! iteration runs.
//!
//! - `dates` — permissive date parsing to `YYYY.MM.DD`
//! - `rules` — stored-rule insert/update/delete with stale-read checks
//! - `selection` — game filters and the two population paths
//! - `convergence` — opponent graph, tree and 3-cycle tests

mod convergence;
mod dates;
#[cfg(test)]
mod fixtures;
mod rules;
mod selection;

pub use convergence::*;
pub use dates::*;
pub use rules::*;
pub use selection::*;
