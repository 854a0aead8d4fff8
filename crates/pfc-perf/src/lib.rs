//! Iterative performance calculation.
//!
//! Each convergent population carries one [`Person`] per player with the
//! signed reward of its results and the list of canonical opponents, one
//! entry per game. Iteration repeatedly replaces every performance with
//! (sum of opponents' performances + reward) / games until successive
//! values are stable under a tolerance.
//!
//! - `person` — per-player calculation state
//! - `population` — population initialisation and the iteration loop
//! - `calculate` — rule-to-report driver over the store

mod calculate;
mod person;
mod population;

pub use calculate::*;
pub use person::*;
pub use population::*;
