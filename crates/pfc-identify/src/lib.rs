//! Alias management across the four entity kinds.
//!
//! Player, Event, TimeControl, and Mode share one identity/alias state
//! machine: `identify` points records at a canonical record, `break` and
//! `split` undo that, `change` moves a group's anchor. One parametric
//! implementation serves the three single-index kinds; players get their
//! own operations because identification also swaps a record between the
//! player-alias and person-alias index families.
//!
//! - `aliased` — capability trait plus the generic four operations
//! - `person` — player-specific operations and identification-by-name
//! - `resolve` — canonical-record resolution through the alias chain
//! - `export` — identity interchange: export, strict import, apply/mirror
//! - `lookup` — identity code to display name

mod aliased;
mod export;
mod lookup;
mod person;
mod resolve;

pub use aliased::*;
pub use export::*;
pub use lookup::*;
pub use person::*;
pub use resolve::*;
