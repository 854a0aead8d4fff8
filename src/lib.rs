//! Iterative chess performance numbers from PGN game headers.
//!
//! Re-exports the workspace crates: storage, records, import, identity
//! management, selection, and the performance calculation itself.

pub use pfc_core::*;
pub use pfc_identify::*;
pub use pfc_import::*;
pub use pfc_perf::*;
pub use pfc_records::*;
pub use pfc_select::*;
pub use pfc_store::*;
