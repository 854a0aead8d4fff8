//! Typed entity records over the store.
//!
//! Each entity packs to a serialized value plus the index terms the store
//! maintains for it. Alias-carrying entities (Player, Event, TimeControl,
//! Mode) share the identity/alias pair: `identity` is fixed at creation,
//! `alias` points at the canonical record of the group.
//!
//! - `schema` — file and index name catalog
//! - `game` — imported PGN game headers
//! - `player` — player occurrences with the dual player/person index views
//! - `event`, `timecontrol`, `mode` — the smaller alias-carrying kinds
//! - `identity` — per-kind monotonic code allocation
//! - `selector` — stored calculation rules

mod event;
mod game;
mod identity;
mod mode;
mod player;
mod schema;
mod selector;
mod timecontrol;

pub use event::*;
pub use game::*;
pub use identity::*;
pub use mode::*;
pub use player::*;
pub use schema::*;
pub use selector::*;
pub use timecontrol::*;

use pfc_core::*;

/// The seven PGN-derived components naming one player occurrence:
/// (name, event, event date, section, stage, team, fide id).
pub type PlayerTuple = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(raw: &str, what: &str) -> Outcome<T> {
    serde_json::from_str(raw).or_else(|error| corrupt(format!("{what}: {error}")))
}

pub(crate) fn encode_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).expect("serialize record")
}
