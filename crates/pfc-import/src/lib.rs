//! PGN header import.
//!
//! Walks a directory tree for `.pgn` files, extracts tag-pair headers one
//! game at a time, and inserts game records with their selection indexes.
//! Derived-entity passes then populate the Player, Event, TimeControl,
//! and Mode files by dedup over the game indexes. Bulk passes commit in
//! segments so a crash or cancellation loses at most the in-flight
//! segment.
//!
//! - `scanner` — tag-pair extraction with byte offsets
//! - `encoding` — UTF-8 with Latin-1 fallback
//! - `importer` — game import and counting over a directory tree
//! - `derive` — dedup passes from game indexes to entity files

mod derive;
mod encoding;
mod importer;
mod scanner;

pub use derive::*;
pub use encoding::*;
pub use importer::*;
pub use scanner::*;
