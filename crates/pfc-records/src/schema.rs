//! File and index name catalog.
//!
//! Every store access names its file and index from here; the strings are
//! also the table names inside a snapshot.

// Game file: immutable imported PGN headers.
pub const GAME_FILE: &str = "game";
pub const GAME_PGNFILE_INDEX: &str = "gamepgnfile";
pub const GAME_NUMBER_INDEX: &str = "gamenumber";
pub const GAME_DATE_INDEX: &str = "gamedate";
pub const GAME_TIMECONTROL_INDEX: &str = "gametimecontrol";
pub const GAME_MODE_INDEX: &str = "gamemode";
/// Player-side keys, two per game (one per colour).
pub const GAME_PLAYER_INDEX: &str = "gameplayer";
pub const GAME_EVENT_INDEX: &str = "gameevent";

// Player file: one record per player occurrence.
pub const PLAYER_FILE: &str = "player";
/// Natural key of records not yet identified with a person.
pub const PLAYER_ALIAS_INDEX: &str = "playeralias";
/// Natural key of records identified with a person.
pub const PERSON_ALIAS_INDEX: &str = "personalias";
/// Alias code of identified records; walks all aliases of a person.
pub const PLAYER_IDENTITY_INDEX: &str = "playeridentity";

pub const EVENT_FILE: &str = "event";
pub const EVENT_ALIAS_INDEX: &str = "eventalias";
pub const EVENT_IDENTITY_INDEX: &str = "eventidentity";

pub const TIME_FILE: &str = "time";
pub const TIME_ALIAS_INDEX: &str = "timealias";
pub const TIME_IDENTITY_INDEX: &str = "timeidentity";

pub const MODE_FILE: &str = "mode";
pub const MODE_ALIAS_INDEX: &str = "modealias";
pub const MODE_IDENTITY_INDEX: &str = "modeidentity";

// Identity file: one counter record per entity kind.
pub const IDENTITY_FILE: &str = "identity";
pub const IDENTITY_KIND_INDEX: &str = "identitykind";

// Selection file: stored calculation rules.
pub const SELECTION_FILE: &str = "selection";
pub const RULE_NAME_INDEX: &str = "rulename";
