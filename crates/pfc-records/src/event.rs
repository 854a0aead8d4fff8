use crate::*;
use pfc_core::*;
use pfc_store::IndexTerms;
use pfc_store::Pack;
use serde::Deserialize;
use serde::Serialize;

/// One event occurrence: (event, event date, section, stage) plus the
/// identity pair. Same alias state machine as [`Player`], with a single
/// natural-key index.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Event {
    pub event: Option<String>,
    pub eventdate: Option<String>,
    pub section: Option<String>,
    pub stage: Option<String>,
    pub alias: String,
    pub identity: String,
}

impl Event {
    pub fn decode(raw: &str) -> Outcome<Self> {
        decode_json(raw, "event record")
    }

    /// Build from a game's event key; identity fields stay empty.
    pub fn from_event_key(key: &str) -> Outcome<Self> {
        type EventTuple = (
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
        );
        let (event, eventdate, section, stage): EventTuple = decode_json(key, "event key")?;
        Ok(Self {
            event,
            eventdate,
            section,
            stage,
            alias: String::new(),
            identity: String::new(),
        })
    }

    /// Key for the event-alias index; identical to the game's event key.
    pub fn alias_index_key(&self) -> String {
        encode_json(&(
            self.event.as_deref(),
            self.eventdate.as_deref(),
            self.section.as_deref(),
            self.stage.as_deref(),
        ))
    }

    /// Key this event's games carry in the game-event index.
    pub fn game_index_key(&self) -> String {
        self.alias_index_key()
    }

    pub fn is_canonical(&self) -> bool {
        self.alias == self.identity
    }
}

impl Pack for Event {
    fn value(&self) -> String {
        encode_json(self)
    }

    fn index(&self) -> IndexTerms {
        vec![
            (EVENT_ALIAS_INDEX, vec![self.alias_index_key()]),
            (EVENT_IDENTITY_INDEX, vec![self.alias.clone()]),
        ]
    }
}
