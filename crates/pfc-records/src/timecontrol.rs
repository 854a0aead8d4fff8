use crate::*;
use pfc_core::*;
use pfc_store::IndexTerms;
use pfc_store::Pack;
use serde::Deserialize;
use serde::Serialize;

/// One time-control occurrence: the TimeControl tag value plus the
/// identity pair.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TimeControl {
    pub timecontrol: Option<String>,
    pub alias: String,
    pub identity: String,
}

impl TimeControl {
    pub fn decode(raw: &str) -> Outcome<Self> {
        decode_json(raw, "time control record")
    }

    pub fn from_tag(tag: &str) -> Self {
        Self {
            timecontrol: Some(tag.to_string()),
            alias: String::new(),
            identity: String::new(),
        }
    }

    /// Key for the time-alias index.
    pub fn alias_index_key(&self) -> String {
        encode_json(&(self.timecontrol.as_deref(),))
    }

    /// Key this time control's games carry in the game index: the raw
    /// tag value, not the tupled natural key.
    pub fn game_index_key(&self) -> String {
        self.timecontrol.clone().unwrap_or_default()
    }

    pub fn is_canonical(&self) -> bool {
        self.alias == self.identity
    }
}

impl Pack for TimeControl {
    fn value(&self) -> String {
        encode_json(self)
    }

    fn index(&self) -> IndexTerms {
        vec![
            (TIME_ALIAS_INDEX, vec![self.alias_index_key()]),
            (TIME_IDENTITY_INDEX, vec![self.alias.clone()]),
        ]
    }
}
