use crate::*;
use pfc_core::*;
use pfc_store::IndexTerms;
use pfc_store::Pack;
use serde::Deserialize;
use serde::Serialize;

/// One playing-mode occurrence: the Mode tag value plus the identity
/// pair. Modes distinguish playing conditions such as over-the-board,
/// online, and correspondence.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Mode {
    pub mode: Option<String>,
    pub alias: String,
    pub identity: String,
}

impl Mode {
    pub fn decode(raw: &str) -> Outcome<Self> {
        decode_json(raw, "mode record")
    }

    pub fn from_tag(tag: &str) -> Self {
        Self {
            mode: Some(tag.to_string()),
            alias: String::new(),
            identity: String::new(),
        }
    }

    /// Key for the mode-alias index.
    pub fn alias_index_key(&self) -> String {
        encode_json(&(self.mode.as_deref(),))
    }

    /// Key this mode's games carry in the game index: the raw tag value.
    pub fn game_index_key(&self) -> String {
        self.mode.clone().unwrap_or_default()
    }

    pub fn is_canonical(&self) -> bool {
        self.alias == self.identity
    }
}

impl Pack for Mode {
    fn value(&self) -> String {
        encode_json(self)
    }

    fn index(&self) -> IndexTerms {
        vec![
            (MODE_ALIAS_INDEX, vec![self.alias_index_key()]),
            (MODE_IDENTITY_INDEX, vec![self.alias.clone()]),
        ]
    }
}
