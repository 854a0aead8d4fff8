use crate::*;
use pfc_core::*;
use pfc_store::IndexTerms;
use pfc_store::Pack;
use serde::Deserialize;
use serde::Serialize;

/// Stored calculation rule.
///
/// Exactly one of `person_identity` and `event_identities` is given:
/// either the population grows outward from one person, or it is drawn
/// from a list of events. Dates are both present or both absent and are
/// held in `YYYY.MM.DD` form.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Rule {
    pub name: String,
    pub person_identity: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub time_control_identity: Option<String>,
    pub mode_identity: Option<String>,
    pub event_identities: Vec<String>,
}

impl Rule {
    pub fn decode(raw: &str) -> Outcome<Self> {
        decode_json(raw, "selector rule record")
    }

    /// True if the rule expands the population outward from one person.
    pub fn deduces_player_population(&self) -> bool {
        self.person_identity.is_some()
    }

    /// Refuse malformed rules before any store work.
    pub fn verify(&self) -> Outcome<()> {
        if self.name.is_empty() {
            return refused("calculation rule has no name");
        }
        match (&self.person_identity, self.event_identities.is_empty()) {
            (Some(_), true) | (None, false) => {}
            (Some(_), false) => {
                return refused("rule names both a player identity and an event list");
            }
            (None, true) => {
                return refused("rule names neither a player identity nor an event list");
            }
        }
        if self.from_date.is_some() != self.to_date.is_some() {
            return refused("rule dates must both be present or both be absent");
        }
        Ok(())
    }
}

impl Pack for Rule {
    fn value(&self) -> String {
        encode_json(self)
    }

    fn index(&self) -> IndexTerms {
        vec![(RULE_NAME_INDEX, vec![self.name.clone()])]
    }
}
