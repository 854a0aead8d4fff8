use crate::*;
use pfc_core::*;
use pfc_store::IndexTerms;
use pfc_store::Pack;
use serde::Deserialize;
use serde::Serialize;

/// One player occurrence: the seven PGN-derived components plus the
/// identity pair.
///
/// `identity` is the code assigned when the record was created and never
/// changes; `alias` is the code of the canonical record this one points
/// at. A record is canonical when the two are equal.
///
/// A player record lives in exactly one of two index families: the
/// player-alias family while unidentified, the person-alias family once
/// identified. The record itself does not know which; the [`AsPlayer`]
/// and [`AsPerson`] views pack the corresponding terms, and editing a
/// record from one view to the other swaps its family.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub name: Option<String>,
    pub event: Option<String>,
    pub eventdate: Option<String>,
    pub section: Option<String>,
    pub stage: Option<String>,
    pub team: Option<String>,
    pub fideid: Option<String>,
    pub alias: String,
    pub identity: String,
}

impl Player {
    pub fn decode(raw: &str) -> Outcome<Self> {
        decode_json(raw, "player record")
    }

    /// Build from a game's player-side key; identity fields stay empty.
    pub fn from_side_key(key: &str) -> Outcome<Self> {
        let tuple: PlayerTuple = decode_json(key, "player-side key")?;
        Ok(Self::from_tuple(tuple))
    }

    pub fn from_tuple(tuple: PlayerTuple) -> Self {
        let (name, event, eventdate, section, stage, team, fideid) = tuple;
        Self {
            name,
            event,
            eventdate,
            section,
            stage,
            team,
            fideid,
            alias: String::new(),
            identity: String::new(),
        }
    }

    pub fn tuple(&self) -> PlayerTuple {
        (
            self.name.clone(),
            self.event.clone(),
            self.eventdate.clone(),
            self.section.clone(),
            self.stage.clone(),
            self.team.clone(),
            self.fideid.clone(),
        )
    }

    /// Key for the player-alias or person-alias index; identical to the
    /// game's player-side key for this occurrence.
    pub fn alias_index_key(&self) -> String {
        encode_json(&(
            self.name.as_deref(),
            self.event.as_deref(),
            self.eventdate.as_deref(),
            self.section.as_deref(),
            self.stage.as_deref(),
            self.team.as_deref(),
            self.fideid.as_deref(),
        ))
    }

    pub fn is_canonical(&self) -> bool {
        self.alias == self.identity
    }
}

/// Index view of a record not yet identified with a person.
pub struct AsPlayer<'a>(pub &'a Player);

impl Pack for AsPlayer<'_> {
    fn value(&self) -> String {
        encode_json(self.0)
    }

    fn index(&self) -> IndexTerms {
        vec![(PLAYER_ALIAS_INDEX, vec![self.0.alias_index_key()])]
    }
}

/// Index view of a record identified with a person.
pub struct AsPerson<'a>(pub &'a Player);

impl Pack for AsPerson<'_> {
    fn value(&self) -> String {
        encode_json(self.0)
    }

    fn index(&self) -> IndexTerms {
        vec![
            (PERSON_ALIAS_INDEX, vec![self.0.alias_index_key()]),
            (PLAYER_IDENTITY_INDEX, vec![self.0.alias.clone()]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfc_store::MemoryStore;
    use pfc_store::Store;

    fn player(name: &str, code: &str) -> Player {
        Player {
            name: Some(name.to_string()),
            event: Some("Open".to_string()),
            alias: code.to_string(),
            identity: code.to_string(),
            ..Player::default()
        }
    }

    #[test]
    fn alias_index_key_matches_game_side_key() {
        let headers = [
            (TAG_WHITE, "Smith, J"),
            (TAG_EVENT, "Open"),
            (TAG_RESULT, "1-0"),
        ]
        .iter()
        .map(|(tag, value)| (tag.to_string(), value.to_string()))
        .collect();
        let game = Game::new("file.pgn", "1", 0, headers);
        let player = Player::from_side_key(&game.white_key()).unwrap();
        assert_eq!(player.alias_index_key(), game.white_key());
        assert_eq!(player.name.as_deref(), Some("Smith, J"));
    }

    #[test]
    fn views_swap_the_index_family() {
        let mut store = MemoryStore::new();
        let record = player("Smith, J", "000000000001");
        store.start_transaction();
        let key = store.put_record(PLAYER_FILE, &AsPlayer(&record)).unwrap();
        store.commit().unwrap();

        let natural = record.alias_index_key();
        assert!(store.recordlist_key(PLAYER_FILE, PLAYER_ALIAS_INDEX, &natural).contains(key));
        assert!(store.recordlist_key(PLAYER_FILE, PERSON_ALIAS_INDEX, &natural).is_empty());

        store.start_transaction();
        store
            .edit_record(PLAYER_FILE, key, &AsPlayer(&record), &AsPerson(&record))
            .unwrap();
        store.commit().unwrap();

        assert!(store.recordlist_key(PLAYER_FILE, PLAYER_ALIAS_INDEX, &natural).is_empty());
        assert!(store.recordlist_key(PLAYER_FILE, PERSON_ALIAS_INDEX, &natural).contains(key));
        assert!(
            store
                .recordlist_key(PLAYER_FILE, PLAYER_IDENTITY_INDEX, &record.alias)
                .contains(key)
        );
    }
}
