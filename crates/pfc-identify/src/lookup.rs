//! Identity code to display name.
//!
//! Non-convergent population reports and the rule editors show names,
//! not codes; these helpers walk the identity indexes to the canonical
//! record and return its natural key.

use crate::aliased::Aliased;
use crate::resolve::canonical_entity;
use crate::resolve::canonical_person;
use pfc_core::*;
use pfc_store::Store;

/// Natural key of the identified person with identity `code`.
pub fn player_name_from_identity<S: Store>(store: &S, code: &str) -> Outcome<Option<String>> {
    Ok(canonical_person(store, code)?.map(|(_, player)| player.alias_index_key()))
}

/// Plain display name of the identified person with identity `code`.
pub fn player_display_name<S: Store>(store: &S, code: &str) -> Outcome<Option<String>> {
    Ok(canonical_person(store, code)?.and_then(|(_, player)| player.name))
}

/// Natural key of the canonical entity record with identity `code`.
pub fn entity_name_from_identity<T: Aliased, S: Store>(
    store: &S,
    code: &str,
) -> Outcome<Option<String>> {
    Ok(canonical_entity::<T, S>(store, code)?.map(|(_, entity)| entity.natural_key()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::identify_players_as_person;
    use pfc_records::*;
    use pfc_store::MemoryStore;
    use pfc_store::Store;
    use pfc_store::transact;

    #[test]
    fn lookups_follow_the_alias_chain_to_the_canonical_name() {
        let mut store = MemoryStore::new();
        create_identity_records_if_missing(&mut store).unwrap();
        let code = transact(&mut store, |store| {
            allocate_identity(store, PLAYER_IDENTITY_KIND)
        })
        .unwrap();
        let player = Player {
            name: Some("Smith, J".to_string()),
            alias: code.clone(),
            identity: code.clone(),
            ..Player::default()
        };
        let key = transact(&mut store, |store| {
            store.put_record(PLAYER_FILE, &AsPlayer(&player))
        })
        .unwrap();
        assert_eq!(player_display_name(&store, &code).unwrap(), None);
        identify_players_as_person(&mut store, &[], key).unwrap();
        assert_eq!(
            player_display_name(&store, &code).unwrap().as_deref(),
            Some("Smith, J")
        );
        assert_eq!(
            player_name_from_identity(&store, &code).unwrap(),
            Some(player.alias_index_key())
        );
    }

    #[test]
    fn entity_lookup_returns_the_natural_key() {
        let mut store = MemoryStore::new();
        create_identity_records_if_missing(&mut store).unwrap();
        let code = transact(&mut store, |store| {
            allocate_identity(store, TIME_IDENTITY_KIND)
        })
        .unwrap();
        let mut record = TimeControl::from_tag("5400+30");
        record.alias = code.clone();
        record.identity = code.clone();
        transact(&mut store, |store| store.put_record(TIME_FILE, &record)).unwrap();
        assert_eq!(
            entity_name_from_identity::<TimeControl, _>(&store, &code).unwrap(),
            Some(record.alias_index_key())
        );
        assert_eq!(
            entity_name_from_identity::<Mode, _>(&store, &code).unwrap(),
            None
        );
    }
}
