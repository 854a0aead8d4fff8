use crate::aliased::Aliased;
use pfc_core::*;
use pfc_records::*;
use pfc_store::RecordList;
use pfc_store::Store;

/// Load and decode one player record.
pub fn load_player<S: Store>(store: &S, key: Key) -> Outcome<Player> {
    match store.get_primary_record(PLAYER_FILE, key) {
        Some(raw) => Player::decode(raw),
        None => corrupt(format!("player record {key} does not exist")),
    }
}

/// Canonical record of the identified person with identity `code`.
///
/// Walks the player-identity index for the group and picks the member
/// whose own identity is the group code. None if no such person exists.
pub fn canonical_person<S: Store>(store: &S, code: &str) -> Outcome<Option<(Key, Player)>> {
    for key in store
        .recordlist_key(PLAYER_FILE, PLAYER_IDENTITY_INDEX, code)
        .iter()
    {
        let player = load_player(store, key)?;
        if player.identity == code {
            return Ok(Some((key, player)));
        }
    }
    Ok(None)
}

/// Resolve a game's player-side key to its canonical player record,
/// following the alias chain once more when the occurrence is itself an
/// alias. None if no player record carries the key.
pub fn canonical_player<S: Store>(store: &S, side_key: &str) -> Outcome<Option<(Key, Player)>> {
    if let Some(key) = store
        .recordlist_key(PLAYER_FILE, PERSON_ALIAS_INDEX, side_key)
        .first()
    {
        let player = load_player(store, key)?;
        if player.is_canonical() {
            return Ok(Some((key, player)));
        }
        return canonical_person(store, &player.alias);
    }
    if let Some(key) = store
        .recordlist_key(PLAYER_FILE, PLAYER_ALIAS_INDEX, side_key)
        .first()
    {
        // Unidentified records are canonical by the closure invariant.
        return Ok(Some((key, load_player(store, key)?)));
    }
    Ok(None)
}

/// All games carrying any of the player's alias keys.
///
/// An identified person may appear under several occurrence records; the
/// games of the person are the union of the side-key lookups over the
/// whole alias group.
pub fn person_games<S: Store>(store: &S, player: &Player) -> Outcome<RecordList> {
    let group = store.recordlist_key(PLAYER_FILE, PLAYER_IDENTITY_INDEX, &player.alias);
    let mut games = store.recordlist_nil(GAME_FILE);
    if group.is_empty() {
        games |= &store.recordlist_key(GAME_FILE, GAME_PLAYER_INDEX, &player.alias_index_key());
    } else {
        for key in group.iter() {
            let member = load_player(store, key)?;
            games |=
                &store.recordlist_key(GAME_FILE, GAME_PLAYER_INDEX, &member.alias_index_key());
        }
    }
    Ok(games)
}

/// Canonical record of the entity group with identity `code`.
pub fn canonical_entity<T: Aliased, S: Store>(
    store: &S,
    code: &str,
) -> Outcome<Option<(Key, T)>> {
    for key in store
        .recordlist_key(T::FILE, T::IDENTITY_INDEX, code)
        .iter()
    {
        let entity = crate::aliased::load::<T, S>(store, key)?;
        if entity.identity() == code {
            return Ok(Some((key, entity)));
        }
    }
    Ok(None)
}

/// Every record in the entity group with alias `code`, the canonical
/// record included.
pub fn entity_group<T: Aliased, S: Store>(store: &S, code: &str) -> RecordList {
    store.recordlist_key(T::FILE, T::IDENTITY_INDEX, code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::identify_players_as_person;
    use pfc_store::MemoryStore;
    use pfc_store::transact;

    fn seed_player(store: &mut MemoryStore, name: &str) -> (Key, Player) {
        let code = transact(store, |store| {
            allocate_identity(store, PLAYER_IDENTITY_KIND)
        })
        .unwrap();
        let player = Player {
            name: Some(name.to_string()),
            alias: code.clone(),
            identity: code,
            ..Player::default()
        };
        let key = transact(store, |store| {
            store.put_record(PLAYER_FILE, &AsPlayer(&player))
        })
        .unwrap();
        (key, player)
    }

    #[test]
    fn side_keys_resolve_through_the_alias_chain() {
        let mut store = MemoryStore::new();
        create_identity_records_if_missing(&mut store).unwrap();
        let (smith, smith_record) = seed_player(&mut store, "Smith, J");
        let (alias, alias_record) = seed_player(&mut store, "J Smith");

        // Unidentified records resolve to themselves.
        let (key, _) = canonical_player(&store, &alias_record.alias_index_key())
            .unwrap()
            .expect("alias record resolves");
        assert_eq!(key, alias);

        identify_players_as_person(&mut store, &[alias], smith).unwrap();
        let (key, player) = canonical_player(&store, &alias_record.alias_index_key())
            .unwrap()
            .expect("alias resolves to canonical");
        assert_eq!(key, smith);
        assert_eq!(player.identity, smith_record.identity);
        assert!(canonical_player(&store, "[\"nobody\"]").unwrap().is_none());
    }

    #[test]
    fn person_games_union_covers_the_alias_group() {
        let mut store = MemoryStore::new();
        create_identity_records_if_missing(&mut store).unwrap();
        let (smith, smith_record) = seed_player(&mut store, "Smith, J");
        let (alias, alias_record) = seed_player(&mut store, "J Smith");
        // One game under each occurrence key.
        transact(&mut store, |store| {
            for (number, record) in [&smith_record, &alias_record].iter().enumerate() {
                let mut headers = std::collections::BTreeMap::new();
                headers.insert(TAG_WHITE.to_string(), record.name.clone().unwrap());
                headers.insert(TAG_RESULT.to_string(), "1-0".to_string());
                let game = Game::new("f.pgn", &(number + 1).to_string(), 0, headers);
                store.put_record(GAME_FILE, &game)?;
            }
            Ok(())
        })
        .unwrap();
        identify_players_as_person(&mut store, &[alias], smith).unwrap();
        let canonical = load_player(&store, smith).unwrap();
        assert_eq!(person_games(&store, &canonical).unwrap().count_records(), 2);
    }
}
