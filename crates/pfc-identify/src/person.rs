use crate::resolve::load_player;
use pfc_core::*;
use pfc_records::*;
use pfc_store::Store;
use pfc_store::transact;

/// True if the record is in the person-alias index family.
fn is_identified<S: Store>(store: &S, key: Key, player: &Player) -> bool {
    store
        .recordlist_key(PLAYER_FILE, PERSON_ALIAS_INDEX, &player.alias_index_key())
        .contains(key)
}

/// Make the bookmarked new players aliases of the identified person.
///
/// If the selection is a new player rather than an identified person it
/// is turned into an identified person first. Each bookmark moves from
/// the player-alias index family to the person-alias family.
pub fn identify_players_as_person<S: Store>(
    store: &mut S,
    bookmarks: &[Key],
    selection: Key,
) -> Outcome<()> {
    transact(store, |store| {
        let person = load_player(store, selection)?;
        if !is_identified(store, selection, &person) {
            store.edit_record(PLAYER_FILE, selection, &AsPlayer(&person), &AsPerson(&person))?;
        }
        for &key in bookmarks {
            // A selection listed among the bookmarks fails this check
            // too: it joined the person-alias family above.
            let record = load_player(store, key)?;
            if is_identified(store, key, &record) {
                return refused(
                    "one of the bookmarked players is already aliased so no changes done",
                );
            }
            let mut changed = record.clone();
            changed.alias = person.alias.clone();
            store.edit_record(PLAYER_FILE, key, &AsPlayer(&record), &AsPerson(&changed))?;
        }
        Ok(())
    })
}

/// Break the bookmarked aliases of the person into new players.
pub fn break_person_into_picked_players<S: Store>(
    store: &mut S,
    bookmarks: &[Key],
    selection: Key,
) -> Outcome<()> {
    transact(store, |store| {
        let person = load_player(store, selection)?;
        if !is_identified(store, selection, &person) || !person.is_canonical() {
            return refused("cannot break: selection is not the identified person");
        }
        for &key in bookmarks {
            if key == selection {
                return refused("cannot break: selection is the identified person");
            }
            let record = load_player(store, key)?;
            if record.alias != person.identity {
                return refused("cannot break: alias identity does not match person");
            }
            let mut changed = record.clone();
            changed.alias = changed.identity.clone();
            store.edit_record(PLAYER_FILE, key, &AsPerson(&record), &AsPlayer(&changed))?;
        }
        Ok(())
    })
}

/// Split every alias of the person into a new player of its own.
pub fn split_person_into_all_players<S: Store>(store: &mut S, selection: Key) -> Outcome<()> {
    transact(store, |store| {
        let person = load_player(store, selection)?;
        if !is_identified(store, selection, &person) || !person.is_canonical() {
            return refused("cannot split: selection is not the identified person");
        }
        let group = store.recordlist_key(PLAYER_FILE, PLAYER_IDENTITY_INDEX, &person.identity);
        for key in group.iter() {
            if key == selection {
                continue;
            }
            let record = load_player(store, key)?;
            if record.alias != person.identity {
                return corrupt("alias is not for identified person");
            }
            let mut changed = record.clone();
            changed.alias = changed.identity.clone();
            store.edit_record(PLAYER_FILE, key, &AsPerson(&record), &AsPlayer(&changed))?;
        }
        Ok(())
    })
}

/// Move the person's anchor to the selection: every alias of the old
/// canonical record, the selection included, is pointed at the
/// selection's identity.
pub fn change_identified_person<S: Store>(store: &mut S, selection: Key) -> Outcome<()> {
    transact(store, |store| {
        let person = load_player(store, selection)?;
        if !is_identified(store, selection, &person) {
            return refused("cannot change: selection is not an identified person");
        }
        if person.is_canonical() {
            return refused("not changed: selection is already the identified person");
        }
        let old_alias = person.alias.clone();
        let new_alias = person.identity.clone();
        let group = store.recordlist_key(PLAYER_FILE, PLAYER_IDENTITY_INDEX, &old_alias);
        if group.is_empty() {
            return corrupt("cannot change: no players with this identity");
        }
        for key in group.iter() {
            let record = load_player(store, key)?;
            if record.alias != old_alias {
                return corrupt("alias is not for identified person");
            }
            let mut changed = record.clone();
            changed.alias = new_alias.clone();
            store.edit_record(PLAYER_FILE, key, &AsPerson(&record), &AsPerson(&changed))?;
        }
        Ok(())
    })
}

/// Comparison form of a player name: casefolded, punctuation stripped,
/// tokens sorted so "Smith, J" and "J Smith" agree.
pub fn normalised_name(name: &str) -> String {
    let mut tokens: Vec<String> = name
        .to_lowercase()
        .replace(['.', ','], " ")
        .split_whitespace()
        .map(str::to_string)
        .collect();
    tokens.sort();
    tokens.join(" ")
}

/// Identify new players whose normalised name matches exactly one
/// identified person. Returns the number of players identified.
pub fn identify_players_by_name<S: Store>(
    store: &mut S,
    reporter: &mut dyn Reporter,
) -> Outcome<usize> {
    use std::collections::BTreeMap;
    // Normalised name -> canonical person key; None marks an ambiguous
    // name that must not be matched.
    let mut persons: BTreeMap<String, Option<Key>> = BTreeMap::new();
    for (_, key) in store.index_cursor(PLAYER_FILE, PERSON_ALIAS_INDEX) {
        let player = load_player(store, key)?;
        if !player.is_canonical() {
            continue;
        }
        let Some(name) = player.name.as_deref() else {
            continue;
        };
        persons
            .entry(normalised_name(name))
            .and_modify(|entry| *entry = None)
            .or_insert(Some(key));
    }
    let mut matches: Vec<(Key, Key)> = Vec::new();
    for (_, key) in store.index_cursor(PLAYER_FILE, PLAYER_ALIAS_INDEX) {
        let player = load_player(store, key)?;
        let Some(name) = player.name.as_deref() else {
            continue;
        };
        if let Some(Some(person)) = persons.get(&normalised_name(name)) {
            matches.push((key, *person));
        }
    }
    let count = matches.len();
    for (player, person) in matches {
        identify_players_as_person(store, &[player], person)?;
    }
    reporter.append_text(&format!("{} players identified by name.", count));
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfc_store::MemoryStore;

    fn seed(store: &mut MemoryStore, name: &str) -> Key {
        let code = transact(store, |store| {
            allocate_identity(store, PLAYER_IDENTITY_KIND)
        })
        .unwrap();
        let player = Player {
            name: Some(name.to_string()),
            fideid: None,
            alias: code.clone(),
            identity: code,
            ..Player::default()
        };
        transact(store, |store| {
            store.put_record(PLAYER_FILE, &AsPlayer(&player))
        })
        .unwrap()
    }

    fn fresh() -> MemoryStore {
        let mut store = MemoryStore::new();
        create_identity_records_if_missing(&mut store).unwrap();
        store
    }

    #[test]
    fn identify_merges_and_swaps_index_family() {
        let mut store = fresh();
        let smith = seed(&mut store, "Smith, J");
        let alias = seed(&mut store, "J Smith");
        identify_players_as_person(&mut store, &[alias], smith).unwrap();

        let merged = load_player(&store, alias).unwrap();
        let person = load_player(&store, smith).unwrap();
        assert_eq!(merged.alias, person.alias);
        assert_eq!(person, {
            let mut unchanged = person.clone();
            unchanged.alias = unchanged.identity.clone();
            unchanged
        });
        // The alias sits in the person-alias family only.
        let natural = merged.alias_index_key();
        assert!(store.recordlist_key(PLAYER_FILE, PERSON_ALIAS_INDEX, &natural).contains(alias));
        assert!(store.recordlist_key(PLAYER_FILE, PLAYER_ALIAS_INDEX, &natural).is_empty());
    }

    #[test]
    fn identify_refuses_an_aliased_bookmark() {
        let mut store = fresh();
        let smith = seed(&mut store, "Smith, J");
        let alias = seed(&mut store, "J Smith");
        let other = seed(&mut store, "Brown, A");
        identify_players_as_person(&mut store, &[alias], smith).unwrap();
        let fault = identify_players_as_person(&mut store, &[alias], other);
        assert!(matches!(fault, Err(Fault::Refused(_))));
        // Nothing changed for the refused call.
        assert!(load_player(&store, other).unwrap().is_canonical());
    }

    #[test]
    fn identify_refuses_a_selection_among_the_bookmarks() {
        let mut store = fresh();
        let smith = seed(&mut store, "Smith, J");
        let alias = seed(&mut store, "J Smith");
        // The selection joins the person-alias family before the
        // bookmarks are checked, so listing it as a bookmark fails the
        // new-player check and backs everything out.
        let fault = identify_players_as_person(&mut store, &[alias, smith], smith);
        assert!(matches!(fault, Err(Fault::Refused(_))));
        for key in [smith, alias] {
            let player = load_player(&store, key).unwrap();
            assert!(player.is_canonical());
            assert!(!is_identified(&store, key, &player));
        }
    }

    #[test]
    fn break_restores_the_player_family() {
        let mut store = fresh();
        let smith = seed(&mut store, "Smith, J");
        let alias = seed(&mut store, "J Smith");
        identify_players_as_person(&mut store, &[alias], smith).unwrap();
        break_person_into_picked_players(&mut store, &[alias], smith).unwrap();
        let restored = load_player(&store, alias).unwrap();
        assert!(restored.is_canonical());
        let natural = restored.alias_index_key();
        assert!(store.recordlist_key(PLAYER_FILE, PLAYER_ALIAS_INDEX, &natural).contains(alias));
        assert!(store.recordlist_key(PLAYER_FILE, PERSON_ALIAS_INDEX, &natural).is_empty());
    }

    #[test]
    fn split_detaches_every_alias() {
        let mut store = fresh();
        let smith = seed(&mut store, "Smith, J");
        let first = seed(&mut store, "J Smith");
        let second = seed(&mut store, "Smith, John");
        identify_players_as_person(&mut store, &[first, second], smith).unwrap();
        split_person_into_all_players(&mut store, smith).unwrap();
        for key in [first, second] {
            assert!(load_player(&store, key).unwrap().is_canonical());
        }
        // The person keeps its own record.
        assert!(load_player(&store, smith).unwrap().is_canonical());
        assert!(is_identified(&store, smith, &load_player(&store, smith).unwrap()));
    }

    #[test]
    fn change_moves_the_person_anchor() {
        let mut store = fresh();
        let smith = seed(&mut store, "Smith, J");
        let alias = seed(&mut store, "J Smith");
        identify_players_as_person(&mut store, &[alias], smith).unwrap();
        change_identified_person(&mut store, alias).unwrap();
        let anchored = load_player(&store, alias).unwrap();
        assert!(anchored.is_canonical());
        assert_eq!(load_player(&store, smith).unwrap().alias, anchored.identity);
    }

    #[test]
    fn names_normalise_across_orderings() {
        assert_eq!(normalised_name("Smith, J"), normalised_name("J Smith"));
        assert_eq!(normalised_name("J. SMITH"), normalised_name("smith j"));
        assert_ne!(normalised_name("Smith, J"), normalised_name("Smith, K"));
    }

    #[test]
    fn by_name_matches_only_unambiguous_persons() {
        let mut store = fresh();
        let smith = seed(&mut store, "Smith, J");
        let jones = seed(&mut store, "Jones, K");
        let smith_new = seed(&mut store, "J Smith");
        let jones_new = seed(&mut store, "K Jones");
        // Make Smith and Jones identified persons.
        identify_players_as_person(&mut store, &[], smith).unwrap();
        identify_players_as_person(&mut store, &[], jones).unwrap();
        let count = identify_players_by_name(&mut store, &mut Silent).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            load_player(&store, smith_new).unwrap().alias,
            load_player(&store, smith).unwrap().identity
        );
        assert_eq!(
            load_player(&store, jones_new).unwrap().alias,
            load_player(&store, jones).unwrap().identity
        );
    }
}
