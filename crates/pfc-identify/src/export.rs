//! Identity interchange.
//!
//! Exports are UTF-8 JSON: a list of alias groups, each group a list of
//! 7-tuples naming one player occurrence, the canonical identity first.
//! The identity-only export is a flat list of 7-tuples. Import
//! verification is strict; groups have set semantics so duplicate tuples
//! are rejected.

use crate::person::identify_players_as_person;
use crate::resolve::load_player;
use pfc_core::*;
use pfc_records::*;
use pfc_store::RecordList;
use pfc_store::Store;
use pfc_store::read;
use std::path::Path;

/// One identified person and all its aliases, canonical first.
pub type PersonGroup = Vec<PlayerTuple>;

fn tuple_from_value(value: &serde_json::Value) -> Outcome<PlayerTuple> {
    let elements = match value.as_array() {
        Some(elements) => elements,
        None => return refused("person in item in data is not a tuple"),
    };
    if elements.len() != 7 {
        return refused("length of person in item in data is not 7");
    }
    let mut components = Vec::with_capacity(7);
    for element in elements {
        match element {
            serde_json::Value::Null => components.push(None),
            serde_json::Value::String(text) => components.push(Some(text.clone())),
            _ => {
                return refused("element of person in item in data is neither null nor a string");
            }
        }
    }
    let mut parts = components.into_iter();
    Ok((
        parts.next().expect("seven components"),
        parts.next().expect("seven components"),
        parts.next().expect("seven components"),
        parts.next().expect("seven components"),
        parts.next().expect("seven components"),
        parts.next().expect("seven components"),
        parts.next().expect("seven components"),
    ))
}

/// Verify and decode serialized identification data.
///
/// Rejects anything that is not a list of groups of 7-tuples whose
/// components are null or strings, or that repeats a tuple within a
/// group.
pub fn verify_import(text: &str) -> Outcome<Vec<PersonGroup>> {
    let data: serde_json::Value = match serde_json::from_str(text) {
        Ok(data) => data,
        Err(error) => return refused(format!("data is not well-formed: {error}")),
    };
    let items = match data.as_array() {
        Some(items) => items,
        None => return refused("data is not a list"),
    };
    let mut groups = Vec::new();
    for item in items {
        let tuples = match item.as_array() {
            Some(tuples) => tuples,
            None => return refused("item in data is not a set of persons"),
        };
        let mut group = Vec::new();
        for tuple in tuples {
            let tuple = tuple_from_value(tuple)?;
            if group.contains(&tuple) {
                return refused("person duplicated in item in data");
            }
            group.push(tuple);
        }
        groups.push(group);
    }
    Ok(groups)
}

/// Serialize groups for an export file.
pub fn serialize_groups(groups: &[PersonGroup]) -> String {
    serde_json::to_string_pretty(groups).expect("serialize export data")
}

pub fn write_export_file(path: &Path, serialized: &str) -> Outcome<()> {
    std::fs::write(path, serialized)?;
    Ok(())
}

pub fn read_export_file(path: &Path) -> Outcome<Vec<PersonGroup>> {
    let text = std::fs::read_to_string(path)?;
    verify_import(&text)
}

/// Group of one identified person: canonical tuple first, aliases after
/// in natural-key order. Also returns the group's record list so callers
/// can mark the whole group processed.
fn aliases_of_person<S: Store>(
    store: &S,
    canonical_key: Key,
    canonical: &Player,
) -> Outcome<(RecordList, PersonGroup)> {
    let members = store.recordlist_key(PLAYER_FILE, PLAYER_IDENTITY_INDEX, &canonical.alias);
    let mut group = vec![canonical.tuple()];
    for key in members.iter() {
        if key == canonical_key {
            continue;
        }
        group.push(load_player(store, key)?.tuple());
    }
    Ok((members, group))
}

fn canonical_for_member<S: Store>(store: &S, key: Key) -> Outcome<(Key, Player)> {
    let member = load_player(store, key)?;
    if member.is_canonical() {
        return Ok((key, member));
    }
    match crate::resolve::canonical_person(store, &member.alias)? {
        Some(found) => Ok(found),
        None => corrupt(format!("person {} has no canonical record", member.alias)),
    }
}

/// Export the selected identified persons with all their aliases.
pub fn export_selected_persons<S: Store>(
    store: &S,
    selected: &[Key],
) -> Outcome<Vec<PersonGroup>> {
    read(store, |store| {
        let mut exported = store.recordlist_nil(PLAYER_FILE);
        let mut groups = Vec::new();
        for &key in selected {
            if exported.contains(key) {
                continue;
            }
            let (canonical_key, canonical) = canonical_for_member(store, key)?;
            let (members, group) = aliases_of_person(store, canonical_key, &canonical)?;
            exported |= &members;
            exported.insert(canonical_key);
            groups.push(group);
        }
        Ok(groups)
    })
}

/// Export every person implicated in the selected events' games.
pub fn export_event_persons<S: Store>(store: &S, events: &[Key]) -> Outcome<Vec<PersonGroup>> {
    read(store, |store| {
        let mut exported = store.recordlist_nil(PLAYER_FILE);
        let mut groups = Vec::new();
        for &event_key in events {
            let event = match store.get_primary_record(EVENT_FILE, event_key) {
                Some(raw) => Event::decode(raw)?,
                None => return refused("event record does not exist"),
            };
            let games =
                store.recordlist_key(GAME_FILE, GAME_EVENT_INDEX, &event.game_index_key());
            let mut side_keys = Vec::new();
            for (_, raw) in store.record_cursor(GAME_FILE, &games) {
                let game = Game::decode(raw)?;
                side_keys.push(game.black_key());
                side_keys.push(game.white_key());
            }
            for side_key in side_keys {
                let Some((key, canonical)) = crate::resolve::canonical_player(store, &side_key)?
                else {
                    continue;
                };
                if exported.contains(key) {
                    continue;
                }
                let (members, group) = aliases_of_person(store, key, &canonical)?;
                exported |= &members;
                exported.insert(key);
                groups.push(group);
            }
        }
        Ok(groups)
    })
}

/// Export all person identities, but no aliases.
pub fn export_identities<S: Store>(store: &S) -> Outcome<Vec<PlayerTuple>> {
    read(store, |store| {
        let mut identities = Vec::new();
        for (_, key) in store.index_cursor(PLAYER_FILE, PERSON_ALIAS_INDEX) {
            let player = load_player(store, key)?;
            if player.is_canonical() {
                identities.push(player.tuple());
            }
        }
        Ok(identities)
    })
}

fn find_record_for_tuple<S: Store>(store: &S, tuple: &PlayerTuple) -> Outcome<Option<Key>> {
    let natural_key = Player::from_tuple(tuple.clone()).alias_index_key();
    if let Some(key) = store
        .recordlist_key(PLAYER_FILE, PERSON_ALIAS_INDEX, &natural_key)
        .first()
    {
        return Ok(Some(key));
    }
    Ok(store
        .recordlist_key(PLAYER_FILE, PLAYER_ALIAS_INDEX, &natural_key)
        .first())
}

fn apply_groups<S: Store>(
    store: &mut S,
    groups: &[PersonGroup],
    reporter: &mut dyn Reporter,
    mirror: bool,
) -> Outcome<usize> {
    let mut identified = 0usize;
    for group in groups {
        // Locate the records on file for this group's tuples.
        let mut present = Vec::new();
        for tuple in group {
            match find_record_for_tuple(store, tuple)? {
                Some(key) => present.push(key),
                None => reporter.append_text_only(&format!(
                    "{} is not on the known players list",
                    Player::from_tuple(tuple.clone())
                        .name
                        .unwrap_or_default()
                )),
            }
        }
        // Pick the anchor: an already identified member if any, else the
        // first member, promoted.
        let mut anchor = None;
        for &key in &present {
            let player = load_player(store, key)?;
            if is_on_person_index(store, key, &player) {
                anchor = Some((key, player));
                break;
            }
        }
        let (anchor_key, anchor_player) = match anchor {
            Some(found) => found,
            None if mirror => {
                reporter.append_text_only("no identified person matches item in data");
                continue;
            }
            None => match present.first() {
                Some(&key) => (key, load_player(store, key)?),
                None => continue,
            },
        };
        let mut bookmarks = Vec::new();
        for &key in &present {
            if key == anchor_key {
                continue;
            }
            let player = load_player(store, key)?;
            if is_on_person_index(store, key, &player) {
                if player.alias != anchor_player.alias {
                    reporter.append_text_only(&format!(
                        "{} is identified as a different person",
                        player.name.unwrap_or_default()
                    ));
                }
                continue;
            }
            bookmarks.push(key);
        }
        identified += bookmarks.len();
        identify_players_as_person(store, &bookmarks, anchor_key)?;
    }
    Ok(identified)
}

fn is_on_person_index<S: Store>(store: &S, key: Key, player: &Player) -> bool {
    store
        .recordlist_key(PLAYER_FILE, PERSON_ALIAS_INDEX, &player.alias_index_key())
        .contains(key)
}

/// Apply imported identifications, creating identified persons as
/// needed. Returns the number of players newly identified.
pub fn apply_imported_identities<S: Store>(
    store: &mut S,
    groups: &[PersonGroup],
    reporter: &mut dyn Reporter,
) -> Outcome<usize> {
    apply_groups(store, groups, reporter, false)
}

/// Mirror imported identifications onto existing identified persons
/// only; groups with no identified member are reported and skipped.
pub fn mirror_imported_identities<S: Store>(
    store: &mut S,
    groups: &[PersonGroup],
    reporter: &mut dyn Reporter,
) -> Outcome<usize> {
    apply_groups(store, groups, reporter, true)
}
