//! Shared test scaffolding: a seeded store built from literal game
//! seeds, with every derived player identified as a person of its own.

use pfc_core::*;
use pfc_identify::*;
use pfc_import::copy_all_names_from_games;
use pfc_records::*;
use pfc_store::MemoryStore;
use pfc_store::Store;
use pfc_store::transact;
use std::collections::BTreeMap;

pub(crate) struct SeedGame {
    white: String,
    black: String,
    result: String,
    event: String,
    date: Option<String>,
}

pub(crate) fn game(
    white: &str,
    black: &str,
    result: &str,
    event: &str,
    date: Option<&str>,
) -> SeedGame {
    SeedGame {
        white: white.to_string(),
        black: black.to_string(),
        result: result.to_string(),
        event: event.to_string(),
        date: date.map(str::to_string),
    }
}

pub(crate) fn seeded(seeds: &[SeedGame]) -> MemoryStore {
    let mut store = MemoryStore::new();
    create_identity_records_if_missing(&mut store).unwrap();
    transact(&mut store, |store| {
        for (number, seed) in seeds.iter().enumerate() {
            let mut headers = BTreeMap::new();
            headers.insert(TAG_WHITE.to_string(), seed.white.clone());
            headers.insert(TAG_BLACK.to_string(), seed.black.clone());
            headers.insert(TAG_RESULT.to_string(), seed.result.clone());
            headers.insert(TAG_EVENT.to_string(), seed.event.clone());
            if let Some(date) = &seed.date {
                headers.insert(TAG_DATE.to_string(), date.clone());
            }
            let game = Game::new("fixture.pgn", &(number + 1).to_string(), 0, headers);
            store.put_record(GAME_FILE, &game)?;
        }
        Ok(())
    })
    .unwrap();
    copy_all_names_from_games(&mut store, &mut Silent, &Stop::new()).unwrap();
    let players: Vec<Key> = store.recordlist_ebm(PLAYER_FILE).iter().collect();
    for key in players {
        identify_players_as_person(&mut store, &[], key).unwrap();
    }
    store
}

pub(crate) fn person_by_name(store: &MemoryStore, name: &str) -> (Key, Player) {
    let all = store.recordlist_ebm(PLAYER_FILE);
    for (key, raw) in store.record_cursor(PLAYER_FILE, &all) {
        let player = Player::decode(raw).unwrap();
        if player.name.as_deref() == Some(name) && player.is_canonical() {
            return (key, player);
        }
    }
    panic!("no canonical player named {name}");
}

pub(crate) fn person_rule(store: &MemoryStore, name: &str) -> Rule {
    Rule {
        name: format!("games of {name}"),
        person_identity: Some(person_by_name(store, name).1.identity),
        ..Rule::default()
    }
}

pub(crate) fn event_code(store: &MemoryStore, name: &str) -> String {
    let all = store.recordlist_ebm(EVENT_FILE);
    for (_, raw) in store.record_cursor(EVENT_FILE, &all) {
        let event = Event::decode(raw).unwrap();
        if event.event.as_deref() == Some(name) && event.is_canonical() {
            return event.identity;
        }
    }
    panic!("no canonical event named {name}");
}

pub(crate) fn event_rule(store: &MemoryStore, names: &[&str]) -> Rule {
    Rule {
        name: names.join(" + "),
        event_identities: names.iter().map(|name| event_code(store, name)).collect(),
        ..Rule::default()
    }
}
