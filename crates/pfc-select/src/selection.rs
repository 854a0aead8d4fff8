use pfc_core::*;
use pfc_identify::*;
use pfc_records::*;
use pfc_store::RecordList;
use pfc_store::Store;
use petgraph::unionfind::UnionFind;
use std::collections::BTreeMap;

/// Result of evaluating a rule: the selected games, the implicated
/// canonical players, and their partition into connected populations.
#[derive(Debug)]
pub struct Selection {
    pub games: RecordList,
    pub players: RecordList,
    pub playersets: Vec<RecordList>,
}

/// Evaluate a rule into its selection.
///
/// The four game filters intersect into `selected_games`; the rule shape
/// then decides the population path. A person rule expands outward from
/// the canonical player and yields one population by construction; an
/// event rule merges per-player one-hop sets and may yield several.
pub fn select<S: Store>(store: &S, rule: &Rule) -> Outcome<Selection> {
    rule.verify()?;
    let date_games = games_in_date_range(store, rule)?;
    let time_games = games_for_identity::<TimeControl, S>(store, rule.time_control_identity.as_deref())?;
    let mode_games = games_for_identity::<Mode, S>(store, rule.mode_identity.as_deref())?;
    let event_games = games_for_events(store, &rule.event_identities)?;
    let mut games = date_games;
    games &= &time_games;
    games &= &mode_games;
    games &= &event_games;

    if rule.deduces_player_population() {
        let code = rule.person_identity.as_deref().unwrap_or_default();
        let players = population_from_selected_player(store, code, &games)?;
        let playersets = vec![players.clone()];
        Ok(Selection {
            games,
            players,
            playersets,
        })
    } else {
        let players = players_from_selected_games(store, &games)?;
        let playersets = populations_from_selected_games(store, &players, &games)?;
        Ok(Selection {
            games,
            players,
            playersets,
        })
    }
}

/// Games dated inside the rule's range, both endpoints included; all
/// games when the rule has no dates.
fn games_in_date_range<S: Store>(store: &S, rule: &Rule) -> Outcome<RecordList> {
    match (rule.from_date.as_deref(), rule.to_date.as_deref()) {
        (Some(from), Some(to)) => {
            Ok(store.recordlist_key_range(GAME_FILE, GAME_DATE_INDEX, from, to))
        }
        (None, None) => Ok(store.recordlist_ebm(GAME_FILE)),
        _ => refused("rule dates must both be present or both be absent"),
    }
}

/// Games carrying any of the identity group's keys; all games when no
/// identity is given. Each group member may have its own spelling of the
/// key, so the lookups union over the whole alias group.
fn games_for_identity<T: Aliased, S: Store>(
    store: &S,
    identity: Option<&str>,
) -> Outcome<RecordList> {
    let Some(code) = identity else {
        return Ok(store.recordlist_ebm(GAME_FILE));
    };
    let group = entity_group::<T, S>(store, code);
    if group.is_empty() {
        return refused(format!("{} identity {code} is not on file", T::LABEL));
    }
    let mut games = store.recordlist_nil(GAME_FILE);
    for (_, raw) in store.record_cursor(T::FILE, &group) {
        let member = T::decode(raw)?;
        games |= &store.recordlist_key(GAME_FILE, T::GAME_INDEX, &member.game_index_key());
    }
    Ok(games)
}

/// Union of the event filters over the rule's event list; all games when
/// the list is empty.
fn games_for_events<S: Store>(store: &S, events: &[String]) -> Outcome<RecordList> {
    if events.is_empty() {
        return Ok(store.recordlist_ebm(GAME_FILE));
    }
    let mut games = store.recordlist_nil(GAME_FILE);
    for code in events {
        games |= &games_for_identity::<Event, S>(store, Some(code.as_str()))?;
    }
    Ok(games)
}

/// Canonical opponents of one player across its selected games, one
/// entry per appearance.
pub(crate) fn one_hop<S: Store>(
    store: &S,
    player_key: Key,
    player: &Player,
    selected: &RecordList,
) -> Outcome<Vec<Key>> {
    let mut games = person_games(store, player)?;
    games &= selected;
    let mut connected = Vec::new();
    for (_, raw) in store.record_cursor(GAME_FILE, &games) {
        let game = Game::decode(raw)?;
        for side in [game.black_key(), game.white_key()] {
            if let Some((opponent_key, _)) = canonical_player(store, &side)? {
                if opponent_key != player_key {
                    connected.push(opponent_key);
                }
            }
        }
    }
    Ok(connected)
}

/// Canonical player for each side of each selected game.
fn players_from_selected_games<S: Store>(
    store: &S,
    selected: &RecordList,
) -> Outcome<RecordList> {
    let mut players = store.recordlist_nil(PLAYER_FILE);
    for (_, raw) in store.record_cursor(GAME_FILE, selected) {
        let game = Game::decode(raw)?;
        for side in [game.black_key(), game.white_key()] {
            if let Some((key, _)) = canonical_player(store, &side)? {
                players.insert(key);
            }
        }
    }
    Ok(players)
}

/// Partition the selected players into connected populations by merging
/// each player's one-hop set, coalescing sets that share a vertex.
fn populations_from_selected_games<S: Store>(
    store: &S,
    players: &RecordList,
    selected: &RecordList,
) -> Outcome<Vec<RecordList>> {
    let members: Vec<Key> = players.iter().collect();
    let position: BTreeMap<Key, usize> = members
        .iter()
        .enumerate()
        .map(|(index, key)| (*key, index))
        .collect();
    let mut components: UnionFind<usize> = UnionFind::new(members.len());
    for (index, &key) in members.iter().enumerate() {
        let player = load_player(store, key)?;
        for opponent in one_hop(store, key, &player, selected)? {
            if let Some(&other) = position.get(&opponent) {
                components.union(index, other);
            }
        }
    }
    let mut playersets: BTreeMap<usize, RecordList> = BTreeMap::new();
    for (index, &key) in members.iter().enumerate() {
        playersets
            .entry(components.find(index))
            .or_insert_with(|| store.recordlist_nil(PLAYER_FILE))
            .insert(key);
    }
    Ok(playersets.into_values().collect())
}

/// Expand the population outward from the canonical player for `code`,
/// frontier by frontier, until no new opponents appear.
fn population_from_selected_player<S: Store>(
    store: &S,
    code: &str,
    selected: &RecordList,
) -> Outcome<RecordList> {
    let Some((start, _)) = canonical_person(store, code)? else {
        return refused(format!(
            "player identity {code} is not an identified person"
        ));
    };
    let mut playerset = store.recordlist_nil(PLAYER_FILE);
    let mut frontier = store.recordlist_nil(PLAYER_FILE);
    frontier.insert(start);
    while frontier.count_records() > 0 {
        playerset |= &frontier;
        let mut connected = store.recordlist_nil(PLAYER_FILE);
        for key in frontier.iter() {
            let player = load_player(store, key)?;
            for opponent in one_hop(store, key, &player, selected)? {
                connected.insert(opponent);
            }
        }
        frontier = connected;
        frontier -= &playerset;
    }
    Ok(playerset)
}
