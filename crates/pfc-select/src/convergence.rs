//! Convergence of the iterative calculation per population.
//!
//! Iteration on a connected opponent graph converges on a single set of
//! values or oscillates between two. A tree always oscillates; a graph
//! with a 3-cycle (A plays B, B plays C, C plays A) always converges; a
//! graph whose shortest cycle is longer may do either, depending on the
//! results. The tractable sufficient condition used here is the 3-cycle
//! test: some edge whose endpoints share a further neighbour.

use crate::selection::one_hop;
use pfc_core::*;
use pfc_identify::load_player;
use pfc_records::PLAYER_FILE;
use pfc_store::RecordList;
use pfc_store::Store;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Opponent adjacency over one population, restricted to the selected
/// games. Neighbour sets never contain the player itself.
pub fn neighbour_map<S: Store>(
    store: &S,
    playerset: &RecordList,
    selected: &RecordList,
) -> Outcome<BTreeMap<Key, BTreeSet<Key>>> {
    let mut neighbours = BTreeMap::new();
    for key in playerset.iter() {
        let player = load_player(store, key)?;
        let opponents: BTreeSet<Key> = one_hop(store, key, &player, selected)?
            .into_iter()
            .collect();
        neighbours.insert(key, opponents);
    }
    Ok(neighbours)
}

/// True if the graph, assumed connected, is a tree.
pub fn is_tree(neighbours: &BTreeMap<Key, BTreeSet<Key>>) -> bool {
    let edges: usize = neighbours.values().map(BTreeSet::len).sum::<usize>() / 2;
    edges == neighbours.len().saturating_sub(1)
}

/// True if some edge's endpoints share a further neighbour.
pub fn has_three_cycle(neighbours: &BTreeMap<Key, BTreeSet<Key>>) -> bool {
    for (player, opponents) in neighbours {
        for opponent in opponents {
            if let Some(theirs) = neighbours.get(opponent) {
                if opponents
                    .intersection(theirs)
                    .any(|shared| shared != player && shared != opponent)
                {
                    return true;
                }
            }
        }
    }
    false
}

/// One convergence verdict per population, in population order.
pub fn check_convergence<S: Store>(
    store: &S,
    playersets: &[RecordList],
    selected: &RecordList,
) -> Outcome<Vec<bool>> {
    let mut convergent = Vec::with_capacity(playersets.len());
    for playerset in playersets {
        let neighbours = neighbour_map(store, playerset, selected)?;
        let verdict = !is_tree(&neighbours) && has_three_cycle(&neighbours);
        convergent.push(verdict);
    }
    Ok(convergent)
}

/// Display names of a non-convergent population's players, for the
/// report that replaces their performance numbers.
pub fn non_convergent_player_names<S: Store>(
    store: &S,
    playerset: &RecordList,
) -> Outcome<Vec<String>> {
    let mut names = Vec::new();
    for (_, raw) in store.record_cursor(PLAYER_FILE, playerset) {
        let player = pfc_records::Player::decode(raw)?;
        names.push(player.name.unwrap_or_else(|| player.identity.clone()));
    }
    Ok(names)
}
