use pfc_core::*;
use pfc_records::*;
use pfc_store::Pack;
use pfc_store::Store;
use pfc_store::transact;

/// Capability set of an alias-carrying entity kind.
///
/// `identity` is immutable; `alias` names the canonical record of the
/// group and is the only field the operations here change.
pub trait Aliased: Pack + Clone + Sized {
    const FILE: &'static str;
    /// Index on the natural key.
    const ALIAS_INDEX: &'static str;
    /// Index on the alias code; walks a whole alias group.
    const IDENTITY_INDEX: &'static str;
    /// Game index carrying this kind's keys, for selection filters.
    const GAME_INDEX: &'static str;
    /// Kind name for messages.
    const LABEL: &'static str;

    fn decode(raw: &str) -> Outcome<Self>;
    fn identity(&self) -> &str;
    fn alias(&self) -> &str;
    fn set_alias(&mut self, code: &str);
    fn natural_key(&self) -> String;
    /// Key this entity's games carry in [`Self::GAME_INDEX`].
    fn game_index_key(&self) -> String;
}

impl Aliased for Event {
    const FILE: &'static str = EVENT_FILE;
    const ALIAS_INDEX: &'static str = EVENT_ALIAS_INDEX;
    const IDENTITY_INDEX: &'static str = EVENT_IDENTITY_INDEX;
    const GAME_INDEX: &'static str = GAME_EVENT_INDEX;
    const LABEL: &'static str = "event";

    fn decode(raw: &str) -> Outcome<Self> {
        Event::decode(raw)
    }
    fn identity(&self) -> &str {
        &self.identity
    }
    fn alias(&self) -> &str {
        &self.alias
    }
    fn set_alias(&mut self, code: &str) {
        self.alias = code.to_string();
    }
    fn natural_key(&self) -> String {
        self.alias_index_key()
    }
    fn game_index_key(&self) -> String {
        Event::game_index_key(self)
    }
}

impl Aliased for TimeControl {
    const FILE: &'static str = TIME_FILE;
    const ALIAS_INDEX: &'static str = TIME_ALIAS_INDEX;
    const IDENTITY_INDEX: &'static str = TIME_IDENTITY_INDEX;
    const GAME_INDEX: &'static str = GAME_TIMECONTROL_INDEX;
    const LABEL: &'static str = "time control";

    fn decode(raw: &str) -> Outcome<Self> {
        TimeControl::decode(raw)
    }
    fn identity(&self) -> &str {
        &self.identity
    }
    fn alias(&self) -> &str {
        &self.alias
    }
    fn set_alias(&mut self, code: &str) {
        self.alias = code.to_string();
    }
    fn natural_key(&self) -> String {
        self.alias_index_key()
    }
    fn game_index_key(&self) -> String {
        TimeControl::game_index_key(self)
    }
}

impl Aliased for Mode {
    const FILE: &'static str = MODE_FILE;
    const ALIAS_INDEX: &'static str = MODE_ALIAS_INDEX;
    const IDENTITY_INDEX: &'static str = MODE_IDENTITY_INDEX;
    const GAME_INDEX: &'static str = GAME_MODE_INDEX;
    const LABEL: &'static str = "mode";

    fn decode(raw: &str) -> Outcome<Self> {
        Mode::decode(raw)
    }
    fn identity(&self) -> &str {
        &self.identity
    }
    fn alias(&self) -> &str {
        &self.alias
    }
    fn set_alias(&mut self, code: &str) {
        self.alias = code.to_string();
    }
    fn natural_key(&self) -> String {
        self.alias_index_key()
    }
    fn game_index_key(&self) -> String {
        Mode::game_index_key(self)
    }
}

/// Load and decode one record of kind `T`.
pub(crate) fn load<T: Aliased, S: Store>(store: &S, key: Key) -> Outcome<T> {
    match store.get_primary_record(T::FILE, key) {
        Some(raw) => T::decode(raw),
        None => corrupt(format!("{} record {key} does not exist", T::LABEL)),
    }
}

/// Make the bookmarked records aliases of the selection's group.
///
/// Bookmarks must not be aliases already; the selection may be.
pub fn identify<T: Aliased, S: Store>(
    store: &mut S,
    bookmarks: &[Key],
    selection: Key,
) -> Outcome<()> {
    transact(store, |store| {
        let target = load::<T, S>(store, selection)?;
        for &key in bookmarks {
            let record = load::<T, S>(store, key)?;
            if record.alias() != record.identity() {
                return refused(format!(
                    "one of the bookmarked {}s is already aliased so no changes done",
                    T::LABEL
                ));
            }
            let mut changed = record.clone();
            changed.set_alias(target.alias());
            store.edit_record(T::FILE, key, &record, &changed)?;
        }
        Ok(())
    })
}

/// Break the bookmarked aliases of the selection's group back into
/// records of their own.
pub fn break_bookmarked<T: Aliased, S: Store>(
    store: &mut S,
    bookmarks: &[Key],
    selection: Key,
) -> Outcome<()> {
    transact(store, |store| {
        let target = load::<T, S>(store, selection)?;
        for &key in bookmarks {
            let record = load::<T, S>(store, key)?;
            if record.alias() != target.alias() {
                return refused(format!(
                    "one of the bookmarked {}s is not aliased to same {} as selection so no changes done",
                    T::LABEL,
                    T::LABEL
                ));
            }
            let mut changed = record.clone();
            let identity = changed.identity().to_string();
            changed.set_alias(&identity);
            store.edit_record(T::FILE, key, &record, &changed)?;
        }
        Ok(())
    })
}

/// Split every alias of the selection's group into a record of its own.
/// Applying this twice has the same effect as once.
pub fn split_all<T: Aliased, S: Store>(store: &mut S, selection: Key) -> Outcome<()> {
    transact(store, |store| {
        let target = load::<T, S>(store, selection)?;
        let group = store.recordlist_key(T::FILE, T::IDENTITY_INDEX, target.alias());
        for key in group.iter() {
            let record = load::<T, S>(store, key)?;
            if record.alias() == record.identity() {
                continue;
            }
            let mut changed = record.clone();
            let identity = changed.identity().to_string();
            changed.set_alias(&identity);
            store.edit_record(T::FILE, key, &record, &changed)?;
        }
        Ok(())
    })
}

/// Move the group's anchor to the selection: every record aliased to the
/// selection's old canonical record, the selection included, is pointed
/// at the selection's identity.
pub fn change_identity<T: Aliased, S: Store>(store: &mut S, selection: Key) -> Outcome<()> {
    transact(store, |store| {
        let target = load::<T, S>(store, selection)?;
        if target.alias() == target.identity() {
            return refused(format!(
                "selection is already the identified {}",
                T::LABEL
            ));
        }
        let new_alias = target.identity().to_string();
        let group = store.recordlist_key(T::FILE, T::IDENTITY_INDEX, target.alias());
        for key in group.iter() {
            let record = load::<T, S>(store, key)?;
            let mut changed = record.clone();
            changed.set_alias(&new_alias);
            store.edit_record(T::FILE, key, &record, &changed)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfc_store::MemoryStore;

    fn seed_events(store: &mut MemoryStore, names: &[&str]) -> Vec<Key> {
        create_identity_records_if_missing(store).unwrap();
        let mut keys = Vec::new();
        transact(store, |store| {
            for name in names {
                let code = allocate_identity(store, EVENT_IDENTITY_KIND)?;
                let event = Event {
                    event: Some(name.to_string()),
                    alias: code.clone(),
                    identity: code,
                    ..Event::default()
                };
                keys.push(store.put_record(EVENT_FILE, &event)?);
            }
            Ok(())
        })
        .unwrap();
        keys
    }

    fn event(store: &MemoryStore, key: Key) -> Event {
        load::<Event, _>(store, key).unwrap()
    }

    #[test]
    fn identify_points_bookmarks_at_the_selection_group() {
        let mut store = MemoryStore::new();
        let keys = seed_events(&mut store, &["Open 2024", "Open '24", "The Open"]);
        identify::<Event, _>(&mut store, &keys[1..], keys[0]).unwrap();
        let canonical = event(&store, keys[0]);
        for &key in &keys[1..] {
            assert_eq!(event(&store, key).alias, canonical.alias);
        }
        assert_eq!(
            store
                .recordlist_key(EVENT_FILE, EVENT_IDENTITY_INDEX, &canonical.alias)
                .count_records(),
            3
        );
    }

    #[test]
    fn identify_with_selection_among_bookmarks_is_a_no_op_for_it() {
        let mut store = MemoryStore::new();
        let keys = seed_events(&mut store, &["a", "b", "c"]);
        // The canonical selection passes the unaliased check and points
        // at its own group, so only the other bookmarks change.
        identify::<Event, _>(&mut store, &[keys[0], keys[1]], keys[0]).unwrap();
        let selection = event(&store, keys[0]);
        assert!(selection.is_canonical());
        assert_eq!(event(&store, keys[1]).alias, selection.alias);
        assert!(event(&store, keys[2]).is_canonical());
    }

    #[test]
    fn identify_refuses_aliased_bookmarks_and_backs_out() {
        let mut store = MemoryStore::new();
        let keys = seed_events(&mut store, &["a", "b", "c"]);
        identify::<Event, _>(&mut store, &[keys[1]], keys[0]).unwrap();
        // keys[1] is aliased now; identifying [2, 1] to anything must
        // refuse and leave keys[2] untouched.
        let fault = identify::<Event, _>(&mut store, &[keys[2], keys[1]], keys[0]);
        assert!(matches!(fault, Err(Fault::Refused(_))));
        assert!(event(&store, keys[2]).is_canonical());
    }

    #[test]
    fn identify_then_break_restores_aliases() {
        let mut store = MemoryStore::new();
        let keys = seed_events(&mut store, &["a", "b", "c"]);
        let before: Vec<String> = keys.iter().map(|&key| event(&store, key).alias).collect();
        identify::<Event, _>(&mut store, &keys[1..], keys[0]).unwrap();
        break_bookmarked::<Event, _>(&mut store, &keys[1..], keys[0]).unwrap();
        let after: Vec<String> = keys.iter().map(|&key| event(&store, key).alias).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn split_is_idempotent() {
        let mut store = MemoryStore::new();
        let keys = seed_events(&mut store, &["a", "b", "c"]);
        identify::<Event, _>(&mut store, &keys[1..], keys[0]).unwrap();
        split_all::<Event, _>(&mut store, keys[0]).unwrap();
        let once: Vec<Event> = keys.iter().map(|&key| event(&store, key)).collect();
        split_all::<Event, _>(&mut store, keys[0]).unwrap();
        let twice: Vec<Event> = keys.iter().map(|&key| event(&store, key)).collect();
        assert_eq!(once, twice);
        assert!(once.iter().all(Event::is_canonical));
    }

    #[test]
    fn change_identity_moves_the_anchor() {
        let mut store = MemoryStore::new();
        let keys = seed_events(&mut store, &["a", "b", "c"]);
        identify::<Event, _>(&mut store, &keys[1..], keys[0]).unwrap();
        change_identity::<Event, _>(&mut store, keys[1]).unwrap();
        let new_anchor = event(&store, keys[1]);
        assert!(new_anchor.is_canonical());
        for &key in &keys {
            assert_eq!(event(&store, key).alias, new_anchor.identity);
        }
        // The old anchor is an alias now, so changing it back works.
        let fault = change_identity::<Event, _>(&mut store, keys[1]);
        assert!(matches!(fault, Err(Fault::Refused(_))));
        change_identity::<Event, _>(&mut store, keys[0]).unwrap();
        assert!(event(&store, keys[0]).is_canonical());
    }
}
