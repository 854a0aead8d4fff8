//! Stored-rule maintenance.
//!
//! Rules are edited in place by the user; update and delete verify the
//! stored record still matches the copy the caller read, refusing stale
//! writes.

use crate::dates::normalise_rule_dates;
use pfc_core::*;
use pfc_records::*;
use pfc_store::Store;
use pfc_store::transact;

fn load_rule<S: Store>(store: &S, key: Key) -> Outcome<Rule> {
    match store.get_primary_record(SELECTION_FILE, key) {
        Some(raw) => Rule::decode(raw),
        None => refused("calculation rule record does not exist"),
    }
}

/// Insert a new rule after validation and date normalisation.
pub fn insert_rule<S: Store>(store: &mut S, rule: &Rule) -> Outcome<Key> {
    let mut rule = rule.clone();
    rule.verify()?;
    normalise_rule_dates(&mut rule)?;
    transact(store, |store| store.put_record(SELECTION_FILE, &rule))
}

/// Replace a stored rule; refuses when the stored record no longer
/// matches the copy the caller edited.
pub fn update_rule<S: Store>(store: &mut S, key: Key, old: &Rule, new: &Rule) -> Outcome<()> {
    let mut new = new.clone();
    new.verify()?;
    normalise_rule_dates(&mut new)?;
    transact(store, |store| {
        let stored = load_rule(store, key)?;
        if &stored != old {
            return refused("calculation rule changed since it was read");
        }
        store.edit_record(SELECTION_FILE, key, &stored, &new)
    })
}

/// Delete a stored rule; refuses when the stored record no longer
/// matches the copy the caller read.
pub fn delete_rule<S: Store>(store: &mut S, key: Key, rule: &Rule) -> Outcome<()> {
    transact(store, |store| {
        let stored = load_rule(store, key)?;
        if &stored != rule {
            return refused("calculation rule changed since it was read");
        }
        store.delete_record(SELECTION_FILE, key, &stored)
    })
}

/// Stored rule with the given name, if any.
pub fn rule_by_name<S: Store>(store: &S, name: &str) -> Outcome<Option<(Key, Rule)>> {
    match store
        .recordlist_key(SELECTION_FILE, RULE_NAME_INDEX, name)
        .first()
    {
        Some(key) => Ok(Some((key, load_rule(store, key)?))),
        None => Ok(None),
    }
}

/// All stored rules in insertion order.
pub fn list_rules<S: Store>(store: &S) -> Outcome<Vec<(Key, Rule)>> {
    let all = store.recordlist_ebm(SELECTION_FILE);
    let mut rules = Vec::new();
    for (key, raw) in store.record_cursor(SELECTION_FILE, &all) {
        rules.push((key, Rule::decode(raw)?));
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfc_store::MemoryStore;

    fn rule(name: &str) -> Rule {
        Rule {
            name: name.to_string(),
            person_identity: Some(format_code(1)),
            from_date: Some("1 Jan 2024".to_string()),
            to_date: Some("31 Dec 2024".to_string()),
            ..Rule::default()
        }
    }

    #[test]
    fn insert_normalises_and_indexes_by_name() {
        let mut store = MemoryStore::new();
        insert_rule(&mut store, &rule("club 2024")).unwrap();
        let (_, stored) = rule_by_name(&store, "club 2024").unwrap().unwrap();
        assert_eq!(stored.from_date.as_deref(), Some("2024.01.01"));
        assert_eq!(stored.to_date.as_deref(), Some("2024.12.31"));
        assert!(rule_by_name(&store, "missing").unwrap().is_none());
    }

    #[test]
    fn stale_update_and_delete_are_refused() {
        let mut store = MemoryStore::new();
        let key = insert_rule(&mut store, &rule("club 2024")).unwrap();
        let (_, stored) = rule_by_name(&store, "club 2024").unwrap().unwrap();

        let mut renamed = stored.clone();
        renamed.name = "club 2024 standard".to_string();
        update_rule(&mut store, key, &stored, &renamed).unwrap();

        // The first read is stale now.
        let fault = update_rule(&mut store, key, &stored, &renamed);
        assert!(matches!(fault, Err(Fault::Refused(_))));
        let fault = delete_rule(&mut store, key, &stored);
        assert!(matches!(fault, Err(Fault::Refused(_))));

        let (_, current) = rule_by_name(&store, "club 2024 standard").unwrap().unwrap();
        delete_rule(&mut store, key, &current).unwrap();
        assert!(list_rules(&store).unwrap().is_empty());
    }

    #[test]
    fn malformed_rules_never_reach_the_store() {
        let mut store = MemoryStore::new();
        let mut bad = rule("bad");
        bad.event_identities.push(format_code(9));
        assert!(matches!(
            insert_rule(&mut store, &bad),
            Err(Fault::Refused(_))
        ));
        assert!(list_rules(&store).unwrap().is_empty());
    }
}
