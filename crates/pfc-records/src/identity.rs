use crate::*;
use pfc_core::*;
use pfc_store::IndexTerms;
use pfc_store::Pack;
use pfc_store::Store;
use pfc_store::transact;
use serde::Deserialize;
use serde::Serialize;

/// Per-kind identity counter: the last allocated code.
///
/// Exactly one counter record exists per entity kind; more than one is a
/// defect that aborts the calculation.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct IdentityCounter {
    pub kind: String,
    pub code: u64,
}

impl IdentityCounter {
    pub fn decode(raw: &str) -> Outcome<Self> {
        decode_json(raw, "identity counter record")
    }
}

impl Pack for IdentityCounter {
    fn value(&self) -> String {
        encode_json(self)
    }

    fn index(&self) -> IndexTerms {
        vec![(IDENTITY_KIND_INDEX, vec![self.kind.clone()])]
    }
}

/// Create the counter record for `kind` with code 0 if it does not exist.
pub fn create_identity_record_if_missing<S: Store>(store: &mut S, kind: &str) -> Outcome<()> {
    let existing = store.recordlist_key(IDENTITY_FILE, IDENTITY_KIND_INDEX, kind);
    if existing.count_records() > 0 {
        return Ok(());
    }
    let counter = IdentityCounter {
        kind: kind.to_string(),
        code: 0,
    };
    transact(store, |store| store.put_record(IDENTITY_FILE, &counter))?;
    Ok(())
}

/// Create the counter records for every entity kind.
pub fn create_identity_records_if_missing<S: Store>(store: &mut S) -> Outcome<()> {
    for kind in [
        PLAYER_IDENTITY_KIND,
        EVENT_IDENTITY_KIND,
        TIME_IDENTITY_KIND,
        MODE_IDENTITY_KIND,
    ] {
        create_identity_record_if_missing(store, kind)?;
    }
    Ok(())
}

/// Allocate and return the next identity code for `kind`.
///
/// Reads the counter, increments it, writes it back, and returns the new
/// code in index form. Runs inside the caller's transaction.
pub fn allocate_identity<S: Store>(store: &mut S, kind: &str) -> Outcome<String> {
    let counters = store.recordlist_key(IDENTITY_FILE, IDENTITY_KIND_INDEX, kind);
    let key = match counters.count_records() {
        0 => return corrupt(format!("identity counter for {kind} cannot be allocated")),
        1 => counters.first().expect("counted one record"),
        _ => return corrupt(format!("duplicate identity counters for {kind}")),
    };
    let raw = match store.get_primary_record(IDENTITY_FILE, key) {
        Some(raw) => raw,
        None => return corrupt(format!("identity counter record for {kind} expected but not found")),
    };
    let old = IdentityCounter::decode(raw)?;
    if old.kind != kind {
        return corrupt(format!("record is not the {kind} identity counter"));
    }
    let new = IdentityCounter {
        kind: old.kind.clone(),
        code: old.code + 1,
    };
    store.edit_record(IDENTITY_FILE, key, &old, &new)?;
    Ok(format_code(new.code))
}
