use crate::RecordList;
use pfc_core::*;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::ops::Bound;

/// Index terms derived from a record value: (index name, index keys).
pub type IndexTerms = Vec<(&'static str, Vec<String>)>;

/// Capability to serialize a record and derive its secondary index terms.
///
/// The value string is what `get_primary_record` returns; the index terms
/// are what secondary lookups find the record under. Editing a record
/// applies the delta between the old and new terms.
pub trait Pack {
    fn value(&self) -> String;
    fn index(&self) -> IndexTerms;
}

/// One record table: primary records plus its secondary indexes.
#[derive(Clone, Debug, Default)]
pub(crate) struct Table {
    pub(crate) next: Key,
    pub(crate) records: BTreeMap<Key, String>,
    pub(crate) indexes: BTreeMap<String, BTreeMap<Vec<u8>, BTreeSet<Key>>>,
}

/// Owned copy of index terms kept in the undo journal.
type OwnedTerms = Vec<(String, Vec<String>)>;

fn owned(terms: &IndexTerms) -> OwnedTerms {
    terms
        .iter()
        .map(|(index, keys)| (index.to_string(), keys.clone()))
        .collect()
}

/// Inverse operations recorded while a write transaction is open.
#[derive(Clone, Debug)]
enum Undo {
    Unput {
        file: String,
        key: Key,
        terms: OwnedTerms,
    },
    Revert {
        file: String,
        key: Key,
        value: String,
        removed: OwnedTerms,
        added: OwnedTerms,
    },
    Restore {
        file: String,
        key: Key,
        value: String,
        terms: OwnedTerms,
    },
}

/// Backing state shared by every store backend.
///
/// All mutation goes through the journal: writes outside a transaction are
/// an integrity fault, and backout replays the journal in reverse.
#[derive(Debug, Default)]
pub struct Tables {
    pub(crate) tables: BTreeMap<String, Table>,
    journal: Option<Vec<Undo>>,
    read_only: std::cell::Cell<u32>,
}

impl Tables {
    fn table(&self, file: &str) -> Option<&Table> {
        self.tables.get(file)
    }

    fn table_mut(&mut self, file: &str) -> &mut Table {
        self.tables.entry(file.to_string()).or_default()
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------
    pub(crate) fn begin(&mut self) {
        debug_assert!(self.journal.is_none(), "transaction already open");
        self.journal = Some(Vec::new());
    }

    pub(crate) fn clear_journal(&mut self) -> Outcome<()> {
        match self.journal.take() {
            Some(_) => Ok(()),
            None => corrupt("commit outside transaction"),
        }
    }

    pub(crate) fn rollback(&mut self) {
        let journal = self.journal.take().unwrap_or_default();
        for undo in journal.into_iter().rev() {
            match undo {
                Undo::Unput { file, key, terms } => {
                    self.unapply_terms(&file, key, &terms);
                    let table = self.table_mut(&file);
                    table.records.remove(&key);
                    table.next = key;
                }
                Undo::Revert {
                    file,
                    key,
                    value,
                    removed,
                    added,
                } => {
                    self.unapply_terms(&file, key, &added);
                    self.apply_terms(&file, key, &removed);
                    self.table_mut(&file).records.insert(key, value);
                }
                Undo::Restore {
                    file,
                    key,
                    value,
                    terms,
                } => {
                    self.apply_terms(&file, key, &terms);
                    self.table_mut(&file).records.insert(key, value);
                }
            }
        }
    }

    fn journal_mut(&mut self) -> Outcome<&mut Vec<Undo>> {
        match self.journal.as_mut() {
            Some(journal) => Ok(journal),
            None => corrupt("write outside transaction"),
        }
    }

    pub(crate) fn enter_read_only(&self) {
        self.read_only.set(self.read_only.get() + 1);
    }

    pub(crate) fn leave_read_only(&self) {
        debug_assert!(self.read_only.get() > 0, "read-only transaction not open");
        self.read_only.set(self.read_only.get().saturating_sub(1));
    }

    // ------------------------------------------------------------------
    // Index maintenance
    // ------------------------------------------------------------------
    fn apply_terms(&mut self, file: &str, key: Key, terms: &OwnedTerms) {
        let table = self.table_mut(file);
        for (index, keys) in terms {
            let index = table.indexes.entry(index.clone()).or_default();
            for index_key in keys {
                index
                    .entry(index_key.as_bytes().to_vec())
                    .or_default()
                    .insert(key);
            }
        }
    }

    fn unapply_terms(&mut self, file: &str, key: Key, terms: &OwnedTerms) {
        let table = self.table_mut(file);
        for (index, keys) in terms {
            if let Some(index) = table.indexes.get_mut(index.as_str()) {
                for index_key in keys {
                    if let Some(entry) = index.get_mut(index_key.as_bytes()) {
                        entry.remove(&key);
                        if entry.is_empty() {
                            index.remove(index_key.as_bytes());
                        }
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Record mutation
    // ------------------------------------------------------------------
    pub(crate) fn put(&mut self, file: &str, value: String, terms: IndexTerms) -> Outcome<Key> {
        self.journal_mut()?;
        let table = self.table_mut(file);
        let key = table.next;
        table.next += 1;
        table.records.insert(key, value);
        let terms = owned(&terms);
        self.apply_terms(file, key, &terms);
        self.journal_mut()?.push(Undo::Unput {
            file: file.to_string(),
            key,
            terms,
        });
        Ok(key)
    }

    pub(crate) fn edit(
        &mut self,
        file: &str,
        key: Key,
        old_terms: IndexTerms,
        value: String,
        new_terms: IndexTerms,
    ) -> Outcome<()> {
        self.journal_mut()?;
        let previous = match self.table(file).and_then(|table| table.records.get(&key)) {
            Some(previous) => previous.clone(),
            None => return corrupt(format!("edit of missing record {key} in {file}")),
        };
        let removed = owned(&old_terms);
        let added = owned(&new_terms);
        self.unapply_terms(file, key, &removed);
        self.apply_terms(file, key, &added);
        self.table_mut(file).records.insert(key, value);
        self.journal_mut()?.push(Undo::Revert {
            file: file.to_string(),
            key,
            value: previous,
            removed,
            added,
        });
        Ok(())
    }

    pub(crate) fn delete(&mut self, file: &str, key: Key, terms: IndexTerms) -> Outcome<()> {
        self.journal_mut()?;
        let value = match self.table_mut(file).records.remove(&key) {
            Some(value) => value,
            None => return corrupt(format!("delete of missing record {key} in {file}")),
        };
        let terms = owned(&terms);
        self.unapply_terms(file, key, &terms);
        self.journal_mut()?.push(Undo::Restore {
            file: file.to_string(),
            key,
            value,
            terms,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------
    pub(crate) fn record(&self, file: &str, key: Key) -> Option<&str> {
        self.table(file)?.records.get(&key).map(String::as_str)
    }

    pub(crate) fn list_key(&self, file: &str, index: &str, selector: &[u8]) -> RecordList {
        self.table(file)
            .and_then(|table| table.indexes.get(index))
            .and_then(|index| index.get(selector))
            .map(|keys| keys.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn list_key_range(
        &self,
        file: &str,
        index: &str,
        ge: &[u8],
        le: &[u8],
    ) -> RecordList {
        self.table(file)
            .and_then(|table| table.indexes.get(index))
            .map(|index| {
                index
                    .range((Bound::Included(ge.to_vec()), Bound::Included(le.to_vec())))
                    .flat_map(|(_, keys)| keys.iter().copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn list_all(&self, file: &str) -> RecordList {
        self.table(file)
            .map(|table| table.records.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Ordered walk over a record set, yielding (primary key, value).
    pub(crate) fn record_cursor<'a>(
        &'a self,
        file: &'a str,
        recordset: &'a RecordList,
    ) -> impl Iterator<Item = (Key, &'a str)> + 'a {
        let table = self.table(file);
        recordset.iter().filter_map(move |key| {
            table
                .and_then(|table| table.records.get(&key))
                .map(|value| (key, value.as_str()))
        })
    }

    /// Ordered walk over an index, yielding (index key, primary key) with
    /// one entry per record under each key.
    pub(crate) fn index_cursor<'a>(
        &'a self,
        file: &'a str,
        index: &'a str,
    ) -> impl Iterator<Item = (String, Key)> + 'a {
        self.table(file)
            .and_then(|table| table.indexes.get(index))
            .into_iter()
            .flat_map(|index| {
                index.iter().flat_map(|(index_key, keys)| {
                    let index_key = String::from_utf8_lossy(index_key).into_owned();
                    keys.iter()
                        .map(move |record_key| (index_key.clone(), *record_key))
                })
            })
    }
}
