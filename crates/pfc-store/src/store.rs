use crate::RecordList;
use crate::snapshot;
use crate::tables::Pack;
use crate::tables::Tables;
use pfc_core::*;
use std::path::Path;
use std::path::PathBuf;

/// Operation surface shared by every storage backend.
///
/// Backends supply the backing [`Tables`] and a `persist` hook; every
/// record, index, and transaction operation is provided on top of those.
pub trait Store {
    fn state(&self) -> &Tables;
    fn state_mut(&mut self) -> &mut Tables;
    /// Flush committed state to the backend's durable medium.
    fn persist(&mut self) -> Outcome<()>;

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------
    fn start_transaction(&mut self) {
        self.state_mut().begin();
    }

    fn commit(&mut self) -> Outcome<()> {
        self.state_mut().clear_journal()?;
        self.persist()
    }

    fn backout(&mut self) {
        self.state_mut().rollback();
    }

    fn start_read_only_transaction(&self) {
        self.state().enter_read_only();
    }

    fn end_read_only_transaction(&self) {
        self.state().leave_read_only();
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------
    /// Insert a record, allocating and returning its primary key.
    fn put_record(&mut self, file: &str, record: &dyn Pack) -> Outcome<Key> {
        self.state_mut().put(file, record.value(), record.index())
    }

    /// Replace a record, applying the index delta between old and new.
    fn edit_record(&mut self, file: &str, key: Key, old: &dyn Pack, new: &dyn Pack) -> Outcome<()> {
        self.state_mut()
            .edit(file, key, old.index(), new.value(), new.index())
    }

    fn delete_record(&mut self, file: &str, key: Key, record: &dyn Pack) -> Outcome<()> {
        self.state_mut().delete(file, key, record.index())
    }

    fn get_primary_record(&self, file: &str, key: Key) -> Option<&str> {
        self.state().record(file, key)
    }

    /// Byte representation used by the index layer. UTF-8 already orders
    /// bytewise, so both backends encode the key verbatim.
    fn encode_record_selector(&self, key: &str) -> Vec<u8> {
        key.as_bytes().to_vec()
    }

    // ------------------------------------------------------------------
    // Record lists
    // ------------------------------------------------------------------
    fn recordlist_key(&self, file: &str, index: &str, key: &str) -> RecordList {
        self.state()
            .list_key(file, index, &self.encode_record_selector(key))
    }

    /// All records whose index key lies in [ge, le] inclusive.
    fn recordlist_key_range(&self, file: &str, index: &str, ge: &str, le: &str) -> RecordList {
        self.state().list_key_range(
            file,
            index,
            &self.encode_record_selector(ge),
            &self.encode_record_selector(le),
        )
    }

    /// All records in the file.
    fn recordlist_ebm(&self, file: &str) -> RecordList {
        self.state().list_all(file)
    }

    fn recordlist_nil(&self, _file: &str) -> RecordList {
        RecordList::default()
    }

    // ------------------------------------------------------------------
    // Cursors
    // ------------------------------------------------------------------
    /// Ordered walk over a record set, yielding (primary key, value).
    fn record_cursor<'a>(
        &'a self,
        file: &'a str,
        recordset: &'a RecordList,
    ) -> impl Iterator<Item = (Key, &'a str)> + 'a {
        self.state().record_cursor(file, recordset)
    }

    /// Ordered walk over a whole index, yielding (index key, primary key).
    fn index_cursor<'a>(
        &'a self,
        file: &'a str,
        index: &'a str,
    ) -> impl Iterator<Item = (String, Key)> + 'a {
        self.state().index_cursor(file, index)
    }
}

/// Transient backend: state lives and dies with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Tables,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn state(&self) -> &Tables {
        &self.state
    }
    fn state_mut(&mut self) -> &mut Tables {
        &mut self.state
    }
    fn persist(&mut self) -> Outcome<()> {
        Ok(())
    }
}

/// Durable backend: committed state is snapshotted to a single file,
/// written to a sibling temp file and renamed into place.
#[derive(Debug)]
pub struct FileStore {
    state: Tables,
    path: PathBuf,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Outcome<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            snapshot::load(&path)?
        } else {
            Tables::default()
        };
        Ok(Self { state, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for FileStore {
    fn state(&self) -> &Tables {
        &self.state
    }
    fn state_mut(&mut self) -> &mut Tables {
        &mut self.state
    }
    fn persist(&mut self) -> Outcome<()> {
        snapshot::save(&self.path, &self.state)
    }
}

/// Backend selection at open time.
pub enum Database {
    Memory(MemoryStore),
    File(FileStore),
}

impl Database {
    pub fn memory() -> Self {
        Database::Memory(MemoryStore::new())
    }

    pub fn open(path: impl AsRef<Path>) -> Outcome<Self> {
        Ok(Database::File(FileStore::open(path)?))
    }
}

impl Store for Database {
    fn state(&self) -> &Tables {
        match self {
            Database::Memory(store) => store.state(),
            Database::File(store) => store.state(),
        }
    }
    fn state_mut(&mut self) -> &mut Tables {
        match self {
            Database::Memory(store) => store.state_mut(),
            Database::File(store) => store.state_mut(),
        }
    }
    fn persist(&mut self) -> Outcome<()> {
        match self {
            Database::Memory(store) => store.persist(),
            Database::File(store) => store.persist(),
        }
    }
}

/// Begin a transaction, run `work`, commit on success, back out on any
/// failure. Every store-touching operation follows this template.
pub fn transact<S: Store, T>(
    store: &mut S,
    work: impl FnOnce(&mut S) -> Outcome<T>,
) -> Outcome<T> {
    store.start_transaction();
    match work(store) {
        Ok(value) => {
            store.commit()?;
            Ok(value)
        }
        Err(fault) => {
            store.backout();
            Err(fault)
        }
    }
}

/// Run read-only `work`, ending the read-only transaction on all exit
/// paths.
pub fn read<S: Store, T>(store: &S, work: impl FnOnce(&S) -> Outcome<T>) -> Outcome<T> {
    store.start_read_only_transaction();
    let result = work(store);
    store.end_read_only_transaction();
    result
}
