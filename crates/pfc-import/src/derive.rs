use pfc_core::*;
use pfc_records::*;
use pfc_store::Store;

/// An entity kind derived from a game index after import.
///
/// The four kinds share the pass: walk the game index in key order, dedup
/// on key change, and insert a new record with a freshly allocated
/// identity for each key not already on file.
pub trait Derived: Sized {
    /// Game index the natural keys are read from.
    const GAME_INDEX: &'static str;
    /// Identity-counter kind codes are allocated from.
    const KIND: &'static str;
    /// Plural label for reporter messages.
    const LABEL: &'static str;

    fn from_game_key(key: &str) -> Outcome<Self>;
    fn set_code(&mut self, code: &str);
    fn display_name(&self) -> String;
    fn natural_key(&self) -> String;
    /// True if a record for this natural key already exists.
    fn on_file<S: Store>(store: &S, natural_key: &str) -> bool;
    fn insert<S: Store>(&self, store: &mut S) -> Outcome<Key>;
}

impl Derived for Player {
    const GAME_INDEX: &'static str = GAME_PLAYER_INDEX;
    const KIND: &'static str = PLAYER_IDENTITY_KIND;
    const LABEL: &'static str = "player";

    fn from_game_key(key: &str) -> Outcome<Self> {
        Player::from_side_key(key)
    }
    fn set_code(&mut self, code: &str) {
        self.alias = code.to_string();
        self.identity = code.to_string();
    }
    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_default()
    }
    fn natural_key(&self) -> String {
        self.alias_index_key()
    }
    fn on_file<S: Store>(store: &S, natural_key: &str) -> bool {
        // A player occurrence may be on file in either index family.
        store
            .recordlist_key(PLAYER_FILE, PERSON_ALIAS_INDEX, natural_key)
            .count_records()
            > 0
            || store
                .recordlist_key(PLAYER_FILE, PLAYER_ALIAS_INDEX, natural_key)
                .count_records()
                > 0
    }
    fn insert<S: Store>(&self, store: &mut S) -> Outcome<Key> {
        store.put_record(PLAYER_FILE, &AsPlayer(self))
    }
}

impl Derived for Event {
    const GAME_INDEX: &'static str = GAME_EVENT_INDEX;
    const KIND: &'static str = EVENT_IDENTITY_KIND;
    const LABEL: &'static str = "event";

    fn from_game_key(key: &str) -> Outcome<Self> {
        Event::from_event_key(key)
    }
    fn set_code(&mut self, code: &str) {
        self.alias = code.to_string();
        self.identity = code.to_string();
    }
    fn display_name(&self) -> String {
        self.event.clone().unwrap_or_default()
    }
    fn natural_key(&self) -> String {
        self.alias_index_key()
    }
    fn on_file<S: Store>(store: &S, natural_key: &str) -> bool {
        store
            .recordlist_key(EVENT_FILE, EVENT_ALIAS_INDEX, natural_key)
            .count_records()
            > 0
    }
    fn insert<S: Store>(&self, store: &mut S) -> Outcome<Key> {
        store.put_record(EVENT_FILE, self)
    }
}

impl Derived for TimeControl {
    const GAME_INDEX: &'static str = GAME_TIMECONTROL_INDEX;
    const KIND: &'static str = TIME_IDENTITY_KIND;
    const LABEL: &'static str = "time control";

    fn from_game_key(key: &str) -> Outcome<Self> {
        Ok(TimeControl::from_tag(key))
    }
    fn set_code(&mut self, code: &str) {
        self.alias = code.to_string();
        self.identity = code.to_string();
    }
    fn display_name(&self) -> String {
        self.timecontrol.clone().unwrap_or_default()
    }
    fn natural_key(&self) -> String {
        self.alias_index_key()
    }
    fn on_file<S: Store>(store: &S, natural_key: &str) -> bool {
        store
            .recordlist_key(TIME_FILE, TIME_ALIAS_INDEX, natural_key)
            .count_records()
            > 0
    }
    fn insert<S: Store>(&self, store: &mut S) -> Outcome<Key> {
        store.put_record(TIME_FILE, self)
    }
}

impl Derived for Mode {
    const GAME_INDEX: &'static str = GAME_MODE_INDEX;
    const KIND: &'static str = MODE_IDENTITY_KIND;
    const LABEL: &'static str = "mode";

    fn from_game_key(key: &str) -> Outcome<Self> {
        Ok(Mode::from_tag(key))
    }
    fn set_code(&mut self, code: &str) {
        self.alias = code.to_string();
        self.identity = code.to_string();
    }
    fn display_name(&self) -> String {
        self.mode.clone().unwrap_or_default()
    }
    fn natural_key(&self) -> String {
        self.alias_index_key()
    }
    fn on_file<S: Store>(store: &S, natural_key: &str) -> bool {
        store
            .recordlist_key(MODE_FILE, MODE_ALIAS_INDEX, natural_key)
            .count_records()
            > 0
    }
    fn insert<S: Store>(&self, store: &mut S) -> Outcome<Key> {
        store.put_record(MODE_FILE, self)
    }
}

/// Distinct keys of a game index in index order.
fn distinct_game_keys<D: Derived, S: Store>(store: &S) -> Vec<String> {
    let mut distinct = Vec::new();
    let mut previous: Option<String> = None;
    for (key, _) in store.index_cursor(GAME_FILE, D::GAME_INDEX) {
        if previous.as_deref() == Some(key.as_str()) {
            continue;
        }
        previous = Some(key.clone());
        distinct.push(key);
    }
    distinct
}

/// Populate an entity file from the corresponding game index.
///
/// Each distinct game-index key not already on file gets a new record
/// with `identity = alias = <new code>`. Segment commits bound the write
/// set. Returns Ok(false) without committing the in-flight segment when
/// `stop` is set.
pub fn copy_names_from_games<D: Derived, S: Store>(
    store: &mut S,
    reporter: &mut dyn Reporter,
    stop: &Stop,
) -> Outcome<bool> {
    reporter.append_text(&format!("Copy {} names from games.", D::LABEL));
    let distinct = distinct_game_keys::<D, S>(store);
    store.start_transaction();
    match copy_pass::<D, S>(store, &distinct, reporter, stop) {
        Ok(Some((copy_count, onfile_count))) => {
            store.commit()?;
            reporter.append_text_only("");
            reporter.append_text(&format!("{} {}s added to database.", copy_count, D::LABEL));
            reporter.append_text_only(&format!(
                "{} {}s already on database.",
                onfile_count,
                D::LABEL
            ));
            reporter.append_text_only(&format!("{} game references processed.", distinct.len()));
            reporter.append_text_only("");
            Ok(true)
        }
        Ok(None) => {
            store.backout();
            Ok(false)
        }
        Err(fault) => {
            store.backout();
            Err(fault)
        }
    }
}

fn copy_pass<D: Derived, S: Store>(
    store: &mut S,
    distinct: &[String],
    reporter: &mut dyn Reporter,
    stop: &Stop,
) -> Outcome<Option<(usize, usize)>> {
    let mut copy_count = 0usize;
    let mut onfile_count = 0usize;
    for key in distinct {
        if stop.is_set() {
            reporter.append_text_only("");
            reporter.append_text("Copy stopped.");
            return Ok(None);
        }
        let mut record = D::from_game_key(key)?;
        if D::on_file(store, &record.natural_key()) {
            onfile_count += 1;
            continue;
        }
        let code = allocate_identity(store, D::KIND)?;
        record.set_code(&code);
        let record_key = record.insert(store)?;
        copy_count += 1;
        if copy_count % SEGMENT_SIZE == 0 {
            store.commit()?;
            store.start_transaction();
            reporter.append_text(&format!(
                "{} {} is record {}",
                D::LABEL,
                record.display_name(),
                record_key
            ));
        }
    }
    Ok(Some((copy_count, onfile_count)))
}

/// Count the distinct game-index keys not yet on the entity file.
/// Returns Ok(None) when `stop` is set.
pub fn count_names_to_copy<D: Derived, S: Store>(
    store: &S,
    reporter: &mut dyn Reporter,
    stop: &Stop,
) -> Outcome<Option<usize>> {
    reporter.append_text(&format!("Count {} names to be copied from games.", D::LABEL));
    let mut count = 0usize;
    for key in distinct_game_keys::<D, S>(store) {
        if stop.is_set() {
            reporter.append_text_only("");
            reporter.append_text("Count stopped.");
            return Ok(None);
        }
        let record = D::from_game_key(&key)?;
        if !D::on_file(store, &record.natural_key()) {
            count += 1;
        }
    }
    reporter.append_text(&format!(
        "{} {} names to be copied from games.",
        count,
        D::LABEL
    ));
    Ok(Some(count))
}

/// Run the four derived-entity passes in dependency-free order.
pub fn copy_all_names_from_games<S: Store>(
    store: &mut S,
    reporter: &mut dyn Reporter,
    stop: &Stop,
) -> Outcome<bool> {
    Ok(copy_names_from_games::<Player, S>(store, reporter, stop)?
        && copy_names_from_games::<Event, S>(store, reporter, stop)?
        && copy_names_from_games::<TimeControl, S>(store, reporter, stop)?
        && copy_names_from_games::<Mode, S>(store, reporter, stop)?)
}
