//! Core type aliases, constants, and shared runtime pieces for perfcalc.
//!
//! This crate provides the foundational types and configuration parameters
//! used throughout the perfcalc workspace.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Primary record key allocated by the store.
pub type Key = u64;
/// Performance numbers, rewards, and iteration values.
pub type Performance = f64;
/// Result of an operation that may be refused or abort.
pub type Outcome<T> = std::result::Result<T, Fault>;

// ============================================================================
// FAILURE
// ============================================================================
/// Failure raised by store-touching operations.
///
/// `Refused` carries a human-readable message for a recoverable user
/// mistake; the transaction is backed out and the message is shown.
/// `Corrupt` marks an invariant violation; the outer handler logs and
/// aborts. `Io` wraps an underlying storage failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    Refused(String),
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fault::Refused(message) => write!(f, "{}", message),
            Fault::Corrupt(message) => write!(f, "database integrity: {}", message),
            Fault::Io(message) => write!(f, "storage: {}", message),
        }
    }
}

impl std::error::Error for Fault {}

impl From<std::io::Error> for Fault {
    fn from(error: std::io::Error) -> Self {
        Fault::Io(error.to_string())
    }
}

/// Shorthand for refusing an operation with a message.
pub fn refused<T>(message: impl Into<String>) -> Outcome<T> {
    Err(Fault::Refused(message.into()))
}

/// Shorthand for aborting on an invariant violation.
pub fn corrupt<T>(message: impl Into<String>) -> Outcome<T> {
    Err(Fault::Corrupt(message.into()))
}

// ============================================================================
// PGN TAG NAMES
// ============================================================================
pub const TAG_RESULT: &str = "Result";
pub const TAG_DATE: &str = "Date";
pub const TAG_TIMECONTROL: &str = "TimeControl";
pub const TAG_MODE: &str = "Mode";
pub const TAG_EVENT: &str = "Event";
pub const TAG_EVENTDATE: &str = "EventDate";
pub const TAG_SECTION: &str = "Section";
pub const TAG_STAGE: &str = "Stage";
pub const TAG_WHITE: &str = "White";
pub const TAG_BLACK: &str = "Black";
pub const TAG_WHITETEAM: &str = "WhiteTeam";
pub const TAG_BLACKTEAM: &str = "BlackTeam";
pub const TAG_WHITEFIDEID: &str = "WhiteFideId";
pub const TAG_BLACKFIDEID: &str = "BlackFideId";

/// Result tag values eligible for import.
pub const WIN_DRAW_LOSS: [&str; 3] = ["1-0", "0-1", "1/2-1/2"];
/// PGN file extension, compared case-insensitively.
pub const PGN_EXT: &str = "pgn";

// ============================================================================
// IDENTITY KINDS
// One counter record per kind; codes are allocated per kind.
// ============================================================================
pub const PLAYER_IDENTITY_KIND: &str = "player";
pub const EVENT_IDENTITY_KIND: &str = "event";
pub const TIME_IDENTITY_KIND: &str = "time";
pub const MODE_IDENTITY_KIND: &str = "mode";

/// Zero-padded width of identity codes. Padding keeps lexicographic
/// index order aligned with numeric allocation order.
pub const CODE_WIDTH: usize = 12;

/// Render an allocated code in index form.
pub fn format_code(code: u64) -> String {
    format!("{:0width$}", code, width = CODE_WIDTH)
}

// ============================================================================
// CALCULATION PARAMETERS
// ============================================================================
/// Scale of one game: win = +measure, draw = 0, loss = -measure.
pub const MEASURE: Performance = 50.0;
/// Stability tolerance between successive iteration values.
pub const STABILITY_DELTA: Performance = 1e-12;
/// Inserts per commit segment during bulk import.
pub const SEGMENT_SIZE: usize = 4000;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Name of the unhandled-failure side channel in the database directory.
pub const ERROR_LOG: &str = "ErrorLog";

/// Cancellation token checked between records by long-running passes.
#[derive(Clone, Debug, Default)]
pub struct Stop(std::sync::Arc<std::sync::atomic::AtomicBool>);

impl Stop {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set(&self) {
        self.0.store(true, std::sync::atomic::Ordering::Relaxed);
    }
    pub fn is_set(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::Relaxed)
    }
}

/// Progress sink for import and copy passes.
///
/// `append_text` marks a new progress event; `append_text_only` continues
/// the previous one.
pub trait Reporter {
    fn append_text(&mut self, text: &str);
    fn append_text_only(&mut self, text: &str);
}

/// Reporter that forwards progress events to the log facade.
pub struct LogReporter;

impl Reporter for LogReporter {
    fn append_text(&mut self, text: &str) {
        log::info!("{}", text);
    }
    fn append_text_only(&mut self, text: &str) {
        if !text.is_empty() {
            log::info!("{}", text);
        }
    }
}

/// Reporter that discards progress events.
pub struct Silent;

impl Reporter for Silent {
    fn append_text(&mut self, _text: &str) {}
    fn append_text_only(&mut self, _text: &str) {}
}

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes Debug level to file, Info to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register graceful interrupt handler. Type "Q" + Enter to stop after the
/// current record.
pub fn quit_on_stdin(stop: Stop) {
    std::thread::spawn(move || {
        loop {
            let ref mut buffer = String::new();
            if let Ok(_) = std::io::stdin().read_line(buffer) {
                if buffer.trim().to_uppercase() == "Q" {
                    log::warn!("graceful interrupt requested, finishing current record...");
                    stop.set();
                    break;
                }
            }
        }
    });
}

/// Route panic messages to the ErrorLog side channel in the database
/// directory before the process dies.
pub fn trap_panics(directory: &std::path::Path) {
    let path = directory.join(ERROR_LOG);
    std::panic::set_hook(Box::new(move |info| {
        use std::io::Write;
        log::error!("{}", info);
        if let Ok(mut file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            let _ = writeln!(file, "{}", info);
        }
    }));
}
