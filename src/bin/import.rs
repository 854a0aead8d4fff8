//! Import Binary
//!
//! Walks a directory tree for PGN files, imports game headers, and
//! derives player, event, time-control, and mode records. Type "Q" +
//! Enter to stop after the current record; rerunning resumes where the
//! committed segments left off.

use anyhow::Context;
use clap::Parser;
use perfcalc::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "import",
    about = "Import PGN game headers and derive players, events, time controls, and modes"
)]
struct Arguments {
    /// Database directory; created if missing.
    #[arg(long)]
    database: PathBuf,
    /// Directory tree searched for *.pgn files.
    pgn: PathBuf,
    /// Count games instead of importing them.
    #[arg(long)]
    count: bool,
}

fn main() -> anyhow::Result<()> {
    log();
    let arguments = Arguments::parse();
    let stop = Stop::new();
    quit_on_stdin(stop.clone());
    let mut reporter = LogReporter;
    if arguments.count {
        match count_pgn_games(&arguments.pgn, &mut reporter, &stop)? {
            Some(counted) => log::info!("{:<32}{:<32}", "games counted", counted),
            None => log::warn!("count stopped"),
        }
        return Ok(());
    }
    std::fs::create_dir_all(&arguments.database)
        .with_context(|| format!("create {}", arguments.database.display()))?;
    trap_panics(&arguments.database);
    let mut store = Database::open(arguments.database.join("perfcalc.db"))?;
    create_identity_records_if_missing(&mut store)?;
    let done = import_pgn_headers(&mut store, &arguments.pgn, &mut reporter, &stop)?
        && copy_all_names_from_games(&mut store, &mut reporter, &stop)?;
    if done {
        log::info!("{:<32}{:<32}", "import complete", arguments.pgn.display());
    } else {
        log::warn!("import stopped before completion");
    }
    Ok(())
}
