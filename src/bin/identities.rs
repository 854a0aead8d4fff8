//! Identities Binary
//!
//! Exports and imports player identifications, and runs the by-name
//! auto-identification over the new-player list.

use clap::Parser;
use clap::Subcommand;
use perfcalc::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "identities",
    about = "Export, import, and derive player identifications"
)]
struct Arguments {
    /// Database directory.
    #[arg(long)]
    database: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export every identified person with its aliases.
    Export {
        #[arg(long)]
        output: PathBuf,
    },
    /// Export person identities only, without aliases.
    ExportIdentities {
        #[arg(long)]
        output: PathBuf,
    },
    /// Export every person implicated in the given events' games.
    ExportEvents {
        #[arg(long)]
        output: PathBuf,
        /// Event identity; repeat for several events.
        #[arg(long = "event")]
        events: Vec<String>,
    },
    /// Import identifications from an export file.
    Import {
        #[arg(long)]
        input: PathBuf,
        /// Map onto existing identified persons only.
        #[arg(long)]
        mirror: bool,
    },
    /// Identify new players whose normalised name matches exactly one
    /// identified person.
    ByName,
}

/// Keys of every canonical identified person.
fn canonical_person_keys<S: Store>(store: &S) -> Outcome<Vec<Key>> {
    let mut keys = Vec::new();
    for (_, key) in store.index_cursor(PLAYER_FILE, PERSON_ALIAS_INDEX) {
        let player = load_player(store, key)?;
        if player.is_canonical() {
            keys.push(key);
        }
    }
    Ok(keys)
}

fn main() -> anyhow::Result<()> {
    log();
    let arguments = Arguments::parse();
    trap_panics(&arguments.database);
    let mut store = Database::open(arguments.database.join("perfcalc.db"))?;
    let mut reporter = LogReporter;
    match arguments.command {
        Command::Export { output } => {
            let keys = canonical_person_keys(&store)?;
            let groups = export_selected_persons(&store, &keys)?;
            write_export_file(&output, &serialize_groups(&groups))?;
            log::info!("{:<32}{:<32}", "persons exported", groups.len());
        }
        Command::ExportIdentities { output } => {
            let identities = export_identities(&store)?;
            let groups: Vec<PersonGroup> =
                identities.into_iter().map(|tuple| vec![tuple]).collect();
            write_export_file(&output, &serialize_groups(&groups))?;
            log::info!("{:<32}{:<32}", "identities exported", groups.len());
        }
        Command::ExportEvents { output, events } => {
            let mut keys = Vec::new();
            for code in &events {
                let group = entity_group::<Event, _>(&store, code);
                if group.is_empty() {
                    anyhow::bail!("event identity {code} is not on file");
                }
                keys.extend(group.iter());
            }
            let groups = export_event_persons(&store, &keys)?;
            write_export_file(&output, &serialize_groups(&groups))?;
            log::info!("{:<32}{:<32}", "persons exported", groups.len());
        }
        Command::Import { input, mirror } => {
            let groups = read_export_file(&input)?;
            let identified = if mirror {
                mirror_imported_identities(&mut store, &groups, &mut reporter)?
            } else {
                apply_imported_identities(&mut store, &groups, &mut reporter)?
            };
            log::info!("{:<32}{:<32}", "players identified", identified);
        }
        Command::ByName => {
            let identified = identify_players_by_name(&mut store, &mut reporter)?;
            log::info!("{:<32}{:<32}", "players identified by name", identified);
        }
    }
    Ok(())
}
