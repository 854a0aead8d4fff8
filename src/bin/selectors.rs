//! Selectors Binary
//!
//! Maintains stored calculation rules: list, create, and delete.

use anyhow::bail;
use clap::Parser;
use clap::Subcommand;
use perfcalc::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "selectors", about = "Maintain stored calculation rules")]
struct Arguments {
    /// Database directory.
    #[arg(long)]
    database: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the stored rules.
    List,
    /// Store a new rule.
    New {
        name: String,
        /// Person identity the population grows outward from.
        #[arg(long)]
        player: Option<String>,
        /// Event identity; repeat for several events.
        #[arg(long = "event")]
        events: Vec<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        timecontrol: Option<String>,
        #[arg(long)]
        mode: Option<String>,
    },
    /// Delete a stored rule by name.
    Delete { name: String },
}

/// One-line summary of a rule, with identity codes resolved to the
/// canonical names where they are still on file.
fn describe<S: Store>(store: &S, rule: &Rule) -> Outcome<String> {
    let mut parts = Vec::new();
    if let Some(code) = &rule.person_identity {
        let name = player_display_name(store, code)?;
        parts.push(format!("player {}", name.as_deref().unwrap_or(code.as_str())));
    }
    for code in &rule.event_identities {
        let name = entity_name_from_identity::<Event, S>(store, code)?;
        parts.push(format!("event {}", name.as_deref().unwrap_or(code.as_str())));
    }
    if let (Some(from), Some(to)) = (&rule.from_date, &rule.to_date) {
        parts.push(format!("{from} to {to}"));
    }
    if let Some(code) = &rule.time_control_identity {
        let name = entity_name_from_identity::<TimeControl, S>(store, code)?;
        parts.push(format!("time control {}", name.as_deref().unwrap_or(code.as_str())));
    }
    if let Some(code) = &rule.mode_identity {
        let name = entity_name_from_identity::<Mode, S>(store, code)?;
        parts.push(format!("mode {}", name.as_deref().unwrap_or(code.as_str())));
    }
    Ok(parts.join(", "))
}

fn main() -> anyhow::Result<()> {
    log();
    let arguments = Arguments::parse();
    trap_panics(&arguments.database);
    let mut store = Database::open(arguments.database.join("perfcalc.db"))?;
    match arguments.command {
        Command::List => {
            for (_, rule) in list_rules(&store)? {
                println!("{:<32} {}", rule.name, describe(&store, &rule)?);
            }
        }
        Command::New {
            name,
            player,
            events,
            from,
            to,
            timecontrol,
            mode,
        } => {
            if rule_by_name(&store, &name)?.is_some() {
                bail!("a rule named {name} already exists");
            }
            let rule = Rule {
                name: name.clone(),
                person_identity: player,
                from_date: from,
                to_date: to,
                time_control_identity: timecontrol,
                mode_identity: mode,
                event_identities: events,
            };
            insert_rule(&mut store, &rule)?;
            log::info!("{:<32}{:<32}", "rule stored", name);
        }
        Command::Delete { name } => match rule_by_name(&store, &name)? {
            Some((key, rule)) => {
                delete_rule(&mut store, key, &rule)?;
                log::info!("{:<32}{:<32}", "rule deleted", name);
            }
            None => bail!("no stored rule named {name}"),
        },
    }
    Ok(())
}
