//! Calculate Binary
//!
//! Evaluates a calculation rule, stored or given inline, and prints the
//! performance numbers per population. Non-convergent populations are
//! listed by player name instead.

use anyhow::bail;
use clap::Parser;
use perfcalc::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "calculate",
    about = "Calculate player performance numbers for a rule"
)]
struct Arguments {
    /// Database directory.
    #[arg(long)]
    database: PathBuf,
    /// Name of a stored rule; inline rule flags are ignored when given.
    #[arg(long)]
    rule: Option<String>,
    /// Person identity the population grows outward from.
    #[arg(long)]
    player: Option<String>,
    /// Event identity; repeat for several events.
    #[arg(long = "event")]
    events: Vec<String>,
    /// First date of the range, any common spelling.
    #[arg(long)]
    from: Option<String>,
    /// Last date of the range, any common spelling.
    #[arg(long)]
    to: Option<String>,
    /// Time-control identity filter.
    #[arg(long)]
    timecontrol: Option<String>,
    /// Playing-mode identity filter.
    #[arg(long)]
    mode: Option<String>,
    /// Scale of one game: win = +measure, loss = -measure.
    #[arg(long, default_value_t = MEASURE)]
    measure: Performance,
    /// Stability tolerance between iterations.
    #[arg(long, default_value_t = STABILITY_DELTA)]
    delta: Performance,
    /// Iteration cap; unbounded when absent.
    #[arg(long)]
    max_iterations: Option<usize>,
}

fn resolve_rule<S: Store>(store: &S, arguments: &Arguments) -> anyhow::Result<Rule> {
    if let Some(name) = &arguments.rule {
        match rule_by_name(store, name)? {
            Some((_, rule)) => return Ok(rule),
            None => bail!("no stored rule named {name}"),
        }
    }
    Ok(Rule {
        name: "command line".to_string(),
        person_identity: arguments.player.clone(),
        from_date: arguments.from.clone(),
        to_date: arguments.to.clone(),
        time_control_identity: arguments.timecontrol.clone(),
        mode_identity: arguments.mode.clone(),
        event_identities: arguments.events.clone(),
    })
}

fn print_population(report: &PopulationReport) {
    if !report.converged {
        println!(
            "Population did not reach stability in {} iterations.",
            report.iterations
        );
    }
    println!(
        "┌──────────────────────────────┬───────┬──────────┬─────────────┬────────────┐"
    );
    println!(
        "│ Player                       │ Games │   Reward │ Performance │ Normalised │"
    );
    println!(
        "├──────────────────────────────┼───────┼──────────┼─────────────┼────────────┤"
    );
    for player in &report.players {
        println!(
            "│ {:<28} │ {:>5} │ {:>+8.1} │ {:>11.3} │ {:>10.3} │",
            player.name.as_deref().unwrap_or(&player.identity),
            player.game_count,
            player.reward,
            player.performance,
            player.normalised,
        );
    }
    println!(
        "└──────────────────────────────┴───────┴──────────┴─────────────┴────────────┘"
    );
}

fn main() -> anyhow::Result<()> {
    log();
    let arguments = Arguments::parse();
    trap_panics(&arguments.database);
    let mut store = Database::open(arguments.database.join("perfcalc.db"))?;
    let rule = resolve_rule(&store, &arguments)?;
    let outcome = calculate(
        &mut store,
        &rule,
        arguments.measure,
        arguments.delta,
        arguments.max_iterations,
    )?;
    println!(
        "Rule '{}': {} games, {} players.",
        outcome.rule.name, outcome.selected_games, outcome.selected_players
    );
    for report in &outcome.populations {
        println!();
        println!(
            "Population of {} players, stable after {} iterations, high performance {:.3}.",
            report.players.len(),
            report.iterations,
            report.high_performance
        );
        print_population(report);
    }
    for names in &outcome.non_convergent {
        println!();
        println!(
            "Population of {} players cannot converge; no numbers calculated:",
            names.len()
        );
        for name in names {
            println!("  {name}");
        }
    }
    Ok(())
}
