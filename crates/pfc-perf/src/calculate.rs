use crate::population::PlayerPerformance;
use crate::population::Population;
use pfc_core::*;
use pfc_records::Rule;
use pfc_select::check_convergence;
use pfc_select::non_convergent_player_names;
use pfc_select::normalise_rule_dates;
use pfc_select::select;
use pfc_store::Store;
use pfc_store::transact;

/// Result of calculating one population.
#[derive(Debug)]
pub struct PopulationReport {
    /// False when the iteration cap was reached before stability.
    pub converged: bool,
    pub iterations: usize,
    pub high_performance: Performance,
    pub players: Vec<PlayerPerformance>,
}

/// Result of one calculation run.
#[derive(Debug)]
pub struct Calculation {
    pub rule: Rule,
    pub selected_games: usize,
    pub selected_players: usize,
    pub populations: Vec<PopulationReport>,
    /// Player names per population found non-convergent, in population
    /// order; these populations have no performance numbers.
    pub non_convergent: Vec<Vec<String>>,
}

/// Calculate player performances for a rule.
///
/// Runs the whole selection and iteration inside one transaction; any
/// failure backs out and is returned to the caller.
pub fn calculate<S: Store>(
    store: &mut S,
    rule: &Rule,
    measure: Performance,
    delta: Performance,
    cap: Option<usize>,
) -> Outcome<Calculation> {
    let mut rule = rule.clone();
    rule.verify()?;
    normalise_rule_dates(&mut rule)?;
    transact(store, |store| {
        let selection = select(store, &rule)?;
        let verdicts = check_convergence(store, &selection.playersets, &selection.games)?;
        let mut populations = Vec::new();
        let mut non_convergent = Vec::new();
        for (playerset, convergent) in selection.playersets.iter().zip(&verdicts) {
            if !convergent {
                non_convergent.push(non_convergent_player_names(store, playerset)?);
                continue;
            }
            let mut population = Population::new(store, playerset, &selection.games, measure)?;
            let converged = population.do_iterations_until_stable(delta, cap);
            population.set_high_performance();
            log::info!(
                "{:<32}{:<32}",
                "population calculated",
                format!(
                    "{} players, {} iterations",
                    playerset.count_records(),
                    population.iterations
                )
            );
            populations.push(PopulationReport {
                converged,
                iterations: population.iterations,
                high_performance: population.high_performance,
                players: population.results(),
            });
        }
        Ok(Calculation {
            rule: rule.clone(),
            selected_games: selection.games.count_records(),
            selected_players: selection.players.count_records(),
            populations,
            non_convergent,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfc_identify::identify_players_as_person;
    use pfc_import::copy_all_names_from_games;
    use pfc_records::*;
    use pfc_store::MemoryStore;
    use pfc_store::Store;
    use std::collections::BTreeMap;

    const CAP: Option<usize> = Some(100_000);

    fn seeded(games: &[(&str, &str, &str, &str)]) -> MemoryStore {
        let mut store = MemoryStore::new();
        create_identity_records_if_missing(&mut store).unwrap();
        transact(&mut store, |store| {
            for (number, (white, black, result, event)) in games.iter().enumerate() {
                let mut headers = BTreeMap::new();
                headers.insert(TAG_WHITE.to_string(), white.to_string());
                headers.insert(TAG_BLACK.to_string(), black.to_string());
                headers.insert(TAG_RESULT.to_string(), result.to_string());
                headers.insert(TAG_EVENT.to_string(), event.to_string());
                let game = Game::new("fixture.pgn", &(number + 1).to_string(), 0, headers);
                store.put_record(GAME_FILE, &game)?;
            }
            Ok(())
        })
        .unwrap();
        copy_all_names_from_games(&mut store, &mut Silent, &Stop::new()).unwrap();
        let players: Vec<Key> = store.recordlist_ebm(PLAYER_FILE).iter().collect();
        for key in players {
            identify_players_as_person(&mut store, &[], key).unwrap();
        }
        store
    }

    fn event_rule(store: &MemoryStore, names: &[&str]) -> Rule {
        let all = store.recordlist_ebm(EVENT_FILE);
        let mut codes = Vec::new();
        for (_, raw) in store.record_cursor(EVENT_FILE, &all) {
            let event = Event::decode(raw).unwrap();
            if names.contains(&event.event.as_deref().unwrap_or_default()) {
                codes.push(event.identity);
            }
        }
        Rule {
            name: names.join(" + "),
            event_identities: codes,
            ..Rule::default()
        }
    }

    fn performance_of(report: &PopulationReport, name: &str) -> Performance {
        report
            .players
            .iter()
            .find(|player| player.name.as_deref() == Some(name))
            .unwrap_or_else(|| panic!("no performance for {name}"))
            .performance
    }

    #[test]
    fn rock_paper_scissors_triangle_lands_on_zero() {
        let mut store = seeded(&[
            ("A", "B", "1-0", "One"),
            ("B", "C", "1-0", "One"),
            ("C", "A", "1-0", "One"),
        ]);
        let rule = event_rule(&store, &["One"]);
        let outcome = calculate(&mut store, &rule, MEASURE, STABILITY_DELTA, CAP).unwrap();
        assert!(outcome.non_convergent.is_empty());
        assert_eq!(outcome.populations.len(), 1);
        let report = &outcome.populations[0];
        assert!(report.converged);
        for name in ["A", "B", "C"] {
            assert!(performance_of(report, name).abs() <= STABILITY_DELTA);
        }
        assert_eq!(report.high_performance, performance_of(report, "A"));
    }

    #[test]
    fn two_wins_one_loss_orders_a_above_c_above_b() {
        // A beats B twice, C beats A, B beats C: a triangle with a
        // doubled A-B edge.
        let mut store = seeded(&[
            ("A", "B", "1-0", "One"),
            ("A", "B", "1-0", "One"),
            ("C", "A", "1-0", "One"),
            ("B", "C", "1-0", "One"),
        ]);
        let rule = event_rule(&store, &["One"]);
        let outcome = calculate(&mut store, &rule, MEASURE, STABILITY_DELTA, CAP).unwrap();
        let report = &outcome.populations[0];
        assert!(report.converged);
        let a = performance_of(report, "A");
        let b = performance_of(report, "B");
        let c = performance_of(report, "C");
        assert!(a > c && c > b, "expected A > C > B, got {a} {c} {b}");
        // The fixed point of the three equations: A - B = 20, C midway.
        assert!((a - b - 20.0).abs() < 1e-6);
        assert!((c - (a + b) / 2.0).abs() < 1e-6);
        // Normalised numbers measure down from the top player.
        let top = &report.players[0];
        assert_eq!(top.name.as_deref(), Some("A"));
        assert!(top.normalised.abs() < 1e-9);
    }

    #[test]
    fn linear_chain_reports_names_instead_of_numbers() {
        let mut store = seeded(&[
            ("A", "B", "1/2-1/2", "One"),
            ("B", "C", "1/2-1/2", "One"),
            ("C", "D", "1/2-1/2", "One"),
        ]);
        let rule = event_rule(&store, &["One"]);
        let outcome = calculate(&mut store, &rule, MEASURE, STABILITY_DELTA, CAP).unwrap();
        assert!(outcome.populations.is_empty());
        assert_eq!(outcome.non_convergent.len(), 1);
        let mut names = outcome.non_convergent[0].clone();
        names.sort();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn disjoint_events_are_processed_independently() {
        let mut store = seeded(&[
            ("A", "B", "1-0", "One"),
            ("B", "C", "1-0", "One"),
            ("C", "A", "1-0", "One"),
            ("X", "Y", "1-0", "Two"),
            ("Y", "Z", "1-0", "Two"),
            ("Z", "X", "1-0", "Two"),
        ]);
        let rule = event_rule(&store, &["One", "Two"]);
        let outcome = calculate(&mut store, &rule, MEASURE, STABILITY_DELTA, CAP).unwrap();
        assert_eq!(outcome.selected_games, 6);
        assert_eq!(outcome.populations.len(), 2);
        assert!(outcome.non_convergent.is_empty());
        for report in &outcome.populations {
            assert!(report.converged);
            assert_eq!(report.players.len(), 3);
        }
    }

    #[test]
    fn one_more_step_after_stability_changes_nothing_material() {
        let mut store = seeded(&[
            ("A", "B", "1-0", "One"),
            ("A", "B", "1-0", "One"),
            ("C", "A", "1-0", "One"),
            ("B", "C", "1-0", "One"),
        ]);
        let rule = event_rule(&store, &["One"]);
        let selection = select(&store, &rule).unwrap();
        let mut population =
            Population::new(&store, &selection.playersets[0], &selection.games, MEASURE).unwrap();
        assert!(population.do_iterations_until_stable(STABILITY_DELTA, CAP));
        let before: Vec<Performance> = population
            .persons()
            .map(|person| person.performance())
            .collect();
        population.iterate_performance();
        let after: Vec<Performance> = population
            .persons()
            .map(|person| person.performance())
            .collect();
        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() <= STABILITY_DELTA);
        }
    }

    #[test]
    fn a_tight_cap_reports_not_converged() {
        let mut store = seeded(&[
            ("A", "B", "1-0", "One"),
            ("A", "B", "1-0", "One"),
            ("C", "A", "1-0", "One"),
            ("B", "C", "1-0", "One"),
        ]);
        let rule = event_rule(&store, &["One"]);
        let outcome = calculate(&mut store, &rule, MEASURE, STABILITY_DELTA, Some(2)).unwrap();
        assert_eq!(outcome.populations.len(), 1);
        assert!(!outcome.populations[0].converged);
        assert_eq!(outcome.populations[0].iterations, 2);
    }

    #[test]
    fn rewards_scale_with_the_measure() {
        let games = [
            ("A", "B", "1-0", "One"),
            ("B", "C", "1-0", "One"),
            ("C", "A", "1-0", "One"),
            ("A", "B", "1-0", "One"),
        ];
        let mut store = seeded(&games);
        let rule = event_rule(&store, &["One"]);
        let at_50 = calculate(&mut store, &rule, 50.0, STABILITY_DELTA, CAP).unwrap();
        let mut store = seeded(&games);
        let at_100 = calculate(&mut store, &rule, 100.0, STABILITY_DELTA, CAP).unwrap();
        let spread_50 = performance_of(&at_50.populations[0], "A")
            - performance_of(&at_50.populations[0], "B");
        let spread_100 = performance_of(&at_100.populations[0], "A")
            - performance_of(&at_100.populations[0], "B");
        assert!((spread_100 - 2.0 * spread_50).abs() < 1e-6);
    }
}
