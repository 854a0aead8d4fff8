use crate::person::Person;
use pfc_core::*;
use pfc_identify::canonical_player;
use pfc_identify::load_player;
use pfc_identify::person_games;
use pfc_records::*;
use pfc_store::RecordList;
use pfc_store::Store;
use std::collections::BTreeMap;

/// Player's reward for one game, given the opponent's colour.
fn reward_for(result: &str, opponent_is_black: bool) -> Option<i32> {
    match (result, opponent_is_black) {
        ("1-0", true) => Some(1),
        ("1-0", false) => Some(-1),
        ("0-1", true) => Some(-1),
        ("0-1", false) => Some(1),
        ("1/2-1/2", _) => Some(0),
        _ => None,
    }
}

/// One population's calculation state, keyed by canonical identity.
#[derive(Debug)]
pub struct Population {
    pub iterations: usize,
    pub high_performance: Performance,
    persons: BTreeMap<String, Person>,
}

impl Population {
    /// Accumulate rewards, game counts, and opponent lists for every
    /// player of `playerset` across its selected games.
    pub fn new<S: Store>(
        store: &S,
        playerset: &RecordList,
        games: &RecordList,
        measure: Performance,
    ) -> Outcome<Self> {
        let mut persons = BTreeMap::new();
        for key in playerset.iter() {
            let player = load_player(store, key)?;
            let mut person = Person::new(player.identity.clone(), player.name.clone());
            let mut person_games = person_games(store, &player)?;
            person_games &= games;
            for (_, raw) in store.record_cursor(GAME_FILE, &person_games) {
                let game = Game::decode(raw)?;
                let Some(result) = game.result() else {
                    continue;
                };
                for (side, game_player) in [game.black_key(), game.white_key()].iter().enumerate()
                {
                    let Some((_, opponent)) = canonical_player(store, game_player)? else {
                        continue;
                    };
                    if opponent.identity == player.identity {
                        continue;
                    }
                    let Some(reward) = reward_for(result, side == 0) else {
                        continue;
                    };
                    person.add_reward(reward, measure);
                    person.opponents.push(opponent.identity);
                }
            }
            persons.insert(player.identity, person);
        }
        Ok(Self {
            iterations: 0,
            high_performance: 0.0,
            persons,
        })
    }

    /// One iteration: zero every player's points, add each opponent's
    /// latest performance, then recompute every performance.
    pub fn iterate_performance(&mut self) {
        for person in self.persons.values_mut() {
            person.set_points();
        }
        let current: BTreeMap<String, Performance> = self
            .persons
            .iter()
            .map(|(identity, person)| (identity.clone(), person.performance()))
            .collect();
        for person in self.persons.values_mut() {
            let points: Performance = person
                .opponents
                .iter()
                .filter_map(|opponent| current.get(opponent))
                .sum();
            person.add_points(points);
        }
        for person in self.persons.values_mut() {
            person.calculate_performance();
        }
    }

    /// Iterate until every performance varies by no more than `delta`
    /// from the previous two iterations. Returns false when the optional
    /// iteration cap is reached first.
    pub fn do_iterations_until_stable(
        &mut self,
        delta: Performance,
        cap: Option<usize>,
    ) -> bool {
        loop {
            self.iterations += 1;
            self.iterate_performance();
            if self
                .persons
                .values()
                .all(|person| person.is_performance_stable(delta))
            {
                return true;
            }
            if let Some(cap) = cap {
                if self.iterations >= cap {
                    return false;
                }
            }
        }
    }

    /// Note the highest performance in the population.
    pub fn set_high_performance(&mut self) {
        let mut high_performance: Performance = 0.0;
        for person in self.persons.values() {
            high_performance = high_performance.max(person.performance());
        }
        self.high_performance = high_performance;
    }

    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.persons.values()
    }

    /// Performance of each player, highest first, with the normalised
    /// number measured down from the population's high performance.
    pub fn results(&self) -> Vec<PlayerPerformance> {
        let mut results: Vec<PlayerPerformance> = self
            .persons
            .values()
            .map(|person| PlayerPerformance {
                identity: person.identity.clone(),
                name: person.name.clone(),
                game_count: person.game_count,
                reward: person.reward,
                performance: person.performance(),
                normalised: self.high_performance - person.performance(),
            })
            .collect();
        results.sort_by(|a, b| {
            b.performance
                .partial_cmp(&a.performance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.identity.cmp(&b.identity))
        });
        results
    }
}

/// One player's numbers in a population report.
#[derive(Clone, Debug)]
pub struct PlayerPerformance {
    pub identity: String,
    pub name: Option<String>,
    pub game_count: u32,
    pub reward: Performance,
    pub performance: Performance,
    pub normalised: Performance,
}
