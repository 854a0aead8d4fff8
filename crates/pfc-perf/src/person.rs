use pfc_core::*;

/// Per-player calculation state.
///
/// `iteration` is a ring of the three most recent performance values,
/// newest first; a player is stable when each adjacent pair in the ring
/// differs by no more than the tolerance.
#[derive(Clone, Debug)]
pub struct Person {
    pub identity: String,
    pub name: Option<String>,
    pub reward: Performance,
    pub game_count: u32,
    /// Canonical opponent identity per game; repeats encode repeated
    /// pairings.
    pub opponents: Vec<String>,
    iteration: Vec<Performance>,
    points: Performance,
}

impl Person {
    pub fn new(identity: String, name: Option<String>) -> Self {
        Self {
            identity,
            name,
            reward: 0.0,
            game_count: 0,
            opponents: Vec::new(),
            iteration: vec![0.0],
            points: 0.0,
        }
    }

    /// Record one game: reward is +1, 0, or -1, scaled by measure.
    pub fn add_reward(&mut self, reward: i32, measure: Performance) {
        self.reward += Performance::from(reward) * measure;
        self.game_count += 1;
    }

    pub fn set_points(&mut self) {
        self.points = 0.0;
    }

    pub fn add_points(&mut self, points: Performance) {
        self.points += points;
    }

    /// Push the next value onto the ring and truncate it to three.
    pub fn calculate_performance(&mut self) {
        let next = (self.points + self.reward) / Performance::from(self.game_count);
        self.iteration.insert(0, next);
        self.iteration.truncate(3);
    }

    /// Most recent performance value.
    pub fn performance(&self) -> Performance {
        self.iteration[0]
    }

    pub fn is_performance_stable(&self, delta: Performance) -> bool {
        self.iteration
            .windows(2)
            .all(|pair| (pair[0] - pair[1]).abs() <= delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_accumulates_with_game_count() {
        let mut person = Person::new("x".to_string(), None);
        person.add_reward(1, MEASURE);
        person.add_reward(0, MEASURE);
        person.add_reward(-1, MEASURE);
        assert_eq!(person.reward, 0.0);
        assert_eq!(person.game_count, 3);
    }

    #[test]
    fn the_ring_keeps_three_values() {
        let mut person = Person::new("x".to_string(), None);
        person.add_reward(1, MEASURE);
        for _ in 0..5 {
            person.set_points();
            person.add_points(10.0);
            person.calculate_performance();
        }
        assert_eq!(person.performance(), 60.0);
        assert!(person.is_performance_stable(STABILITY_DELTA));
    }

    #[test]
    fn stability_needs_every_adjacent_pair() {
        let mut person = Person::new("x".to_string(), None);
        person.add_reward(1, MEASURE);
        person.set_points();
        person.calculate_performance(); // ring [50, 0]
        assert!(!person.is_performance_stable(STABILITY_DELTA));
        person.set_points();
        person.calculate_performance(); // ring [50, 50, 0]
        assert!(!person.is_performance_stable(STABILITY_DELTA));
        person.set_points();
        person.calculate_performance(); // ring [50, 50, 50]
        assert!(person.is_performance_stable(STABILITY_DELTA));
    }
}
