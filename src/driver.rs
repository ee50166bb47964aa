use tracing::{debug, info};

use crate::budget::Budget;
use crate::environment::Environment;
use crate::error::Result;
use crate::mcts::{SearchSettings, SearchTree};
use crate::tour::Tour;

/// Runs the tour search tree and commits to one more location every few
/// iterations, so the tree stays shallow while the tour grows.
#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    start: usize,
    settings: SearchSettings,
    commit_interval: Option<usize>,
}

impl Default for Driver {
    fn default() -> Self {
        Driver::new(1)
    }
}

impl Driver {
    /// A driver whose tours start at location `start`.
    pub fn new(start: usize) -> Self {
        Driver {
            start,
            settings: SearchSettings::default(),
            commit_interval: None,
        }
    }

    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Iterations between commits. Defaults to five times the number of locations.
    pub fn with_commit_interval(mut self, iterations: usize) -> Self {
        self.commit_interval = Some(iterations);
        self
    }

    pub fn commit_interval(&self, environment: &Environment) -> usize {
        self.commit_interval
            .unwrap_or(5 * environment.len())
            .max(1)
    }

    /// Searches until `budget` runs out, the committed tour covers every
    /// location, or nothing is left to try. Returns the best tour seen
    /// anywhere in the tree, not only along the committed path.
    pub fn run(&self, environment: &Environment, budget: Budget) -> Result<Tour> {
        let size = environment.len();
        let interval = self.commit_interval(environment);
        let mut search = SearchTree::builder(environment)
            .with_start(self.start)
            .with_settings(self.settings)
            .build()?;

        let mut tracker = budget.start();
        while tracker.consume() {
            search.do_iteration()?;
            if search.is_exhausted() {
                debug!(iteration = tracker.consumed(), "search space exhausted");
                break;
            }
            if tracker.consumed() % interval != 0 {
                continue;
            }
            match search.advance()? {
                Some(_) if search.committed()?.len() >= size => break,
                Some(_) => {}
                None => break,
            }
        }

        let best = match search.best_tour() {
            Some(tour) => tour.clone(),
            None => search.rollout(search.acting_root())?,
        };
        info!(
            iterations = tracker.consumed(),
            committed = search.committed()?.len(),
            length = best.length(),
            "search finished"
        );
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use crate::random::SeededRandomGenerator;

    fn ring(size: usize) -> Environment {
        let locations: Vec<Location> = (0..size)
            .map(|k| {
                let angle = 2.0 * std::f64::consts::PI * k as f64 / size as f64;
                Location::new(k + 1, angle.cos(), angle.sin())
            })
            .collect();
        Environment::build(&locations, 50).unwrap()
    }

    #[test]
    fn finds_the_ring_after_exploring() {
        let mut environment = ring(8);
        environment
            .explore(4, &mut SeededRandomGenerator::new(8))
            .unwrap();
        let perimeter = 16.0 * (std::f64::consts::PI / 8.0).sin();

        let tour = Driver::new(3)
            .run(&environment, Budget::Iterations(400))
            .unwrap();

        assert_eq!(tour.ids()[0], 3);
        assert!((tour.length() - perimeter).abs() < 1e-9);
    }

    #[test]
    fn zero_budget_still_returns_a_tour() {
        let environment = ring(6);

        let tour = Driver::default()
            .run(&environment, Budget::Iterations(0))
            .unwrap();

        assert_eq!(tour.ids().len(), 6);
    }

    #[test]
    fn frequent_commits_stop_at_a_full_tour() {
        let environment = ring(7);

        let tour = Driver::new(1)
            .with_commit_interval(1)
            .run(&environment, Budget::Iterations(10_000))
            .unwrap();

        assert_eq!(tour.ids().len(), 7);
        assert!(tour.length().is_finite());
    }
}
