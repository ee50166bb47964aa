use tracing::info;

use crate::budget::Budget;
use crate::colony::AntColony;
use crate::config::{SolverConfig, SolverMode};
use crate::driver::Driver;
use crate::environment::Environment;
use crate::error::Result;
use crate::location::Location;
use crate::pheromone::DEFAULT_INITIAL_PHEROMONE;
use crate::random::{RandomGenerator, SeededRandomGenerator, StandardRandomGenerator};
use crate::tour::Tour;

/// Runs one of the searches on a set of locations, as chosen by a [`SolverConfig`].
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Solver { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Builds the environment for `locations` and searches it.
    pub fn solve(&self, locations: &[Location]) -> Result<Tour> {
        let mut environment = Environment::build_with(
            locations,
            self.config.neighbor_budget,
            self.config.metric,
            DEFAULT_INITIAL_PHEROMONE,
        )?;
        self.solve_in(&mut environment)
    }

    /// Searches an existing environment. Its pheromone field is trained in place.
    pub fn solve_in(&self, environment: &mut Environment) -> Result<Tour> {
        info!(
            mode = ?self.config.mode,
            locations = environment.len(),
            seed = ?self.config.seed,
            "solving"
        );
        match self.config.seed {
            Some(seed) => self.run(environment, SeededRandomGenerator::new(seed)),
            None => self.run(environment, StandardRandomGenerator::default()),
        }
    }

    fn colony<K: RandomGenerator + Default>(&self, size: usize, random: K) -> Result<AntColony<K>> {
        AntColony::builder(self.config.policy())
            .with_random_generator(random)
            .with_selection(self.config.selection)
            .with_ants(self.config.ants_for(size))
            .with_alpha(self.config.alpha)
            .with_beta(self.config.beta)
            .with_decay(self.config.decay_or_default())
            .with_q(self.config.q_or_default())
            .build()
    }

    fn run<K: RandomGenerator + Default>(
        &self,
        environment: &mut Environment,
        mut random: K,
    ) -> Result<Tour> {
        let size = environment.len();
        let budget = self.config.budget_for(size);

        match self.config.mode {
            SolverMode::AntSystem | SolverMode::MinMaxAntSystem => {
                self.colony(size, random)?.run(environment, budget)
            }
            SolverMode::MonteCarlo => {
                environment.location(self.config.start.unwrap_or(1))?;
                let explored =
                    environment.explore(self.config.worker_ants_for(size), &mut random)?;
                let start = match self.config.start {
                    Some(start) => start,
                    None => random.next_range(1, size + 1),
                };
                let warmed = match self.config.warmup_iterations {
                    0 => None,
                    iterations => Some(
                        self.colony(size, random)?
                            .run(environment, Budget::Iterations(iterations))?,
                    ),
                };

                let mut driver = Driver::new(start).with_settings(self.config.search_settings());
                if let Some(interval) = self.config.commit_interval {
                    driver = driver.with_commit_interval(interval);
                }
                let searched = driver.run(environment, budget)?;

                let mut best = searched;
                for tour in [explored, warmed].into_iter().flatten() {
                    if tour.is_shorter_than(&best) {
                        best = tour;
                    }
                }
                info!(length = best.length(), "best tour");
                Ok(best)
            }
        }
    }
}
