use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::budget::Budget;
use crate::environment::Environment;
use crate::error::{Result, TourError};
use crate::pheromone::{PheromoneUpdate, validate_decay};
use crate::random::RandomGenerator;
use crate::tour::Tour;

/// Distances and tour lengths below this are treated as this, so coincident
/// locations do not produce an infinite heuristic or deposit.
const MIN_DISTANCE: f64 = 1e-9;

/// How an ant picks its next location from the weighted candidates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    /// Roulette-wheel selection proportional to desirability.
    #[default]
    Proportional,
    /// Always the most desirable candidate; ties go to the lowest id.
    Greedy,
}

/// Which tours deposit pheromone after each iteration, and whether the field
/// is bounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstructionPolicy {
    /// Every ant deposits `q / length`; with `deposit_best` the best-known
    /// tour deposits as well.
    AntSystem { deposit_best: bool },
    /// Only the iteration-best tour deposits, or the global best with
    /// probability `global_best_probability`. Values are bounded to
    /// `[tau_min_ratio * tau_max, tau_max]` with
    /// `tau_max = q / ((1 - decay) * best_length)`.
    MinMax {
        global_best_probability: f64,
        tau_min_ratio: f64,
    },
}

impl ConstructionPolicy {
    pub const fn ant_system() -> Self {
        ConstructionPolicy::AntSystem { deposit_best: true }
    }

    pub const fn min_max() -> Self {
        ConstructionPolicy::MinMax {
            global_best_probability: 0.2,
            tau_min_ratio: 0.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConstructionPolicy::AntSystem { .. } => "Ant System",
            ConstructionPolicy::MinMax { .. } => "Min-Max Ant System",
        }
    }
}

/// A builder for [`AntColony`].
pub struct AntColonyBuilder<K: RandomGenerator> {
    policy: ConstructionPolicy,
    selection: SelectionRule,
    random_generator: K,
    ants: usize,
    alpha: f64,
    beta: f64,
    decay: f64,
    q: f64,
}

impl<K: RandomGenerator + Default> AntColonyBuilder<K> {
    pub fn new(policy: ConstructionPolicy) -> Self {
        Self {
            policy,
            selection: SelectionRule::default(),
            random_generator: K::default(),
            ants: 10,
            alpha: 1.0,
            beta: 2.0,
            decay: 0.9,
            q: 1.0,
        }
    }
}

impl<K: RandomGenerator> AntColonyBuilder<K> {
    pub fn with_random_generator(mut self, rg: K) -> Self {
        self.random_generator = rg;
        self
    }

    pub fn with_selection(mut self, selection: SelectionRule) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_ants(mut self, ants: usize) -> Self {
        self.ants = ants;
        self
    }

    /// Pheromone exponent.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Inverse-distance exponent.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Fraction of pheromone kept by each evaporation.
    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    /// Deposit constant; a tour of length `L` deposits `q / L` per trail.
    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }

    pub fn build(self) -> Result<AntColony<K>> {
        if self.ants == 0 {
            return Err(TourError::InvalidInput(
                "a colony needs at least one ant".to_string(),
            ));
        }
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !value.is_finite() || value < 0.0 {
                return Err(TourError::InvalidInput(format!(
                    "{name} must be a non-negative finite value, got {value}"
                )));
            }
        }
        if !self.q.is_finite() || self.q <= 0.0 {
            return Err(TourError::InvalidInput(format!(
                "q must be a positive finite value, got {}",
                self.q
            )));
        }
        validate_decay(self.decay)?;
        if let ConstructionPolicy::MinMax {
            global_best_probability,
            tau_min_ratio,
        } = self.policy
        {
            if self.decay >= 1.0 {
                return Err(TourError::InvalidInput(
                    "min-max ant system needs a decay below 1".to_string(),
                ));
            }
            for (name, value) in [
                ("global best probability", global_best_probability),
                ("tau min ratio", tau_min_ratio),
            ] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(TourError::InvalidInput(format!(
                        "{name} must lie in [0, 1], got {value}"
                    )));
                }
            }
        }

        Ok(AntColony {
            policy: self.policy,
            selection: self.selection,
            random: self.random_generator,
            ants: self.ants,
            alpha: self.alpha,
            beta: self.beta,
            decay: self.decay,
            q: self.q,
            best: None,
            tau_max: None,
            history: Vec::new(),
        })
    }
}

/// Builds tours with a population of ants and feeds the results back into the
/// environment's pheromone field.
///
/// Within an iteration the ants only read the environment. Their deposits are
/// collected into one [`PheromoneUpdate`] and applied once the whole
/// iteration has finished.
pub struct AntColony<K: RandomGenerator> {
    policy: ConstructionPolicy,
    selection: SelectionRule,
    random: K,
    ants: usize,
    alpha: f64,
    beta: f64,
    decay: f64,
    q: f64,
    best: Option<Tour>,
    tau_max: Option<f64>,
    history: Vec<f64>,
}

impl<K: RandomGenerator + Default> AntColony<K> {
    pub fn builder(policy: ConstructionPolicy) -> AntColonyBuilder<K> {
        AntColonyBuilder::new(policy)
    }
}

impl<K: RandomGenerator> AntColony<K> {
    pub fn policy(&self) -> ConstructionPolicy {
        self.policy
    }

    /// Best tour found so far.
    pub fn best(&self) -> Option<&Tour> {
        self.best.as_ref()
    }

    /// Current upper pheromone bound; only set for the min-max policy once a
    /// tour has been found.
    pub fn tau_max(&self) -> Option<f64> {
        self.tau_max
    }

    /// Best-so-far length after each iteration.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    fn desirability(&self, environment: &Environment, from: usize, to: usize) -> Result<f64> {
        let pheromone = environment.pheromone(from, to)?;
        let distance = environment.distance(from, to)?.max(MIN_DISTANCE);
        Ok(pheromone.powf(self.alpha) * (1.0 / distance).powf(self.beta))
    }

    /// Pheromone laid on each trail of `tour`.
    fn deposit_for(&self, tour: &Tour) -> f64 {
        self.q / tour.length().max(MIN_DISTANCE)
    }

    fn choose(&mut self, weighted: &[(usize, f64)]) -> Option<usize> {
        let greedy = || {
            let mut best: Option<(usize, f64)> = None;
            for &(id, weight) in weighted {
                if best.is_none_or(|(_, top)| weight > top) {
                    best = Some((id, weight));
                }
            }
            best.map(|(id, _)| id)
        };

        match self.selection {
            SelectionRule::Greedy => greedy(),
            SelectionRule::Proportional => {
                let total: f64 = weighted.iter().map(|(_, weight)| weight).sum();
                if !(total.is_finite() && total > 0.0) {
                    return greedy();
                }
                let target = self.random.next_f64() * total;
                let mut cumulative = 0.0;
                for &(id, weight) in weighted {
                    cumulative += weight;
                    if cumulative > target {
                        return Some(id);
                    }
                }
                weighted.last().map(|(id, _)| *id)
            }
        }
    }

    /// Builds one complete tour starting at `start`.
    pub fn construct_tour(&mut self, environment: &Environment, start: usize) -> Result<Tour> {
        environment.location(start)?;
        let size = environment.len();
        let mut visited = vec![false; size + 1];
        visited[start] = true;
        let mut ids = Vec::with_capacity(size);
        ids.push(start);

        let mut weighted = Vec::with_capacity(size);
        let mut current = start;
        while ids.len() < size {
            weighted.clear();
            for next in (1..=size).filter(|&id| !visited[id]) {
                weighted.push((next, self.desirability(environment, current, next)?));
            }
            let next = self
                .choose(&weighted)
                .ok_or(TourError::NoCandidates { from: current })?;
            visited[next] = true;
            ids.push(next);
            current = next;
        }

        Tour::new(environment, ids)
    }

    /// Runs one iteration: every ant builds a tour from a random start, then
    /// the pheromone field is updated once. Returns the iteration-best tour.
    pub fn iterate(&mut self, environment: &mut Environment) -> Result<Tour> {
        let size = environment.len();
        let mut tours = Vec::with_capacity(self.ants);
        for _ in 0..self.ants {
            let start = self.random.next_range(1, size + 1);
            tours.push(self.construct_tour(environment, start)?);
        }

        let iteration_best = tours
            .iter()
            .min_by(|a, b| a.length().total_cmp(&b.length()))
            .cloned()
            .ok_or_else(|| TourError::InvalidInput("a colony needs at least one ant".to_string()))?;
        let improved = self
            .best
            .as_ref()
            .is_none_or(|best| iteration_best.is_shorter_than(best));
        if improved {
            self.best = Some(iteration_best.clone());
        }
        let best = self.best.clone().unwrap_or_else(|| iteration_best.clone());

        let update = match self.policy {
            ConstructionPolicy::AntSystem { deposit_best } => {
                let mut update = PheromoneUpdate::new().with_decay(self.decay);
                for tour in &tours {
                    update.deposit_tour(tour.ids(), self.deposit_for(tour));
                }
                if deposit_best {
                    update.deposit_tour(best.ids(), self.deposit_for(&best));
                }
                update
            }
            ConstructionPolicy::MinMax {
                global_best_probability,
                tau_min_ratio,
            } => {
                let current = self.tau_max;
                let tau_max = match current {
                    Some(tau_max) if !improved => tau_max,
                    previous => {
                        let tau_max = self.deposit_for(&best) / (1.0 - self.decay);
                        if previous.is_none() {
                            environment.reset_pheromone(tau_max)?;
                        }
                        self.tau_max = Some(tau_max);
                        tau_max
                    }
                };
                let depositor = if self.random.next_f64() < global_best_probability {
                    &best
                } else {
                    &iteration_best
                };
                let mut update = PheromoneUpdate::new()
                    .with_decay(self.decay)
                    .with_bounds(tau_min_ratio * tau_max, tau_max);
                update.deposit_tour(depositor.ids(), self.deposit_for(depositor));
                update
            }
        };
        environment.apply_pheromone_update(&update)?;
        self.history.push(best.length());

        Ok(iteration_best)
    }

    /// Iterates until `budget` runs out and returns the best tour found.
    pub fn run(&mut self, environment: &mut Environment, budget: Budget) -> Result<Tour> {
        let mut tracker = budget.start();
        while tracker.consume() {
            let iteration_best = self.iterate(environment)?;
            if tracker.consumed() % 20 == 1 {
                debug!(
                    iteration = tracker.consumed(),
                    iteration_best = iteration_best.length(),
                    best = self.history.last().copied().unwrap_or(f64::INFINITY),
                    "colony progress"
                );
            }
        }

        let best = self.best.clone().ok_or_else(|| {
            TourError::InvalidInput("budget allowed no colony iterations".to_string())
        })?;
        info!(
            policy = self.policy.name(),
            iterations = tracker.consumed(),
            length = best.length(),
            "colony finished"
        );
        Ok(best)
    }
}
