use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, from_value};

use crate::budget::Budget;
use crate::colony::{ConstructionPolicy, SelectionRule};
use crate::distance::DistanceMetric;
use crate::environment::DEFAULT_NEIGHBOR_BUDGET;
use crate::error::{Result, TourError};
use crate::mcts::{
    DEFAULT_EXPANSION_WIDTH, DEFAULT_ROLLOUT_LIMIT, DEFAULT_ROLLOUT_WIDTH, EXPLORATION_PARAMETER,
    SearchSettings,
};

/// Which search a [`crate::solver::Solver`] runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMode {
    AntSystem,
    MinMaxAntSystem,
    #[default]
    MonteCarlo,
}

/// Run parameters.
///
/// Parameters left as `None` get a default that depends on the mode or on
/// the number of locations `N`:
///
/// | parameter       | ant system | min-max    | monte carlo     |
/// |-----------------|------------|------------|-----------------|
/// | `ants`          | `N`        | `N`        | `N` (warm-up)   |
/// | `iterations`    | `N * N`    | `N * N`    | `N * N`         |
/// | `decay`         | 0.99       | 0.98       | 0.99            |
/// | `q`             | 2.0        | 1.0        | 2.0             |
/// | `worker_ants`   |            |            | `max(N / 20, 5)`|
/// | `commit_interval` |          |            | `5 * N`         |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub mode: SolverMode,
    pub ants: Option<usize>,
    pub iterations: Option<usize>,
    /// Wall-clock budget in seconds; replaces `iterations` when set.
    pub time_limit_secs: Option<f64>,
    /// Fraction of pheromone kept by each evaporation.
    pub decay: Option<f64>,
    pub alpha: f64,
    pub beta: f64,
    pub q: Option<f64>,
    pub selection: SelectionRule,
    /// Chance that the global best rather than the iteration best deposits
    /// under the min-max policy.
    pub global_best_probability: f64,
    /// Lower pheromone bound as a fraction of `tau_max`; zero disables it.
    pub tau_min_ratio: f64,
    /// Whether the ant system lets the best-known tour deposit each iteration.
    pub deposit_best: bool,
    pub metric: DistanceMetric,
    pub neighbor_budget: usize,
    pub worker_ants: Option<usize>,
    /// Ant system iterations run before the tree search.
    pub warmup_iterations: usize,
    pub exploration: f64,
    pub expansion_width: usize,
    pub rollout_width: usize,
    pub rollout_limit: usize,
    pub commit_interval: Option<usize>,
    /// Location the tree search starts from; random when unset.
    pub start: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            mode: SolverMode::default(),
            ants: None,
            iterations: None,
            time_limit_secs: None,
            decay: None,
            alpha: 1.0,
            beta: 2.0,
            q: None,
            selection: SelectionRule::default(),
            global_best_probability: 0.2,
            tau_min_ratio: 0.0,
            deposit_best: true,
            metric: DistanceMetric::default(),
            neighbor_budget: DEFAULT_NEIGHBOR_BUDGET,
            worker_ants: None,
            warmup_iterations: 10,
            exploration: EXPLORATION_PARAMETER,
            expansion_width: DEFAULT_EXPANSION_WIDTH,
            rollout_width: DEFAULT_ROLLOUT_WIDTH,
            rollout_limit: DEFAULT_ROLLOUT_LIMIT,
            commit_interval: None,
            start: None,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn new(mode: SolverMode) -> Self {
        SolverConfig {
            mode,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: SolverConfig = serde_json::from_str(json)
            .map_err(|e| TourError::InvalidInput(format!("bad solver config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config from a loose map of hyperparameters. Missing keys keep
    /// their defaults.
    pub fn from_hyperparameters(hyperparameters: &Option<Map<String, Value>>) -> Result<Self> {
        let config = match hyperparameters {
            Some(map) => from_value(Value::Object(map.clone()))
                .map_err(|e| TourError::InvalidInput(format!("bad hyperparameters: {e}")))?,
            None => SolverConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SolverMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_ants(mut self, ants: usize) -> Self {
        self.ants = Some(ants);
        self
    }

    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }

    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_secs = Some(limit.as_secs_f64());
        self
    }

    #[must_use]
    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = Some(decay);
        self
    }

    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    #[must_use]
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    #[must_use]
    pub fn with_q(mut self, q: f64) -> Self {
        self.q = Some(q);
        self
    }

    #[must_use]
    pub fn with_selection(mut self, selection: SelectionRule) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn with_global_best_probability(mut self, probability: f64) -> Self {
        self.global_best_probability = probability;
        self
    }

    #[must_use]
    pub fn with_tau_min_ratio(mut self, ratio: f64) -> Self {
        self.tau_min_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    #[must_use]
    pub fn with_neighbor_budget(mut self, budget: usize) -> Self {
        self.neighbor_budget = budget;
        self
    }

    #[must_use]
    pub fn with_worker_ants(mut self, worker_ants: usize) -> Self {
        self.worker_ants = Some(worker_ants);
        self
    }

    #[must_use]
    pub fn with_warmup_iterations(mut self, iterations: usize) -> Self {
        self.warmup_iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    #[must_use]
    pub fn with_commit_interval(mut self, iterations: usize) -> Self {
        self.commit_interval = Some(iterations);
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(TourError::InvalidInput(message));

        if self.ants == Some(0) {
            return invalid("ants must be positive".to_string());
        }
        if let Some(limit) = self.time_limit_secs {
            if Duration::try_from_secs_f64(limit).is_err() {
                return invalid(format!(
                    "time limit must be a representable non-negative number of seconds, got {limit}"
                ));
            }
        }
        if let Some(decay) = self.decay {
            if !(0.0..=1.0).contains(&decay) {
                return invalid(format!("decay must lie in [0, 1], got {decay}"));
            }
            if self.mode == SolverMode::MinMaxAntSystem && decay >= 1.0 {
                return invalid("min-max ant system needs a decay below 1".to_string());
            }
        }
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!(
                    "{name} must be a non-negative finite value, got {value}"
                ));
            }
        }
        if let Some(q) = self.q {
            if !q.is_finite() || q <= 0.0 {
                return invalid(format!("q must be a positive finite value, got {q}"));
            }
        }
        for (name, value) in [
            ("global best probability", self.global_best_probability),
            ("tau min ratio", self.tau_min_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{name} must lie in [0, 1], got {value}"));
            }
        }
        if self.neighbor_budget == 0 {
            return invalid("neighbor budget must be at least one".to_string());
        }
        if self.commit_interval == Some(0) {
            return invalid("commit interval must be positive".to_string());
        }
        if self.start == Some(0) {
            return invalid("locations are numbered from 1".to_string());
        }
        self.search_settings().validate()
    }

    pub fn ants_for(&self, size: usize) -> usize {
        self.ants.unwrap_or(size)
    }

    pub fn decay_or_default(&self) -> f64 {
        self.decay.unwrap_or(match self.mode {
            SolverMode::MinMaxAntSystem => 0.98,
            _ => 0.99,
        })
    }

    pub fn q_or_default(&self) -> f64 {
        self.q.unwrap_or(match self.mode {
            SolverMode::MinMaxAntSystem => 1.0,
            _ => 2.0,
        })
    }

    pub fn worker_ants_for(&self, size: usize) -> usize {
        self.worker_ants.unwrap_or((size / 20).max(5))
    }

    /// Budget of the main search loop for `size` locations. A time limit too
    /// large for a [`Duration`] saturates.
    pub fn budget_for(&self, size: usize) -> Budget {
        match self.time_limit_secs {
            Some(limit) => Budget::TimeLimit(
                Duration::try_from_secs_f64(limit).unwrap_or(Duration::MAX),
            ),
            None => Budget::Iterations(self.iterations.unwrap_or(size * size)),
        }
    }

    pub fn policy(&self) -> ConstructionPolicy {
        match self.mode {
            SolverMode::MinMaxAntSystem => ConstructionPolicy::MinMax {
                global_best_probability: self.global_best_probability,
                tau_min_ratio: self.tau_min_ratio,
            },
            _ => ConstructionPolicy::AntSystem {
                deposit_best: self.deposit_best,
            },
        }
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            exploration: self.exploration,
            expansion_width: self.expansion_width,
            rollout_width: self.rollout_width,
            rollout_limit: self.rollout_limit,
        }
    }
}
