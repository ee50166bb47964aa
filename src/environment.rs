use tracing::debug;

use crate::distance::{DistanceCache, DistanceMetric, order_by_id};
use crate::error::{Result, TourError};
use crate::location::{Location, Trail};
use crate::pheromone::{DEFAULT_INITIAL_PHEROMONE, PheromoneField, PheromoneUpdate};
use crate::random::RandomGenerator;
use crate::tour::Tour;

/// Default length of each per-location candidate list.
pub const DEFAULT_NEIGHBOR_BUDGET: usize = 50;

/// Population mean and standard deviation of a set of values.
///
/// Used to put pheromone strength and distance on a common z-score scale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
}

impl Moments {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Self::default();
        }
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        Self {
            mean,
            std_dev: variance.sqrt(),
            count,
        }
    }

    /// Standard score of `value`; zero when the spread is degenerate.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std_dev > 0.0 && self.std_dev.is_finite() {
            (value - self.mean) / self.std_dev
        } else {
            0.0
        }
    }
}

/// A problem instance: the locations, their distances, the pheromone field
/// and the candidate lists derived from both.
///
/// The nearest-by-distance lists are fixed at build time. The
/// strongest-by-pheromone lists and the pheromone statistics are rebuilt by
/// [`Environment::refresh_pheromone_trails`], which every pheromone write
/// made through the environment triggers.
#[derive(Debug, Clone)]
pub struct Environment {
    locations: Vec<Location>,
    distances: DistanceCache,
    pheromone: PheromoneField,
    neighbor_budget: usize,
    nearest: Vec<Vec<usize>>,
    strongest: Vec<Vec<usize>>,
    distance_moments: Moments,
    pheromone_moments: Moments,
}

impl Environment {
    pub fn build(locations: &[Location], neighbor_budget: usize) -> Result<Self> {
        Self::build_with(
            locations,
            neighbor_budget,
            DistanceMetric::Euclidean,
            DEFAULT_INITIAL_PHEROMONE,
        )
    }

    pub fn build_with(
        locations: &[Location],
        neighbor_budget: usize,
        metric: DistanceMetric,
        initial_pheromone: f64,
    ) -> Result<Self> {
        if neighbor_budget == 0 {
            return Err(TourError::InvalidInput(
                "neighbor budget must be at least one".to_string(),
            ));
        }
        let locations = order_by_id(locations)?;
        let distances = DistanceCache::build(&locations, metric)?;
        let size = locations.len();
        let pheromone = PheromoneField::new(size, initial_pheromone)?;

        let mut nearest = vec![Vec::with_capacity(size - 1); size];
        for (i, j, distance) in distances.pairs() {
            nearest[i - 1].push((j, distance));
            nearest[j - 1].push((i, distance));
        }
        let nearest: Vec<Vec<usize>> = nearest
            .into_iter()
            .map(|mut targets: Vec<(usize, f64)>| {
                // Stable sort keeps lower ids first among equal distances.
                targets.sort_by(|a, b| a.1.total_cmp(&b.1));
                targets.truncate(neighbor_budget);
                targets.into_iter().map(|(id, _)| id).collect()
            })
            .collect();

        let distance_moments = Moments::from_values(distances.pairs().map(|(_, _, d)| d));
        debug!(
            size,
            mean = distance_moments.mean,
            std_dev = distance_moments.std_dev,
            "distance statistics"
        );

        let mut environment = Self {
            locations,
            distances,
            pheromone,
            neighbor_budget,
            nearest,
            strongest: vec![Vec::new(); size],
            distance_moments,
            pheromone_moments: Moments::default(),
        };
        environment.refresh_pheromone_trails();
        Ok(environment)
    }

    /// Number of locations.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn location(&self, id: usize) -> Result<&Location> {
        self.check_id(id)?;
        Ok(&self.locations[id - 1])
    }

    pub fn neighbor_budget(&self) -> usize {
        self.neighbor_budget
    }

    pub fn distances(&self) -> &DistanceCache {
        &self.distances
    }

    pub fn pheromone_field(&self) -> &PheromoneField {
        &self.pheromone
    }

    pub fn distance(&self, i: usize, j: usize) -> Result<f64> {
        self.distances.distance(i, j)
    }

    pub fn pheromone(&self, i: usize, j: usize) -> Result<f64> {
        self.pheromone.get(i, j)
    }

    pub fn distance_moments(&self) -> Moments {
        self.distance_moments
    }

    pub fn pheromone_moments(&self) -> Moments {
        self.pheromone_moments
    }

    fn check_id(&self, id: usize) -> Result<()> {
        if id == 0 || id > self.len() {
            return Err(TourError::OutOfRange {
                id,
                size: self.len(),
            });
        }
        Ok(())
    }

    /// Length of the closed tour through `ids`.
    pub fn score_tour(&self, ids: &[usize]) -> Result<f64> {
        if ids.len() != self.len() {
            return Err(TourError::IncompleteTour(format!(
                "tour visits {} of {} locations",
                ids.len(),
                self.len()
            )));
        }
        let mut seen = vec![false; self.len() + 1];
        for &id in ids {
            self.check_id(id)?;
            if seen[id] {
                return Err(TourError::IncompleteTour(format!(
                    "location {id} is visited more than once"
                )));
            }
            seen[id] = true;
        }

        let mut length = 0.0;
        for pair in ids.windows(2) {
            length += self.distance(pair[0], pair[1])?;
        }
        length += self.distance(ids[ids.len() - 1], ids[0])?;
        Ok(length)
    }

    /// Targets reachable from `id`, strongest pheromone first.
    pub fn best_pheromone_trails_from(&self, id: usize) -> Result<&[usize]> {
        self.check_id(id)?;
        Ok(&self.strongest[id - 1])
    }

    /// Targets reachable from `id`, nearest first.
    pub fn nearest_trails_from(&self, id: usize) -> Result<&[usize]> {
        self.check_id(id)?;
        Ok(&self.nearest[id - 1])
    }

    /// The endpoint of `trail` opposite to `id`.
    pub fn target_of(id: usize, trail: Trail) -> Option<usize> {
        trail.target_of(id)
    }

    /// Pheromone strength of `from -> to` as a z-score; higher is more attractive.
    pub fn pheromone_deviation(&self, from: usize, to: usize) -> Result<f64> {
        Ok(self.pheromone_moments.z_score(self.pheromone(from, to)?))
    }

    /// Distance of `from -> to` as a negated z-score; higher is more attractive.
    pub fn distance_deviation(&self, from: usize, to: usize) -> Result<f64> {
        Ok(-self.distance_moments.z_score(self.distance(from, to)?))
    }

    /// Whether the strongest-pheromone candidate beats the nearest candidate
    /// once both are put on the same scale.
    pub fn prefers_pheromone(
        &self,
        from: usize,
        pheromone_target: usize,
        distance_target: usize,
    ) -> Result<bool> {
        Ok(self.pheromone_deviation(from, pheromone_target)?
            > self.distance_deviation(from, distance_target)?)
    }

    /// Combined attractiveness of `from -> to`: the better of its two z-scores.
    pub fn desirability(&self, from: usize, to: usize) -> Result<f64> {
        Ok(self
            .pheromone_deviation(from, to)?
            .max(self.distance_deviation(from, to)?))
    }

    /// Strongest-pheromone unvisited target from the candidate list of `from`.
    /// `visited` is indexed by location id.
    pub fn strongest_unvisited(&self, from: usize, visited: &[bool]) -> Result<Option<usize>> {
        Ok(self
            .best_pheromone_trails_from(from)?
            .iter()
            .copied()
            .find(|&id| !visited[id]))
    }

    /// Nearest unvisited target from `from`. Falls back to scanning every
    /// location when the candidate list is exhausted.
    pub fn nearest_unvisited(&self, from: usize, visited: &[bool]) -> Result<Option<usize>> {
        if let Some(id) = self
            .nearest_trails_from(from)?
            .iter()
            .copied()
            .find(|&id| !visited[id])
        {
            return Ok(Some(id));
        }
        let mut best: Option<(usize, f64)> = None;
        for id in (1..=self.len()).filter(|&id| id != from && !visited[id]) {
            let distance = self.distance(from, id)?;
            if best.is_none_or(|(_, shortest)| distance < shortest) {
                best = Some((id, distance));
            }
        }
        Ok(best.map(|(id, _)| id))
    }

    /// Applies a batch of pheromone changes and refreshes the candidate lists.
    pub fn apply_pheromone_update(&mut self, update: &PheromoneUpdate) -> Result<()> {
        self.pheromone.apply(update)?;
        self.refresh_pheromone_trails();
        Ok(())
    }

    /// Resets every trail to `value` and refreshes the candidate lists.
    pub fn reset_pheromone(&mut self, value: f64) -> Result<()> {
        self.pheromone.fill(value)?;
        self.refresh_pheromone_trails();
        Ok(())
    }

    /// Rebuilds the strongest-pheromone candidate lists and the pheromone
    /// statistics from the current field. Trails still at the field's
    /// baseline were never reinforced and count as absent in both.
    pub fn refresh_pheromone_trails(&mut self) {
        let size = self.len();
        let budget = self.neighbor_budget;
        let mut strongest: Vec<Vec<(usize, f64)>> = vec![Vec::new(); size];
        for (i, j, strength) in self.pheromone.reinforced_pairs() {
            strongest[i - 1].push((j, strength));
            strongest[j - 1].push((i, strength));
        }
        self.strongest = strongest
            .into_iter()
            .map(|mut targets| {
                targets.sort_by(|a, b| b.1.total_cmp(&a.1));
                targets.truncate(budget);
                targets.into_iter().map(|(id, _)| id).collect()
            })
            .collect();
        self.pheromone_moments =
            Moments::from_values(self.pheromone.reinforced_pairs().map(|(_, _, s)| s));
        debug!(
            mean = self.pheromone_moments.mean,
            std_dev = self.pheromone_moments.std_dev,
            reinforced = self.pheromone_moments.count,
            "pheromone statistics"
        );
    }

    /// Sends `worker_ants` ants out from random locations. Each walks to the
    /// nearest unvisited location until none remain, marking every trail it
    /// walks with one unit of pheromone. Returns the shortest walk.
    pub fn explore<R: RandomGenerator>(
        &mut self,
        worker_ants: usize,
        random: &mut R,
    ) -> Result<Option<Tour>> {
        let size = self.len();
        let mut update = PheromoneUpdate::new();
        let mut shortest: Option<Tour> = None;

        debug!(worker_ants, "worker ants are laying pheromone trails");
        for _ in 0..worker_ants {
            let start = random.next_range(1, size + 1);
            let mut visited = vec![false; size + 1];
            visited[start] = true;
            let mut walk = Vec::with_capacity(size);
            walk.push(start);

            let mut current = start;
            while let Some(next) = self.nearest_unvisited(current, &visited)? {
                update.deposit(Trail::new(current, next), 1.0);
                visited[next] = true;
                walk.push(next);
                current = next;
            }

            let tour = Tour::new(self, walk)?;
            if shortest.as_ref().is_none_or(|best| tour.is_shorter_than(best)) {
                shortest = Some(tour);
            }
        }

        self.apply_pheromone_update(&update)?;
        if let Some(tour) = &shortest {
            debug!(length = tour.length(), "shortest worker ant trail");
        }
        Ok(shortest)
    }
}

/// Marks the ids of `prefix` in a mask indexed by location id.
pub(crate) fn visited_mask(size: usize, prefix: &[usize]) -> Vec<bool> {
    let mut visited = vec![false; size + 1];
    for &id in prefix {
        visited[id] = true;
    }
    visited
}
