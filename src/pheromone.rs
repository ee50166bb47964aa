use crate::error::{Result, TourError};
use crate::location::Trail;
use crate::symmetric_matrix::SymmetricMatrix;

/// Starting trail strength when nothing better is known.
pub const DEFAULT_INITIAL_PHEROMONE: f64 = 0.000001;

/// Trail strength for every unordered pair of locations.
///
/// Values are never negative. Writers should go through [`PheromoneUpdate`]
/// so that evaporation, deposits and bounds are applied in one pass and in
/// the right order.
///
/// The field also tracks its baseline: the value a trail holds if no deposit
/// ever reached it. Only trails above the baseline count as reinforced.
#[derive(Debug, Clone)]
pub struct PheromoneField {
    matrix: SymmetricMatrix<f64>,
    baseline: f64,
}

impl PheromoneField {
    pub fn new(size: usize, initial: f64) -> Result<Self> {
        if !initial.is_finite() || initial <= 0.0 {
            return Err(TourError::InvalidInput(format!(
                "initial pheromone must be a positive finite value, got {initial}"
            )));
        }
        Ok(Self {
            matrix: SymmetricMatrix::new(size, initial),
            baseline: initial,
        })
    }

    pub fn len(&self) -> usize {
        self.matrix.size()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.size() == 0
    }

    pub fn get(&self, i: usize, j: usize) -> Result<f64> {
        self.matrix.get(i, j)
    }

    /// Strength of a trail that has never received a deposit.
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Whether `strength` stands above the baseline.
    pub fn is_reinforced(&self, strength: f64) -> bool {
        strength > self.baseline
    }

    pub fn deposit(&mut self, i: usize, j: usize, amount: f64) -> Result<()> {
        validate_amount(amount)?;
        *self.matrix.get_mut(i, j)? += amount;
        Ok(())
    }

    /// Multiplies every stored value by `decay`, which must lie in `[0, 1]`.
    pub fn evaporate(&mut self, decay: f64) -> Result<()> {
        validate_decay(decay)?;
        self.matrix.for_each_slot(|value| *value *= decay);
        self.baseline *= decay;
        Ok(())
    }

    /// Caps every value at `tau_max`.
    pub fn clamp(&mut self, tau_max: f64) -> Result<()> {
        validate_ceiling(tau_max)?;
        self.matrix.for_each_slot(|value| *value = value.min(tau_max));
        self.baseline = self.baseline.min(tau_max);
        Ok(())
    }

    /// Raises every value to at least `tau_min`.
    pub fn floor(&mut self, tau_min: f64) -> Result<()> {
        validate_floor(tau_min)?;
        self.matrix.for_each_slot(|value| *value = value.max(tau_min));
        self.baseline = self.baseline.max(tau_min);
        Ok(())
    }

    /// Resets every pair to `value`, which becomes the new baseline.
    pub fn fill(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(TourError::InvalidInput(format!(
                "pheromone value must be a non-negative finite value, got {value}"
            )));
        }
        self.matrix.for_each_slot(|slot| *slot = value);
        self.baseline = value;
        Ok(())
    }

    /// Applies one update cycle: evaporate, then deposit, then bound.
    ///
    /// The whole batch is checked first, so a rejected update leaves the
    /// field as it was.
    pub fn apply(&mut self, update: &PheromoneUpdate) -> Result<()> {
        if let Some(decay) = update.decay {
            validate_decay(decay)?;
        }
        for (trail, amount) in &update.deposits {
            self.matrix.get(trail.low(), trail.high())?;
            validate_amount(*amount)?;
        }
        if let Some((tau_min, tau_max)) = update.bounds {
            validate_ceiling(tau_max)?;
            if tau_min > 0.0 {
                validate_floor(tau_min)?;
            }
        }

        if let Some(decay) = update.decay {
            self.evaporate(decay)?;
        }
        for (trail, amount) in &update.deposits {
            self.deposit(trail.low(), trail.high(), *amount)?;
        }
        if let Some((tau_min, tau_max)) = update.bounds {
            self.clamp(tau_max)?;
            if tau_min > 0.0 {
                self.floor(tau_min)?;
            }
        }
        Ok(())
    }

    /// Every unordered pair `(i, j, strength)` with `i < j`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.matrix.pairs()
    }

    /// The pairs whose strength stands above the baseline.
    pub fn reinforced_pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.pairs()
            .filter(|&(_, _, strength)| self.is_reinforced(strength))
    }
}

pub(crate) fn validate_decay(decay: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&decay) {
        return Err(TourError::InvalidInput(format!(
            "decay factor must lie in [0, 1], got {decay}"
        )));
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(TourError::InvalidInput(format!(
            "pheromone deposit must be a non-negative finite value, got {amount}"
        )));
    }
    Ok(())
}

fn validate_ceiling(tau_max: f64) -> Result<()> {
    if tau_max.is_nan() || tau_max < 0.0 {
        return Err(TourError::InvalidInput(format!(
            "pheromone bound must be non-negative, got {tau_max}"
        )));
    }
    Ok(())
}

fn validate_floor(tau_min: f64) -> Result<()> {
    if !tau_min.is_finite() || tau_min < 0.0 {
        return Err(TourError::InvalidInput(format!(
            "pheromone floor must be a non-negative finite value, got {tau_min}"
        )));
    }
    Ok(())
}

/// A batch of pheromone changes collected from one or more tours and applied
/// in a single pass by [`PheromoneField::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PheromoneUpdate {
    decay: Option<f64>,
    deposits: Vec<(Trail, f64)>,
    bounds: Option<(f64, f64)>,
}

impl PheromoneUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = Some(decay);
        self
    }

    /// Bounds every value to `[tau_min, tau_max]` after the deposits. A zero
    /// `tau_min` leaves the lower end open.
    pub fn with_bounds(mut self, tau_min: f64, tau_max: f64) -> Self {
        self.bounds = Some((tau_min, tau_max));
        self
    }

    pub fn deposit(&mut self, trail: Trail, amount: f64) {
        self.deposits.push((trail, amount));
    }

    /// Deposits `amount` on every trail of a closed tour.
    pub fn deposit_tour(&mut self, ids: &[usize], amount: f64) {
        if ids.len() < 2 {
            return;
        }
        for pair in ids.windows(2) {
            self.deposit(Trail::new(pair[0], pair[1]), amount);
        }
        self.deposit(Trail::new(ids[ids.len() - 1], ids[0]), amount);
    }

    pub fn deposits(&self) -> &[(Trail, f64)] {
        &self.deposits
    }
}
