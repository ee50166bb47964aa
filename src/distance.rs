use serde::{Deserialize, Serialize};

use crate::error::{Result, TourError};
use crate::location::Location;
use crate::symmetric_matrix::SymmetricMatrix;

/// How the distance between two locations is measured.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    SquaredEuclidean,
}

impl DistanceMetric {
    fn measure(&self, a: &Location, b: &Location) -> f64 {
        match self {
            DistanceMetric::Euclidean => a.distance_to(b),
            DistanceMetric::SquaredEuclidean => a.squared_distance_to(b),
        }
    }
}

/// Pairwise distances for `N` locations, computed once and immutable afterwards.
#[derive(Debug, Clone)]
pub struct DistanceCache {
    metric: DistanceMetric,
    matrix: SymmetricMatrix<f64>,
}

impl DistanceCache {
    /// Computes every pairwise distance. `locations` must hold the ids `1..=N`
    /// exactly once each, in any order.
    pub fn build(locations: &[Location], metric: DistanceMetric) -> Result<Self> {
        let ordered = order_by_id(locations)?;
        let mut matrix = SymmetricMatrix::new(ordered.len(), f64::NAN);
        for (i, a) in ordered.iter().enumerate() {
            for b in &ordered[i + 1..] {
                matrix.set(a.id, b.id, metric.measure(a, b))?;
            }
        }
        Ok(Self { metric, matrix })
    }

    pub fn len(&self) -> usize {
        self.matrix.size()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.size() == 0
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn distance(&self, i: usize, j: usize) -> Result<f64> {
        let value = self.matrix.get(i, j)?;
        if i == j {
            return Err(TourError::InvalidInput(format!(
                "distance from location {i} to itself"
            )));
        }
        Ok(value)
    }

    /// Every unordered pair `(i, j, distance)` with `i < j`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.matrix.pairs()
    }
}

/// Validates `locations` and returns them indexed by `id - 1`.
pub(crate) fn order_by_id(locations: &[Location]) -> Result<Vec<Location>> {
    let size = locations.len();
    if size < 2 {
        return Err(TourError::InvalidInput(format!(
            "need at least two locations, got {size}"
        )));
    }

    let mut slots: Vec<Option<Location>> = vec![None; size];
    for location in locations {
        if !location.is_finite() {
            return Err(TourError::InvalidInput(format!(
                "location {} has a non-finite coordinate",
                location.id
            )));
        }
        if location.id == 0 || location.id > size {
            return Err(TourError::InvalidInput(format!(
                "location id {} is outside 1..={size}",
                location.id
            )));
        }
        let slot = &mut slots[location.id - 1];
        if slot.is_some() {
            return Err(TourError::InvalidInput(format!(
                "location id {} appears more than once",
                location.id
            )));
        }
        *slot = Some(*location);
    }

    // Every id is in range and unique, so every slot is filled.
    Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<Location> {
        vec![
            Location::new(1, 0.0, 0.0),
            Location::new(2, 3.0, 0.0),
            Location::new(3, 3.0, 4.0),
        ]
    }

    #[test]
    fn builds_symmetric_distances() {
        // arrange
        let cache = DistanceCache::build(&triangle(), DistanceMetric::Euclidean).unwrap();

        // act
        let forward = cache.distance(1, 3).unwrap();
        let backward = cache.distance(3, 1).unwrap();

        // assert
        assert!((forward - 5.0).abs() < 1e-12);
        assert_eq!(forward, backward);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.pairs().count(), 3);
    }

    #[test]
    fn squared_metric() {
        let cache = DistanceCache::build(&triangle(), DistanceMetric::SquaredEuclidean).unwrap();
        assert!((cache.distance(1, 3).unwrap() - 25.0).abs() < 1e-12);
        assert_eq!(cache.metric(), DistanceMetric::SquaredEuclidean);
    }

    #[test]
    fn accepts_unordered_ids() {
        let mut locations = triangle();
        locations.reverse();
        let cache = DistanceCache::build(&locations, DistanceMetric::Euclidean).unwrap();
        assert!((cache.distance(1, 2).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_geometry() {
        let one = [Location::new(1, 0.0, 0.0)];
        assert!(matches!(
            DistanceCache::build(&one, DistanceMetric::Euclidean),
            Err(TourError::InvalidInput(_))
        ));

        let mut infinite = triangle();
        infinite[1].x = f64::INFINITY;
        assert!(matches!(
            DistanceCache::build(&infinite, DistanceMetric::Euclidean),
            Err(TourError::InvalidInput(_))
        ));

        let mut duplicate = triangle();
        duplicate[2].id = 2;
        assert!(matches!(
            DistanceCache::build(&duplicate, DistanceMetric::Euclidean),
            Err(TourError::InvalidInput(_))
        ));

        let mut gap = triangle();
        gap[2].id = 4;
        assert!(matches!(
            DistanceCache::build(&gap, DistanceMetric::Euclidean),
            Err(TourError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_bad_lookups() {
        let cache = DistanceCache::build(&triangle(), DistanceMetric::Euclidean).unwrap();
        assert_eq!(
            cache.distance(1, 4),
            Err(TourError::OutOfRange { id: 4, size: 3 })
        );
        assert!(matches!(
            cache.distance(2, 2),
            Err(TourError::InvalidInput(_))
        ));
    }
}
