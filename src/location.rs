use serde::{Deserialize, Serialize};

/// A point to visit. Ids are dense and 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub const fn new(id: usize, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn squared_distance_to(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance_to(&self, other: &Location) -> f64 {
        self.squared_distance_to(other).sqrt()
    }
}

/// An unordered pair of locations, stored with the lower id first so that
/// `a -> b` and `b -> a` name the same trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Trail {
    low: usize,
    high: usize,
}

impl Trail {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(&self) -> usize {
        self.low
    }

    pub fn high(&self) -> usize {
        self.high
    }

    /// Returns the endpoint opposite to `from`, or `None` if `from` is not on this trail.
    pub fn target_of(&self, from: usize) -> Option<usize> {
        if from == self.low {
            Some(self.high)
        } else if from == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_is_canonical() {
        assert_eq!(Trail::new(7, 3), Trail::new(3, 7));
        assert_eq!(Trail::new(7, 3).low(), 3);
        assert_eq!(Trail::new(7, 3).high(), 7);
    }

    #[test]
    fn trail_target_of() {
        let trail = Trail::new(2, 9);
        assert_eq!(trail.target_of(2), Some(9));
        assert_eq!(trail.target_of(9), Some(2));
        assert_eq!(trail.target_of(4), None);
    }

    #[test]
    fn distances() {
        let a = Location::new(1, 0.0, 0.0);
        let b = Location::new(2, 3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
        assert!((a.squared_distance_to(&b) - 25.0).abs() < 1e-12);
        assert!(!Location::new(3, f64::NAN, 0.0).is_finite());
    }
}
