use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::error::Result;
use crate::location::Trail;

/// A scored Hamiltonian cycle over every location of an [`Environment`].
///
/// The last location connects back to the first. A `Tour` can only be made
/// through [`Tour::new`], which validates and scores the ids, so its length
/// always matches its ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    ids: Vec<usize>,
    length: f64,
}

impl Tour {
    pub fn new(environment: &Environment, ids: Vec<usize>) -> Result<Self> {
        let length = environment.score_tour(&ids)?;
        Ok(Self { ids, length })
    }

    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn is_shorter_than(&self, other: &Tour) -> bool {
        self.length < other.length
    }

    /// Consecutive trails, closing edge included.
    pub fn trails(&self) -> impl Iterator<Item = Trail> + '_ {
        let closing = match (self.ids.first(), self.ids.last()) {
            (Some(&first), Some(&last)) => Some(Trail::new(last, first)),
            _ => None,
        };
        self.ids
            .windows(2)
            .map(|pair| Trail::new(pair[0], pair[1]))
            .chain(closing)
    }
}
