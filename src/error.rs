use thiserror::Error;

/// Errors produced while building or searching a tour.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TourError {
    /// Malformed geometry, too few locations, duplicate or missing ids, or a bad parameter.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A location id outside `1..=size`.
    #[error("location {id} is out of range 1..={size}")]
    OutOfRange { id: usize, size: usize },

    /// A tour that does not visit every location exactly once.
    #[error("incomplete tour: {0}")]
    IncompleteTour(String),

    /// No unvisited successor could be found from a location.
    #[error("no unvisited candidates reachable from location {from}")]
    NoCandidates { from: usize },

    /// A search tree handle that no longer points at a live node.
    #[error("search node is not part of the tree")]
    UnknownNode,
}

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, TourError>;
