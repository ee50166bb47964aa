//! Travelling salesman tours found by ant colonies and Monte Carlo tree search.
//!
//! Locations live in an [`environment::Environment`] that caches their
//! pairwise distances and the shared pheromone field. Three searches run on
//! top of it:
//!
//! - the Ant System, where every ant reinforces the tour it built,
//! - the Min-Max Ant System, where only the best tour does and pheromone
//!   stays bounded,
//! - a Monte Carlo tree search over partial tours whose rollouts follow the
//!   strongest pheromone trails.
//!
//! # Example
//!
//! ```rust
//! use mcts_ant_colony::config::{SolverConfig, SolverMode};
//! use mcts_ant_colony::location::Location;
//! use mcts_ant_colony::solver::Solver;
//!
//! let locations = vec![
//!     Location::new(1, 0.0, 0.0),
//!     Location::new(2, 1.0, 0.0),
//!     Location::new(3, 1.0, 1.0),
//!     Location::new(4, 0.0, 1.0),
//! ];
//!
//! // Configure a reproducible run of the tree search
//! let config = SolverConfig::new(SolverMode::MonteCarlo).with_seed(42);
//! let solver = Solver::new(config).unwrap();
//!
//! let tour = solver.solve(&locations).unwrap();
//! assert!((tour.length() - 4.0).abs() < 1e-9);
//! ```

/// Run budgets measured in iterations or wall-clock time.
pub mod budget;
/// The Ant System and Min-Max Ant System tour construction.
pub mod colony;
/// Solver configuration.
pub mod config;
/// Pairwise distances between locations.
pub mod distance;
/// Commits the tree search to one location at a time.
pub mod driver;
/// Locations, distances, pheromone and the candidate trail lists.
pub mod environment;
pub mod error;
pub mod location;
/// The core module of the tree search, containing the `SearchTree` implementation.
pub mod mcts;
/// Contains the `SearchNode` struct, which represents a partial tour in the search tree.
pub mod mcts_node;
pub mod pheromone;
/// Contains traits and implementations for random number generation.
pub mod random;
pub mod solver;
/// Triangular storage for symmetric pairwise values.
pub mod symmetric_matrix;
pub mod tour;
