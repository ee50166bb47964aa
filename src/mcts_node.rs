use crate::tour::Tour;

/// How far the children of a [`SearchNode`] have been materialized and tried.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// No children yet.
    #[default]
    Unexpanded,
    /// Children exist and at least one of them has never been visited.
    PartiallyExpanded,
    /// Every child has been visited at least once.
    FullyExpanded,
}

/// Represents a single node in the tour search tree.
///
/// A node stands for a partial tour: the locations in `prefix`, in order,
/// ending at `location`. Its children extend the prefix by one location.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// The last location of the partial tour.
    pub location: usize,
    /// The partial tour from the starting location up to and including `location`.
    pub prefix: Vec<usize>,
    /// The number of rollouts that went through this node.
    pub visits: u32,
    /// Length of the shortest complete tour seen in this subtree.
    pub best_length: f64,
    /// The tour behind `best_length`.
    pub best_tour: Option<Tour>,
    /// How far the children have been materialized.
    pub expansion: Expansion,
    /// Set when the prefix already covers every location.
    pub is_terminal: bool,
    /// Set when nothing below this node is left to try: either it is terminal,
    /// or it is fully expanded and all of its children are settled.
    pub is_settled: bool,
}

impl SearchNode {
    /// Creates the node for `prefix` followed by `location` in an environment
    /// of `size` locations. An empty `prefix` gives a root.
    pub fn extending(prefix: &[usize], location: usize, size: usize) -> Self {
        let mut extended = Vec::with_capacity(prefix.len() + 1);
        extended.extend_from_slice(prefix);
        extended.push(location);
        let is_terminal = extended.len() >= size;
        SearchNode {
            location,
            prefix: extended,
            visits: 0,
            best_length: f64::INFINITY,
            best_tour: None,
            expansion: Expansion::Unexpanded,
            is_terminal,
            is_settled: is_terminal,
        }
    }

    /// Number of locations in the partial tour.
    pub fn depth(&self) -> usize {
        self.prefix.len()
    }

    pub fn is_visited(&self) -> bool {
        self.visits > 0
    }

    /// Keeps `tour` if it beats the best one seen so far. Returns whether it did.
    pub fn record(&mut self, tour: &Tour) -> bool {
        if tour.length() < self.best_length {
            self.best_length = tour.length();
            self.best_tour = Some(tour.clone());
            true
        } else {
            false
        }
    }
}

impl PartialEq<Self> for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix
    }
}

impl Eq for SearchNode {}
