use std::time::{Duration, Instant};

/// How much work a search loop may do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Budget {
    /// A fixed number of loop iterations.
    Iterations(usize),
    /// Wall-clock time measured from [`Budget::start`].
    TimeLimit(Duration),
}

impl Budget {
    pub fn start(self) -> BudgetTracker {
        BudgetTracker {
            budget: self,
            started: Instant::now(),
            consumed: 0,
        }
    }
}

/// Running account of a [`Budget`], checked once per loop iteration.
#[derive(Debug, Clone)]
pub struct BudgetTracker {
    budget: Budget,
    started: Instant,
    consumed: usize,
}

impl BudgetTracker {
    /// Takes one unit of work. Returns `false` once the budget is exhausted.
    pub fn consume(&mut self) -> bool {
        let available = match self.budget {
            Budget::Iterations(limit) => self.consumed < limit,
            Budget::TimeLimit(limit) => self.started.elapsed() < limit,
        };
        if available {
            self.consumed += 1;
        }
        available
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }
}
