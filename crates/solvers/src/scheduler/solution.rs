/// Indicates how harvesting terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The observer asked to stop, typically because the iterates converged.
    StoppedByObserver,

    /// Every scheduled iteration was harvested without the observer stopping.
    Exhausted,
}

/// The result of a Parareal run.
#[derive(Debug, Clone)]
pub struct Solution<V> {
    /// How harvesting terminated.
    pub status: Status,

    /// Trajectories of every harvested iteration, starting with iteration 0.
    pub history: Vec<Vec<V>>,
}

impl<V> Solution<V> {
    /// Returns the number of correction iterations harvested after iteration 0.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.history.len().saturating_sub(1)
    }

    /// Returns the last harvested trajectory.
    #[must_use]
    pub fn trajectory(&self) -> Option<&[V]> {
        self.history.last().map(Vec::as_slice)
    }
}
