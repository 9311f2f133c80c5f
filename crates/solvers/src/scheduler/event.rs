/// Event emitted by the Parareal scheduler for each resolved iteration.
///
/// Iteration 0 is the coarse tabulation. Iterations 1..=N are the
/// corrected trajectories, delivered strictly in order.
#[derive(Debug, Clone)]
pub struct Event<V> {
    /// The iteration number.
    pub iteration: usize,

    /// One state per grid point.
    pub trajectory: Vec<V>,
}
