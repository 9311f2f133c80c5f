/// Configuration for the Parareal scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    max_iters: usize,
    reuse_coarse: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Config {
    /// Creates a config that schedules `max_iters` correction iterations
    /// after the coarse tabulation.
    #[must_use]
    pub fn new(max_iters: usize) -> Self {
        Self {
            max_iters,
            reuse_coarse: true,
        }
    }

    /// Sets whether the coarse solve of the previous iterate is reused.
    ///
    /// The coarse term `coarse(prev[i-1])` of iteration `k` has the same input
    /// as the corrected coarse term of iteration `k-1` on the same slice. When
    /// reuse is on (the default) the scheduler reads that future instead of
    /// calling the coarse integrator again. Turn it off for coarse integrators
    /// whose result depends on the iteration number.
    #[must_use]
    pub fn with_coarse_reuse(mut self, reuse: bool) -> Self {
        self.reuse_coarse = reuse;
        self
    }

    /// Returns the number of correction iterations to schedule.
    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Returns whether coarse solves are reused across iterations.
    #[must_use]
    pub fn reuse_coarse(&self) -> bool {
        self.reuse_coarse
    }
}
