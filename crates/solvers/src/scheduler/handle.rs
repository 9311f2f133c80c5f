use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use pint_core::{Observer, TimeGrid};
use tracing::{debug, info, warn};

use crate::executor::{Future, TaskError};

use super::{Action, Error, Event, Solution, Status};

/// Shared flag that stops undispatched tasks from calling their integrator.
#[derive(Debug, Clone, Default)]
pub(crate) struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub(crate) fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Fails with [`TaskError::Cancelled`] once the token is set.
    pub(crate) fn check(&self) -> Result<(), TaskError> {
        if self.is_cancelled() {
            Err(TaskError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// The futures of a scheduled Parareal run.
///
/// Holds one future per grid point for every scheduled iteration. Iteration 0
/// is the coarse tabulation; iteration `k` is the `k`-th correction.
#[derive(Debug)]
pub struct Handle<V> {
    grid: TimeGrid,
    iterations: Vec<Vec<Future<V>>>,
    cancel: CancelToken,
}

impl<V> Handle<V> {
    pub(crate) fn new(grid: TimeGrid, iterations: Vec<Vec<Future<V>>>, cancel: CancelToken) -> Self {
        Self {
            grid,
            iterations,
            cancel,
        }
    }

    /// Returns the grid the run was scheduled on.
    #[must_use]
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Returns the number of scheduled iterations, including iteration 0.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations.len()
    }

    /// Returns the per-point futures of iteration `k`.
    #[must_use]
    pub fn iteration(&self, k: usize) -> Option<&[Future<V>]> {
        self.iterations.get(k).map(Vec::as_slice)
    }

    /// Stops tasks that have not started yet from calling their integrator.
    ///
    /// Such tasks, and everything downstream of them, resolve with
    /// [`TaskError::Cancelled`]. Integrator calls already in progress run to
    /// completion.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns whether the run has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<V: Clone> Handle<V> {
    /// Blocks until iteration `k` has fully resolved and returns its trajectory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unscheduled`] if `k` is not a scheduled iteration, or
    /// [`Error::Task`] with the first failure found along the trajectory.
    pub fn trajectory(&self, k: usize) -> Result<Vec<V>, Error> {
        let futures = self.iteration(k).ok_or(Error::Unscheduled {
            iteration: k,
            scheduled: self.iterations(),
        })?;
        futures
            .iter()
            .map(|future| {
                future
                    .result()
                    .map(|state| V::clone(&state))
                    .map_err(|source| Error::Task {
                        iteration: k,
                        source,
                    })
            })
            .collect()
    }

    /// Harvests iterations in order, passing each to `observer`.
    ///
    /// Iteration `k + 1` is never reported before iteration `k`. Waiting ends
    /// as soon as the observer returns [`Action::StopEarly`]; the remaining
    /// work is then cancelled rather than waited on. Running out of
    /// iterations is not an error and yields [`Status::Exhausted`].
    ///
    /// # Errors
    ///
    /// Returns the first failure in iteration order. The observer is not
    /// called for the failed iteration, and the rest of the run is cancelled.
    pub fn wait<O>(&self, mut observer: O) -> Result<Solution<V>, Error>
    where
        O: Observer<Event<V>, Action>,
    {
        let mut history = Vec::with_capacity(self.iterations.len());

        for k in 0..self.iterations.len() {
            let trajectory = match self.trajectory(k) {
                Ok(trajectory) => trajectory,
                Err(err) => {
                    warn!(iteration = k, error = %err, "parareal iteration failed");
                    self.cancel();
                    return Err(err);
                }
            };
            debug!(iteration = k, "harvested iteration");

            history.push(trajectory.clone());
            let event = Event {
                iteration: k,
                trajectory,
            };
            if let Some(Action::StopEarly) = observer.observe(&event) {
                info!(iteration = k, "observer stopped parareal");
                self.cancel();
                return Ok(Solution {
                    status: Status::StoppedByObserver,
                    history,
                });
            }
        }

        info!(
            iterations = self.iterations.len(),
            "parareal exhausted its iterations"
        );
        Ok(Solution {
            status: Status::Exhausted,
            history,
        })
    }
}
