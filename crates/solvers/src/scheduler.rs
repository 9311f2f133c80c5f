//! Parareal as a concurrent task graph.
//!
//! The [`Scheduler`] turns the correction recurrence of [`Parareal`] into a
//! graph of futures and submits all of it up front, for a fixed number of
//! iterations:
//!
//! ```text
//! iteration 0:  y0 ─coarse─▶ ● ─coarse─▶ ● ─coarse─▶ ●
//!                 ╲           ╲           ╲
//!                  fine        fine        fine           (run concurrently)
//!                    ╲           ╲           ╲
//! iteration 1:  y0 ─coarse─▶ ⊕ ─coarse─▶ ⊕ ─coarse─▶ ⊕
//! ```
//!
//! Each `⊕` combines the coarse solve from the corrected predecessor, the fine
//! solve from the previous iterate, and the coarse solve from the previous
//! iterate. A task is handed to the executor only once its inputs have
//! resolved, so the fine solve of slice `i` in iteration `k` starts as soon as
//! `prev[i-1]` is known, while the coarse chain of an iteration advances
//! sequentially behind it.
//!
//! The returned [`Handle`] delivers iterations in order to an [`Observer`],
//! which decides when to stop; see [`Handle::wait`].
//!
//! # Example
//!
//! ```
//! use std::{convert::Infallible, sync::Arc};
//!
//! use pint_core::TimeGrid;
//! use pint_solvers::{
//!     Parareal,
//!     executor::{Executor, Inline},
//!     scheduler::{Action, Config, Event, Scheduler, Status},
//! };
//!
//! let coarse = |x: &f64, t0: f64, t1: f64| Ok::<_, Infallible>(x * (1.0 - (t1 - t0)));
//! let fine = |x: &f64, t0: f64, t1: f64| Ok::<_, Infallible>(x * (t0 - t1).exp());
//!
//! let executor: Arc<dyn Executor> = Arc::new(Inline);
//! let scheduler = Scheduler::new(executor, Parareal::new(coarse, fine));
//! let grid = TimeGrid::linspace(0.0, 2.0, 5).unwrap();
//!
//! let mut last: Option<Vec<f64>> = None;
//! let solution = scheduler
//!     .run(1.0, &grid, &Config::new(8), |event: &Event<f64>| {
//!         let done = last.as_ref().is_some_and(|prev| {
//!             prev.iter()
//!                 .zip(&event.trajectory)
//!                 .all(|(a, b)| (a - b).abs() < 1e-10)
//!         });
//!         last = Some(event.trajectory.clone());
//!         done.then_some(Action::StopEarly)
//!     })
//!     .unwrap();
//!
//! assert_eq!(solution.status, Status::StoppedByObserver);
//! ```

mod action;
mod config;
mod error;
mod event;
mod handle;
mod solution;

#[cfg(test)]
mod tests;

pub use action::Action;
pub use config::Config;
pub use error::{Error, Propagator, SliceError};
pub use event::Event;
pub use handle::Handle;
pub use solution::{Solution, Status};

use std::sync::Arc;

use pint_core::{Identity, Integrator, Mapping, Observer, TimeGrid, Vector};
use tracing::debug;

use crate::{
    executor::{Executor, Future, ready, submit_after},
    parareal::{Parareal, combine},
};

use handle::CancelToken;

/// Runs Parareal iterations as futures on an [`Executor`].
pub struct Scheduler<C, F, C2F = Identity, F2C = Identity> {
    executor: Arc<dyn Executor>,
    parareal: Arc<Parareal<C, F, C2F, F2C>>,
}

impl<C, F, C2F, F2C> Scheduler<C, F, C2F, F2C> {
    /// Creates a scheduler that submits the solves of `parareal` to `executor`.
    pub fn new(executor: Arc<dyn Executor>, parareal: Parareal<C, F, C2F, F2C>) -> Self {
        Self {
            executor,
            parareal: Arc::new(parareal),
        }
    }

    /// Returns the integrator pair.
    pub fn parareal(&self) -> &Parareal<C, F, C2F, F2C> {
        &self.parareal
    }
}

impl<C, F, C2F, F2C> Scheduler<C, F, C2F, F2C>
where
    C: Send + Sync + 'static,
    F: Send + Sync + 'static,
    C2F: Send + Sync + 'static,
    F2C: Send + Sync + 'static,
{
    /// Submits iteration 0 and `config.max_iters()` corrections.
    ///
    /// Returns immediately. Integrator calls run on the executor as their
    /// inputs become available; with an inline executor they run before this
    /// returns.
    ///
    /// # Errors
    ///
    /// This function does not fail for a valid [`TimeGrid`]. Integrator
    /// failures are delivered through the handle.
    pub fn schedule<V>(&self, y0: V, grid: &TimeGrid, config: &Config) -> Result<Handle<V>, Error>
    where
        V: Vector + Clone + Send + Sync + 'static,
        C: Integrator<V>,
        F: Integrator<V>,
        C2F: Mapping<V>,
        F2C: Mapping<V>,
    {
        let cancel = CancelToken::default();
        let mut iterations = Vec::with_capacity(config.max_iters() + 1);

        let initial = ready(y0);
        let tabulation = self.coarse_chain(0, &initial, grid, &cancel);
        debug!(slices = grid.slices(), "scheduled coarse tabulation");

        let mut layer: Vec<Future<V>> = std::iter::once(initial.clone())
            .chain(tabulation.iter().cloned())
            .collect();
        let mut coarse_new = tabulation;
        iterations.push(layer.clone());

        for k in 1..=config.max_iters() {
            let prev = &layer;

            // Every fine solve of the iteration goes in before the coarse chain.
            let fine: Vec<Future<V>> = grid
                .spans()
                .map(|(slice, t0, t1)| self.fine_task(k, slice, &prev[slice - 1], t0, t1, &cancel))
                .collect();

            let coarse_prev: Vec<Future<V>> = if config.reuse_coarse() {
                coarse_new
            } else {
                grid.spans()
                    .map(|(slice, t0, t1)| {
                        self.coarse_task(k, slice, &prev[slice - 1], t0, t1, &cancel)
                    })
                    .collect()
            };

            let mut next = Vec::with_capacity(grid.len());
            next.push(initial.clone());
            let mut corrected_coarse = Vec::with_capacity(grid.slices());
            for (slice, t0, t1) in grid.spans() {
                let coarse = self.coarse_task(k, slice, &next[slice - 1], t0, t1, &cancel);
                let inputs = [
                    coarse.clone(),
                    fine[slice - 1].clone(),
                    coarse_prev[slice - 1].clone(),
                ];
                let token = cancel.clone();
                next.push(submit_after(
                    &self.executor,
                    inputs,
                    move |[coarse_new, fine, coarse_prev]| {
                        token.check()?;
                        Ok(combine(&*coarse_new, &*fine, &*coarse_prev))
                    },
                ));
                corrected_coarse.push(coarse);
            }
            debug!(iteration = k, "scheduled correction");

            iterations.push(next.clone());
            layer = next;
            coarse_new = corrected_coarse;
        }

        Ok(Handle::new(grid.clone(), iterations, cancel))
    }

    /// Validates raw time points, then schedules as [`Scheduler::schedule`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Grid`] if `points` is not a valid time grid.
    pub fn schedule_at<V>(&self, y0: V, points: &[f64], config: &Config) -> Result<Handle<V>, Error>
    where
        V: Vector + Clone + Send + Sync + 'static,
        C: Integrator<V>,
        F: Integrator<V>,
        C2F: Mapping<V>,
        F2C: Mapping<V>,
    {
        let grid = TimeGrid::try_from(points)?;
        self.schedule(y0, &grid, config)
    }

    /// Schedules a run and waits on it with `observer`.
    ///
    /// # Errors
    ///
    /// Returns the first failure in iteration order; see [`Handle::wait`].
    pub fn run<V, O>(
        &self,
        y0: V,
        grid: &TimeGrid,
        config: &Config,
        observer: O,
    ) -> Result<Solution<V>, Error>
    where
        V: Vector + Clone + Send + Sync + 'static,
        C: Integrator<V>,
        F: Integrator<V>,
        C2F: Mapping<V>,
        F2C: Mapping<V>,
        O: Observer<Event<V>, Action>,
    {
        self.schedule(y0, grid, config)?.wait(observer)
    }

    /// Schedules the sequential coarse tabulation of iteration 0.
    ///
    /// Returns the futures of points `1..len`.
    fn coarse_chain<V>(
        &self,
        iteration: usize,
        initial: &Future<V>,
        grid: &TimeGrid,
        cancel: &CancelToken,
    ) -> Vec<Future<V>>
    where
        V: Vector + Clone + Send + Sync + 'static,
        C: Integrator<V>,
        C2F: Mapping<V>,
        F2C: Mapping<V>,
    {
        let mut chain: Vec<Future<V>> = Vec::with_capacity(grid.slices());
        for (slice, t0, t1) in grid.spans() {
            let input = chain.last().unwrap_or(initial);
            let next = self.coarse_task(iteration, slice, input, t0, t1, cancel);
            chain.push(next);
        }
        chain
    }

    fn coarse_task<V>(
        &self,
        iteration: usize,
        slice: usize,
        input: &Future<V>,
        t0: f64,
        t1: f64,
        cancel: &CancelToken,
    ) -> Future<V>
    where
        V: Send + Sync + 'static,
        C: Integrator<V>,
        C2F: Mapping<V>,
        F2C: Mapping<V>,
    {
        let parareal = Arc::clone(&self.parareal);
        let cancel = cancel.clone();
        submit_after(&self.executor, [input.clone()], move |[state]| {
            cancel.check()?;
            parareal
                .coarse_step(iteration, &*state, t0, t1)
                .map_err(|err| SliceError::task(iteration, slice, Propagator::Coarse, err))
        })
    }

    fn fine_task<V>(
        &self,
        iteration: usize,
        slice: usize,
        input: &Future<V>,
        t0: f64,
        t1: f64,
        cancel: &CancelToken,
    ) -> Future<V>
    where
        V: Send + Sync + 'static,
        F: Integrator<V>,
    {
        let parareal = Arc::clone(&self.parareal);
        let cancel = cancel.clone();
        submit_after(&self.executor, [input.clone()], move |[state]| {
            cancel.check()?;
            debug!(iteration, slice, "fine solve");
            parareal
                .fine()
                .solve(iteration, &*state, t0, t1)
                .map_err(|err| SliceError::task(iteration, slice, Propagator::Fine, err))
        })
    }
}

impl<C, F, C2F, F2C> std::fmt::Debug for Scheduler<C, F, C2F, F2C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler").finish_non_exhaustive()
    }
}
