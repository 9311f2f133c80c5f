//! Sequential tabulation of an integrator over a time grid.
//!
//! Tabulation is the plain serial solve:
//!
//! ```text
//! y[0] = y0
//! y[i] = step(y[i-1], t[i-1], t[i])    for i = 1..m
//! ```
//!
//! It builds the purely coarse initial guess of a Parareal run, and tabulating
//! the fine integrator gives the serial reference a converged Parareal run
//! reproduces.

use std::error::Error as StdError;

use pint_core::{Integrator, TimeGrid};

/// Errors that can occur during tabulation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("integrator failed on slice {slice}: {source}")]
    Integrator {
        slice: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn integrator<E: StdError + Send + Sync + 'static>(slice: usize, err: E) -> Self {
        Self::Integrator {
            slice,
            source: Box::new(err),
        }
    }
}

/// Applies `step` across every slice of `grid`, starting from `y0`.
///
/// The returned trajectory has one state per grid point and starts with `y0`.
/// A single-point grid returns `[y0]` without calling the integrator.
/// `iteration` is passed through to every call.
///
/// # Errors
///
/// Returns an error identifying the slice if the integrator fails.
pub fn tabulate<V, I>(step: &I, iteration: usize, y0: V, grid: &TimeGrid) -> Result<Vec<V>, Error>
where
    I: Integrator<V> + ?Sized,
{
    let mut trajectory = Vec::with_capacity(grid.len());
    trajectory.push(y0);

    for (slice, t0, t1) in grid.spans() {
        let next = step
            .solve(iteration, &trajectory[slice - 1], t0, t1)
            .map_err(|err| Error::integrator(slice, err))?;
        trajectory.push(next);
    }

    Ok(trajectory)
}
