use pint_core::Integrator;
use thiserror::Error;

/// Repeats an integrator over a uniform partition of each interval.
///
/// An interval `[t0, t1]` is split into `n = ceil((t1 - t0) / max_step)`
/// equal substeps, so no substep is longer than `max_step` and the last one
/// ends exactly at `t1`.
#[derive(Debug, Clone, Copy)]
pub struct Substepped<I> {
    inner: I,
    max_step: f64,
}

/// Errors that can occur when configuring a [`Substepped`] integrator.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    #[error("max_step must be finite and positive")]
    MaxStep,
}

impl<I> Substepped<I> {
    /// Wraps `inner` so that it never advances more than `max_step` at once.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_step` is not finite and positive.
    pub fn new(inner: I, max_step: f64) -> Result<Self, StepError> {
        if !max_step.is_finite() || max_step <= 0.0 {
            return Err(StepError::MaxStep);
        }
        Ok(Self { inner, max_step })
    }

    #[must_use]
    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    /// Returns the number of substeps taken across `[t0, t1]`.
    #[must_use]
    pub fn substeps(&self, t0: f64, t1: f64) -> usize {
        // Float division can land a hair above an exact multiple.
        let ratio = (t1 - t0) / self.max_step;
        let rounded = ratio.round();
        let count = if (ratio - rounded).abs() < 1e-9 {
            rounded
        } else {
            ratio.ceil()
        };
        // `as` saturates; the count is at least one for any non-empty interval.
        (count as usize).max(1)
    }
}

impl<V, I> Integrator<V> for Substepped<I>
where
    I: Integrator<V>,
{
    type Error = I::Error;

    fn solve(&self, iteration: usize, state: &V, t0: f64, t1: f64) -> Result<V, I::Error> {
        let n = self.substeps(t0, t1);
        let h = (t1 - t0) / n as f64;

        let bound = |k: usize| if k == n { t1 } else { t0 + h * k as f64 };

        let mut y = self.inner.solve(iteration, state, t0, bound(1))?;
        for k in 1..n {
            y = self.inner.solve(iteration, &y, bound(k), bound(k + 1))?;
        }
        Ok(y)
    }
}
