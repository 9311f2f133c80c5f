use std::error::Error as StdError;

/// Advances a state from one time to another.
///
/// An integrator is the black box a Parareal solver drives. Given a state valid
/// at `t0` it returns a state valid at `t1` (with `t0 < t1`). It may be cheap
/// and coarse, or expensive and backed by an out-of-process solver.
///
/// The Parareal iteration that requested the solve is passed through as
/// `iteration`. Solvers never interpret it; it exists for integrators that do
/// per-iteration bookkeeping such as naming output directories.
///
/// Any closure `Fn(&V, f64, f64) -> Result<V, E>` is an integrator that ignores
/// the iteration. Wrap a closure in [`PerIteration`] to receive it.
pub trait Integrator<V> {
    type Error: StdError + Send + Sync + 'static;

    /// Propagates `state` from `t0` to `t1`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the state cannot be propagated.
    fn solve(&self, iteration: usize, state: &V, t0: f64, t1: f64) -> Result<V, Self::Error>;
}

impl<V, E, F> Integrator<V> for F
where
    F: Fn(&V, f64, f64) -> Result<V, E>,
    E: StdError + Send + Sync + 'static,
{
    type Error = E;

    fn solve(&self, _iteration: usize, state: &V, t0: f64, t1: f64) -> Result<V, E> {
        self(state, t0, t1)
    }
}

/// Adapts a closure that takes the Parareal iteration as its first argument.
///
/// ```
/// use std::convert::Infallible;
///
/// use pint_core::{Integrator, PerIteration};
///
/// let tagged = PerIteration(|n: usize, x: &f64, t0: f64, t1: f64| {
///     Ok::<_, Infallible>(x + (t1 - t0) * n as f64)
/// });
///
/// assert_eq!(tagged.solve(2, &1.0, 0.0, 0.5), Ok(2.0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PerIteration<F>(pub F);

impl<V, E, F> Integrator<V> for PerIteration<F>
where
    F: Fn(usize, &V, f64, f64) -> Result<V, E>,
    E: StdError + Send + Sync + 'static,
{
    type Error = E;

    fn solve(&self, iteration: usize, state: &V, t0: f64, t1: f64) -> Result<V, E> {
        (self.0)(iteration, state, t0, t1)
    }
}
