use std::convert::Infallible;

use pint_core::{Integrator, Vector};

use super::System;

/// A single explicit Euler step across the whole requested interval.
///
/// ```text
/// y(t1) = y(t0) + (t1 - t0) * f(y(t0), t0)
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ForwardEuler<S> {
    system: S,
}

impl<S> ForwardEuler<S> {
    pub fn new(system: S) -> Self {
        Self { system }
    }

    /// Returns the system being integrated.
    pub fn system(&self) -> &S {
        &self.system
    }
}

impl<V, S> Integrator<V> for ForwardEuler<S>
where
    V: Vector,
    S: System<V>,
{
    type Error = Infallible;

    fn solve(&self, _iteration: usize, state: &V, t0: f64, t1: f64) -> Result<V, Infallible> {
        let slope = self.system.derivative(state, t0);
        Ok(state.add(&slope.scale(t1 - t0)))
    }
}
