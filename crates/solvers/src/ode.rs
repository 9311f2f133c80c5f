//! Reference integrators for ordinary differential equations.
//!
//! These are small, dependable integrators for exercising Parareal without an
//! external solver: a [`ForwardEuler`] step, a [`Substepped`] wrapper that
//! repeats a step over a finer uniform partition, and the damped
//! [`HarmonicOscillator`] with its closed-form underdamped solution.
//!
//! A typical coarse/fine pair is one Euler step per slice against Euler with a
//! small fixed step:
//!
//! ```
//! use pint_core::Integrator;
//! use pint_solvers::ode::{ForwardEuler, HarmonicOscillator, Substepped};
//!
//! let oscillator = HarmonicOscillator::from_si(1.0, 0.5).unwrap();
//! let coarse = ForwardEuler::new(oscillator);
//! let fine = Substepped::new(ForwardEuler::new(oscillator), 1e-3).unwrap();
//!
//! let y0 = [1.0, 0.0];
//! let exact = oscillator.underdamped_solution(y0, 0.5).unwrap();
//! let rough = coarse.solve(0, &y0, 0.0, 0.5).unwrap();
//! let close = fine.solve(0, &y0, 0.0, 0.5).unwrap();
//!
//! assert!((close[0] - exact[0]).abs() < (rough[0] - exact[0]).abs());
//! ```

mod euler;
mod oscillator;
mod substep;

pub use euler::ForwardEuler;
pub use oscillator::{HarmonicOscillator, OscillatorError};
pub use substep::{StepError, Substepped};

/// The right-hand side of an autonomous or time-dependent ODE `y' = f(y, t)`.
///
/// Any closure `Fn(&V, f64) -> V` is a system.
pub trait System<V> {
    /// Returns the time derivative of `state` at time `t`.
    fn derivative(&self, state: &V, t: f64) -> V;
}

impl<V, F> System<V> for F
where
    F: Fn(&V, f64) -> V,
{
    fn derivative(&self, state: &V, t: f64) -> V {
        self(state, t)
    }
}
