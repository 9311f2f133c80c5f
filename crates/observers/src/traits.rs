//! Capability traits for cross-solver observers.
//!
//! These traits abstract over solver-specific event and action types, so an
//! observer such as [`Convergence`](crate::Convergence) can watch any solver
//! whose events carry a trajectory and whose actions can stop it.
//!
//! # Event traits
//!
//! - [`HasTrajectory`] — events that carry a full trajectory
//!
//! # Action traits
//!
//! - [`CanStopEarly`] — actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use pint_core::Observer;
//! use pint_observers::traits::{CanStopEarly, HasTrajectory};
//!
//! /// Stops once the final state drops below a threshold.
//! struct Settled {
//!     threshold: f64,
//! }
//!
//! impl<E: HasTrajectory<f64>, A: CanStopEarly> Observer<E, A> for Settled {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         let last = event.trajectory().last()?;
//!         (last.abs() < self.threshold).then(A::stop_early)
//!     }
//! }
//! ```

use pint_solvers::scheduler;

/// An event that carries one state per grid point.
pub trait HasTrajectory<V> {
    /// Returns the trajectory for this event.
    fn trajectory(&self) -> &[V];
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

// --- HasTrajectory for scheduler::Event ---

impl<V> HasTrajectory<V> for scheduler::Event<V> {
    fn trajectory(&self) -> &[V] {
        &self.trajectory
    }
}

// --- CanStopEarly for scheduler::Action ---

impl CanStopEarly for scheduler::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
