//! Convergence detection across Parareal iterations.
//!
//! A [`Convergence`] monitor keeps every trajectory it is shown and reports
//! convergence once the two most recent trajectories agree state by state
//! within an absolute tolerance:
//!
//! ```text
//! |a[i] - b[i]| <= abs_tol    for every grid point i (and every component)
//! ```
//!
//! Every call compares the two newest trajectories afresh, so a run that
//! agrees once and then drifts apart stops recommending a stop. The monitor's
//! [`State`] records the outcome of the latest comparison. It only recommends
//! stopping. Used as an [`Observer`] it returns a stop action, and the solver
//! decides what to do with it.
//!
//! ```
//! use pint_observers::Convergence;
//!
//! let mut monitor = Convergence::<f64>::default();
//!
//! assert!(!monitor.observe(&[1.0, 0.5]));
//! assert!(!monitor.observe(&[1.0, 0.6]));
//! assert!(monitor.observe(&[1.0, 0.60001]));
//! assert_eq!(monitor.history().len(), 3);
//! ```

use approx::AbsDiffEq;
use pint_core::Observer;
use thiserror::Error;
use tracing::debug;

use crate::traits::{CanStopEarly, HasTrajectory};

/// States whose distance can be tested against an absolute tolerance.
pub trait AbsDiff {
    /// Returns whether every component of `self` is within `tol` of `other`.
    ///
    /// Values of different shapes are never within tolerance.
    fn abs_diff_within(&self, other: &Self, tol: f64) -> bool;
}

impl AbsDiff for f64 {
    fn abs_diff_within(&self, other: &Self, tol: f64) -> bool {
        self.abs_diff_eq(other, tol)
    }
}

impl AbsDiff for [f64] {
    fn abs_diff_within(&self, other: &Self, tol: f64) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.abs_diff_eq(b, tol))
    }
}

impl<const N: usize> AbsDiff for [f64; N] {
    fn abs_diff_within(&self, other: &Self, tol: f64) -> bool {
        self.as_slice().abs_diff_within(other.as_slice(), tol)
    }
}

impl AbsDiff for Vec<f64> {
    fn abs_diff_within(&self, other: &Self, tol: f64) -> bool {
        self.as_slice().abs_diff_within(other.as_slice(), tol)
    }
}

#[cfg(feature = "ndarray")]
impl AbsDiff for ndarray::Array1<f64> {
    fn abs_diff_within(&self, other: &Self, tol: f64) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.abs_diff_eq(b, tol))
    }
}

/// Configuration for the convergence monitor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    abs_tol: f64,
}

/// Errors that can occur when validating a convergence monitor config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("abs_tol must be finite and non-negative")]
    AbsTol,
}

impl Default for Config {
    fn default() -> Self {
        Self { abs_tol: 1e-4 }
    }
}

impl Config {
    /// Creates a config with a validated absolute tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if `abs_tol` is negative or non-finite.
    pub fn new(abs_tol: f64) -> Result<Self, ConfigError> {
        if !abs_tol.is_finite() || abs_tol < 0.0 {
            return Err(ConfigError::AbsTol);
        }
        Ok(Self { abs_tol })
    }

    /// Returns the absolute tolerance states must agree within.
    #[must_use]
    pub fn abs_tol(&self) -> f64 {
        self.abs_tol
    }
}

/// Where a monitor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Fewer than two trajectories seen, or the latest two still differ.
    Accumulating,

    /// The latest two trajectories agree.
    Converged,
}

/// Watches successive trajectories and recommends stopping once they agree.
///
/// Each monitor owns its history; independent runs need independent monitors.
#[derive(Debug, Clone)]
pub struct Convergence<V> {
    config: Config,
    state: State,
    history: Vec<Vec<V>>,
}

impl<V> Default for Convergence<V> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<V> Convergence<V> {
    /// Creates a monitor with an empty history.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: State::Accumulating,
            history: Vec::new(),
        }
    }

    /// Returns the monitor's configuration.
    #[must_use]
    pub fn config(&self) -> Config {
        self.config
    }

    /// Returns the outcome of the latest comparison.
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns whether the two most recent trajectories agree.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.state == State::Converged
    }

    /// Returns every observed trajectory, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Vec<V>] {
        &self.history
    }

    /// Consumes the monitor and returns its history.
    pub fn into_history(self) -> Vec<Vec<V>> {
        self.history
    }
}

impl<V: AbsDiff + Clone> Convergence<V> {
    /// Records `trajectory` and returns whether iteration may stop.
    ///
    /// The first call always returns `false`. After that, returns `true` if
    /// and only if the two most recent trajectories agree within the
    /// tolerance.
    pub fn observe(&mut self, trajectory: &[V]) -> bool {
        self.history.push(trajectory.to_vec());

        let agree = match self.history.as_slice() {
            [.., prev, last] => trajectories_agree(prev, last, self.config.abs_tol),
            _ => false,
        };

        let next = if agree {
            State::Converged
        } else {
            State::Accumulating
        };
        if next != self.state {
            debug!(
                observed = self.history.len(),
                abs_tol = self.config.abs_tol,
                state = ?next,
                "convergence state changed"
            );
            self.state = next;
        }

        agree
    }
}

fn trajectories_agree<V: AbsDiff>(a: &[V], b: &[V], tol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.abs_diff_within(y, tol))
}

impl<V, E, A> Observer<E, A> for Convergence<V>
where
    V: AbsDiff + Clone,
    E: HasTrajectory<V>,
    A: CanStopEarly,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        Convergence::observe(self, event.trajectory()).then(A::stop_early)
    }
}

impl<V, E, A> Observer<E, A> for &mut Convergence<V>
where
    V: AbsDiff + Clone,
    E: HasTrajectory<V>,
    A: CanStopEarly,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        Convergence::observe(&mut **self, event.trajectory()).then(A::stop_early)
    }
}
