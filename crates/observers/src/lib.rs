//! Reusable observers for Parareal runs.
//!
//! # Modules
//!
//! - [`convergence`] — the [`Convergence`] monitor, which recommends stopping
//!   once two successive trajectories agree
//! - [`traits`] — capability traits for cross-solver observers
//!   ([`HasTrajectory`], [`CanStopEarly`])
//!
//! # Features
//!
//! - `ndarray` — compares `ndarray::Array1<f64>` states.
//!
//! [`HasTrajectory`]: traits::HasTrajectory
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod convergence;
pub mod traits;

pub use convergence::{AbsDiff, Config, ConfigError, Convergence, State};
