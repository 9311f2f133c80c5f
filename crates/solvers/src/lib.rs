//! Parareal solvers for parallel-in-time integration.
//!
//! # Modules
//!
//! - [`tabulate`] — sequential solve across a time grid
//! - [`parareal`] — the correction step, evaluated serially
//! - [`scheduler`] — the correction recurrence as a concurrent task graph,
//!   harvested iteration by iteration
//! - [`executor`] — futures, promises, and the executors tasks run on
//! - [`ode`] — reference integrators and test problems

pub mod executor;
pub mod ode;
pub mod parareal;
pub mod scheduler;
pub mod tabulate;

pub use parareal::Parareal;
pub use scheduler::Scheduler;
pub use tabulate::tabulate;
