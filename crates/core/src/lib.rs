//! Core traits and types for parallel-in-time integration.
//!
//! This crate defines the shared abstractions that Parareal solvers and
//! observers build on:
//!
//! - [`Vector`] — the addition, subtraction, and scaling a state must support
//! - [`TimeGrid`] — a validated, strictly increasing sequence of time points
//! - [`Integrator`] — advances a state across a time slice
//! - [`Mapping`] — converts a state between coarse and fine representations
//! - [`Observer`] — receives solver events and optionally returns control actions

mod grid;
mod integrator;
mod mapping;
mod observer;
mod vector;

pub use grid::{GridError, TimeGrid};
pub use integrator::{Integrator, PerIteration};
pub use mapping::{Identity, Mapping};
pub use observer::Observer;
pub use vector::Vector;
