use std::{error::Error as StdError, fmt};

use pint_core::GridError;

use crate::executor::TaskError;

/// Errors that can occur while scheduling or harvesting a Parareal run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid time grid: {0}")]
    Grid(#[from] GridError),

    #[error("iteration {iteration} was not scheduled (run has {scheduled})")]
    Unscheduled { iteration: usize, scheduled: usize },

    #[error("iteration {iteration} failed: {source}")]
    Task {
        iteration: usize,
        #[source]
        source: TaskError,
    },
}

impl Error {
    /// Returns the integrator failure behind this error, if there is one.
    ///
    /// Dependent tasks fail with the same root cause as the task that failed
    /// first, so the slice reported here can precede `iteration`.
    #[must_use]
    pub fn slice_error(&self) -> Option<&SliceError> {
        match self {
            Self::Task {
                source: TaskError::Failed(err),
                ..
            } => err.downcast_ref::<SliceError>(),
            _ => None,
        }
    }
}

/// Which integrator of the pair failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagator {
    Coarse,
    Fine,
}

impl fmt::Display for Propagator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coarse => f.write_str("coarse"),
            Self::Fine => f.write_str("fine"),
        }
    }
}

/// An integrator call that failed inside a scheduled task.
#[derive(Debug, thiserror::Error)]
#[error("{propagator} integrator failed on slice {slice} of iteration {iteration}: {source}")]
pub struct SliceError {
    pub iteration: usize,
    pub slice: usize,
    pub propagator: Propagator,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl SliceError {
    pub(crate) fn task<E: StdError + Send + Sync + 'static>(
        iteration: usize,
        slice: usize,
        propagator: Propagator,
        err: E,
    ) -> TaskError {
        TaskError::failed(Self {
            iteration,
            slice,
            propagator,
            source: Box::new(err),
        })
    }
}
