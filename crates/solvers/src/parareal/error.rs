use std::error::Error as StdError;

/// Errors that can occur during a Parareal correction step.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("trajectory has {actual} states but the grid has {expected} points")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("coarse integrator failed on slice {slice}: {source}")]
    Coarse {
        slice: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("fine integrator failed on slice {slice}: {source}")]
    Fine {
        slice: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn coarse<E: StdError + Send + Sync + 'static>(slice: usize, err: E) -> Self {
        Self::Coarse {
            slice,
            source: Box::new(err),
        }
    }

    pub(crate) fn fine<E: StdError + Send + Sync + 'static>(slice: usize, err: E) -> Self {
        Self::Fine {
            slice,
            source: Box::new(err),
        }
    }
}
