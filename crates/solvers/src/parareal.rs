//! The Parareal correction step.
//!
//! # Algorithm
//!
//! Given the trajectory `prev` of the previous iteration, one Parareal sweep
//! produces the next iteration's trajectory `next`:
//!
//! ```text
//! next[0] = prev[0]
//! next[i] = c2f(coarse(f2c(next[i-1])))      coarse from the corrected predecessor
//!         +     fine(prev[i-1])              fine from the previous iteration
//!         - c2f(coarse(f2c(prev[i-1])))      the coarse guess the fine solve replaces
//! ```
//!
//! All propagators run over slice `i`, from `t[i-1]` to `t[i]`. The fine terms
//! only read the previous iteration, so they are independent of each other.
//! The first coarse term reads `next[i-1]`, so it forms a sequential chain.
//!
//! This module evaluates a sweep serially. The [`scheduler`](crate::scheduler)
//! runs the same recurrence as a task graph so that the fine solves of an
//! iteration execute concurrently.
//!
//! The three terms are combined as `coarse_new + (fine - coarse_prev)`. When the
//! coarse and fine propagators agree, the bracket is exactly zero and the sweep
//! reproduces the fine tabulation.

mod error;

#[cfg(test)]
mod tests;

pub use error::Error;

use pint_core::{Identity, Integrator, Mapping, TimeGrid, Vector};

/// A coarse/fine integrator pair with the mappings between their state spaces.
///
/// The default mappings are [`Identity`], for integrators that share a state
/// representation.
#[derive(Debug, Clone)]
pub struct Parareal<C, F, C2F = Identity, F2C = Identity> {
    coarse: C,
    fine: F,
    c2f: C2F,
    f2c: F2C,
}

impl<C, F> Parareal<C, F> {
    /// Pairs a coarse and a fine integrator that share a state representation.
    pub fn new(coarse: C, fine: F) -> Self {
        Self {
            coarse,
            fine,
            c2f: Identity,
            f2c: Identity,
        }
    }
}

impl<C, F, C2F, F2C> Parareal<C, F, C2F, F2C> {
    /// Replaces the coarse-to-fine and fine-to-coarse mappings.
    pub fn with_mappings<A, B>(self, c2f: A, f2c: B) -> Parareal<C, F, A, B> {
        Parareal {
            coarse: self.coarse,
            fine: self.fine,
            c2f,
            f2c,
        }
    }

    /// Returns the coarse integrator.
    pub fn coarse(&self) -> &C {
        &self.coarse
    }

    /// Returns the fine integrator.
    pub fn fine(&self) -> &F {
        &self.fine
    }

    /// Splits the pair back into its parts.
    pub fn into_parts(self) -> (C, F, C2F, F2C) {
        (self.coarse, self.fine, self.c2f, self.f2c)
    }

    /// Propagates `state` across one slice with the coarse integrator, working
    /// in the fine representation: `c2f(coarse(f2c(state)))`.
    ///
    /// # Errors
    ///
    /// Returns the coarse integrator's error.
    pub fn coarse_step<V>(
        &self,
        iteration: usize,
        state: &V,
        t0: f64,
        t1: f64,
    ) -> Result<V, <C as Integrator<V>>::Error>
    where
        C: Integrator<V>,
        C2F: Mapping<V>,
        F2C: Mapping<V>,
    {
        let coarse_state = self.f2c.map(state);
        let propagated = self.coarse.solve(iteration, &coarse_state, t0, t1)?;
        Ok(self.c2f.map(&propagated))
    }

    /// Computes the next Parareal iterate from `prev`.
    ///
    /// `iteration` is the number of the iterate being produced and is passed
    /// through to every integrator call. A single-point grid returns `prev`
    /// unchanged without calling any integrator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] before any integrator runs if `prev`
    /// does not have one state per grid point, or the first integrator error.
    pub fn correct<V>(&self, iteration: usize, prev: &[V], grid: &TimeGrid) -> Result<Vec<V>, Error>
    where
        V: Vector + Clone,
        C: Integrator<V>,
        F: Integrator<V>,
        C2F: Mapping<V>,
        F2C: Mapping<V>,
    {
        if prev.len() != grid.len() {
            return Err(Error::LengthMismatch {
                expected: grid.len(),
                actual: prev.len(),
            });
        }

        let mut next = Vec::with_capacity(prev.len());
        next.push(prev[0].clone());

        for (slice, t0, t1) in grid.spans() {
            let coarse_new = self
                .coarse_step(iteration, &next[slice - 1], t0, t1)
                .map_err(|err| Error::coarse(slice, err))?;
            let fine = self
                .fine
                .solve(iteration, &prev[slice - 1], t0, t1)
                .map_err(|err| Error::fine(slice, err))?;
            let coarse_prev = self
                .coarse_step(iteration, &prev[slice - 1], t0, t1)
                .map_err(|err| Error::coarse(slice, err))?;

            next.push(combine(&coarse_new, &fine, &coarse_prev));
        }

        Ok(next)
    }
}

/// Combines the three terms of a Parareal update.
pub(crate) fn combine<V: Vector>(coarse_new: &V, fine: &V, coarse_prev: &V) -> V {
    coarse_new.add(&fine.sub(coarse_prev))
}
