use std::{cell::Cell, convert::Infallible};

use approx::assert_relative_eq;
use proptest::prelude::*;

use pint_core::{Integrator, TimeGrid};

use super::{Error, Parareal};
use crate::tabulate;

#[derive(Debug, thiserror::Error)]
#[error("fine solve diverged")]
struct Diverged;

/// Exact solution of `x' = -x` over a slice.
fn decay_exact(x: &f64, t0: f64, t1: f64) -> Result<f64, Infallible> {
    Ok(x * (t0 - t1).exp())
}

/// One forward Euler step of `x' = -x` over a slice.
fn decay_euler(x: &f64, t0: f64, t1: f64) -> Result<f64, Infallible> {
    Ok(x * (1.0 - (t1 - t0)))
}

/// Wraps an integrator and counts its calls.
struct Counted<I> {
    inner: I,
    calls: Cell<usize>,
}

impl<I> Counted<I> {
    fn new(inner: I) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
        }
    }
}

impl<V, I: Integrator<V>> Integrator<V> for Counted<I> {
    type Error = I::Error;

    fn solve(&self, iteration: usize, state: &V, t0: f64, t1: f64) -> Result<V, Self::Error> {
        self.calls.set(self.calls.get() + 1);
        self.inner.solve(iteration, state, t0, t1)
    }
}

fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

#[test]
fn single_point_grid_is_unchanged() {
    let parareal = Parareal::new(Counted::new(decay_euler), Counted::new(decay_exact));
    let grid = TimeGrid::new(vec![0.0]).unwrap();

    let next = parareal.correct(1, &[2.5_f64], &grid).unwrap();

    assert_eq!(next, vec![2.5]);
    assert_eq!(parareal.coarse().calls.get(), 0);
    assert_eq!(parareal.fine().calls.get(), 0);
}

#[test]
fn one_slice_reproduces_fine_solution() {
    let parareal = Parareal::new(decay_euler, decay_exact);
    let grid = TimeGrid::new(vec![0.0, 1.0]).unwrap();
    let prev: [f64; 2] = [3.0, -7.0];

    let next = parareal.correct(1, &prev, &grid).unwrap();

    assert_eq!(next[0], 3.0);
    assert_relative_eq!(next[1], 3.0 * (-1.0_f64).exp(), max_relative = 1e-15);
}

#[test]
fn calls_fine_once_and_coarse_twice_per_slice() {
    let parareal = Parareal::new(Counted::new(decay_euler), Counted::new(decay_exact));
    let grid = TimeGrid::linspace(0.0, 2.0, 6).unwrap();
    let prev = tabulate(&decay_euler, 0, 1.0, &grid).unwrap();

    parareal.correct(1, &prev, &grid).unwrap();

    assert_eq!(parareal.fine().calls.get(), 5);
    assert_eq!(parareal.coarse().calls.get(), 10);
}

#[test]
fn rejects_mismatched_trajectory_before_solving() {
    let parareal = Parareal::new(Counted::new(decay_euler), Counted::new(decay_exact));
    let grid = TimeGrid::linspace(0.0, 1.0, 4).unwrap();

    let err = parareal.correct(1, &[1.0_f64, 1.0], &grid).unwrap_err();

    assert!(matches!(
        err,
        Error::LengthMismatch {
            expected: 4,
            actual: 2
        }
    ));
    assert_eq!(parareal.coarse().calls.get(), 0);
    assert_eq!(parareal.fine().calls.get(), 0);
}

#[test]
fn reports_fine_failure_with_slice() {
    let fine = |x: &f64, t0: f64, _t1: f64| if t0 < 0.5 { Ok(*x) } else { Err(Diverged) };
    let parareal = Parareal::new(decay_euler, fine);
    let grid = TimeGrid::new(vec![0.0, 0.25, 0.5, 0.75]).unwrap();

    let err = parareal.correct(1, &[1.0_f64; 4], &grid).unwrap_err();

    assert!(matches!(err, Error::Fine { slice: 3, .. }));
}

#[test]
fn mappings_wrap_every_coarse_call() {
    // Fine states are two-point fields, coarse states a single mean value.
    let restrict = |x: &Vec<f64>| vec![(x[0] + x[1]) / 2.0];
    let prolong = |x: &Vec<f64>| vec![x[0], x[0]];
    let coarse_seen = Cell::new(0);
    let coarse = |x: &Vec<f64>, t0: f64, t1: f64| {
        coarse_seen.set(coarse_seen.get() + 1);
        assert_eq!(x.len(), 1, "coarse integrator must see restricted states");
        Ok::<_, Infallible>(vec![x[0] * (1.0 - (t1 - t0))])
    };
    let fine = |x: &Vec<f64>, t0: f64, t1: f64| {
        assert_eq!(x.len(), 2);
        Ok::<_, Infallible>(x.iter().map(|v| v * (t0 - t1).exp()).collect::<Vec<_>>())
    };

    let parareal = Parareal::new(coarse, fine).with_mappings(prolong, restrict);
    let grid = TimeGrid::new(vec![0.0, 0.5]).unwrap();
    let prev = vec![vec![1.0, 3.0], vec![0.0, 0.0]];

    let next = parareal.correct(1, &prev, &grid).unwrap();

    // Both coarse terms see the same predecessor here, so they cancel.
    assert_eq!(coarse_seen.get(), 2);
    assert_relative_eq!(next[1][0], (-0.5_f64).exp(), max_relative = 1e-12);
    assert_relative_eq!(next[1][1], 3.0 * (-0.5_f64).exp(), max_relative = 1e-12);
}

#[test]
fn fixed_point_of_fine_tabulation() {
    let parareal = Parareal::new(decay_euler, decay_exact);
    let grid = TimeGrid::linspace(0.0, 3.0, 13).unwrap();
    let fine = tabulate(&decay_exact, 0, 1.0, &grid).unwrap();

    let next = parareal.correct(1, &fine, &grid).unwrap();

    assert!(max_abs_diff(&next, &fine) < 1e-12);
}

#[test]
fn idempotent_once_converged() {
    let parareal = Parareal::new(decay_euler, decay_exact);
    let grid = TimeGrid::linspace(0.0, 4.0, 9).unwrap();

    let mut prev = tabulate(&decay_euler, 0, 1.0, &grid).unwrap();
    let mut converged = None;
    for iteration in 1..=grid.len() {
        let next = parareal.correct(iteration, &prev, &grid).unwrap();
        if max_abs_diff(&next, &prev) < 1e-4 {
            converged = Some(next);
            break;
        }
        prev = next;
    }
    let converged = converged.expect("parareal converges within one iteration per slice");

    let again = parareal.correct(grid.len(), &converged, &grid).unwrap();

    assert!(max_abs_diff(&again, &converged) < 1e-4);
}

#[test]
fn passes_iteration_through() {
    let seen = Cell::new(Vec::new());
    let record = pint_core::PerIteration(|n: usize, x: &f64, _t0: f64, _t1: f64| {
        let mut v = seen.take();
        v.push(n);
        seen.set(v);
        Ok::<_, Infallible>(*x)
    });
    let parareal = Parareal::new(decay_euler, record);
    let grid = TimeGrid::new(vec![0.0, 1.0, 2.0]).unwrap();

    parareal.correct(4, &[1.0_f64, 1.0, 1.0], &grid).unwrap();

    assert_eq!(seen.take(), vec![4, 4]);
}

fn arb_grid() -> impl Strategy<Value = TimeGrid> {
    prop::collection::vec(0.01f64..1.0, 0..12).prop_map(|steps| {
        let mut points = vec![0.0];
        for step in steps {
            let last = points[points.len() - 1];
            points.push(last + step);
        }
        TimeGrid::new(points).unwrap()
    })
}

proptest! {
    #[test]
    fn preserves_initial_condition(grid in arb_grid(), seed in -5.0f64..5.0) {
        let parareal = Parareal::new(decay_euler, decay_exact);
        let prev: Vec<f64> = (0..grid.len()).map(|i| seed + i as f64).collect();

        let next = parareal.correct(1, &prev, &grid).unwrap();

        prop_assert_eq!(next.len(), prev.len());
        prop_assert_eq!(next[0], prev[0]);
    }

    #[test]
    fn equal_propagators_reduce_to_fine_tabulation(
        grid in arb_grid(),
        y0 in -5.0f64..5.0,
        noise in prop::collection::vec(-10.0f64..10.0, 13),
    ) {
        let parareal = Parareal::new(decay_exact, decay_exact);
        let prev: Vec<f64> = (0..grid.len())
            .map(|i| if i == 0 { y0 } else { noise[i] })
            .collect();

        let next = parareal.correct(1, &prev, &grid).unwrap();
        let fine = tabulate(&decay_exact, 1, y0, &grid).unwrap();

        prop_assert_eq!(next, fine);
    }
}
