use std::{
    convert::Infallible,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use approx::assert_relative_eq;
use pint_core::{GridError, Integrator, PerIteration, TimeGrid};

use super::*;
use crate::{
    executor::{Executor, Inline, TaskError, ThreadPool},
    tabulate,
};

#[derive(Debug, thiserror::Error)]
#[error("solver crashed")]
struct Crashed;

fn decay_exact(x: &f64, t0: f64, t1: f64) -> Result<f64, Infallible> {
    Ok(x * (t0 - t1).exp())
}

fn decay_euler(x: &f64, t0: f64, t1: f64) -> Result<f64, Infallible> {
    Ok(x * (1.0 - (t1 - t0)))
}

/// Wraps an integrator and counts its calls across threads.
struct Counted<I> {
    inner: I,
    calls: Arc<AtomicUsize>,
}

impl<I> Counted<I> {
    fn new(inner: I) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl<V, I: Integrator<V>> Integrator<V> for Counted<I> {
    type Error = I::Error;

    fn solve(&self, iteration: usize, state: &V, t0: f64, t1: f64) -> Result<V, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.solve(iteration, state, t0, t1)
    }
}

fn executors() -> Vec<Arc<dyn Executor>> {
    let inline: Arc<dyn Executor> = Arc::new(Inline);
    let pool: Arc<dyn Executor> = Arc::new(ThreadPool::new(4).unwrap());
    vec![inline, pool]
}

#[test]
fn iterates_match_sequential_corrections() {
    let grid = TimeGrid::linspace(0.0, 3.0, 7).unwrap();

    let parareal = Parareal::new(decay_euler, decay_exact);
    let mut expected = vec![tabulate(&decay_euler, 0, 1.0, &grid).unwrap()];
    for k in 1..=4 {
        let next = parareal.correct(k, &expected[k - 1], &grid).unwrap();
        expected.push(next);
    }

    for executor in executors() {
        let scheduler = Scheduler::new(executor, Parareal::new(decay_euler, decay_exact));
        let solution = scheduler.run(1.0, &grid, &Config::new(4), ()).unwrap();

        assert_eq!(solution.status, Status::Exhausted);
        assert_eq!(solution.iterations(), 4);
        assert_eq!(solution.history, expected);
    }
}

#[test]
fn iteration_zero_is_the_coarse_tabulation() {
    let grid = TimeGrid::linspace(0.0, 1.0, 5).unwrap();
    let scheduler = Scheduler::new(Arc::new(Inline), Parareal::new(decay_euler, decay_exact));

    let handle = scheduler.schedule(2.0, &grid, &Config::new(0)).unwrap();

    assert_eq!(handle.iterations(), 1);
    assert_eq!(
        handle.trajectory(0).unwrap(),
        tabulate(&decay_euler, 0, 2.0, &grid).unwrap()
    );
}

#[test]
fn trajectory_of_unscheduled_iteration_is_an_error() {
    let grid = TimeGrid::linspace(0.0, 1.0, 3).unwrap();
    let scheduler = Scheduler::new(Arc::new(Inline), Parareal::new(decay_euler, decay_exact));
    let handle = scheduler.schedule(1.0, &grid, &Config::new(1)).unwrap();

    assert!(handle.iteration(2).is_none());
    assert!(matches!(
        handle.trajectory(2),
        Err(Error::Unscheduled {
            iteration: 2,
            scheduled: 2,
        })
    ));
}

#[test]
fn calls_fine_once_per_slice_per_iteration() {
    let grid = TimeGrid::linspace(0.0, 2.0, 6).unwrap();

    for executor in executors() {
        let (coarse, coarse_calls) = Counted::new(decay_euler);
        let (fine, fine_calls) = Counted::new(decay_exact);
        let scheduler = Scheduler::new(executor, Parareal::new(coarse, fine));

        scheduler.run(1.0, &grid, &Config::new(3), ()).unwrap();

        assert_eq!(fine_calls.load(Ordering::SeqCst), 3 * 5);
        // One tabulation, then one corrected coarse solve per slice.
        assert_eq!(coarse_calls.load(Ordering::SeqCst), 4 * 5);
    }
}

#[test]
fn repeats_coarse_solves_without_reuse() {
    let grid = TimeGrid::linspace(0.0, 2.0, 6).unwrap();
    let (coarse, coarse_calls) = Counted::new(decay_euler);
    let scheduler = Scheduler::new(Arc::new(Inline), Parareal::new(coarse, decay_exact));
    let config = Config::new(3).with_coarse_reuse(false);

    let solution = scheduler.run(1.0, &grid, &config, ()).unwrap();

    assert_eq!(coarse_calls.load(Ordering::SeqCst), 5 + 3 * 2 * 5);

    let reused = Scheduler::new(Arc::new(Inline), Parareal::new(decay_euler, decay_exact))
        .run(1.0, &grid, &Config::new(3), ())
        .unwrap();
    assert_eq!(solution.history, reused.history);
}

#[test]
fn passes_iteration_to_integrators() {
    let grid = TimeGrid::linspace(0.0, 1.0, 3).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);
    let fine = PerIteration(move |k: usize, x: &f64, t0: f64, t1: f64| {
        record.lock().unwrap().push(k);
        decay_exact(x, t0, t1)
    });
    let scheduler = Scheduler::new(Arc::new(Inline), Parareal::new(decay_euler, fine));

    scheduler.run(1.0, &grid, &Config::new(2), ()).unwrap();

    let mut seen = seen.lock().unwrap().clone();
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 1, 2, 2]);
}

#[test]
fn observer_sees_iterations_in_order_and_can_stop() {
    let grid = TimeGrid::linspace(0.0, 2.0, 9).unwrap();

    for executor in executors() {
        let scheduler = Scheduler::new(executor, Parareal::new(decay_euler, decay_exact));
        let handle = scheduler.schedule(1.0, &grid, &Config::new(6)).unwrap();

        let mut seen = Vec::new();
        let solution = handle
            .wait(|event: &Event<f64>| {
                seen.push(event.iteration);
                (event.iteration == 2).then_some(Action::StopEarly)
            })
            .unwrap();

        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.history.len(), 3);
        assert!(handle.is_cancelled());
    }
}

#[test]
fn cancelling_stops_work_that_has_not_started() {
    let grid = TimeGrid::linspace(0.0, 1.0, 4).unwrap();
    let (release, gate) = crossbeam_channel::bounded::<()>(0);

    // Every coarse solve blocks until the gate closes, so with two workers at
    // most two coarse solves can be running when the run is cancelled.
    let blocking = move |x: &f64, t0: f64, t1: f64| {
        let _ = gate.recv();
        decay_euler(x, t0, t1)
    };
    let (coarse, coarse_calls) = Counted::new(blocking);
    let scheduler = Scheduler::new(
        Arc::new(ThreadPool::new(2).unwrap()),
        Parareal::new(coarse, decay_exact),
    );

    let handle = scheduler.schedule(1.0, &grid, &Config::new(3)).unwrap();
    handle.cancel();
    drop(release);

    let err = handle.wait(()).unwrap_err();

    assert!(matches!(
        err,
        Error::Task {
            iteration: 0,
            source: TaskError::Cancelled,
        }
    ));
    assert!(coarse_calls.load(Ordering::SeqCst) <= 2);
}

#[test]
fn failure_surfaces_root_cause_without_calling_observer() {
    let grid = TimeGrid::linspace(0.0, 1.0, 5).unwrap();

    for executor in executors() {
        let fine = PerIteration(|k: usize, x: &f64, t0: f64, t1: f64| {
            if k == 2 && t0 > 0.3 && t0 < 0.6 {
                Err(Crashed)
            } else {
                Ok(x * (t0 - t1).exp())
            }
        });
        let scheduler = Scheduler::new(executor, Parareal::new(decay_euler, fine));

        let mut observed = Vec::new();
        let err = scheduler
            .run(1.0, &grid, &Config::new(4), |event: &Event<f64>| {
                observed.push(event.iteration);
                None
            })
            .unwrap_err();

        assert_eq!(observed, vec![0, 1]);
        assert!(matches!(err, Error::Task { iteration: 2, .. }));

        let root = err.slice_error().expect("integrator failure is reported");
        assert_eq!(root.iteration, 2);
        assert_eq!(root.slice, 3);
        assert_eq!(root.propagator, Propagator::Fine);
        assert_eq!(root.source.to_string(), "solver crashed");
    }
}

#[test]
fn coarse_failure_in_tabulation_fails_iteration_zero() {
    let grid = TimeGrid::linspace(0.0, 1.0, 3).unwrap();
    let coarse = |_: &f64, _: f64, _: f64| Err::<f64, _>(Crashed);
    let scheduler = Scheduler::new(Arc::new(Inline), Parareal::new(coarse, decay_exact));

    let err = scheduler.run(1.0, &grid, &Config::new(2), ()).unwrap_err();

    assert!(matches!(err, Error::Task { iteration: 0, .. }));
    let root = err.slice_error().unwrap();
    assert_eq!((root.iteration, root.slice), (0, 1));
    assert_eq!(root.propagator, Propagator::Coarse);
    assert_eq!(
        root.to_string(),
        "coarse integrator failed on slice 1 of iteration 0: solver crashed"
    );
}

#[test]
fn early_failure_on_a_long_grid_is_reported() {
    let grid = TimeGrid::linspace(0.0, 1.0, 20_001).unwrap();
    let coarse = |x: &f64, t0: f64, t1: f64| {
        if t0 == 0.0 {
            Err(Crashed)
        } else {
            Ok(x * (1.0 - (t1 - t0)))
        }
    };
    let scheduler = Scheduler::new(
        Arc::new(ThreadPool::new(2).unwrap()),
        Parareal::new(coarse, decay_exact),
    );

    let err = scheduler.run(1.0, &grid, &Config::new(1), ()).unwrap_err();

    assert!(matches!(err, Error::Task { iteration: 0, .. }));
    let root = err.slice_error().unwrap();
    assert_eq!((root.iteration, root.slice), (0, 1));
    assert_eq!(root.propagator, Propagator::Coarse);
}

#[test]
fn single_point_grid_repeats_initial_state() {
    let (fine, fine_calls) = Counted::new(decay_exact);
    let scheduler = Scheduler::new(Arc::new(Inline), Parareal::new(decay_euler, fine));
    let grid = TimeGrid::new(vec![0.0]).unwrap();

    let solution = scheduler.run(3.0, &grid, &Config::new(2), ()).unwrap();

    assert_eq!(solution.history, vec![vec![3.0]; 3]);
    assert_eq!(fine_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn two_slice_grid_takes_the_fine_solution() {
    let scheduler = Scheduler::new(Arc::new(Inline), Parareal::new(decay_euler, decay_exact));
    let grid = TimeGrid::new(vec![0.0, 1.0]).unwrap();

    let solution = scheduler.run(1.0, &grid, &Config::new(1), ()).unwrap();

    assert_relative_eq!(
        solution.history[1][1],
        decay_exact(&1.0, 0.0, 1.0).unwrap(),
        max_relative = 1e-15
    );
}

#[test]
fn rejects_invalid_raw_grid() {
    let scheduler = Scheduler::new(Arc::new(Inline), Parareal::new(decay_euler, decay_exact));

    let err = scheduler
        .schedule_at(1.0, &[0.0, 1.0, 1.0], &Config::default())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Grid(GridError::NotIncreasing { index: 2 })
    ));
}
