//! A small futures substrate for running task graphs.
//!
//! Tasks are closures that produce a value or a [`TaskError`]. Submitting a
//! task returns a [`Future`] for its value. A task submitted with
//! [`submit_after`] declares the futures it reads; it is handed to the
//! [`Executor`] only once every input has resolved, and it fails without
//! running if any input failed. A failure therefore poisons every task
//! downstream of it, and no worker ever blocks waiting on an input.
//!
//! # Executors
//!
//! - [`ThreadPool`] — worker threads fed from a shared queue
//! - [`Inline`] — runs jobs on the submitting thread

mod future;
mod inline;
mod pool;

pub use future::{Future, Outcome, Promise, TaskError, promise, ready};
pub use inline::Inline;
pub use pool::ThreadPool;

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

/// A unit of work handed to an [`Executor`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs, possibly concurrently.
pub trait Executor: Send + Sync {
    /// Schedules `job` to run.
    ///
    /// The executor must eventually run or drop every job it accepts.
    fn execute(&self, job: Job);
}

/// Submits a task with no inputs.
pub fn submit<T, F>(executor: &Arc<dyn Executor>, task: F) -> Future<T>
where
    T: Send + Sync + 'static,
    F: FnOnce() -> Result<T, TaskError> + Send + 'static,
{
    submit_after::<(), T, _, 0>(executor, [], move |[]| task())
}

/// Submits a task that reads the values of `inputs`.
///
/// The task is dispatched once all inputs resolve and receives their values in
/// order. If any input fails, the returned future fails with that input's
/// error and the task never runs.
pub fn submit_after<D, T, F, const N: usize>(
    executor: &Arc<dyn Executor>,
    inputs: [Future<D>; N],
    task: F,
) -> Future<T>
where
    D: Send + Sync + 'static,
    T: Send + Sync + 'static,
    F: FnOnce([Arc<D>; N]) -> Result<T, TaskError> + Send + 'static,
{
    let (promise, future) = promise();

    if N == 0 {
        dispatch(executor, promise, move || match collect_inputs(Vec::new()) {
            Some(values) => task(values),
            None => Err(TaskError::Abandoned),
        });
        return future;
    }

    let join = Arc::new(Join::<D, T, F, N> {
        executor: Arc::clone(executor),
        remaining: AtomicUsize::new(N),
        values: Mutex::new(vec![None; N]),
        pending: Mutex::new(Some((promise, task))),
    });

    for (index, input) in inputs.iter().enumerate() {
        let join = Arc::clone(&join);
        input.on_ready(move |outcome| join.arrive(index, outcome));
    }

    future
}

/// Hands a task to the executor and resolves `promise` with its result.
fn dispatch<T, F>(executor: &Arc<dyn Executor>, promise: Promise<T>, task: F)
where
    T: Send + Sync + 'static,
    F: FnOnce() -> Result<T, TaskError> + Send + 'static,
{
    executor.execute(Box::new(move || promise.resolve(task())));
}

fn collect_inputs<D, const N: usize>(values: Vec<Option<Arc<D>>>) -> Option<[Arc<D>; N]> {
    let values: Vec<Arc<D>> = values.into_iter().collect::<Option<_>>()?;
    values.try_into().ok()
}

/// Gathers the inputs of a task submitted with [`submit_after`].
struct Join<D, T, F, const N: usize> {
    executor: Arc<dyn Executor>,
    remaining: AtomicUsize,
    values: Mutex<Vec<Option<Arc<D>>>>,
    pending: Mutex<Option<(Promise<T>, F)>>,
}

impl<D, T, F, const N: usize> Join<D, T, F, N>
where
    D: Send + Sync + 'static,
    T: Send + Sync + 'static,
    F: FnOnce([Arc<D>; N]) -> Result<T, TaskError> + Send + 'static,
{
    fn arrive(&self, index: usize, outcome: &Outcome<D>) {
        match outcome {
            Ok(value) => {
                self.values
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)[index] = Some(Arc::clone(value));

                if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                    let Some((promise, task)) = self.take_pending() else {
                        return;
                    };
                    let values = std::mem::take(
                        &mut *self.values.lock().unwrap_or_else(PoisonError::into_inner),
                    );
                    dispatch(&self.executor, promise, move || {
                        match collect_inputs::<D, N>(values) {
                            Some(values) => task(values),
                            None => Err(TaskError::Abandoned),
                        }
                    });
                }
            }
            Err(err) => {
                // Dependents are resolved from a job, never on this stack.
                if let Some((promise, _task)) = self.take_pending() {
                    let err = err.clone();
                    dispatch(&self.executor, promise, move || Err(err));
                }
            }
        }
    }

    fn take_pending(&self) -> Option<(Promise<T>, F)> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
