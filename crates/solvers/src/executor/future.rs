use std::{
    error::Error as StdError,
    mem,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;

/// The resolved value of a [`Future`]: a shared value or the reason it failed.
pub type Outcome<T> = Result<Arc<T>, TaskError>;

/// Why a task did not produce a value.
///
/// A single failure can poison many dependent tasks, so the error is cheap to
/// clone and every dependent sees the same root cause.
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    #[error(transparent)]
    Failed(Arc<dyn StdError + Send + Sync>),

    #[error("task was cancelled before it started")]
    Cancelled,

    #[error("task was dropped before it produced a result")]
    Abandoned,
}

impl TaskError {
    /// Wraps an error raised by a task.
    pub fn failed<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Failed(Arc::new(err))
    }
}

type Callback<T> = Box<dyn FnOnce(&Outcome<T>) + Send>;

enum State<T> {
    Pending(Vec<Callback<T>>),
    Ready(Outcome<T>),
}

struct Shared<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores the outcome and runs pending callbacks. Only the first
    /// completion takes effect.
    fn complete(&self, outcome: Outcome<T>) {
        let callbacks = {
            let mut state = self.lock();
            if matches!(*state, State::Ready(_)) {
                return;
            }
            match mem::replace(&mut *state, State::Ready(outcome.clone())) {
                State::Pending(callbacks) => callbacks,
                State::Ready(_) => Vec::new(),
            }
        };
        self.ready.notify_all();

        // Callbacks run outside the lock; they may submit further tasks.
        for callback in callbacks {
            callback(&outcome);
        }
    }
}

/// A read handle to a value that a task will produce.
///
/// Futures are cheap to clone. Every clone observes the same outcome, and the
/// value is shared rather than copied.
pub struct Future<T> {
    shared: Arc<Shared<T>>,
}

/// The write side of a [`Future`].
///
/// Dropping a promise without resolving it resolves the future with
/// [`TaskError::Abandoned`], so waiting on a future never hangs because its
/// producer went away.
pub struct Promise<T> {
    shared: Option<Arc<Shared<T>>>,
}

/// Creates a connected promise and future.
#[must_use]
pub fn promise<T>() -> (Promise<T>, Future<T>) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State::Pending(Vec::new())),
        ready: Condvar::new(),
    });
    let future = Future {
        shared: Arc::clone(&shared),
    };
    (
        Promise {
            shared: Some(shared),
        },
        future,
    )
}

/// Creates a future that has already resolved to `value`.
#[must_use]
pub fn ready<T>(value: T) -> Future<T> {
    Future {
        shared: Arc::new(Shared {
            state: Mutex::new(State::Ready(Ok(Arc::new(value)))),
            ready: Condvar::new(),
        }),
    }
}

impl<T> Promise<T> {
    /// Resolves the connected future.
    pub fn resolve(mut self, result: Result<T, TaskError>) {
        self.complete(result.map(Arc::new));
    }

    fn complete(&mut self, outcome: Outcome<T>) {
        if let Some(shared) = self.shared.take() {
            shared.complete(outcome);
        }
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        self.complete(Err(TaskError::Abandoned));
    }
}

impl<T> Future<T> {
    /// Blocks until the future resolves and returns its outcome.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskError`] the producing task, or one of its
    /// dependencies, failed with.
    pub fn result(&self) -> Outcome<T> {
        let mut state = self.shared.lock();
        loop {
            match &*state {
                State::Ready(outcome) => return outcome.clone(),
                State::Pending(_) => {
                    state = self
                        .shared
                        .ready
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    /// Returns the outcome if the future has resolved, without blocking.
    #[must_use]
    pub fn try_result(&self) -> Option<Outcome<T>> {
        match &*self.shared.lock() {
            State::Ready(outcome) => Some(outcome.clone()),
            State::Pending(_) => None,
        }
    }

    /// Returns whether the future has resolved.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*self.shared.lock(), State::Ready(_))
    }

    /// Registers a callback to run with the outcome.
    ///
    /// The callback runs on the thread that resolves the future, or
    /// immediately on the calling thread if the future has already resolved.
    pub fn on_ready(&self, callback: impl FnOnce(&Outcome<T>) + Send + 'static) {
        let mut state = self.shared.lock();
        let outcome = match &mut *state {
            State::Pending(callbacks) => {
                callbacks.push(Box::new(callback));
                return;
            }
            State::Ready(outcome) => outcome.clone(),
        };
        drop(state);
        callback(&outcome);
    }
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> std::fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Future")
            .field("ready", &self.is_ready())
            .finish()
    }
}
