use std::{
    io,
    num::NonZeroUsize,
    panic::{self, AssertUnwindSafe},
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use super::{Executor, Job};

/// A fixed set of worker threads fed from a shared job queue.
///
/// Jobs are dispatched in submission order to whichever worker is free.
/// Dropping the pool lets workers finish every queued job, then joins them.
pub struct ThreadPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Spawns a pool with `threads` workers (at least one).
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread cannot be spawned.
    pub fn new(threads: usize) -> io::Result<Self> {
        let threads = threads.max(1);
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();

        let mut workers = Vec::with_capacity(threads);
        for index in 0..threads {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("pint-worker-{index}"))
                .spawn(move || worker_loop(index, &receiver))?;
            workers.push(handle);
        }
        debug!(threads, "spawned worker pool");

        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    /// Spawns one worker per available CPU.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread cannot be spawned.
    pub fn with_available_parallelism() -> io::Result<Self> {
        let threads = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self::new(threads)
    }

    /// Returns the number of worker threads.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.workers.len()
    }
}

fn worker_loop(index: usize, receiver: &Receiver<Job>) {
    for job in receiver {
        // A panicking job drops its promise, which resolves the job's future
        // as abandoned. The worker keeps serving.
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            warn!(worker = index, "job panicked");
        }
    }
    debug!(worker = index, "worker exiting");
}

impl Executor for ThreadPool {
    fn execute(&self, job: Job) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(job).is_err() {
            warn!("worker pool is shut down, job dropped");
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        drop(self.sender.take());

        let current = thread::current().id();
        for worker in self.workers.drain(..) {
            // The last handle to the pool can be released by one of its own
            // jobs; that worker exits on its own once the queue closes.
            if worker.thread().id() == current {
                continue;
            }
            if worker.join().is_err() {
                warn!("worker thread panicked during shutdown");
            }
        }
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("threads", &self.workers.len())
            .finish_non_exhaustive()
    }
}
