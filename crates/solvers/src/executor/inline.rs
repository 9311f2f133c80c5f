use std::{cell::RefCell, collections::VecDeque};

use super::{Executor, Job};

thread_local! {
    static QUEUE: RefCell<Option<VecDeque<Job>>> = const { RefCell::new(None) };
}

/// Runs every job on the thread that submits it.
///
/// Jobs submitted while another job is running on the same thread are queued
/// and run in submission order once it returns, so long dependency chains do
/// not grow the stack. Useful for deterministic tests and for running the
/// scheduler without worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl Executor for Inline {
    fn execute(&self, job: Job) {
        let first = QUEUE.with(|queue| {
            let mut queue = queue.borrow_mut();
            match queue.as_mut() {
                Some(pending) => {
                    pending.push_back(job);
                    None
                }
                None => {
                    *queue = Some(VecDeque::new());
                    Some(job)
                }
            }
        });
        let Some(first) = first else {
            return;
        };

        let _drain = DrainGuard;
        let mut job = first;
        loop {
            job();
            let next = QUEUE.with(|queue| queue.borrow_mut().as_mut().and_then(VecDeque::pop_front));
            match next {
                Some(next) => job = next,
                None => break,
            }
        }
    }
}

/// Clears the queue when the outermost `execute` returns or unwinds.
struct DrainGuard;

impl Drop for DrainGuard {
    fn drop(&mut self) {
        // Dropping leftover jobs can resolve futures and submit more work,
        // so release the borrow first.
        let leftover = QUEUE.with(|queue| queue.borrow_mut().take());
        drop(leftover);
    }
}
