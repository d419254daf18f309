//! Bounded-concurrency execution of page tasks.

use std::future::Future;

use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tracing::trace;

use super::page::PageTask;

/// Runs page tasks with at most `concurrency` of them in flight.
///
/// All tasks are polled on the current task and interleave at their await
/// points. Results come back in submission order regardless of which task
/// finished first.
#[derive(Debug)]
pub struct PageScheduler {
    gate: Semaphore,
    concurrency: usize,
}

impl PageScheduler {
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            gate: Semaphore::new(concurrency),
            concurrency,
        }
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run every task to completion and return their results in task order.
    ///
    /// A task holds its permit for its whole run, including retry waits.
    pub async fn run<T, F, Fut>(&self, tasks: Vec<PageTask>, fetch: F) -> Vec<T>
    where
        F: Fn(PageTask) -> Fut,
        Fut: Future<Output = T>,
    {
        let gate = &self.gate;
        let fetch = &fetch;

        let pending = tasks.into_iter().map(move |task| async move {
            let _permit = gate
                .acquire()
                .await
                .expect("Semaphore closed unexpectedly");
            trace!(page = task.page, "Page task admitted");
            fetch(task).await
        });

        join_all(pending).await
    }
}
