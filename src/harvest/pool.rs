//! Bounded task pool
//!
//! Runs a list of asynchronous tasks with at most `ceiling` of them in flight.
//! A fixed set of `min(ceiling, tasks)` logical workers pull from a shared
//! queue; a worker that finishes a task immediately takes the next one.
//!
//! All workers are polled together on the caller's task, so "concurrent" means
//! overlapping waits rather than parallel execution.
//!
//! # Ordering
//!
//! Results come back in submission order. Side effects performed inside tasks
//! happen in completion order.
//!
//! # Failures
//!
//! Once any task fails, workers stop taking new tasks from the queue. Tasks
//! already in flight are not cancelled; they run to completion and their side
//! effects stand. The pool then returns the first failure it observed.

use futures::future::join_all;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Scheduler with a fixed concurrency ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPool {
    ceiling: usize,
}

/// A settled task: submission index, completion sequence, outcome
type Settled<T, E> = (usize, usize, Result<T, E>);

impl TaskPool {
    /// Creates a pool; a ceiling of zero is treated as one
    pub fn new(ceiling: usize) -> Self {
        Self {
            ceiling: ceiling.max(1),
        }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Runs every task and collects their results
    ///
    /// # Arguments
    ///
    /// * `tasks` - Zero-argument closures producing the futures to run
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<T>)` - Every task succeeded; results in submission order
    /// * `Err(E)` - The first failure observed, after in-flight tasks settled
    ///
    /// # Example
    ///
    /// ```
    /// use pagebench::harvest::TaskPool;
    ///
    /// # let runtime = tokio::runtime::Runtime::new().unwrap();
    /// # runtime.block_on(async {
    /// let tasks: Vec<_> = (1..=4)
    ///     .map(|n| move || async move { Ok::<_, String>(n * 10) })
    ///     .collect();
    /// let results = TaskPool::new(2).run(tasks).await.unwrap();
    /// assert_eq!(results, vec![10, 20, 30, 40]);
    /// # });
    /// ```
    pub async fn run<T, E, F, Fut>(&self, tasks: Vec<F>) -> Result<Vec<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let total = tasks.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let queue = Mutex::new(tasks.into_iter().enumerate().collect::<VecDeque<_>>());
        let failed = AtomicBool::new(false);
        let completions = AtomicUsize::new(0);
        let workers = self.ceiling.min(total);

        tracing::trace!("Running {} tasks on {} workers", total, workers);

        let lanes = (0..workers).map(|_| {
            let queue = &queue;
            let failed = &failed;
            let completions = &completions;
            async move {
                let mut settled: Vec<Settled<T, E>> = Vec::new();
                loop {
                    if failed.load(Ordering::Acquire) {
                        break;
                    }
                    let next = queue
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .pop_front();
                    let Some((index, task)) = next else {
                        break;
                    };

                    let outcome = task().await;
                    if outcome.is_err() {
                        failed.store(true, Ordering::Release);
                    }
                    let sequence = completions.fetch_add(1, Ordering::AcqRel);
                    settled.push((index, sequence, outcome));
                }
                settled
            }
        });

        let mut settled: Vec<Settled<T, E>> = join_all(lanes).await.into_iter().flatten().collect();

        if settled.len() < total {
            tracing::debug!(
                "{} queued tasks not started after a failure",
                total - settled.len()
            );
        }

        // Completion order first, so collecting stops at the earliest failure.
        settled.sort_by_key(|(_, sequence, _)| *sequence);
        let mut results = settled
            .into_iter()
            .map(|(index, _, outcome)| outcome.map(|value| (index, value)))
            .collect::<Result<Vec<_>, E>>()?;

        results.sort_by_key(|(index, _)| *index);
        Ok(results.into_iter().map(|(_, value)| value).collect())
    }
}
