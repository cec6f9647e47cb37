//! Bounded worker pool
//!
//! Units of work run as tokio tasks, but at most `max_workers` of them hold
//! a semaphore permit and make progress at any time. Results are consumed in
//! completion order.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};

/// A pool that runs submitted futures with bounded parallelism
pub struct WorkerPool<T> {
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<T>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Creates a pool allowing `max_workers` concurrent units (at least one)
    pub fn new(max_workers: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_workers.max(1))),
            tasks: JoinSet::new(),
        }
    }

    /// Submits a unit of work; it starts once a worker slot frees up
    ///
    /// Returns the task id that [`join_next_with_id`](Self::join_next_with_id)
    /// and [`JoinError::id`] report for this unit.
    pub fn submit<F>(&mut self, unit: F) -> Id
    where
        F: Future<Output = T> + Send + 'static,
    {
        let semaphore = Arc::clone(&self.semaphore);
        self.tasks.spawn(async move {
            // The semaphore is never closed, so a permit is always granted
            let _permit = semaphore.acquire_owned().await.ok();
            unit.await
        })
        .id()
    }

    /// Waits for the next unit to finish, in completion order
    ///
    /// Returns `None` once every submitted unit has been consumed. A unit
    /// that panicked yields `Some(Err(JoinError))`; the remaining units keep
    /// running.
    pub async fn join_next(&mut self) -> Option<Result<T, JoinError>> {
        self.tasks.join_next().await
    }

    /// Like [`join_next`](Self::join_next), also returning the unit's task id
    pub async fn join_next_with_id(&mut self) -> Option<Result<(Id, T), JoinError>> {
        self.tasks.join_next_with_id().await
    }

    /// Number of submitted units not yet consumed
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
