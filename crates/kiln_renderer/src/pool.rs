//! Fixed-size worker pool for tile jobs.
//!
//! Wraps a dedicated `rayon` thread pool. Jobs are submitted through a
//! [`TileQueue`] that lives for the duration of one FIFO scope; leaving the
//! scope waits until every submitted job has finished.

use std::cell::Cell;
use std::num::NonZeroUsize;

use rayon::{ScopeFifo, ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;

/// Errors from the worker pool.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Failed to start worker threads: {0}")]
    Build(#[from] ThreadPoolBuildError),

    #[error("Job submitted after the tile queue was shut down")]
    ShutDown,
}

/// A fixed set of worker threads.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Start `threads` workers; 0 means one per available core.
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        let threads = if threads == 0 {
            std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
        } else {
            threads
        };

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("kiln-worker-{i}"))
            .build()?;

        log::debug!("Started worker pool with {} threads", threads);
        Ok(Self { pool })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` with a queue for submitting jobs, then wait for all of them.
    ///
    /// Jobs start in submission order. Jobs may borrow anything that outlives
    /// this call.
    pub fn run<'scope, OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce(&TileQueue<'_, 'scope>) -> R + Send,
        R: Send,
    {
        self.pool.scope_fifo(|scope| {
            let queue = TileQueue {
                scope,
                open: Cell::new(true),
                submitted: Cell::new(0),
            };
            op(&queue)
        })
    }
}

/// Handle for submitting jobs to a running [`WorkerPool::run`] scope.
pub struct TileQueue<'a, 'scope> {
    scope: &'a ScopeFifo<'scope>,
    open: Cell<bool>,
    submitted: Cell<usize>,
}

impl<'scope> TileQueue<'_, 'scope> {
    /// Queue a job, failing once the queue has been shut down.
    pub fn submit<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'scope,
    {
        if !self.open.get() {
            return Err(PoolError::ShutDown);
        }
        self.scope.spawn_fifo(move |_| job());
        self.submitted.set(self.submitted.get() + 1);
        Ok(())
    }

    /// Refuse further jobs. Jobs already queued still run to completion.
    pub fn shutdown(&self) {
        self.open.set(false);
    }

    pub fn is_shut_down(&self) -> bool {
        !self.open.get()
    }

    /// Number of jobs accepted so far.
    pub fn submitted(&self) -> usize {
        self.submitted.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_runs_every_job() {
        let pool = WorkerPool::new(4).unwrap();
        assert_eq!(pool.threads(), 4);

        let counter = AtomicUsize::new(0);
        let submitted = pool.run(|queue| {
            for _ in 0..100 {
                queue
                    .submit(|| {
                        counter.fetch_add(1, Ordering::Relaxed);
                    })
                    .unwrap();
            }
            queue.submitted()
        });

        assert_eq!(submitted, 100);
        assert_eq!(counter.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn test_submit_after_shutdown_fails() {
        let pool = WorkerPool::new(2).unwrap();
        let counter = AtomicUsize::new(0);

        let result = pool.run(|queue| {
            queue
                .submit(|| {
                    counter.fetch_add(1, Ordering::Relaxed);
                })
                .unwrap();
            queue.shutdown();
            assert!(queue.is_shut_down());
            queue.submit(|| {
                counter.fetch_add(1, Ordering::Relaxed);
            })
        });

        assert!(matches!(result, Err(PoolError::ShutDown)));
        // The job accepted before shutdown still ran
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_jobs_write_disjoint_slices() {
        let pool = WorkerPool::new(3).unwrap();
        let mut data = vec![0usize; 64];

        pool.run(|queue| {
            for (i, chunk) in data.chunks_mut(8).enumerate() {
                queue.submit(move || chunk.fill(i)).unwrap();
            }
        });

        for (i, value) in data.iter().enumerate() {
            assert_eq!(*value, i / 8);
        }
    }

    #[test]
    fn test_single_thread_keeps_fifo_order() {
        let pool = WorkerPool::new(1).unwrap();
        let order = Mutex::new(Vec::new());

        pool.run(|queue| {
            for i in 0..10 {
                let order = &order;
                queue.submit(move || order.lock().unwrap().push(i)).unwrap();
            }
        });

        assert_eq!(order.into_inner().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_threads_uses_available_cores() {
        let pool = WorkerPool::new(0).unwrap();
        assert!(pool.threads() >= 1);
    }
}
