//! Concurrency bound for download work.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds how many download tasks are in their network/disk phase at once.
///
/// Tasks hold a permit while probing repositories, downloading and
/// installing, and release it *before* joining their children. A task
/// waiting on children therefore never occupies a worker slot, so any
/// pool size ≥ 1 makes progress on arbitrarily deep transitive chains.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with the given number of workers, clamped to ≥ 1.
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// The configured worker count.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Wait for a worker slot.
    pub(crate) async fn acquire(&self) -> OwnedSemaphorePermit {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .expect("worker pool semaphore closed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count_is_clamped() {
        assert_eq!(WorkerPool::new(0).workers(), 1);
        assert_eq!(WorkerPool::new(4).workers(), 4);
    }

    #[tokio::test]
    async fn test_permits_are_limited() {
        let pool = WorkerPool::new(1);

        let held = pool.acquire().await;
        assert!(pool.permits.try_acquire().is_err());

        drop(held);
        assert!(pool.permits.try_acquire().is_ok());
    }
}
