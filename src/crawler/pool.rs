use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Fixed-size pool of permissions to run a fetch.
///
/// Leasing is non-blocking: the coordinator asks for a slot and, when none is
/// free, goes back to waiting for a worker to report in.
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    size: usize,
}

/// Permission to run one fetch. Goes back to the pool when dropped, whatever
/// path the holder takes out.
#[derive(Debug)]
pub struct WorkerSlot {
    _permit: OwnedSemaphorePermit,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn try_lease(&self) -> Option<WorkerSlot> {
        Arc::clone(&self.slots)
            .try_acquire_owned()
            .ok()
            .map(|permit| WorkerSlot { _permit: permit })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn free(&self) -> usize {
        self.slots.available_permits()
    }

    pub fn leased(&self) -> usize {
        self.size - self.free()
    }

    pub fn is_idle(&self) -> bool {
        self.free() == self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_leases_more_than_size() {
        let pool = WorkerPool::new(2);
        let first = pool.try_lease();
        let second = pool.try_lease();
        assert!(first.is_some() && second.is_some());
        assert!(pool.try_lease().is_none());
        assert_eq!(pool.leased(), 2);
        assert!(!pool.is_idle());
    }

    #[test]
    fn test_dropping_a_slot_releases_it() {
        let pool = WorkerPool::new(1);
        let slot = pool.try_lease();
        assert!(pool.try_lease().is_none());
        drop(slot);
        assert!(pool.is_idle());
        assert!(pool.try_lease().is_some());
    }

    #[tokio::test]
    async fn test_slot_released_when_task_panics() {
        let pool = WorkerPool::new(1);
        let slot = pool.try_lease();
        let handle = tokio::spawn(async move {
            let _slot = slot;
            panic!("fetch blew up");
        });
        assert!(handle.await.is_err());
        assert!(pool.is_idle());
        assert_eq!(pool.size(), 1);
    }
}
