// lib/src/locks.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use models::HospitalId;

type Registry = Arc<StdMutex<HashMap<HospitalId, Arc<Mutex<()>>>>>;

/// Registry of per-hospital async mutexes. Holding a hospital's guard
/// serializes bed mutations of that hospital with its availability recount.
///
/// An entry lives only while some caller holds or waits for it, so ids that
/// never existed do not accumulate.
#[derive(Debug, Default)]
pub struct HospitalLocks {
    locks: Registry,
}

/// A registry entry pinned by one caller. Dropping it removes the entry once
/// nobody else references the mutex.
#[derive(Debug)]
struct Slot {
    registry: Registry,
    hospital_id: HospitalId,
    lock: Arc<Mutex<()>>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        let mut locks = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        // The map and this slot are the only owners left.
        if locks
            .get(&self.hospital_id)
            .is_some_and(|lock| Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2)
        {
            locks.remove(&self.hospital_id);
        }
    }
}

#[derive(Debug)]
struct Held {
    // Field order matters: the guard is released before the slot is pruned.
    _guard: OwnedMutexGuard<()>,
    _slot: Slot,
}

/// Guards held for the duration of one mutation.
#[derive(Debug)]
pub struct HospitalGuard {
    _held: Vec<Held>,
}

impl HospitalLocks {
    pub fn new() -> Self {
        HospitalLocks::default()
    }

    fn slot_for(&self, hospital_id: HospitalId) -> Slot {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = locks
            .entry(hospital_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Slot { registry: self.locks.clone(), hospital_id, lock }
    }

    async fn hold(&self, hospital_id: HospitalId) -> Held {
        let slot = self.slot_for(hospital_id);
        let guard = slot.lock.clone().lock_owned().await;
        Held { _guard: guard, _slot: slot }
    }

    pub async fn acquire(&self, hospital_id: HospitalId) -> HospitalGuard {
        HospitalGuard { _held: vec![self.hold(hospital_id).await] }
    }

    /// Locks several hospitals in ascending id order, so two callers locking
    /// overlapping sets cannot deadlock. Duplicates are locked once.
    pub async fn acquire_many(&self, hospital_ids: &[HospitalId]) -> HospitalGuard {
        let mut ids = hospital_ids.to_vec();
        ids.sort();
        ids.dedup();
        let mut held = Vec::with_capacity(ids.len());
        for id in ids {
            held.push(self.hold(id).await);
        }
        HospitalGuard { _held: held }
    }

    /// Number of hospitals currently locked or awaited.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Guards the specialty catalog against reference races. Operations that
/// make a bed or a specialty point at catalog entries share it; deleting or
/// renaming catalog entries takes it exclusively.
#[derive(Debug, Default)]
pub struct CatalogLock {
    inner: RwLock<()>,
}

impl CatalogLock {
    pub fn new() -> Self {
        CatalogLock::default()
    }

    pub async fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.inner.read().await
    }

    pub async fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.inner.write().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_hospital_is_serialized() {
        let locks = Arc::new(HospitalLocks::new());
        let guard = locks.acquire(HospitalId(1)).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire(HospitalId(1)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn different_hospitals_do_not_block() {
        let locks = HospitalLocks::new();
        let _a = locks.acquire(HospitalId(1)).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(HospitalId(2))).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn acquire_many_handles_duplicates() {
        let locks = HospitalLocks::new();
        let guard = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire_many(&[HospitalId(2), HospitalId(1), HospitalId(2)]),
        )
        .await
        .unwrap();
        assert_eq!(locks.len(), 2);
        drop(guard);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = HospitalLocks::new();
        for i in 1..=1000 {
            let _guard = locks.acquire(HospitalId(i)).await;
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn entry_survives_while_another_caller_waits() {
        let locks = Arc::new(HospitalLocks::new());
        let first = locks.acquire(HospitalId(7)).await;
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire(HospitalId(7)).await;
                tokio::time::sleep(Duration::from_millis(20)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(first);
        assert_eq!(locks.len(), 1);
        waiter.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn abandoned_wait_leaves_no_entry() {
        let locks = HospitalLocks::new();
        let held = locks.acquire(HospitalId(3)).await;
        let attempt = tokio::time::timeout(Duration::from_millis(10), locks.acquire(HospitalId(3))).await;
        assert!(attempt.is_err());
        drop(held);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn catalog_writer_waits_for_readers() {
        let catalog = Arc::new(CatalogLock::new());
        let reader = catalog.shared().await;
        let blocked = tokio::time::timeout(Duration::from_millis(20), catalog.exclusive()).await;
        assert!(blocked.is_err());
        drop(reader);
        let writer = tokio::time::timeout(Duration::from_millis(100), catalog.exclusive()).await;
        assert!(writer.is_ok());
    }
}
