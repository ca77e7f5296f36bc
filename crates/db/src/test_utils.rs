//! Test utilities for storage-dependent code.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use comicshelf_common::{AppError, AppResult, KvStore, MemoryKv, SharedKv};

/// Fresh in-memory store.
#[must_use]
pub fn memory_store() -> SharedKv {
    MemoryKv::shared()
}

/// Store whose reads and writes can be made to fail, e.g. to simulate a
/// full quota.
#[derive(Debug)]
pub struct FailingKv {
    inner: MemoryKv,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FailingKv {
    /// Store that fails every operation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: MemoryKv::new(),
            fail_reads: AtomicBool::new(true),
            fail_writes: AtomicBool::new(true),
        }
    }

    /// Store that reads normally and fails every write.
    #[must_use]
    pub fn write_failing() -> Self {
        let store = Self::new();
        store.set_fail_reads(false);
        store
    }

    /// Toggle read failures.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Toggle write failures.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Wrap in a shared handle.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for FailingKv {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl KvStore for FailingKv {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("read of {key} refused")));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("quota exceeded writing {key}")));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("quota exceeded removing {key}")));
        }
        self.inner.remove(key).await
    }
}
