// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache store with injectable failures.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tessera_cache::MemoryStore;
use tessera_core::{CacheError, CacheStore};

/// Wraps a [`MemoryStore`]; while failing, every operation returns a backend
/// error without touching the inner store.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of operations rejected so far.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.failing.load(Ordering::SeqCst) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(CacheError::backend("cache backend unavailable"));
        }
        Ok(())
    }
}

impl CacheStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.check()?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.inner.delete(key)
    }
}
