// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External key-value cache store trait.

use std::sync::Arc;

use crate::error::CacheError;

/// Key-value store holding serialized definition indexes.
///
/// Must provide read-your-writes consistency within a process. Concurrent
/// writers to the same key resolve as last writer wins.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;

    /// Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

impl<S: CacheStore + ?Sized> CacheStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key)
    }
}
