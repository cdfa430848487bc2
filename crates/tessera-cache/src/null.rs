// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A store that never retains anything. Every lookup is a miss, so every
//! index request rescans.

use tessera_core::{CacheError, CacheStore};

#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl CacheStore for NullStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: Vec<u8>) -> Result<(), CacheError> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
