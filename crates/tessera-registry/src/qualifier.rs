// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The caller's active qualifier.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tessera_core::Qualifier;

/// Shared, switchable qualifier (e.g. the interface locale).
///
/// Clones observe the same value, so one handle can be passed to every
/// registry and switched in one place.
#[derive(Debug, Clone)]
pub struct ActiveQualifier {
    current: Arc<ArcSwap<Qualifier>>,
}

impl ActiveQualifier {
    pub fn new(qualifier: impl Into<Qualifier>) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(qualifier.into())),
        }
    }

    pub fn get(&self) -> Arc<Qualifier> {
        self.current.load_full()
    }

    pub fn set(&self, qualifier: impl Into<Qualifier>) {
        self.current.store(Arc::new(qualifier.into()));
    }
}

impl Default for ActiveQualifier {
    fn default() -> Self {
        Self::new(Qualifier::default())
    }
}
