// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery source that records how often it is scanned.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tessera_core::{Candidate, ComponentDefinition, Discovery, DiscoveryError, Family};

/// A definition table whose contents can change between scans.
///
/// Every call to [`Discovery::candidates`] increments the scan counter, even
/// when the scan is made to fail.
#[derive(Debug, Default)]
pub struct CountingDiscovery {
    definitions: Mutex<Vec<ComponentDefinition>>,
    scans: AtomicUsize,
    delay: Mutex<Option<Duration>>,
    failing: AtomicBool,
}

impl CountingDiscovery {
    pub fn new(definitions: Vec<ComponentDefinition>) -> Self {
        Self {
            definitions: Mutex::new(definitions),
            ..Self::default()
        }
    }

    /// Number of scans performed so far.
    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Add a definition visible to subsequent scans.
    pub fn add(&self, definition: ComponentDefinition) {
        self.lock_definitions().push(definition);
    }

    /// Remove every definition with `id`.
    pub fn remove(&self, id: &str) {
        self.lock_definitions().retain(|d| d.id != id);
    }

    /// Make every scan sleep for `delay` before answering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Make scans fail with a malformed-candidate error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn lock_definitions(&self) -> std::sync::MutexGuard<'_, Vec<ComponentDefinition>> {
        self.definitions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Discovery for CountingDiscovery {
    fn candidates(&self, family: &Family) -> Result<Vec<Candidate>, DiscoveryError> {
        self.scans.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(DiscoveryError::Malformed {
                candidate: "counting".to_string(),
                reason: "scan failure injected".to_string(),
            });
        }

        Ok(self
            .lock_definitions()
            .iter()
            .enumerate()
            .filter(|(_, d)| &d.family == family)
            .map(|(i, d)| Candidate::new(format!("counting[{i}]"), d.clone()))
            .collect())
    }
}
