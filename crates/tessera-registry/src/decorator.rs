// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-through cache in front of a [`Discovery`].
//!
//! [`CachedDiscovery`] composes a discovery source with a [`CacheStore`].
//! Index requests are served from the store when an entry exists for
//! `(family, qualifier)`; otherwise the family is scanned and the result is
//! written back. Entries only go away through explicit invalidation or
//! eviction by the store itself. Rotating a family's generation deletes the
//! entries of the previous generation, tracked in a per-family qualifier list.
//!
//! Store failures during a lookup degrade to a miss. A scan failure is always
//! returned to the caller and never cached.

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tessera_core::{
    CacheError, CacheStore, ComponentDefinition, DefinitionIndex, Discovery, DiscoveryError,
    Family, Qualifier, TesseraError,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::key::{CacheKeys, is_valid_generation};

/// The value persisted under an entry key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub family: Family,
    pub qualifier: Qualifier,
    pub definitions: Vec<ComponentDefinition>,
}

impl CacheEntry {
    /// Decode a stored entry, checking it belongs to the requested slot.
    fn decode(
        bytes: &[u8],
        key: &str,
        family: &Family,
        qualifier: &Qualifier,
    ) -> Result<DefinitionIndex, CacheError> {
        let codec = |reason: String| CacheError::Codec {
            key: key.to_string(),
            reason,
        };

        let entry: CacheEntry = serde_json::from_slice(bytes).map_err(|e| codec(e.to_string()))?;
        if entry.key != key || &entry.family != family || &entry.qualifier != qualifier {
            return Err(codec(format!(
                "entry belongs to `{}` ({}/{})",
                entry.key, entry.family, entry.qualifier
            )));
        }
        if let Some(stray) = entry.definitions.iter().find(|d| &d.family != family) {
            return Err(codec(format!(
                "definition `{}` belongs to family `{}`",
                stray.id, stray.family
            )));
        }
        DefinitionIndex::from_definitions(entry.definitions).map_err(|e| codec(e.to_string()))
    }
}

/// Qualifiers that have an entry under one generation, persisted so a
/// rotation can delete the entries it makes unreachable.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TrackedQualifiers {
    generation: String,
    qualifiers: Vec<Qualifier>,
}

/// Discovery decorated with a read-through cache.
pub struct CachedDiscovery {
    discovery: Arc<dyn Discovery>,
    store: Arc<dyn CacheStore>,
    keys: CacheKeys,
    single_flight: bool,
    inflight: DashMap<String, Arc<Mutex<()>>>,
}

impl CachedDiscovery {
    /// Wrap `discovery` with `store`, using the default key namespace and
    /// per-key single-flight enabled.
    pub fn new(discovery: Arc<dyn Discovery>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            discovery,
            store,
            keys: CacheKeys::default(),
            single_flight: true,
            inflight: DashMap::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Result<Self, TesseraError> {
        self.keys = CacheKeys::new(namespace)?;
        Ok(self)
    }

    /// Serialize concurrent misses on the same key within this process.
    pub fn single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    pub fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    /// Return the definition index of `family` under `qualifier`, scanning
    /// only when no usable cache entry exists.
    pub fn get_index(
        &self,
        family: &Family,
        qualifier: &Qualifier,
    ) -> Result<DefinitionIndex, DiscoveryError> {
        let generation = match self.ensure_generation(family) {
            Ok(generation) => generation,
            Err(e) => {
                warn!(family = %family, error = %e, "cache unavailable, scanning without cache");
                return self.discovery.scan(family);
            }
        };
        let key = self.keys.entry(family, &generation, qualifier);

        if let Some(index) = self.lookup(&key, family, qualifier) {
            return Ok(index);
        }

        if !self.single_flight {
            return self.populate(&key, &generation, family, qualifier);
        }

        self.exclusive(&key, || match self.lookup(&key, family, qualifier) {
            Some(index) => Ok(index),
            None => self.populate(&key, &generation, family, qualifier),
        })
    }

    /// Remove the cached index of `family` under `qualifier`.
    ///
    /// Waits for an in-flight rebuild of the same entry, so an index scanned
    /// before this call cannot be written after it returns. That ordering
    /// only holds with single-flight enabled.
    pub fn invalidate(&self, family: &Family, qualifier: &Qualifier) -> Result<(), CacheError> {
        let Some(generation) = self.current_generation(family)? else {
            return Ok(());
        };
        let key = self.keys.entry(family, &generation, qualifier);
        self.exclusive(&key, || self.store.delete(&key))?;
        info!(
            family = %family,
            qualifier = %qualifier,
            key = %key,
            "definition cache invalidated"
        );
        Ok(())
    }

    /// Invalidate every qualifier of `family` by starting a new generation.
    ///
    /// Entries of the previous generation are deleted once the new token is
    /// stored. Failing to delete them is logged, not returned: they are
    /// already unreachable.
    pub fn invalidate_all(&self, family: &Family) -> Result<(), CacheError> {
        let generation_key = self.keys.generation(family);
        self.exclusive(&generation_key, || -> Result<(), CacheError> {
            let token = new_generation();
            self.store.set(&generation_key, token.clone().into_bytes())?;
            info!(family = %family, generation = %token, "definition cache generation rotated");

            if let Some(tracked) = self.tracked(family) {
                self.reclaim(family, &tracked);
                let list_key = self.keys.qualifiers(family);
                if let Err(e) = self.store.delete(&list_key) {
                    warn!(key = %list_key, error = %e, "failed to delete qualifier list");
                }
            }
            Ok(())
        })
    }

    /// Current entry key of `(family, qualifier)`, if the family has a generation.
    pub fn cache_key(
        &self,
        family: &Family,
        qualifier: &Qualifier,
    ) -> Result<Option<String>, CacheError> {
        Ok(self
            .current_generation(family)?
            .map(|generation| self.keys.entry(family, &generation, qualifier)))
    }

    /// Run `f` while holding the in-process lock for `key`.
    fn exclusive<R>(&self, key: &str, f: impl FnOnce() -> R) -> R {
        let slot = self.inflight.entry(key.to_string()).or_default().clone();
        let result = {
            let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        // The map holds one reference and this call holds another.
        self.inflight
            .remove_if(key, |_, slot| Arc::strong_count(slot) <= 2);
        result
    }

    /// Read the generation token of `family`, ignoring unusable values.
    fn current_generation(&self, family: &Family) -> Result<Option<String>, CacheError> {
        let key = self.keys.generation(family);
        match self.store.get(&key)?.map(String::from_utf8) {
            Some(Ok(token)) if is_valid_generation(&token) => Ok(Some(token)),
            Some(_) => {
                warn!(key = %key, "ignoring unusable generation token");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Like [`Self::current_generation`], but a missing or unusable token is
    /// replaced by a fresh one, so entries written under an evicted token are
    /// never served again.
    ///
    /// The token is created under the family's lock; concurrent first calls
    /// all see the same generation.
    fn ensure_generation(&self, family: &Family) -> Result<String, CacheError> {
        if let Some(token) = self.current_generation(family)? {
            return Ok(token);
        }
        let generation_key = self.keys.generation(family);
        self.exclusive(&generation_key, || -> Result<String, CacheError> {
            if let Some(token) = self.current_generation(family)? {
                return Ok(token);
            }
            let token = new_generation();
            self.store
                .set(&generation_key, token.clone().into_bytes())?;
            debug!(family = %family, generation = %token, "started definition cache generation");
            Ok(token)
        })
    }

    fn tracked(&self, family: &Family) -> Option<TrackedQualifiers> {
        let key = self.keys.qualifiers(family);
        let bytes = match self.store.get(&key) {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(key = %key, error = %e, "cannot read qualifier list");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(tracked) => Some(tracked),
            Err(e) => {
                warn!(key = %key, error = %e, "ignoring unusable qualifier list");
                None
            }
        }
    }

    /// Delete every entry listed in `tracked`.
    fn reclaim(&self, family: &Family, tracked: &TrackedQualifiers) {
        for qualifier in &tracked.qualifiers {
            let key = self.keys.entry(family, &tracked.generation, qualifier);
            if let Err(e) = self.store.delete(&key) {
                warn!(key = %key, error = %e, "failed to reclaim stale cache entry");
            }
        }
        debug!(
            family = %family,
            generation = %tracked.generation,
            count = tracked.qualifiers.len(),
            "reclaimed stale cache entries"
        );
    }

    /// Record that `key` holds the entry of `qualifier` under `generation`.
    /// An entry whose generation was rotated away while it was being built is
    /// deleted instead.
    fn track(&self, key: &str, generation: &str, family: &Family, qualifier: &Qualifier) {
        let generation_key = self.keys.generation(family);
        self.exclusive(&generation_key, || {
            match self.current_generation(family) {
                Ok(Some(current)) if current == generation => {}
                Ok(_) => {
                    debug!(key = %key, "generation rotated during rebuild, dropping entry");
                    if let Err(e) = self.store.delete(key) {
                        warn!(key = %key, error = %e, "failed to delete stale cache entry");
                    }
                    return;
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "cannot track cache entry");
                    return;
                }
            }

            let mut tracked = match self.tracked(family) {
                Some(tracked) if tracked.generation == generation => tracked,
                stale => {
                    // Left over from a generation that was lost without a rotation.
                    if let Some(stale) = stale {
                        self.reclaim(family, &stale);
                    }
                    TrackedQualifiers {
                        generation: generation.to_string(),
                        qualifiers: Vec::new(),
                    }
                }
            };
            if tracked.qualifiers.contains(qualifier) {
                return;
            }
            tracked.qualifiers.push(qualifier.clone());

            let list_key = self.keys.qualifiers(family);
            let stored = serde_json::to_vec(&tracked)
                .map_err(|e| e.to_string())
                .and_then(|bytes| self.store.set(&list_key, bytes).map_err(|e| e.to_string()));
            if let Err(e) = stored {
                warn!(key = %list_key, error = %e, "failed to update qualifier list");
            }
        })
    }

    fn lookup(
        &self,
        key: &str,
        family: &Family,
        qualifier: &Qualifier,
    ) -> Option<DefinitionIndex> {
        let bytes = match self.store.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key = %key, "definition cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        match CacheEntry::decode(&bytes, key, family, qualifier) {
            Ok(index) => {
                debug!(key = %key, count = index.len(), "definition cache hit");
                Some(index)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "discarding unusable cache entry");
                if let Err(e) = self.store.delete(key) {
                    warn!(key = %key, error = %e, "failed to delete unusable cache entry");
                }
                None
            }
        }
    }

    fn populate(
        &self,
        key: &str,
        generation: &str,
        family: &Family,
        qualifier: &Qualifier,
    ) -> Result<DefinitionIndex, DiscoveryError> {
        let index = self.discovery.scan(family)?;

        let entry = CacheEntry {
            key: key.to_string(),
            family: family.clone(),
            qualifier: qualifier.clone(),
            definitions: index.definitions().cloned().collect(),
        };
        match serde_json::to_vec(&entry) {
            Ok(bytes) => match self.store.set(key, bytes) {
                Ok(()) => self.track(key, generation, family, qualifier),
                Err(e) => warn!(key = %key, error = %e, "failed to store definition index"),
            },
            Err(e) => warn!(key = %key, error = %e, "failed to encode definition index"),
        }

        info!(
            family = %family,
            qualifier = %qualifier,
            count = index.len(),
            "definition index rebuilt"
        );
        Ok(index)
    }
}

impl std::fmt::Debug for CachedDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedDiscovery")
            .field("keys", &self.keys)
            .field("single_flight", &self.single_flight)
            .field("inflight", &self.inflight.len())
            .finish()
    }
}

fn new_generation() -> String {
    Uuid::new_v4().simple().to_string()
}
