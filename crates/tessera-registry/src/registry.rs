// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry facade for one component family.
//!
//! The registry holds no index of its own: every call reads the current
//! index through the cached discovery, using the active qualifier.

use std::sync::Arc;
use std::time::Duration;

use tessera_core::{
    ComponentConfig, ComponentDefinition, DefinitionIndex, Family, Qualifier, TesseraError,
};
use tracing::debug;

use crate::decorator::CachedDiscovery;
use crate::factory::ComponentFactory;
use crate::qualifier::ActiveQualifier;

/// Resolves component ids to definitions and instances for one family.
pub struct ComponentRegistry<T: ?Sized + 'static> {
    discovery: Arc<CachedDiscovery>,
    factory: ComponentFactory<T>,
    qualifier: ActiveQualifier,
}

impl<T: ?Sized + 'static> ComponentRegistry<T> {
    /// The registry serves the factory's family.
    pub fn new(discovery: Arc<CachedDiscovery>, factory: ComponentFactory<T>) -> Self {
        Self {
            discovery,
            factory,
            qualifier: ActiveQualifier::default(),
        }
    }

    /// Share an active qualifier with other registries.
    pub fn with_qualifier(mut self, qualifier: ActiveQualifier) -> Self {
        self.qualifier = qualifier;
        self
    }

    pub fn family(&self) -> &Family {
        self.factory.family()
    }

    pub fn qualifier(&self) -> Arc<Qualifier> {
        self.qualifier.get()
    }

    pub fn active_qualifier(&self) -> &ActiveQualifier {
        &self.qualifier
    }

    pub fn factory(&self) -> &ComponentFactory<T> {
        &self.factory
    }

    fn index(&self) -> Result<DefinitionIndex, TesseraError> {
        let qualifier = self.qualifier.get();
        Ok(self.discovery.get_index(self.family(), &qualifier)?)
    }

    /// Instantiate component `id` with `config`.
    ///
    /// Fails with [`TesseraError::UnknownComponent`] if `id` is not in the
    /// current index; nothing is constructed in that case.
    pub fn get(&self, id: &str, config: &ComponentConfig) -> Result<Box<T>, TesseraError> {
        let index = self.index()?;
        let definition = index
            .get(id)
            .ok_or_else(|| TesseraError::UnknownComponent {
                family: self.family().to_string(),
                id: id.to_string(),
            })?;
        debug!(family = %self.family(), id = %id, "resolved component definition");
        Ok(self.factory.create(definition, config)?)
    }

    pub fn get_definition(&self, id: &str) -> Result<Option<ComponentDefinition>, TesseraError> {
        Ok(self.index()?.get(id).cloned())
    }

    /// All definitions in discovery order.
    pub fn list_definitions(&self) -> Result<Vec<ComponentDefinition>, TesseraError> {
        Ok(self.index()?.into_definitions())
    }

    pub fn has(&self, id: &str) -> Result<bool, TesseraError> {
        Ok(self.index()?.contains(id))
    }

    /// Drop the cached index for the active qualifier.
    pub fn invalidate(&self) -> Result<(), TesseraError> {
        let qualifier = self.qualifier.get();
        Ok(self.discovery.invalidate(self.family(), &qualifier)?)
    }

    /// Drop the cached index for every qualifier.
    pub fn invalidate_all(&self) -> Result<(), TesseraError> {
        Ok(self.discovery.invalidate_all(self.family())?)
    }

    /// Build the index for the active qualifier off the async runtime.
    pub async fn warm(&self, deadline: Duration) -> Result<usize, TesseraError> {
        warm(
            self.discovery.clone(),
            self.family().clone(),
            (*self.qualifier.get()).clone(),
            deadline,
        )
        .await
    }
}

impl<T: ?Sized + 'static> std::fmt::Debug for ComponentRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("family", self.family())
            .field("qualifier", &self.qualifier.get())
            .field("factory", &self.factory)
            .finish()
    }
}

/// Populate the cache for `(family, qualifier)` on a blocking worker thread,
/// giving up after `deadline`. Returns the number of definitions.
///
/// On timeout the scan keeps running on its worker and still populates the
/// cache when it finishes.
pub async fn warm(
    discovery: Arc<CachedDiscovery>,
    family: Family,
    qualifier: Qualifier,
    deadline: Duration,
) -> Result<usize, TesseraError> {
    let task = tokio::task::spawn_blocking(move || {
        discovery
            .get_index(&family, &qualifier)
            .map(|index| index.len())
    });

    match tokio::time::timeout(deadline, task).await {
        Err(_) => Err(TesseraError::Timeout { duration: deadline }),
        Ok(Err(e)) => Err(TesseraError::Internal(format!(
            "index warm-up task failed: {e}"
        ))),
        Ok(Ok(result)) => Ok(result?),
    }
}
