// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicit registration table.
//!
//! Components compiled into the program are registered here instead of being
//! found on disk. Duplicate ids are not rejected at registration time; they
//! fail the scan, like any other discovery source.

use tessera_core::{Candidate, ComponentDefinition, Discovery, DiscoveryError, Family};

/// A fixed, in-memory list of component definitions.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    name: String,
    definitions: Vec<ComponentDefinition>,
}

impl StaticDiscovery {
    /// Create an empty table. `name` identifies it in error messages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definitions: Vec::new(),
        }
    }

    pub fn register(&mut self, definition: ComponentDefinition) -> &mut Self {
        self.definitions.push(definition);
        self
    }

    pub fn with(mut self, definition: ComponentDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Discovery for StaticDiscovery {
    fn candidates(&self, family: &Family) -> Result<Vec<Candidate>, DiscoveryError> {
        Ok(self
            .definitions
            .iter()
            .enumerate()
            .filter(|(_, d)| &d.family == family)
            .map(|(i, d)| Candidate::new(format!("{}[{i}]", self.name), d.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_returns_registered_family_members() {
        let fetcher = Family::new("fetcher").unwrap();
        let processor = Family::new("processor").unwrap();
        let mut table = StaticDiscovery::new("builtin");
        table
            .register(ComponentDefinition::new("a", "h.a", fetcher.clone()))
            .register(ComponentDefinition::new("b", "h.b", processor.clone()))
            .register(ComponentDefinition::new("c", "h.c", fetcher.clone()));

        assert_eq!(table.len(), 3);
        let index = table.scan(&fetcher).unwrap();
        assert_eq!(index.ids().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(table.scan(&processor).unwrap().len(), 1);
    }

    #[test]
    fn duplicate_registration_fails_scan() {
        let fetcher = Family::new("fetcher").unwrap();
        let table = StaticDiscovery::new("builtin")
            .with(ComponentDefinition::new("a", "h1", fetcher.clone()))
            .with(ComponentDefinition::new("a", "h2", fetcher.clone()));

        let err = table.scan(&fetcher).unwrap_err();
        match err {
            DiscoveryError::DuplicateId { first, second, .. } => {
                assert_eq!(first, "builtin[0]");
                assert_eq!(second, "builtin[1]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_table_yields_empty_index() {
        let table = StaticDiscovery::new("empty");
        assert!(table.is_empty());
        assert!(table.scan(&Family::new("fetcher").unwrap()).unwrap().is_empty());
    }
}
