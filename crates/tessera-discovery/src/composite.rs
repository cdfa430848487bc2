// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery over several sources at once.

use tessera_core::{Candidate, Discovery, DiscoveryError, Family};

/// Concatenates the candidates of several discoveries, in the order they were
/// added. Duplicate ids across sources fail the scan.
#[derive(Default)]
pub struct CompositeDiscovery {
    sources: Vec<Box<dyn Discovery>>,
}

impl CompositeDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl Discovery + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn push(&mut self, source: Box<dyn Discovery>) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl std::fmt::Debug for CompositeDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeDiscovery")
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl Discovery for CompositeDiscovery {
    fn candidates(&self, family: &Family) -> Result<Vec<Candidate>, DiscoveryError> {
        let mut all = Vec::new();
        for source in &self.sources {
            all.extend(source.candidates(family)?);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticDiscovery;
    use tessera_core::ComponentDefinition;

    #[test]
    fn sources_are_concatenated_in_order() {
        let fetcher = Family::new("fetcher").unwrap();
        let core = StaticDiscovery::new("core")
            .with(ComponentDefinition::new("b", "h", fetcher.clone()));
        let contrib = StaticDiscovery::new("contrib")
            .with(ComponentDefinition::new("a", "h", fetcher.clone()));
        let composite = CompositeDiscovery::new().with(core).with(contrib);

        assert_eq!(composite.len(), 2);
        let index = composite.scan(&fetcher).unwrap();
        assert_eq!(index.ids().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn duplicates_across_sources_fail() {
        let fetcher = Family::new("fetcher").unwrap();
        let core = StaticDiscovery::new("core")
            .with(ComponentDefinition::new("a", "h", fetcher.clone()));
        let contrib = StaticDiscovery::new("contrib")
            .with(ComponentDefinition::new("a", "h", fetcher.clone()));
        let composite = CompositeDiscovery::new().with(core).with(contrib);

        let err = composite.scan(&fetcher).unwrap_err();
        match err {
            DiscoveryError::DuplicateId { first, second, .. } => {
                assert_eq!(first, "core[0]");
                assert_eq!(second, "contrib[0]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
