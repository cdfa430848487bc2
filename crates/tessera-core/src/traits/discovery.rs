// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Definition discovery trait.

use std::sync::Arc;

use crate::error::DiscoveryError;
use crate::types::{Candidate, DefinitionIndex, Family};

/// Source of component definitions for a family.
///
/// Implementations read their configured locations and nothing else; given
/// the same inputs a scan yields the same result.
pub trait Discovery: Send + Sync {
    /// Every candidate of `family`, in discovery order, with its origin.
    fn candidates(&self, family: &Family) -> Result<Vec<Candidate>, DiscoveryError>;

    /// Build the definition index for `family`, failing on duplicate ids.
    fn scan(&self, family: &Family) -> Result<DefinitionIndex, DiscoveryError> {
        DefinitionIndex::build(self.candidates(family)?)
    }
}

impl<D: Discovery + ?Sized> Discovery for Arc<D> {
    fn candidates(&self, family: &Family) -> Result<Vec<Candidate>, DiscoveryError> {
        (**self).candidates(family)
    }

    fn scan(&self, family: &Family) -> Result<DefinitionIndex, DiscoveryError> {
        (**self).scan(family)
    }
}

impl<D: Discovery + ?Sized> Discovery for Box<D> {
    fn candidates(&self, family: &Family) -> Result<Vec<Candidate>, DiscoveryError> {
        (**self).candidates(family)
    }

    fn scan(&self, family: &Family) -> Result<DefinitionIndex, DiscoveryError> {
        (**self).scan(family)
    }
}
