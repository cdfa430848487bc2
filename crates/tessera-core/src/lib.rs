// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tessera component registry.
//!
//! Defines the definition model, the error enums for each registry layer,
//! and the [`Discovery`] and [`CacheStore`] traits that discovery sources
//! and cache backends implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    BoxError, CacheError, ConfigProblem, ConstructionError, DiscoveryError, TesseraError,
};
pub use traits::{CacheStore, Discovery};
pub use types::{
    Candidate, ComponentConfig, ComponentDefinition, ConfigKeySpec, ConfigSchema,
    DefinitionIndex, Family, Metadata, Qualifier, ValueKind,
};
