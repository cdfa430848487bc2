// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached discovery, component factory, and the registry facade.
//!
//! A [`ComponentRegistry`] is the entry point consumers use: it resolves a
//! component id through a [`CachedDiscovery`] (a [`tessera_core::Discovery`]
//! fronted by a [`tessera_core::CacheStore`]) and instantiates it through a
//! [`ComponentFactory`].

pub mod decorator;
pub mod factory;
pub mod key;
pub mod qualifier;
pub mod registry;

pub use decorator::{CacheEntry, CachedDiscovery};
pub use factory::{ComponentConstructor, ComponentFactory, validate_config};
pub use key::{CacheKeys, DEFAULT_NAMESPACE};
pub use qualifier::ActiveQualifier;
pub use registry::{ComponentRegistry, warm};
