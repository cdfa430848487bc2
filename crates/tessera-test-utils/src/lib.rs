// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tessera integration tests.
//!
//! Provides instrumented discovery sources, fault-injecting cache stores and
//! on-disk manifest fixtures for deterministic tests.
//!
//! # Components
//!
//! - [`CountingDiscovery`] - Mutable definition table that counts scans
//! - [`FlakyStore`] - Cache store whose operations can be made to fail
//! - [`ManifestFixture`] - Temporary directory tree of `component.toml` files

pub mod counting;
pub mod fixture;
pub mod flaky_store;

pub use counting::CountingDiscovery;
pub use fixture::{AGGREGATOR_MANIFEST, ManifestFixture};
pub use flaky_store::FlakyStore;
