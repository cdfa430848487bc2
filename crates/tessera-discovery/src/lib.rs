// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Definition discovery sources.
//!
//! - [`ManifestDiscovery`] scans directories for `component.toml` manifests.
//! - [`StaticDiscovery`] is an explicit registration table for built-in components.
//! - [`CompositeDiscovery`] chains several sources with cross-source duplicate detection.

pub mod composite;
pub mod manifest;
pub mod scan;
pub mod table;

pub use composite::CompositeDiscovery;
pub use manifest::{BASE_ID_KEY, DERIVATIVE_ID_KEY, parse_manifest};
pub use scan::{DEFAULT_MANIFEST_FILE, ManifestDiscovery};
pub use table::StaticDiscovery;
