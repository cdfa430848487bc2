// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits between the registry and its collaborators.

pub mod cache;
pub mod discovery;

pub use cache::CacheStore;
pub use discovery::Discovery;
