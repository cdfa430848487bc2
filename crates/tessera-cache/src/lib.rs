// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache store backends for definition indexes.
//!
//! All backends implement [`tessera_core::CacheStore`]. The registry never
//! depends on a concrete backend; the binary picks one from configuration.

pub mod memory;
pub mod null;
pub mod sqlite;

pub use memory::MemoryStore;
pub use null::NullStore;
pub use sqlite::SqliteStore;
