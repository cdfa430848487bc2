// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model for the Tessera registry.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup with a suggestion instead of being silently ignored.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Tessera configuration.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TesseraConfig {
    /// Registry-wide settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Where component manifests are discovered.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Definition cache backend.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging.
    #[serde(default)]
    pub log: LogConfig,
}

/// Registry-wide settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Prefix of every cache key written by this registry.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Qualifier used when none is given explicitly.
    #[serde(default = "default_qualifier")]
    pub default_qualifier: String,

    /// Serialize concurrent cache misses on the same key.
    #[serde(default = "default_true")]
    pub single_flight: bool,

    /// Families checked and warmed by the CLI.
    #[serde(default)]
    pub families: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            default_qualifier: default_qualifier(),
            single_flight: true,
            families: Vec::new(),
        }
    }
}

fn default_namespace() -> String {
    "tessera".to_string()
}

fn default_qualifier() -> String {
    "und".to_string()
}

fn default_true() -> bool {
    true
}

/// Manifest discovery settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Directories scanned for manifests, in order.
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Manifest file name looked for in every directory.
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    /// Follow symbolic links while walking the roots.
    #[serde(default)]
    pub follow_links: bool,

    /// Maximum directory depth below each root. Unlimited when unset.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            manifest_file: default_manifest_file(),
            follow_links: false,
            max_depth: None,
        }
    }
}

fn default_manifest_file() -> String {
    "component.toml".to_string()
}

/// Cache store selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local, lost on exit.
    #[default]
    Memory,
    /// Shared SQLite database file.
    Sqlite,
    /// No caching; every lookup scans.
    None,
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
            Self::None => "none",
        })
    }
}

/// Definition cache settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    /// SQLite database file, used by the `sqlite` backend.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("tessera").join("cache.db"))
        .unwrap_or_else(|| PathBuf::from("tessera-cache.db"))
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Level for Tessera's own targets (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TesseraConfig::default();
        assert_eq!(config.registry.namespace, "tessera");
        assert_eq!(config.registry.default_qualifier, "und");
        assert!(config.registry.single_flight);
        assert_eq!(config.discovery.manifest_file, "component.toml");
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert!(config.cache.database_path.to_string_lossy().ends_with("cache.db"));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn backend_names() {
        let parsed: CacheConfig = toml::from_str("backend = \"sqlite\"").unwrap();
        assert_eq!(parsed.backend, CacheBackend::Sqlite);
        assert_eq!(CacheBackend::None.to_string(), "none");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result: Result<DiscoveryConfig, _> = toml::from_str("rootz = []");
        assert!(result.is_err());
    }
}
