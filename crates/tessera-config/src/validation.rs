// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Checks constraints serde cannot express. All problems are collected
//! instead of failing on the first.

use std::collections::HashSet;

use tessera_core::Family;

use crate::diagnostic::ConfigError;
use crate::model::{CacheBackend, TesseraConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
pub fn validate_config(config: &TesseraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Err(e) = Family::new(config.registry.namespace.clone()) {
        errors.push(ConfigError::invalid("registry.namespace", e.to_string()));
    }

    if config.registry.default_qualifier.trim().is_empty() {
        errors.push(ConfigError::invalid(
            "registry.default_qualifier",
            "must not be empty",
        ));
    }

    let mut seen = HashSet::new();
    for (i, family) in config.registry.families.iter().enumerate() {
        if let Err(e) = Family::new(family.clone()) {
            errors.push(ConfigError::invalid(
                "registry.families",
                format!("entry {i}: {e}"),
            ));
        } else if !seen.insert(family.as_str()) {
            errors.push(ConfigError::invalid(
                "registry.families",
                format!("family `{family}` is listed more than once"),
            ));
        }
    }

    let manifest_file = config.discovery.manifest_file.trim();
    if manifest_file.is_empty() {
        errors.push(ConfigError::invalid(
            "discovery.manifest_file",
            "must not be empty",
        ));
    } else if manifest_file.contains(['/', '\\']) {
        errors.push(ConfigError::invalid(
            "discovery.manifest_file",
            format!("`{manifest_file}` must be a file name, not a path"),
        ));
    }

    if config.discovery.max_depth == Some(0) {
        errors.push(ConfigError::invalid(
            "discovery.max_depth",
            "must be at least 1",
        ));
    }

    if config.cache.backend == CacheBackend::Sqlite
        && config.cache.database_path.as_os_str().is_empty()
    {
        errors.push(ConfigError::invalid(
            "cache.database_path",
            "must not be empty when the sqlite backend is selected",
        ));
    }

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::invalid(
            "log.level",
            format!(
                "`{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
