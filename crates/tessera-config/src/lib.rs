// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Tessera component registry.
//!
//! TOML files layered with Figment, strict key checking
//! (`deny_unknown_fields`), `TESSERA_*` environment overrides and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use tessera_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("cache backend: {}", config.cache.backend);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    CacheBackend, CacheConfig, DiscoveryConfig, LogConfig, RegistryConfig, TesseraConfig,
};

/// Load configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<TesseraConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load configuration from one explicit file (plus env overrides) and
/// validate it.
pub fn load_and_validate_path(path: &Path) -> Result<TesseraConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || read_sources([path]))
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<TesseraConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Validate a loaded config, or turn a load error into diagnostics. Sources
/// are only read when there is something to point at.
fn finish(
    loaded: Result<TesseraConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<TesseraConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => match validation::validate_config(&config) {
            Ok(()) => {
                tracing::debug!(
                    backend = %config.cache.backend,
                    roots = config.discovery.roots.len(),
                    "configuration loaded"
                );
                Ok(config)
            }
            Err(errors) => Err(diagnostic::attach_sources(errors, &sources())),
        },
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// TOML sources of the standard hierarchy, for span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let paths = loader::config_file_paths();
    let mut sources = read_sources(paths.iter().map(|p| p.as_path()));
    // Figment reports the local file by its absolute path.
    if let Ok(cwd) = std::env::current_dir() {
        for (name, _) in &mut sources {
            if name == loader::LOCAL_CONFIG_FILE {
                *name = cwd.join(loader::LOCAL_CONFIG_FILE).display().to_string();
            }
        }
    }
    sources
}

fn read_sources<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Vec<(String, String)> {
    paths
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
