// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `/etc/tessera/tessera.toml`
//! 3. `$XDG_CONFIG_HOME/tessera/tessera.toml`
//! 4. `./tessera.toml`
//! 5. `TESSERA_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TesseraConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/tessera/tessera.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "tessera.toml";

/// Top-level sections reachable through `TESSERA_<SECTION>_<KEY>`.
const ENV_SECTIONS: &[&str] = &["registry", "discovery", "cache", "log"];

/// Per-user configuration file, if a config directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tessera").join(LOCAL_CONFIG_FILE))
}

/// Configuration files consulted by [`load_config`], lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    paths.extend(user_config_path());
    paths.push(PathBuf::from(LOCAL_CONFIG_FILE));
    paths
}

/// Build the standard figment before extraction.
pub fn build_figment() -> Figment {
    config_file_paths()
        .into_iter()
        .fold(defaults(), |figment, path| figment.merge(Toml::file(path)))
        .merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<TesseraConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from one explicit file with env var overrides.
///
/// The file must exist; the standard hierarchy is not consulted.
pub fn load_config_from_path(path: &Path) -> Result<TesseraConfig, figment::Error> {
    if !path.is_file() {
        return Err(figment::Error::from(format!(
            "configuration file `{}` not found",
            path.display()
        )));
    }
    defaults()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only, without env overrides.
pub fn load_config_from_str(toml_content: &str) -> Result<TesseraConfig, figment::Error> {
    defaults().merge(Toml::string(toml_content)).extract()
}

fn defaults() -> Figment {
    Figment::new().merge(Serialized::defaults(TesseraConfig::default()))
}

/// Environment provider mapping `TESSERA_CACHE_DATABASE_PATH` to
/// `cache.database_path`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys containing underscores survive. Variables outside the known sections
/// (such as `TESSERA_LOG`, read by the log filter) are ignored.
fn env_provider() -> Env {
    Env::prefixed("TESSERA_")
        .filter(|key| env_section(key.as_str()).is_some())
        .map(|key| {
            let key = key.as_str().to_ascii_lowercase();
            match env_section(&key) {
                Some(section) => format!("{section}.{}", &key[section.len() + 1..]).into(),
                None => key.into(),
            }
        })
}

/// The config section an env key (prefix stripped) addresses, if any.
fn env_section(key: &str) -> Option<&'static str> {
    ENV_SECTIONS.iter().copied().find(|section| {
        key.len() > section.len() + 1
            && key[..section.len()].eq_ignore_ascii_case(section)
            && key.as_bytes()[section.len()] == b'_'
    })
}
