// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for Tessera configuration loading.

use std::path::PathBuf;

use figment::Jail;
use tessera_config::{
    CacheBackend, ConfigError, load_and_validate, load_and_validate_path, load_and_validate_str,
    load_config_from_str,
};

#[test]
fn full_config_deserializes() {
    let toml = r#"
[registry]
namespace = "aggregator"
default_qualifier = "en"
single_flight = false
families = ["fetcher", "processor"]

[discovery]
roots = ["/srv/modules", "/opt/extra"]
manifest_file = "plugin.toml"
follow_links = true
max_depth = 3

[cache]
backend = "sqlite"
database_path = "/var/lib/tessera/cache.db"

[log]
level = "debug"
"#;

    let config = load_and_validate_str(toml).expect("valid config");
    assert_eq!(config.registry.namespace, "aggregator");
    assert_eq!(config.registry.default_qualifier, "en");
    assert!(!config.registry.single_flight);
    assert_eq!(config.registry.families, vec!["fetcher", "processor"]);
    assert_eq!(
        config.discovery.roots,
        vec![PathBuf::from("/srv/modules"), PathBuf::from("/opt/extra")]
    );
    assert_eq!(config.discovery.manifest_file, "plugin.toml");
    assert!(config.discovery.follow_links);
    assert_eq!(config.discovery.max_depth, Some(3));
    assert_eq!(config.cache.backend, CacheBackend::Sqlite);
    assert_eq!(
        config.cache.database_path,
        PathBuf::from("/var/lib/tessera/cache.db")
    );
    assert_eq!(config.log.level, "debug");
}

#[test]
fn empty_config_uses_defaults() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config.registry.namespace, "tessera");
    assert_eq!(config.cache.backend, CacheBackend::Memory);
    assert!(config.discovery.roots.is_empty());
}

#[test]
fn misspelled_key_gets_suggestion_and_span() {
    let toml = "[discovery]\nmanifest_fle = \"x.toml\"\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            span,
            ..
        } => {
            assert!(key.ends_with("manifest_fle"));
            assert_eq!(suggestion.as_deref(), Some("manifest_file"));
            if let Some(span) = span {
                assert_eq!(span.offset(), toml.find("manifest_fle").unwrap());
            }
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[plugins]\nenabled = true\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key.ends_with("plugins")));
}

#[test]
fn unknown_backend_suggests_closest() {
    let errors = load_and_validate_str("[cache]\nbackend = \"sqlit\"\n").unwrap_err();
    match &errors[0] {
        ConfigError::UnknownVariant {
            value, suggestion, ..
        } => {
            assert_eq!(value, "sqlit");
            assert_eq!(suggestion.as_deref(), Some("sqlite"));
        }
        other => panic!("expected UnknownVariant, got {other:?}"),
    }
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[registry]\nsingle_flight = \"yes\"\n").unwrap_err();
    assert!(matches!(
        &errors[0],
        ConfigError::InvalidType { key, .. } if key.ends_with("single_flight")
    ));
}

#[test]
fn semantic_errors_are_collected() {
    let toml = r#"
[registry]
families = ["fetcher", "fetcher"]

[log]
level = "loud"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    let keys: Vec<&str> = errors.iter().filter_map(ConfigError::key).collect();
    assert_eq!(keys, vec!["registry.families", "log.level"]);
}

#[test]
fn env_overrides_files() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "tessera.toml",
            r#"
[cache]
backend = "sqlite"
database_path = "from-file.db"

[log]
level = "warn"
"#,
        )?;
        jail.set_env("TESSERA_CACHE_DATABASE_PATH", "from-env.db");
        jail.set_env("TESSERA_REGISTRY_DEFAULT_QUALIFIER", "de");
        // Read by the log filter, not by the config loader.
        jail.set_env("TESSERA_LOG", "tessera=trace");

        let config = load_and_validate().map_err(|e| format!("{e:?}"))?;
        assert_eq!(config.cache.backend, CacheBackend::Sqlite);
        assert_eq!(config.cache.database_path, PathBuf::from("from-env.db"));
        assert_eq!(config.registry.default_qualifier, "de");
        assert_eq!(config.log.level, "warn");
        Ok(())
    });
}

#[test]
fn explicit_path_is_required_to_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let errors = load_and_validate_path(&missing).unwrap_err();
    assert!(matches!(&errors[0], ConfigError::Other(msg) if msg.contains("not found")));
}

#[test]
fn explicit_path_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[discovery]\nroots = [\"modules\"]\n").unwrap();

    let config = load_and_validate_path(&path).unwrap();
    assert_eq!(config.discovery.roots, vec![PathBuf::from("modules")]);
}
