// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component manifest parsing from `component.toml` files.
//!
//! A manifest declares one or more components under `[[component]]` tables,
//! optionally attributed to a `provider`. A component may declare
//! `derivatives`, each of which becomes its own definition with id
//! `<base>:<derivative>`.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tessera_core::{
    Candidate, ComponentDefinition, ConfigSchema, DiscoveryError, Family, Metadata,
};

/// Metadata key recording the base id of a derived definition.
pub const BASE_ID_KEY: &str = "base_id";
/// Metadata key recording the derivative name of a derived definition.
pub const DERIVATIVE_ID_KEY: &str = "derivative_id";

/// Intermediate TOML deserialization struct for `component.toml`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    provider: Option<String>,
    #[serde(default)]
    component: Vec<ComponentSection>,
}

/// One `[[component]]` table. Identity fields are optional here so that a
/// missing field is reported by name instead of as a TOML error.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ComponentSection {
    id: Option<String>,
    family: Option<String>,
    handle: Option<String>,
    label: Option<String>,
    version: Option<String>,
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    config: ConfigSchema,
    #[serde(default)]
    derivatives: IndexMap<String, DerivativeSection>,
}

/// A `[component.derivatives.<name>]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DerivativeSection {
    label: Option<String>,
    #[serde(default)]
    metadata: Metadata,
}

/// Parse every component declared in a manifest, regardless of family.
///
/// `source` names the manifest in error messages and candidate origins.
pub fn parse_manifest(source: &str, toml_content: &str) -> Result<Vec<Candidate>, DiscoveryError> {
    let file: ManifestFile =
        toml::from_str(toml_content).map_err(|e| DiscoveryError::Malformed {
            candidate: source.to_string(),
            reason: format!("invalid component manifest: {}", e.message()),
        })?;

    let mut candidates = Vec::new();
    for (n, section) in file.component.into_iter().enumerate() {
        let origin = format!("{source}#component[{n}]");
        let base = build_definition(&origin, section.id, section.family, section.handle)?;
        let mut base = ComponentDefinition {
            provider: file.provider.clone(),
            label: section.label,
            config_schema: section.config,
            metadata: section.metadata,
            ..base_with_version(base, &origin, section.version)?
        };

        if section.derivatives.is_empty() {
            candidates.push(Candidate::new(origin, base));
            continue;
        }

        let base_id = std::mem::take(&mut base.id);
        for (name, derivative) in section.derivatives {
            let derived_origin = format!("{origin}.derivatives.{name}");
            if name.trim().is_empty() {
                return Err(DiscoveryError::Malformed {
                    candidate: derived_origin,
                    reason: "derivative name must not be empty".to_string(),
                });
            }

            let mut metadata = base.metadata.clone();
            metadata.extend(derivative.metadata);
            metadata.insert(BASE_ID_KEY.to_string(), Value::String(base_id.clone()));
            metadata.insert(DERIVATIVE_ID_KEY.to_string(), Value::String(name.clone()));

            let definition = ComponentDefinition {
                id: format!("{base_id}:{name}"),
                label: derivative.label.or_else(|| base.label.clone()),
                metadata,
                ..base.clone()
            };
            candidates.push(Candidate::new(derived_origin, definition));
        }
    }

    Ok(candidates)
}

fn build_definition(
    origin: &str,
    id: Option<String>,
    family: Option<String>,
    handle: Option<String>,
) -> Result<ComponentDefinition, DiscoveryError> {
    let id = required(origin, "id", id)?;
    let family = required(origin, "family", family)?;
    let handle = required(origin, "handle", handle)?;

    if id.contains(':') {
        return Err(DiscoveryError::Malformed {
            candidate: origin.to_string(),
            reason: format!("id `{id}` must not contain `:` (reserved for derivatives)"),
        });
    }

    let family = Family::new(family).map_err(|e| DiscoveryError::Malformed {
        candidate: origin.to_string(),
        reason: e.to_string(),
    })?;

    Ok(ComponentDefinition::new(id, handle, family))
}

fn base_with_version(
    definition: ComponentDefinition,
    origin: &str,
    version: Option<String>,
) -> Result<ComponentDefinition, DiscoveryError> {
    match version {
        None => Ok(definition),
        Some(raw) => {
            let version = semver::Version::parse(&raw).map_err(|e| DiscoveryError::Malformed {
                candidate: origin.to_string(),
                reason: format!("invalid version `{raw}`: {e}"),
            })?;
            Ok(definition.with_version(version))
        }
    }
}

fn required(
    origin: &str,
    field: &'static str,
    value: Option<String>,
) -> Result<String, DiscoveryError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DiscoveryError::MissingField {
            candidate: origin.to_string(),
            field,
        }),
    }
}
