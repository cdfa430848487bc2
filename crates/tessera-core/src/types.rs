// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by discovery, caching, and the registry facade.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::{DiscoveryError, TesseraError};

/// Caller-supplied construction configuration, in insertion order.
pub type ComponentConfig = serde_json::Map<String, Value>;

/// Family-specific free-form metadata attached to a definition, in declaration order.
pub type Metadata = serde_json::Map<String, Value>;

/// A named category of pluggable components sharing one definition schema.
///
/// Restricted to ASCII alphanumerics, `_` and `-` so cache keys derived from
/// it stay unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Family(String);

impl Family {
    pub fn new(name: impl Into<String>) -> Result<Self, TesseraError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TesseraError::Config(
                "family name must not be empty".to_string(),
            ));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(TesseraError::Config(format!(
                "family name `{name}` contains invalid character `{c}`"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Family {
    type Error = TesseraError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Family::new(value)
    }
}

impl FromStr for Family {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Family::new(s)
    }
}

impl From<Family> for String {
    fn from(family: Family) -> Self {
        family.0
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contextual dimension (e.g. active locale) partitioning cache entries of a family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Qualifier(String);

impl Qualifier {
    /// Qualifier used when no context applies ("undetermined").
    pub const UNDETERMINED: &'static str = "und";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Qualifier {
    fn default() -> Self {
        Self(Self::UNDETERMINED.to_string())
    }
}

impl From<&str> for Qualifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Qualifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of value a configuration key accepts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Table,
    #[default]
    Any,
}

impl ValueKind {
    /// Whether `value` is acceptable for a key of this kind. Floats accept integers.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Integer => value.is_i64() || value.is_u64(),
            ValueKind::Float => value.is_number(),
            ValueKind::Boolean => value.is_boolean(),
            ValueKind::Array => value.is_array(),
            ValueKind::Table => value.is_object(),
            ValueKind::Any => true,
        }
    }

    /// Short name of the kind of `value`, for error messages.
    pub fn describe(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_f64() => "float",
            Value::Number(_) => "integer",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "table",
        }
    }
}

/// Declaration of a single construction configuration key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigKeySpec {
    #[serde(default)]
    pub kind: ValueKind,
    #[serde(default)]
    pub required: bool,
}

/// Required and optional configuration keys a component declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSchema {
    /// Reject keys that are not declared.
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub keys: IndexMap<String, ConfigKeySpec>,
}

impl ConfigSchema {
    pub fn is_empty(&self) -> bool {
        !self.strict && self.keys.is_empty()
    }

    /// Names of all required keys, in declaration order.
    pub fn required_keys(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.as_str())
    }
}

/// Immutable description of one discoverable component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    /// Unique within its family.
    pub id: String,
    /// Opaque reference to the constructor that builds this component.
    pub handle: String,
    pub family: Family,
    /// Package or manifest that declared the component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<semver::Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "ConfigSchema::is_empty")]
    pub config_schema: ConfigSchema,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: Metadata,
}

impl ComponentDefinition {
    pub fn new(id: impl Into<String>, handle: impl Into<String>, family: Family) -> Self {
        Self {
            id: id.into(),
            handle: handle.into(),
            family,
            provider: None,
            version: None,
            label: None,
            config_schema: ConfigSchema::default(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_version(mut self, version: semver::Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Declare a configuration key.
    pub fn with_config_key(
        mut self,
        name: impl Into<String>,
        kind: ValueKind,
        required: bool,
    ) -> Self {
        self.config_schema
            .keys
            .insert(name.into(), ConfigKeySpec { kind, required });
        self
    }

    /// Reject undeclared configuration keys.
    pub fn strict_config(mut self) -> Self {
        self.config_schema.strict = true;
        self
    }
}

/// A definition paired with a description of where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Human-readable origin, e.g. `plugins/aggregator/component.toml#component[0]`.
    pub source: String,
    pub definition: ComponentDefinition,
}

impl Candidate {
    pub fn new(source: impl Into<String>, definition: ComponentDefinition) -> Self {
        Self {
            source: source.into(),
            definition,
        }
    }
}

/// Mapping from component id to definition for one family, in discovery order.
///
/// Every key equals the `id` of its value; construction rejects duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionIndex {
    entries: IndexMap<String, ComponentDefinition>,
}

impl DefinitionIndex {
    /// Build an index from discovered candidates, failing on the first duplicate id.
    pub fn build(candidates: impl IntoIterator<Item = Candidate>) -> Result<Self, DiscoveryError> {
        let mut entries: IndexMap<String, ComponentDefinition> = IndexMap::new();
        let mut sources: IndexMap<String, String> = IndexMap::new();

        for Candidate { source, definition } in candidates {
            match sources.entry(definition.id.clone()) {
                Entry::Occupied(first) => {
                    return Err(DiscoveryError::DuplicateId {
                        family: definition.family.to_string(),
                        id: definition.id,
                        first: first.get().clone(),
                        second: source,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(source);
                }
            }
            entries.insert(definition.id.clone(), definition);
        }

        Ok(Self { entries })
    }

    /// Build an index from bare definitions, using the provider as the source name.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = ComponentDefinition>,
    ) -> Result<Self, DiscoveryError> {
        Self::build(definitions.into_iter().map(|definition| {
            let source = definition
                .provider
                .clone()
                .unwrap_or_else(|| format!("definition `{}`", definition.id));
            Candidate::new(source, definition)
        }))
    }

    pub fn get(&self, id: &str) -> Option<&ComponentDefinition> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.entries.values()
    }

    pub fn into_definitions(self) -> Vec<ComponentDefinition> {
        self.entries.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
