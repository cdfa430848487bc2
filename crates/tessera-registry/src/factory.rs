// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component instantiation from definitions.
//!
//! A [`ComponentFactory`] is a lookup table from definition handles to typed
//! constructors for one family. `T` is the family's instance type, usually a
//! trait object such as `dyn Fetcher`. The factory keeps no reference to the
//! instances it creates.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tessera_core::{
    BoxError, ComponentConfig, ComponentDefinition, ConfigProblem, ConfigSchema,
    ConstructionError, Family,
};
use tracing::debug;

/// Builds one kind of component from its definition and a validated config.
pub trait ComponentConstructor<T: ?Sized>: Send + Sync {
    fn construct(
        &self,
        definition: &ComponentDefinition,
        config: &ComponentConfig,
    ) -> Result<Box<T>, BoxError>;
}

/// Adapter turning a closure into a [`ComponentConstructor`].
struct FnConstructor<F>(F);

impl<T, F> ComponentConstructor<T> for FnConstructor<F>
where
    T: ?Sized,
    F: Fn(&ComponentDefinition, &ComponentConfig) -> Result<Box<T>, BoxError> + Send + Sync,
{
    fn construct(
        &self,
        definition: &ComponentDefinition,
        config: &ComponentConfig,
    ) -> Result<Box<T>, BoxError> {
        (self.0)(definition, config)
    }
}

/// Handle-to-constructor table for one family.
pub struct ComponentFactory<T: ?Sized + 'static> {
    family: Family,
    constructors: HashMap<String, Arc<dyn ComponentConstructor<T>>>,
    defaults: ComponentConfig,
}

impl<T: ?Sized + 'static> ComponentFactory<T> {
    pub fn new(family: Family) -> Self {
        Self {
            family,
            constructors: HashMap::new(),
            defaults: ComponentConfig::new(),
        }
    }

    pub fn family(&self) -> &Family {
        &self.family
    }

    /// Register a constructor for `handle`, replacing any previous one.
    pub fn register(
        &mut self,
        handle: impl Into<String>,
        constructor: impl ComponentConstructor<T> + 'static,
    ) -> &mut Self {
        self.constructors
            .insert(handle.into(), Arc::new(constructor));
        self
    }

    /// Register a closure as the constructor for `handle`.
    pub fn register_fn<F>(&mut self, handle: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&ComponentDefinition, &ComponentConfig) -> Result<Box<T>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.register(handle, FnConstructor(constructor))
    }

    /// Configuration merged under every caller config before validation.
    pub fn with_defaults(mut self, defaults: ComponentConfig) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn resolves(&self, handle: &str) -> bool {
        self.constructors.contains_key(handle)
    }

    /// Registered handles, sorted.
    pub fn handles(&self) -> Vec<&str> {
        let mut handles: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        handles.sort_unstable();
        handles
    }

    /// Instantiate `definition` with `config`.
    ///
    /// The handle is resolved first, then the merged config is checked against
    /// the definition's schema (reporting every problem at once), and only then
    /// is the constructor run.
    pub fn create(
        &self,
        definition: &ComponentDefinition,
        config: &ComponentConfig,
    ) -> Result<Box<T>, ConstructionError> {
        let constructor = self
            .constructors
            .get(&definition.handle)
            .filter(|_| definition.family == self.family)
            .ok_or_else(|| ConstructionError::UnresolvedHandle {
                id: definition.id.clone(),
                handle: definition.handle.clone(),
            })?;

        let mut effective = self.defaults.clone();
        effective.extend(config.iter().map(|(k, v)| (k.clone(), v.clone())));

        let problems = validate_config(&definition.config_schema, &effective);
        if !problems.is_empty() {
            return Err(ConstructionError::InvalidConfig {
                id: definition.id.clone(),
                problems,
            });
        }

        debug!(
            family = %self.family,
            id = %definition.id,
            handle = %definition.handle,
            "constructing component"
        );
        constructor
            .construct(definition, &effective)
            .map_err(|source| ConstructionError::Constructor {
                id: definition.id.clone(),
                source,
            })
    }
}

impl<T: ?Sized + 'static> std::fmt::Debug for ComponentFactory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("family", &self.family)
            .field("handles", &self.handles())
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// Check `config` against `schema`, collecting every problem in declaration
/// order. A `null` value counts as absent.
pub fn validate_config(schema: &ConfigSchema, config: &ComponentConfig) -> Vec<ConfigProblem> {
    let mut problems = Vec::new();

    for (key, spec) in &schema.keys {
        match config.get(key) {
            None | Some(Value::Null) => {
                if spec.required {
                    problems.push(ConfigProblem::Missing { key: key.clone() });
                }
            }
            Some(value) if !spec.kind.accepts(value) => {
                problems.push(ConfigProblem::WrongType {
                    key: key.clone(),
                    expected: spec.kind,
                    found: tessera_core::ValueKind::describe(value),
                });
            }
            Some(_) => {}
        }
    }

    if schema.strict {
        problems.extend(
            config
                .keys()
                .filter(|key| !schema.keys.contains_key(key.as_str()))
                .map(|key| ConfigProblem::Unknown { key: key.clone() }),
        );
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_core::ValueKind;

    trait Fetcher: Send + Sync {
        fn url(&self) -> &str;
    }

    struct HttpFetcher {
        url: String,
    }

    impl Fetcher for HttpFetcher {
        fn url(&self) -> &str {
            &self.url
        }
    }

    fn fetcher_family() -> Family {
        Family::new("fetcher").unwrap()
    }

    fn config(value: Value) -> ComponentConfig {
        match value {
            Value::Object(map) => map,
            _ => panic!("config must be an object"),
        }
    }

    fn factory() -> ComponentFactory<dyn Fetcher> {
        let mut factory = ComponentFactory::<dyn Fetcher>::new(fetcher_family());
        factory.register_fn("http", |_def, cfg| {
            let url = cfg
                .get("url")
                .and_then(Value::as_str)
                .ok_or("url missing")?
                .to_string();
            Ok(Box::new(HttpFetcher { url }))
        });
        factory.register_fn("broken", |_def, _cfg| Err("socket refused".into()));
        factory
    }

    fn http_definition() -> ComponentDefinition {
        ComponentDefinition::new("default", "http", fetcher_family())
            .with_config_key("url", ValueKind::String, true)
            .with_config_key("timeout", ValueKind::Integer, true)
            .with_config_key("verbose", ValueKind::Boolean, false)
    }

    #[test]
    fn creates_instance_with_valid_config() {
        let fetcher = factory()
            .create(
                &http_definition(),
                &config(json!({"url": "https://example.com/feed", "timeout": 30})),
            )
            .unwrap();
        assert_eq!(fetcher.url(), "https://example.com/feed");
    }

    #[test]
    fn missing_keys_are_all_reported() {
        let err = factory()
            .create(&http_definition(), &ComponentConfig::new())
            .err()
            .unwrap();
        match err {
            ConstructionError::InvalidConfig { id, problems } => {
                assert_eq!(id, "default");
                assert_eq!(
                    problems,
                    vec![
                        ConfigProblem::Missing { key: "url".into() },
                        ConfigProblem::Missing {
                            key: "timeout".into()
                        },
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_types_and_missing_keys_are_combined() {
        let err = factory()
            .create(
                &http_definition(),
                &config(json!({"url": 5, "verbose": "yes"})),
            )
            .err()
            .unwrap();
        let ConstructionError::InvalidConfig { problems, .. } = err else {
            panic!("expected invalid config");
        };
        let keys: Vec<&str> = problems.iter().map(ConfigProblem::key).collect();
        assert_eq!(keys, vec!["url", "timeout", "verbose"]);
        assert!(matches!(problems[0], ConfigProblem::WrongType { found: "integer", .. }));
    }

    #[test]
    fn strict_schema_rejects_unknown_keys() {
        let definition = http_definition().strict_config();
        let err = factory()
            .create(
                &definition,
                &config(json!({"url": "u", "timeout": 1, "proxy": "p"})),
            )
            .err()
            .unwrap();
        let ConstructionError::InvalidConfig { problems, .. } = err else {
            panic!("expected invalid config");
        };
        assert_eq!(problems, vec![ConfigProblem::Unknown { key: "proxy".into() }]);
    }

    #[test]
    fn null_optional_key_is_accepted() {
        let result = factory().create(
            &http_definition(),
            &config(json!({"url": "u", "timeout": 1, "verbose": null})),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn unresolved_handle() {
        let definition = ComponentDefinition::new("ghost", "nowhere", fetcher_family());
        let err = factory()
            .create(&definition, &ComponentConfig::new())
            .err()
            .unwrap();
        assert!(matches!(err, ConstructionError::UnresolvedHandle { ref handle, .. } if handle == "nowhere"));
    }

    #[test]
    fn handle_from_another_family_is_unresolved() {
        let definition = ComponentDefinition::new("x", "http", Family::new("processor").unwrap());
        let err = factory()
            .create(&definition, &config(json!({"url": "u", "timeout": 1})))
            .err()
            .unwrap();
        assert!(matches!(err, ConstructionError::UnresolvedHandle { .. }));
    }

    #[test]
    fn constructor_failure_is_surfaced() {
        let definition = ComponentDefinition::new("bad", "broken", fetcher_family());
        let err = factory()
            .create(&definition, &ComponentConfig::new())
            .err()
            .unwrap();
        match err {
            ConstructionError::Constructor { id, source } => {
                assert_eq!(id, "bad");
                assert_eq!(source.to_string(), "socket refused");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn defaults_fill_missing_keys() {
        let factory = factory().with_defaults(config(json!({"timeout": 60})));
        let result = factory.create(&http_definition(), &config(json!({"url": "u"})));
        assert!(result.is_ok());
    }

    #[test]
    fn handles_are_sorted() {
        let factory = factory();
        assert_eq!(factory.handles(), vec!["broken", "http"]);
        assert!(factory.resolves("http"));
        assert!(!factory.resolves("ftp"));
    }
}
