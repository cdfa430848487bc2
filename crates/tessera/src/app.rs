// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry wiring from configuration, and the operations behind each
//! CLI subcommand.

use std::sync::Arc;
use std::time::Duration;

use tessera_cache::{MemoryStore, NullStore, SqliteStore};
use tessera_config::{CacheBackend, TesseraConfig};
use tessera_core::{
    CacheStore, ComponentDefinition, Discovery, DiscoveryError, Family, Qualifier, TesseraError,
};
use tessera_discovery::ManifestDiscovery;
use tessera_registry::CachedDiscovery;
use tracing::{info, warn};

/// What `invalidate` drops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidateScope {
    /// The entry of one qualifier.
    Qualifier(Qualifier),
    /// Every qualifier of the family.
    All,
}

/// Outcome of scanning one family during `check`.
#[derive(Debug)]
pub struct FamilyReport {
    pub family: Family,
    pub result: Result<usize, DiscoveryError>,
}

/// A configured registry: manifest discovery behind the configured cache.
pub struct App {
    config: TesseraConfig,
    discovery: Arc<ManifestDiscovery>,
    cached: Arc<CachedDiscovery>,
}

impl App {
    pub fn from_config(config: TesseraConfig) -> Result<Self, TesseraError> {
        let discovery = Arc::new(
            ManifestDiscovery::new(config.discovery.roots.iter().cloned())
                .with_file_name(config.discovery.manifest_file.clone())
                .follow_links(config.discovery.follow_links)
                .max_depth(config.discovery.max_depth),
        );
        let store = open_store(&config)?;
        let cached = CachedDiscovery::new(discovery.clone(), store)
            .with_namespace(config.registry.namespace.clone())?
            .single_flight(config.registry.single_flight);

        Ok(Self {
            config,
            discovery,
            cached: Arc::new(cached),
        })
    }

    pub fn config(&self) -> &TesseraConfig {
        &self.config
    }

    /// `explicit`, or the configured default qualifier.
    pub fn qualifier(&self, explicit: Option<&str>) -> Qualifier {
        Qualifier::from(explicit.unwrap_or(&self.config.registry.default_qualifier))
    }

    /// Configured families, in configuration order.
    pub fn families(&self) -> Result<Vec<Family>, TesseraError> {
        if self.config.registry.families.is_empty() {
            return Err(TesseraError::Config(
                "no families configured; set registry.families".to_string(),
            ));
        }
        self.config
            .registry
            .families
            .iter()
            .map(|name| Family::new(name.as_str()))
            .collect()
    }

    pub fn list(
        &self,
        family: &Family,
        qualifier: &Qualifier,
    ) -> Result<Vec<ComponentDefinition>, TesseraError> {
        Ok(self
            .cached
            .get_index(family, qualifier)?
            .into_definitions())
    }

    pub fn show(
        &self,
        family: &Family,
        id: &str,
        qualifier: &Qualifier,
    ) -> Result<ComponentDefinition, TesseraError> {
        self.cached
            .get_index(family, qualifier)?
            .get(id)
            .cloned()
            .ok_or_else(|| TesseraError::UnknownComponent {
                family: family.to_string(),
                id: id.to_string(),
            })
    }

    /// Scan every configured family directly, bypassing the cache.
    pub fn check(&self) -> Result<Vec<FamilyReport>, TesseraError> {
        let reports: Vec<FamilyReport> = self
            .families()?
            .into_iter()
            .map(|family| {
                let result = self.discovery.scan(&family).map(|index| index.len());
                if let Err(e) = &result {
                    warn!(family = %family, error = %e, "family failed to scan");
                }
                FamilyReport { family, result }
            })
            .collect();
        Ok(reports)
    }

    pub fn invalidate(&self, family: &Family, scope: &InvalidateScope) -> Result<(), TesseraError> {
        match scope {
            InvalidateScope::Qualifier(qualifier) => self.cached.invalidate(family, qualifier)?,
            InvalidateScope::All => self.cached.invalidate_all(family)?,
        }
        Ok(())
    }

    /// Warm every configured family under `qualifier`, each bounded by
    /// `deadline`. Stops at the first failure.
    pub async fn warm(
        &self,
        qualifier: &Qualifier,
        deadline: Duration,
    ) -> Result<Vec<(Family, usize)>, TesseraError> {
        let mut warmed = Vec::new();
        for family in self.families()? {
            let count = tessera_registry::warm(
                self.cached.clone(),
                family.clone(),
                qualifier.clone(),
                deadline,
            )
            .await?;
            info!(family = %family, qualifier = %qualifier, count, "family warmed");
            warmed.push((family, count));
        }
        Ok(warmed)
    }
}

fn open_store(config: &TesseraConfig) -> Result<Arc<dyn CacheStore>, TesseraError> {
    let store: Arc<dyn CacheStore> = match config.cache.backend {
        CacheBackend::Memory => Arc::new(MemoryStore::new()),
        CacheBackend::Sqlite => Arc::new(SqliteStore::open(&config.cache.database_path)?),
        CacheBackend::None => Arc::new(NullStore),
    };
    info!(backend = %config.cache.backend, "definition cache store opened");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_test_utils::ManifestFixture;

    fn app(fixture: &ManifestFixture, backend: CacheBackend) -> (App, tempfile::TempDir) {
        let db_dir = tempfile::tempdir().unwrap();
        let mut config = TesseraConfig::default();
        config.discovery.roots = vec![fixture.root().to_path_buf()];
        config.registry.families = vec!["fetcher".into(), "processor".into()];
        config.cache.backend = backend;
        config.cache.database_path = db_dir.path().join("cache.db");
        (App::from_config(config).unwrap(), db_dir)
    }

    fn fetcher() -> Family {
        Family::new("fetcher").unwrap()
    }

    #[test]
    fn list_and_show() {
        let fixture = ManifestFixture::aggregator().unwrap();
        let (app, _db) = app(&fixture, CacheBackend::Memory);
        let q = app.qualifier(None);
        assert_eq!(q.as_str(), "und");

        let ids: Vec<String> = app
            .list(&fetcher(), &q)
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["default", "test"]);

        let definition = app.show(&fetcher(), "test", &q).unwrap();
        assert_eq!(definition.handle, "aggregator.fetcher.static");

        let err = app.show(&fetcher(), "missing", &q).unwrap_err();
        assert!(matches!(err, TesseraError::UnknownComponent { .. }));
    }

    #[test]
    fn check_reports_each_family() {
        let fixture = ManifestFixture::aggregator().unwrap();
        fixture
            .write(
                "dup",
                "[[component]]\nid = \"default\"\nfamily = \"processor\"\nhandle = \"x\"\n",
            )
            .unwrap();
        let (app, _db) = app(&fixture, CacheBackend::None);

        let reports = app.check().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].result.as_ref().ok(), Some(&2));
        assert!(matches!(
            reports[1].result,
            Err(DiscoveryError::DuplicateId { .. })
        ));
    }

    #[test]
    fn check_without_families_is_config_error() {
        let fixture = ManifestFixture::aggregator().unwrap();
        let mut config = TesseraConfig::default();
        config.discovery.roots = vec![fixture.root().to_path_buf()];
        let app = App::from_config(config).unwrap();
        assert!(matches!(app.check(), Err(TesseraError::Config(_))));
    }

    #[test]
    fn sqlite_backend_persists_between_runs() {
        let fixture = ManifestFixture::aggregator().unwrap();
        let db_dir = tempfile::tempdir().unwrap();
        let mut config = TesseraConfig::default();
        config.discovery.roots = vec![fixture.root().to_path_buf()];
        config.cache.backend = CacheBackend::Sqlite;
        config.cache.database_path = db_dir.path().join("cache.db");
        let q = Qualifier::from("en");

        let first = App::from_config(config.clone()).unwrap();
        assert_eq!(first.list(&fetcher(), &q).unwrap().len(), 2);
        drop(first);

        fixture.remove("aggregator").unwrap();
        let second = App::from_config(config.clone()).unwrap();
        assert_eq!(second.list(&fetcher(), &q).unwrap().len(), 2);

        second
            .invalidate(&fetcher(), &InvalidateScope::All)
            .unwrap();
        assert!(second.list(&fetcher(), &q).unwrap().is_empty());
    }

    #[tokio::test]
    async fn warm_covers_configured_families() {
        let fixture = ManifestFixture::aggregator().unwrap();
        let (app, _db) = app(&fixture, CacheBackend::Memory);
        let warmed = app
            .warm(&Qualifier::from("en"), Duration::from_secs(5))
            .await
            .unwrap();
        let counts: Vec<(String, usize)> = warmed
            .into_iter()
            .map(|(family, count)| (family.to_string(), count))
            .collect();
        assert_eq!(
            counts,
            vec![("fetcher".to_string(), 2), ("processor".to_string(), 1)]
        );
    }

    #[test]
    fn invalid_namespace_is_rejected() {
        let mut config = TesseraConfig::default();
        config.registry.namespace = "has space".into();
        assert!(matches!(App::from_config(config), Err(TesseraError::Config(_))));
    }
}
