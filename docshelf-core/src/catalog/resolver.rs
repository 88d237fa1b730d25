//! Catalog source resolution and cache-aside loading
//!
//! Which store backs the catalog is resolved on every call from a
//! three-tier priority: a runtime-settable override (persisted in the
//! key-value override store, so it survives restarts), the deploy-time
//! default from [`Settings`], and a single-container fallback mode that
//! synthesizes a one-product catalog when no tabular store exists at all.
//!
//! Separating resolution from loading lets first-run setup write the
//! override exactly once; afterwards every `load()` transparently uses it
//! with no caller-visible difference between freshly and long configured
//! systems.

use std::sync::Arc;

use crate::error::{CatalogError, Result};
use crate::settings::Settings;
use crate::store::{CatalogStore, CatalogStoreProvider, OverrideStore};

use super::cache::CatalogCache;
use super::product::{Catalog, Product};

/// Override-store key holding the runtime source override.
pub const SOURCE_OVERRIDE_KEY: &str = "catalog.source";

/// Name of the product synthesized in single-container fallback mode.
pub const FALLBACK_PRODUCT_NAME: &str = "default";

/// The resolved catalog source for one call. Never persisted as an
/// entity; recomputed from the priority chain each time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// A tabular catalog store at this id is authoritative.
    Store(String),

    /// No store configured anywhere: serve the single-container fallback.
    Fallback,
}

/// Resolves the authoritative catalog source, loads it into a typed
/// [`Catalog`], and caches the result with a TTL.
pub struct ConfigResolver {
    settings: Settings,
    overrides: Arc<dyn OverrideStore>,
    provider: Arc<dyn CatalogStoreProvider>,
    cache: CatalogCache,
}

impl ConfigResolver {
    /// Build a resolver; the cache TTL comes from the settings.
    pub fn new(
        settings: Settings,
        overrides: Arc<dyn OverrideStore>,
        provider: Arc<dyn CatalogStoreProvider>,
    ) -> Self {
        let cache = CatalogCache::new(settings.cache_ttl());
        Self {
            settings,
            overrides,
            provider,
            cache,
        }
    }

    /// The settings this resolver was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolve the current source: runtime override first, then the
    /// deploy-time default, then the fallback sentinel. Key-value read
    /// only; never fails.
    pub fn resolve_source(&self) -> SourceRef {
        if let Some(id) = self.overrides.get(SOURCE_OVERRIDE_KEY) {
            if !id.trim().is_empty() {
                return SourceRef::Store(id.trim().to_string());
            }
        }
        if let Some(id) = &self.settings.default_source {
            if !id.trim().is_empty() {
                return SourceRef::Store(id.trim().to_string());
            }
        }
        SourceRef::Fallback
    }

    /// Cache-aside read-through: serve the cached catalog while the entry
    /// is fresh, otherwise load from the resolved source and repopulate.
    pub async fn load(&self) -> Result<Arc<Catalog>> {
        if let Some(catalog) = self.cache.get() {
            return Ok(catalog);
        }

        let catalog = Arc::new(self.load_uncached().await?);
        self.cache.put(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// Load straight from the resolved source, bypassing the cache.
    /// Administrative reads use this when they must see current data.
    pub async fn load_uncached(&self) -> Result<Catalog> {
        match self.resolve_source() {
            SourceRef::Store(id) => {
                let store = self.provider.open(&id).await.map_err(|e| {
                    CatalogError::ConfigLoad(format!("catalog store '{id}' is unreachable: {e}"))
                })?;
                let rows = store.read_rows().await.map_err(|e| {
                    CatalogError::ConfigLoad(format!("failed to read catalog store '{id}': {e}"))
                })?;
                let catalog = Catalog::from_rows(&rows);
                tracing::debug!(source = %id, products = catalog.len(), "loaded catalog");
                Ok(catalog)
            }
            SourceRef::Fallback => {
                let container = self
                    .settings
                    .fallback_container
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| {
                        CatalogError::ConfigLoad(
                            "no catalog source and no fallback container configured".into(),
                        )
                    })?;

                tracing::debug!(container, "no catalog source, using single-container fallback");
                Ok(Catalog::new(vec![synthesize_fallback_product(container)]))
            }
        }
    }

    /// Drop the cached catalog. Idempotent; a pure local clear.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    /// Persist a runtime source override after validating that a catalog
    /// store actually exists at `id`. On validation failure nothing is
    /// persisted; on success the cache is invalidated.
    pub async fn set_source(&self, id: &str) -> Result<()> {
        let id = id.trim();
        if id.is_empty() {
            return Err(CatalogError::Validation("source id is required".into()));
        }

        self.provider.open(id).await.map_err(|e| {
            CatalogError::ConfigLoad(format!("no catalog store found at '{id}': {e}"))
        })?;

        self.overrides.set(SOURCE_OVERRIDE_KEY, id)?;
        self.invalidate();
        tracing::info!(source = id, "catalog source override set");
        Ok(())
    }

    /// Open the store mutations must target. Fails in fallback mode,
    /// where no tabular store exists to write.
    pub(crate) async fn open_current(&self) -> Result<Arc<dyn CatalogStore>> {
        match self.resolve_source() {
            SourceRef::Store(id) => self.provider.open(&id).await,
            SourceRef::Fallback => Err(CatalogError::ConfigLoad(
                "no catalog store configured; set a catalog source before editing products".into(),
            )),
        }
    }
}

fn synthesize_fallback_product(container: &str) -> Product {
    Product {
        name: FALLBACK_PRODUCT_NAME.to_string(),
        container_id: container.to_string(),
        display_name: "Default".to_string(),
        enabled: true,
        description: String::new(),
        category: super::product::DEFAULT_CATEGORY.to_string(),
        tags: Vec::new(),
    }
}

#[cfg(test)]
mod resolver_tests {
    use super::*;
    use super::super::product::ProductRow;
    use crate::store::{MemoryCatalogStore, MemoryOverrides, MemoryProvider};

    fn row(name: &str, container: &str) -> ProductRow {
        ProductRow {
            name: name.to_string(),
            container_id: container.to_string(),
            ..Default::default()
        }
    }

    fn resolver_with(
        settings: Settings,
        overrides: Arc<MemoryOverrides>,
        provider: Arc<MemoryProvider>,
    ) -> ConfigResolver {
        ConfigResolver::new(settings, overrides, provider)
    }

    #[test]
    fn test_source_priority_override_wins() {
        let overrides = Arc::new(MemoryOverrides::default());
        overrides.set(SOURCE_OVERRIDE_KEY, "override-src").unwrap();
        let settings = Settings {
            default_source: Some("default-src".to_string()),
            ..Default::default()
        };
        let resolver =
            resolver_with(settings, overrides, Arc::new(MemoryProvider::default()));
        assert_eq!(
            resolver.resolve_source(),
            SourceRef::Store("override-src".to_string())
        );
    }

    #[test]
    fn test_source_priority_default_when_no_override() {
        let settings = Settings {
            default_source: Some("default-src".to_string()),
            ..Default::default()
        };
        let resolver = resolver_with(
            settings,
            Arc::new(MemoryOverrides::default()),
            Arc::new(MemoryProvider::default()),
        );
        assert_eq!(
            resolver.resolve_source(),
            SourceRef::Store("default-src".to_string())
        );
    }

    #[test]
    fn test_source_priority_fallback_when_nothing_set() {
        let resolver = resolver_with(
            Settings::default(),
            Arc::new(MemoryOverrides::default()),
            Arc::new(MemoryProvider::default()),
        );
        assert_eq!(resolver.resolve_source(), SourceRef::Fallback);
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let overrides = Arc::new(MemoryOverrides::default());
        overrides.set(SOURCE_OVERRIDE_KEY, "  ").unwrap();
        let resolver = resolver_with(
            Settings::default(),
            overrides,
            Arc::new(MemoryProvider::default()),
        );
        assert_eq!(resolver.resolve_source(), SourceRef::Fallback);
    }

    #[tokio::test]
    async fn test_load_parses_rows_and_skips_invalid() {
        let provider = Arc::new(MemoryProvider::default());
        provider.insert(
            "src",
            Arc::new(MemoryCatalogStore::new(vec![
                row("invoice", "c-1"),
                row("", "c-2"),
                row("report", ""),
            ])),
        );
        let settings = Settings {
            default_source: Some("src".to_string()),
            ..Default::default()
        };
        let resolver = resolver_with(settings, Arc::new(MemoryOverrides::default()), provider);

        let catalog = resolver.load().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find("invoice").is_some());
    }

    #[tokio::test]
    async fn test_load_within_ttl_reads_store_once() {
        let store = Arc::new(MemoryCatalogStore::new(vec![row("invoice", "c-1")]));
        let provider = Arc::new(MemoryProvider::default());
        provider.insert("src", Arc::clone(&store));
        let settings = Settings {
            default_source: Some("src".to_string()),
            ..Default::default()
        };
        let resolver = resolver_with(settings, Arc::new(MemoryOverrides::default()), provider);

        let first = resolver.load().await.unwrap();
        let second = resolver.load().await.unwrap();
        assert_eq!(store.read_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_invalidate_forces_fresh_read() {
        let store = Arc::new(MemoryCatalogStore::new(vec![row("invoice", "c-1")]));
        let provider = Arc::new(MemoryProvider::default());
        provider.insert("src", Arc::clone(&store));
        let settings = Settings {
            default_source: Some("src".to_string()),
            ..Default::default()
        };
        let resolver = resolver_with(settings, Arc::new(MemoryOverrides::default()), provider);

        resolver.load().await.unwrap();
        resolver.invalidate();
        resolver.load().await.unwrap();
        assert_eq!(store.read_count(), 2);
    }

    #[tokio::test]
    async fn test_fallback_synthesizes_single_product() {
        let settings = Settings {
            fallback_container: Some("/srv/templates".to_string()),
            ..Default::default()
        };
        let resolver = resolver_with(
            settings,
            Arc::new(MemoryOverrides::default()),
            Arc::new(MemoryProvider::default()),
        );

        let catalog = resolver.load().await.unwrap();
        assert_eq!(catalog.len(), 1);
        let product = catalog.find(FALLBACK_PRODUCT_NAME).unwrap();
        assert_eq!(product.container_id, "/srv/templates");
        assert!(product.enabled);
    }

    #[tokio::test]
    async fn test_no_source_no_fallback_is_config_error() {
        let resolver = resolver_with(
            Settings::default(),
            Arc::new(MemoryOverrides::default()),
            Arc::new(MemoryProvider::default()),
        );
        assert!(matches!(
            resolver.load().await,
            Err(CatalogError::ConfigLoad(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_config_error() {
        let settings = Settings {
            default_source: Some("missing-src".to_string()),
            ..Default::default()
        };
        let resolver = resolver_with(
            settings,
            Arc::new(MemoryOverrides::default()),
            Arc::new(MemoryProvider::default()),
        );
        assert!(matches!(
            resolver.load().await,
            Err(CatalogError::ConfigLoad(_))
        ));
    }

    #[tokio::test]
    async fn test_set_source_rejects_unknown_store_and_does_not_persist() {
        let overrides = Arc::new(MemoryOverrides::default());
        let resolver = resolver_with(
            Settings::default(),
            Arc::clone(&overrides),
            Arc::new(MemoryProvider::default()),
        );

        let result = resolver.set_source("nowhere").await;
        assert!(matches!(result, Err(CatalogError::ConfigLoad(_))));
        assert!(overrides.get(SOURCE_OVERRIDE_KEY).is_none());
    }

    #[tokio::test]
    async fn test_set_source_persists_and_takes_priority() {
        let provider = Arc::new(MemoryProvider::default());
        provider.insert(
            "new-src",
            Arc::new(MemoryCatalogStore::new(vec![row("invoice", "c-1")])),
        );
        let overrides = Arc::new(MemoryOverrides::default());
        let resolver = resolver_with(Settings::default(), Arc::clone(&overrides), provider);

        resolver.set_source("new-src").await.unwrap();
        assert_eq!(
            overrides.get(SOURCE_OVERRIDE_KEY).as_deref(),
            Some("new-src")
        );
        assert_eq!(
            resolver.resolve_source(),
            SourceRef::Store("new-src".to_string())
        );
    }
}
