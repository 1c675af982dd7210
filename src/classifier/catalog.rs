//! Product catalog lookup for telling product names from category names
//!
//! The catalog is only needed when a message names something that is not a
//! known category, zone or segment. Loading goes through `LazyCatalog`, so
//! a classification touches the database at most once and only on that
//! path.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::data::{CatalogItem, KpiScope, KpiSource};
use crate::error::Result;
use crate::extraction::normalize_for_match;

/// Normalized product and category names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCatalog {
    products: HashSet<String>,
    categories: HashSet<String>,
}

impl ProductCatalog {
    pub fn from_items(items: &[CatalogItem]) -> Self {
        let mut catalog = Self::default();
        for item in items {
            if let Some(name) = item.product_name.as_deref().map(normalize_for_match) {
                if !name.is_empty() {
                    catalog.products.insert(name);
                }
            }
            if let Some(category) = item.category.as_deref().map(normalize_for_match) {
                if !category.is_empty() {
                    catalog.categories.insert(category);
                }
            }
        }
        catalog
    }

    /// Whether some product name contains `term`
    pub fn is_product(&self, term: &str) -> bool {
        let term = normalize_for_match(term);
        !term.is_empty() && self.products.iter().any(|p| p.contains(&term))
    }

    /// Whether some category name contains `term`
    pub fn is_category(&self, term: &str) -> bool {
        let term = normalize_for_match(term);
        !term.is_empty() && self.categories.iter().any(|c| c.contains(&term))
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.categories.is_empty()
    }
}

/// Source of the catalog, bound to one org/store by the caller
#[async_trait]
pub trait CatalogLoader: Send + Sync {
    async fn load(&self) -> Result<ProductCatalog>;
}

/// Loads the catalog through the KPI source's catalog RPC
pub struct SourceCatalogLoader {
    source: Arc<dyn KpiSource>,
    scope: KpiScope,
}

impl SourceCatalogLoader {
    pub fn new(source: Arc<dyn KpiSource>, scope: KpiScope) -> Self {
        Self { source, scope }
    }
}

#[async_trait]
impl CatalogLoader for SourceCatalogLoader {
    async fn load(&self) -> Result<ProductCatalog> {
        let items = self.source.product_catalog(&self.scope).await?;
        tracing::debug!(items = items.len(), "Loaded product catalog");
        Ok(ProductCatalog::from_items(&items))
    }
}

/// Loader with nothing behind it
pub struct EmptyCatalog;

#[async_trait]
impl CatalogLoader for EmptyCatalog {
    async fn load(&self) -> Result<ProductCatalog> {
        Ok(ProductCatalog::default())
    }
}

/// Memoizes one load. A failed load is remembered as `None` and logged.
pub struct LazyCatalog<'a> {
    loader: &'a dyn CatalogLoader,
    cell: OnceCell<Option<ProductCatalog>>,
}

impl<'a> LazyCatalog<'a> {
    pub fn new(loader: &'a dyn CatalogLoader) -> Self {
        Self {
            loader,
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Option<&ProductCatalog> {
        self.cell
            .get_or_init(|| async {
                match self.loader.load().await {
                    Ok(catalog) => Some(catalog),
                    Err(e) => {
                        tracing::warn!(error = %e, "Product catalog unavailable");
                        None
                    }
                }
            })
            .await
            .as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}
