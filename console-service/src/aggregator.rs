//! Status view aggregation.
//!
//! The relational and cache halves of the model are built independently: a
//! failure in one is written into its own status field and never stops the
//! other half from being built.

use std::sync::Arc;

use common::errors::AppResult;
use common::models::{CacheEntry, SourceStatus, StatusModel, TableSnapshot};

use crate::cache_snapshot::CacheSnapshotter;
use crate::discovery::{RowProjector, SchemaDiscoverer};
use crate::stores::{CacheStore, RelationalStore};

/// Builds the [`StatusModel`] for one status request.
#[derive(Clone)]
pub struct StatusAggregator {
    relational: Arc<dyn RelationalStore>,
    discoverer: SchemaDiscoverer,
    projector: RowProjector,
    cache: Option<CacheSnapshotter>,
}

impl StatusAggregator {
    /// `cache` is `None` when the cache subsystem is disabled.
    pub fn new(relational: Arc<dyn RelationalStore>, cache: Option<Arc<dyn CacheStore>>) -> Self {
        Self {
            discoverer: SchemaDiscoverer::new(relational.clone()),
            projector: RowProjector::new(relational.clone()),
            relational,
            cache: cache.map(CacheSnapshotter::new),
        }
    }

    /// Builds a fresh model. Never fails.
    pub async fn build_status_model(&self) -> StatusModel {
        let (database, tables) = self.relational_view().await;
        let (cache, cache_entries) = match &self.cache {
            Some(snapshotter) => {
                let (status, entries) = Self::cache_view(snapshotter).await;
                (Some(status), entries)
            }
            None => (None, Vec::new()),
        };

        StatusModel {
            database,
            cache,
            tables,
            cache_entries,
        }
    }

    /// Snapshot of a single table, looked up against a fresh discovery.
    ///
    /// # Errors
    /// `UnknownTable` if `name` is not a discovered table; discovery errors
    /// are returned as is. Projection failures stay inside the snapshot.
    pub async fn table_snapshot(&self, name: &str) -> AppResult<TableSnapshot> {
        let catalog = self.discoverer.list_tables().await?;
        let table = catalog.resolve(name)?.clone();
        Ok(self.projector.project_table(table).await)
    }

    async fn relational_view(&self) -> (SourceStatus, Vec<TableSnapshot>) {
        if let Err(e) = self.relational.ping().await {
            tracing::error!(error = %e, "relational store unreachable");
            return (SourceStatus::error(e), Vec::new());
        }

        let catalog = match self.discoverer.list_tables().await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!(error = %e, "table discovery failed");
                return (SourceStatus::error(e), Vec::new());
            }
        };

        if catalog.is_empty() {
            tracing::info!("no user tables in the current schema");
        }

        // Sequential on purpose: snapshots come out in discovery order.
        let mut tables = Vec::with_capacity(catalog.len());
        for table in catalog {
            tables.push(self.projector.project_table(table).await);
        }

        (SourceStatus::Ok, tables)
    }

    async fn cache_view(snapshotter: &CacheSnapshotter) -> (SourceStatus, Vec<CacheEntry>) {
        match snapshotter.snapshot_cache().await {
            Ok(entries) => (SourceStatus::Ok, entries),
            Err(e) => {
                tracing::error!(error = %e, "cache snapshot failed");
                (SourceStatus::error(e), Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::errors::AppError;
    use common::models::{CacheValue, Row};

    use crate::stores::memory::{MemoryCache, MemoryStore};

    fn shop() -> MemoryStore {
        MemoryStore::new()
            .with_table("users", &[("id", "int4"), ("email", "text")])
            .with_table("orders", &[("id", "int4"), ("item", "text")])
            .with_row("orders", Row::new().with("id", 1_i64).with("item", "pen"))
            .with_row("orders", Row::new().with("id", 2_i64).with("item", "ink"))
    }

    #[tokio::test]
    async fn test_one_snapshot_per_table_in_discovery_order() {
        let store = MemoryStore::new()
            .with_table("zeta", &[("id", "int4")])
            .with_table("alpha", &[("id", "int4")])
            .with_table("mid", &[("id", "int4")]);
        let model = StatusAggregator::new(Arc::new(store), None)
            .build_status_model()
            .await;

        let names: Vec<_> = model.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn test_users_empty_orders_two_rows_cache_disabled() {
        let model = StatusAggregator::new(Arc::new(shop()), None)
            .build_status_model()
            .await;

        assert_eq!(model.database, SourceStatus::Ok);
        assert!(!model.cache_enabled());
        assert!(model.table("users").unwrap().is_empty());
        assert_eq!(model.table("orders").unwrap().rows.len(), 2);
        assert!(model.cache_entries.is_empty());
    }

    #[tokio::test]
    async fn test_relational_outage_keeps_cache_half() {
        let cache = MemoryCache::new().with("a", "1").with("b", "2");
        let model = StatusAggregator::new(
            Arc::new(MemoryStore::unreachable()),
            Some(Arc::new(cache)),
        )
        .build_status_model()
        .await;

        assert!(matches!(model.database, SourceStatus::Error(_)));
        assert!(model.tables.is_empty());
        assert_eq!(model.cache, Some(SourceStatus::Ok));
        assert_eq!(
            model.cache_entries,
            vec![
                CacheEntry::new("a", CacheValue::Value("1".into())),
                CacheEntry::new("b", CacheValue::Value("2".into())),
            ]
        );
    }

    #[tokio::test]
    async fn test_cache_outage_keeps_relational_half() {
        let model = StatusAggregator::new(
            Arc::new(shop()),
            Some(Arc::new(MemoryCache::unreachable())),
        )
        .build_status_model()
        .await;

        assert_eq!(model.database, SourceStatus::Ok);
        assert_eq!(model.tables.len(), 2);
        assert!(matches!(model.cache, Some(SourceStatus::Error(_))));
        assert!(model.cache_entries.is_empty());
    }

    #[tokio::test]
    async fn test_single_table_snapshot() {
        let aggregator = StatusAggregator::new(Arc::new(shop()), None);

        let orders = aggregator.table_snapshot("orders").await.unwrap();
        assert_eq!(orders.rows.len(), 2);
        assert!(orders.status.is_ok());

        assert!(matches!(
            aggregator.table_snapshot("pg_authid").await,
            Err(AppError::UnknownTable(_))
        ));
        assert!(matches!(
            StatusAggregator::new(Arc::new(MemoryStore::unreachable()), None)
                .table_snapshot("orders")
                .await,
            Err(AppError::Connectivity(_))
        ));
    }

    #[tokio::test]
    async fn test_broken_table_does_not_hide_others() {
        let store = shop().with_broken_table("users");
        let model = StatusAggregator::new(Arc::new(store), None)
            .build_status_model()
            .await;

        assert_eq!(model.database, SourceStatus::Ok);
        assert!(!model.table("users").unwrap().status.is_ok());
        assert!(model.table("orders").unwrap().status.is_ok());
    }
}
