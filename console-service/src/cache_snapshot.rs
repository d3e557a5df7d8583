//! Cache snapshotting.

use std::sync::Arc;

use common::errors::{AppError, AppResult};
use common::models::{CacheEntry, CacheValue};

use crate::stores::CacheStore;

/// Pattern used to enumerate keys; the console shows everything.
const ALL_KEYS: &str = "*";

/// Reads every key of the cache store with its current value.
///
/// Only constructed when the cache is enabled in configuration.
#[derive(Clone)]
pub struct CacheSnapshotter {
    store: Arc<dyn CacheStore>,
}

impl CacheSnapshotter {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Snapshot of all keys, sorted by key.
    ///
    /// Values are fetched after enumeration, so a key removed in between
    /// shows up as [`CacheValue::Vanished`]. A key whose value cannot be read
    /// is reported on its own entry without failing the snapshot. Keys and
    /// values that are not UTF-8 are shown with replacement characters.
    ///
    /// # Errors
    /// `CacheUnavailable` if PING fails, `CacheOperation` if enumeration fails.
    pub async fn snapshot_cache(&self) -> AppResult<Vec<CacheEntry>> {
        self.store.ping().await.map_err(|e| match e {
            unavailable @ AppError::CacheUnavailable(_) => unavailable,
            other => AppError::CacheUnavailable(other.to_string()),
        })?;

        let mut keys = self.store.keys(ALL_KEYS).await?;
        keys.sort();

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let label = display_text(&key);
            let value = match self.store.get(&key).await {
                Ok(Some(value)) => CacheValue::Value(display_text(&value)),
                Ok(None) => CacheValue::Vanished,
                Err(e) => {
                    tracing::warn!(key = %label, error = %e, "cache value unreadable");
                    CacheValue::Unreadable(e.to_string())
                }
            };
            entries.push(CacheEntry::new(label, value));
        }

        tracing::debug!(keys = entries.len(), "cache snapshot taken");
        Ok(entries)
    }
}

fn display_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
