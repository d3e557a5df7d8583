//! Application state for the console service.

use std::sync::Arc;

use common::config::AppConfig;

use crate::aggregator::StatusAggregator;
use crate::mutation::MutationEngine;
use crate::stores::{CacheStore, RelationalStore};

/// Application state shared across handlers.
///
/// Store handles are created once at startup and injected here; the engine
/// itself keeps no global state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub aggregator: StatusAggregator,
    pub mutations: MutationEngine,
}

impl AppState {
    /// `cache` is `None` when the cache subsystem is disabled.
    pub fn new(
        config: AppConfig,
        relational: Arc<dyn RelationalStore>,
        cache: Option<Arc<dyn CacheStore>>,
    ) -> Self {
        Self {
            aggregator: StatusAggregator::new(relational.clone(), cache),
            mutations: MutationEngine::new(relational),
            config,
        }
    }
}
