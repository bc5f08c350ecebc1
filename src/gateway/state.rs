use std::sync::Arc;

use crate::auth::JwtAuth;
use crate::db::Database;
use crate::stats::StatisticsAggregator;
use crate::transfer::TransferEngine;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    /// Money movement and account operations
    pub engine: Arc<TransferEngine>,
    /// Read-side views (history, stats, reconciliation)
    pub stats: Arc<StatisticsAggregator>,
    /// Bearer token issue/verify
    pub auth: Arc<JwtAuth>,
    /// PostgreSQL pool (None when running on the in-memory backend)
    pub db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(
        engine: Arc<TransferEngine>,
        stats: Arc<StatisticsAggregator>,
        auth: Arc<JwtAuth>,
        db: Option<Arc<Database>>,
    ) -> Self {
        Self {
            engine,
            stats,
            auth,
            db,
        }
    }
}
