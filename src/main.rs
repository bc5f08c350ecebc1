//! Ledger Bank - personal banking ledger service
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────────┐
//! │  Config  │───▶│ Gateway  │───▶│ TransferEng. │───▶│ Ledger Store │
//! │  (YAML)  │    │ (axum)   │    │ Stats Aggr.  │    │ (PG / memory)│
//! └──────────┘    └──────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! Usage: `ledger_bank [--env dev] [--port 8080]`

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use ledger_bank::auth::JwtAuth;
use ledger_bank::config::AppConfig;
use ledger_bank::db::Database;
use ledger_bank::gateway::{self, state::AppState};
use ledger_bank::stats::StatisticsAggregator;
use ledger_bank::store::{InMemoryStore, PgStore};
use ledger_bank::transfer::TransferEngine;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = ledger_bank::logging::init_logging(&app_config);

    info!("Starting Ledger Bank in {} mode", env);

    let fees = app_config.fees.to_policy();
    let home_bank = app_config.bank.to_details();

    // Storage backend: PostgreSQL when configured, in-memory otherwise
    let (engine, stats, db) = match app_config.postgres_url.as_deref() {
        Some(url) => {
            let db = Arc::new(
                Database::connect(url)
                    .await
                    .context("Failed to connect to PostgreSQL")?,
            );
            db.migrate().await.context("Failed to apply schema")?;
            info!("✅ PostgreSQL connected and schema applied");

            let store = Arc::new(PgStore::new(db.clone()));
            let engine = TransferEngine::with_store(store.clone(), fees, home_bank);
            let stats = StatisticsAggregator::new(store.clone(), store);
            (engine, stats, Some(db))
        }
        None => {
            warn!("⚠️  postgres_url not set: using in-memory ledger (data is lost on exit)");
            let store = Arc::new(InMemoryStore::new());
            let engine = TransferEngine::with_store(store.clone(), fees, home_bank);
            let stats = StatisticsAggregator::new(store.clone(), store);
            (engine, stats, None)
        }
    };

    let state = Arc::new(AppState::new(
        Arc::new(engine),
        Arc::new(stats),
        Arc::new(JwtAuth::new(app_config.jwt_secret.clone())),
        db,
    ));

    // Gateway config from YAML, allow --port override
    let port = get_port_override().unwrap_or(app_config.gateway.port);
    gateway::run_server(&app_config.gateway.host, port, state).await
}
