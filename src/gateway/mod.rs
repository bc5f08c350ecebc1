pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use anyhow::Context;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

// OpenAPI / Swagger UI
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::jwt_auth_middleware;
use state::AppState;

/// Assemble the full router: public health, bearer-protected `/api/v1`
/// routes, optional mock routes and Swagger UI.
pub fn build_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Protected Routes (bearer JWT)
    // ==========================================================================
    let transaction_routes = Router::new()
        .route(
            "/",
            post(handlers::create_transaction).get(handlers::list_transactions),
        )
        .route("/transfer", post(handlers::create_transfer))
        .route("/validate-transfer", post(handlers::validate_transfer))
        .route("/stats", get(handlers::get_stats))
        .route(
            "/{id}",
            get(handlers::get_transaction).patch(handlers::update_transaction),
        );

    let account_routes = Router::new()
        .route("/me", get(handlers::get_my_account))
        .route("/me/reconcile", get(handlers::reconcile_my_account));

    let protected = Router::new()
        .nest("/transactions", transaction_routes)
        .nest("/accounts", account_routes)
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let app = Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1", protected);

    // [SECURITY] Mock API routes - only compiled when 'mock-api' feature is enabled.
    // Production builds MUST be compiled with `--no-default-features` to exclude this.
    #[cfg(feature = "mock-api")]
    let app = app.nest(
        "/internal/mock",
        Router::new().route("/accounts", post(handlers::mock_open_account)),
    );

    app.with_state(state)
        // Stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let storage = if state.db.is_some() {
        "postgres"
    } else {
        "memory"
    };
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.with_context(|| {
        format!(
            "Failed to bind to {} (port may already be in use, check with: lsof -i :{})",
            addr, port
        )
    })?;

    info!(%addr, storage, "🚀 Gateway listening");
    info!("📖 API Docs: http://{}/docs", addr);
    #[cfg(feature = "mock-api")]
    tracing::warn!("⚠️  mock-api enabled: POST /internal/mock/accounts is reachable");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
