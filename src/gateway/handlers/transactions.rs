//! Transaction handlers (deposit/withdraw, history, stats, record edits)

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::super::state::AppState;
use super::super::types::{
    ApiError, ApiQuery, ApiResult, StrictDecimal, ValidatedJson, created, ok,
};
use crate::auth::AuthAccount;
use crate::core_types::TransactionId;
use crate::ledger::{
    Category, PageRequest, Transaction, TransactionFilter, TransactionPage, TransactionType,
    TransactionUpdate,
};
use crate::stats::{StatsPeriod, TransactionStats};
use crate::transfer::MovementRequest;

/// Deposit (`type: credit`) or withdrawal (`type: debit`)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Positive, at most 2 decimal places
    #[schema(value_type = f64, example = 250.0)]
    pub amount: StrictDecimal,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    pub category: Option<Category>,
    /// Resubmitting with the same key returns the original record
    #[validate(length(min = 1, max = 64))]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionListQuery {
    /// credit | debit
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub category: Option<Category>,
    /// Inclusive lower bound (RFC 3339)
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound (RFC 3339)
    pub to: Option<DateTime<Utc>>,
    /// 1-based, default 1
    pub page: Option<u32>,
    /// Default 20, max 100
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// week | month | year (default month)
    pub period: Option<StatsPeriod>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    #[validate(length(min = 1, max = 255))]
    pub description: Option<String>,
    pub category: Option<Category>,
}

fn parse_transaction_id(raw: &str) -> Result<TransactionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid transaction id: {}", raw)))
}

/// Record a deposit or withdrawal
///
/// POST /api/v1/transactions
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = Transaction),
        (status = 400, description = "Invalid amount or insufficient balance"),
        (status = 401, description = "Authentication failed"),
        (status = 403, description = "Account not active")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account_id)): Extension<AuthAccount>,
    ValidatedJson(req): ValidatedJson<CreateTransactionRequest>,
) -> ApiResult<Transaction> {
    let movement = MovementRequest {
        amount: req.amount.inner(),
        description: req.description,
        category: req.category,
        idempotency_key: req.idempotency_key,
    };

    let tx = match req.kind {
        TransactionType::Credit => state.engine.deposit(account_id, movement).await?,
        TransactionType::Debit => state.engine.withdraw(account_id, movement).await?,
    };
    created(tx)
}

/// Caller's transaction history, newest first
///
/// GET /api/v1/transactions
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    params(TransactionListQuery),
    responses(
        (status = 200, description = "One page of transactions", body = TransactionPage),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account_id)): Extension<AuthAccount>,
    ApiQuery(query): ApiQuery<TransactionListQuery>,
) -> ApiResult<TransactionPage> {
    let filter = TransactionFilter {
        kind: query.kind,
        category: query.category,
        from: query.from,
        to: query.to,
        ..TransactionFilter::for_user(account_id)
    };
    let page = PageRequest::new(query.page, query.limit);

    ok(state.stats.get_user_transactions(&filter, page).await?)
}

/// Credit/debit totals over a rolling window
///
/// GET /api/v1/transactions/stats?period=month
#[utoipa::path(
    get,
    path = "/api/v1/transactions/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Period statistics", body = TransactionStats),
        (status = 400, description = "Invalid period"),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account_id)): Extension<AuthAccount>,
    ApiQuery(query): ApiQuery<StatsQuery>,
) -> ApiResult<TransactionStats> {
    let period = query.period.unwrap_or_default();
    ok(state.stats.get_stats(account_id, period).await?)
}

/// GET /api/v1/transactions/{id}
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{id}",
    params(
        ("id" = String, Path, description = "Transaction ID (ULID)")
    ),
    responses(
        (status = 200, description = "Transaction", body = Transaction),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Not found or owned by someone else")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account_id)): Extension<AuthAccount>,
    Path(id): Path<String>,
) -> ApiResult<Transaction> {
    let id = parse_transaction_id(&id)?;
    ok(state.engine.transaction(account_id, id).await?)
}

/// Edit description and/or category of an owned transaction
///
/// PATCH /api/v1/transactions/{id}
#[utoipa::path(
    patch,
    path = "/api/v1/transactions/{id}",
    params(
        ("id" = String, Path, description = "Transaction ID (ULID)")
    ),
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Updated transaction", body = Transaction),
        (status = 400, description = "Nothing to update"),
        (status = 404, description = "Not found or owned by someone else")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account_id)): Extension<AuthAccount>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateTransactionRequest>,
) -> ApiResult<Transaction> {
    let id = parse_transaction_id(&id)?;
    let update = TransactionUpdate {
        description: req.description,
        category: req.category,
    };
    ok(state.engine.update_transaction(account_id, id, update).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::handlers::test_support::{TestApp, d};
    use crate::gateway::types::error_codes;
    use axum::http::StatusCode;

    fn movement(kind: TransactionType, amount: &str) -> CreateTransactionRequest {
        CreateTransactionRequest {
            kind,
            amount: StrictDecimal::from_decimal(d(amount)),
            description: None,
            category: None,
            idempotency_key: None,
        }
    }

    #[tokio::test]
    async fn test_deposit_and_withdraw() {
        let app = TestApp::new().await;
        let alice = app.open("alice", "1000").await;

        let (status, body) = create_transaction(
            State(app.state.clone()),
            Extension(AuthAccount(alice.id)),
            ValidatedJson(movement(TransactionType::Credit, "250")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.0.data.unwrap().balance, d("1250.00"));

        let (_, body) = create_transaction(
            State(app.state.clone()),
            Extension(AuthAccount(alice.id)),
            ValidatedJson(movement(TransactionType::Debit, "50.50")),
        )
        .await
        .unwrap();
        let tx = body.0.data.unwrap();
        assert_eq!(tx.kind, TransactionType::Debit);
        assert_eq!(tx.balance, d("1199.50"));
    }

    #[tokio::test]
    async fn test_overdraft_is_rejected() {
        let app = TestApp::new().await;
        let alice = app.open("alice", "10").await;

        let err = create_transaction(
            State(app.state.clone()),
            Extension(AuthAccount(alice.id)),
            ValidatedJson(movement(TransactionType::Debit, "10.01")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, error_codes::INSUFFICIENT_BALANCE);
    }

    #[tokio::test]
    async fn test_list_with_filter_and_paging() {
        let app = TestApp::new().await;
        let alice = app.open("alice", "1000").await;
        for amount in ["1", "2", "3"] {
            create_transaction(
                State(app.state.clone()),
                Extension(AuthAccount(alice.id)),
                ValidatedJson(movement(TransactionType::Debit, amount)),
            )
            .await
            .unwrap();
        }

        let (_, body) = list_transactions(
            State(app.state.clone()),
            Extension(AuthAccount(alice.id)),
            ApiQuery(TransactionListQuery {
                kind: Some(TransactionType::Debit),
                limit: Some(2),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        let page = body.0.data.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.transactions.len(), 2);
        assert_eq!(page.transactions[0].amount, d("3"));
    }

    #[tokio::test]
    async fn test_stats_default_period() {
        let app = TestApp::new().await;
        let alice = app.open("alice", "500").await;

        let (_, body) = get_stats(
            State(app.state.clone()),
            Extension(AuthAccount(alice.id)),
            ApiQuery(StatsQuery::default()),
        )
        .await
        .unwrap();
        let stats = body.0.data.unwrap();
        assert_eq!(stats.period, StatsPeriod::Month);
        assert_eq!(stats.total_credits, d("500.00"));
    }

    #[tokio::test]
    async fn test_get_and_patch_are_owner_scoped() {
        let app = TestApp::new().await;
        let alice = app.open("alice", "100").await;
        let bob = app.open("bob", "100").await;

        let (_, body) = list_transactions(
            State(app.state.clone()),
            Extension(AuthAccount(alice.id)),
            ApiQuery(TransactionListQuery::default()),
        )
        .await
        .unwrap();
        let tx_id = body.0.data.unwrap().transactions[0].id.to_string();

        let (_, body) = update_transaction(
            State(app.state.clone()),
            Extension(AuthAccount(alice.id)),
            Path(tx_id.clone()),
            ValidatedJson(UpdateTransactionRequest {
                description: Some("Paycheck".into()),
                category: Some(Category::Salary),
            }),
        )
        .await
        .unwrap();
        let tx = body.0.data.unwrap();
        assert_eq!(tx.description, "Paycheck");
        assert_eq!(tx.category, Category::Salary);

        let err = get_transaction(
            State(app.state.clone()),
            Extension(AuthAccount(bob.id)),
            Path(tx_id),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = get_transaction(
            State(app.state.clone()),
            Extension(AuthAccount(alice.id)),
            Path("garbage".into()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, error_codes::INVALID_PARAMETER);
    }
}
