//! Account handlers (profile, reconciliation, dev account opening)

use std::sync::Arc;

use axum::{Extension, extract::State};

use super::super::state::AppState;
use super::super::types::{ApiResult, ok};
use crate::account::Account;
use crate::auth::AuthAccount;
use crate::stats::Reconciliation;

/// Caller's account
///
/// GET /api/v1/accounts/me
#[utoipa::path(
    get,
    path = "/api/v1/accounts/me",
    responses(
        (status = 200, description = "Account details", body = Account),
        (status = 401, description = "Authentication failed"),
        (status = 404, description = "Account no longer exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn get_my_account(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account_id)): Extension<AuthAccount>,
) -> ApiResult<Account> {
    ok(state.engine.account(account_id).await?)
}

/// Stored balance checked against the ledger
///
/// GET /api/v1/accounts/me/reconcile
#[utoipa::path(
    get,
    path = "/api/v1/accounts/me/reconcile",
    responses(
        (status = 200, description = "Reconciliation report", body = Reconciliation),
        (status = 401, description = "Authentication failed"),
        (status = 404, description = "Account no longer exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn reconcile_my_account(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account_id)): Extension<AuthAccount>,
) -> ApiResult<Reconciliation> {
    ok(state.stats.reconcile(account_id).await?)
}

// ============================================================================
// Mock API (dev/test builds only)
// ============================================================================

#[cfg(feature = "mock-api")]
pub use mock::{MockAccountResponse, OpenAccountBody, mock_open_account};

#[cfg(feature = "mock-api")]
mod mock {
    use std::sync::Arc;

    use axum::extract::State;
    use chrono::Duration;
    use serde::{Deserialize, Serialize};
    use tracing::{error, info};
    use utoipa::ToSchema;
    use validator::Validate;

    use crate::account::{Account, BankDetails};
    use crate::gateway::state::AppState;
    use crate::gateway::types::{ApiError, ApiResult, StrictDecimal, ValidatedJson, created};
    use crate::ledger::Transaction;
    use crate::transfer::OpenAccountRequest;

    /// Lifetime of tokens handed out by the mock endpoint
    const MOCK_TOKEN_TTL_HOURS: i64 = 24;

    #[derive(Debug, Deserialize, Validate, ToSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct OpenAccountBody {
        #[validate(length(min = 1, max = 100))]
        pub name: String,
        #[validate(email)]
        pub email: String,
        #[validate(length(min = 3, max = 20))]
        pub phone: String,
        #[validate(length(min = 6, max = 34))]
        pub account_number: Option<String>,
        pub bank: Option<BankDetails>,
        #[schema(value_type = Option<f64>)]
        pub initial_deposit: Option<StrictDecimal>,
    }

    #[derive(Debug, Serialize, ToSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct MockAccountResponse {
        pub account: Account,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub initial_deposit: Option<Transaction>,
        /// Bearer token for the new account
        pub token: String,
    }

    /// Open an account and hand back a bearer token for it
    ///
    /// POST /internal/mock/accounts
    pub async fn mock_open_account(
        State(state): State<Arc<AppState>>,
        ValidatedJson(body): ValidatedJson<OpenAccountBody>,
    ) -> ApiResult<MockAccountResponse> {
        let opening = state
            .engine
            .open_account(OpenAccountRequest {
                name: body.name,
                email: body.email,
                phone: body.phone,
                account_number: body.account_number,
                bank: body.bank,
                initial_deposit: body.initial_deposit.map(|d| d.inner()).unwrap_or_default(),
            })
            .await?;

        let token = state
            .auth
            .issue_token(opening.account.id, Duration::hours(MOCK_TOKEN_TTL_HOURS))
            .map_err(|e| {
                error!("Token issue failed: {}", e);
                ApiError::internal("Failed to issue token")
            })?;

        info!(account_id = opening.account.id, "[MOCK] Account opened");
        created(MockAccountResponse {
            account: opening.account,
            initial_deposit: opening.initial_deposit,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::handlers::test_support::{TestApp, d};
    use crate::transfer::MovementRequest;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_get_my_account() {
        let app = TestApp::new().await;
        let alice = app.open("alice", "75.50").await;

        let (_, body) = get_my_account(State(app.state.clone()), Extension(AuthAccount(alice.id)))
            .await
            .unwrap();
        let account = body.0.data.unwrap();
        assert_eq!(account.account_number, alice.account_number);
        assert_eq!(account.balance, d("75.50"));

        let err = get_my_account(State(app.state.clone()), Extension(AuthAccount(424242)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reconcile_after_activity() {
        let app = TestApp::new().await;
        let alice = app.open("alice", "100").await;
        app.state
            .engine
            .withdraw(alice.id, MovementRequest::new(d("33.33")))
            .await
            .unwrap();

        let (_, body) =
            reconcile_my_account(State(app.state.clone()), Extension(AuthAccount(alice.id)))
                .await
                .unwrap();
        let report = body.0.data.unwrap();
        assert!(report.consistent);
        assert_eq!(report.ledger_balance, d("66.67"));
        assert_eq!(report.transaction_count, 2);
    }

    #[cfg(feature = "mock-api")]
    #[tokio::test]
    async fn test_mock_open_account_issues_usable_token() {
        use crate::gateway::types::ValidatedJson;

        let app = TestApp::new().await;
        let (status, body) = mock_open_account(
            State(app.state.clone()),
            ValidatedJson(OpenAccountBody {
                name: "Carol".into(),
                email: "carol@example.com".into(),
                phone: "5551234".into(),
                account_number: None,
                bank: None,
                initial_deposit: Some(crate::gateway::types::StrictDecimal::from_decimal(d(
                    "20",
                ))),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let resp = body.0.data.unwrap();
        assert_eq!(resp.account.balance, d("20.00"));
        assert!(resp.initial_deposit.is_some());

        let claims = app.state.auth.verify_token(&resp.token).unwrap();
        assert_eq!(claims.account_id().unwrap(), resp.account.id);
    }
}
