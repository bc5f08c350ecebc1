//! Transfer handlers (commit and preview)

use std::sync::Arc;

use axum::{Extension, extract::State};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use super::super::state::AppState;
use super::super::types::{ApiResult, StrictDecimal, ValidatedJson, created, ok};
use crate::account::BankDetails;
use crate::auth::AuthAccount;
use crate::transfer::{TransferPreview, TransferReceipt, TransferRequest};

/// Transfer request body
///
/// Exactly one of `recipientAccount` / `recipientPhone` is normally given;
/// the account number wins when both are. `recipientBank` is required when
/// the recipient does not hold an account here.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferBody {
    #[validate(length(max = 34))]
    pub recipient_account: Option<String>,
    #[validate(length(max = 20))]
    pub recipient_phone: Option<String>,
    pub recipient_bank: Option<BankDetails>,
    #[schema(value_type = f64, example = 100.0)]
    pub amount: StrictDecimal,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub idempotency_key: Option<String>,
}

impl From<TransferBody> for TransferRequest {
    fn from(body: TransferBody) -> Self {
        TransferRequest {
            recipient_account_number: body.recipient_account,
            recipient_phone: body.recipient_phone,
            recipient_bank: body.recipient_bank,
            amount: body.amount.inner(),
            description: body.description,
            idempotency_key: body.idempotency_key,
        }
    }
}

/// Send money to an internal or external recipient
///
/// POST /api/v1/transactions/transfer
///
/// A phone number shared by several accounts answers 300 with the candidate
/// accounts in `data.accounts`; resubmit with `recipientAccount`.
#[utoipa::path(
    post,
    path = "/api/v1/transactions/transfer",
    request_body = TransferBody,
    responses(
        (status = 201, description = "Transfer committed", body = TransferReceipt),
        (status = 300, description = "Phone number matches several accounts"),
        (status = 400, description = "Invalid amount, insufficient balance or self transfer"),
        (status = 401, description = "Authentication failed"),
        (status = 403, description = "Sender or recipient not active")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account_id)): Extension<AuthAccount>,
    ValidatedJson(body): ValidatedJson<TransferBody>,
) -> ApiResult<TransferReceipt> {
    info!(account_id, amount = %body.amount.inner(), "Transfer request");
    let receipt = state.engine.transfer(account_id, body.into()).await?;
    if receipt.replayed {
        return ok(receipt);
    }
    created(receipt)
}

/// Dry run of a transfer: same checks and fee, nothing written
///
/// POST /api/v1/transactions/validate-transfer
#[utoipa::path(
    post,
    path = "/api/v1/transactions/validate-transfer",
    request_body = TransferBody,
    responses(
        (status = 200, description = "Transfer would succeed", body = TransferPreview),
        (status = 300, description = "Phone number matches several accounts"),
        (status = 400, description = "Transfer would be rejected"),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfer"
)]
pub async fn validate_transfer(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account_id)): Extension<AuthAccount>,
    ValidatedJson(body): ValidatedJson<TransferBody>,
) -> ApiResult<TransferPreview> {
    let req: TransferRequest = body.into();
    ok(state.engine.preview_transfer(account_id, &req).await?)
}
