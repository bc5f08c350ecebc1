//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError`: Error half of every handler result
//! - `error_codes`: Standard error code constants

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::transfer::LedgerError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: payload on success; extra detail on some errors (e.g. recipient
///   candidates when a phone number is ambiguous)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;
    pub const INVALID_AMOUNT: i32 = 1003;
    pub const CANNOT_TRANSFER_TO_SELF: i32 = 1004;
    pub const MISSING_EXTERNAL_BANK_DETAILS: i32 = 1005;
    pub const RECIPIENT_AMBIGUOUS: i32 = 1006;
    pub const ACCOUNT_INACTIVE: i32 = 1007;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;

    // Resource errors (4xxx)
    pub const ACCOUNT_NOT_FOUND: i32 = 4001;
    pub const TRANSACTION_NOT_FOUND: i32 = 4002;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
}

// ============================================================================
// Errors
// ============================================================================

/// Handler error rendered as `{code, msg, data?}` with a matching HTTP status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
    pub data: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
            data: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn unauthorized(code: i32, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            msg,
        )
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            msg,
        )
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse {
            code: self.code,
            msg: self.msg,
            data: self.data,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let code = match &e {
            LedgerError::InvalidAmount => error_codes::INVALID_AMOUNT,
            LedgerError::MissingExternalBankDetails => error_codes::MISSING_EXTERNAL_BANK_DETAILS,
            LedgerError::InvalidRequest(_) => error_codes::INVALID_PARAMETER,
            LedgerError::InsufficientBalance => error_codes::INSUFFICIENT_BALANCE,
            LedgerError::CannotTransferToSelf => error_codes::CANNOT_TRANSFER_TO_SELF,
            LedgerError::RecipientAmbiguous(_) => error_codes::RECIPIENT_AMBIGUOUS,
            LedgerError::AccountNotFound => error_codes::ACCOUNT_NOT_FOUND,
            LedgerError::AccountInactive => error_codes::ACCOUNT_INACTIVE,
            LedgerError::TransactionNotFound => error_codes::TRANSACTION_NOT_FOUND,
            LedgerError::Database(_) => error_codes::SERVICE_UNAVAILABLE,
            LedgerError::System(_) => error_codes::INTERNAL_ERROR,
        };

        // Infrastructure detail stays in the log
        if e.is_server_error() {
            error!(code = e.code(), "Ledger operation failed: {}", e);
            return Self::new(status, code, "Server error, please try again later");
        }

        let msg = e.to_string();
        match e {
            LedgerError::RecipientAmbiguous(candidates) => Self::new(status, code, msg)
                .with_data(serde_json::json!({
                    "accounts": candidates,
                    "needsAccountSelection": true,
                })),
            _ => Self::new(status, code, msg),
        }
    }
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::BankDetails;
    use crate::transfer::RecipientCandidate;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["msg"], "ok");
        assert_eq!(json["data"], 42);
    }

    #[test]
    fn test_ledger_error_mapping() {
        let err: ApiError = LedgerError::InsufficientBalance.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, error_codes::INSUFFICIENT_BALANCE);
        assert_eq!(err.msg, "Insufficient balance");

        let err: ApiError = LedgerError::TransactionNotFound.into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_ambiguous_carries_candidates() {
        let err: ApiError = LedgerError::RecipientAmbiguous(vec![RecipientCandidate {
            id: 7,
            name: "Bob".into(),
            account_number: "100000000007".into(),
            bank_details: BankDetails {
                bank_name: "Home Bank".into(),
                ..Default::default()
            },
        }])
        .into();

        assert_eq!(err.status, StatusCode::MULTIPLE_CHOICES);
        let data = err.data.unwrap();
        assert_eq!(data["needsAccountSelection"], true);
        assert_eq!(data["accounts"][0]["accountNumber"], "100000000007");
        assert_eq!(data["accounts"][0]["bankDetails"]["bankName"], "Home Bank");
    }

    #[test]
    fn test_server_errors_are_opaque() {
        let err: ApiError = LedgerError::Database("connection refused".into()).into();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.msg.contains("connection"));
    }
}
