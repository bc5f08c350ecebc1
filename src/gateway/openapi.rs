//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::{Account, AccountStatus, BankDetails};
use crate::gateway::handlers::{
    CreateTransactionRequest, HealthResponse, TransferBody, UpdateTransactionRequest,
};
use crate::ledger::{
    Category, Counterparty, Transaction, TransactionPage, TransactionType, TransferType,
};
use crate::stats::{Reconciliation, StatsPeriod, TransactionStats};
use crate::transfer::{
    EstimatedArrival, RecipientCandidate, RecipientSummary, TransferPreview, TransferReceipt,
};

/// JWT bearer authentication security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Authorization: Bearer {token}"))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ledger Bank API",
        version = "1.0.0",
        description = "Personal banking ledger: deposits, withdrawals, internal and external transfers.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::transactions::create_transaction,
        crate::gateway::handlers::transactions::list_transactions,
        crate::gateway::handlers::transactions::get_stats,
        crate::gateway::handlers::transactions::get_transaction,
        crate::gateway::handlers::transactions::update_transaction,
        crate::gateway::handlers::transfer::create_transfer,
        crate::gateway::handlers::transfer::validate_transfer,
        crate::gateway::handlers::account::get_my_account,
        crate::gateway::handlers::account::reconcile_my_account,
    ),
    components(
        schemas(
            HealthResponse,
            Account,
            AccountStatus,
            BankDetails,
            Transaction,
            TransactionType,
            TransferType,
            Category,
            Counterparty,
            TransactionPage,
            CreateTransactionRequest,
            UpdateTransactionRequest,
            TransferBody,
            TransferReceipt,
            TransferPreview,
            RecipientSummary,
            RecipientCandidate,
            EstimatedArrival,
            TransactionStats,
            StatsPeriod,
            Reconciliation,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Transactions", description = "Deposits, withdrawals and history (auth required)"),
        (name = "Transfer", description = "Internal and external transfers (auth required)"),
        (name = "Account", description = "Account queries (auth required)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;
