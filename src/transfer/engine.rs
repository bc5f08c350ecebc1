//! Transfer Engine
//!
//! Validates requests, resolves recipients, prices transfers and turns each
//! money movement into one [`PostingBatch`]. Checks done here against a
//! freshly read balance are a fast path for clear error messages; the store
//! repeats them under its lock, which is what actually guarantees a balance
//! never goes negative.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::error::LedgerError;
use super::resolver::{Resolution, non_blank, resolve};
use super::types::{
    AccountOpening, EstimatedArrival, MovementRequest, OpenAccountRequest, RecipientSummary,
    TransferPreview, TransferReceipt, TransferRequest,
};
use crate::account::{Account, AccountDirectory, AccountStatus, BankDetails, NewAccount};
use crate::core_types::{AccountId, TransactionId};
use crate::fee::{FeePolicy, FeeQuote};
use crate::ledger::{
    Category, CommitOutcome, Counterparty, LedgerStore, Posting, PostingBatch, Transaction,
    TransactionDraft, TransactionType, TransactionUpdate, TransferType,
};
use crate::money::{format_amount, round2, validate_amount};

/// Idempotency key under which an account's opening deposit is recorded
pub fn initial_deposit_key(account_id: AccountId) -> String {
    format!("initial-deposit:{}", account_id)
}

enum Recipient {
    Internal(Account),
    External {
        account_number: Option<String>,
        phone: Option<String>,
        bank: BankDetails,
    },
}

impl Recipient {
    fn transfer_type(&self) -> TransferType {
        match self {
            Recipient::Internal(_) => TransferType::Internal,
            Recipient::External { .. } => TransferType::External,
        }
    }

    fn summary(&self) -> RecipientSummary {
        match self {
            Recipient::Internal(account) => RecipientSummary {
                account_id: Some(account.id),
                name: Some(account.name.clone()),
                account_number: Some(account.account_number.clone()),
                phone: None,
                bank: Some(account.bank.clone()),
            },
            Recipient::External {
                account_number,
                phone,
                bank,
            } => RecipientSummary {
                account_id: None,
                name: None,
                account_number: account_number.clone(),
                phone: phone.clone(),
                bank: Some(bank.clone()),
            },
        }
    }

    /// Human label for descriptions
    fn label(&self) -> String {
        match self {
            Recipient::Internal(account) => account.name.clone(),
            Recipient::External {
                account_number,
                phone,
                bank,
            } => {
                let target = account_number.as_deref().or(phone.as_deref()).unwrap_or_default();
                format!("{} {}", bank.bank_name, target)
            }
        }
    }
}

/// A transfer that passed every check against current state
struct TransferPlan {
    sender: Account,
    recipient: Recipient,
    quote: FeeQuote,
}

pub struct TransferEngine {
    directory: Arc<dyn AccountDirectory>,
    ledger: Arc<dyn LedgerStore>,
    fees: FeePolicy,
    home_bank: BankDetails,
}

impl TransferEngine {
    pub fn new(
        directory: Arc<dyn AccountDirectory>,
        ledger: Arc<dyn LedgerStore>,
        fees: FeePolicy,
        home_bank: BankDetails,
    ) -> Self {
        Self {
            directory,
            ledger,
            fees,
            home_bank,
        }
    }

    /// Engine over a backend that implements both store traits
    pub fn with_store<S>(store: Arc<S>, fees: FeePolicy, home_bank: BankDetails) -> Self
    where
        S: AccountDirectory + LedgerStore + 'static,
    {
        Self::new(store.clone(), store, fees, home_bank)
    }

    pub fn fees(&self) -> &FeePolicy {
        &self.fees
    }

    pub fn ledger(&self) -> Arc<dyn LedgerStore> {
        self.ledger.clone()
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    pub async fn account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.directory
            .get(id)
            .await?
            .ok_or(LedgerError::AccountNotFound)
    }

    async fn active_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        let account = self.account(id).await?;
        if !account.status.can_transact() {
            debug!(account_id = id, status = %account.status, "Rejected: account not active");
            return Err(LedgerError::AccountInactive);
        }
        Ok(account)
    }

    /// Open an account and record its initial deposit, if any, as a credit.
    pub async fn open_account(
        &self,
        req: OpenAccountRequest,
    ) -> Result<AccountOpening, LedgerError> {
        let name = non_blank(Some(&req.name))
            .ok_or_else(|| LedgerError::InvalidRequest("name is required".into()))?;
        let email = non_blank(Some(&req.email))
            .filter(|e| e.contains('@'))
            .ok_or_else(|| LedgerError::InvalidRequest("a valid email is required".into()))?;
        let phone = non_blank(Some(&req.phone))
            .ok_or_else(|| LedgerError::InvalidRequest("phone is required".into()))?;

        let initial = if req.initial_deposit.is_zero() {
            None
        } else {
            Some(validate_amount(req.initial_deposit)?)
        };

        let account = self
            .directory
            .open_account(NewAccount {
                name: name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                account_number: non_blank(req.account_number.as_deref()).map(str::to_string),
                bank: req.bank.unwrap_or_else(|| self.home_bank.clone()),
            })
            .await?;
        info!(account_id = account.id, account_number = %account.account_number, "Account opened");

        let Some(amount) = initial else {
            return Ok(AccountOpening {
                account,
                initial_deposit: None,
            });
        };

        let deposit = self
            .deposit(
                account.id,
                MovementRequest {
                    amount,
                    description: Some("Initial deposit".into()),
                    category: Some(Category::Deposit),
                    idempotency_key: Some(initial_deposit_key(account.id)),
                },
            )
            .await?;

        Ok(AccountOpening {
            account: self.account(account.id).await?,
            initial_deposit: Some(deposit),
        })
    }

    pub async fn set_account_status(
        &self,
        id: AccountId,
        status: AccountStatus,
    ) -> Result<Account, LedgerError> {
        let account = self.directory.set_status(id, status).await?;
        info!(account_id = id, status = %status, "Account status changed");
        Ok(account)
    }

    // ========================================================================
    // Deposit / Withdraw
    // ========================================================================

    pub async fn deposit(
        &self,
        account_id: AccountId,
        req: MovementRequest,
    ) -> Result<Transaction, LedgerError> {
        let amount = validate_amount(req.amount)?;
        self.active_account(account_id).await?;

        let draft = TransactionDraft {
            kind: TransactionType::Credit,
            amount,
            fee: Decimal::ZERO,
            description: describe(req.description.as_deref(), || "Deposit".into()),
            category: req.category.unwrap_or(Category::Deposit),
            transfer_type: None,
            counterparty: None,
        };

        let outcome = self
            .ledger
            .apply(PostingBatch::single(account_id, draft, req.idempotency_key))
            .await?;
        let tx = single_movement(outcome, TransactionType::Credit)?;

        info!(
            account_id,
            amount = %amount,
            balance = %tx.balance,
            tx_id = %tx.id,
            "Deposit committed"
        );
        Ok(tx)
    }

    pub async fn withdraw(
        &self,
        account_id: AccountId,
        req: MovementRequest,
    ) -> Result<Transaction, LedgerError> {
        let amount = validate_amount(req.amount)?;
        let account = self.active_account(account_id).await?;

        // Replays are decided by the store, so only fail fast without a key
        if req.idempotency_key.is_none() && account.balance < amount {
            warn!(account_id, balance = %account.balance, amount = %amount, "Withdrawal rejected: insufficient balance");
            return Err(LedgerError::InsufficientBalance);
        }

        let draft = TransactionDraft {
            kind: TransactionType::Debit,
            amount,
            fee: Decimal::ZERO,
            description: describe(req.description.as_deref(), || "Withdrawal".into()),
            category: req.category.unwrap_or(Category::Withdrawal),
            transfer_type: None,
            counterparty: None,
        };

        let outcome = self
            .ledger
            .apply(PostingBatch::single(account_id, draft, req.idempotency_key))
            .await
            .inspect_err(|e| warn!(account_id, "Withdrawal rejected: {}", e))?;
        let tx = single_movement(outcome, TransactionType::Debit)?;

        info!(
            account_id,
            amount = %amount,
            balance = %tx.balance,
            tx_id = %tx.id,
            "Withdrawal committed"
        );
        Ok(tx)
    }

    // ========================================================================
    // Transfer
    // ========================================================================

    /// Steps shared by preview and commit: validate, resolve, price, check funds.
    async fn plan_transfer(
        &self,
        sender_id: AccountId,
        req: &TransferRequest,
    ) -> Result<TransferPlan, LedgerError> {
        let amount = validate_amount(req.amount)?;
        let sender = self.active_account(sender_id).await?;

        let resolution = resolve(
            self.directory.as_ref(),
            req.recipient_account_number.as_deref(),
            req.recipient_phone.as_deref(),
        )
        .await?;

        let recipient = match resolution {
            Resolution::Ambiguous(candidates) => {
                debug!(sender_id, candidates = candidates.len(), "Recipient phone is ambiguous");
                return Err(LedgerError::RecipientAmbiguous(candidates));
            }
            Resolution::Resolved(account) => {
                if account.id == sender.id {
                    return Err(LedgerError::CannotTransferToSelf);
                }
                if !account.status.can_transact() {
                    return Err(LedgerError::AccountInactive);
                }
                Recipient::Internal(account)
            }
            Resolution::NotFound => {
                let account_number =
                    non_blank(req.recipient_account_number.as_deref()).map(str::to_string);
                let phone = non_blank(req.recipient_phone.as_deref()).map(str::to_string);
                let bank = req
                    .recipient_bank
                    .clone()
                    .filter(|b| non_blank(Some(&b.bank_name)).is_some());

                match bank {
                    Some(bank) if account_number.is_some() || phone.is_some() => {
                        Recipient::External {
                            account_number,
                            phone,
                            bank,
                        }
                    }
                    _ => return Err(LedgerError::MissingExternalBankDetails),
                }
            }
        };

        let quote = self
            .fees
            .quote(amount, recipient.transfer_type() == TransferType::Internal);

        if sender.balance < quote.total_debit {
            warn!(
                sender_id,
                balance = %sender.balance,
                total_debit = %quote.total_debit,
                "Transfer rejected: insufficient balance"
            );
            return Err(LedgerError::InsufficientBalance);
        }

        Ok(TransferPlan {
            sender,
            recipient,
            quote,
        })
    }

    /// Read-only preview of [`Self::transfer`]: same checks, same fee, no writes.
    pub async fn preview_transfer(
        &self,
        sender_id: AccountId,
        req: &TransferRequest,
    ) -> Result<TransferPreview, LedgerError> {
        let plan = self.plan_transfer(sender_id, req).await?;
        let transfer_type = plan.recipient.transfer_type();

        Ok(TransferPreview {
            transfer_type,
            recipient: plan.recipient.summary(),
            transfer_amount: plan.quote.amount,
            processing_fee: plan.quote.fee,
            total_debit: plan.quote.total_debit,
            current_balance: plan.sender.balance,
            balance_after: round2(plan.sender.balance - plan.quote.total_debit),
            estimated_arrival: EstimatedArrival::for_type(transfer_type),
        })
    }

    pub async fn transfer(
        &self,
        sender_id: AccountId,
        req: TransferRequest,
    ) -> Result<TransferReceipt, LedgerError> {
        if let Some(replay) = self.replayed_transfer(sender_id, &req).await? {
            return Ok(replay);
        }

        let plan = self.plan_transfer(sender_id, &req).await?;
        let TransferPlan {
            sender,
            recipient,
            quote,
        } = plan;
        let transfer_type = recipient.transfer_type();

        let mut description = describe(req.description.as_deref(), || {
            format!("Transfer to {}", recipient.label())
        });
        let recorded_amount = match transfer_type {
            TransferType::Internal => quote.amount,
            TransferType::External => {
                description = format!(
                    "{} (includes processing fee {})",
                    description,
                    format_amount(quote.fee)
                );
                quote.total_debit
            }
        };

        let summary = recipient.summary();
        let mut postings = vec![Posting {
            account_id: sender.id,
            draft: TransactionDraft {
                kind: TransactionType::Debit,
                amount: recorded_amount,
                fee: quote.fee,
                description,
                category: Category::Transfer,
                transfer_type: Some(transfer_type),
                counterparty: Some(Counterparty {
                    account_id: summary.account_id,
                    account_number: summary.account_number,
                    phone: summary.phone,
                    name: summary.name,
                    bank: summary.bank,
                }),
            },
        }];

        if let Recipient::Internal(ref account) = recipient {
            postings.push(Posting {
                account_id: account.id,
                draft: TransactionDraft {
                    kind: TransactionType::Credit,
                    amount: quote.amount,
                    fee: Decimal::ZERO,
                    description: format!("Transfer from {}", sender.name),
                    category: Category::Transfer,
                    transfer_type: Some(TransferType::Internal),
                    counterparty: Some(Counterparty {
                        account_id: Some(sender.id),
                        account_number: Some(sender.account_number.clone()),
                        phone: None,
                        name: Some(sender.name.clone()),
                        bank: Some(sender.bank.clone()),
                    }),
                },
            });
        }

        let batch = PostingBatch {
            initiator: sender.id,
            idempotency_key: req.idempotency_key.clone(),
            postings,
        };

        let outcome = self
            .ledger
            .apply(batch)
            .await
            .inspect_err(|e| warn!(sender_id, "Transfer rejected at commit: {}", e))?;
        let replayed = outcome.is_replay();
        let mut txs = outcome.into_transactions().into_iter();
        let sender_tx = txs
            .next()
            .ok_or_else(|| LedgerError::System("store returned no transactions".into()))?;
        let recipient_tx = txs.next();

        info!(
            sender_id,
            recipient = ?summary_id(&recipient),
            transfer_type = %transfer_type,
            amount = %quote.amount,
            fee = %quote.fee,
            total_debit = %quote.total_debit,
            tx_id = %sender_tx.id,
            "Transfer committed"
        );

        receipt_from_record(sender_tx, recipient_tx, replayed)
    }

    /// Answer a repeated request from the ledger before re-running checks that
    /// may no longer pass because the first attempt already moved the money.
    async fn replayed_transfer(
        &self,
        sender_id: AccountId,
        req: &TransferRequest,
    ) -> Result<Option<TransferReceipt>, LedgerError> {
        let Some(key) = req.idempotency_key.as_deref() else {
            return Ok(None);
        };
        let recorded = self.ledger.find_by_idempotency_key(sender_id, key).await?;
        match recorded.into_iter().next() {
            Some(tx) => {
                debug!(sender_id, key, "Transfer replayed from ledger");
                receipt_from_record(tx, None, true).map(Some)
            }
            None => Ok(None),
        }
    }

    // ========================================================================
    // Transaction records
    // ========================================================================

    /// Owner-scoped lookup; someone else's transaction is reported as missing
    pub async fn transaction(
        &self,
        owner: AccountId,
        id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        self.ledger
            .get_transaction(id)
            .await?
            .filter(|tx| tx.user_id == owner)
            .ok_or(LedgerError::TransactionNotFound)
    }

    pub async fn update_transaction(
        &self,
        owner: AccountId,
        id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<Transaction, LedgerError> {
        if update.is_empty() {
            return Err(LedgerError::InvalidRequest(
                "nothing to update: provide description or category".into(),
            ));
        }
        let description = match update.description {
            Some(d) => Some(
                non_blank(Some(&d))
                    .map(str::to_string)
                    .ok_or_else(|| {
                        LedgerError::InvalidRequest("description cannot be empty".into())
                    })?,
            ),
            None => None,
        };

        let tx = self
            .ledger
            .update_details(
                id,
                owner,
                TransactionUpdate {
                    description,
                    category: update.category,
                },
            )
            .await?;
        debug!(owner, tx_id = %id, "Transaction details updated");
        Ok(tx)
    }
}

fn describe(given: Option<&str>, default: impl FnOnce() -> String) -> String {
    non_blank(given).map(str::to_string).unwrap_or_else(default)
}

fn summary_id(recipient: &Recipient) -> Option<AccountId> {
    match recipient {
        Recipient::Internal(account) => Some(account.id),
        Recipient::External { .. } => None,
    }
}

/// Unwrap a deposit/withdrawal outcome, rejecting keys reused across operations
fn single_movement(
    outcome: CommitOutcome,
    expected: TransactionType,
) -> Result<Transaction, LedgerError> {
    let replayed = outcome.is_replay();
    let tx = outcome
        .into_transactions()
        .into_iter()
        .next()
        .ok_or_else(|| LedgerError::System("store returned no transactions".into()))?;

    if replayed && (tx.kind != expected || tx.transfer_type.is_some()) {
        return Err(LedgerError::InvalidRequest(
            "idempotency key already used for a different operation".into(),
        ));
    }
    Ok(tx)
}

/// Build the receipt from what was actually recorded
fn receipt_from_record(
    tx: Transaction,
    recipient_tx: Option<Transaction>,
    replayed: bool,
) -> Result<TransferReceipt, LedgerError> {
    let Some(transfer_type) = tx.transfer_type else {
        return Err(LedgerError::InvalidRequest(
            "idempotency key already used for a different operation".into(),
        ));
    };

    let message = match transfer_type {
        TransferType::Internal => "Transfer completed successfully",
        TransferType::External => "External transfer initiated successfully",
    };

    Ok(TransferReceipt {
        message: message.to_string(),
        transfer_type,
        transfer_amount: round2(tx.amount - tx.fee),
        processing_fee: tx.fee,
        total_debited: tx.amount,
        estimated_arrival: EstimatedArrival::for_type(transfer_type),
        transaction: tx,
        recipient_transaction: recipient_tx,
        replayed,
    })
}
