//! Error taxonomy for walletcore operations.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::identifiers::{AccountId, AccountNumber, CustomerId, FundingSourceId};
use crate::monetary::CurrencyCode;

/// Coarse error classification exposed to calling layers, which map these
/// kinds onto their own presentation (status codes and the like).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced account, customer, funding source, or rate is absent.
    NotFound,
    /// The caller is not the owner of the resource.
    Forbidden,
    /// Business-rule violation.
    Conflict,
    /// Unexpected failure.
    Internal,
}

/// Main error type for ledger operations.
#[derive(Error, Debug)]
pub enum WalletError {
    /// Account lookup failed.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account-number lookup failed.
    #[error("Account not found for number: {0}")]
    AccountNumberNotFound(AccountNumber),

    /// Customer lookup failed.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Funding source lookup failed.
    #[error("Funding source not found: {0}")]
    FundingSourceNotFound(FundingSourceId),

    /// No rate known for the currency pair.
    #[error("No exchange rate known for {base}/{target}")]
    RateNotFound {
        base: CurrencyCode,
        target: CurrencyCode,
    },

    /// Caller is not the account owner.
    #[error("Caller {caller} is not the owner of account {account}")]
    NotOwner {
        caller: CustomerId,
        account: AccountId,
    },

    /// Amount must be strictly positive.
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Transfer source and destination are the same account.
    #[error("Cannot send money to the same account number: {0}")]
    SameAccount(AccountNumber),

    /// Account balance does not cover the operation.
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },

    /// Funding source balance does not cover the deposit.
    #[error("Insufficient funding source balance: required {required}, available {available}")]
    FundingSourceInsufficient {
        required: Decimal,
        available: Decimal,
    },

    /// Account is frozen or closed.
    #[error("Account {0} is not active")]
    AccountInactive(AccountId),

    /// Withdrawal code already recorded.
    #[error("Duplicate withdrawal code: {0}")]
    DuplicateWithdrawalCode(String),

    /// Optimistic-concurrency retries exhausted.
    #[error("Concurrent modification, retry")]
    ConcurrentModification,

    /// Withdrawal code generator exhausted its retry budget.
    #[error("Withdrawal code generation exhausted after {attempts} attempts")]
    CodeGenerationExhausted { attempts: u32 },

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// Classify this error into the four-kind taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::AccountNotFound(_)
            | WalletError::AccountNumberNotFound(_)
            | WalletError::CustomerNotFound(_)
            | WalletError::FundingSourceNotFound(_)
            | WalletError::RateNotFound { .. } => ErrorKind::NotFound,
            WalletError::NotOwner { .. } => ErrorKind::Forbidden,
            WalletError::InvalidAmount(_)
            | WalletError::SameAccount(_)
            | WalletError::InsufficientBalance { .. }
            | WalletError::FundingSourceInsufficient { .. }
            | WalletError::AccountInactive(_)
            | WalletError::DuplicateWithdrawalCode(_)
            | WalletError::ConcurrentModification => ErrorKind::Conflict,
            WalletError::CodeGenerationExhausted { .. } | WalletError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Stable error code for structured payloads.
    pub fn error_code(&self) -> &'static str {
        match self {
            WalletError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            WalletError::AccountNumberNotFound(_) => "ACCOUNT_NOT_FOUND",
            WalletError::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            WalletError::FundingSourceNotFound(_) => "FUNDING_SOURCE_NOT_FOUND",
            WalletError::RateNotFound { .. } => "RATE_NOT_FOUND",
            WalletError::NotOwner { .. } => "NOT_OWNER",
            WalletError::InvalidAmount(_) => "INVALID_AMOUNT",
            WalletError::SameAccount(_) => "SAME_ACCOUNT",
            WalletError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            WalletError::FundingSourceInsufficient { .. } => "FUNDING_SOURCE_INSUFFICIENT",
            WalletError::AccountInactive(_) => "ACCOUNT_INACTIVE",
            WalletError::DuplicateWithdrawalCode(_) => "DUPLICATE_WITHDRAWAL_CODE",
            WalletError::ConcurrentModification => "CONCURRENT_MODIFICATION",
            WalletError::CodeGenerationExhausted { .. } => "CODE_GENERATION_EXHAUSTED",
            WalletError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if the caller may usefully retry this operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::ConcurrentModification)
    }
}

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, WalletError>;
