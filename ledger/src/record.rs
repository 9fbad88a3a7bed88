//! Immutable ledger records and the append-only record store.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use walletcore_common::{epoch_millis, AccountId, RecordId, Result, WalletError};

use crate::withdrawal::WithdrawalCode;

/// Type of money-movement operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Funds credited from a funding source.
    Deposit,
    /// Funds debited for cash redemption.
    Withdraw,
    /// Funds moved between two accounts.
    Transfer,
}

impl TransactionType {
    /// Stable name for payloads and filters.
    pub fn name(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdraw => "WITHDRAW",
            TransactionType::Transfer => "TRANSFER",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An immutable audit entry for one completed operation.
///
/// Amounts are denominated in the source/sender currency. Created exactly
/// once per successful operation, never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Unique, time-ordered record id.
    pub id: RecordId,
    /// Operation type.
    pub transaction_type: TransactionType,
    /// Amount moved, in the source currency.
    pub amount: Decimal,
    /// Fee attached to the operation (informational for deposits).
    pub fee: Decimal,
    /// Source account, when the operation debits one.
    pub source_account: Option<AccountId>,
    /// Destination account, when the operation credits one.
    pub destination_account: Option<AccountId>,
    /// Redemption code, for withdrawals.
    pub withdrawal_code: Option<WithdrawalCode>,
    /// Wall clock at commit, epoch milliseconds.
    pub timestamp_millis: i64,
}

impl LedgerRecord {
    /// Build a deposit record.
    pub fn deposit(amount: Decimal, fee: Decimal, destination: AccountId) -> Self {
        Self {
            id: RecordId::new(),
            transaction_type: TransactionType::Deposit,
            amount,
            fee,
            source_account: None,
            destination_account: Some(destination),
            withdrawal_code: None,
            timestamp_millis: epoch_millis(),
        }
    }

    /// Build a transfer record.
    pub fn transfer(
        amount: Decimal,
        fee: Decimal,
        source: AccountId,
        destination: AccountId,
    ) -> Self {
        Self {
            id: RecordId::new(),
            transaction_type: TransactionType::Transfer,
            amount,
            fee,
            source_account: Some(source),
            destination_account: Some(destination),
            withdrawal_code: None,
            timestamp_millis: epoch_millis(),
        }
    }

    /// Build a withdrawal record.
    pub fn withdrawal(amount: Decimal, source: AccountId, code: WithdrawalCode) -> Self {
        Self {
            id: RecordId::new(),
            transaction_type: TransactionType::Withdraw,
            amount,
            fee: Decimal::ZERO,
            source_account: Some(source),
            destination_account: None,
            withdrawal_code: Some(code),
            timestamp_millis: epoch_millis(),
        }
    }
}

/// Append-only store of ledger records.
///
/// Enforces withdrawal-code uniqueness at append time; the code index and
/// the log are kept consistent under the append path.
#[derive(Default)]
pub struct RecordStore {
    records: RwLock<Vec<LedgerRecord>>,
    codes: DashMap<WithdrawalCode, RecordId>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Fails with `DuplicateWithdrawalCode` if the
    /// record carries a code that was already issued.
    pub fn append(&self, record: LedgerRecord) -> Result<LedgerRecord> {
        if let Some(code) = &record.withdrawal_code {
            match self.codes.entry(code.clone()) {
                Entry::Occupied(_) => {
                    return Err(WalletError::DuplicateWithdrawalCode(code.to_string()));
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(record.id);
                }
            }
        }

        self.records.write().push(record.clone());
        Ok(record)
    }

    /// Check whether a withdrawal code has already been issued.
    pub fn code_exists(&self, code: &WithdrawalCode) -> bool {
        self.codes.contains_key(code)
    }

    /// Snapshot the full log, ordered by append (and therefore by
    /// timestamp, record ids being time-ordered).
    pub fn snapshot(&self) -> Vec<LedgerRecord> {
        self.records.read().clone()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
