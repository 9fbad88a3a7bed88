//! Account definitions for the ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use walletcore_common::{AccountId, AccountNumber, CurrencyCode, CustomerId};

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    /// Account is active and can transact.
    Active,
    /// Account is frozen (no transactions allowed).
    Frozen,
    /// Account is closed.
    Closed,
}

/// A wallet account.
///
/// The balance is authoritative and mutates only through
/// [`crate::store::AccountStore::compare_and_set`]; `version` is the
/// optimistic-concurrency counter backing that contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub id: AccountId,
    /// Owning customer (weak reference; profile data lives elsewhere).
    pub customer_id: CustomerId,
    /// Human-facing account number.
    pub account_number: AccountNumber,
    /// Account currency.
    pub currency: CurrencyCode,
    /// Current balance. Never negative.
    pub balance: Decimal,
    /// Revision counter for compare-and-set.
    pub version: u64,
    /// Account status.
    pub status: AccountStatus,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new active account with a zero balance.
    pub fn new(
        customer_id: CustomerId,
        account_number: AccountNumber,
        currency: CurrencyCode,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            customer_id,
            account_number,
            currency,
            balance: Decimal::ZERO,
            version: 0,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create with an opening balance (used by account-opening flows).
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    /// Check if the account can transact.
    pub fn can_transact(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Check the balance covers `amount`.
    pub fn has_sufficient_funds(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }

    /// Check ownership.
    pub fn is_owned_by(&self, customer_id: &CustomerId) -> bool {
        self.customer_id == *customer_id
    }
}
