//! Authoritative in-process stores for accounts, funding sources, and
//! currency records.
//!
//! Balance mutation goes exclusively through compare-and-set: the caller
//! reads an account, computes the new balance, and commits against the
//! version it read. A `false` return means another writer got there first
//! and the whole operation must be retried from re-read.

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use walletcore_common::{
    AccountId, AccountNumber, Currency, CurrencyCode, FundingSourceId, Result, WalletError,
};

use crate::account::Account;

/// Keyed store of wallet accounts with optimistic versioning.
#[derive(Default)]
pub struct AccountStore {
    accounts: DashMap<AccountId, Account>,
    by_number: DashMap<AccountNumber, AccountId>,
}

impl AccountStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new account. Returns the stored account.
    pub fn insert(&self, account: Account) -> Account {
        self.by_number
            .insert(account.account_number.clone(), account.id);
        self.accounts.insert(account.id, account.clone());
        account
    }

    /// Look up an account by id.
    pub fn get(&self, id: &AccountId) -> Result<Account> {
        self.accounts
            .get(id)
            .map(|a| a.clone())
            .ok_or(WalletError::AccountNotFound(*id))
    }

    /// Look up an account by its human-facing number.
    pub fn find_by_number(&self, number: &AccountNumber) -> Result<Account> {
        let id = self
            .by_number
            .get(number)
            .map(|id| *id)
            .ok_or_else(|| WalletError::AccountNumberNotFound(number.clone()))?;
        self.get(&id)
    }

    /// Atomically replace the balance if the stored version still matches
    /// `expected_version`. Returns `Ok(false)` on a version mismatch.
    ///
    /// Rejects negative balances; callers validate sufficiency before
    /// committing here.
    pub fn compare_and_set(
        &self,
        id: &AccountId,
        expected_version: u64,
        new_balance: Decimal,
    ) -> Result<bool> {
        if new_balance < Decimal::ZERO {
            return Err(WalletError::Internal(format!(
                "refusing negative balance {new_balance} for account {id}"
            )));
        }

        let mut account = self
            .accounts
            .get_mut(id)
            .ok_or(WalletError::AccountNotFound(*id))?;

        if account.version != expected_version {
            debug!(
                account = %id,
                expected = expected_version,
                actual = account.version,
                "Balance CAS lost the race"
            );
            return Ok(false);
        }

        account.balance = new_balance;
        account.version += 1;
        account.updated_at = Utc::now();
        Ok(true)
    }

    /// Number of stored accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// An external balance pool debited on deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingSource {
    /// Unique funding source identifier.
    pub id: FundingSourceId,
    /// Display name of the pool.
    pub name: String,
    /// Current balance. Never negative.
    pub balance: Decimal,
    /// Revision counter for compare-and-set.
    pub version: u64,
}

impl FundingSource {
    /// Create a new funding source.
    pub fn new(name: impl Into<String>, balance: Decimal) -> Self {
        Self {
            id: FundingSourceId::new(),
            name: name.into(),
            balance,
            version: 0,
        }
    }
}

/// Keyed store of funding sources, same CAS contract as accounts.
#[derive(Default)]
pub struct FundingSourceStore {
    sources: DashMap<FundingSourceId, FundingSource>,
}

impl FundingSourceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new funding source. Returns the stored source.
    pub fn insert(&self, source: FundingSource) -> FundingSource {
        self.sources.insert(source.id, source.clone());
        source
    }

    /// Look up a funding source by id.
    pub fn get(&self, id: &FundingSourceId) -> Result<FundingSource> {
        self.sources
            .get(id)
            .map(|s| s.clone())
            .ok_or(WalletError::FundingSourceNotFound(*id))
    }

    /// Atomically replace the balance if the version still matches.
    /// Returns `Ok(false)` on a version mismatch.
    pub fn compare_and_set(
        &self,
        id: &FundingSourceId,
        expected_version: u64,
        new_balance: Decimal,
    ) -> Result<bool> {
        if new_balance < Decimal::ZERO {
            return Err(WalletError::Internal(format!(
                "refusing negative balance {new_balance} for funding source {id}"
            )));
        }

        let mut source = self
            .sources
            .get_mut(id)
            .ok_or(WalletError::FundingSourceNotFound(*id))?;

        if source.version != expected_version {
            return Ok(false);
        }

        source.balance = new_balance;
        source.version += 1;
        Ok(true)
    }
}

/// Idempotent get-or-create registry of currency records.
///
/// Concurrent callers for the same code always converge on a single
/// record; the enumerated code is the uniqueness key.
#[derive(Default)]
pub struct CurrencyRegistry {
    currencies: DashMap<CurrencyCode, Currency>,
}

impl CurrencyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the existing record for `code`, creating it on first use.
    pub fn get_or_create(&self, code: CurrencyCode) -> Currency {
        self.currencies
            .entry(code)
            .or_insert_with(|| Currency::of(code))
            .clone()
    }

    /// Number of distinct currency records created so far.
    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    /// Whether no currency has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}
