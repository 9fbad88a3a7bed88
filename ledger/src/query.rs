//! Read-only, paginated access over recorded transactions.
//!
//! The query service reads the ledger independently and never touches
//! the balance stores.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use walletcore_common::{AccountId, AccountNumber, CurrencyCode, CustomerId};

use crate::record::{LedgerRecord, RecordStore, TransactionType};
use crate::store::{AccountStore, CurrencyRegistry};

/// Lookup seam for customer display names, owned by the external profile
/// service.
pub trait CustomerDirectory: Send + Sync {
    /// First name for a customer, if known.
    fn first_name(&self, customer_id: &CustomerId) -> Option<String>;
}

/// In-memory directory, the in-process stand-in for the profile service.
#[derive(Default)]
pub struct InMemoryCustomerDirectory {
    names: dashmap::DashMap<CustomerId, String>,
}

impl InMemoryCustomerDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a customer's first name.
    pub fn register(&self, customer_id: CustomerId, first_name: impl Into<String>) {
        self.names.insert(customer_id, first_name.into());
    }
}

impl CustomerDirectory for InMemoryCustomerDirectory {
    fn first_name(&self, customer_id: &CustomerId) -> Option<String> {
        self.names.get(customer_id).map(|n| n.clone())
    }
}

/// Filter over the transaction history. All provided fields must match
/// (AND semantics); absent fields match everything.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Case-insensitive substring match on the source account holder's
    /// first name.
    pub counterparty_name: Option<String>,
    /// Exact operation type.
    pub transaction_type: Option<TransactionType>,
    /// Inclusive lower bound, epoch milliseconds.
    pub from_millis: Option<i64>,
    /// Inclusive upper bound, epoch milliseconds.
    pub to_millis: Option<i64>,
}

/// One side of a recorded transaction, resolved for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterpartyDetail {
    /// Account holder's first name, when the directory knows it.
    pub first_name: Option<String>,
    /// Account number.
    pub account_number: AccountNumber,
    /// Currency code.
    pub currency_code: CurrencyCode,
    /// Currency display name.
    pub currency_name: String,
}

/// A ledger record with its counterparties resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The underlying immutable record.
    pub record: LedgerRecord,
    /// Source side, absent for deposits.
    pub source: Option<CounterpartyDetail>,
    /// Destination side, absent for withdrawals.
    pub destination: Option<CounterpartyDetail>,
}

/// One page of query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Zero-based page number.
    pub page_number: usize,
    /// Requested page size.
    pub page_size: usize,
    /// Total matching items across all pages.
    pub total_count: usize,
}

/// Paginated, filterable read access over recorded transactions.
pub struct LedgerQueryService {
    records: Arc<RecordStore>,
    accounts: Arc<AccountStore>,
    currencies: Arc<CurrencyRegistry>,
    directory: Arc<dyn CustomerDirectory>,
}

impl LedgerQueryService {
    /// Create a query service over the record store.
    pub fn new(
        records: Arc<RecordStore>,
        accounts: Arc<AccountStore>,
        currencies: Arc<CurrencyRegistry>,
        directory: Arc<dyn CustomerDirectory>,
    ) -> Self {
        Self {
            records,
            accounts,
            currencies,
            directory,
        }
    }

    /// List transaction history matching `filter`, ordered by transaction
    /// timestamp, paginated.
    pub fn list_history(
        &self,
        filter: &HistoryFilter,
        page_number: usize,
        page_size: usize,
    ) -> Page<HistoryEntry> {
        let mut matching: Vec<LedgerRecord> = self
            .records
            .snapshot()
            .into_iter()
            .filter(|record| self.matches(record, filter))
            .collect();
        matching.sort_by_key(|record| record.timestamp_millis);

        let total_count = matching.len();
        let items = matching
            .into_iter()
            .skip(page_number.saturating_mul(page_size))
            .take(page_size)
            .map(|record| self.resolve(record))
            .collect();

        debug!(
            total = total_count,
            page = page_number,
            size = page_size,
            "History query served"
        );

        Page {
            items,
            page_number,
            page_size,
            total_count,
        }
    }

    fn matches(&self, record: &LedgerRecord, filter: &HistoryFilter) -> bool {
        if let Some(expected) = filter.transaction_type {
            if record.transaction_type != expected {
                return false;
            }
        }

        if let Some(from) = filter.from_millis {
            if record.timestamp_millis < from {
                return false;
            }
        }

        if let Some(to) = filter.to_millis {
            if record.timestamp_millis > to {
                return false;
            }
        }

        if let Some(name) = &filter.counterparty_name {
            let needle = name.to_lowercase();
            let holder = record
                .source_account
                .as_ref()
                .and_then(|id| self.holder_first_name(id));
            match holder {
                Some(holder) if holder.to_lowercase().contains(&needle) => {}
                _ => return false,
            }
        }

        true
    }

    fn holder_first_name(&self, account_id: &AccountId) -> Option<String> {
        let account = self.accounts.get(account_id).ok()?;
        self.directory.first_name(&account.customer_id)
    }

    fn resolve(&self, record: LedgerRecord) -> HistoryEntry {
        let source = record
            .source_account
            .as_ref()
            .and_then(|id| self.detail(id));
        let destination = record
            .destination_account
            .as_ref()
            .and_then(|id| self.detail(id));
        HistoryEntry {
            record,
            source,
            destination,
        }
    }

    fn detail(&self, account_id: &AccountId) -> Option<CounterpartyDetail> {
        let account = self.accounts.get(account_id).ok()?;
        let currency = self.currencies.get_or_create(account.currency);
        Some(CounterpartyDetail {
            first_name: self.directory.first_name(&account.customer_id),
            account_number: account.account_number,
            currency_code: account.currency,
            currency_name: currency.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use rust_decimal_macros::dec;

    struct Fixture {
        service: LedgerQueryService,
        records: Arc<RecordStore>,
        alice: Account,
        bob: Account,
    }

    fn fixture() -> Fixture {
        let records = Arc::new(RecordStore::new());
        let accounts = Arc::new(AccountStore::new());
        let currencies = Arc::new(CurrencyRegistry::new());
        let directory = Arc::new(InMemoryCustomerDirectory::new());

        let alice = accounts.insert(
            Account::new(
                CustomerId::new(),
                AccountNumber::from_serial(1),
                CurrencyCode::Idr,
            )
            .with_balance(dec!(100000)),
        );
        let bob = accounts.insert(
            Account::new(
                CustomerId::new(),
                AccountNumber::from_serial(2),
                CurrencyCode::Usd,
            )
            .with_balance(dec!(100)),
        );
        directory.register(alice.customer_id, "Alice");
        directory.register(bob.customer_id, "Bob");

        let service = LedgerQueryService::new(
            records.clone(),
            accounts,
            currencies,
            directory,
        );

        Fixture {
            service,
            records,
            alice,
            bob,
        }
    }

    fn seed_records(fx: &Fixture) {
        fx.records
            .append(LedgerRecord::deposit(dec!(50000), dec!(7000), fx.alice.id))
            .unwrap();
        fx.records
            .append(LedgerRecord::transfer(
                dec!(20000),
                dec!(0),
                fx.alice.id,
                fx.bob.id,
            ))
            .unwrap();
        fx.records
            .append(LedgerRecord::transfer(
                dec!(10),
                dec!(0),
                fx.bob.id,
                fx.alice.id,
            ))
            .unwrap();
    }

    #[test]
    fn test_unfiltered_history_is_ordered_and_counted() {
        let fx = fixture();
        seed_records(&fx);

        let page = fx.service.list_history(&HistoryFilter::default(), 0, 10);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.items.len(), 3);
        for pair in page.items.windows(2) {
            assert!(pair[0].record.timestamp_millis <= pair[1].record.timestamp_millis);
        }
    }

    #[test]
    fn test_filter_by_type() {
        let fx = fixture();
        seed_records(&fx);

        let filter = HistoryFilter {
            transaction_type: Some(TransactionType::Transfer),
            ..Default::default()
        };
        let page = fx.service.list_history(&filter, 0, 10);
        assert_eq!(page.total_count, 2);
        assert!(page
            .items
            .iter()
            .all(|e| e.record.transaction_type == TransactionType::Transfer));
    }

    #[test]
    fn test_filter_by_counterparty_name_is_case_insensitive() {
        let fx = fixture();
        seed_records(&fx);

        let filter = HistoryFilter {
            counterparty_name: Some("ali".to_string()),
            ..Default::default()
        };
        let page = fx.service.list_history(&filter, 0, 10);
        // Only the transfer sent by Alice has her as the source holder.
        assert_eq!(page.total_count, 1);
        let source = page.items[0].source.as_ref().unwrap();
        assert_eq!(source.first_name.as_deref(), Some("Alice"));
        assert_eq!(source.currency_name, "Indonesian Rupiah");
    }

    #[test]
    fn test_filters_combine_with_and_semantics() {
        let fx = fixture();
        seed_records(&fx);

        let filter = HistoryFilter {
            counterparty_name: Some("bob".to_string()),
            transaction_type: Some(TransactionType::Deposit),
            ..Default::default()
        };
        let page = fx.service.list_history(&filter, 0, 10);
        assert_eq!(page.total_count, 0);
    }

    #[test]
    fn test_date_range_filter() {
        let fx = fixture();
        seed_records(&fx);
        let all = fx.service.list_history(&HistoryFilter::default(), 0, 10);
        let last_ts = all.items[2].record.timestamp_millis;

        let filter = HistoryFilter {
            to_millis: Some(last_ts),
            from_millis: Some(last_ts),
            ..Default::default()
        };
        let page = fx.service.list_history(&filter, 0, 10);
        assert!(page.total_count >= 1);
        assert!(page
            .items
            .iter()
            .all(|e| e.record.timestamp_millis == last_ts));
    }

    #[test]
    fn test_pagination() {
        let fx = fixture();
        seed_records(&fx);

        let first = fx.service.list_history(&HistoryFilter::default(), 0, 2);
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.total_count, 3);

        let second = fx.service.list_history(&HistoryFilter::default(), 1, 2);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.page_number, 1);

        let beyond = fx.service.list_history(&HistoryFilter::default(), 5, 2);
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_count, 3);
    }

    #[test]
    fn test_deposit_entry_has_no_source_side() {
        let fx = fixture();
        seed_records(&fx);

        let filter = HistoryFilter {
            transaction_type: Some(TransactionType::Deposit),
            ..Default::default()
        };
        let page = fx.service.list_history(&filter, 0, 10);
        let entry = &page.items[0];
        assert!(entry.source.is_none());
        assert!(entry.destination.is_some());
    }
}
