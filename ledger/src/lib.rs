//! Walletcore Transaction Ledger Engine
//!
//! Validates, executes, and records money-movement operations (deposit,
//! transfer, withdraw) against account balances: currency-rate
//! application, fee computation, and concurrency-safe balance mutation
//! with an append-only audit trail.
//!
//! # Guarantees
//!
//! - Balances never go negative and change only through the engine.
//! - Multi-leg mutations (funding source + account, sender + receiver)
//!   appear atomic: either both sides change or neither does.
//! - Lost updates are prevented by per-account version counters and
//!   compare-and-set, retried a bounded number of times.
//! - Ledger records are immutable once appended; withdrawal codes are
//!   unique across the whole record store.

pub mod account;
pub mod config;
pub mod engine;
pub mod fees;
pub mod query;
pub mod receipt;
pub mod record;
pub mod store;
pub mod withdrawal;

pub use account::{Account, AccountStatus};
pub use config::EngineConfig;
pub use engine::LedgerEngine;
pub use fees::FeePolicy;
pub use query::{HistoryFilter, LedgerQueryService, Page};
pub use receipt::{DepositReceipt, TransferReceipt, WithdrawalReceipt};
pub use record::{LedgerRecord, RecordStore, TransactionType};
pub use store::{AccountStore, CurrencyRegistry, FundingSource, FundingSourceStore};
pub use withdrawal::{WithdrawalCode, WithdrawalCodeGenerator};
