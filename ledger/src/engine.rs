//! Core transaction ledger engine.
//!
//! All money movement enters through [`LedgerEngine`]. Every operation
//! validates fail-fast before touching a balance, resolves its rate
//! snapshot up front, commits balances through compare-and-set with
//! bounded whole-operation retry, and appends exactly one immutable
//! ledger record on success.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use walletcore_common::{
    format_amount, AccountId, AccountNumber, CustomerId, FundingSourceId, Result, WalletError,
};
use walletcore_rates::{RateError, RateResolver};

use crate::account::Account;
use crate::config::EngineConfig;
use crate::fees::FeePolicy;
use crate::receipt::{DepositReceipt, TransferReceipt, WithdrawalReceipt};
use crate::record::{LedgerRecord, RecordStore, TransactionType};
use crate::store::{AccountStore, FundingSourceStore};
use crate::withdrawal::WithdrawalCodeGenerator;

/// The transaction ledger engine.
pub struct LedgerEngine {
    accounts: Arc<AccountStore>,
    funding: Arc<FundingSourceStore>,
    records: Arc<RecordStore>,
    rates: Arc<dyn RateResolver>,
    fees: FeePolicy,
    codes: WithdrawalCodeGenerator,
    config: EngineConfig,
}

impl LedgerEngine {
    /// Create a new engine over the given stores and rate resolver.
    /// Fails if the configuration does not validate.
    pub fn new(
        accounts: Arc<AccountStore>,
        funding: Arc<FundingSourceStore>,
        records: Arc<RecordStore>,
        rates: Arc<dyn RateResolver>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate().map_err(WalletError::Internal)?;
        Ok(Self {
            accounts,
            funding,
            records,
            rates,
            fees: config.fee_policy(),
            codes: WithdrawalCodeGenerator::new(config.code_length),
            config,
        })
    }

    /// Deposit `amount` into an account from a funding source.
    ///
    /// The funding-source debit and the account credit commit as one
    /// atomic unit: if the credit leg loses its CAS race the debit is
    /// rolled back and the whole operation retried. The recorded deposit
    /// fee is informational and never subtracted from the credit.
    #[instrument(skip(self), fields(account = %account_id, amount = %amount))]
    pub async fn deposit(
        &self,
        caller: CustomerId,
        account_id: AccountId,
        funding_source_id: FundingSourceId,
        amount: Decimal,
    ) -> Result<DepositReceipt> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount(amount));
        }

        let account = self.accounts.get(&account_id)?;
        if !account.can_transact() {
            return Err(WalletError::AccountInactive(account_id));
        }
        if !account.is_owned_by(&caller) {
            return Err(WalletError::NotOwner {
                caller,
                account: account_id,
            });
        }

        let mut new_balance = Decimal::ZERO;
        let mut committed = false;

        for attempt in 0..self.config.cas_retry_limit {
            let source = self.funding.get(&funding_source_id)?;
            if source.balance < amount {
                return Err(WalletError::FundingSourceInsufficient {
                    required: amount,
                    available: source.balance,
                });
            }

            if !self.funding.compare_and_set(
                &funding_source_id,
                source.version,
                source.balance - amount,
            )? {
                continue;
            }

            // Funding leg is committed; credit the account or roll back.
            match self.credit_once(&account_id, amount) {
                Ok(Some(balance)) => {
                    new_balance = balance;
                    committed = true;
                    break;
                }
                Ok(None) => {
                    warn!(
                        account = %account_id,
                        attempt,
                        "Deposit credit leg lost CAS race, rolling back funding debit"
                    );
                    self.refund_funding(&funding_source_id, amount)?;
                }
                Err(err) => {
                    self.refund_funding(&funding_source_id, amount)?;
                    return Err(err);
                }
            }
        }

        if !committed {
            return Err(WalletError::ConcurrentModification);
        }

        let fee = self
            .fees
            .fee(TransactionType::Deposit, account.currency, account.currency, None);
        let record = self
            .records
            .append(LedgerRecord::deposit(amount, fee, account_id))?;

        info!(
            record = %record.id,
            account = %account_id,
            new_balance = %new_balance,
            "Deposit recorded"
        );

        Ok(DepositReceipt {
            amount_display: format_amount(amount),
            new_balance_display: format_amount(new_balance),
            new_balance,
            record,
        })
    }

    /// Transfer `amount` from one account to another, converting currency
    /// when the accounts differ.
    ///
    /// The rate snapshot is resolved once, before any mutation, so a
    /// resolver failure never strands a half-applied transfer. Sender
    /// debit and receiver credit commit as one atomic unit via two-phase
    /// CAS with rollback.
    #[instrument(skip(self), fields(from = %from_number, to = %to_number, amount = %amount))]
    pub async fn transfer(
        &self,
        from_number: &AccountNumber,
        to_number: &AccountNumber,
        amount: Decimal,
    ) -> Result<TransferReceipt> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount(amount));
        }

        let sender = self.accounts.find_by_number(from_number)?;
        let receiver = self.accounts.find_by_number(to_number)?;

        if sender.account_number == receiver.account_number {
            return Err(WalletError::SameAccount(from_number.clone()));
        }
        if !sender.can_transact() {
            return Err(WalletError::AccountInactive(sender.id));
        }
        if !receiver.can_transact() {
            return Err(WalletError::AccountInactive(receiver.id));
        }

        // Resolve the snapshot before any balance is touched.
        let rate = if sender.currency != receiver.currency {
            Some(
                self.rates
                    .resolve(sender.currency, receiver.currency, None)
                    .await
                    .map_err(map_rate_error)?,
            )
        } else {
            None
        };

        let fee = self.fees.fee(
            TransactionType::Transfer,
            sender.currency,
            receiver.currency,
            rate.as_ref(),
        );
        let converted = rate.as_ref().map(|r| r.convert(amount)).unwrap_or(amount);
        let required = amount + fee;

        let (sender_balance, receiver_balance) =
            self.commit_transfer(&sender, &receiver, required, converted)?;

        let record = self
            .records
            .append(LedgerRecord::transfer(amount, fee, sender.id, receiver.id))?;

        let amount_display = match &rate {
            Some(_) => format_amount(converted),
            None => format_amount(amount),
        };

        info!(
            record = %record.id,
            from = %sender.id,
            to = %receiver.id,
            fee = %fee,
            converted = %converted,
            "Transfer recorded"
        );

        Ok(TransferReceipt {
            record,
            amount_display,
            total_fee: fee,
            sender_balance,
            receiver_balance,
        })
    }

    /// Withdraw `amount` from an account, issuing a unique redemption code.
    #[instrument(skip(self), fields(account = %account_id, amount = %amount))]
    pub async fn withdraw(
        &self,
        caller: CustomerId,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<WithdrawalReceipt> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount(amount));
        }

        let account = self.accounts.get(&account_id)?;
        if !account.can_transact() {
            return Err(WalletError::AccountInactive(account_id));
        }
        if !account.has_sufficient_funds(amount) {
            return Err(WalletError::InsufficientBalance {
                required: amount,
                available: account.balance,
            });
        }
        if !account.is_owned_by(&caller) {
            return Err(WalletError::NotOwner {
                caller,
                account: account_id,
            });
        }

        let new_balance = self.debit_account(&account_id, amount)?;

        // Balance is committed; issue a unique code or roll the debit back.
        let mut appended = None;
        for _ in 0..self.config.code_retry_limit {
            let candidate = self.codes.generate();
            if self.records.code_exists(&candidate) {
                continue;
            }
            match self
                .records
                .append(LedgerRecord::withdrawal(amount, account_id, candidate))
            {
                Ok(record) => {
                    appended = Some(record);
                    break;
                }
                // Lost the uniqueness race at append time; draw again.
                Err(WalletError::DuplicateWithdrawalCode(_)) => continue,
                Err(other) => {
                    self.refund_account(&account_id, amount)?;
                    return Err(other);
                }
            }
        }

        let record = match appended {
            Some(record) => record,
            None => {
                self.refund_account(&account_id, amount)?;
                return Err(WalletError::CodeGenerationExhausted {
                    attempts: self.config.code_retry_limit,
                });
            }
        };

        let withdrawal_code = record
            .withdrawal_code
            .clone()
            .ok_or_else(|| WalletError::Internal("withdrawal record missing code".to_string()))?;

        info!(
            record = %record.id,
            account = %account_id,
            code = %withdrawal_code,
            new_balance = %new_balance,
            "Withdrawal recorded"
        );

        Ok(WithdrawalReceipt {
            record,
            withdrawal_code,
            new_balance,
        })
    }

    /// Two-phase commit of a transfer: debit the sender, credit the
    /// receiver, roll the debit back if the credit leg loses its race.
    /// Retried whole, bounded by the CAS retry limit.
    fn commit_transfer(
        &self,
        sender: &Account,
        receiver: &Account,
        required: Decimal,
        converted: Decimal,
    ) -> Result<(Decimal, Decimal)> {
        for attempt in 0..self.config.cas_retry_limit {
            let current_sender = self.accounts.get(&sender.id)?;
            if current_sender.balance < required {
                return Err(WalletError::InsufficientBalance {
                    required,
                    available: current_sender.balance,
                });
            }

            if !self.accounts.compare_and_set(
                &sender.id,
                current_sender.version,
                current_sender.balance - required,
            )? {
                continue;
            }

            match self.credit_once(&receiver.id, converted) {
                Ok(Some(balance)) => {
                    return Ok((current_sender.balance - required, balance));
                }
                Ok(None) => {
                    warn!(
                        from = %sender.id,
                        to = %receiver.id,
                        attempt,
                        "Transfer credit leg lost CAS race, rolling back sender debit"
                    );
                    self.refund_account(&sender.id, required)?;
                }
                Err(err) => {
                    self.refund_account(&sender.id, required)?;
                    return Err(err);
                }
            }
        }

        Err(WalletError::ConcurrentModification)
    }

    /// Debit a single account with bounded CAS retry, re-validating
    /// sufficiency against the freshly read balance each attempt.
    fn debit_account(&self, id: &AccountId, amount: Decimal) -> Result<Decimal> {
        for _ in 0..self.config.cas_retry_limit {
            let current = self.accounts.get(id)?;
            if current.balance < amount {
                return Err(WalletError::InsufficientBalance {
                    required: amount,
                    available: current.balance,
                });
            }
            if self
                .accounts
                .compare_and_set(id, current.version, current.balance - amount)?
            {
                return Ok(current.balance - amount);
            }
        }
        Err(WalletError::ConcurrentModification)
    }

    /// One CAS attempt at crediting an account. `Ok(None)` means the
    /// attempt lost a race and may be retried; an `Err` leaves the
    /// balance untouched so the caller can unwind its earlier leg.
    fn credit_once(&self, id: &AccountId, amount: Decimal) -> Result<Option<Decimal>> {
        let current = self.accounts.get(id)?;
        if self
            .accounts
            .compare_and_set(id, current.version, current.balance + amount)?
        {
            Ok(Some(current.balance + amount))
        } else {
            Ok(None)
        }
    }

    /// Credit an account back after a failed later leg. A pure credit can
    /// only lose races, never be rejected, so this loops until it lands.
    fn refund_account(&self, id: &AccountId, amount: Decimal) -> Result<()> {
        loop {
            let current = self.accounts.get(id)?;
            if self
                .accounts
                .compare_and_set(id, current.version, current.balance + amount)?
            {
                return Ok(());
            }
        }
    }

    /// Credit a funding source back after a failed later leg.
    fn refund_funding(&self, id: &FundingSourceId, amount: Decimal) -> Result<()> {
        loop {
            let current = self.funding.get(id)?;
            if self
                .funding
                .compare_and_set(id, current.version, current.balance + amount)?
            {
                return Ok(());
            }
        }
    }
}

/// Map resolver failures onto the engine taxonomy. Resolution failures
/// are surfaced immediately; retrying belongs to the resolver or caller.
fn map_rate_error(err: RateError) -> WalletError {
    match err {
        RateError::RateNotFound { base, target } => WalletError::RateNotFound { base, target },
        RateError::ProviderError(message) => WalletError::Internal(message),
        RateError::Timeout(message) => WalletError::Internal(message),
    }
}
