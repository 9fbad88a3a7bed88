//! Structured success payloads returned to the calling layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::record::LedgerRecord;
use crate::withdrawal::WithdrawalCode;

/// Result of a successful deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositReceipt {
    /// The audit entry created for this deposit.
    pub record: LedgerRecord,
    /// Account balance after the credit.
    pub new_balance: Decimal,
    /// Deposited amount formatted for display.
    pub amount_display: String,
    /// New balance formatted for display.
    pub new_balance_display: String,
}

/// Result of a successful transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// The audit entry created for this transfer.
    pub record: LedgerRecord,
    /// Moved amount formatted for display: the sender-side amount for
    /// same-currency transfers, the converted receiver-side amount for
    /// cross-currency transfers.
    pub amount_display: String,
    /// Total fee charged, in the sender's currency.
    pub total_fee: Decimal,
    /// Sender balance after the debit.
    pub sender_balance: Decimal,
    /// Receiver balance after the credit.
    pub receiver_balance: Decimal,
}

/// Result of a successful withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    /// The audit entry created for this withdrawal.
    pub record: LedgerRecord,
    /// Redemption code for cashing out elsewhere.
    pub withdrawal_code: WithdrawalCode,
    /// Account balance after the debit.
    pub new_balance: Decimal,
}
