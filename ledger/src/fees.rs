//! Fee policy.
//!
//! Fees are a pure function of the operation type, the currency pair, and
//! the resolved rate snapshot. There is no shared mutable fee state.

use rust_decimal::Decimal;

use walletcore_common::{CurrencyCode, ExchangeRate};

use crate::record::TransactionType;

/// Computes the fee for a money-movement operation.
#[derive(Debug, Clone)]
pub struct FeePolicy {
    /// Fixed fee recorded on deposits (informational, never deducted).
    pub deposit_fee: Decimal,
    /// Base fee for cross-currency transfers, denominated in the
    /// reference currency.
    pub transfer_base_fee: Decimal,
    /// Reference currency for fee denomination.
    pub reference_currency: CurrencyCode,
}

impl FeePolicy {
    /// Compute the fee for an operation, in the sender's currency.
    ///
    /// - Deposits carry the fixed deposit fee.
    /// - Withdrawals and same-currency transfers are free.
    /// - Cross-currency transfers pay the base fee; when the sender's
    ///   currency is not the reference currency the base fee is
    ///   re-denominated through the rate (scale 15, round half-up).
    pub fn fee(
        &self,
        transaction_type: TransactionType,
        sender: CurrencyCode,
        receiver: CurrencyCode,
        rate: Option<&ExchangeRate>,
    ) -> Decimal {
        match transaction_type {
            TransactionType::Deposit => self.deposit_fee,
            TransactionType::Withdraw => Decimal::ZERO,
            TransactionType::Transfer => {
                if sender == receiver {
                    return Decimal::ZERO;
                }
                match rate {
                    Some(rate) if sender != self.reference_currency => {
                        rate.invert_fee(self.transfer_base_fee)
                    }
                    _ => self.transfer_base_fee,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use walletcore_common::now;

    fn policy() -> FeePolicy {
        FeePolicy {
            deposit_fee: dec!(7000),
            transfer_base_fee: dec!(7000),
            reference_currency: CurrencyCode::Idr,
        }
    }

    #[test]
    fn test_deposit_fee_is_fixed() {
        let fee = policy().fee(
            TransactionType::Deposit,
            CurrencyCode::Idr,
            CurrencyCode::Idr,
            None,
        );
        assert_eq!(fee, dec!(7000));
    }

    #[test]
    fn test_withdraw_is_free() {
        let fee = policy().fee(
            TransactionType::Withdraw,
            CurrencyCode::Idr,
            CurrencyCode::Idr,
            None,
        );
        assert_eq!(fee, Decimal::ZERO);
    }

    #[test]
    fn test_same_currency_transfer_is_free() {
        let fee = policy().fee(
            TransactionType::Transfer,
            CurrencyCode::Usd,
            CurrencyCode::Usd,
            None,
        );
        assert_eq!(fee, Decimal::ZERO);
    }

    #[test]
    fn test_cross_currency_from_reference_pays_base_fee() {
        let rate = ExchangeRate::new(CurrencyCode::Idr, CurrencyCode::Usd, dec!(0.000065), now());
        let fee = policy().fee(
            TransactionType::Transfer,
            CurrencyCode::Idr,
            CurrencyCode::Usd,
            Some(&rate),
        );
        assert_eq!(fee, dec!(7000));
    }

    #[test]
    fn test_cross_currency_from_non_reference_divides_by_rate() {
        let rate = ExchangeRate::new(CurrencyCode::Usd, CurrencyCode::Idr, dec!(15000), now());
        let fee = policy().fee(
            TransactionType::Transfer,
            CurrencyCode::Usd,
            CurrencyCode::Idr,
            Some(&rate),
        );
        // 7000 / 15000, scale 15, half-up.
        assert_eq!(fee, dec!(0.466666666666667));
    }
}
