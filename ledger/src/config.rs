//! Engine configuration.

use rust_decimal::Decimal;

use walletcore_common::CurrencyCode;

use crate::fees::FeePolicy;

/// Configuration for the ledger engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed fee recorded on deposits, in minor units of the reference
    /// currency. Informational only; never deducted from the credit.
    pub deposit_fee: Decimal,
    /// Base fee for cross-currency transfers.
    pub transfer_base_fee: Decimal,
    /// Reference currency for fee denomination.
    pub reference_currency: CurrencyCode,
    /// How many times a whole operation is retried after losing a
    /// balance CAS race before failing with `ConcurrentModification`.
    pub cas_retry_limit: u32,
    /// How many withdrawal-code candidates are drawn before failing with
    /// `CodeGenerationExhausted`.
    pub code_retry_limit: u32,
    /// Withdrawal code length.
    pub code_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deposit_fee: Decimal::from(7000),
            transfer_base_fee: Decimal::from(7000),
            reference_currency: CurrencyCode::Idr,
            cas_retry_limit: 8,
            code_retry_limit: 5,
            code_length: 8,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(fee) = std::env::var("WALLET_DEPOSIT_FEE") {
            if let Ok(fee) = fee.parse() {
                config.deposit_fee = fee;
            }
        }

        if let Ok(fee) = std::env::var("WALLET_TRANSFER_BASE_FEE") {
            if let Ok(fee) = fee.parse() {
                config.transfer_base_fee = fee;
            }
        }

        if let Ok(limit) = std::env::var("WALLET_CAS_RETRY_LIMIT") {
            if let Ok(limit) = limit.parse() {
                config.cas_retry_limit = limit;
            }
        }

        if let Ok(limit) = std::env::var("WALLET_CODE_RETRY_LIMIT") {
            if let Ok(limit) = limit.parse() {
                config.code_retry_limit = limit;
            }
        }

        if let Ok(length) = std::env::var("WALLET_CODE_LENGTH") {
            if let Ok(length) = length.parse() {
                config.code_length = length;
            }
        }

        if let Ok(code) = std::env::var("WALLET_REFERENCE_CURRENCY") {
            if let Ok(code) = code.parse() {
                config.reference_currency = code;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.deposit_fee < Decimal::ZERO {
            return Err("Deposit fee cannot be negative".to_string());
        }

        if self.transfer_base_fee < Decimal::ZERO {
            return Err("Transfer base fee cannot be negative".to_string());
        }

        if self.cas_retry_limit == 0 {
            return Err("CAS retry limit must be at least 1".to_string());
        }

        if self.code_retry_limit == 0 {
            return Err("Code retry limit must be at least 1".to_string());
        }

        if self.code_length == 0 {
            return Err("Withdrawal code length must be at least 1".to_string());
        }

        Ok(())
    }

    /// Build the fee policy this configuration describes.
    pub fn fee_policy(&self) -> FeePolicy {
        FeePolicy {
            deposit_fee: self.deposit_fee,
            transfer_base_fee: self.transfer_base_fee,
            reference_currency: self.reference_currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.deposit_fee, Decimal::from(7000));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = EngineConfig::default();
        config.cas_retry_limit = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.code_length = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.deposit_fee = Decimal::from(-1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_fees_are_valid() {
        let mut config = EngineConfig::default();
        config.deposit_fee = Decimal::ZERO;
        config.transfer_base_fee = Decimal::ZERO;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var("WALLET_CODE_RETRY_LIMIT", "11");
        std::env::set_var("WALLET_REFERENCE_CURRENCY", "USD");

        let config = EngineConfig::from_env();
        assert_eq!(config.code_retry_limit, 11);
        assert_eq!(config.reference_currency, CurrencyCode::Usd);
        // Unset fields keep their defaults.
        assert_eq!(config.deposit_fee, Decimal::from(7000));

        std::env::remove_var("WALLET_CODE_RETRY_LIMIT");
        std::env::remove_var("WALLET_REFERENCE_CURRENCY");
    }
}
