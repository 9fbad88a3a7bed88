//! Rate resolver error types.

use thiserror::Error;
use walletcore_common::CurrencyCode;

/// Errors that can occur while resolving an exchange rate.
#[derive(Debug, Error)]
pub enum RateError {
    /// No rate known for the requested pair (or none at the requested date).
    #[error("No rate available for {base}/{target}")]
    RateNotFound {
        base: CurrencyCode,
        target: CurrencyCode,
    },

    /// The upstream feed returned an error.
    #[error("Rate provider error: {0}")]
    ProviderError(String),

    /// The upstream feed did not answer in time.
    #[error("Rate resolution timed out: {0}")]
    Timeout(String),
}

/// Result type for rate resolution.
pub type RateResult<T> = Result<T, RateError>;
