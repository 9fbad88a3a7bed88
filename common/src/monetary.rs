//! Monetary types for the walletcore ledger.
//!
//! All monetary arithmetic uses [`rust_decimal::Decimal`]; binary floating
//! point never touches a balance.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::time::Timestamp;

/// Scale applied when a fee is re-denominated through an exchange rate.
pub const FEE_RATE_SCALE: u32 = 15;

/// Supported currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyCode {
    /// Indonesian rupiah (the reference currency for fee denomination).
    Idr,
    /// United States dollar.
    Usd,
    /// Euro.
    Eur,
    /// Singapore dollar.
    Sgd,
    /// Japanese yen.
    Jpy,
    /// Pound sterling.
    Gbp,
}

impl CurrencyCode {
    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            CurrencyCode::Idr => "IDR",
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Sgd => "SGD",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Gbp => "GBP",
        }
    }

    /// Human-readable currency name.
    pub fn display_name(&self) -> &'static str {
        match self {
            CurrencyCode::Idr => "Indonesian Rupiah",
            CurrencyCode::Usd => "US Dollar",
            CurrencyCode::Eur => "Euro",
            CurrencyCode::Sgd => "Singapore Dollar",
            CurrencyCode::Jpy => "Japanese Yen",
            CurrencyCode::Gbp => "Pound Sterling",
        }
    }

    /// All supported codes.
    pub fn all() -> &'static [CurrencyCode] {
        &[
            CurrencyCode::Idr,
            CurrencyCode::Usd,
            CurrencyCode::Eur,
            CurrencyCode::Sgd,
            CurrencyCode::Jpy,
            CurrencyCode::Gbp,
        ]
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IDR" => Ok(CurrencyCode::Idr),
            "USD" => Ok(CurrencyCode::Usd),
            "EUR" => Ok(CurrencyCode::Eur),
            "SGD" => Ok(CurrencyCode::Sgd),
            "JPY" => Ok(CurrencyCode::Jpy),
            "GBP" => Ok(CurrencyCode::Gbp),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}

/// Error for unrecognized currency codes.
#[derive(Debug, Clone)]
pub struct UnknownCurrency(pub String);

impl fmt::Display for UnknownCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown currency code: {}", self.0)
    }
}

impl std::error::Error for UnknownCurrency {}

/// A currency record (code plus display name). Immutable once created;
/// the ledger's registry hands out one record per code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Enumerated code.
    pub code: CurrencyCode,
    /// Display name.
    pub name: String,
}

impl Currency {
    /// Create the canonical record for a code.
    pub fn of(code: CurrencyCode) -> Self {
        Self {
            code,
            name: code.display_name().to_string(),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// A point-in-time conversion rate between two currencies.
///
/// Supplied by the external rate resolver; the engine treats a resolved
/// rate as a snapshot and never re-resolves it mid-operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Base currency (the sender's currency).
    pub base: CurrencyCode,
    /// Target currency (the receiver's currency).
    pub target: CurrencyCode,
    /// Units of `target` per one unit of `base`.
    pub rate: Decimal,
    /// When this rate became effective.
    pub effective_at: Timestamp,
}

impl ExchangeRate {
    /// Create a new exchange rate.
    pub fn new(
        base: CurrencyCode,
        target: CurrencyCode,
        rate: Decimal,
        effective_at: Timestamp,
    ) -> Self {
        Self {
            base,
            target,
            rate,
            effective_at,
        }
    }

    /// Convert a base-currency amount into the target currency.
    /// Plain decimal multiplication, no intermediate rounding.
    pub fn convert(&self, amount: Decimal) -> Decimal {
        amount * self.rate
    }

    /// Re-denominate a fee quoted in the target currency into the base
    /// currency, at [`FEE_RATE_SCALE`] fractional digits, round half-up.
    pub fn invert_fee(&self, base_fee: Decimal) -> Decimal {
        (base_fee / self.rate)
            .round_dp_with_strategy(FEE_RATE_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.base, self.target, self.rate)
    }
}

/// Format a monetary amount for display.
///
/// Integral amounts render without decimals, fractional amounts with
/// exactly two decimal places (rounded half-up).
pub fn format_amount(amount: Decimal) -> String {
    if amount.fract().is_zero() {
        format!("{}", amount.trunc())
    } else {
        let rounded =
            amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{:.2}", rounded)
    }
}
