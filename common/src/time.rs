//! Time helpers for the walletcore ledger.
//!
//! Ledger records carry millisecond-precision epoch timestamps; everything
//! else uses UTC datetimes.

use chrono::{DateTime, TimeZone, Utc};

/// A timestamp with timezone (always UTC for walletcore).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Current wall clock as epoch milliseconds.
pub fn epoch_millis() -> i64 {
    now().timestamp_millis()
}

/// Rebuild a timestamp from epoch milliseconds.
/// Out-of-range values clamp to the epoch.
pub fn from_epoch_millis(millis: i64) -> Timestamp {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
}
