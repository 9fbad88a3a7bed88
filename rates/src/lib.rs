//! Walletcore Rate Resolver
//!
//! The seam between the transaction ledger and the external exchange-rate
//! feed. The ledger only ever asks for "the rate for this pair as of T";
//! rate ingestion and history storage live outside this workspace.
//!
//! # Example
//!
//! ```rust,ignore
//! use walletcore_rates::{InMemoryRateResolver, RateResolver};
//! use walletcore_common::CurrencyCode;
//!
//! let resolver = InMemoryRateResolver::new("feed");
//! let rate = resolver
//!     .resolve(CurrencyCode::Idr, CurrencyCode::Usd, None)
//!     .await?;
//! ```

pub mod error;
pub mod resolver;

pub use error::{RateError, RateResult};
pub use resolver::{InMemoryRateResolver, RateResolver};
