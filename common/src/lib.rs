//! Walletcore Common Types
//!
//! This crate contains shared types used across the walletcore ledger,
//! including identifiers, monetary types, the error taxonomy, and time
//! helpers.

pub mod error;
pub mod identifiers;
pub mod monetary;
pub mod time;

pub use error::*;
pub use identifiers::*;
pub use monetary::*;
pub use time::*;
