//! Withdrawal codes and their generator.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A redemption token issued on withdrawal. Globally unique across the
/// record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WithdrawalCode(String);

impl WithdrawalCode {
    /// Wrap an existing code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WithdrawalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Alphabet codes are drawn from: uppercase letters and digits.
const CODE_ALPHABET: [char; 36] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Generates withdrawal codes from a fixed alphabet.
///
/// Uniqueness is not guaranteed by construction; the engine checks each
/// candidate against the record store and regenerates on collision, with
/// a bounded retry budget.
#[derive(Debug, Clone)]
pub struct WithdrawalCodeGenerator {
    length: usize,
}

impl WithdrawalCodeGenerator {
    /// Create a generator producing codes of `length` characters.
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Generate a candidate code.
    pub fn generate(&self) -> WithdrawalCode {
        let mut rng = rand::thread_rng();
        let code: String = (0..self.length)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())])
            .collect();
        WithdrawalCode(code)
    }

    /// Configured code length.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for WithdrawalCodeGenerator {
    fn default() -> Self {
        Self::new(8)
    }
}
