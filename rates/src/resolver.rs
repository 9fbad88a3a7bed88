//! Rate resolver trait and the in-memory implementation.

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::debug;

use walletcore_common::{CurrencyCode, ExchangeRate, Timestamp};

use crate::error::{RateError, RateResult};

/// Trait for exchange rate resolvers.
///
/// Implementations may block on external I/O; callers must resolve before
/// touching any balance so a resolver failure never strands a half-applied
/// operation.
#[async_trait]
pub trait RateResolver: Send + Sync {
    /// Get the resolver name.
    fn name(&self) -> &str;

    /// Resolve the rate for a pair, as of `as_of` (the most recent known
    /// rate at or before that instant), or the latest known rate when
    /// `as_of` is `None`.
    async fn resolve(
        &self,
        base: CurrencyCode,
        target: CurrencyCode,
        as_of: Option<Timestamp>,
    ) -> RateResult<ExchangeRate>;

    /// Check if this resolver knows the given pair at all.
    fn supports_pair(&self, base: CurrencyCode, target: CurrencyCode) -> bool;
}

/// In-memory rate resolver backed by a per-pair rate history.
///
/// Serves as the in-process stand-in for the external rate feed, and as
/// the mock for engine tests. Rates are published with their effective
/// date; resolution picks the newest rate not after the requested instant.
pub struct InMemoryRateResolver {
    name: String,
    history: DashMap<(CurrencyCode, CurrencyCode), Vec<ExchangeRate>>,
}

impl InMemoryRateResolver {
    /// Create a new empty resolver.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            history: DashMap::new(),
        }
    }

    /// Publish a rate into the history. Entries stay sorted by effective
    /// date so resolution is a reverse scan.
    pub fn publish(&self, rate: ExchangeRate) {
        let mut entry = self
            .history
            .entry((rate.base, rate.target))
            .or_default();
        let idx = entry
            .binary_search_by_key(&rate.effective_at, |r| r.effective_at)
            .unwrap_or_else(|i| i);
        entry.insert(idx, rate);
    }

    /// Convenience: publish a rate effective now.
    pub fn publish_now(&self, base: CurrencyCode, target: CurrencyCode, rate: Decimal) {
        self.publish(ExchangeRate::new(base, target, rate, walletcore_common::now()));
    }

    /// Number of pairs with at least one published rate.
    pub fn pair_count(&self) -> usize {
        self.history.len()
    }
}

#[async_trait]
impl RateResolver for InMemoryRateResolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(
        &self,
        base: CurrencyCode,
        target: CurrencyCode,
        as_of: Option<Timestamp>,
    ) -> RateResult<ExchangeRate> {
        let entry = self
            .history
            .get(&(base, target))
            .ok_or(RateError::RateNotFound { base, target })?;

        let resolved = match as_of {
            Some(instant) => entry
                .iter()
                .rev()
                .find(|r| r.effective_at <= instant)
                .cloned(),
            None => entry.last().cloned(),
        };

        match resolved {
            Some(rate) => {
                debug!(
                    resolver = self.name.as_str(),
                    pair = %rate,
                    "Resolved rate"
                );
                Ok(rate)
            }
            None => Err(RateError::RateNotFound { base, target }),
        }
    }

    fn supports_pair(&self, base: CurrencyCode, target: CurrencyCode) -> bool {
        self.history
            .get(&(base, target))
            .map(|h| !h.is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use walletcore_common::now;

    fn resolver_with_history() -> InMemoryRateResolver {
        let resolver = InMemoryRateResolver::new("test");
        let base = now() - Duration::days(2);
        resolver.publish(ExchangeRate::new(
            CurrencyCode::Idr,
            CurrencyCode::Usd,
            dec!(0.000064),
            base,
        ));
        resolver.publish(ExchangeRate::new(
            CurrencyCode::Idr,
            CurrencyCode::Usd,
            dec!(0.000065),
            base + Duration::days(1),
        ));
        resolver
    }

    #[tokio::test]
    async fn test_resolve_latest() {
        let resolver = resolver_with_history();
        let rate = resolver
            .resolve(CurrencyCode::Idr, CurrencyCode::Usd, None)
            .await
            .unwrap();
        assert_eq!(rate.rate, dec!(0.000065));
    }

    #[tokio::test]
    async fn test_resolve_as_of_picks_older_rate() {
        let resolver = resolver_with_history();
        let as_of = now() - Duration::days(1) - Duration::hours(1);
        let rate = resolver
            .resolve(CurrencyCode::Idr, CurrencyCode::Usd, Some(as_of))
            .await
            .unwrap();
        assert_eq!(rate.rate, dec!(0.000064));
    }

    #[tokio::test]
    async fn test_resolve_before_history_is_not_found() {
        let resolver = resolver_with_history();
        let as_of = now() - Duration::days(10);
        let result = resolver
            .resolve(CurrencyCode::Idr, CurrencyCode::Usd, Some(as_of))
            .await;
        assert!(matches!(result, Err(RateError::RateNotFound { .. })));
    }

    #[tokio::test]
    async fn test_unknown_pair() {
        let resolver = resolver_with_history();
        let result = resolver
            .resolve(CurrencyCode::Usd, CurrencyCode::Eur, None)
            .await;
        assert!(matches!(result, Err(RateError::RateNotFound { .. })));
        assert!(!resolver.supports_pair(CurrencyCode::Usd, CurrencyCode::Eur));
        assert!(resolver.supports_pair(CurrencyCode::Idr, CurrencyCode::Usd));
    }
}
