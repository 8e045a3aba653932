pub mod client;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::domain::PairInfo;
use crate::error::Result;

pub use client::{PairTvl, StatsClient};

/// Source of market statistics
#[async_trait]
pub trait StatsApi: Send + Sync {
    /// Token symbol → USD price
    async fn token_rates(&self) -> Result<HashMap<String, Decimal>>;

    /// Liquidity snapshot of one pool, scaled to token units
    async fn pair_tvl(&self, pair: &PairInfo) -> Result<PairTvl>;
}

#[async_trait]
impl StatsApi for StatsClient {
    async fn token_rates(&self) -> Result<HashMap<String, Decimal>> {
        StatsClient::token_rates(self).await
    }

    async fn pair_tvl(&self, pair: &PairInfo) -> Result<PairTvl> {
        StatsClient::pair_tvl(self, pair).await
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::error::DeskError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed statistics for unit tests
    #[derive(Default)]
    pub struct MockStats {
        pub rates: HashMap<String, Decimal>,
        pub tvls: HashMap<u64, PairTvl>,
        pub rate_calls: AtomicUsize,
    }

    #[async_trait]
    impl StatsApi for MockStats {
        async fn token_rates(&self) -> Result<HashMap<String, Decimal>> {
            self.rate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rates.clone())
        }

        async fn pair_tvl(&self, pair: &PairInfo) -> Result<PairTvl> {
            self.tvls
                .get(&pair.id)
                .cloned()
                .ok_or_else(|| DeskError::InvalidResponse(format!("no stats for pair {}", pair.id)))
        }
    }
}
