//! Reward, fee and market statistics queries

use futures::future::try_join_all;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::cache::QueryCache;
use super::keys::QueryKey;
use super::QueryResult;
use crate::chain::{parse_hex_u64, ChainClient};
use crate::domain::{parse_raw, to_units, CurrencyAmount, PairInfo, Token, TokenRegistry};
use crate::error::DeskError;
use crate::rewards::{FeeAggregator, FeeWindow};
use crate::stats::{PairTvl, StatsApi};

/// Symbol of the reward token
pub const REWARD_SYMBOL: &str = "BALN";

pub struct RewardQueries {
    chain: Arc<dyn ChainClient>,
    stats: Arc<dyn StatsApi>,
    tokens: Arc<TokenRegistry>,
    pairs: Arc<Vec<PairInfo>>,
    aggregator: FeeAggregator,
    platform_day: QueryCache<u64>,
    rewards: QueryCache<CurrencyAmount>,
    eligibility: QueryCache<bool>,
    fees: QueryCache<Vec<FeeWindow>>,
    rates: QueryCache<HashMap<String, Decimal>>,
    tvls: QueryCache<BTreeMap<u64, PairTvl>>,
    emission: QueryCache<Decimal>,
}

impl RewardQueries {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        stats: Arc<dyn StatsApi>,
        tokens: Arc<TokenRegistry>,
        pairs: Arc<Vec<PairInfo>>,
        stale_time: Duration,
    ) -> Self {
        Self {
            aggregator: FeeAggregator::new(chain.clone(), tokens.clone()),
            chain,
            stats,
            tokens,
            pairs,
            platform_day: QueryCache::new(stale_time),
            rewards: QueryCache::new(stale_time),
            eligibility: QueryCache::new(stale_time),
            fees: QueryCache::new(stale_time),
            rates: QueryCache::new(stale_time),
            tvls: QueryCache::new(stale_time),
            emission: QueryCache::new(stale_time),
        }
    }

    pub fn pairs(&self) -> &[PairInfo] {
        &self.pairs
    }

    pub fn tokens(&self) -> &TokenRegistry {
        &self.tokens
    }

    fn reward_token(&self) -> Result<Token, DeskError> {
        self.tokens
            .by_symbol(REWARD_SYMBOL)
            .cloned()
            .ok_or_else(|| DeskError::UnknownToken(REWARD_SYMBOL.to_string()))
    }

    /// Current platform day
    pub async fn platform_day(&self) -> QueryResult<u64> {
        let chain = self.chain.clone();
        self.platform_day
            .fetch(QueryKey::PlatformDay, move || async move {
                parse_hex_u64(&chain.get_day().await?)
            })
            .await
    }

    /// Unclaimed BALN of `account`
    pub async fn reward(&self, account: &str) -> QueryResult<CurrencyAmount> {
        let chain = self.chain.clone();
        let token = self.reward_token()?;
        let holder = account.to_string();
        self.rewards
            .fetch(QueryKey::UserReward(account.to_string()), move || async move {
                let raw = chain.get_baln_holding(&holder).await?;
                CurrencyAmount::from_raw(token, &raw)
            })
            .await
    }

    /// Whether `account` holds a loan or liquidity that earns BALN
    pub async fn has_rewardable(&self, account: &str) -> QueryResult<bool> {
        let chain = self.chain.clone();
        let pool_ids: Vec<u64> = self.pairs.iter().map(|pair| pair.id).collect();
        let holder = account.to_string();
        self.eligibility
            .fetch(QueryKey::HasRewardable(account.to_string()), move || async move {
                if parse_raw(&chain.get_debt(&holder).await?)? > 0 {
                    return Ok(true);
                }
                let reads = pool_ids.iter().map(|id| chain.get_lp_balance(*id, &holder));
                for raw in try_join_all(reads).await? {
                    if parse_raw(&raw)? > 0 {
                        return Ok(true);
                    }
                }
                Ok(false)
            })
            .await
    }

    /// Whether `account` stakes BALN and so earns network fees
    pub async fn has_network_fees(&self, account: &str) -> QueryResult<bool> {
        let chain = self.chain.clone();
        let token = self.reward_token()?;
        let holder = account.to_string();
        self.eligibility
            .fetch(QueryKey::HasNetworkFees(account.to_string()), move || async move {
                let raw = chain.get_staked_balance(&token.address, &holder).await?;
                Ok(parse_raw(&raw)? > 0)
            })
            .await
    }

    /// Fee windows over `[start, end)`, newest first
    pub async fn user_collected_fees(
        &self,
        account: &str,
        start: u64,
        end: u64,
    ) -> QueryResult<Vec<FeeWindow>> {
        if account.is_empty() {
            return Err(DeskError::Validation("collected fees need an account".to_string()).into());
        }
        let aggregator = self.aggregator.clone();
        let holder = account.to_string();
        let key = QueryKey::UserCollectedFees {
            account: account.to_string(),
            start,
            end,
        };
        self.fees
            .fetch(key, move || async move { aggregator.collect(&holder, start, end).await })
            .await
    }

    /// Token symbol → USD price
    pub async fn rates(&self) -> QueryResult<HashMap<String, Decimal>> {
        let stats = self.stats.clone();
        self.rates
            .fetch(QueryKey::Rates, move || async move { stats.token_rates().await })
            .await
    }

    /// Liquidity of every supported pair, keyed by pair id
    pub async fn all_pairs_tvl(&self) -> QueryResult<BTreeMap<u64, PairTvl>> {
        let stats = self.stats.clone();
        let pairs = self.pairs.clone();
        self.tvls
            .fetch(QueryKey::AllPairsTvl, move || async move {
                let reads = pairs.iter().map(|pair| stats.pair_tvl(pair));
                let tvls = try_join_all(reads).await?;
                debug!("loaded liquidity for {} pairs", tvls.len());
                Ok(pairs.iter().map(|pair| pair.id).zip(tvls).collect())
            })
            .await
    }

    /// Daily BALN emission
    pub async fn emission(&self) -> QueryResult<Decimal> {
        let chain = self.chain.clone();
        self.emission
            .fetch(QueryKey::Emission, move || async move {
                to_units(&chain.get_emission().await?, 18)
            })
            .await
    }

    /// Pool liquidity in USD, rounded to whole dollars
    pub async fn all_pairs_tvl_usd(&self) -> QueryResult<BTreeMap<u64, Decimal>> {
        let (tvls, rates) = tokio::try_join!(self.all_pairs_tvl(), self.rates())?;
        Ok(pairs_tvl_usd(&self.pairs, &tvls, &rates))
    }

    /// Yearly reward yield of every incentivised pair
    pub async fn all_pairs_apy(&self) -> QueryResult<BTreeMap<u64, Decimal>> {
        let (tvl_usd, rates, emission) =
            tokio::try_join!(self.all_pairs_tvl_usd(), self.rates(), self.emission())?;
        Ok(pairs_apy(&self.pairs, &tvl_usd, &rates, emission))
    }

    /// Drop cached reward data of `account` after a claim
    pub fn invalidate_reward(&self, account: &str) {
        self.rewards.invalidate(&QueryKey::UserReward(account.to_string()));
    }

    pub fn invalidate_fees(&self, account: &str) {
        self.fees.invalidate_matching(|key| key.account() == Some(account));
    }

    pub fn invalidate_tvl(&self) {
        self.tvls.invalidate(&QueryKey::AllPairsTvl);
    }

    pub fn invalidate_rewardable(&self, account: &str) {
        self.eligibility
            .invalidate(&QueryKey::HasRewardable(account.to_string()));
    }
}

/// `base * rate(base) + quote * rate(quote)` per pair, rounded half up
pub fn pairs_tvl_usd(
    pairs: &[PairInfo],
    tvls: &BTreeMap<u64, PairTvl>,
    rates: &HashMap<String, Decimal>,
) -> BTreeMap<u64, Decimal> {
    let mut out = BTreeMap::new();
    for pair in pairs {
        let Some(tvl) = tvls.get(&pair.id) else {
            continue;
        };
        let (Some(base_rate), Some(quote_rate)) =
            (rates.get(&pair.base.symbol), rates.get(&pair.quote.symbol))
        else {
            warn!("no USD rate for pair {}", pair.name);
            continue;
        };
        let usd = tvl.base * base_rate + tvl.quote * quote_rate;
        out.insert(
            pair.id,
            usd.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        );
    }
    out
}

/// `emission * rewards * 365 * rate(BALN) / tvl` for every pair with a rewards share
pub fn pairs_apy(
    pairs: &[PairInfo],
    tvl_usd: &BTreeMap<u64, Decimal>,
    rates: &HashMap<String, Decimal>,
    emission: Decimal,
) -> BTreeMap<u64, Decimal> {
    let Some(reward_rate) = rates.get(REWARD_SYMBOL) else {
        warn!("no USD rate for {}", REWARD_SYMBOL);
        return BTreeMap::new();
    };

    pairs
        .iter()
        .filter_map(|pair| {
            let share = pair.rewards?;
            let tvl = tvl_usd.get(&pair.id).filter(|tvl| !tvl.is_zero())?;
            let yearly = emission * share * Decimal::from(365) * reward_rate;
            yearly.checked_div(*tvl).map(|apy| (pair.id, apy))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::MockChain;
    use crate::stats::mock::MockStats;
    use rust_decimal_macros::dec;
    use std::sync::atomic::Ordering;

    fn baln() -> Token {
        Token::new("cxbaln", "BALN", "Balance Token", 18)
    }

    fn bnusd() -> Token {
        Token::new("cxbnusd", "bnUSD", "Balanced Dollar", 18)
    }

    fn pairs() -> Vec<PairInfo> {
        vec![PairInfo::new(3, baln(), bnusd()).with_rewards(dec!(0.2))]
    }

    fn stats() -> MockStats {
        let mut stats = MockStats::default();
        stats.rates.insert("BALN".to_string(), dec!(2));
        stats.rates.insert("bnUSD".to_string(), dec!(1));
        stats.tvls.insert(
            3,
            PairTvl {
                base: dec!(1000),
                quote: dec!(2000.5),
                total_supply: dec!(1400),
            },
        );
        stats
    }

    fn queries(chain: MockChain, stats: MockStats) -> RewardQueries {
        RewardQueries::new(
            Arc::new(chain),
            Arc::new(stats),
            Arc::new(TokenRegistry::new(vec![baln(), bnusd()])),
            Arc::new(pairs()),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_platform_day_parses_hex() {
        let q = queries(MockChain::with_day(0x1a4), stats());
        assert_eq!(q.platform_day().await.unwrap(), 420);
    }

    #[tokio::test]
    async fn test_reward_scaled_to_baln() {
        let mut chain = MockChain::with_day(1);
        chain
            .holdings
            .insert("hx1".to_string(), "0x29a2241af62c0000".to_string());
        let q = queries(chain, stats());

        let reward = q.reward("hx1").await.unwrap();
        assert_eq!(reward.amount, dec!(3));
        assert_eq!(reward.currency.symbol, "BALN");
        assert!(q.reward("hx2").await.unwrap().is_zero());
    }

    #[tokio::test]
    async fn test_eligibility_from_positions_and_stake() {
        let mut chain = MockChain::with_day(1);
        chain
            .lp_balances
            .insert((3, "hx1".to_string()), "0x10".to_string());
        chain.debts.insert("hx2".to_string(), "0x1".to_string());
        chain.staked.insert("hx2".to_string(), "0x5".to_string());
        let q = queries(chain, stats());

        assert!(q.has_rewardable("hx1").await.unwrap());
        assert!(!q.has_network_fees("hx1").await.unwrap());
        assert!(q.has_rewardable("hx2").await.unwrap());
        assert!(q.has_network_fees("hx2").await.unwrap());
        assert!(!q.has_rewardable("hx3").await.unwrap());
    }

    #[tokio::test]
    async fn test_collected_fees_require_account() {
        let q = queries(MockChain::with_day(100), stats());
        let err = q.user_collected_fees("", 1, 100).await.unwrap_err();
        assert!(matches!(err.inner(), DeskError::Validation(_)));
    }

    #[tokio::test]
    async fn test_tvl_usd_and_apy() {
        let mut chain = MockChain::with_day(1);
        chain.emission = "0x3635c9adc5dea00000".to_string(); // 1000 BALN
        let q = queries(chain, stats());

        let tvl = q.all_pairs_tvl_usd().await.unwrap();
        assert_eq!(tvl[&3], dec!(4001));

        let apy = q.all_pairs_apy().await.unwrap();
        // 1000 * 0.2 * 365 * 2 / 4001
        assert_eq!(apy[&3].round_dp(8), (dec!(146000) / dec!(4001)).round_dp(8));
    }

    #[tokio::test]
    async fn test_rates_cached_between_calls() {
        let stats = Arc::new(stats());
        let q = RewardQueries::new(
            Arc::new(MockChain::with_day(1)),
            stats.clone(),
            Arc::new(TokenRegistry::new(vec![baln(), bnusd()])),
            Arc::new(pairs()),
            Duration::from_secs(60),
        );
        q.rates().await.unwrap();
        q.all_pairs_tvl_usd().await.unwrap();
        assert_eq!(stats.rate_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_apy_skips_pairs_without_rewards_or_liquidity() {
        let pairs = vec![
            PairInfo::new(1, baln(), bnusd()),
            PairInfo::new(2, baln(), bnusd()).with_rewards(dec!(0.1)),
        ];
        let mut tvl = BTreeMap::new();
        tvl.insert(1, dec!(100));
        tvl.insert(2, Decimal::ZERO);
        let rates: HashMap<String, Decimal> = [("BALN".to_string(), dec!(1))].into();
        assert!(pairs_apy(&pairs, &tvl, &rates, dec!(10)).is_empty());
    }
}
