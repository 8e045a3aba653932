#![allow(dead_code)]

use async_trait::async_trait;
use dexdesk::chain::{ChainClient, RawVoteInfo, RawVoteStatus};
use dexdesk::domain::{PairInfo, Token, TokenRegistry, TxHash, TxOutcome};
use dexdesk::error::Result;
use dexdesk::query::Queries;
use dexdesk::stats::{PairTvl, StatsApi};
use mockall::mock;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const ACCOUNT: &str = "hx00000000000000000000000000000000000000aa";

mock! {
    pub Chain {}

    #[async_trait]
    impl ChainClient for Chain {
        async fn get_day(&self) -> Result<String>;
        async fn get_baln_holding(&self, account: &str) -> Result<String>;
        async fn get_emission(&self) -> Result<String>;
        async fn get_staked_balance(&self, token: &str, account: &str) -> Result<String>;
        async fn get_lp_balance(&self, pool_id: u64, account: &str) -> Result<String>;
        async fn get_debt(&self, account: &str) -> Result<String>;
        async fn get_user_dividends(
            &self,
            account: &str,
            start: u64,
            end: u64,
        ) -> Result<HashMap<String, String>>;
        async fn get_pool_id(&self, token_a: &str, token_b: &str) -> Result<String>;
        async fn get_pool_total(&self, pool_id: u64, token: &str) -> Result<String>;
        async fn get_vote_info(&self, index: u64) -> Result<RawVoteInfo>;
        async fn get_user_vote_status(&self, account: &str, index: u64) -> Result<RawVoteStatus>;
        async fn get_user_weight(&self, account: &str, day: u64) -> Result<String>;
        async fn get_total_proposals(&self) -> Result<String>;
        async fn get_proposals(&self, offset: u64, count: u64) -> Result<Vec<RawVoteInfo>>;
        async fn transaction_result(&self, hash: &str) -> Result<Option<TxOutcome>>;
        async fn claim_rewards(&self) -> Result<TxHash>;
        async fn claim_dividends(&self, start: u64, end: u64) -> Result<TxHash>;
        async fn cast_vote(&self, vote_name: &str, approve: bool) -> Result<TxHash>;
        async fn deposit(&self, token: &str, raw_amount: u128) -> Result<TxHash>;
        async fn add_liquidity(
            &self,
            base_token: &str,
            quote_token: &str,
            base_raw: u128,
            quote_raw: u128,
        ) -> Result<TxHash>;
    }
}

mock! {
    pub Stats {}

    #[async_trait]
    impl StatsApi for Stats {
        async fn token_rates(&self) -> Result<HashMap<String, Decimal>>;
        async fn pair_tvl(&self, pair: &PairInfo) -> Result<PairTvl>;
    }
}

pub fn baln() -> Token {
    Token::new("cxbaln", "BALN", "Balance Token", 18)
}

pub fn bnusd() -> Token {
    Token::new("cxbnusd", "bnUSD", "Balanced Dollar", 18).with_terms("usd stablecoin")
}

pub fn sicx() -> Token {
    Token::new("cxsicx", "sICX", "Staked ICX", 18)
}

pub fn registry() -> Arc<TokenRegistry> {
    Arc::new(TokenRegistry::new([baln(), bnusd(), sicx()]))
}

pub fn pairs() -> Arc<Vec<PairInfo>> {
    Arc::new(vec![
        PairInfo::new(2, sicx(), bnusd()),
        PairInfo::new(3, baln(), bnusd()),
        PairInfo::new(4, baln(), sicx()),
    ])
}

pub fn queries(chain: Arc<MockChain>) -> Arc<Queries> {
    Arc::new(Queries::new(
        chain,
        Arc::new(MockStats::new()),
        registry(),
        pairs(),
        Duration::from_secs(60),
    ))
}

/// One whole token at 18 decimals, hex encoded
pub const ONE: &str = "0xde0b6b3a7640000";

pub fn tx(n: u64) -> String {
    format!("0x{:064x}", n)
}
