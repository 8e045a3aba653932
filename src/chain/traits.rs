use async_trait::async_trait;
use std::collections::HashMap;

use super::types::{RawVoteInfo, RawVoteStatus};
use crate::domain::{TxHash, TxOutcome};
use crate::error::Result;

/// Remote interface to the platform contracts.
///
/// Reads return raw chain values (hex integers, address maps); scaling to
/// token units happens in the query layer. Writes are signed by the
/// client's wallet and resolve to the transaction hash.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current platform day, hex encoded
    async fn get_day(&self) -> Result<String>;

    /// Unclaimed BALN rewards of an account
    async fn get_baln_holding(&self, account: &str) -> Result<String>;

    /// Daily BALN emission
    async fn get_emission(&self) -> Result<String>;

    /// Staked balance of `account` in the token contract `token`
    async fn get_staked_balance(&self, token: &str, account: &str) -> Result<String>;

    /// Liquidity tokens `account` holds in pool `pool_id`
    async fn get_lp_balance(&self, pool_id: u64, account: &str) -> Result<String>;

    /// Outstanding loan debt of `account`, `0x0` without a position
    async fn get_debt(&self, account: &str) -> Result<String>;

    /// Dividends accrued by `account` over days `[start, end)`, keyed by token address
    async fn get_user_dividends(
        &self,
        account: &str,
        start: u64,
        end: u64,
    ) -> Result<HashMap<String, String>>;

    /// Pool id for a token pair, `0x0` when no pool exists
    async fn get_pool_id(&self, token_a: &str, token_b: &str) -> Result<String>;

    /// Balance of `token` held by pool `pool_id`
    async fn get_pool_total(&self, pool_id: u64, token: &str) -> Result<String>;

    async fn get_vote_info(&self, index: u64) -> Result<RawVoteInfo>;

    async fn get_user_vote_status(&self, account: &str, index: u64) -> Result<RawVoteStatus>;

    /// Voting weight of an account on a snapshot day
    async fn get_user_weight(&self, account: &str, day: u64) -> Result<String>;

    async fn get_total_proposals(&self) -> Result<String>;

    async fn get_proposals(&self, offset: u64, count: u64) -> Result<Vec<RawVoteInfo>>;

    /// `None` while the transaction is not yet in a block
    async fn transaction_result(&self, hash: &str) -> Result<Option<TxOutcome>>;

    async fn claim_rewards(&self) -> Result<TxHash>;

    async fn claim_dividends(&self, start: u64, end: u64) -> Result<TxHash>;

    async fn cast_vote(&self, vote_name: &str, approve: bool) -> Result<TxHash>;

    /// Transfer `raw_amount` of `token` into the DEX deposit balance
    async fn deposit(&self, token: &str, raw_amount: u128) -> Result<TxHash>;

    async fn add_liquidity(
        &self,
        base_token: &str,
        quote_token: &str,
        base_raw: u128,
        quote_raw: u128,
    ) -> Result<TxHash>;
}
