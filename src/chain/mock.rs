//! In-memory chain used by unit tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::traits::ChainClient;
use super::types::{to_hex, RawVoteInfo, RawVoteStatus};
use crate::domain::{TxHash, TxOutcome};
use crate::error::{DeskError, Result};

type DividendFn = Box<dyn Fn(u64, u64) -> HashMap<String, String> + Send + Sync>;

pub struct MockChain {
    pub day: u64,
    pub holdings: HashMap<String, String>,
    pub emission: String,
    pub staked: HashMap<String, String>,
    pub lp_balances: HashMap<(u64, String), String>,
    pub debts: HashMap<String, String>,
    dividends: DividendFn,
    pub fail_dividends_at: Option<u64>,
    pub pools: HashMap<(String, String), u64>,
    pub pool_totals: HashMap<(u64, String), String>,
    pub failing_pools: Vec<String>,
    /// Pool lookups touching one of these tokens wait for a notification
    pub pool_gates: HashMap<String, Arc<Notify>>,
    pub votes: HashMap<u64, RawVoteInfo>,
    pub vote_status: HashMap<(String, u64), RawVoteStatus>,
    pub weights: HashMap<(String, u64), String>,
    pub proposals: Vec<RawVoteInfo>,
    pub fail_writes: bool,
    receipts: Mutex<HashMap<String, VecDeque<Option<TxOutcome>>>>,
    pub dividend_calls: Mutex<Vec<(u64, u64)>>,
    pub submitted: Mutex<Vec<String>>,
    pub read_calls: AtomicUsize,
    /// Number of receipt lookups that fail before receipts are served
    pub receipt_errors: AtomicUsize,
    tx_counter: AtomicUsize,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            day: 0,
            holdings: HashMap::new(),
            emission: "0x0".to_string(),
            staked: HashMap::new(),
            lp_balances: HashMap::new(),
            debts: HashMap::new(),
            dividends: Box::new(|_, _| HashMap::new()),
            fail_dividends_at: None,
            pools: HashMap::new(),
            pool_totals: HashMap::new(),
            failing_pools: Vec::new(),
            pool_gates: HashMap::new(),
            votes: HashMap::new(),
            vote_status: HashMap::new(),
            weights: HashMap::new(),
            proposals: Vec::new(),
            fail_writes: false,
            receipts: Mutex::new(HashMap::new()),
            dividend_calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            read_calls: AtomicUsize::new(0),
            receipt_errors: AtomicUsize::new(0),
            tx_counter: AtomicUsize::new(0),
        }
    }
}

impl MockChain {
    pub fn with_day(day: u64) -> Self {
        Self {
            day,
            ..Default::default()
        }
    }

    pub fn dividends_with<F>(mut self, f: F) -> Self
    where
        F: Fn(u64, u64) -> HashMap<String, String> + Send + Sync + 'static,
    {
        self.dividends = Box::new(f);
        self
    }

    pub fn with_pool(mut self, a: &str, b: &str, id: u64, reserve_a: &str, reserve_b: &str) -> Self {
        self.pools.insert(pool_key(a, b), id);
        self.pool_totals.insert((id, a.to_ascii_lowercase()), reserve_a.to_string());
        self.pool_totals.insert((id, b.to_ascii_lowercase()), reserve_b.to_string());
        self
    }

    /// Hold pool lookups for `token` until the returned gate is notified
    pub fn gate_pool(&mut self, token: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.pool_gates
            .insert(token.to_ascii_lowercase(), gate.clone());
        gate
    }

    /// Queue the receipts the watcher will see, in order
    pub fn script_receipts(&self, hash: &str, receipts: Vec<Option<TxOutcome>>) {
        self.receipts
            .lock()
            .unwrap()
            .insert(hash.to_string(), receipts.into_iter().collect());
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    fn record_write(&self, what: String) -> Result<TxHash> {
        if self.fail_writes {
            return Err(DeskError::Rpc {
                code: -32600,
                message: "user rejected".to_string(),
            });
        }
        self.submitted.lock().unwrap().push(what);
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("0x{:064x}", n))
    }
}

fn pool_key(a: &str, b: &str) -> (String, String) {
    let (a, b) = (a.to_ascii_lowercase(), b.to_ascii_lowercase());
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn get_day(&self) -> Result<String> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(to_hex(self.day as u128))
    }

    async fn get_baln_holding(&self, account: &str) -> Result<String> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .holdings
            .get(account)
            .cloned()
            .unwrap_or_else(|| "0x0".to_string()))
    }

    async fn get_emission(&self) -> Result<String> {
        Ok(self.emission.clone())
    }

    async fn get_staked_balance(&self, _token: &str, account: &str) -> Result<String> {
        Ok(self.staked.get(account).cloned().unwrap_or_else(|| "0x0".to_string()))
    }

    async fn get_lp_balance(&self, pool_id: u64, account: &str) -> Result<String> {
        Ok(self
            .lp_balances
            .get(&(pool_id, account.to_string()))
            .cloned()
            .unwrap_or_else(|| "0x0".to_string()))
    }

    async fn get_debt(&self, account: &str) -> Result<String> {
        Ok(self.debts.get(account).cloned().unwrap_or_else(|| "0x0".to_string()))
    }

    async fn get_user_dividends(
        &self,
        _account: &str,
        start: u64,
        end: u64,
    ) -> Result<HashMap<String, String>> {
        self.dividend_calls.lock().unwrap().push((start, end));
        if self.fail_dividends_at == Some(end) {
            return Err(DeskError::Rpc {
                code: -32000,
                message: "node unavailable".to_string(),
            });
        }
        Ok((self.dividends)(start, end))
    }

    async fn get_pool_id(&self, token_a: &str, token_b: &str) -> Result<String> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        for token in [token_a, token_b] {
            if let Some(gate) = self.pool_gates.get(&token.to_ascii_lowercase()) {
                gate.notified().await;
            }
        }
        if self.failing_pools.iter().any(|t| t.eq_ignore_ascii_case(token_a) || t.eq_ignore_ascii_case(token_b)) {
            return Err(DeskError::Rpc {
                code: -32000,
                message: "pool lookup failed".to_string(),
            });
        }
        let id = self.pools.get(&pool_key(token_a, token_b)).copied().unwrap_or(0);
        Ok(to_hex(id as u128))
    }

    async fn get_pool_total(&self, pool_id: u64, token: &str) -> Result<String> {
        Ok(self
            .pool_totals
            .get(&(pool_id, token.to_ascii_lowercase()))
            .cloned()
            .unwrap_or_else(|| "0x0".to_string()))
    }

    async fn get_vote_info(&self, index: u64) -> Result<RawVoteInfo> {
        self.votes
            .get(&index)
            .cloned()
            .ok_or_else(|| DeskError::Rpc {
                code: -32000,
                message: format!("no vote {}", index),
            })
    }

    async fn get_user_vote_status(&self, account: &str, index: u64) -> Result<RawVoteStatus> {
        Ok(self
            .vote_status
            .get(&(account.to_string(), index))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_user_weight(&self, account: &str, day: u64) -> Result<String> {
        Ok(self
            .weights
            .get(&(account.to_string(), day))
            .cloned()
            .unwrap_or_else(|| "0x0".to_string()))
    }

    async fn get_total_proposals(&self) -> Result<String> {
        Ok(to_hex(self.proposals.len() as u128))
    }

    async fn get_proposals(&self, offset: u64, count: u64) -> Result<Vec<RawVoteInfo>> {
        Ok(self
            .proposals
            .iter()
            .skip(offset as usize)
            .take(count as usize)
            .cloned()
            .collect())
    }

    async fn transaction_result(&self, hash: &str) -> Result<Option<TxOutcome>> {
        if self
            .receipt_errors
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(DeskError::Rpc {
                code: -32000,
                message: "node unavailable".to_string(),
            });
        }
        let mut receipts = self.receipts.lock().unwrap();
        match receipts.get_mut(hash) {
            Some(queue) if queue.len() > 1 => Ok(queue.pop_front().flatten()),
            Some(queue) => Ok(queue.front().copied().flatten()),
            None => Ok(None),
        }
    }

    async fn claim_rewards(&self) -> Result<TxHash> {
        self.record_write("claimRewards".to_string())
    }

    async fn claim_dividends(&self, start: u64, end: u64) -> Result<TxHash> {
        self.record_write(format!("claim({},{})", start, end))
    }

    async fn cast_vote(&self, vote_name: &str, approve: bool) -> Result<TxHash> {
        self.record_write(format!("castVote({},{})", vote_name, approve))
    }

    async fn deposit(&self, token: &str, raw_amount: u128) -> Result<TxHash> {
        self.record_write(format!("deposit({},{})", token, raw_amount))
    }

    async fn add_liquidity(
        &self,
        base_token: &str,
        quote_token: &str,
        base_raw: u128,
        quote_raw: u128,
    ) -> Result<TxHash> {
        self.record_write(format!(
            "add({},{},{},{})",
            base_token, quote_token, base_raw, quote_raw
        ))
    }
}
