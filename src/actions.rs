//! User actions that submit transactions
//!
//! Every action follows the same path: submit the call, record the hash as
//! pending, watch it until it settles and, on success, refetch the queries
//! whose data the transaction changed. Submission errors are logged and the
//! action resolves to `None`.

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::chain::ChainClient;
use crate::dex::SupplyPlan;
use crate::domain::{CurrencyAmount, TransactionStatus, TransactionSummary, TxHash};
use crate::error::Result;
use crate::query::Queries;
use crate::rewards::panel::{fee_claim_text, first_claim_window, reward_claim_text};
use crate::rewards::FEE_HISTORY_START;
use crate::tx::{TransactionStore, TransactionWatcher};
use crate::vote::dividend::vote_text;

type Refresh = Box<dyn FnOnce(Arc<Queries>, String) -> BoxFuture<'static, ()> + Send>;

/// Queries to refetch once a transaction succeeds, given the account
fn refresh<F, Fut>(f: F) -> Refresh
where
    F: FnOnce(Arc<Queries>, String) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Box::new(move |queries, account| f(queries, account).boxed())
}

/// A recorded transaction and the task following it to completion
pub struct Submitted {
    pub hash: TxHash,
    /// Resolves to the terminal status once dependents are refreshed
    pub done: JoinHandle<Option<TransactionStatus>>,
}

impl Submitted {
    /// Wait for the transaction to settle
    pub async fn settled(self) -> Option<TransactionStatus> {
        match self.done.await {
            Ok(status) => status,
            Err(e) => {
                error!("follow-up for {} aborted: {}", self.hash, e);
                None
            }
        }
    }
}

pub struct Actions {
    chain: Arc<dyn ChainClient>,
    queries: Arc<Queries>,
    watcher: Arc<TransactionWatcher>,
    account: String,
    dividend_vote_index: u64,
    ledger: bool,
}

impl Actions {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        queries: Arc<Queries>,
        watcher: Arc<TransactionWatcher>,
        account: impl Into<String>,
        dividend_vote_index: u64,
    ) -> Self {
        Self {
            chain,
            queries,
            watcher,
            account: account.into(),
            dividend_vote_index,
            ledger: false,
        }
    }

    /// Raise the ledger signing flag while each call is submitted
    pub fn with_ledger(mut self, ledger: bool) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn store(&self) -> &Arc<TransactionStore> {
        self.watcher.store()
    }

    /// Claim all unclaimed BALN rewards
    pub async fn claim_rewards(&self) -> Option<Submitted> {
        let reward = match self.queries.rewards.reward(&self.account).await {
            Ok(reward) => reward,
            Err(e) => {
                error!("cannot load rewards for {}: {}", self.account, e);
                return None;
            }
        };
        if reward.is_zero() {
            info!("no rewards to claim for {}", self.account);
            return None;
        }

        let chain = self.chain.clone();
        self.run(
            "claim rewards",
            reward_claim_text(&reward),
            async move { chain.claim_rewards().await },
            refresh(|queries, account| async move {
                queries.rewards.invalidate_reward(&account);
                if let Err(e) = queries.rewards.reward(&account).await {
                    warn!("refetching rewards for {} failed: {}", account, e);
                }
            }),
        )
        .await
    }

    /// Claim the newest dividend window that holds fees
    pub async fn claim_fees(&self) -> Option<Submitted> {
        let rewards = &self.queries.rewards;
        let day = match rewards.platform_day().await {
            Ok(day) => day,
            Err(e) => {
                error!("cannot load platform day: {}", e);
                return None;
            }
        };
        let windows = match rewards
            .user_collected_fees(&self.account, FEE_HISTORY_START, day)
            .await
        {
            Ok(windows) => windows,
            Err(e) => {
                error!("cannot load collected fees for {}: {}", self.account, e);
                return None;
            }
        };
        let Some(window) = first_claim_window(&windows) else {
            info!("no fees to claim for {}", self.account);
            return None;
        };

        debug!("claiming fees for days {}..{}", window.start, window.end);
        let chain = self.chain.clone();
        self.run(
            "claim fees",
            fee_claim_text(),
            async move { chain.claim_dividends(window.start, window.end).await },
            refresh(move |queries, account| async move {
                queries.rewards.invalidate_fees(&account);
                if let Err(e) = queries
                    .rewards
                    .user_collected_fees(&account, FEE_HISTORY_START, day)
                    .await
                {
                    warn!("refetching fees for {} failed: {}", account, e);
                }
            }),
        )
        .await
    }

    /// Vote on the fee distribution proposal
    pub async fn cast_vote(&self, approve: bool) -> Option<Submitted> {
        let index = self.dividend_vote_index;
        let proposal = match self.queries.votes.vote_info(index).await {
            Ok(proposal) => proposal,
            Err(e) => {
                error!("cannot load vote {}: {}", index, e);
                return None;
            }
        };

        let chain = self.chain.clone();
        let name = proposal.name.clone();
        self.run(
            "cast vote",
            vote_text(),
            async move { chain.cast_vote(&name, approve).await },
            refresh(move |queries, account| async move {
                queries.votes.invalidate_vote(&account, index);
                let (info, status) = tokio::join!(
                    queries.votes.vote_info(index),
                    queries.votes.user_vote_status(&account, index)
                );
                if let Err(e) = info.and(status) {
                    warn!("refetching vote {} failed: {}", index, e);
                }
            }),
        )
        .await
    }

    /// Deposit both tokens, then add them to the pool.
    ///
    /// Each step waits for the previous one to succeed; the returned handle
    /// follows the final add.
    pub async fn supply_liquidity(&self, plan: &SupplyPlan) -> Option<Submitted> {
        for amount in [&plan.base, &plan.quote] {
            let deposit = self.deposit(amount).await?;
            let hash = deposit.hash.clone();
            match deposit.settled().await {
                Some(TransactionStatus::Success) => {}
                other => {
                    warn!("deposit {} ended as {:?}, supply stopped", hash, other);
                    return None;
                }
            }
        }

        let (base_raw, quote_raw) = match (plan.base.raw(), plan.quote.raw()) {
            (Ok(base), Ok(quote)) => (base, quote),
            (Err(e), _) | (_, Err(e)) => {
                error!("invalid supply amounts for {}: {}", plan.pair.name, e);
                return None;
            }
        };
        let chain = self.chain.clone();
        let base_token = plan.base.currency.address.clone();
        let quote_token = plan.quote.currency.address.clone();
        self.run(
            "supply liquidity",
            plan.supply_text(),
            async move {
                chain
                    .add_liquidity(&base_token, &quote_token, base_raw, quote_raw)
                    .await
            },
            refresh(|queries, account| async move {
                queries.rewards.invalidate_tvl();
                queries.rewards.invalidate_rewardable(&account);
                let (tvl, rewardable) = tokio::join!(
                    queries.rewards.all_pairs_tvl(),
                    queries.rewards.has_rewardable(&account)
                );
                if let Err(e) = tvl {
                    warn!("refetching pool liquidity failed: {}", e);
                }
                if let Err(e) = rewardable {
                    warn!("refetching positions of {} failed: {}", account, e);
                }
            }),
        )
        .await
    }

    async fn deposit(&self, amount: &CurrencyAmount) -> Option<Submitted> {
        if amount.currency.is_native() {
            error!("{} cannot be deposited to the pool", amount.currency.symbol);
            return None;
        }
        let raw = match amount.raw() {
            Ok(raw) => raw,
            Err(e) => {
                error!("invalid deposit of {}: {}", amount.currency.symbol, e);
                return None;
            }
        };
        let chain = self.chain.clone();
        let token = amount.currency.address.clone();
        self.run(
            "deposit",
            SupplyPlan::deposit_text(amount),
            async move { chain.deposit(&token, raw).await },
            refresh(|_, _| async {}),
        )
        .await
    }

    async fn run<F>(
        &self,
        action: &str,
        text: TransactionSummary,
        submit: F,
        refresh: Refresh,
    ) -> Option<Submitted>
    where
        F: Future<Output = Result<TxHash>>,
    {
        let store = self.watcher.store();
        if self.ledger {
            store.set_should_ledger_sign(true).await;
        }
        let submitted = submit.await;
        if self.ledger {
            store.set_should_ledger_sign(false).await;
        }

        let hash = match submitted {
            Ok(hash) => hash,
            Err(e) => {
                error!("{} failed: {}", action, e);
                return None;
            }
        };
        if let Err(e) = store.add(&hash, &self.account, text).await {
            error!("cannot record {} transaction {}: {}", action, hash, e);
            return None;
        }
        info!("{} submitted as {}", action, hash);

        let done = self.follow(hash.clone(), refresh);
        Some(Submitted { hash, done })
    }

    fn follow(&self, hash: TxHash, refresh: Refresh) -> JoinHandle<Option<TransactionStatus>> {
        let watcher = self.watcher.clone();
        let queries = self.queries.clone();
        let account = self.account.clone();
        tokio::spawn(async move {
            let status = match watcher.watch(&hash).await {
                Ok(Some(status)) => status,
                Ok(None) => watcher.store().status(&hash).await?,
                Err(e) => {
                    error!("watching {} failed: {}", hash, e);
                    return None;
                }
            };
            if status == TransactionStatus::Success {
                refresh(queries, account).await;
            }
            Some(status)
        })
    }
}
