//! Pool reserve lookups for token pairs

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::chain::{parse_hex_u64, ChainClient};
use crate::domain::{CurrencyAmount, Pair, Token};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PairState {
    Loading,
    NotExists,
    Exists,
    Invalid,
}

/// Two optional token references to resolve into a pool
pub type PairInput = (Option<Token>, Option<Token>);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairResult {
    pub state: PairState,
    pub pair: Option<Pair>,
}

impl PairResult {
    fn with_state(state: PairState) -> Self {
        Self { state, pair: None }
    }

    pub fn loading() -> Self {
        Self::with_state(PairState::Loading)
    }

    pub fn exists(pair: Pair) -> Self {
        Self {
            state: PairState::Exists,
            pair: Some(pair),
        }
    }
}

/// Both tokens present, distinct and on the same chain
fn valid_tokens<'a>(a: Option<&'a Token>, b: Option<&'a Token>) -> Option<(&'a Token, &'a Token)> {
    let (a, b) = (a?, b?);
    if a.chain_id != b.chain_id || a.address.eq_ignore_ascii_case(&b.address) {
        return None;
    }
    Some((a, b))
}

/// Reserves of the pool for `a` and `b`, `None` when no pool exists
async fn lookup_reserves(chain: &dyn ChainClient, a: &Token, b: &Token) -> Result<Option<Pair>> {
    let (token0, token1) = if a.sorts_before(b) { (a, b) } else { (b, a) };

    let pool_id = parse_hex_u64(&chain.get_pool_id(&token0.address, &token1.address).await?)?;
    if pool_id == 0 {
        return Ok(None);
    }

    let reserve0 = chain.get_pool_total(pool_id, &token0.address).await?;
    let reserve1 = chain.get_pool_total(pool_id, &token1.address).await?;
    debug!(
        "pool {} {}/{}: {} / {}",
        pool_id, token0.symbol, token1.symbol, reserve0, reserve1
    );

    Ok(Some(Pair::new(
        CurrencyAmount::from_raw(token0.clone(), &reserve0)?,
        CurrencyAmount::from_raw(token1.clone(), &reserve1)?,
    )))
}

/// Resolve one token pair
pub async fn resolve_pair(chain: &dyn ChainClient, a: Option<&Token>, b: Option<&Token>) -> PairResult {
    let Some((a, b)) = valid_tokens(a, b) else {
        return PairResult::with_state(PairState::Invalid);
    };

    match lookup_reserves(chain, a, b).await {
        Ok(Some(pair)) => PairResult::exists(pair),
        Ok(None) => PairResult::with_state(PairState::NotExists),
        Err(e) => {
            warn!("reserve lookup for {}/{} failed: {}", a.symbol, b.symbol, e);
            PairResult::with_state(PairState::NotExists)
        }
    }
}

/// Resolve every pair concurrently; results line up with `inputs`
pub async fn resolve_pairs(chain: &dyn ChainClient, inputs: &[PairInput]) -> Vec<PairResult> {
    join_all(
        inputs
            .iter()
            .map(|(a, b)| resolve_pair(chain, a.as_ref(), b.as_ref())),
    )
    .await
}

#[derive(Default)]
struct TrackerState {
    inputs: Vec<PairInput>,
    results: Vec<PairResult>,
}

/// Observable reserve state for a changing set of pairs.
///
/// Inputs and results are always replaced together. A resolution that
/// settles after a newer one overwrites it.
pub struct PairReserveTracker {
    chain: Arc<dyn ChainClient>,
    state: Arc<RwLock<TrackerState>>,
}

impl PairReserveTracker {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self {
            chain,
            state: Arc::new(RwLock::new(TrackerState::default())),
        }
    }

    /// Switch every slot to `Loading` and resolve the new inputs in the background
    pub async fn set_inputs(&self, inputs: Vec<PairInput>) -> JoinHandle<()> {
        {
            let mut state = self.state.write().await;
            state.results = vec![PairResult::loading(); inputs.len()];
            state.inputs = inputs.clone();
        }

        let chain = self.chain.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            let results = resolve_pairs(chain.as_ref(), &inputs).await;
            let mut state = state.write().await;
            state.inputs = inputs;
            state.results = results;
        })
    }

    pub async fn results(&self) -> Vec<PairResult> {
        self.state.read().await.results.clone()
    }

    /// Inputs paired with their current results
    pub async fn snapshot(&self) -> Vec<(PairInput, PairResult)> {
        let state = self.state.read().await;
        state
            .inputs
            .iter()
            .cloned()
            .zip(state.results.iter().cloned())
            .collect()
    }
}
