//! Cached remote queries

pub mod cache;
pub mod keys;
pub mod reward;
pub mod vote;

use std::sync::Arc;
use std::time::Duration;

use crate::chain::ChainClient;
use crate::domain::{PairInfo, TokenRegistry};
use crate::error::QueryError;
use crate::stats::StatsApi;

pub use cache::{QueryCache, QueryState};
pub use keys::QueryKey;
pub use reward::RewardQueries;
pub use vote::VoteQueries;

pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Every query family behind one handle
pub struct Queries {
    pub rewards: RewardQueries,
    pub votes: VoteQueries,
}

impl Queries {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        stats: Arc<dyn StatsApi>,
        tokens: Arc<TokenRegistry>,
        pairs: Arc<Vec<PairInfo>>,
        stale_time: Duration,
    ) -> Self {
        Self {
            rewards: RewardQueries::new(chain.clone(), stats, tokens, pairs, stale_time),
            votes: VoteQueries::new(chain, stale_time),
        }
    }
}
