//! Governance queries

use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::cache::QueryCache;
use super::keys::QueryKey;
use super::QueryResult;
use crate::chain::{parse_hex_u64, ChainClient, RawVoteInfo, RawVoteStatus};
use crate::domain::{to_units, Proposal, ProposalStatus, UserVoteStatus};
use crate::error::{DeskError, Result};

fn share_to_pct(raw: Option<&str>) -> Result<Decimal> {
    let share = match raw {
        Some(raw) => to_units(raw, 18)?,
        None => Decimal::ZERO,
    };
    Ok((share * Decimal::ONE_HUNDRED).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Convert a contract vote record into a [`Proposal`]
pub fn parse_proposal(raw: &RawVoteInfo) -> Result<Proposal> {
    let status: ProposalStatus = raw
        .status
        .parse()
        .map_err(DeskError::InvalidResponse)?;

    Ok(Proposal {
        id: parse_hex_u64(&raw.id)?,
        name: raw.name.clone(),
        description: raw.description.clone(),
        status,
        start_day: parse_hex_u64(&raw.start_day)?,
        end_day: parse_hex_u64(&raw.end_day)?,
        snapshot_day: match &raw.snapshot {
            Some(day) => parse_hex_u64(day)?,
            None => 0,
        },
        for_pct: share_to_pct(raw.for_share.as_deref())?,
        against_pct: share_to_pct(raw.against_share.as_deref())?,
    })
}

pub fn parse_vote_status(raw: &RawVoteStatus) -> Result<UserVoteStatus> {
    let weight = |value: &Option<String>| match value {
        Some(v) => to_units(v, 18),
        None => Ok(Decimal::ZERO),
    };
    Ok(UserVoteStatus {
        approval: weight(&raw.approval)?,
        reject: weight(&raw.reject)?,
    })
}

pub struct VoteQueries {
    chain: Arc<dyn ChainClient>,
    info: QueryCache<Proposal>,
    status: QueryCache<UserVoteStatus>,
    weight: QueryCache<Decimal>,
    proposals: QueryCache<Vec<Proposal>>,
}

impl VoteQueries {
    pub fn new(chain: Arc<dyn ChainClient>, stale_time: Duration) -> Self {
        Self {
            chain,
            info: QueryCache::new(stale_time),
            status: QueryCache::new(stale_time),
            weight: QueryCache::new(stale_time),
            proposals: QueryCache::new(stale_time),
        }
    }

    pub async fn vote_info(&self, index: u64) -> QueryResult<Proposal> {
        let chain = self.chain.clone();
        self.info
            .fetch(QueryKey::VoteInfo(index), move || async move {
                parse_proposal(&chain.get_vote_info(index).await?)
            })
            .await
    }

    pub async fn user_vote_status(&self, account: &str, index: u64) -> QueryResult<UserVoteStatus> {
        let chain = self.chain.clone();
        let voter = account.to_string();
        let key = QueryKey::UserVoteStatus {
            account: account.to_string(),
            index,
        };
        self.status
            .fetch(key, move || async move {
                parse_vote_status(&chain.get_user_vote_status(&voter, index).await?)
            })
            .await
    }

    /// Voting weight of `account` on snapshot `day`
    pub async fn user_weight(&self, account: &str, day: u64) -> QueryResult<Decimal> {
        let chain = self.chain.clone();
        let voter = account.to_string();
        let key = QueryKey::UserWeight {
            account: account.to_string(),
            day,
        };
        self.weight
            .fetch(key, move || async move {
                to_units(&chain.get_user_weight(&voter, day).await?, 18)
            })
            .await
    }

    /// All proposals, newest first
    pub async fn proposals(&self) -> QueryResult<Vec<Proposal>> {
        let chain = self.chain.clone();
        self.proposals
            .fetch(QueryKey::TotalProposals, move || async move {
                let count = parse_hex_u64(&chain.get_total_proposals().await?)?;
                let raw = chain.get_proposals(0, count).await?;
                debug!("loaded {} of {} proposals", raw.len(), count);
                let mut proposals = raw.iter().map(parse_proposal).collect::<Result<Vec<_>>>()?;
                proposals.sort_by(|a, b| b.id.cmp(&a.id));
                Ok(proposals)
            })
            .await
    }

    /// Mark the vote and the account's ballot on it stale
    pub fn invalidate_vote(&self, account: &str, index: u64) {
        self.info.invalidate(&QueryKey::VoteInfo(index));
        self.status.invalidate(&QueryKey::UserVoteStatus {
            account: account.to_string(),
            index,
        });
        self.proposals.invalidate(&QueryKey::TotalProposals);
    }
}
