//! View state for the fee distribution vote

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;

use super::status::voting_ends_in;
use crate::domain::{format_grouped, Proposal, TransactionSummary, UserVoteStatus};

pub const VOTE_LINK_TEXT: &str = "Vote to distribute fees";
pub const PROGRESS_LINK_TEXT: &str = "Check voting progress";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Ballot {
    Approve,
    Reject,
}

impl Ballot {
    pub fn approves(self) -> bool {
        self == Ballot::Approve
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state")]
pub enum DividendVoteView {
    /// The account has voted; show the tally
    Progress {
        for_pct: Decimal,
        against_pct: Decimal,
        your_vote: Option<Ballot>,
        weight: Decimal,
        ends_in: String,
    },
    /// The account can still vote
    Ballot { weight: Decimal, ends_in: String },
}

impl DividendVoteView {
    pub fn new(
        proposal: &Proposal,
        vote_status: Option<&UserVoteStatus>,
        weight: Option<Decimal>,
        platform_day: u64,
        now: DateTime<Utc>,
    ) -> Self {
        let weight = weight.unwrap_or(Decimal::ZERO);
        let ends_in = voting_ends_in(proposal.end_day, platform_day, now);

        match vote_status.filter(|status| status.has_voted()) {
            Some(status) => {
                let your_vote = if !status.approval.is_zero() {
                    Some(Ballot::Approve)
                } else if !status.reject.is_zero() {
                    Some(Ballot::Reject)
                } else {
                    None
                };
                DividendVoteView::Progress {
                    for_pct: proposal.for_pct,
                    against_pct: proposal.against_pct,
                    your_vote,
                    weight,
                    ends_in,
                }
            }
            None => DividendVoteView::Ballot { weight, ends_in },
        }
    }

    pub fn link_text(&self) -> &'static str {
        match self {
            DividendVoteView::Progress { .. } => PROGRESS_LINK_TEXT,
            DividendVoteView::Ballot { .. } => VOTE_LINK_TEXT,
        }
    }

    pub fn weight_text(&self) -> String {
        let weight = match self {
            DividendVoteView::Progress { weight, .. } | DividendVoteView::Ballot { weight, .. } => {
                *weight
            }
        };
        format!("{} BALN", format_grouped(weight, 2))
    }
}

/// Nonzero collected fees as `(symbol, whole amount)`, in symbol order
pub fn collected_fee_lines(fees: &BTreeMap<String, Decimal>) -> Vec<(String, String)> {
    fees.iter()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(symbol, amount)| {
            let whole = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            (symbol.clone(), format_grouped(whole, 0))
        })
        .collect()
}

pub fn vote_text() -> TransactionSummary {
    TransactionSummary::new("Voting...", "Voted.")
}
