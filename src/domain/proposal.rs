use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Governance proposal status as reported by the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    Pending,
    /// Scheduled by the governance contract, not yet voting
    Confirmed,
    Active,
    Cancelled,
    Defeated,
    Succeeded,
    NoQuorum,
    Executed,
    FailedExecution,
}

impl ProposalStatus {
    /// Wire string used by the governance contract
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "Pending",
            ProposalStatus::Confirmed => "Confirmed",
            ProposalStatus::Active => "Active",
            ProposalStatus::Cancelled => "Cancelled",
            ProposalStatus::Defeated => "Defeated",
            ProposalStatus::Succeeded => "Succeeded",
            ProposalStatus::NoQuorum => "No Quorum",
            ProposalStatus::Executed => "Executed",
            ProposalStatus::FailedExecution => "Failed Execution",
        }
    }

    /// Human label shown next to the status icon
    pub fn label(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "Pending",
            ProposalStatus::Confirmed => "Pending",
            ProposalStatus::Active => "Active",
            ProposalStatus::Cancelled => "Cancelled",
            ProposalStatus::Defeated => "Rejected",
            ProposalStatus::Succeeded => "Approved",
            ProposalStatus::NoQuorum => "Quorum not reached",
            ProposalStatus::Executed => "Enacted",
            ProposalStatus::FailedExecution => "Failed to enact",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ProposalStatus::Defeated
                | ProposalStatus::NoQuorum
                | ProposalStatus::FailedExecution
                | ProposalStatus::Cancelled
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProposalStatus::Succeeded | ProposalStatus::Executed)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(ProposalStatus::Pending),
            "confirmed" => Ok(ProposalStatus::Confirmed),
            "active" => Ok(ProposalStatus::Active),
            "cancelled" | "canceled" => Ok(ProposalStatus::Cancelled),
            "defeated" => Ok(ProposalStatus::Defeated),
            "succeeded" => Ok(ProposalStatus::Succeeded),
            "noquorum" => Ok(ProposalStatus::NoQuorum),
            "executed" => Ok(ProposalStatus::Executed),
            "failedexecution" => Ok(ProposalStatus::FailedExecution),
            _ => Err(format!("unknown proposal status '{}'", raw)),
        }
    }
}

/// A governance vote / proposal
#[derive(Debug, Clone, Serialize)]
pub struct Proposal {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub status: ProposalStatus,
    pub start_day: u64,
    pub end_day: u64,
    pub snapshot_day: u64,
    /// Approval share in percent
    pub for_pct: Decimal,
    /// Rejection share in percent
    pub against_pct: Decimal,
}

/// How the connected account voted on a proposal
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserVoteStatus {
    pub approval: Decimal,
    pub reject: Decimal,
}

impl UserVoteStatus {
    pub fn has_voted(&self) -> bool {
        !self.approval.is_zero() || !self.reject.is_zero()
    }
}
