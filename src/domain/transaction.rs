use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction hash as returned by the chain
pub type TxHash = String;

/// Lifecycle of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failure,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Failure => "failure",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Success | TransactionStatus::Failure)
    }

    /// Only pending → terminal is allowed; terminal states never move
    pub fn can_transition_to(&self, target: TransactionStatus) -> bool {
        matches!(
            (self, target),
            (TransactionStatus::Pending, TransactionStatus::Success)
                | (TransactionStatus::Pending, TransactionStatus::Failure)
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User-facing text attached to a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// Shown while the transaction is pending, e.g. "Claiming fees..."
    pub pending: String,
    /// Shown once confirmed, e.g. "Claimed fees."
    pub summary: String,
}

impl TransactionSummary {
    pub fn new(pending: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            pending: pending.into(),
            summary: summary.into(),
        }
    }
}

/// Session record of a submitted transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: TxHash,
    pub account: String,
    pub status: TransactionStatus,
    pub text: TransactionSummary,
    pub added_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    pub fn new(hash: TxHash, account: &str, text: TransactionSummary) -> Self {
        Self {
            hash,
            account: account.to_string(),
            status: TransactionStatus::Pending,
            text,
            added_at: Utc::now(),
            confirmed_at: None,
        }
    }

    /// Text matching the current status
    pub fn display_text(&self) -> &str {
        match self.status {
            TransactionStatus::Pending => &self.text.pending,
            _ => &self.text.summary,
        }
    }
}

/// Result of a transaction lookup on chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Success,
    Failure,
}

impl From<TxOutcome> for TransactionStatus {
    fn from(outcome: TxOutcome) -> Self {
        match outcome {
            TxOutcome::Success => TransactionStatus::Success,
            TxOutcome::Failure => TransactionStatus::Failure,
        }
    }
}
