//! Transaction records and notification popups

use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::domain::{TransactionRecord, TransactionStatus, TransactionSummary, TxHash};
use crate::error::{DeskError, Result};

/// Notification shown when a transaction settles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    pub key: String,
    pub hash: TxHash,
    pub success: bool,
    pub summary: Option<String>,
    /// `None` keeps the popup until it is removed
    pub remove_after_ms: Option<u64>,
    #[serde(skip)]
    pub raised_at: Instant,
}

impl Popup {
    pub fn new(key: &str, hash: &str, success: bool, summary: Option<String>) -> Self {
        Self {
            key: key.to_string(),
            hash: hash.to_string(),
            success,
            summary,
            remove_after_ms: Some(POPUP_TTL_MS),
            raised_at: Instant::now(),
        }
    }

    pub fn with_ttl(mut self, remove_after_ms: Option<u64>) -> Self {
        self.remove_after_ms = remove_after_ms;
        self
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.remove_after_ms
            .is_some_and(|ms| now.saturating_duration_since(self.raised_at) >= Duration::from_millis(ms))
    }
}

/// Default lifetime of a transaction popup
pub const POPUP_TTL_MS: u64 = 15_000;

#[derive(Default)]
struct StoreInner {
    transactions: HashMap<TxHash, TransactionRecord>,
    popups: Vec<Popup>,
    should_ledger_sign: bool,
}

/// Application-wide transaction state.
///
/// A hash is bound to one action for the life of the store, records are
/// never removed and status only moves from pending to a terminal state.
#[derive(Default)]
pub struct TransactionStore {
    inner: RwLock<StoreInner>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted transaction as pending
    pub async fn add(
        &self,
        hash: &str,
        account: &str,
        text: TransactionSummary,
    ) -> Result<TransactionRecord> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.transactions.get(hash) {
            if existing.text == text && existing.account == account {
                debug!("transaction {} already recorded", hash);
                return Ok(existing.clone());
            }
            return Err(DeskError::HashReassigned {
                hash: hash.to_string(),
            });
        }

        let record = TransactionRecord::new(hash.to_string(), account, text);
        info!("recorded transaction {}: {}", hash, record.text.pending);
        inner.transactions.insert(hash.to_string(), record.clone());
        Ok(record)
    }

    /// Move a pending transaction to its terminal status and raise a popup
    pub async fn finalize(&self, hash: &str, status: TransactionStatus) -> Result<TransactionRecord> {
        let mut inner = self.inner.write().await;
        let record = inner
            .transactions
            .get_mut(hash)
            .ok_or_else(|| DeskError::Validation(format!("unknown transaction {}", hash)))?;

        if !record.status.can_transition_to(status) {
            return Err(DeskError::InvalidTransition {
                hash: hash.to_string(),
                from: record.status.to_string(),
                to: status.to_string(),
            });
        }

        record.status = status;
        record.confirmed_at = Some(Utc::now());
        let record = record.clone();
        drop(inner);

        self.add_popup(Popup::new(
            hash,
            hash,
            status == TransactionStatus::Success,
            Some(record.text.summary.clone()),
        ))
        .await;
        Ok(record)
    }

    pub async fn get(&self, hash: &str) -> Option<TransactionRecord> {
        self.inner.read().await.transactions.get(hash).cloned()
    }

    pub async fn status(&self, hash: &str) -> Option<TransactionStatus> {
        self.inner
            .read()
            .await
            .transactions
            .get(hash)
            .map(|record| record.status)
    }

    /// Records of `account`, oldest first
    pub async fn for_account(&self, account: &str) -> Vec<TransactionRecord> {
        let inner = self.inner.read().await;
        let mut records: Vec<_> = inner
            .transactions
            .values()
            .filter(|record| record.account == account)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.added_at);
        records
    }

    pub async fn pending_count(&self) -> usize {
        self.inner
            .read()
            .await
            .transactions
            .values()
            .filter(|record| record.status == TransactionStatus::Pending)
            .count()
    }

    /// Show `popup`, replacing one with the same key. Expired popups are dropped.
    pub async fn add_popup(&self, popup: Popup) {
        let now = Instant::now();
        let mut inner = self.inner.write().await;
        inner
            .popups
            .retain(|p| p.key != popup.key && !p.is_expired(now));
        inner.popups.push(popup);
    }

    pub async fn remove_popup(&self, key: &str) {
        self.inner.write().await.popups.retain(|p| p.key != key);
    }

    /// Popups still on screen
    pub async fn popups(&self) -> Vec<Popup> {
        let now = Instant::now();
        let mut inner = self.inner.write().await;
        inner.popups.retain(|p| !p.is_expired(now));
        inner.popups.clone()
    }

    pub async fn set_should_ledger_sign(&self, value: bool) {
        self.inner.write().await.should_ledger_sign = value;
    }

    /// Set while a hardware wallet is waiting for the user to sign
    pub async fn should_ledger_sign(&self) -> bool {
        self.inner.read().await.should_ledger_sign
    }
}
