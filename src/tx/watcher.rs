//! Transaction status watcher
//!
//! Polls the chain for a submitted hash until it reaches a terminal state,
//! records the result in the store and broadcasts it once.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::store::TransactionStore;
use crate::chain::ChainClient;
use crate::config::WatcherConfig;
use crate::domain::{TransactionStatus, TxHash};
use crate::error::{DeskError, Result};

const EVENT_CAPACITY: usize = 256;

/// Terminal transition of a watched transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionEvent {
    pub hash: TxHash,
    pub status: TransactionStatus,
}

pub struct TransactionWatcher {
    chain: Arc<dyn ChainClient>,
    store: Arc<TransactionStore>,
    poll_interval: Duration,
    events: broadcast::Sender<TransactionEvent>,
}

impl TransactionWatcher {
    pub fn new(chain: Arc<dyn ChainClient>, store: Arc<TransactionStore>, config: &WatcherConfig) -> Self {
        Self::with_interval(chain, store, Duration::from_millis(config.poll_interval_ms))
    }

    pub fn with_interval(
        chain: Arc<dyn ChainClient>,
        store: Arc<TransactionStore>,
        poll_interval: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            chain,
            store,
            poll_interval,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransactionEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &Arc<TransactionStore> {
        &self.store
    }

    /// Poll until `hash` settles.
    ///
    /// Returns `None` when the transaction was already terminal, in which
    /// case nothing is published.
    pub async fn watch(&self, hash: &str) -> Result<Option<TransactionStatus>> {
        match self.store.status(hash).await {
            None => {
                return Err(DeskError::Validation(format!(
                    "transaction {} is not recorded",
                    hash
                )))
            }
            Some(status) if status.is_terminal() => {
                debug!("transaction {} already {}", hash, status);
                return Ok(None);
            }
            Some(_) => {}
        }

        let mut interval = tokio::time::interval(self.poll_interval);
        let status: TransactionStatus = loop {
            interval.tick().await;
            match self.chain.transaction_result(hash).await {
                Ok(Some(outcome)) => break outcome.into(),
                Ok(None) => debug!("transaction {} not yet in a block", hash),
                Err(e) => warn!("receipt lookup for {} failed: {}", hash, e),
            }
        };

        match self.store.finalize(hash, status).await {
            Ok(_) => {}
            Err(DeskError::InvalidTransition { .. }) => {
                debug!("transaction {} settled by another watcher", hash);
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        info!("transaction {} {}", hash, status);
        // no subscribers is not an error
        let _ = self.events.send(TransactionEvent {
            hash: hash.to_string(),
            status,
        });
        Ok(Some(status))
    }

    /// Watch `hash` on a background task
    pub fn spawn(self: &Arc<Self>, hash: TxHash) -> JoinHandle<()> {
        let watcher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = watcher.watch(&hash).await {
                error!("watching {} failed: {}", hash, e);
            }
        })
    }

    /// Resolve once `hash` reaches a terminal status
    pub async fn wait_for_terminal(&self, hash: &str) -> Result<TransactionStatus> {
        let mut events = self.subscribe();

        match self.store.status(hash).await {
            None => {
                return Err(DeskError::Validation(format!(
                    "transaction {} is not recorded",
                    hash
                )))
            }
            Some(status) if status.is_terminal() => return Ok(status),
            Some(_) => {}
        }

        loop {
            match events.recv().await {
                Ok(event) if event.hash == hash => return Ok(event.status),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("missed {} transaction events", skipped);
                    if let Some(status) = self.store.status(hash).await.filter(|s| s.is_terminal()) {
                        return Ok(status);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(DeskError::Internal("transaction events closed".to_string()))
                }
            }
        }
    }
}
