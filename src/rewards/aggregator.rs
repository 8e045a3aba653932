//! Batched dividend history reader
//!
//! Walks a day range backward in fixed windows, reads every window
//! concurrently and collapses windows without any nonzero fee to `None`.

use futures::future::try_join_all;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::chain::ChainClient;
use crate::domain::{CurrencyAmount, TokenRegistry};
use crate::error::Result;

/// Days covered by one dividend read
pub const BATCH_SIZE: u64 = 50;

/// First platform day with dividends
pub const FEE_HISTORY_START: u64 = 1;

/// Bounds of one dividend read, `start..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DividendWindow {
    pub start: u64,
    pub end: u64,
}

/// Fees accrued in one window; `None` when every amount is zero
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeWindow {
    pub window: DividendWindow,
    pub fees: Option<BTreeMap<String, CurrencyAmount>>,
}

impl FeeWindow {
    pub fn is_claimable(&self) -> bool {
        self.fees.is_some()
    }
}

/// Windows for `[start, end)`, newest first.
///
/// The cursor steps back `BATCH_SIZE + 1` days per window and the lower
/// bound is clamped at day zero.
pub fn dividend_windows(start: u64, end: u64) -> Vec<DividendWindow> {
    let mut windows = Vec::new();
    let mut cursor = end;
    while cursor > start {
        windows.push(DividendWindow {
            start: cursor.saturating_sub(BATCH_SIZE),
            end: cursor,
        });
        cursor = cursor.saturating_sub(BATCH_SIZE + 1);
    }
    windows
}

/// Scale raw dividend values into amounts, or `None` if nothing is owed
pub fn normalize_fees(
    raw: &HashMap<String, String>,
    tokens: &TokenRegistry,
) -> Result<Option<BTreeMap<String, CurrencyAmount>>> {
    let mut fees = BTreeMap::new();
    let mut any_nonzero = false;

    for (address, value) in raw {
        let Some(token) = tokens.by_address(address) else {
            warn!("skipping dividend in unknown token {}", address);
            continue;
        };
        let amount = CurrencyAmount::from_raw(token.clone(), value)?;
        any_nonzero |= !amount.is_zero();
        fees.insert(token.address.clone(), amount);
    }

    Ok(any_nonzero.then_some(fees))
}

/// Reads a user's dividend history in concurrent windows
#[derive(Clone)]
pub struct FeeAggregator {
    chain: Arc<dyn ChainClient>,
    tokens: Arc<TokenRegistry>,
}

impl FeeAggregator {
    pub fn new(chain: Arc<dyn ChainClient>, tokens: Arc<TokenRegistry>) -> Self {
        Self { chain, tokens }
    }

    /// Fees per window for `[start, end)`, newest window first.
    ///
    /// Any failed read fails the whole call.
    #[instrument(skip(self))]
    pub async fn collect(&self, account: &str, start: u64, end: u64) -> Result<Vec<FeeWindow>> {
        let windows = dividend_windows(start, end);
        debug!("reading {} dividend windows", windows.len());

        let reads = windows
            .iter()
            .map(|w| self.chain.get_user_dividends(account, w.start, w.end));
        let results = try_join_all(reads).await?;

        windows
            .into_iter()
            .zip(results)
            .map(|(window, raw)| {
                Ok(FeeWindow {
                    window,
                    fees: normalize_fees(&raw, &self.tokens)?,
                })
            })
            .collect()
    }
}
