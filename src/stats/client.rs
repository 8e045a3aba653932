//! HTTP client for the statistics API

use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::StatsConfig;
use crate::domain::{to_units, PairInfo};
use crate::error::{DeskError, Result};

/// Raw integer that the API sends either as a string or a JSON number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawValue(pub String);

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(s) => Ok(RawValue(s)),
            serde_json::Value::Number(n) => Ok(RawValue(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number, got {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenStatsResponse {
    pub tokens: HashMap<String, TokenStat>,
}

#[derive(Debug, Deserialize)]
pub struct TokenStat {
    /// Price in USD, 18 decimal raw integer
    pub price: RawValue,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct PairStatsResponse {
    pub base: RawValue,
    pub quote: RawValue,
    pub total_supply: RawValue,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Pool liquidity in token units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairTvl {
    pub base: Decimal,
    pub quote: Decimal,
    pub total_supply: Decimal,
}

impl PairStatsResponse {
    pub fn scaled(&self, pair: &PairInfo) -> Result<PairTvl> {
        Ok(PairTvl {
            base: to_units(&self.base.0, pair.base.decimals)?,
            quote: to_units(&self.quote.0, pair.quote.decimals)?,
            total_supply: to_units(&self.total_supply.0, 18)?,
        })
    }
}

/// Client for the aggregate statistics endpoints
#[derive(Clone)]
pub struct StatsClient {
    http: Client,
    base_url: String,
}

impl StatsClient {
    pub fn new(config: &StatsConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent("dexdesk/0.1")
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| DeskError::Internal(format!("failed to build stats HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DeskError::InvalidResponse(format!(
                "GET {} returned {}: {}",
                path, status, body
            )));
        }
        Ok(resp.json::<T>().await?)
    }

    /// Token symbol → USD price
    #[instrument(skip(self))]
    pub async fn token_rates(&self) -> Result<HashMap<String, Decimal>> {
        let stats: TokenStatsResponse = self.get_json("/stats/token-stats").await?;
        parse_rates(stats)
    }

    /// Liquidity snapshot of one pool
    #[instrument(skip(self, pair), fields(pair = %pair.name))]
    pub async fn pair_tvl(&self, pair: &PairInfo) -> Result<PairTvl> {
        let stats: PairStatsResponse = self.get_json(&format!("/dex/stats/{}", pair.id)).await?;
        stats.scaled(pair)
    }
}

pub fn parse_rates(stats: TokenStatsResponse) -> Result<HashMap<String, Decimal>> {
    stats
        .tokens
        .into_iter()
        .map(|(symbol, stat)| Ok((symbol, to_units(&stat.price.0, 18)?)))
        .collect()
}
