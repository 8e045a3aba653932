//! JSON-RPC client for the platform contracts
//!
//! Reads go through `icx_call`; writes are signed locally with the account
//! wallet and submitted with `icx_sendTransaction`.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::traits::ChainClient;
use super::types::{to_hex, ContractCall, RawTransactionResult, RawVoteInfo, RawVoteStatus};
use crate::config::ChainConfig;
use crate::domain::{TxHash, TxOutcome};
use crate::error::{DeskError, Result};
use crate::signing::{sign_call, Wallet};

/// Error codes returned while a transaction is not yet executed
const PENDING_CODES: &[i64] = &[-31002, -31003, -31004];

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Chain client speaking JSON-RPC 2.0 over HTTP
pub struct RpcChainClient {
    http: Client,
    rpc_url: String,
    contracts: crate::config::ContractsConfig,
    wallet: Option<Wallet>,
    request_id: AtomicU64,
}

impl RpcChainClient {
    pub fn new(config: &ChainConfig, wallet: Option<Wallet>) -> Result<Self> {
        let http = Client::builder()
            .user_agent("dexdesk/0.1")
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| DeskError::Internal(format!("failed to build RPC HTTP client: {}", e)))?;

        Ok(Self {
            http,
            rpc_url: config.rpc_url.trim_end_matches('/').to_string(),
            contracts: config.contracts.clone(),
            wallet,
            request_id: AtomicU64::new(1),
        })
    }

    /// Account of the signing wallet, if one is attached
    pub fn account(&self) -> Option<String> {
        self.wallet.as_ref().map(Wallet::account)
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let resp = self.http.post(&self.rpc_url).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        let parsed: RpcResponse = serde_json::from_str(&text).map_err(|e| {
            DeskError::InvalidResponse(format!(
                "{} returned HTTP {} with unparsable body: {}",
                method, status, e
            ))
        })?;

        if let Some(err) = parsed.error {
            return Err(DeskError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        parsed
            .result
            .ok_or_else(|| DeskError::InvalidResponse(format!("{} returned no result", method)))
    }

    async fn call<T: DeserializeOwned>(&self, call: ContractCall) -> Result<T> {
        debug!("icx_call {}.{}", call.to, call.method);
        let params = json!({
            "to": call.to,
            "dataType": "call",
            "data": {
                "method": call.method,
                "params": Value::Object(call.params),
            },
        });
        let result = self.rpc("icx_call", params).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn send(&self, call: ContractCall) -> Result<TxHash> {
        let wallet = self
            .wallet
            .as_ref()
            .ok_or_else(|| DeskError::Wallet("no wallet attached for signing".to_string()))?;
        let method = call.method.clone();
        let signed = sign_call(wallet, &call)?;
        let result = self.rpc("icx_sendTransaction", Value::Object(signed)).await?;
        let hash = result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DeskError::InvalidResponse(format!("{} returned non-string hash", method)))?;
        debug!("submitted {} as {}", method, hash);
        Ok(hash)
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    #[instrument(skip(self))]
    async fn get_day(&self) -> Result<String> {
        self.call(ContractCall::new(&self.contracts.governance, "getDay"))
            .await
    }

    #[instrument(skip(self))]
    async fn get_baln_holding(&self, account: &str) -> Result<String> {
        self.call(
            ContractCall::new(&self.contracts.rewards, "getBalnHolding").param("_holder", account),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_emission(&self) -> Result<String> {
        self.call(ContractCall::new(&self.contracts.rewards, "getEmission"))
            .await
    }

    #[instrument(skip(self))]
    async fn get_staked_balance(&self, token: &str, account: &str) -> Result<String> {
        self.call(ContractCall::new(token, "stakedBalanceOf").param("_owner", account))
            .await
    }

    #[instrument(skip(self))]
    async fn get_lp_balance(&self, pool_id: u64, account: &str) -> Result<String> {
        self.call(
            ContractCall::new(&self.contracts.dex, "balanceOf")
                .param("_owner", account)
                .param("_id", to_hex(pool_id as u128)),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_debt(&self, account: &str) -> Result<String> {
        let positions: Value = self
            .call(ContractCall::new(&self.contracts.loans, "getAccountPositions").param("_owner", account))
            .await?;
        Ok(positions
            .get("total_debt")
            .and_then(Value::as_str)
            .unwrap_or("0x0")
            .to_string())
    }

    #[instrument(skip(self))]
    async fn get_user_dividends(
        &self,
        account: &str,
        start: u64,
        end: u64,
    ) -> Result<HashMap<String, String>> {
        self.call(
            ContractCall::new(&self.contracts.dividends, "getUserDividends")
                .param("_account", account)
                .param("_start", to_hex(start as u128))
                .param("_end", to_hex(end as u128)),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_pool_id(&self, token_a: &str, token_b: &str) -> Result<String> {
        self.call(
            ContractCall::new(&self.contracts.dex, "getPoolId")
                .param("_token1Address", token_a)
                .param("_token2Address", token_b),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_pool_total(&self, pool_id: u64, token: &str) -> Result<String> {
        self.call(
            ContractCall::new(&self.contracts.dex, "getPoolTotal")
                .param("_id", to_hex(pool_id as u128))
                .param("_token", token),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_vote_info(&self, index: u64) -> Result<RawVoteInfo> {
        self.call(
            ContractCall::new(&self.contracts.governance, "checkVote")
                .param("_vote_index", to_hex(index as u128)),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_user_vote_status(&self, account: &str, index: u64) -> Result<RawVoteStatus> {
        self.call(
            ContractCall::new(&self.contracts.governance, "getVotesOfUser")
                .param("vote_index", to_hex(index as u128))
                .param("user", account),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_user_weight(&self, account: &str, day: u64) -> Result<String> {
        self.call(
            ContractCall::new(&self.contracts.governance, "myVotingWeight")
                .param("_address", account)
                .param("_day", to_hex(day as u128)),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_total_proposals(&self) -> Result<String> {
        self.call(ContractCall::new(&self.contracts.governance, "getProposalCount"))
            .await
    }

    #[instrument(skip(self))]
    async fn get_proposals(&self, offset: u64, count: u64) -> Result<Vec<RawVoteInfo>> {
        self.call(
            ContractCall::new(&self.contracts.governance, "getProposals")
                .param("batch_size", to_hex(count as u128))
                .param("offset", to_hex(offset as u128)),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn transaction_result(&self, hash: &str) -> Result<Option<TxOutcome>> {
        match self
            .rpc("icx_getTransactionResult", json!({ "txHash": hash }))
            .await
        {
            Ok(value) => {
                let receipt: RawTransactionResult = serde_json::from_value(value)?;
                if receipt.status == "0x1" {
                    Ok(Some(TxOutcome::Success))
                } else {
                    if let Some(failure) = receipt.failure {
                        warn!("transaction {} failed: {}", hash, failure);
                    }
                    Ok(Some(TxOutcome::Failure))
                }
            }
            Err(DeskError::Rpc { code, .. }) if PENDING_CODES.contains(&code) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn claim_rewards(&self) -> Result<TxHash> {
        self.send(ContractCall::new(&self.contracts.rewards, "claimRewards"))
            .await
    }

    #[instrument(skip(self))]
    async fn claim_dividends(&self, start: u64, end: u64) -> Result<TxHash> {
        self.send(
            ContractCall::new(&self.contracts.dividends, "claim")
                .param("_start", to_hex(start as u128))
                .param("_end", to_hex(end as u128)),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn cast_vote(&self, vote_name: &str, approve: bool) -> Result<TxHash> {
        self.send(
            ContractCall::new(&self.contracts.governance, "castVote")
                .param("name", vote_name)
                .param("vote", if approve { "0x1" } else { "0x0" }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn deposit(&self, token: &str, raw_amount: u128) -> Result<TxHash> {
        let data = hex::encode(json!({ "method": "_deposit" }).to_string());
        self.send(
            ContractCall::new(token, "transfer")
                .param("_to", self.contracts.dex.as_str())
                .param("_value", to_hex(raw_amount))
                .param("_data", format!("0x{}", data)),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn add_liquidity(
        &self,
        base_token: &str,
        quote_token: &str,
        base_raw: u128,
        quote_raw: u128,
    ) -> Result<TxHash> {
        self.send(
            ContractCall::new(&self.contracts.dex, "add")
                .param("_baseToken", base_token)
                .param("_quoteToken", quote_token)
                .param("_baseValue", to_hex(base_raw))
                .param("_quoteValue", to_hex(quote_raw)),
        )
        .await
    }
}
