use serde::{Deserialize, Serialize};

/// Governance vote as returned by the governance contract
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawVoteInfo {
    /// Hex encoded vote index
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(rename = "start day")]
    pub start_day: String,
    #[serde(rename = "end day")]
    pub end_day: String,
    #[serde(rename = "vote snapshot", default)]
    pub snapshot: Option<String>,
    /// Approval share, 18 decimal fraction
    #[serde(rename = "for", default)]
    pub for_share: Option<String>,
    /// Rejection share, 18 decimal fraction
    #[serde(rename = "against", default)]
    pub against_share: Option<String>,
}

/// Weights the account voted with on a proposal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawVoteStatus {
    #[serde(rename = "for", default)]
    pub approval: Option<String>,
    #[serde(rename = "against", default)]
    pub reject: Option<String>,
}

/// Receipt returned by `getTransactionResult`
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransactionResult {
    /// `0x1` on success, `0x0` on failure
    pub status: String,
    #[serde(rename = "txHash", default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub failure: Option<serde_json::Value>,
}

/// Method call on a contract, as sent in `data`
#[derive(Debug, Clone, Serialize)]
pub struct ContractCall {
    pub to: String,
    pub method: String,
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl ContractCall {
    pub fn new(to: &str, method: &str) -> Self {
        Self {
            to: to.to_string(),
            method: method.to_string(),
            params: serde_json::Map::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

/// Hex encode an integer the way the chain expects (`0x` + lowercase hex)
pub fn to_hex(value: u128) -> String {
    format!("{:#x}", value)
}

/// Parse a hex (or decimal) integer returned by the chain
pub fn parse_hex_u64(raw: &str) -> crate::error::Result<u64> {
    let value = crate::domain::parse_raw(raw)?;
    u64::try_from(value).map_err(|_| {
        crate::error::DeskError::InvalidResponse(format!("{} does not fit in u64", raw))
    })
}
