//! Transaction envelope, canonical serialization and signing
//!
//! The digest covers `icx_sendTransaction.` followed by the params with keys
//! sorted and nested objects rendered as `{k.v.k.v}`. Reserved characters
//! inside values are backslash-escaped.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use chrono::Utc;
use ethers::utils::keccak256;
use serde_json::{json, Map, Value};

use super::Wallet;
use crate::chain::types::{to_hex, ContractCall};
use crate::error::Result;

const TX_VERSION: &str = "0x3";
const SERIALIZE_PREFIX: &str = "icx_sendTransaction";
const DEFAULT_STEP_LIMIT: u128 = 0x3000000;

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '.' | '{' | '}' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn serialize_value(value: &Value) -> String {
    match value {
        Value::Null => "\\0".to_string(),
        Value::String(s) => escape(s),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(serialize_value).collect();
            format!("[{}]", inner.join("."))
        }
        Value::Object(map) => format!("{{{}}}", serialize_object(map)),
    }
}

fn serialize_object(map: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys.iter()
        .map(|k| format!("{}.{}", k, serialize_value(&map[k.as_str()])))
        .collect::<Vec<_>>()
        .join(".")
}

/// Canonical text hashed for the signature
pub fn serialize_params(params: &Map<String, Value>) -> String {
    format!("{}.{}", SERIALIZE_PREFIX, serialize_object(params))
}

/// Unsigned call transaction parameters
pub fn build_call_params(
    from: &str,
    nid: u64,
    call: &ContractCall,
    timestamp_us: i64,
) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("version".into(), json!(TX_VERSION));
    params.insert("from".into(), json!(from));
    params.insert("to".into(), json!(call.to));
    params.insert("stepLimit".into(), json!(to_hex(DEFAULT_STEP_LIMIT)));
    params.insert("nid".into(), json!(to_hex(nid as u128)));
    params.insert("nonce".into(), json!("0x1"));
    params.insert("timestamp".into(), json!(to_hex(timestamp_us.max(0) as u128)));
    params.insert("dataType".into(), json!("call"));
    params.insert(
        "data".into(),
        json!({ "method": call.method, "params": Value::Object(call.params.clone()) }),
    );
    params
}

/// Build and sign a call transaction with the wallet
pub fn sign_call(wallet: &Wallet, call: &ContractCall) -> Result<Map<String, Value>> {
    let mut params = build_call_params(
        &wallet.account(),
        wallet.nid(),
        call,
        Utc::now().timestamp_micros(),
    );
    let digest = keccak256(serialize_params(&params).as_bytes());
    let signature = wallet.sign_digest(digest)?;
    params.insert(
        "signature".into(),
        json!(BASE64_STANDARD.encode(signature)),
    );
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_sorts_and_escapes() {
        let mut params = Map::new();
        params.insert("to".into(), json!("cx1"));
        params.insert("data".into(), json!({"method": "claim", "params": {"_end": "0x5", "memo": "a.b"}}));
        params.insert("from".into(), json!("hx1"));
        assert_eq!(
            serialize_params(&params),
            "icx_sendTransaction.data.{method.claim.params.{_end.0x5.memo.a\\.b}}.from.hx1.to.cx1"
        );
    }

    #[test]
    fn test_serialize_arrays_and_null() {
        let mut params = Map::new();
        params.insert("list".into(), json!(["x", null]));
        assert_eq!(serialize_params(&params), "icx_sendTransaction.list.[x.\\0]");
    }

    #[test]
    fn test_sign_call_attaches_signature() {
        let wallet = Wallet::from_private_key(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            1,
        )
        .unwrap();
        let call = ContractCall::new("cxrewards", "claimRewards");
        let params = sign_call(&wallet, &call).unwrap();
        assert_eq!(params["from"], json!(wallet.account()));
        assert_eq!(params["nid"], json!("0x1"));
        let signature = params["signature"].as_str().unwrap();
        assert_eq!(BASE64_STANDARD.decode(signature).unwrap().len(), 65);
    }
}
