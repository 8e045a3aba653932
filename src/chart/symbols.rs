//! Price chart symbol resolution

use serde::Serialize;

use crate::domain::{find_trade_pair, PairInfo};

pub const EXCHANGE: &str = "Balanced";
pub const DEFAULT_DECIMALS: i64 = 18;
pub const SUPPORTED_RESOLUTIONS: &[&str] = &["5", "15", "60", "240", "1D", "1W", "1M"];

/// Chart library description of one pair symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolInfo {
    /// `-1` when the name does not match a supported pair
    pub pair_id: i64,
    pub is_pair_inverted: bool,
    pub decimal: i64,
    pub name: String,
    pub full_name: String,
    pub ticker: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub session: String,
    pub exchange: String,
    pub timezone: String,
    pub format: String,
    pub has_intraday: bool,
    pub intraday_multipliers: Vec<String>,
    pub has_weekly_and_monthly: bool,
    pub pricescale: u64,
    pub minmov: u64,
    pub supported_resolutions: Vec<String>,
    pub volume_precision: u32,
    pub data_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolSearchResult {
    pub symbol: String,
    pub full_name: String,
    pub description: String,
    pub ticker: String,
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Resolve "BASE / QUOTE" (spaces ignored) against the supported pairs
pub fn symbol_info(name: &str, pairs: &[PairInfo]) -> SymbolInfo {
    let compact: String = name.chars().filter(|c| *c != ' ').collect();
    let (pair, inverted) = match compact.split_once('/') {
        Some((base, quote)) => find_trade_pair(pairs, base, quote),
        None => (None, false),
    };

    let (pair_id, decimal) = match pair {
        Some(pair) if pair.id != 0 => (pair.id as i64, pair.price_decimals()),
        Some(pair) => (-1, pair.price_decimals()),
        None => (-1, DEFAULT_DECIMALS),
    };

    SymbolInfo {
        pair_id,
        is_pair_inverted: inverted,
        decimal,
        name: name.to_string(),
        full_name: name.to_string(),
        ticker: name.to_string(),
        kind: "crypto".to_string(),
        session: "24x7".to_string(),
        exchange: EXCHANGE.to_string(),
        timezone: "America/New_York".to_string(),
        format: "price".to_string(),
        has_intraday: true,
        intraday_multipliers: to_strings(&["5", "15", "60", "240"]),
        has_weekly_and_monthly: true,
        pricescale: 1000,
        minmov: 1,
        supported_resolutions: to_strings(SUPPORTED_RESOLUTIONS),
        volume_precision: 2,
        data_status: "streaming".to_string(),
    }
}

/// Tradable pairs matching `query`, sorted by symbol. Queue pairs are never listed.
pub fn filtered_supported_pair_names(query: &str, pairs: &[PairInfo]) -> Vec<SymbolSearchResult> {
    let needle = query.to_lowercase();
    let mut results: Vec<SymbolSearchResult> = pairs
        .iter()
        .filter(|pair| !pair.is_queue)
        .filter(|pair| {
            pair.base.matches(&needle)
                || pair.quote.matches(&needle)
                || pair.name.to_lowercase().replacen('/', "", 1).contains(&needle)
        })
        .map(|pair| SymbolSearchResult {
            symbol: pair.name.replacen('/', "", 1),
            full_name: pair.name.clone(),
            description: format!("{} / {}", pair.base.name, pair.quote.name),
            ticker: pair.name.clone(),
        })
        .collect();

    results.sort_by(|a, b| {
        a.symbol
            .to_lowercase()
            .cmp(&b.symbol.to_lowercase())
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    results
}
