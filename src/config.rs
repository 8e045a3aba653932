use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

use crate::domain::{PairInfo, Token, TokenRegistry, NATIVE_ADDRESS};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub chain: ChainConfig,
    pub stats: StatsConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub watcher: WatcherConfig,
    #[serde(default)]
    pub governance: GovernanceConfig,
    #[serde(default = "default_tokens")]
    pub tokens: Vec<TokenConfig>,
    #[serde(default = "default_pairs")]
    pub pairs: Vec<PairConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the chain node
    pub rpc_url: String,
    /// Network id included in signed transactions
    #[serde(default = "default_nid")]
    pub nid: u64,
    /// HTTP timeout for RPC calls in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    pub contracts: ContractsConfig,
}

/// Addresses of the platform contracts
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    pub governance: String,
    pub rewards: String,
    pub dividends: String,
    pub dex: String,
    pub loans: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    /// Base URL of the statistics API
    pub api_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// How long a successful query result is served from cache
    #[serde(default = "default_stale_time")]
    pub stale_time_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time_ms: default_stale_time(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatcherConfig {
    /// Polling interval for transaction results in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GovernanceConfig {
    /// Index of the fee distribution vote
    #[serde(default = "default_dividend_vote_index")]
    pub dividend_vote_index: u64,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            dividend_vote_index: default_dividend_vote_index(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
    #[serde(default)]
    pub searchable_terms: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairConfig {
    pub id: u64,
    /// Base token symbol
    pub base: String,
    /// Quote token symbol
    pub quote: String,
    #[serde(default)]
    pub rewards: Option<Decimal>,
    #[serde(default)]
    pub queue: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_nid() -> u64 {
    1
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_stale_time() -> u64 {
    30_000
}

fn default_poll_interval() -> u64 {
    2_000
}

fn default_dividend_vote_index() -> u64 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

fn token(address: &str, symbol: &str, name: &str, decimals: u32, terms: &str) -> TokenConfig {
    TokenConfig {
        address: address.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        decimals,
        searchable_terms: terms.to_string(),
    }
}

fn default_tokens() -> Vec<TokenConfig> {
    vec![
        token(NATIVE_ADDRESS, "ICX", "ICON", 18, "icon"),
        token(
            "cx2609b924e33ef00b648a409245c7ea394c467824",
            "sICX",
            "Staked ICX",
            18,
            "staked icon",
        ),
        token(
            "cx88fd7df7ddff82f7cc735c871dc519838cb235bb",
            "bnUSD",
            "Balanced Dollar",
            18,
            "usd dollar stablecoin",
        ),
        token(
            "cxf61cd5a45dc9f91c15aa65831a30a90d59a09619",
            "BALN",
            "Balance Token",
            18,
            "balanced",
        ),
        token(
            "cxae3034235540b924dfcc1b45836c5c6ad9b9fd9d",
            "IUSDC",
            "ICON USD Coin",
            6,
            "usdc usd stablecoin",
        ),
        token(
            "cx1a29259a59f463a67bb2ef84398b30ca56b5830a",
            "OMM",
            "Omm Token",
            18,
            "omm",
        ),
    ]
}

fn pair(id: u64, base: &str, quote: &str, rewards: Option<Decimal>, queue: bool) -> PairConfig {
    PairConfig {
        id,
        base: base.to_string(),
        quote: quote.to_string(),
        rewards,
        queue,
    }
}

fn default_pairs() -> Vec<PairConfig> {
    use rust_decimal_macros::dec;

    vec![
        pair(1, "sICX", "ICX", Some(dec!(0.1)), true),
        pair(2, "sICX", "bnUSD", Some(dec!(0.175)), false),
        pair(3, "BALN", "bnUSD", Some(dec!(0.175)), false),
        pair(4, "BALN", "sICX", Some(dec!(0.05)), false),
        pair(5, "IUSDC", "bnUSD", Some(dec!(0.025)), false),
        pair(6, "OMM", "sICX", None, false),
    ]
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let defaults = Self::default_config();
        let contracts = &defaults.chain.contracts;

        let builder = Config::builder()
            // Start with default values
            .set_default("chain.rpc_url", defaults.chain.rpc_url.as_str())?
            .set_default("chain.nid", defaults.chain.nid)?
            .set_default("chain.contracts.governance", contracts.governance.as_str())?
            .set_default("chain.contracts.rewards", contracts.rewards.as_str())?
            .set_default("chain.contracts.dividends", contracts.dividends.as_str())?
            .set_default("chain.contracts.dex", contracts.dex.as_str())?
            .set_default("chain.contracts.loans", contracts.loans.as_str())?
            .set_default("stats.api_url", defaults.stats.api_url.as_str())?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("watcher.poll_interval_ms", default_poll_interval())?
            .set_default("query.stale_time_ms", default_stale_time())?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("DESK_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (DESK_CHAIN__RPC_URL, etc.)
            .add_source(
                Environment::with_prefix("DESK")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Mainnet configuration used when no files are present
    pub fn default_config() -> Self {
        Self {
            chain: ChainConfig {
                rpc_url: "https://ctz.solidwallet.io/api/v3".to_string(),
                nid: default_nid(),
                timeout_ms: default_timeout_ms(),
                contracts: ContractsConfig {
                    governance: "cx44250a12074799e26fdeee75648ae47e2cc84219".to_string(),
                    rewards: "cx10d59e8103ab44635190bd4139dbfd682fa2d07e".to_string(),
                    dividends: "cx203d9cd2a669be67177e997b8948ce2c35caffae".to_string(),
                    dex: "cxa0af3165c08318e988cb30993b3048335b94af6c".to_string(),
                    loans: "cx66d4d90f5f113eba575bf793570135f9b10cece1".to_string(),
                },
            },
            stats: StatsConfig {
                api_url: "https://balanced.sudoblock.io/api/v1".to_string(),
                timeout_ms: default_timeout_ms(),
            },
            query: QueryConfig::default(),
            watcher: WatcherConfig::default(),
            governance: GovernanceConfig::default(),
            tokens: default_tokens(),
            pairs: default_pairs(),
            logging: LoggingConfig::default(),
        }
    }

    /// Token registry built from the configured token list
    pub fn token_registry(&self) -> TokenRegistry {
        TokenRegistry::new(self.tokens.iter().map(|t| {
            Token::new(&t.address, &t.symbol, &t.name, t.decimals).with_terms(&t.searchable_terms)
        }))
    }

    /// Resolve configured pairs against the token registry
    pub fn supported_pairs(&self) -> Result<Vec<PairInfo>, String> {
        let registry = self.token_registry();
        self.pairs
            .iter()
            .map(|p| {
                let base = registry
                    .by_symbol(&p.base)
                    .ok_or_else(|| format!("pair {}: unknown base token {}", p.id, p.base))?;
                let quote = registry
                    .by_symbol(&p.quote)
                    .ok_or_else(|| format!("pair {}: unknown quote token {}", p.id, p.quote))?;
                let mut info = PairInfo::new(p.id, base.clone(), quote.clone());
                if let Some(rewards) = p.rewards {
                    info = info.with_rewards(rewards);
                }
                if p.queue {
                    info = info.queue();
                }
                Ok(info)
            })
            .collect()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if url::Url::parse(&self.chain.rpc_url).is_err() {
            errors.push(format!("chain.rpc_url is not a valid URL: {}", self.chain.rpc_url));
        }

        if url::Url::parse(&self.stats.api_url).is_err() {
            errors.push(format!("stats.api_url is not a valid URL: {}", self.stats.api_url));
        }

        if self.watcher.poll_interval_ms == 0 {
            errors.push("watcher.poll_interval_ms must be positive".to_string());
        }

        for token in &self.tokens {
            if token.decimals > 28 {
                errors.push(format!(
                    "token {} has {} decimals, at most 28 are supported",
                    token.symbol, token.decimals
                ));
            }
        }

        if let Err(e) = self.supported_pairs() {
            errors.push(e);
        }

        let total_rewards: Decimal = self.pairs.iter().filter_map(|p| p.rewards).sum();
        if total_rewards > Decimal::ONE {
            errors.push(format!("pair rewards sum to {}, more than 1", total_rewards));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default_config();
        assert!(config.validate().is_ok());
        let pairs = config.supported_pairs().unwrap();
        assert_eq!(pairs.len(), 6);
        assert!(pairs[0].is_queue);
        assert_eq!(pairs[1].name, "sICX/bnUSD");
    }

    #[test]
    fn test_validate_reports_unknown_pair_token() {
        let mut config = AppConfig::default_config();
        config.pairs.push(pair(9, "FOO", "bnUSD", None, false));
        config.pairs.push(pair(10, "BALN", "sICX", Some(dec!(0.9)), false));
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("unknown base token FOO")));
        assert!(errors.iter().any(|e| e.contains("rewards sum")));
    }
}
