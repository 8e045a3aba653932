//! dexdesk CLI
//!
//! Commands:
//! - `dexdesk day` - Current platform day
//! - `dexdesk rewards|fees <account>` - Claimable rewards and network fees
//! - `dexdesk pairs|reserves|symbols` - Pool statistics and chart symbols
//! - `dexdesk proposals|dividend-vote` - Governance
//! - `dexdesk claim-rewards|claim-fees|vote|supply` - Signed actions

pub mod commands;
pub mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::actions::Actions;
use crate::chain::{ChainClient, RpcChainClient};
use crate::config::AppConfig;
use crate::domain::{PairInfo, TokenRegistry};
use crate::query::Queries;
use crate::signing::Wallet;
use crate::stats::StatsClient;
use crate::tx::{TransactionStore, TransactionWatcher};
use crate::vote::Ballot;
use output::OutputMode;

/// Balanced DEX desk
#[derive(Parser, Debug)]
#[command(name = "dexdesk")]
#[command(author, version, about = "Rewards, fees, pools and governance for the Balanced DEX")]
pub struct Cli {
    /// Directory holding default.toml and environment overrides
    #[arg(long, env = "DESK_CONFIG_DIR", default_value = "config", global = true)]
    pub config_dir: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the current platform day
    Day,

    /// Show claimable BALN rewards and network fees of an account
    Rewards { account: String },

    /// List the dividend windows of an account
    Fees { account: String },

    /// List supported pairs with liquidity and reward APY
    Pairs,

    /// Show the reserves of a pool
    Reserves { base: String, quote: String },

    /// List governance proposals
    Proposals,

    /// Show the fee distribution vote for an account
    DividendVote { account: String },

    /// Search chart symbols
    Symbols {
        #[arg(default_value = "")]
        query: String,
    },

    /// Resolve one chart symbol, e.g. "BALN / bnUSD"
    Symbol { name: String },

    /// Claim BALN rewards
    ClaimRewards,

    /// Claim the newest window of network fees
    ClaimFees,

    /// Vote on the fee distribution proposal
    Vote {
        #[arg(value_enum)]
        ballot: VoteChoice,
    },

    /// Deposit and add liquidity to a pool
    Supply {
        base: String,
        quote: String,
        /// Amount of the base token
        amount: Decimal,
        /// Quote amount; derived from the pool price when omitted
        #[arg(long)]
        quote_amount: Option<Decimal>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VoteChoice {
    Approve,
    Reject,
}

impl From<VoteChoice> for Ballot {
    fn from(choice: VoteChoice) -> Self {
        match choice {
            VoteChoice::Approve => Ballot::Approve,
            VoteChoice::Reject => Ballot::Reject,
        }
    }
}

impl Commands {
    /// Whether the command submits transactions
    pub fn needs_wallet(&self) -> bool {
        matches!(
            self,
            Commands::ClaimRewards
                | Commands::ClaimFees
                | Commands::Vote { .. }
                | Commands::Supply { .. }
        )
    }
}

/// Clients and caches shared by every command
pub struct Desk {
    pub config: AppConfig,
    pub chain: Arc<dyn ChainClient>,
    pub queries: Arc<Queries>,
    pub tokens: Arc<TokenRegistry>,
    pub pairs: Arc<Vec<PairInfo>>,
    account: Option<String>,
}

impl Desk {
    pub fn connect(config: AppConfig, wallet: Option<Wallet>) -> Result<Self> {
        let account = wallet.as_ref().map(Wallet::account);
        let chain: Arc<dyn ChainClient> = Arc::new(RpcChainClient::new(&config.chain, wallet)?);
        let stats = Arc::new(StatsClient::new(&config.stats)?);
        let tokens = Arc::new(config.token_registry());
        let pairs = Arc::new(
            config
                .supported_pairs()
                .map_err(|e| anyhow::anyhow!("invalid pair configuration: {}", e))?,
        );
        let queries = Arc::new(Queries::new(
            chain.clone(),
            stats,
            tokens.clone(),
            pairs.clone(),
            Duration::from_millis(config.query.stale_time_ms),
        ));

        Ok(Self {
            config,
            chain,
            queries,
            tokens,
            pairs,
            account,
        })
    }

    /// Action layer for the signing wallet
    pub fn actions(&self) -> Result<Actions> {
        let account = self
            .account
            .clone()
            .context("this command needs DESK_PRIVATE_KEY to sign")?;
        let watcher = Arc::new(TransactionWatcher::new(
            self.chain.clone(),
            Arc::new(TransactionStore::new()),
            &self.config.watcher,
        ));
        Ok(Actions::new(
            self.chain.clone(),
            self.queries.clone(),
            watcher,
            account,
            self.config.governance.dividend_vote_index,
        ))
    }
}

impl Cli {
    pub async fn run(self, config: AppConfig) -> Result<()> {
        let wallet = if self.command.needs_wallet() {
            Some(Wallet::from_env(config.chain.nid)?)
        } else {
            None
        };
        let desk = Desk::connect(config, wallet)?;
        let mode = OutputMode::from_json_flag(self.json);
        info!("running {:?}", self.command);

        match self.command {
            Commands::Day => commands::day(&desk, mode).await,
            Commands::Rewards { account } => commands::rewards(&desk, &account, mode).await,
            Commands::Fees { account } => commands::fees(&desk, &account, mode).await,
            Commands::Pairs => commands::pairs(&desk, mode).await,
            Commands::Reserves { base, quote } => commands::reserves(&desk, &base, &quote, mode).await,
            Commands::Proposals => commands::proposals(&desk, mode).await,
            Commands::DividendVote { account } => commands::dividend_vote(&desk, &account, mode).await,
            Commands::Symbols { query } => commands::symbols(&desk, &query, mode),
            Commands::Symbol { name } => commands::symbol(&desk, &name, mode),
            Commands::ClaimRewards => commands::claim_rewards(&desk).await,
            Commands::ClaimFees => commands::claim_fees(&desk).await,
            Commands::Vote { ballot } => commands::vote(&desk, ballot.into()).await,
            Commands::Supply {
                base,
                quote,
                amount,
                quote_amount,
            } => commands::supply(&desk, &base, &quote, amount, quote_amount).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vote_and_supply() {
        let cli = Cli::try_parse_from(["dexdesk", "vote", "reject"]).unwrap();
        match cli.command {
            Commands::Vote { ballot } => assert_eq!(Ballot::from(ballot), Ballot::Reject),
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from([
            "dexdesk",
            "--json",
            "supply",
            "BALN",
            "bnUSD",
            "12.5",
            "--quote-amount",
            "3",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(cli.command.needs_wallet());
        match cli.command {
            Commands::Supply {
                amount,
                quote_amount,
                ..
            } => {
                assert_eq!(amount, Decimal::new(125, 1));
                assert_eq!(quote_amount, Some(Decimal::from(3)));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_read_commands_need_no_wallet() {
        let cli = Cli::try_parse_from(["dexdesk", "symbols"]).unwrap();
        assert!(!cli.command.needs_wallet());
        assert!(Cli::try_parse_from(["dexdesk", "vote", "maybe"]).is_err());
    }
}
