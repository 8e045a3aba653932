pub mod actions;
pub mod chain;
pub mod chart;
pub mod cli;
pub mod config;
pub mod dex;
pub mod domain;
pub mod error;
pub mod query;
pub mod rewards;
pub mod signing;
pub mod stats;
pub mod tx;
pub mod vote;

pub use actions::{Actions, Submitted};
pub use chain::{ChainClient, RpcChainClient};
pub use config::AppConfig;
pub use error::{DeskError, QueryError, Result};
pub use query::{Queries, QueryResult};
pub use signing::Wallet;
pub use stats::{StatsApi, StatsClient};
pub use tx::{TransactionStore, TransactionWatcher};
