//! Pools and liquidity

pub mod liquidity;
pub mod reserves;

pub use liquidity::SupplyPlan;
pub use reserves::{resolve_pair, resolve_pairs, PairInput, PairReserveTracker, PairResult, PairState};
