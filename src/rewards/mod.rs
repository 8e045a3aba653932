//! Rewards and network fee claiming

pub mod aggregator;
pub mod panel;

pub use aggregator::{dividend_windows, DividendWindow, FeeAggregator, FeeWindow, BATCH_SIZE, FEE_HISTORY_START};
pub use panel::{before_after_balance, claim_label, ClaimPreview, NetworkFeeView, RewardView};
