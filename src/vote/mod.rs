//! Governance presentation

pub mod dividend;
pub mod status;

pub use dividend::{collected_fee_lines, Ballot, DividendVoteView};
pub use status::{format_time_str, status_badge, voting_ends_in, StatusBadge, StatusIcon};
