//! View state for the rewards panel

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::aggregator::{DividendWindow, FeeWindow};
use crate::domain::{format_grouped, CurrencyAmount, TransactionSummary};

/// What the BALN reward section shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "amount")]
pub enum RewardView {
    /// No rewardable position and nothing accrued
    Ineligible,
    /// Rewardable position but nothing accrued yet
    NothingToClaim,
    Claimable(CurrencyAmount),
}

impl RewardView {
    pub fn new(reward: &CurrencyAmount, has_rewardable: bool) -> Self {
        if reward.is_zero() {
            if has_rewardable {
                RewardView::NothingToClaim
            } else {
                RewardView::Ineligible
            }
        } else {
            RewardView::Claimable(reward.clone())
        }
    }

    pub fn label(&self) -> String {
        match self {
            RewardView::Ineligible => "Ineligible".to_string(),
            RewardView::NothingToClaim => "Pending".to_string(),
            RewardView::Claimable(amount) => format!(
                "{} {}",
                format_grouped(amount.amount, 2),
                amount.currency.symbol
            ),
        }
    }
}

/// What the network fee section shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state")]
pub enum NetworkFeeView {
    /// First window with fees, its position, and how many windows have fees
    Claimable {
        fees: BTreeMap<String, CurrencyAmount>,
        window: DividendWindow,
        index: usize,
        count: usize,
    },
    NoFeesYet,
    Ineligible,
}

impl NetworkFeeView {
    pub fn new(windows: &[FeeWindow], has_network_fees: bool) -> Self {
        let count = windows.iter().filter(|w| w.is_claimable()).count();
        let first = windows
            .iter()
            .enumerate()
            .find_map(|(index, w)| w.fees.as_ref().map(|fees| (index, w.window, fees)));

        match first {
            Some((index, window, fees)) => NetworkFeeView::Claimable {
                fees: fees.clone(),
                window,
                index,
                count,
            },
            None if has_network_fees => NetworkFeeView::NoFeesYet,
            None => NetworkFeeView::Ineligible,
        }
    }

    /// Window a claim should cover, if there is anything to claim
    pub fn claim_window(&self) -> Option<DividendWindow> {
        match self {
            NetworkFeeView::Claimable { window, .. } => Some(*window),
            _ => None,
        }
    }

    pub fn claim_label(&self) -> Option<String> {
        match self {
            NetworkFeeView::Claimable { count, .. } => Some(claim_label(*count)),
            _ => None,
        }
    }
}

/// Newest window holding fees, the one a claim covers
pub fn first_claim_window(windows: &[FeeWindow]) -> Option<DividendWindow> {
    windows.iter().find(|w| w.fees.is_some()).map(|w| w.window)
}

/// Button text for a fee claim when `count` windows hold fees
pub fn claim_label(count: usize) -> String {
    if count > 1 {
        format!("Claim (1 of {})", count)
    } else {
        "Claim".to_string()
    }
}

/// "12.35 SYM" for every fee greater than zero
pub fn fee_lines(fees: &BTreeMap<String, CurrencyAmount>) -> Vec<String> {
    fees.values()
        .filter(|fee| fee.greater_than_zero())
        .map(|fee| format!("{} {}", fee.to_fixed(2), fee.currency.symbol))
        .collect()
}

/// Wallet balance before and after claiming
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimPreview {
    pub before: Decimal,
    pub after: Decimal,
}

pub fn before_after_balance(balance: Option<Decimal>, reward: Option<Decimal>) -> ClaimPreview {
    let before = balance.unwrap_or(Decimal::ZERO);
    ClaimPreview {
        before,
        after: before + reward.unwrap_or(Decimal::ZERO),
    }
}

pub fn reward_claim_text(reward: &CurrencyAmount) -> TransactionSummary {
    TransactionSummary::new(
        "Claiming rewards...",
        format!("Claimed {} BALN.", format_grouped(reward.amount, 2)),
    )
}

pub fn fee_claim_text() -> TransactionSummary {
    TransactionSummary::new("Claiming fees...", "Claimed fees.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Token;
    use rust_decimal_macros::dec;

    fn baln() -> Token {
        Token::new("cxbaln", "BALN", "Balance Token", 18)
    }

    fn window(start: u64, end: u64, fee: Option<Decimal>) -> FeeWindow {
        FeeWindow {
            window: DividendWindow { start, end },
            fees: fee.map(|amount| {
                [("cxbaln".to_string(), CurrencyAmount::new(baln(), amount))]
                    .into_iter()
                    .collect()
            }),
        }
    }

    #[test]
    fn test_reward_view_states() {
        let zero = CurrencyAmount::zero(baln());
        assert_eq!(RewardView::new(&zero, false), RewardView::Ineligible);
        assert_eq!(RewardView::new(&zero, true), RewardView::NothingToClaim);

        let some = CurrencyAmount::new(baln(), dec!(1234.567));
        let view = RewardView::new(&some, false);
        assert_eq!(view, RewardView::Claimable(some));
        assert_eq!(view.label(), "1,234.56 BALN");
    }

    #[test]
    fn test_network_fee_view_picks_first_claimable() {
        let windows = vec![
            window(70, 120, None),
            window(19, 69, Some(dec!(2))),
            window(0, 18, Some(dec!(1))),
        ];
        let view = NetworkFeeView::new(&windows, true);
        match &view {
            NetworkFeeView::Claimable {
                window,
                index,
                count,
                ..
            } => {
                assert_eq!(*window, DividendWindow { start: 19, end: 69 });
                assert_eq!(*index, 1);
                assert_eq!(*count, 2);
            }
            other => panic!("expected claimable, got {:?}", other),
        }
        assert_eq!(view.claim_label().as_deref(), Some("Claim (1 of 2)"));
        assert_eq!(view.claim_window(), Some(DividendWindow { start: 19, end: 69 }));
    }

    #[test]
    fn test_network_fee_view_without_fees() {
        let windows = vec![window(70, 120, None)];
        assert_eq!(NetworkFeeView::new(&windows, true), NetworkFeeView::NoFeesYet);
        assert_eq!(NetworkFeeView::new(&windows, false), NetworkFeeView::Ineligible);
        assert_eq!(NetworkFeeView::new(&[], false).claim_window(), None);
    }

    #[test]
    fn test_claim_label() {
        assert_eq!(claim_label(0), "Claim");
        assert_eq!(claim_label(1), "Claim");
        assert_eq!(claim_label(3), "Claim (1 of 3)");
    }

    #[test]
    fn test_fee_lines_skip_zero() {
        let mut fees = BTreeMap::new();
        fees.insert("cxbaln".to_string(), CurrencyAmount::new(baln(), dec!(1.005)));
        fees.insert(
            "cxbnusd".to_string(),
            CurrencyAmount::zero(Token::new("cxbnusd", "bnUSD", "Balanced Dollar", 18)),
        );
        assert_eq!(fee_lines(&fees), vec!["1.01 BALN".to_string()]);
    }

    #[test]
    fn test_before_after_balance() {
        let preview = before_after_balance(Some(dec!(10)), Some(dec!(2.5)));
        assert_eq!(preview.before, dec!(10));
        assert_eq!(preview.after, dec!(12.5));

        let empty = before_after_balance(None, None);
        assert_eq!(empty.after, Decimal::ZERO);
    }
}
