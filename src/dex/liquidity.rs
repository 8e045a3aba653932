//! Liquidity supply planning

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{format_grouped, CurrencyAmount, Pair, PairInfo, TransactionSummary};
use crate::error::{DeskError, Result};

/// Amounts of both pool tokens to deposit and add
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplyPlan {
    pub pair: PairInfo,
    pub base: CurrencyAmount,
    pub quote: CurrencyAmount,
}

impl SupplyPlan {
    /// Quote amount derived from the current reserve ratio.
    ///
    /// An empty pool has no ratio; use [`SupplyPlan::explicit`] for it.
    pub fn for_base(pair: &PairInfo, reserves: &Pair, base_amount: Decimal) -> Result<Self> {
        if base_amount <= Decimal::ZERO {
            return Err(DeskError::Validation(format!(
                "supply amount must be positive, got {}",
                base_amount
            )));
        }
        if !reserves.involves(&pair.base) || !reserves.involves(&pair.quote) {
            return Err(DeskError::Validation(format!(
                "reserves do not belong to {}",
                pair.name
            )));
        }

        let base = CurrencyAmount::new(pair.base.clone(), base_amount);
        let quote = reserves.quote(&base)?.ok_or_else(|| {
            DeskError::Validation(format!(
                "{} pool is empty, both amounts must be given",
                pair.name
            ))
        })?;

        Ok(Self {
            pair: pair.clone(),
            base,
            quote,
        })
    }

    pub fn explicit(pair: &PairInfo, base_amount: Decimal, quote_amount: Decimal) -> Result<Self> {
        if base_amount <= Decimal::ZERO || quote_amount <= Decimal::ZERO {
            return Err(DeskError::Validation(format!(
                "supply amounts must be positive, got {} / {}",
                base_amount, quote_amount
            )));
        }
        Ok(Self {
            pair: pair.clone(),
            base: CurrencyAmount::new(pair.base.clone(), base_amount),
            quote: CurrencyAmount::new(pair.quote.clone(), quote_amount),
        })
    }

    pub fn deposit_text(amount: &CurrencyAmount) -> TransactionSummary {
        let shown = format!("{} {}", format_grouped(amount.amount, 2), amount.currency.symbol);
        TransactionSummary::new(
            format!("Sending {} to the pool...", shown),
            format!("Sent {} to the pool.", shown),
        )
    }

    pub fn supply_text(&self) -> TransactionSummary {
        let shown = format!(
            "{} {} and {} {}",
            format_grouped(self.base.amount, 2),
            self.base.currency.symbol,
            format_grouped(self.quote.amount, 2),
            self.quote.currency.symbol
        );
        TransactionSummary::new(
            format!("Supplying {}...", shown),
            format!("Supplied {}.", shown),
        )
    }
}
