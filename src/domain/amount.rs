use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;

use super::Token;
use crate::error::{DeskError, Result};

/// Parse a raw on-chain integer, either `0x` hex or plain decimal
pub fn parse_raw(raw: &str) -> Result<u128> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) if hex.is_empty() => Ok(0),
        Some(hex) => u128::from_str_radix(hex, 16),
        None => raw.parse::<u128>(),
    };
    parsed.map_err(|e| DeskError::Amount(format!("cannot parse raw value '{}': {}", raw, e)))
}

/// Scale a raw integer down by `decimals`
pub fn scale_raw(raw: u128, decimals: u32) -> Result<Decimal> {
    let value = i128::try_from(raw)
        .map_err(|_| DeskError::Amount(format!("raw value {} out of range", raw)))?;
    let mut scaled = Decimal::try_from_i128_with_scale(value, decimals)
        .map_err(|e| DeskError::Amount(format!("raw value {} with {} decimals: {}", raw, decimals, e)))?;
    scaled.normalize_assign();
    Ok(scaled)
}

/// Convert a raw chain value into token units
pub fn to_units(raw: &str, decimals: u32) -> Result<Decimal> {
    scale_raw(parse_raw(raw)?, decimals)
}

/// Scale a human amount up to the raw integer the chain expects
pub fn to_raw(amount: Decimal, decimals: u32) -> Result<u128> {
    let factor = Decimal::from_i128_with_scale(10i128.pow(decimals), 0);
    let raw = amount
        .checked_mul(factor)
        .ok_or_else(|| DeskError::Amount(format!("{} overflows at {} decimals", amount, decimals)))?
        .trunc();
    if raw.is_sign_negative() {
        return Err(DeskError::Amount(format!("negative amount {}", amount)));
    }
    raw.to_string()
        .parse::<u128>()
        .map_err(|e| DeskError::Amount(e.to_string()))
}

/// Quantity of a specific token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyAmount {
    pub currency: Token,
    pub amount: Decimal,
}

impl CurrencyAmount {
    pub fn new(currency: Token, amount: Decimal) -> Self {
        Self { currency, amount }
    }

    /// Build from a raw on-chain integer scaled by the token's decimals
    pub fn from_raw(currency: Token, raw: &str) -> Result<Self> {
        let amount = to_units(raw, currency.decimals)?;
        Ok(Self { currency, amount })
    }

    pub fn zero(currency: Token) -> Self {
        Self {
            currency,
            amount: Decimal::ZERO,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn greater_than_zero(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn raw(&self) -> Result<u128> {
        to_raw(self.amount, self.currency.decimals)
    }

    /// Fixed-point text rounded half-up, e.g. `to_fixed(2)` → "12.35"
    pub fn to_fixed(&self, dp: u32) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        format!("{:.*}", dp as usize, rounded)
    }
}

impl fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_fixed(2), self.currency.symbol)
    }
}

/// Group the integer part with thousands separators, keeping `dp` decimals
pub fn format_grouped(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::ToZero);
    let text = format!("{:.*}", dp as usize, rounded);
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
