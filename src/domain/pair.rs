use rust_decimal::Decimal;
use serde::Serialize;

use super::{CurrencyAmount, Token};
use crate::error::{DeskError, Result};

/// Static trading pair loaded from configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairInfo {
    /// Pool id on the DEX contract
    pub id: u64,
    /// Display name, `BASE/QUOTE`
    pub name: String,
    pub base: Token,
    pub quote: Token,
    /// Share of daily emission routed to this pool
    pub rewards: Option<Decimal>,
    /// Queue pools (sICX/ICX) have no order book and no chart
    pub is_queue: bool,
}

impl PairInfo {
    pub fn new(id: u64, base: Token, quote: Token) -> Self {
        Self {
            id,
            name: format!("{}/{}", base.symbol, quote.symbol),
            base,
            quote,
            rewards: None,
            is_queue: false,
        }
    }

    pub fn with_rewards(mut self, rewards: Decimal) -> Self {
        self.rewards = Some(rewards);
        self
    }

    pub fn queue(mut self) -> Self {
        self.is_queue = true;
        self
    }

    /// Decimal adjustment for chart prices
    pub fn price_decimals(&self) -> i64 {
        self.quote.decimals as i64 - self.base.decimals as i64 + 18
    }
}

/// Find the configured pair for two symbols, reporting whether it is inverted
pub fn find_trade_pair<'a>(
    pairs: &'a [PairInfo],
    base_symbol: &str,
    quote_symbol: &str,
) -> (Option<&'a PairInfo>, bool) {
    let eq = |a: &str, b: &str| a.eq_ignore_ascii_case(b);

    if let Some(pair) = pairs
        .iter()
        .find(|p| eq(&p.base.symbol, base_symbol) && eq(&p.quote.symbol, quote_symbol))
    {
        return (Some(pair), false);
    }

    match pairs
        .iter()
        .find(|p| eq(&p.base.symbol, quote_symbol) && eq(&p.quote.symbol, base_symbol))
    {
        Some(pair) => (Some(pair), true),
        None => (None, false),
    }
}

/// Reserve snapshot of a pool with tokens in canonical order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pair {
    reserve0: CurrencyAmount,
    reserve1: CurrencyAmount,
}

impl Pair {
    /// Build a snapshot; the amounts are reordered so `token0` sorts first
    pub fn new(a: CurrencyAmount, b: CurrencyAmount) -> Self {
        if a.currency.sorts_before(&b.currency) {
            Self {
                reserve0: a,
                reserve1: b,
            }
        } else {
            Self {
                reserve0: b,
                reserve1: a,
            }
        }
    }

    pub fn token0(&self) -> &Token {
        &self.reserve0.currency
    }

    pub fn token1(&self) -> &Token {
        &self.reserve1.currency
    }

    pub fn reserve0(&self) -> &CurrencyAmount {
        &self.reserve0
    }

    pub fn reserve1(&self) -> &CurrencyAmount {
        &self.reserve1
    }

    pub fn involves(&self, token: &Token) -> bool {
        self.token0() == token || self.token1() == token
    }

    pub fn reserve_of(&self, token: &Token) -> Result<&CurrencyAmount> {
        if self.token0() == token {
            Ok(&self.reserve0)
        } else if self.token1() == token {
            Ok(&self.reserve1)
        } else {
            Err(DeskError::UnknownToken(format!(
                "{} is not part of {}/{}",
                token.symbol,
                self.token0().symbol,
                self.token1().symbol
            )))
        }
    }

    /// Price of `token` in units of the other token
    pub fn price_of(&self, token: &Token) -> Result<Option<Decimal>> {
        let own = self.reserve_of(token)?;
        let other = if self.token0() == token {
            &self.reserve1
        } else {
            &self.reserve0
        };
        if own.is_zero() {
            return Ok(None);
        }
        Ok(other.amount.checked_div(own.amount))
    }

    /// Amount of the other token matching `input` at the current reserve ratio
    pub fn quote(&self, input: &CurrencyAmount) -> Result<Option<CurrencyAmount>> {
        let own = self.reserve_of(&input.currency)?;
        let other = if self.token0() == &input.currency {
            &self.reserve1
        } else {
            &self.reserve0
        };
        if own.is_zero() || other.is_zero() {
            return Ok(None);
        }
        let amount = input
            .amount
            .checked_mul(other.amount)
            .and_then(|v| v.checked_div(own.amount))
            .ok_or_else(|| DeskError::Amount(format!("quote overflow for {}", input)))?;
        Ok(Some(CurrencyAmount::new(other.currency.clone(), amount)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tokens() -> (Token, Token) {
        (
            Token::new("cx2", "sICX", "Staked ICX", 18),
            Token::new("cx1", "bnUSD", "Balanced Dollar", 18),
        )
    }

    #[test]
    fn test_pair_orders_tokens() {
        let (sicx, bnusd) = tokens();
        let pair = Pair::new(
            CurrencyAmount::new(sicx.clone(), dec!(100)),
            CurrencyAmount::new(bnusd.clone(), dec!(50)),
        );
        assert_eq!(pair.token0(), &bnusd);
        assert_eq!(pair.reserve_of(&sicx).unwrap().amount, dec!(100));
        assert_eq!(pair.price_of(&sicx).unwrap(), Some(dec!(0.5)));
    }

    #[test]
    fn test_quote_uses_ratio() {
        let (sicx, bnusd) = tokens();
        let pair = Pair::new(
            CurrencyAmount::new(sicx.clone(), dec!(100)),
            CurrencyAmount::new(bnusd.clone(), dec!(50)),
        );
        let quoted = pair
            .quote(&CurrencyAmount::new(sicx, dec!(10)))
            .unwrap()
            .unwrap();
        assert_eq!(quoted.currency, bnusd);
        assert_eq!(quoted.amount, dec!(5));
    }

    #[test]
    fn test_find_trade_pair_inverted() {
        let (sicx, bnusd) = tokens();
        let pairs = vec![PairInfo::new(2, sicx, bnusd)];
        let (pair, inverted) = find_trade_pair(&pairs, "bnUSD", "sICX");
        assert_eq!(pair.unwrap().id, 2);
        assert!(inverted);
        let (pair, inverted) = find_trade_pair(&pairs, "sicx", "bnusd");
        assert_eq!(pair.unwrap().name, "sICX/bnUSD");
        assert!(!inverted);
        assert!(find_trade_pair(&pairs, "BALN", "sICX").0.is_none());
    }

    #[test]
    fn test_price_decimals() {
        let base = Token::new("cxa", "sICX", "Staked ICX", 18);
        let quote = Token::new("cxb", "IUSDC", "ICON USD Coin", 6);
        assert_eq!(PairInfo::new(5, base, quote).price_decimals(), 6);
    }
}
