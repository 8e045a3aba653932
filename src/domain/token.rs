use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Address of the native coin, used where a contract address is expected
pub const NATIVE_ADDRESS: &str = "cx0000000000000000000000000000000000000000";

/// A fungible token known to the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Extra words matched by symbol search
    #[serde(default)]
    pub searchable_terms: String,
}

fn default_chain_id() -> u64 {
    1
}

impl Token {
    pub fn new(address: &str, symbol: &str, name: &str, decimals: u32) -> Self {
        Self {
            address: address.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            chain_id: default_chain_id(),
            searchable_terms: String::new(),
        }
    }

    pub fn with_terms(mut self, terms: &str) -> Self {
        self.searchable_terms = terms.to_string();
        self
    }

    pub fn is_native(&self) -> bool {
        self.address.eq_ignore_ascii_case(NATIVE_ADDRESS)
    }

    /// Canonical ordering used when building reserve snapshots
    pub fn sorts_before(&self, other: &Token) -> bool {
        self.address.to_ascii_lowercase() < other.address.to_ascii_lowercase()
    }

    /// Case-insensitive match on name, symbol or searchable terms
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.symbol.to_lowercase().contains(&query)
            || self.searchable_terms.to_lowercase().contains(&query)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address.eq_ignore_ascii_case(&other.address)
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Lookup table of supported tokens by address and by symbol
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    by_address: HashMap<String, Token>,
    by_symbol: HashMap<String, String>,
}

impl TokenRegistry {
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        let mut registry = Self::default();
        for token in tokens {
            registry.insert(token);
        }
        registry
    }

    pub fn insert(&mut self, token: Token) {
        let address = token.address.to_ascii_lowercase();
        self.by_symbol
            .insert(token.symbol.to_ascii_lowercase(), address.clone());
        self.by_address.insert(address, token);
    }

    pub fn by_address(&self, address: &str) -> Option<&Token> {
        self.by_address.get(&address.to_ascii_lowercase())
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Token> {
        self.by_symbol
            .get(&symbol.to_ascii_lowercase())
            .and_then(|address| self.by_address.get(address))
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.by_address.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_before_ignores_case() {
        let a = Token::new("cxAAA", "A", "Token A", 18);
        let b = Token::new("cxbbb", "B", "Token B", 18);
        assert!(a.sorts_before(&b));
        assert!(!b.sorts_before(&a));
    }

    #[test]
    fn test_registry_lookup() {
        let registry = TokenRegistry::new(vec![
            Token::new("cxABC", "BALN", "Balance Token", 18),
            Token::new("cxdef", "bnUSD", "Balanced Dollar", 18).with_terms("usd stablecoin"),
        ]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.by_address("cxabc").unwrap().symbol, "BALN");
        assert_eq!(registry.by_symbol("BNUSD").unwrap().address, "cxdef");
        assert!(registry.by_symbol("bnusd").unwrap().matches("stable"));
        assert!(registry.by_address("cx404").is_none());
    }
}
