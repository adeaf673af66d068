//! Session-scoped token catalog

use std::collections::{BTreeMap, HashSet};

use alloy_primitives::Address;

use super::token::Token;

/// Upper bound on filter results shown in the autocomplete list
pub const FILTER_LIMIT: usize = 65;

/// Immutable seed list plus tokens discovered during the session.
///
/// Addresses are unique across both parts. Tokens are appended, never
/// removed.
#[derive(Debug, Clone, Default)]
pub struct TokenCatalog {
    seed: Vec<Token>,
    discovered: BTreeMap<Address, Token>,
    /// Insertion order of `discovered`
    order: Vec<Address>,
}

impl TokenCatalog {
    /// Build a catalog from a seed list. Later duplicates of an address are
    /// dropped.
    pub fn new(seed: Vec<Token>) -> Self {
        let mut seen = HashSet::new();
        let seed = seed
            .into_iter()
            .filter(|token| seen.insert(token.address))
            .collect();
        Self {
            seed,
            discovered: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.seed.len() + self.discovered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, address: &Address) -> Option<&Token> {
        self.seed
            .iter()
            .find(|token| token.address == *address)
            .or_else(|| self.discovered.get(address))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.get(address).is_some()
    }

    /// Append a token read from chain. Returns false if the address is
    /// already known.
    pub fn insert(&mut self, token: Token) -> bool {
        if self.contains(&token.address) {
            return false;
        }
        self.order.push(token.address);
        self.discovered.insert(token.address, token);
        true
    }

    /// Seed tokens first, then discovered tokens in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.seed
            .iter()
            .chain(self.order.iter().filter_map(|addr| self.discovered.get(addr)))
    }

    /// Case-insensitive prefix match on token name, capped at `FILTER_LIMIT`.
    pub fn filter(&self, query: &str) -> Vec<&Token> {
        let needle = query.to_lowercase();
        self.iter()
            .filter(|token| token.name.to_lowercase().starts_with(&needle))
            .take(FILTER_LIMIT)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(byte: u8, name: &str, symbol: &str) -> Token {
        Token {
            chain_id: 1,
            address: Address::repeat_byte(byte),
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: 18,
            logo_uri: None,
        }
    }

    #[test]
    fn test_seed_dedup() {
        let catalog = TokenCatalog::new(vec![
            token(1, "Dai Stablecoin", "DAI"),
            token(1, "Dai Copy", "DAI2"),
            token(2, "USD Coin", "USDC"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(&Address::repeat_byte(1)).unwrap().symbol, "DAI");
    }

    #[test]
    fn test_insert_appends_once() {
        let mut catalog = TokenCatalog::new(vec![token(1, "Dai Stablecoin", "DAI")]);
        assert!(catalog.insert(token(3, "Maker", "MKR")));
        assert!(!catalog.insert(token(3, "Maker", "MKR")));
        assert!(!catalog.insert(token(1, "Dai Stablecoin", "DAI")));
        assert_eq!(catalog.len(), 2);

        let symbols: Vec<_> = catalog.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["DAI", "MKR"]);
    }

    #[test]
    fn test_filter_prefix_case_insensitive() {
        let catalog = TokenCatalog::new(vec![
            token(1, "Ether.fi", "ETHFI"),
            token(2, "ethereum name service", "ENS"),
            token(3, "Wrapped Ether", "WETH"),
            token(4, "Tether USD", "USDT"),
        ]);

        let names: Vec<_> = catalog.filter("ETH").iter().map(|t| t.name.clone()).collect();
        assert_eq!(names, vec!["Ether.fi", "ethereum name service"]);
    }

    #[test]
    fn test_filter_empty_query_lists_everything() {
        let catalog = TokenCatalog::new(vec![token(1, "A", "A"), token(2, "B", "B")]);
        assert_eq!(catalog.filter("").len(), 2);
    }

    #[test]
    fn test_filter_is_capped() {
        let seed = (0..100u8)
            .map(|i| token(i, &format!("Ether clone {i}"), "ETHC"))
            .collect();
        let catalog = TokenCatalog::new(seed);
        assert_eq!(catalog.filter("ether").len(), FILTER_LIMIT);
    }
}
