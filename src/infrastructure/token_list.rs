//! Token list loading (Uniswap / CoinGecko token-list JSON)

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::{parse_address, Token};

/// Token list shipped with the binary
pub const BUNDLED: &str = include_str!("../../assets/tokens.json");

#[derive(Debug, Deserialize)]
struct TokenList {
    #[serde(default)]
    tokens: Vec<TokenListEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenListEntry {
    chain_id: u64,
    address: String,
    name: String,
    symbol: String,
    decimals: u8,
    #[serde(default, rename = "logoURI")]
    logo_uri: Option<String>,
}

/// Parse a token list. Entries with unusable addresses are skipped.
pub fn parse(json: &str) -> Result<Vec<Token>> {
    let list: TokenList = serde_json::from_str(json).context("Invalid token list")?;

    let mut tokens = Vec::with_capacity(list.tokens.len());
    for entry in list.tokens {
        // lists are trusted data; checksum casing is not enforced here
        let Some(address) = parse_address(&entry.address.trim().to_lowercase()) else {
            tracing::warn!(address = %entry.address, symbol = %entry.symbol, "skipping token list entry");
            continue;
        };
        tokens.push(Token {
            chain_id: entry.chain_id,
            address,
            name: entry.name,
            symbol: entry.symbol,
            decimals: entry.decimals,
            logo_uri: entry.logo_uri.filter(|uri| !uri.trim().is_empty()),
        });
    }
    Ok(tokens)
}

pub fn load(path: &Path) -> Result<Vec<Token>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read token list {}", path.display()))?;
    parse(&content)
}

pub fn bundled() -> Result<Vec<Token>> {
    parse(BUNDLED)
}
