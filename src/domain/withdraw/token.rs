//! Tokens, address validation and amount formatting

use std::fmt;

use alloy_primitives::{keccak256, Address, U256};

/// An ERC-20 asset known to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub chain_id: u64,
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub logo_uri: Option<String>,
}

impl Token {
    /// Label used in lists: `SYMBOL Name`
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.symbol.clone()
        } else {
            format!("{} {}", self.symbol, self.name)
        }
    }

    pub fn checksum_address(&self) -> String {
        to_checksum_address(&self.address)
    }
}

/// Validate user input as a chain address.
///
/// Accepts an optional lowercase `0x` prefix followed by exactly 40 hex
/// digits. Surrounding whitespace is not stripped.
/// All-lowercase and all-uppercase digits are accepted as-is; mixed case
/// must carry a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Option<Address> {
    let digits = input.strip_prefix("0x").unwrap_or(input);

    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let bytes = hex::decode(digits).ok()?;
    let address = Address::from_slice(&bytes);

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        let expected = to_checksum_address(&address);
        if expected[2..] != *digits {
            return None;
        }
    }

    Some(address)
}

/// EIP-55 mixed-case rendering of an address
pub fn to_checksum_address(address: &Address) -> String {
    let lower = hex::encode(address.as_slice());
    let hash = keccak256(lower.as_bytes());
    let hash_hex = hex::encode(hash.as_slice());

    let mut result = String::with_capacity(42);
    result.push_str("0x");

    for (c, h) in lower.chars().zip(hash_hex.chars()) {
        let nibble = h.to_digit(16).unwrap_or(0);
        if nibble >= 8 {
            result.push(c.to_ascii_uppercase());
        } else {
            result.push(c);
        }
    }

    result
}

/// `0x1234..abcd`
pub fn short_address(address: &Address) -> String {
    let full = to_checksum_address(address);
    format!("{}..{}", &full[..6], &full[full.len() - 4..])
}

/// Raw on-chain token amount together with its precision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    pub raw: U256,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.decimals == 0 {
            return write!(f, "{}", self.raw);
        }

        let divisor = U256::from(10u64).pow(U256::from(self.decimals));
        let whole = self.raw / divisor;
        let frac = self.raw % divisor;

        if frac.is_zero() {
            return write!(f, "{}", whole);
        }

        let frac_str = format!("{:0>width$}", frac.to_string(), width = self.decimals as usize);
        let trimmed = frac_str.trim_end_matches('0');
        write!(f, "{}.{}", whole, trimmed)
    }
}
