use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::{parse_address, Token};

/// Extra catalog entry declared in the config file
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSpec {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
    pub name: Option<String>,
    pub chain_id: Option<u64>,
    pub logo_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub name: Option<String>,
    pub rpc: Option<String>,
    pub ws: Option<String>,
    pub ipc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Lock contract address
    pub locker: Option<String>,

    /// Path to a token list replacing the bundled one
    pub token_list: Option<String>,

    /// GraphQL endpoint of the transfers subgraph
    pub subgraph: Option<String>,

    /// Tracing filter, e.g. `unlock=debug`
    pub log_level: Option<String>,

    #[serde(default)]
    pub tokens: Vec<TokenSpec>,

    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

impl TokenSpec {
    pub fn normalized_address(&self) -> String {
        normalize_address(&self.address)
    }

    pub fn to_token(&self) -> Option<Token> {
        let address = parse_address(&self.normalized_address())?;
        let name = self
            .name
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.symbol.clone());
        Some(Token {
            chain_id: self.chain_id.unwrap_or(1),
            address,
            name,
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            logo_uri: self.logo_uri.clone(),
        })
    }
}

/// Load the config file. A missing file yields the defaults; a file that
/// exists but does not parse is an error.
pub fn load() -> Result<Config> {
    let Some(path) = config_path() else {
        return Ok(Config::default());
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Ok(Config::default()),
    };
    parse(&content).with_context(|| format!("Invalid config {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str::<Config>(content)?)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("UNLOCK_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("unlock").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("unlock").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "unlock", "unlock")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("unlock"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("unlock"));
    }
    directories::ProjectDirs::from("io", "unlock", "unlock")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_dir() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("logs"))
}

fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    let payload = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    format!("0x{}", payload.to_lowercase())
}
