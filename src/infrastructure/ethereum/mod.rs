//! Ethereum infrastructure - Alloy client and contract bindings

pub mod contracts;
mod provider;

pub use provider::{create_client, AlloyClient, ChainClient, ProviderConfig, TxReceipt};
