//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based chain client and ERC-20 / lock contract bindings
//! - GraphQL client for the transfers subgraph
//! - Token list loading
//! - Tokio runtime bridge for async operations

pub mod ethereum;
pub mod runtime;
pub mod subgraph;
pub mod token_list;

pub use ethereum::{create_client, ChainClient, ProviderConfig};
pub use runtime::{execute, RuntimeBridge, RuntimeCommand, RuntimeEvent};
pub use subgraph::{SubgraphClient, TransferRecord};
