//! Chain client abstraction and the Alloy implementation
//!
//! The workflow needs two things from a wallet/provider: read-only contract
//! calls and a signer for state-changing calls. Everything else stays behind
//! this trait so the executor can run against a mock in tests.

use std::path::PathBuf;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};

/// Provider configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

/// Mined transaction, reduced to what the UI shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

#[async_trait::async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Execute a read-only call (eth_call)
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Sign and submit a transaction, then wait for its receipt
    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxReceipt>;

    /// Chain id reported at connect time
    fn chain_id(&self) -> u64;

    /// Account transactions are sent from, if any
    fn sender(&self) -> Option<Address>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

pub struct AlloyClient {
    provider: DynProvider,
    endpoint: String,
    chain_id: u64,
    sender: Option<Address>,
}

/// Connect to an endpoint.
///
/// With a signer, transactions are signed locally. Without one they are
/// sent from the node's first unlocked account (dev nodes such as Anvil).
pub async fn create_client(
    config: ProviderConfig,
    signer: Option<PrivateKeySigner>,
) -> Result<AlloyClient> {
    let endpoint = config.display();
    let signer_address = signer.as_ref().map(|signer| signer.address());
    let provider = connect(config, signer).await?;

    let chain_id = provider
        .get_chain_id()
        .await
        .context("Failed to get chain id")?;

    let sender = match signer_address {
        Some(address) => Some(address),
        None => provider
            .get_accounts()
            .await
            .unwrap_or_default()
            .first()
            .copied(),
    };

    tracing::info!(%endpoint, chain_id, sender = ?sender, "connected");

    Ok(AlloyClient {
        provider,
        endpoint,
        chain_id,
        sender,
    })
}

async fn connect(config: ProviderConfig, signer: Option<PrivateKeySigner>) -> Result<DynProvider> {
    let wallet = signer.map(EthereumWallet::from);

    match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            let provider = match wallet {
                Some(wallet) => ProviderBuilder::new()
                    .wallet(wallet)
                    .connect_http(rpc_url)
                    .erased(),
                None => ProviderBuilder::new().connect_http(rpc_url).erased(),
            };
            Ok(provider)
        }
        ProviderConfig::WebSocket(url) => {
            let provider = match wallet {
                Some(wallet) => ProviderBuilder::new()
                    .wallet(wallet)
                    .connect(&url)
                    .await
                    .context("Failed to create WebSocket provider")?
                    .erased(),
                None => ProviderBuilder::new()
                    .connect(&url)
                    .await
                    .context("Failed to create WebSocket provider")?
                    .erased(),
            };
            Ok(provider)
        }
        #[cfg(unix)]
        ProviderConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc = IpcConnect::new(path.to_string_lossy().to_string());
            let provider = match wallet {
                Some(wallet) => ProviderBuilder::new()
                    .wallet(wallet)
                    .connect_ipc(ipc)
                    .await
                    .context("Failed to create IPC provider")?
                    .erased(),
                None => ProviderBuilder::new()
                    .connect_ipc(ipc)
                    .await
                    .context("Failed to create IPC provider")?
                    .erased(),
            };
            Ok(provider)
        }
    }
}

#[async_trait::async_trait]
impl ChainClient for AlloyClient {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let request = TransactionRequest::default().to(to).input(data.into());
        Ok(self.provider.call(request).await?)
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxReceipt> {
        let mut request = TransactionRequest::default().to(to).input(data.into());
        if let Some(from) = self.sender {
            request = request.from(from);
        }

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .context("Failed to submit transaction")?;
        tracing::debug!(tx_hash = %pending.tx_hash(), "transaction submitted");

        let receipt = pending
            .get_receipt()
            .await
            .context("Failed to fetch receipt")?;

        Ok(TxReceipt {
            tx_hash: receipt.transaction_hash,
            success: receipt.status(),
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn sender(&self) -> Option<Address> {
        self.sender
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}
