//! Shared fixtures: an in-memory chain and a small catalog

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use anyhow::{anyhow, Result};

use unlock::app::App;
use unlock::domain::{Token, TokenCatalog, WithdrawalWorkflow};
use unlock::infrastructure::ethereum::TxReceipt;
use unlock::infrastructure::{execute, ChainClient, RuntimeCommand};

pub const BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];
pub const DECIMALS: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];
pub const SYMBOL: [u8; 4] = [0x95, 0xd8, 0x9b, 0x41];
pub const NAME: [u8; 4] = [0x06, 0xfd, 0xde, 0x03];
pub const WITHDRAW: [u8; 4] = [0x51, 0xcf, 0xf8, 0xd9];

pub fn locker() -> Address {
    Address::repeat_byte(0x10)
}

pub fn usdc() -> Token {
    Token {
        chain_id: 1,
        address: Address::repeat_byte(0xaa),
        name: "USD Coin".to_string(),
        symbol: "USDC".to_string(),
        decimals: 6,
        logo_uri: None,
    }
}

pub fn dai() -> Token {
    Token {
        chain_id: 1,
        address: Address::repeat_byte(0xbb),
        name: "Dai Stablecoin".to_string(),
        symbol: "DAI".to_string(),
        decimals: 18,
        logo_uri: None,
    }
}

pub fn catalog() -> TokenCatalog {
    TokenCatalog::new(vec![usdc(), dai()])
}

pub fn app() -> App {
    App::new(WithdrawalWorkflow::new(catalog()), locker())
}

pub fn units(n: u64, decimals: u8) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(decimals))
}

/// Chain double answering eth_call by (contract, selector)
pub struct MockChain {
    responses: Mutex<HashMap<(Address, [u8; 4]), Result<Bytes, String>>>,
    send_result: Mutex<Result<bool, String>>,
    calls: Mutex<Vec<(Address, [u8; 4])>>,
    sends: Mutex<Vec<(Address, Bytes)>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            send_result: Mutex::new(Ok(true)),
            calls: Mutex::new(Vec::new()),
            sends: Mutex::new(Vec::new()),
        }
    }

    pub fn set_balance(&self, token: Address, amount: U256) {
        self.respond(token, BALANCE_OF, amount.abi_encode());
    }

    /// Full ERC-20 metadata for a token
    pub fn set_token(&self, token: &Token, locked: U256) {
        self.set_balance(token.address, locked);
        self.respond(token.address, DECIMALS, U256::from(token.decimals).abi_encode());
        self.respond(token.address, SYMBOL, token.symbol.clone().abi_encode());
        self.respond(token.address, NAME, token.name.clone().abi_encode());
    }

    pub fn respond(&self, to: Address, selector: [u8; 4], data: Vec<u8>) {
        self.responses
            .lock()
            .unwrap()
            .insert((to, selector), Ok(Bytes::from(data)));
    }

    pub fn fail(&self, to: Address, selector: [u8; 4], message: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert((to, selector), Err(message.to_string()));
    }

    /// `Ok(false)` mines the transaction with status 0
    pub fn set_send_result(&self, result: Result<bool, String>) {
        *self.send_result.lock().unwrap() = result;
    }

    pub fn calls(&self) -> Vec<(Address, [u8; 4])> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn sends(&self) -> Vec<(Address, Bytes)> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChainClient for MockChain {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&data[..4]);
        self.calls.lock().unwrap().push((to, selector));

        match self.responses.lock().unwrap().get(&(to, selector)) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(message)) => Err(anyhow!(message.clone())),
            None => Err(anyhow!("execution reverted")),
        }
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxReceipt> {
        self.sends.lock().unwrap().push((to, data));
        match self.send_result.lock().unwrap().clone() {
            Ok(success) => Ok(TxReceipt {
                tx_hash: B256::repeat_byte(0x42),
                success,
                block_number: Some(100),
                gas_used: 51_000,
            }),
            Err(message) => Err(anyhow!(message)),
        }
    }

    fn chain_id(&self) -> u64 {
        1
    }

    fn sender(&self) -> Option<Address> {
        Some(Address::repeat_byte(0x01))
    }

    fn endpoint_name(&self) -> String {
        "mock".to_string()
    }
}

/// Execute everything the app queued, in order, until nothing is left.
/// Returns the non-chain commands that were skipped.
pub async fn run_pending(app: &mut App, chain: &MockChain) -> Vec<RuntimeCommand> {
    let mut skipped = Vec::new();
    loop {
        let commands = app.take_commands();
        if commands.is_empty() {
            return skipped;
        }
        for command in commands {
            match command {
                RuntimeCommand::Execute(request) => {
                    let outcome = execute(chain, locker(), request).await;
                    app.apply_event(unlock::infrastructure::RuntimeEvent::Outcome(outcome));
                }
                other => skipped.push(other),
            }
        }
    }
}
