//! Turns workflow requests into chain calls

use alloy::primitives::{Address, U256};

use crate::domain::{ChainError, Outcome, Request, Token};
use crate::infrastructure::ethereum::{contracts, ChainClient};

/// Run one request to completion. Never panics and never returns early
/// without an outcome; failures are carried inside it.
pub async fn execute(client: &dyn ChainClient, locker: Address, request: Request) -> Outcome {
    match request {
        Request::LoadBalance { ticket, token } => {
            let result = contracts::balance_of(client, token.address, locker).await;
            if let Err(err) = &result {
                tracing::warn!(token = %token.symbol, error = %err, "balance read failed");
            }
            Outcome::BalanceLoaded { ticket, result }
        }
        Request::DiscoverToken { ticket } => {
            let result = discover_token(client, locker, ticket.token).await;
            match &result {
                Ok((token, _)) => {
                    tracing::info!(address = ?token.address, symbol = %token.symbol, "token read from chain")
                }
                Err(err) => {
                    tracing::warn!(address = ?ticket.token, error = %err, "token lookup abandoned")
                }
            }
            Outcome::TokenDiscovered { ticket, result }
        }
        Request::Withdraw { ticket, token } => {
            tracing::info!(token = %token.symbol, locker = ?locker, "requesting withdrawal");
            let result = contracts::withdraw(client, locker, token.address).await;
            match &result {
                Ok(receipt) => tracing::info!(tx_hash = %receipt.tx_hash, "withdrawal mined"),
                Err(err) => tracing::error!(token = %token.symbol, error = %err, "withdrawal failed"),
            }
            Outcome::WithdrawSettled { ticket, result }
        }
    }
}

/// Sequential reads: balance, decimals, symbol, name. The first failure
/// aborts the lookup.
async fn discover_token(
    client: &dyn ChainClient,
    locker: Address,
    address: Address,
) -> Result<(Token, U256), ChainError> {
    let balance = contracts::balance_of(client, address, locker).await?;
    let decimals = contracts::decimals(client, address).await?;
    let symbol = contracts::symbol(client, address).await?;
    let name = contracts::name(client, address).await?;

    let token = Token {
        chain_id: client.chain_id(),
        address,
        name,
        symbol,
        decimals,
        logo_uri: None,
    };
    Ok((token, balance))
}
