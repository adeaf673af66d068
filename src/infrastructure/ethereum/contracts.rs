//! ERC-20 and lock contract bindings

use alloy::primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall, SolValue};

use crate::domain::{ChainError, WithdrawReceipt};
use crate::infrastructure::ethereum::ChainClient;

sol! {
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function name() external view returns (string);
    }

    interface ITokenLocker {
        function withdraw(address token) external;
    }
}

async fn read(client: &dyn ChainClient, to: Address, data: Vec<u8>) -> Result<Bytes, ChainError> {
    client
        .call(to, Bytes::from(data))
        .await
        .map_err(|err| ChainError::classify(&err))
}

pub async fn balance_of(
    client: &dyn ChainClient,
    token: Address,
    owner: Address,
) -> Result<U256, ChainError> {
    let data = IERC20::balanceOfCall { account: owner }.abi_encode();
    let ret = read(client, token, data).await?;
    decode_uint(&ret)
}

pub async fn decimals(client: &dyn ChainClient, token: Address) -> Result<u8, ChainError> {
    let ret = read(client, token, IERC20::decimalsCall {}.abi_encode()).await?;
    let value = decode_uint(&ret)?;
    if value > U256::from(u8::MAX) {
        return Err(ChainError::Decode(format!("decimals out of range: {value}")));
    }
    Ok(value.to::<u8>())
}

pub async fn symbol(client: &dyn ChainClient, token: Address) -> Result<String, ChainError> {
    let ret = read(client, token, IERC20::symbolCall {}.abi_encode()).await?;
    decode_string(&ret)
}

pub async fn name(client: &dyn ChainClient, token: Address) -> Result<String, ChainError> {
    let ret = read(client, token, IERC20::nameCall {}.abi_encode()).await?;
    decode_string(&ret)
}

/// Send `withdraw(token)` to the lock contract and wait for it to be mined.
pub async fn withdraw(
    client: &dyn ChainClient,
    locker: Address,
    token: Address,
) -> Result<WithdrawReceipt, ChainError> {
    let data = ITokenLocker::withdrawCall { token }.abi_encode();
    let receipt = client
        .send_transaction(locker, Bytes::from(data))
        .await
        .map_err(|err| ChainError::classify(&err))?;

    let tx_hash = format!("{:?}", receipt.tx_hash);
    if !receipt.success {
        return Err(ChainError::Reverted(format!("status 0 in {tx_hash}")));
    }

    Ok(WithdrawReceipt {
        tx_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
    })
}

fn decode_uint(data: &[u8]) -> Result<U256, ChainError> {
    if data.len() < 32 {
        return Err(ChainError::Decode(format!(
            "expected 32 bytes, got {}",
            data.len()
        )));
    }
    Ok(U256::from_be_slice(&data[..32]))
}

/// ABI `string`, or a NUL-padded `bytes32` for legacy tokens (MKR, SAI).
fn decode_string(data: &[u8]) -> Result<String, ChainError> {
    if let Ok(value) = <String as SolValue>::abi_decode(data) {
        return Ok(value);
    }
    if data.len() == 32 {
        let raw: Vec<u8> = data.iter().copied().take_while(|b| *b != 0).collect();
        return String::from_utf8(raw).map_err(|err| ChainError::Decode(err.to_string()));
    }
    Err(ChainError::Decode(format!(
        "cannot decode string from {} bytes",
        data.len()
    )))
}
