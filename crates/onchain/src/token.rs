//! Token metadata and balances.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::abi::{IERC20Bytes32, IERC20};
use crate::errors::{ChainError, Result};
use crate::rpc::{call_contract, ChainClient};

/// How to read a token contract.
#[async_trait]
pub trait TokenInterface: Send + Sync {
    async fn symbol(&self, client: &dyn ChainClient, token: Address) -> Result<String>;

    async fn decimals(&self, client: &dyn ChainClient, token: Address) -> Result<u8>;

    async fn balance_of(&self, client: &dyn ChainClient, token: Address, owner: Address)
        -> Result<U256>;
}

/// Standard ERC-20.
///
/// Symbols that do not decode as `string` are retried as `bytes32`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Erc20;

#[async_trait]
impl TokenInterface for Erc20 {
    async fn symbol(&self, client: &dyn ChainClient, token: Address) -> Result<String> {
        match call_contract(client, token, &IERC20::symbolCall {}).await {
            Ok(ret) => Ok(ret._0),
            Err(ChainError::Abi { .. }) => {
                let ret = call_contract(client, token, &IERC20Bytes32::symbolCall {}).await?;
                Ok(bytes32_to_string(ret._0.as_slice()))
            }
            Err(e) => Err(e),
        }
    }

    async fn decimals(&self, client: &dyn ChainClient, token: Address) -> Result<u8> {
        Ok(call_contract(client, token, &IERC20::decimalsCall {}).await?._0)
    }

    async fn balance_of(
        &self,
        client: &dyn ChainClient,
        token: Address,
        owner: Address,
    ) -> Result<U256> {
        Ok(call_contract(client, token, &IERC20::balanceOfCall { owner }).await?._0)
    }
}

fn bytes32_to_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
