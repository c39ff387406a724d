use std::sync::Arc;

use dipzy_core::Credentials;

use crate::errors::Result;
use crate::rpc::{ChainClient, JsonRpcClient};
use crate::token::{Erc20, TokenInterface};

/// Everything a pool needs to read the chain: an RPC connection and a way
/// to read token contracts.
#[derive(Clone)]
pub struct ExecutionContext {
    client: Arc<dyn ChainClient>,
    tokens: Arc<dyn TokenInterface>,
}

impl ExecutionContext {
    /// Context reading tokens as standard ERC-20.
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self {
            client,
            tokens: Arc::new(Erc20),
        }
    }

    /// JSON-RPC context from `ETH_RPC_URL`.
    pub fn from_credentials(credentials: &Credentials) -> Result<Self> {
        Ok(Self::new(Arc::new(JsonRpcClient::from_credentials(credentials)?)))
    }

    pub fn with_tokens(mut self, tokens: Arc<dyn TokenInterface>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn client(&self) -> &dyn ChainClient {
        self.client.as_ref()
    }

    pub fn tokens(&self) -> &dyn TokenInterface {
        self.tokens.as_ref()
    }
}
