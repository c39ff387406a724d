//! Error types for chain reads.

use dipzy_core::ApiError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChainError>;

#[derive(Error, Debug)]
pub enum ChainError {
    /// The JSON-RPC round trip failed.
    #[error(transparent)]
    Rpc(#[from] ApiError),

    /// Call output did not decode as the expected ABI type.
    #[error("Failed to decode {function}: {message}")]
    Abi {
        function: &'static str,
        message: String,
    },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid pool: {0}")]
    InvalidPool(String),
}
