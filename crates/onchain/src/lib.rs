//! dipzy onchain
//!
//! Reads token reserves of Curve and Uniswap v3 liquidity pools through
//! read-only `eth_call`s.
//!
//! ```no_run
//! # async fn demo() -> dipzy_onchain::Result<()> {
//! use dipzy_core::Credentials;
//! use dipzy_onchain::{ExecutionContext, LiquidityPool, PoolKind};
//!
//! let ctx = ExecutionContext::from_credentials(&Credentials::from_env())?;
//! let pool = LiquidityPool::load(
//!     &ctx,
//!     "0xbebc44782c7db0a1a60cb6fe97d0b483032ff1c7",
//!     PoolKind::curve_legacy(3),
//! )
//! .await?;
//! println!("{}", pool);
//! # Ok(())
//! # }
//! ```

pub mod abi;
pub mod context;
pub mod errors;
pub mod pool;
pub mod rpc;
pub mod token;

pub use context::ExecutionContext;
pub use errors::{ChainError, Result};
pub use pool::{format_units, CoinIndex, LiquidityPool, PoolKind, Reserve, ETH_PLACEHOLDER};
pub use rpc::{call_contract, ChainClient, JsonRpcClient, JsonRpcPolicy};
pub use token::{Erc20, TokenInterface};
