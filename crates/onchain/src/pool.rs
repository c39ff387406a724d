//! Liquidity-pool reserves.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{address, Address, U256};
use log::debug;

use crate::abi::{ICurvePool, ICurvePoolLegacy, IUniswapV3Pool};
use crate::context::ExecutionContext;
use crate::errors::{ChainError, Result};
use crate::rpc::call_contract;

/// Placeholder Curve uses for native ETH.
pub const ETH_PLACEHOLDER: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Integer type of Curve's coin index argument.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoinIndex {
    #[default]
    Uint256,
    /// Older pools such as 3pool.
    Int128,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolKind {
    /// Curve pool holding `coins` tokens.
    Curve { coins: usize, index: CoinIndex },
    /// Uniswap v3 pair.
    UniswapV3,
}

impl PoolKind {
    pub fn curve(coins: usize) -> Self {
        PoolKind::Curve {
            coins,
            index: CoinIndex::Uint256,
        }
    }

    pub fn curve_legacy(coins: usize) -> Self {
        PoolKind::Curve {
            coins,
            index: CoinIndex::Int128,
        }
    }
}

/// One token held by a pool, in raw units.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reserve {
    pub symbol: String,
    pub decimals: u8,
    pub balance: U256,
}

impl Reserve {
    /// Whole-token balance with thousands separators.
    pub fn display_balance(&self) -> String {
        format_units(self.balance, self.decimals)
    }
}

/// A pool and the reserves read when it was loaded.
#[derive(Clone, Debug)]
pub struct LiquidityPool {
    address: Address,
    kind: PoolKind,
    token_addresses: Vec<Address>,
    reserves: Vec<Reserve>,
}

impl LiquidityPool {
    /// Read every reserve of the pool at `address`.
    pub async fn load(ctx: &ExecutionContext, address: &str, kind: PoolKind) -> Result<Self> {
        let address = Address::from_str(address.trim())
            .map_err(|e| ChainError::InvalidAddress(format!("{}: {}", address, e)))?;
        debug!("Loading {:?} pool {}", kind, address.to_checksum(None));

        let mut pool = Self {
            address,
            kind,
            token_addresses: Vec::new(),
            reserves: Vec::new(),
        };
        match kind {
            PoolKind::Curve { coins, index } => pool.load_curve(ctx, coins, index).await?,
            PoolKind::UniswapV3 => pool.load_uniswap_v3(ctx).await?,
        }
        Ok(pool)
    }

    async fn load_curve(
        &mut self,
        ctx: &ExecutionContext,
        coins: usize,
        index: CoinIndex,
    ) -> Result<()> {
        if coins == 0 {
            return Err(ChainError::InvalidPool(
                "Curve pool needs at least one coin".to_string(),
            ));
        }

        for i in 0..coins {
            let token = self.curve_coin(ctx, i, index).await?;
            self.token_addresses.push(token);

            let balance = self.curve_balance(ctx, i, index).await?;
            let reserve = if token == ETH_PLACEHOLDER {
                Reserve {
                    symbol: "ETH".to_string(),
                    decimals: 18,
                    balance,
                }
            } else {
                Reserve {
                    symbol: ctx.tokens().symbol(ctx.client(), token).await?,
                    decimals: ctx.tokens().decimals(ctx.client(), token).await?,
                    balance,
                }
            };
            self.insert(reserve);
        }
        Ok(())
    }

    async fn curve_coin(
        &self,
        ctx: &ExecutionContext,
        i: usize,
        index: CoinIndex,
    ) -> Result<Address> {
        let client = ctx.client();
        Ok(match index {
            CoinIndex::Uint256 => {
                call_contract(client, self.address, &ICurvePool::coinsCall { i: U256::from(i) })
                    .await?
                    ._0
            }
            CoinIndex::Int128 => {
                call_contract(client, self.address, &ICurvePoolLegacy::coinsCall { i: i as i128 })
                    .await?
                    ._0
            }
        })
    }

    async fn curve_balance(
        &self,
        ctx: &ExecutionContext,
        i: usize,
        index: CoinIndex,
    ) -> Result<U256> {
        let client = ctx.client();
        Ok(match index {
            CoinIndex::Uint256 => {
                call_contract(client, self.address, &ICurvePool::balancesCall { i: U256::from(i) })
                    .await?
                    ._0
            }
            CoinIndex::Int128 => {
                call_contract(client, self.address, &ICurvePoolLegacy::balancesCall { i: i as i128 })
                    .await?
                    ._0
            }
        })
    }

    async fn load_uniswap_v3(&mut self, ctx: &ExecutionContext) -> Result<()> {
        let client = ctx.client();
        let token0 = call_contract(client, self.address, &IUniswapV3Pool::token0Call {})
            .await?
            ._0;
        let token1 = call_contract(client, self.address, &IUniswapV3Pool::token1Call {})
            .await?
            ._0;

        for token in [token0, token1] {
            self.token_addresses.push(token);
            let reserve = Reserve {
                symbol: ctx.tokens().symbol(client, token).await?,
                decimals: ctx.tokens().decimals(client, token).await?,
                balance: ctx.tokens().balance_of(client, token, self.address).await?,
            };
            self.insert(reserve);
        }
        Ok(())
    }

    /// Keep insertion order; a repeated symbol replaces the earlier entry in place.
    fn insert(&mut self, reserve: Reserve) {
        match self.reserves.iter_mut().find(|r| r.symbol == reserve.symbol) {
            Some(existing) => *existing = reserve,
            None => self.reserves.push(reserve),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 checksummed address.
    pub fn checksum_address(&self) -> String {
        self.address.to_checksum(None)
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    /// Token contracts in pool order (Curve placeholders included).
    pub fn token_addresses(&self) -> &[Address] {
        &self.token_addresses
    }

    pub fn reserves(&self) -> &[Reserve] {
        &self.reserves
    }

    pub fn reserve(&self, symbol: &str) -> Option<&Reserve> {
        self.reserves.iter().find(|r| r.symbol == symbol)
    }

    /// One `"<balance> <symbol>"` line per reserve.
    pub fn summary(&self) -> Vec<String> {
        self.reserves
            .iter()
            .map(|r| format!("{} {}", r.display_balance(), r.symbol))
            .collect()
    }
}

impl fmt::Display for LiquidityPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary().join("\n"))
    }
}

/// `balance / 10^decimals` rounded to a whole number, ties to even, with `,`
/// thousands separators.
pub fn format_units(balance: U256, decimals: u8) -> String {
    let whole = match U256::from(10u8).checked_pow(U256::from(decimals)) {
        Some(scale) => {
            let (quotient, remainder) = balance.div_rem(scale);
            let rest = scale - remainder;
            let round_up = remainder > rest || (remainder == rest && quotient.bit(0));
            if round_up {
                quotient + U256::from(1u8)
            } else {
                quotient
            }
        }
        // Scale exceeds any representable balance
        None => U256::ZERO,
    };
    group_thousands(&whole.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
