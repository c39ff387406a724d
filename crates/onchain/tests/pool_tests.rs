//! Pool reserve reading against an in-memory chain.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, Bytes, FixedBytes, U256};
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use dipzy_core::ApiError;
use dipzy_onchain::abi::{ICurvePool, ICurvePoolLegacy, IUniswapV3Pool, IERC20};
use dipzy_onchain::{
    ChainClient, ChainError, ExecutionContext, LiquidityPool, PoolKind, ETH_PLACEHOLDER,
};

const POOL: &str = "0xdc24316b9ae028f1497c275eb9192a3ea0f67022";
const STETH: &str = "0xae7ab96520de3a18e5e111b5eaab095312d7fe84";
const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
const WETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";

fn addr(s: &str) -> Address {
    Address::from_str(s).unwrap()
}

fn eth(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10u64).pow(U256::from(18u8))
}

/// Answers `eth_call`s from a table keyed by target and calldata.
#[derive(Default)]
struct MockChain {
    responses: HashMap<(Address, Vec<u8>), Vec<u8>>,
    calls: Mutex<Vec<Address>>,
}

impl MockChain {
    fn on<C: SolCall, V: SolValue>(mut self, to: Address, call: C, value: V) -> Self {
        self.responses
            .insert((to, call.abi_encode()), (value,).abi_encode_params());
        self
    }

    fn token(self, token: Address, symbol: &str, decimals: u8) -> Self {
        self.on(token, IERC20::symbolCall {}, symbol.to_string())
            .on(token, IERC20::decimalsCall {}, U256::from(decimals))
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn call(&self, to: Address, data: Bytes) -> dipzy_onchain::Result<Bytes> {
        self.calls.lock().unwrap().push(to);
        self.responses
            .get(&(to, data.to_vec()))
            .map(|out| Bytes::from(out.clone()))
            .ok_or_else(|| {
                ChainError::Rpc(ApiError::Provider {
                    provider: "JSON_RPC".to_string(),
                    message: "execution reverted".to_string(),
                })
            })
    }
}

fn context(chain: MockChain) -> (ExecutionContext, Arc<MockChain>) {
    let chain = Arc::new(chain);
    (ExecutionContext::new(chain.clone()), chain)
}

#[tokio::test]
async fn curve_pool_maps_eth_placeholder() {
    let pool = addr(POOL);
    let chain = MockChain::default()
        .on(pool, ICurvePool::coinsCall { i: U256::from(0) }, ETH_PLACEHOLDER)
        .on(pool, ICurvePool::coinsCall { i: U256::from(1) }, addr(STETH))
        .on(pool, ICurvePool::balancesCall { i: U256::from(0) }, eth(57_345))
        .on(pool, ICurvePool::balancesCall { i: U256::from(1) }, eth(1_234_567))
        .token(addr(STETH), "stETH", 18);
    let (ctx, _) = context(chain);

    let lp = LiquidityPool::load(&ctx, POOL, PoolKind::curve(2)).await.unwrap();

    assert_eq!(lp.checksum_address(), "0xDC24316b9AE028F1497c275EB9192a3Ea0f67022");
    assert_eq!(lp.token_addresses(), &[ETH_PLACEHOLDER, addr(STETH)]);
    let eth_reserve = lp.reserve("ETH").unwrap();
    assert_eq!(eth_reserve.decimals, 18);
    assert_eq!(lp.to_string(), "57,345 ETH\n1,234,567 stETH");
}

#[tokio::test]
async fn legacy_curve_pool_uses_int128_indices() {
    let pool = addr(POOL);
    let chain = MockChain::default()
        .on(pool, ICurvePoolLegacy::coinsCall { i: 0 }, addr(USDC))
        .on(pool, ICurvePoolLegacy::balancesCall { i: 0 }, U256::from(2_500_000_000_000u64))
        .token(addr(USDC), "USDC", 6);
    let (ctx, _) = context(chain);

    let lp = LiquidityPool::load(&ctx, POOL, PoolKind::curve_legacy(1))
        .await
        .unwrap();
    assert_eq!(lp.summary(), vec!["2,500,000 USDC".to_string()]);
}

#[tokio::test]
async fn repeated_symbol_overwrites_in_place() {
    let pool = addr(POOL);
    let other_usdc = addr("0x0000000000000000000000000000000000000001");
    let chain = MockChain::default()
        .on(pool, ICurvePool::coinsCall { i: U256::from(0) }, addr(USDC))
        .on(pool, ICurvePool::coinsCall { i: U256::from(1) }, addr(WETH))
        .on(pool, ICurvePool::coinsCall { i: U256::from(2) }, other_usdc)
        .on(pool, ICurvePool::balancesCall { i: U256::from(0) }, U256::from(1_000_000u64))
        .on(pool, ICurvePool::balancesCall { i: U256::from(1) }, eth(3))
        .on(pool, ICurvePool::balancesCall { i: U256::from(2) }, U256::from(9_000_000u64))
        .token(addr(USDC), "USDC", 6)
        .token(addr(WETH), "WETH", 18)
        .token(other_usdc, "USDC", 6);
    let (ctx, _) = context(chain);

    let lp = LiquidityPool::load(&ctx, POOL, PoolKind::curve(3)).await.unwrap();

    assert_eq!(lp.reserves().len(), 2);
    assert_eq!(lp.summary(), vec!["9 USDC".to_string(), "3 WETH".to_string()]);
}

#[tokio::test]
async fn uniswap_v3_reads_token_balances() {
    let pool = addr(POOL);
    let chain = MockChain::default()
        .on(pool, IUniswapV3Pool::token0Call {}, addr(USDC))
        .on(pool, IUniswapV3Pool::token1Call {}, addr(WETH))
        .token(addr(USDC), "USDC", 6)
        .token(addr(WETH), "WETH", 18)
        .on(addr(USDC), IERC20::balanceOfCall { owner: pool }, U256::from(150_000_499_999u64))
        .on(addr(WETH), IERC20::balanceOfCall { owner: pool }, eth(42));
    let (ctx, chain) = context(chain);

    let lp = LiquidityPool::load(&ctx, POOL, PoolKind::UniswapV3).await.unwrap();

    assert_eq!(lp.to_string(), "150,000 USDC\n42 WETH");
    // token0, token1, then symbol/decimals/balanceOf per token
    assert_eq!(chain.call_count(), 8);
}

#[tokio::test]
async fn bytes32_symbol_falls_back() {
    let pool = addr(POOL);
    let mkr = addr("0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2");
    let mut raw = [0u8; 32];
    raw[..3].copy_from_slice(b"MKR");
    let chain = MockChain::default()
        .on(pool, IUniswapV3Pool::token0Call {}, mkr)
        .on(pool, IUniswapV3Pool::token1Call {}, addr(WETH))
        .on(mkr, IERC20::symbolCall {}, FixedBytes::<32>::from(raw))
        .on(mkr, IERC20::decimalsCall {}, U256::from(18u8))
        .on(mkr, IERC20::balanceOfCall { owner: pool }, eth(10))
        .token(addr(WETH), "WETH", 18)
        .on(addr(WETH), IERC20::balanceOfCall { owner: pool }, eth(1));
    let (ctx, _) = context(chain);

    let lp = LiquidityPool::load(&ctx, POOL, PoolKind::UniswapV3).await.unwrap();
    assert_eq!(lp.reserves()[0].symbol, "MKR");
}

#[tokio::test]
async fn invalid_address_is_rejected() {
    let (ctx, chain) = context(MockChain::default());
    let err = LiquidityPool::load(&ctx, "0x1234", PoolKind::UniswapV3)
        .await
        .unwrap_err();
    assert!(matches!(err, ChainError::InvalidAddress(_)));
    assert_eq!(chain.call_count(), 0);
}

#[tokio::test]
async fn empty_curve_pool_is_rejected() {
    let (ctx, _) = context(MockChain::default());
    let err = LiquidityPool::load(&ctx, POOL, PoolKind::curve(0))
        .await
        .unwrap_err();
    assert!(matches!(err, ChainError::InvalidPool(_)));
}

#[tokio::test]
async fn reverted_call_aborts_load() {
    let (ctx, _) = context(MockChain::default());
    let err = LiquidityPool::load(&ctx, POOL, PoolKind::curve(2))
        .await
        .unwrap_err();
    assert!(matches!(err, ChainError::Rpc(ApiError::Provider { .. })));
}
