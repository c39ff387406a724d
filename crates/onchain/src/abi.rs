//! Contract interfaces used by the pool reader.

use alloy_sol_types::sol;

sol! {
    #![sol(extra_derives(Debug))]

    /// Curve pools with `uint256` coin indices.
    interface ICurvePool {
        function coins(uint256 i) external view returns (address);
        function balances(uint256 i) external view returns (uint256);
    }

    /// Older Curve pools (e.g. 3pool) index coins with `int128`.
    interface ICurvePoolLegacy {
        function coins(int128 i) external view returns (address);
        function balances(int128 i) external view returns (uint256);
    }

    interface IUniswapV3Pool {
        function token0() external view returns (address);
        function token1() external view returns (address);
    }

    interface IERC20 {
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
    }

    /// Pre-standard tokens such as MKR return `bytes32` symbols.
    interface IERC20Bytes32 {
        function symbol() external view returns (bytes32);
    }
}
