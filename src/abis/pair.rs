use alloy::sol;

sol! {
    // Reserves are uint112 on-chain; declared as uint256 here since the
    // return words decode identically and downstream math is U256 anyway.
    #[sol(rpc)]
    interface IUniswapV2Pair {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function getReserves() external view returns (uint256 reserve0, uint256 reserve1, uint256 blockTimestampLast);
        function totalSupply() external view returns (uint256);
    }
}
