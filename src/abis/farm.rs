use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IAutofarm {
        function poolLength() external view returns (uint256);
        function poolInfo(uint256 pid) external view returns (address want, uint256 allocPoint, uint256 lastRewardBlock, uint256 accAUTOPerShare, address strat);
        function pendingAUTO(uint256 pid, address user) external view returns (uint256);
        function stakedWantTokens(uint256 pid, address user) external view returns (uint256);
    }
}
