//! `ConvexCrvOptimizer` strategy interface definitions.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IConvexCrvOptimizer {
        function initialize(address _vault, address[1] memory _wantConfig, uint256 _pid) external;

        function harvest() external;
        function tend() external;

        function want() external view returns (address);
        function vault() external view returns (address);
        function balanceOf() external view returns (uint256);
        function balanceOfPool() external view returns (uint256);
        function balanceOfWant() external view returns (uint256);
        function baseRewardsPool() external view returns (address);

        // Tokens the strategy swaps through or distributes
        function THREE_CRV() external view returns (address);
        function USDC() external view returns (address);
        function CVX() external view returns (address);
        function CRV() external view returns (address);
        function CVXCRV() external view returns (address);
        function BCVXCRV() external view returns (address);
        function BVECVX() external view returns (address);
    }
}
