//! Convex reward contracts touched while preparing the fork.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IBaseRewardsPool {
        function periodFinish() external view returns (uint256);
    }
}

sol! {
    #[sol(rpc)]
    interface IBooster {
        function earmarkRewards(uint256 _pid) external returns (bool);
    }
}
