//! `TheVault` interface definitions.
//!
//! Only the entry points and views the harness drives are declared. Both
//! events are emitted by the vault when the strategy reports a harvest.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface ITheVault {
        event Harvested(address indexed token, uint256 amount, uint256 indexed blockNumber, uint256 timestamp);
        event TreeDistribution(address indexed token, uint256 amount, uint256 indexed blockNumber, uint256 timestamp);

        function initialize(
            address _token,
            address _governance,
            address _keeper,
            address _guardian,
            address _treasury,
            address _strategist,
            address _badgerTree,
            string memory _name,
            string memory _symbol,
            uint256[4] memory _feeConfig
        ) external;

        function setStrategist(address _strategist) external;
        function setStrategy(address _strategy) external;

        function deposit(uint256 _amount) external;
        function depositAll() external;
        function earn() external;
        function withdraw(uint256 _shares) external;
        function withdrawAll() external;

        function token() external view returns (address);
        function strategy() external view returns (address);
        function governance() external view returns (address);
        function keeper() external view returns (address);
        function guardian() external view returns (address);
        function treasury() external view returns (address);
        function strategist() external view returns (address);
        function badgerTree() external view returns (address);

        function balance() external view returns (uint256);
        function available() external view returns (uint256);
        function getPricePerFullShare() external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function lastHarvestedAt() external view returns (uint256);

        function performanceFeeGovernance() external view returns (uint256);
        function performanceFeeStrategist() external view returns (uint256);
        function withdrawalFee() external view returns (uint256);
        function managementFee() external view returns (uint256);
    }
}
