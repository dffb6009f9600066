//! Scenario constants and fork environment configuration.

use std::path::PathBuf;

use alloy_primitives::{address, Address};

/// Seconds in one day.
pub const DAY: u64 = 24 * 60 * 60;

/// One deployment scenario: deposit token, funding source and fee model.
///
/// Fees are in basis points (100 = 1%).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    /// Token deposited in the vault.
    pub want: Address,
    /// Account holding a large balance of `want`, impersonated for funding.
    pub whale: Address,
    /// Badger registry, source of default addresses.
    pub registry: Address,
    pub performance_fee_governance: u64,
    pub performance_fee_strategist: u64,
    pub withdrawal_fee: u64,
    pub management_fee: u64,
    /// Convex pool id the strategy stakes into.
    pub strategy_pid: u64,
    /// Convex booster used to restart reward emission.
    pub booster: Address,
    /// Pool id passed to `earmarkRewards`.
    pub earmark_pid: u64,
    /// Rewards ending within this many seconds are restarted before tests.
    pub reward_expiry_window: u64,
}

impl Scenario {
    /// The vault fee configuration in `initialize` order.
    pub fn fee_config(&self) -> [u64; 4] {
        [
            self.performance_fee_governance,
            self.performance_fee_strategist,
            self.withdrawal_fee,
            self.management_fee,
        ]
    }
}

/// cvxCRV deposits into the bcvxCRV/bveCVX optimizer.
pub const SCENARIO: Scenario = Scenario {
    want: address!("62B9c7356A2Dc64a1969e19C23e4f579F9810Aa7"),
    whale: address!("3fe65692bfcd0e6cf84cb1e7d24108e434a7587e"),
    registry: address!("Fda7eB6f8b7a9e9fCFd348042ae675d1d652454f"),
    performance_fee_governance: 2_000,
    performance_fee_strategist: 0,
    withdrawal_fee: 10,
    management_fee: 0,
    strategy_pid: 50,
    booster: address!("F403C135812408BFbE8713b5A23a04b3D48AAE31"),
    earmark_pid: 0,
    reward_expiry_window: 4 * DAY,
};

/// Reads an env var, returning the default if not set or invalid.
fn env_var_or_default<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Environment for spawning a forked anvil and finding compiled contracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkConfig {
    /// RPC URL to fork from.
    pub rpc_url: String,
    /// Pin the fork to this block when set.
    pub fork_block_number: Option<u64>,
    pub compute_units_per_second: u64,
    pub retries: u32,
    /// Backoff in ms between fork retries.
    pub fork_retry_backoff: u64,
    /// Timeout in ms for anvil startup and RPC requests.
    pub timeout: u64,
    /// Directory holding `TheVault.json` and `ConvexCrvOptimizer.json`.
    pub artifacts_dir: PathBuf,
}

impl ForkConfig {
    /// Default compute units per second.
    pub const DEFAULT_COMPUTE_UNITS: u64 = 100;
    /// Default fork retries.
    pub const DEFAULT_RETRIES: u32 = 5;
    /// Default fork retry backoff in ms.
    pub const DEFAULT_BACKOFF: u64 = 1000;
    /// Default timeout in ms.
    pub const DEFAULT_TIMEOUT: u64 = 45000;
    /// Default artifacts directory.
    pub const DEFAULT_ARTIFACTS_DIR: &'static str = "build/contracts";

    /// Config with defaults for everything but the RPC URL.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            fork_block_number: None,
            compute_units_per_second: Self::DEFAULT_COMPUTE_UNITS,
            retries: Self::DEFAULT_RETRIES,
            fork_retry_backoff: Self::DEFAULT_BACKOFF,
            timeout: Self::DEFAULT_TIMEOUT,
            artifacts_dir: PathBuf::from(Self::DEFAULT_ARTIFACTS_DIR),
        }
    }

    /// Read configuration from environment variables:
    /// - `ETH_RPC_URL` (required): The RPC URL to fork from
    /// - `FORK_BLOCK_NUMBER` (optional): Block to pin the fork to
    /// - `ANVIL_COMPUTE_UNITS_PER_SECOND` (default: 100)
    /// - `ANVIL_RETRIES` (default: 5)
    /// - `ANVIL_FORK_RETRY_BACKOFF` (default: 1000)
    /// - `ANVIL_TIMEOUT` (default: 45000)
    /// - `HARNESS_ARTIFACTS_DIR` (default: `build/contracts`)
    ///
    /// Returns `None` if `ETH_RPC_URL` is not set.
    pub fn from_env() -> Option<Self> {
        let rpc_url = std::env::var("ETH_RPC_URL").ok()?;

        Some(Self {
            rpc_url,
            fork_block_number: std::env::var("FORK_BLOCK_NUMBER")
                .ok()
                .and_then(|v| v.parse().ok()),
            compute_units_per_second: env_var_or_default(
                "ANVIL_COMPUTE_UNITS_PER_SECOND",
                Self::DEFAULT_COMPUTE_UNITS,
            ),
            retries: env_var_or_default("ANVIL_RETRIES", Self::DEFAULT_RETRIES),
            fork_retry_backoff: env_var_or_default(
                "ANVIL_FORK_RETRY_BACKOFF",
                Self::DEFAULT_BACKOFF,
            ),
            timeout: env_var_or_default("ANVIL_TIMEOUT", Self::DEFAULT_TIMEOUT),
            artifacts_dir: env_var_or_default(
                "HARNESS_ARTIFACTS_DIR",
                PathBuf::from(Self::DEFAULT_ARTIFACTS_DIR),
            ),
        })
    }
}
