//! Forked chain lifecycle: spawning anvil, chain-state isolation and time
//! control.

use alloy::node_bindings::{Anvil, AnvilInstance};
use alloy::primitives::{Address, U256};
use alloy::providers::{ext::AnvilApi, Provider};
use alloy::rpc::types::BlockNumberOrTag;
use crv_optimizer_contracts::{connect, HarnessProvider};

use crate::accounts::Accounts;
use crate::config::ForkConfig;
use crate::error::{HarnessError, Result};

/// A running anvil fork and a provider connected to it.
///
/// The anvil process is killed when this value is dropped.
pub struct Fork {
    anvil: AnvilInstance,
    provider: HarnessProvider,
}

impl Fork {
    /// Spawn anvil forking `config.rpc_url` with rate limiting protection.
    pub fn spawn(config: &ForkConfig) -> Result<Self> {
        let mut anvil = Anvil::new()
            .fork(&config.rpc_url)
            .arg("--compute-units-per-second")
            .arg(config.compute_units_per_second.to_string())
            .arg("--retries")
            .arg(config.retries.to_string())
            .arg("--fork-retry-backoff")
            .arg(config.fork_retry_backoff.to_string())
            .timeout(config.timeout);

        if let Some(block) = config.fork_block_number {
            anvil = anvil.fork_block_number(block);
        }

        let anvil = anvil
            .try_spawn()
            .map_err(|e| HarnessError::Anvil(e.to_string()))?;
        let provider = connect(&anvil.endpoint())?;

        tracing::info!(endpoint = %anvil.endpoint(), block = ?config.fork_block_number, "fork ready");

        Ok(Self { anvil, provider })
    }

    pub fn provider(&self) -> &HarnessProvider {
        &self.provider
    }

    /// Role accounts backed by anvil's unlocked dev accounts.
    pub fn accounts(&self) -> Result<Accounts> {
        Accounts::from_dev_accounts(self.anvil.addresses())
    }
}

/// Chain-state checkpoint restored between test cases.
///
/// Anvil consumes a snapshot id when reverting to it, so [`Isolation::reset`]
/// takes a fresh checkpoint after every revert.
#[derive(Debug)]
pub struct Isolation {
    snapshot_id: U256,
}

impl Isolation {
    /// Record the current chain state.
    pub async fn checkpoint(provider: &HarnessProvider) -> Result<Self> {
        let snapshot_id = provider.anvil_snapshot().await?;
        tracing::debug!(%snapshot_id, "chain checkpoint");
        Ok(Self { snapshot_id })
    }

    /// Restore the recorded state and checkpoint it again.
    pub async fn reset(&mut self, provider: &HarnessProvider) -> Result<()> {
        if !provider.anvil_revert(self.snapshot_id).await? {
            return Err(HarnessError::RevertFailed(self.snapshot_id));
        }
        self.snapshot_id = provider.anvil_snapshot().await?;
        Ok(())
    }
}

/// Timestamp of the latest block.
pub async fn latest_timestamp(provider: &HarnessProvider) -> Result<u64> {
    let block = provider
        .get_block_by_number(BlockNumberOrTag::Latest)
        .await?
        .ok_or(HarnessError::MissingBlock)?;
    Ok(block.header.timestamp)
}

/// Move chain time forward and mine a block so the new time is visible.
pub async fn advance_time(provider: &HarnessProvider, seconds: u64) -> Result<()> {
    provider.anvil_increase_time(seconds).await?;
    provider.evm_mine(None).await?;
    tracing::debug!(seconds, "advanced chain time");
    Ok(())
}

/// Let the node sign for `account` and give it gas money.
pub async fn impersonate(provider: &HarnessProvider, account: Address) -> Result<()> {
    provider.anvil_impersonate_account(account).await?;
    // 10 ETH
    provider
        .anvil_set_balance(account, U256::from(10_000_000_000_000_000_000u128))
        .await?;
    Ok(())
}

pub async fn stop_impersonating(provider: &HarnessProvider, account: Address) -> Result<()> {
    provider.anvil_stop_impersonating_account(account).await?;
    Ok(())
}
