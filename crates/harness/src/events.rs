//! Vault events decoded from a transaction's logs.

use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use alloy_primitives::{Address, U256};
use crv_optimizer_contracts::vault::ITheVault;

use crate::error::{HarnessError, Result};

/// A `Harvested` or `TreeDistribution` report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEvent {
    pub token: Address,
    pub amount: U256,
    pub block_number: U256,
    pub timestamp: U256,
}

impl From<ITheVault::Harvested> for TokenEvent {
    fn from(event: ITheVault::Harvested) -> Self {
        Self {
            token: event.token,
            amount: event.amount,
            block_number: event.blockNumber,
            timestamp: event.timestamp,
        }
    }
}

impl From<ITheVault::TreeDistribution> for TokenEvent {
    fn from(event: ITheVault::TreeDistribution) -> Self {
        Self {
            token: event.token,
            amount: event.amount,
            block_number: event.blockNumber,
            timestamp: event.timestamp,
        }
    }
}

/// Harvest reports found in one transaction's logs, in log order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultEvents {
    pub harvested: Vec<TokenEvent>,
    pub tree_distributions: Vec<TokenEvent>,
}

impl VaultEvents {
    /// Collect every `Harvested` and `TreeDistribution` log, whichever
    /// contract emitted it.
    pub fn decode(logs: &[Log]) -> Result<Self> {
        let mut events = Self::default();

        for log in logs {
            match log.topic0() {
                Some(topic) if *topic == ITheVault::Harvested::SIGNATURE_HASH => {
                    events.harvested.push(decode::<ITheVault::Harvested>(log)?.into());
                }
                Some(topic) if *topic == ITheVault::TreeDistribution::SIGNATURE_HASH => {
                    events
                        .tree_distributions
                        .push(decode::<ITheVault::TreeDistribution>(log)?.into());
                }
                _ => {}
            }
        }

        Ok(events)
    }
}

fn decode<E: SolEvent>(log: &Log) -> Result<E> {
    log.log_decode::<E>()
        .map(|decoded| decoded.inner.data)
        .map_err(|e| HarnessError::EventDecode {
            event: E::SIGNATURE,
            reason: e.to_string(),
        })
}
