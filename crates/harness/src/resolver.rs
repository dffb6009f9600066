//! Snapshot composition and accounting checks shared by every strategy.
//!
//! [`StrategyResolver`] is the extension point: a strategy implements
//! [`StrategyResolver::context`] and [`StrategyResolver::get_strategy_destinations`]
//! and overrides whichever snapshot or check methods it needs. The default
//! behaviour lives in [`base`] so overrides can still run it.

use alloy::rpc::types::TransactionReceipt;
use alloy_primitives::{Address, TxHash, U256};
use crv_optimizer_contracts::strategy::IConvexCrvOptimizer;
use crv_optimizer_contracts::vault::ITheVault;

use crate::error::{Result, VerificationError};
use crate::events::VaultEvents;
use crate::snapshot::{Entities, Snapshot, SnapshotCall};

/// Entity key of the account driving deposits and withdrawals.
pub const USER: &str = "user";
/// Token key of vault shares, and entity key of the vault itself.
pub const SETT: &str = "sett";
/// Token key of the deposit token.
pub const WANT: &str = "want";
/// Entity key of the strategy contract.
pub const STRATEGY: &str = "strategy";
pub const TREASURY: &str = "treasury";
pub const STRATEGIST: &str = "strategist";

/// Contracts a resolver reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverContext {
    pub vault: Address,
    pub strategy: Address,
    pub want: Address,
}

/// A submitted harvest and the vault events it emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestTx {
    pub tx_hash: TxHash,
    pub events: VaultEvents,
}

impl HarvestTx {
    pub fn from_receipt(receipt: &TransactionReceipt) -> Result<Self> {
        Ok(Self {
            tx_hash: receipt.transaction_hash,
            events: VaultEvents::decode(receipt.inner.logs())?,
        })
    }
}

/// Outcome of one accounting check.
pub type Check = std::result::Result<(), VerificationError>;

pub trait StrategyResolver {
    fn context(&self) -> &ResolverContext;

    /// Token and recipient addresses the strategy sends value to.
    fn get_strategy_destinations(&self) -> Entities;

    fn add_entity_balances_for_tokens(
        &self,
        calls: Vec<SnapshotCall>,
        token_key: &str,
        token: Address,
        entities: &Entities,
    ) -> Vec<SnapshotCall> {
        base::add_entity_balances_for_tokens(calls, token_key, token, entities)
    }

    fn add_balances_snap(&self, calls: Vec<SnapshotCall>, entities: &Entities) -> Vec<SnapshotCall> {
        base::add_balances_snap(self.context(), calls, entities)
    }

    fn add_sett_snap(&self, calls: Vec<SnapshotCall>) -> Vec<SnapshotCall> {
        base::add_sett_snap(self.context(), calls)
    }

    fn add_strategy_snap(&self, calls: Vec<SnapshotCall>) -> Vec<SnapshotCall> {
        base::add_strategy_snap(self.context(), calls)
    }

    fn confirm_harvest_state(&self, before: &Snapshot, after: &Snapshot, _tx: &HarvestTx) -> Check {
        base::confirm_harvest_state(before, after)
    }

    fn confirm_harvest(&self, before: &Snapshot, after: &Snapshot, _tx: &HarvestTx) -> Check {
        base::confirm_harvest(before, after)
    }

    fn confirm_deposit(&self, before: &Snapshot, after: &Snapshot, amount: U256) -> Check {
        base::confirm_deposit(before, after, amount)
    }

    fn confirm_earn(&self, before: &Snapshot, after: &Snapshot) -> Check {
        base::confirm_earn(before, after)
    }

    fn confirm_withdraw(&self, before: &Snapshot, after: &Snapshot, shares: U256) -> Check {
        base::confirm_withdraw(before, after, shares)
    }
}

/// Default snapshot composition and checks.
pub mod base {
    use super::*;

    pub fn add_entity_balances_for_tokens(
        mut calls: Vec<SnapshotCall>,
        token_key: &str,
        token: Address,
        entities: &Entities,
    ) -> Vec<SnapshotCall> {
        calls.extend(
            entities
                .iter()
                .map(|(entity_key, entity)| SnapshotCall::balance_of(token_key, token, entity_key, entity)),
        );
        calls
    }

    /// Deposit token and vault share balances of every entity.
    pub fn add_balances_snap(
        context: &ResolverContext,
        calls: Vec<SnapshotCall>,
        entities: &Entities,
    ) -> Vec<SnapshotCall> {
        let calls = add_entity_balances_for_tokens(calls, WANT, context.want, entities);
        add_entity_balances_for_tokens(calls, SETT, context.vault, entities)
    }

    pub fn add_sett_snap(context: &ResolverContext, mut calls: Vec<SnapshotCall>) -> Vec<SnapshotCall> {
        let vault = context.vault;
        calls.extend([
            SnapshotCall::new("sett.balance", vault, &ITheVault::balanceCall {}),
            SnapshotCall::new("sett.available", vault, &ITheVault::availableCall {}),
            SnapshotCall::new(
                "sett.getPricePerFullShare",
                vault,
                &ITheVault::getPricePerFullShareCall {},
            ),
            SnapshotCall::new("sett.totalSupply", vault, &ITheVault::totalSupplyCall {}),
            SnapshotCall::new(
                "sett.performanceFeeGovernance",
                vault,
                &ITheVault::performanceFeeGovernanceCall {},
            ),
            SnapshotCall::new(
                "sett.performanceFeeStrategist",
                vault,
                &ITheVault::performanceFeeStrategistCall {},
            ),
            SnapshotCall::new("sett.withdrawalFee", vault, &ITheVault::withdrawalFeeCall {}),
            SnapshotCall::new("sett.managementFee", vault, &ITheVault::managementFeeCall {}),
        ]);
        calls
    }

    pub fn add_strategy_snap(
        context: &ResolverContext,
        mut calls: Vec<SnapshotCall>,
    ) -> Vec<SnapshotCall> {
        let strategy = context.strategy;
        calls.extend([
            SnapshotCall::new("strategy.balanceOf", strategy, &IConvexCrvOptimizer::balanceOfCall {}),
            SnapshotCall::new(
                "strategy.balanceOfPool",
                strategy,
                &IConvexCrvOptimizer::balanceOfPoolCall {},
            ),
            SnapshotCall::new(
                "strategy.balanceOfWant",
                strategy,
                &IConvexCrvOptimizer::balanceOfWantCall {},
            ),
        ]);
        calls
    }

    /// `after >= before` for a single key.
    pub fn non_decreasing(before: &Snapshot, after: &Snapshot, key: &str) -> Check {
        let (b, a) = (before.get(key)?, after.get(key)?);
        if a < b {
            return Err(VerificationError::Decreased {
                key: key.to_string(),
                before: b,
                after: a,
            });
        }
        Ok(())
    }

    /// `after > before` for a single key.
    pub fn increased(before: &Snapshot, after: &Snapshot, key: &str) -> Check {
        let (b, a) = (before.get(key)?, after.get(key)?);
        if a <= b {
            return Err(VerificationError::NotIncreased {
                key: key.to_string(),
                before: b,
                after: a,
            });
        }
        Ok(())
    }

    /// `key` moved by exactly `expected`, upwards when `up` is set.
    fn changed_by(before: &Snapshot, after: &Snapshot, key: &str, expected: U256, up: bool) -> Check {
        let (b, a) = (before.get(key)?, after.get(key)?);
        let actual = if up { a.checked_sub(b) } else { b.checked_sub(a) };
        match actual {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(VerificationError::UnexpectedChange {
                key: key.to_string(),
                expected,
                actual,
            }),
            None if up => Err(VerificationError::Decreased {
                key: key.to_string(),
                before: b,
                after: a,
            }),
            None => Err(VerificationError::NotDecreased {
                key: key.to_string(),
                before: b,
                after: a,
            }),
        }
    }

    /// The harvest did not shrink the strategy position or the vault.
    pub fn confirm_harvest_state(before: &Snapshot, after: &Snapshot) -> Check {
        non_decreasing(before, after, "strategy.balanceOf")?;
        non_decreasing(before, after, "sett.balance")
    }

    pub fn confirm_harvest(before: &Snapshot, after: &Snapshot) -> Check {
        let key = "sett.getPricePerFullShare";
        let (b, a) = (before.get(key)?, after.get(key)?);
        if a < b {
            return Err(VerificationError::PricePerShareDecreased { before: b, after: a });
        }
        Ok(())
    }

    /// User paid exactly `amount`, the vault holds exactly `amount` more and
    /// the user was minted shares.
    pub fn confirm_deposit(before: &Snapshot, after: &Snapshot, amount: U256) -> Check {
        changed_by(before, after, &crate::snapshot::balance_key(WANT, USER), amount, false)?;
        changed_by(before, after, "sett.balance", amount, true)?;
        increased(before, after, &crate::snapshot::balance_key(SETT, USER))
    }

    /// Idle vault funds moved into the strategy.
    pub fn confirm_earn(before: &Snapshot, after: &Snapshot) -> Check {
        if before.get("sett.available")?.is_zero() {
            return Ok(());
        }
        increased(before, after, "strategy.balanceOf")?;
        let (b, a) = (
            before.balances(WANT, SETT)?,
            after.balances(WANT, SETT)?,
        );
        if a >= b && !a.is_zero() {
            return Err(VerificationError::NotDecreased {
                key: crate::snapshot::balance_key(WANT, SETT),
                before: b,
                after: a,
            });
        }
        Ok(())
    }

    /// User burned exactly `shares`, received want, and the treasury was paid
    /// the withdrawal fee when one is set.
    pub fn confirm_withdraw(before: &Snapshot, after: &Snapshot, shares: U256) -> Check {
        changed_by(before, after, &crate::snapshot::balance_key(SETT, USER), shares, false)?;
        increased(before, after, &crate::snapshot::balance_key(WANT, USER))?;
        if !before.get("sett.withdrawalFee")?.is_zero() {
            increased(before, after, &crate::snapshot::balance_key(SETT, TREASURY))?;
        }
        Ok(())
    }
}
