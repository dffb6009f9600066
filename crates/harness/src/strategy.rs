//! Resolver for the ConvexCrvOptimizer strategy.
//!
//! On harvest the strategy claims CRV/CVX/cvxCRV/3CRV rewards, compounds part
//! into the vault as more want, and sends the rest to the badger tree as
//! bveCVX. Besides the want and vault share balances tracked by every
//! resolver, this one tracks each of those intermediate tokens.

use alloy_primitives::{Address, U256};
use crv_optimizer_contracts::strategy::IConvexCrvOptimizer;
use crv_optimizer_contracts::vault::ITheVault;
use crv_optimizer_contracts::HarnessProvider;

use crate::compare::format_compare;
use crate::error::{HarnessError, Result, VerificationError};
use crate::fixture::Deployed;
use crate::resolver::{
    base, Check, HarvestTx, ResolverContext, StrategyResolver, SETT, STRATEGIST, STRATEGY,
    TREASURY,
};
use crate::snapshot::{Entities, Snapshot, SnapshotCall};

/// Token key of the rewards wrapper distributed to the badger tree.
pub const BVECVX: &str = "bveCvx";

/// Tokens the strategy must never hold after a harvest.
pub const RESIDUAL_TOKENS: [&str; 4] = ["crv", "cvx", "cvxCrv", "threeCrv"];

const GOVERNANCE_FEE: &str = "sett.performanceFeeGovernance";
const STRATEGIST_FEE: &str = "sett.performanceFeeStrategist";

/// Addresses of the tokens the strategy moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyTokens {
    pub three_crv: Address,
    pub usdc: Address,
    pub cvx: Address,
    pub crv: Address,
    pub cvx_crv: Address,
    pub bcvx_crv: Address,
    pub bve_cvx: Address,
}

impl StrategyTokens {
    /// Read the token addresses from the strategy's accessors.
    pub async fn fetch(provider: &HarnessProvider, strategy: Address) -> Result<Self> {
        let contract = IConvexCrvOptimizer::new(strategy, provider);
        let read = |name: &str, e: alloy::contract::Error| {
            HarnessError::Call(format!("Failed to get {}: {}", name, e))
        };

        Ok(Self {
            three_crv: contract.THREE_CRV().call().await.map_err(|e| read("THREE_CRV", e))?,
            usdc: contract.USDC().call().await.map_err(|e| read("USDC", e))?,
            cvx: contract.CVX().call().await.map_err(|e| read("CVX", e))?,
            crv: contract.CRV().call().await.map_err(|e| read("CRV", e))?,
            cvx_crv: contract.CVXCRV().call().await.map_err(|e| read("CVXCRV", e))?,
            bcvx_crv: contract.BCVXCRV().call().await.map_err(|e| read("BCVXCRV", e))?,
            bve_cvx: contract.BVECVX().call().await.map_err(|e| read("BVECVX", e))?,
        })
    }

    /// Snapshot token keys paired with addresses.
    pub fn tracked(&self) -> [(&'static str, Address); 7] {
        [
            ("threeCrv", self.three_crv),
            ("usdc", self.usdc),
            ("cvx", self.cvx),
            ("crv", self.crv),
            ("cvxCrv", self.cvx_crv),
            ("bcvxCrv", self.bcvx_crv),
            (BVECVX, self.bve_cvx),
        ]
    }
}

pub struct ConvexCrvOptimizerResolver {
    context: ResolverContext,
    tokens: StrategyTokens,
    badger_tree: Address,
}

impl ConvexCrvOptimizerResolver {
    pub fn new(context: ResolverContext, tokens: StrategyTokens, badger_tree: Address) -> Self {
        Self {
            context,
            tokens,
            badger_tree,
        }
    }

    /// Build a resolver for a deployed fixture, reading addresses from chain.
    pub async fn connect(provider: &HarnessProvider, deployed: &Deployed) -> Result<Self> {
        let tokens = StrategyTokens::fetch(provider, deployed.strategy).await?;
        let badger_tree = ITheVault::new(deployed.vault, provider)
            .badgerTree()
            .call()
            .await
            .map_err(|e| HarnessError::Call(format!("Failed to get badgerTree: {}", e)))?;
        Ok(Self::new(deployed.context(), tokens, badger_tree))
    }

    pub fn tokens(&self) -> &StrategyTokens {
        &self.tokens
    }
}

/// If `fee_key` was non-zero before, `recipient`'s `token_key` balance grew.
fn fee_collected(
    before: &Snapshot,
    after: &Snapshot,
    fee_key: &str,
    token_key: &str,
    recipient: &str,
) -> Check {
    if before.get(fee_key)?.is_zero() {
        return Ok(());
    }
    let (b, a) = (
        before.balances(token_key, recipient)?,
        after.balances(token_key, recipient)?,
    );
    if a <= b {
        return Err(VerificationError::FeeNotCollected {
            fee: fee_key.to_string(),
            token: token_key.to_string(),
            recipient: recipient.to_string(),
            before: b,
            after: a,
        });
    }
    Ok(())
}

impl StrategyResolver for ConvexCrvOptimizerResolver {
    fn context(&self) -> &ResolverContext {
        &self.context
    }

    fn get_strategy_destinations(&self) -> Entities {
        let mut destinations = Entities::new();
        for (key, token) in self.tokens.tracked() {
            destinations.insert(key, token);
        }
        destinations.with("badgerTree", self.badger_tree)
    }

    fn add_balances_snap(&self, calls: Vec<SnapshotCall>, entities: &Entities) -> Vec<SnapshotCall> {
        let calls = base::add_balances_snap(&self.context, calls, entities);
        self.tokens
            .tracked()
            .into_iter()
            .fold(calls, |calls, (key, token)| {
                self.add_entity_balances_for_tokens(calls, key, token, entities)
            })
    }

    fn confirm_harvest(&self, before: &Snapshot, after: &Snapshot, tx: &HarvestTx) -> Check {
        tracing::info!("=== Compare Harvest ===\n{}", format_compare(before, after));

        self.confirm_harvest_state(before, after, tx)?;
        base::confirm_harvest(before, after)?;

        // Compounded want
        let [harvested] = tx.events.harvested.as_slice() else {
            return Err(VerificationError::EventCount {
                event: "Harvested",
                count: tx.events.harvested.len(),
            });
        };
        if harvested.token != self.context.want {
            return Err(VerificationError::EventToken {
                event: "Harvested",
                expected: self.context.want,
                actual: harvested.token,
            });
        }
        let (balance_before, balance_after) =
            (before.get("sett.balance")?, after.get("sett.balance")?);
        let delta = balance_after.checked_sub(balance_before).ok_or(
            VerificationError::Decreased {
                key: "sett.balance".to_string(),
                before: balance_before,
                after: balance_after,
            },
        )?;
        if harvested.amount != delta {
            return Err(VerificationError::HarvestedAmount {
                reported: harvested.amount,
                delta,
            });
        }

        let key = "sett.getPricePerFullShare";
        let (ppfs_before, ppfs_after) = (before.get(key)?, after.get(key)?);
        if ppfs_after <= ppfs_before {
            return Err(VerificationError::PricePerShareNotIncreased {
                before: ppfs_before,
                after: ppfs_after,
            });
        }

        fee_collected(before, after, GOVERNANCE_FEE, SETT, TREASURY)?;
        fee_collected(before, after, STRATEGIST_FEE, SETT, STRATEGIST)?;

        // Emitted bveCVX
        let [distribution] = tx.events.tree_distributions.as_slice() else {
            return Err(VerificationError::EventCount {
                event: "TreeDistribution",
                count: tx.events.tree_distributions.len(),
            });
        };
        if distribution.token != self.tokens.bve_cvx {
            return Err(VerificationError::EventToken {
                event: "TreeDistribution",
                expected: self.tokens.bve_cvx,
                actual: distribution.token,
            });
        }
        if distribution.amount == U256::ZERO {
            return Err(VerificationError::EmptyTreeDistribution);
        }

        fee_collected(before, after, GOVERNANCE_FEE, BVECVX, TREASURY)?;
        fee_collected(before, after, STRATEGIST_FEE, BVECVX, STRATEGIST)?;

        for token in RESIDUAL_TOKENS {
            let amount = after.balances(token, STRATEGY)?;
            if !amount.is_zero() {
                return Err(VerificationError::ResidualBalance {
                    token: token.to_string(),
                    amount,
                });
            }
        }

        Ok(())
    }
}
