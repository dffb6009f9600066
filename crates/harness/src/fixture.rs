//! Fixture graph: fund the deployer, deploy and wire the vault and strategy,
//! and make sure the fork has rewards to harvest.

use std::path::{Path, PathBuf};

use alloy::rpc::types::TransactionReceipt;
use alloy_primitives::{Address, U256};
use crv_optimizer_contracts::convex::{IBaseRewardsPool, IBooster};
use crv_optimizer_contracts::erc20::IERC20;
use crv_optimizer_contracts::strategy::IConvexCrvOptimizer;
use crv_optimizer_contracts::vault::ITheVault;
use crv_optimizer_contracts::{deploy, ContractArtifact, HarnessProvider, PreparedCall};

use crate::accounts::Accounts;
use crate::config::{Scenario, SCENARIO};
use crate::error::{HarnessError, Result};
use crate::fork::{impersonate, latest_timestamp, stop_impersonating};
use crate::resolver::{HarvestTx, ResolverContext, SETT, STRATEGIST, STRATEGY, TREASURY, USER};
use crate::snapshot::Entities;

/// Artifact name of the vault.
pub const VAULT_ARTIFACT: &str = "TheVault";
/// Artifact name of the strategy.
pub const STRATEGY_ARTIFACT: &str = "ConvexCrvOptimizer";

fn call_error(what: &'static str) -> impl FnOnce(alloy::contract::Error) -> HarnessError {
    move |e| HarnessError::Call(format!("Failed to get {}: {}", what, e))
}

/// A wired vault and strategy plus the accounts and fees they were built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployed {
    pub vault: Address,
    pub strategy: Address,
    pub want: Address,
    pub accounts: Accounts,
    pub performance_fee_governance: u64,
    pub performance_fee_strategist: u64,
    pub withdrawal_fee: u64,
    pub management_fee: u64,
}

impl Deployed {
    pub fn context(&self) -> ResolverContext {
        ResolverContext {
            vault: self.vault,
            strategy: self.strategy,
            want: self.want,
        }
    }

    /// Tokens the vault accepts.
    pub fn tokens(&self) -> Vec<Address> {
        vec![self.want]
    }
}

/// Result of the initial deposit and earn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareMath {
    pub deposit_amount: U256,
}

/// Builds and drives the vault/strategy fixture on a fork.
pub struct Fixture<'a> {
    provider: &'a HarnessProvider,
    scenario: Scenario,
    artifacts_dir: PathBuf,
}

impl<'a> Fixture<'a> {
    pub fn new(provider: &'a HarnessProvider, artifacts_dir: &Path) -> Self {
        Self {
            provider,
            scenario: SCENARIO,
            artifacts_dir: artifacts_dir.to_path_buf(),
        }
    }

    /// Use a different scenario than [`SCENARIO`].
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = scenario;
        self
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        IERC20::new(token, self.provider)
            .balanceOf(owner)
            .call()
            .await
            .map_err(call_error("balance"))
    }

    /// Move a quarter of the whale's want to `recipient`. Returns the amount.
    pub async fn fund_from_whale(&self, recipient: Address) -> Result<U256> {
        let Scenario { want, whale, .. } = self.scenario;

        let whale_balance = self.balance_of(want, whale).await?;
        if whale_balance.is_zero() {
            return Err(HarnessError::EmptyWhale {
                whale,
                token: want,
            });
        }
        let amount = whale_balance / U256::from(4);

        impersonate(self.provider, whale).await?;
        let sent = PreparedCall::new(want, IERC20::transferCall { to: recipient, amount }, self.provider)
            .from(whale)
            .send()
            .await;
        let stopped = stop_impersonating(self.provider, whale).await;
        after_impersonation(sent.map_err(HarnessError::from), stopped)?;

        tracing::info!(%whale, %recipient, %amount, "funded from whale");
        Ok(amount)
    }

    /// Deploy both contracts, initialize them and point the vault at the
    /// strategy. Returns `(vault, strategy)`.
    pub async fn deploy_and_wire(&self, accounts: &Accounts) -> Result<(Address, Address)> {
        let vault_artifact = ContractArtifact::load(&self.artifacts_dir, VAULT_ARTIFACT)?;
        let strategy_artifact = ContractArtifact::load(&self.artifacts_dir, STRATEGY_ARTIFACT)?;

        let vault = deploy(self.provider, &vault_artifact, accounts.deployer).await?;
        let initialize = ITheVault::initializeCall {
            _token: self.scenario.want,
            _governance: accounts.governance,
            _keeper: accounts.keeper,
            _guardian: accounts.guardian,
            _treasury: accounts.governance,
            _strategist: accounts.strategist,
            _badgerTree: accounts.badger_tree,
            _name: String::new(),
            _symbol: String::new(),
            _feeConfig: self.scenario.fee_config().map(U256::from),
        };
        PreparedCall::new(vault, initialize, self.provider)
            .from(accounts.deployer)
            .send()
            .await?;
        PreparedCall::new(
            vault,
            ITheVault::setStrategistCall {
                _strategist: accounts.deployer,
            },
            self.provider,
        )
        .from(accounts.governance)
        .send()
        .await?;

        let strategy = deploy(self.provider, &strategy_artifact, accounts.deployer).await?;
        let initialize = IConvexCrvOptimizer::initializeCall {
            _vault: vault,
            _wantConfig: [self.scenario.want],
            _pid: U256::from(self.scenario.strategy_pid),
        };
        PreparedCall::new(strategy, initialize, self.provider)
            .from(accounts.deployer)
            .send()
            .await?;

        PreparedCall::new(vault, ITheVault::setStrategyCall { _strategy: strategy }, self.provider)
            .from(accounts.governance)
            .send()
            .await?;

        tracing::info!(%vault, %strategy, "vault and strategy wired");
        Ok((vault, strategy))
    }

    /// Restart Convex reward emission if the strategy's reward pool ends
    /// within the expiry window. Returns whether rewards were restarted.
    pub async fn ensure_reward_liquidity(&self, strategy: Address, caller: Address) -> Result<bool> {
        let pool = IConvexCrvOptimizer::new(strategy, self.provider)
            .baseRewardsPool()
            .call()
            .await
            .map_err(call_error("baseRewardsPool"))?;
        let period_finish = IBaseRewardsPool::new(pool, self.provider)
            .periodFinish()
            .call()
            .await
            .map_err(call_error("periodFinish"))?;
        let now = latest_timestamp(self.provider).await?;

        if !rewards_expiring(period_finish, now, self.scenario.reward_expiry_window) {
            return Ok(false);
        }

        PreparedCall::new(
            self.scenario.booster,
            IBooster::earmarkRewardsCall {
                _pid: U256::from(self.scenario.earmark_pid),
            },
            self.provider,
        )
        .from(caller)
        .send()
        .await?;

        tracing::info!(%pool, %period_finish, now, "BaseRewardsPool expired or expiring soon, rewards reset");
        Ok(true)
    }

    /// Fund, deploy and wire, then repair reward emission.
    pub async fn deploy(&self, accounts: Accounts) -> Result<Deployed> {
        self.fund_from_whale(accounts.deployer).await?;
        let (vault, strategy) = self.deploy_and_wire(&accounts).await?;
        self.ensure_reward_liquidity(strategy, accounts.deployer).await?;

        Ok(Deployed {
            vault,
            strategy,
            want: self.scenario.want,
            accounts,
            performance_fee_governance: self.scenario.performance_fee_governance,
            performance_fee_strategist: self.scenario.performance_fee_strategist,
            withdrawal_fee: self.scenario.withdrawal_fee,
            management_fee: self.scenario.management_fee,
        })
    }

    /// Snapshot entities, with fee recipients read from the vault.
    pub async fn entities(&self, deployed: &Deployed) -> Result<Entities> {
        let vault = ITheVault::new(deployed.vault, self.provider);
        let treasury = vault.treasury().call().await.map_err(call_error("treasury"))?;
        let strategist = vault
            .strategist()
            .call()
            .await
            .map_err(call_error("strategist"))?;
        let badger_tree = vault
            .badgerTree()
            .call()
            .await
            .map_err(call_error("badgerTree"))?;

        Ok(Entities::new()
            .with(USER, deployed.accounts.deployer)
            .with(SETT, deployed.vault)
            .with(STRATEGY, deployed.strategy)
            .with("governance", deployed.accounts.governance)
            .with(TREASURY, treasury)
            .with(STRATEGIST, strategist)
            .with("badgerTree", badger_tree))
    }

    /// Approve the vault, deposit half the deployer's want and earn.
    pub async fn setup_share_math(&self, deployed: &Deployed) -> Result<ShareMath> {
        let deployer = deployed.accounts.deployer;
        let deposit_amount = self.balance_of(deployed.want, deployer).await? / U256::from(2);
        if deposit_amount.is_zero() {
            return Err(HarnessError::NothingToDeposit(deployed.want));
        }

        self.approve_vault(deployed, deployer).await?;
        self.deposit(deployed, deployer, deposit_amount).await?;
        self.earn(deployed).await?;

        Ok(ShareMath { deposit_amount })
    }

    /// Let the vault pull any amount of want from `owner`.
    pub async fn approve_vault(&self, deployed: &Deployed, owner: Address) -> Result<TransactionReceipt> {
        Ok(PreparedCall::new(
            deployed.want,
            IERC20::approveCall {
                spender: deployed.vault,
                amount: U256::MAX,
            },
            self.provider,
        )
        .from(owner)
        .send()
        .await?)
    }

    pub async fn deposit(
        &self,
        deployed: &Deployed,
        from: Address,
        amount: U256,
    ) -> Result<TransactionReceipt> {
        Ok(
            PreparedCall::new(deployed.vault, ITheVault::depositCall { _amount: amount }, self.provider)
                .from(from)
                .send()
                .await?,
        )
    }

    /// Push idle vault funds into the strategy, as governance.
    pub async fn earn(&self, deployed: &Deployed) -> Result<TransactionReceipt> {
        Ok(PreparedCall::new(deployed.vault, ITheVault::earnCall {}, self.provider)
            .from(deployed.accounts.governance)
            .send()
            .await?)
    }

    pub async fn withdraw(
        &self,
        deployed: &Deployed,
        from: Address,
        shares: U256,
    ) -> Result<TransactionReceipt> {
        Ok(
            PreparedCall::new(deployed.vault, ITheVault::withdrawCall { _shares: shares }, self.provider)
                .from(from)
                .send()
                .await?,
        )
    }

    /// Harvest as the keeper and decode the reports in its logs.
    pub async fn harvest(&self, deployed: &Deployed) -> Result<HarvestTx> {
        let receipt = PreparedCall::new(deployed.strategy, IConvexCrvOptimizer::harvestCall {}, self.provider)
            .from(deployed.accounts.keeper)
            .send()
            .await?;
        HarvestTx::from_receipt(&receipt)
    }
}

/// The transaction's error wins over a failure to stop impersonating.
fn after_impersonation<T>(sent: Result<T>, stopped: Result<()>) -> Result<T> {
    let sent = sent?;
    stopped?;
    Ok(sent)
}

/// Whether a reward period ending at `period_finish` ends within `window`
/// seconds of `now`, including periods that already ended.
pub fn rewards_expiring(period_finish: U256, now: u64, window: u64) -> bool {
    period_finish.saturating_sub(U256::from(now)) < U256::from(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DAY;
    use crv_optimizer_contracts::connect;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn test_failed_transfer_error_survives_impersonation_cleanup() {
        let sent: Result<()> = Err(HarnessError::Call("transfer reverted".into()));
        let stopped = Err(HarnessError::Anvil("stop failed".into()));

        let result = after_impersonation(sent, stopped);

        assert!(matches!(result, Err(HarnessError::Call(msg)) if msg == "transfer reverted"));
    }

    #[test]
    fn test_cleanup_failure_surfaces_after_successful_transfer() {
        let result = after_impersonation(Ok(7u8), Err(HarnessError::Anvil("stop failed".into())));

        assert!(matches!(result, Err(HarnessError::Anvil(_))));
        assert_eq!(after_impersonation(Ok(7u8), Ok(())).unwrap(), 7);
    }

    #[test]
    fn test_rewards_expiring_window() {
        let window = 4 * DAY;

        assert!(rewards_expiring(U256::from(NOW + DAY), NOW, window));
        assert!(!rewards_expiring(U256::from(NOW + 5 * DAY), NOW, window));
        // Exactly at the window edge is not expiring
        assert!(!rewards_expiring(U256::from(NOW + window), NOW, window));
    }

    #[test]
    fn test_expired_rewards_count_as_expiring() {
        assert!(rewards_expiring(U256::from(NOW - DAY), NOW, 4 * DAY));
        assert!(rewards_expiring(U256::ZERO, NOW, 4 * DAY));
    }

    #[test]
    fn test_deployed_context_and_tokens() {
        let accounts = Accounts::from_dev_accounts(
            &(1..=10).map(Address::repeat_byte).collect::<Vec<_>>(),
        )
        .unwrap();
        let deployed = Deployed {
            vault: Address::repeat_byte(0xaa),
            strategy: Address::repeat_byte(0xbb),
            want: SCENARIO.want,
            accounts,
            performance_fee_governance: 2_000,
            performance_fee_strategist: 0,
            withdrawal_fee: 10,
            management_fee: 0,
        };

        let context = deployed.context();
        assert_eq!(context.vault, Address::repeat_byte(0xaa));
        assert_eq!(context.strategy, Address::repeat_byte(0xbb));
        assert_eq!(deployed.tokens(), vec![SCENARIO.want]);
    }

    #[tokio::test]
    async fn test_deploy_and_wire_fails_without_artifacts() {
        let provider = connect("http://localhost:1").unwrap();
        let dir = std::env::temp_dir().join("crv-optimizer-harness-no-artifacts");
        let fixture = Fixture::new(&provider, &dir);
        let accounts = Accounts::from_dev_accounts(
            &(1..=10).map(Address::repeat_byte).collect::<Vec<_>>(),
        )
        .unwrap();

        let result = fixture.deploy_and_wire(&accounts).await;

        assert!(matches!(
            result,
            Err(HarnessError::Contract(crv_optimizer_contracts::ContractError::ArtifactIo { .. }))
        ));
    }

    #[test]
    fn test_fixture_uses_default_scenario() {
        let provider = connect("http://localhost:1").unwrap();
        let fixture = Fixture::new(&provider, Path::new("build/contracts"));
        assert_eq!(fixture.scenario(), &SCENARIO);

        let custom = Scenario {
            withdrawal_fee: 0,
            ..SCENARIO
        };
        let fixture = fixture.with_scenario(custom);
        assert_eq!(fixture.scenario().withdrawal_fee, 0);
    }
}
