//! Fork fixtures and harvest verification for the ConvexCrvOptimizer
//! vault/strategy pair.
//!
//! The harness spawns an anvil fork of mainnet, funds the deployer from a
//! whale of the deposit token, deploys `TheVault` and `ConvexCrvOptimizer`
//! from compiled artifacts and wires them together. Tests then take balance
//! [`Snapshot`]s around vault and strategy actions and hand them to a
//! [`StrategyResolver`], which checks the accounting effects.
//!
//! ```no_run
//! use crv_optimizer_harness::{
//!     ConvexCrvOptimizerResolver, Fixture, Fork, ForkConfig, SnapshotManager, StrategyResolver,
//! };
//!
//! # async fn run() -> crv_optimizer_harness::Result<()> {
//! let Some(config) = ForkConfig::from_env() else { return Ok(()) };
//! let fork = Fork::spawn(&config)?;
//! let fixture = Fixture::new(fork.provider(), &config.artifacts_dir);
//! let deployed = fixture.deploy(fork.accounts()?).await?;
//! fixture.setup_share_math(&deployed).await?;
//!
//! let resolver = ConvexCrvOptimizerResolver::connect(fork.provider(), &deployed).await?;
//! let entities = fixture.entities(&deployed).await?;
//! let snap = SnapshotManager::new(fork.provider());
//!
//! let before = snap.snap(&resolver, &entities).await?;
//! let tx = fixture.harvest(&deployed).await?;
//! let after = snap.snap(&resolver, &entities).await?;
//! resolver.confirm_harvest(&before, &after, &tx)?;
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod compare;
pub mod config;
pub mod error;
pub mod events;
pub mod fixture;
pub mod fork;
pub mod resolver;
pub mod snapshot;
pub mod strategy;

pub use accounts::Accounts;
pub use config::{ForkConfig, Scenario, SCENARIO};
pub use error::{HarnessError, Result, VerificationError};
pub use events::{TokenEvent, VaultEvents};
pub use fixture::{Deployed, Fixture, ShareMath};
pub use fork::{Fork, Isolation};
pub use resolver::{HarvestTx, ResolverContext, StrategyResolver};
pub use snapshot::{Entities, Snapshot, SnapshotCall, SnapshotManager};
pub use strategy::{ConvexCrvOptimizerResolver, StrategyTokens};
