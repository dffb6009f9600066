//! Contract bindings and transaction plumbing for the ConvexCrvOptimizer
//! vault/strategy pair.
//!
//! This crate provides Solidity bindings for `TheVault`, the
//! `ConvexCrvOptimizer` strategy and the Convex contracts it touches, a
//! [`PreparedCall`] type that submits a call on behalf of any unlocked account,
//! a Multicall3 binding for batched reads,
//! and helpers for deploying contracts from compiled artifacts.
//!
//! # Example
//!
//! ```no_run
//! use crv_optimizer_contracts::{connect, erc20::IERC20, PreparedCall};
//! use alloy::primitives::{address, U256};
//!
//! #[tokio::main]
//! async fn main() -> crv_optimizer_contracts::Result<()> {
//!     let provider = connect("http://localhost:8545")?;
//!     let token = address!("62B9c7356A2Dc64a1969e19C23e4f579F9810Aa7");
//!     let from = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
//!     let to = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
//!
//!     let call = IERC20::transferCall { to, amount: U256::from(1) };
//!     PreparedCall::new(token, call, &provider).from(from).send().await?;
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod convex;
pub mod erc20;
pub mod error;
pub mod multicall;
pub mod prepared_call;
pub mod provider;
pub mod strategy;
pub mod vault;

pub use artifact::{deploy, ContractArtifact};
pub use error::{ContractError, Result};
pub use multicall::MULTICALL3;
pub use prepared_call::PreparedCall;
pub use provider::{connect, HarnessProvider};
