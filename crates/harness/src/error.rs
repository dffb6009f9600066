//! Error types for the harness.

use alloy::transports::TransportError;
use alloy_primitives::{Address, U256};
use crv_optimizer_contracts::ContractError;
use thiserror::Error;

/// A broken accounting invariant.
///
/// Each variant names the check that failed together with the values that
/// were compared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// Snapshot lacks a value the check needs.
    #[error("Snapshot has no value for {0}")]
    MissingKey(String),

    #[error("Expected exactly one {event} event, found {count}")]
    EventCount { event: &'static str, count: usize },

    #[error("{event} event reported token {actual}, expected {expected}")]
    EventToken {
        event: &'static str,
        expected: Address,
        actual: Address,
    },

    #[error("Harvested amount {reported} does not match vault balance change {delta}")]
    HarvestedAmount { reported: U256, delta: U256 },

    #[error("TreeDistribution reported a zero amount")]
    EmptyTreeDistribution,

    #[error("Price per share did not increase: {before} -> {after}")]
    PricePerShareNotIncreased { before: U256, after: U256 },

    #[error("Price per share decreased: {before} -> {after}")]
    PricePerShareDecreased { before: U256, after: U256 },

    /// A fee rate was set but the recipient's balance did not grow.
    #[error("{fee} is non-zero but {recipient} {token} balance did not increase: {before} -> {after}")]
    FeeNotCollected {
        fee: String,
        token: String,
        recipient: String,
        before: U256,
        after: U256,
    },

    #[error("Strategy still holds {amount} {token} after harvest")]
    ResidualBalance { token: String, amount: U256 },

    /// A value that must not shrink did.
    #[error("{key} decreased: {before} -> {after}")]
    Decreased {
        key: String,
        before: U256,
        after: U256,
    },

    /// A value that must grow did not.
    #[error("{key} did not increase: {before} -> {after}")]
    NotIncreased {
        key: String,
        before: U256,
        after: U256,
    },

    /// A value that must shrink did not.
    #[error("{key} did not decrease: {before} -> {after}")]
    NotDecreased {
        key: String,
        before: U256,
        after: U256,
    },

    /// A value changed by something other than the expected amount.
    #[error("{key} changed by {actual}, expected {expected}")]
    UnexpectedChange {
        key: String,
        expected: U256,
        actual: U256,
    },
}

/// Errors that can occur while building fixtures or verifying flows.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// RPC request against the fork failed.
    #[error("Chain request failed: {0}")]
    Chain(#[from] TransportError),

    /// View call reverted or returned undecodable data.
    #[error("Call failed: {0}")]
    Call(String),

    #[error("Failed to spawn anvil: {0}")]
    Anvil(String),

    /// Fork has fewer unlocked accounts than there are roles.
    #[error("Fork exposes {have} dev accounts, need {need}")]
    NotEnoughAccounts { have: usize, need: usize },

    /// Whale holds none of the token on this fork.
    #[error("Whale {whale} holds no {token} on this fork")]
    EmptyWhale { whale: Address, token: Address },

    #[error("Deployer has no {0} to deposit")]
    NothingToDeposit(Address),

    /// `evm_revert` returned false.
    #[error("Failed to revert to chain snapshot {0}")]
    RevertFailed(U256),

    #[error("Latest block not available")]
    MissingBlock,

    #[error("Failed to decode {event} log: {reason}")]
    EventDecode { event: &'static str, reason: String },

    #[error(transparent)]
    Verification(#[from] VerificationError),
}

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
