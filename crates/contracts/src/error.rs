//! Error types for the contracts crate.

use std::path::PathBuf;

use alloy_primitives::{Address, TxHash};
use thiserror::Error;

/// Errors that can occur when deploying or calling contracts.
#[derive(Debug, Error)]
pub enum ContractError {
    /// RPC connection failed.
    #[error("RPC connection failed: {0}")]
    RpcConnection(String),

    /// Transaction could not be submitted or its receipt was never returned.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Transaction was mined but reverted.
    #[error("Transaction {tx_hash} to {to} from {from} reverted")]
    Reverted {
        tx_hash: TxHash,
        from: Address,
        to: Address,
    },

    /// Artifact file could not be read.
    #[error("Failed to read artifact {path}: {source}")]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact JSON did not contain usable bytecode.
    #[error("Failed to parse artifact {name}: {reason}")]
    ArtifactParse { name: String, reason: String },

    /// Artifact holds no creation code (interface or abstract contract).
    #[error("Artifact {0} has empty bytecode")]
    EmptyBytecode(String),

    /// Deployment receipt carried no contract address.
    #[error("Deployment of {0} returned no contract address")]
    NoContractAddress(String),
}

/// Result type alias for contract operations.
pub type Result<T> = std::result::Result<T, ContractError>;
