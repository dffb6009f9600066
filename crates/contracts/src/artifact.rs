//! Compiled contract artifacts and deployment.
//!
//! Artifacts are the JSON files produced by the Solidity toolchain. Both the
//! flat layout (`"bytecode": "0x..."`, as written by brownie and hardhat) and
//! the nested layout (`"bytecode": { "object": "0x..." }`, as written by
//! foundry) are accepted.

use std::path::Path;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use serde::Deserialize;

use crate::error::{ContractError, Result};
use crate::provider::HarnessProvider;

#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Flat(String),
    Nested { object: String },
}

#[derive(Deserialize)]
struct RawArtifact {
    bytecode: BytecodeField,
}

/// Creation code for one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    name: String,
    bytecode: Bytes,
}

impl ContractArtifact {
    /// Parse an artifact from its JSON text.
    pub fn from_json_str(name: &str, json: &str) -> Result<Self> {
        let raw: RawArtifact =
            serde_json::from_str(json).map_err(|e| ContractError::ArtifactParse {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        let hex = match raw.bytecode {
            BytecodeField::Flat(hex) => hex,
            BytecodeField::Nested { object } => object,
        };

        // Unlinked library placeholders look like `__$...$__` and are not hex
        let bytecode: Bytes = hex.parse().map_err(|e| ContractError::ArtifactParse {
            name: name.to_string(),
            reason: format!("invalid bytecode: {}", e),
        })?;

        if bytecode.is_empty() {
            return Err(ContractError::EmptyBytecode(name.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            bytecode,
        })
    }

    /// Load `<dir>/<name>.json`.
    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        let path = dir.join(format!("{}.json", name));
        let json = std::fs::read_to_string(&path)
            .map_err(|source| ContractError::ArtifactIo { path, source })?;
        Self::from_json_str(name, &json)
    }

    /// Contract name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creation bytecode.
    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Contract creation request sent from `from`.
    pub fn deploy_request(&self, from: Address) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(from)
            .with_deploy_code(self.bytecode.clone())
    }
}

/// Deploy an artifact without constructor arguments and return its address.
pub async fn deploy(
    provider: &HarnessProvider,
    artifact: &ContractArtifact,
    from: Address,
) -> Result<Address> {
    let pending = provider
        .send_transaction(artifact.deploy_request(from))
        .await
        .map_err(|e| {
            ContractError::TransactionFailed(format!("Failed to deploy {}: {}", artifact.name, e))
        })?;

    let receipt = pending.get_receipt().await.map_err(|e| {
        ContractError::TransactionFailed(format!("Failed to get receipt: {}", e))
    })?;

    let address = receipt
        .contract_address
        .ok_or_else(|| ContractError::NoContractAddress(artifact.name.clone()))?;

    if !receipt.status() {
        return Err(ContractError::Reverted {
            tx_hash: receipt.transaction_hash,
            from,
            to: address,
        });
    }

    tracing::info!(contract = %artifact.name, %address, "deployed");
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, TxKind};

    #[test]
    fn test_parses_flat_bytecode() {
        let json = r#"{"contractName": "TheVault", "bytecode": "0x6080604052"}"#;
        let artifact = ContractArtifact::from_json_str("TheVault", json).unwrap();

        assert_eq!(artifact.name(), "TheVault");
        assert_eq!(artifact.bytecode().as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn test_parses_nested_bytecode() {
        let json = r#"{"abi": [], "bytecode": {"object": "0x6080", "linkReferences": {}}}"#;
        let artifact = ContractArtifact::from_json_str("ConvexCrvOptimizer", json).unwrap();

        assert_eq!(artifact.bytecode().as_ref(), &[0x60, 0x80]);
    }

    #[test]
    fn test_rejects_empty_bytecode() {
        let json = r#"{"bytecode": "0x"}"#;
        let result = ContractArtifact::from_json_str("IERC20", json);

        assert!(matches!(result, Err(ContractError::EmptyBytecode(name)) if name == "IERC20"));
    }

    #[test]
    fn test_rejects_unlinked_bytecode() {
        let json = r#"{"bytecode": "0x6080__$3f1c9a$__6080"}"#;
        let result = ContractArtifact::from_json_str("Linked", json);

        assert!(matches!(result, Err(ContractError::ArtifactParse { .. })));
    }

    #[test]
    fn test_rejects_missing_bytecode_field() {
        let result = ContractArtifact::from_json_str("TheVault", r#"{"abi": []}"#);

        assert!(matches!(result, Err(ContractError::ArtifactParse { .. })));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = std::env::temp_dir().join("crv-optimizer-contracts-missing");
        let result = ContractArtifact::load(&dir, "TheVault");

        assert!(matches!(
            result,
            Err(ContractError::ArtifactIo { path, .. }) if path.ends_with("TheVault.json")
        ));
    }

    #[test]
    fn test_deploy_request_is_contract_creation() {
        let json = r#"{"bytecode": "0x6080"}"#;
        let artifact = ContractArtifact::from_json_str("TheVault", json).unwrap();
        let deployer = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

        let request = artifact.deploy_request(deployer);

        assert_eq!(request.from, Some(deployer));
        assert_eq!(request.to, Some(TxKind::Create));
        assert_eq!(
            request.input.input().map(|b| b.to_vec()),
            Some(vec![0x60, 0x80])
        );
    }
}
