//! Integration tests for the contracts crate.

use std::path::PathBuf;

use crv_optimizer_contracts::{connect, ContractArtifact, ContractError};

fn unique_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "crv-optimizer-contracts-{}-{}",
        tag,
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn test_load_artifact_from_directory() {
    let dir = unique_dir("load");
    std::fs::write(
        dir.join("TheVault.json"),
        r#"{"contractName": "TheVault", "bytecode": "0x60806040"}"#,
    )
    .expect("write artifact");

    let artifact = ContractArtifact::load(&dir, "TheVault").expect("load artifact");

    assert_eq!(artifact.name(), "TheVault");
    assert_eq!(artifact.bytecode().len(), 4);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_load_artifact_with_invalid_json() {
    let dir = unique_dir("invalid");
    std::fs::write(dir.join("ConvexCrvOptimizer.json"), "not json").expect("write artifact");

    let result = ContractArtifact::load(&dir, "ConvexCrvOptimizer");

    assert!(matches!(result, Err(ContractError::ArtifactParse { .. })));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_connect_invalid_rpc_url() {
    let result = connect("not a url");
    assert!(matches!(result, Err(ContractError::RpcConnection(_))));
}

#[test]
fn test_error_conversion() {
    fn fallible() -> crv_optimizer_contracts::Result<()> {
        let _provider = connect("::")?;
        Ok(())
    }

    assert!(fallible().is_err());
}
