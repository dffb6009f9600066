//! Provider construction for the harness.
//!
//! The harness talks to an anvil fork whose dev accounts are unlocked and
//! whose whale accounts are impersonated, so transactions are submitted with
//! `eth_sendTransaction` and signed by the node. No local wallet or filler is
//! installed; anvil fills nonce, gas and chain id itself.

use alloy::providers::{DynProvider, Provider, ProviderBuilder};

use crate::error::{ContractError, Result};

/// The concrete provider type used throughout the harness.
pub type HarnessProvider = DynProvider;

/// Connect to a node over HTTP.
pub fn connect(rpc_url: &str) -> Result<HarnessProvider> {
    let url: url::Url = rpc_url
        .parse()
        .map_err(|e| ContractError::RpcConnection(format!("{}", e)))?;

    let provider = ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_http(url)
        .erased();

    Ok(provider)
}
