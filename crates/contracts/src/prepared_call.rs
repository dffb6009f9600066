//! Prepared call types for deferred transaction execution.
//!
//! A `PreparedCall` is a typed contract call that has been constructed but not
//! yet sent. The harness acts as many different accounts (deployer,
//! governance, keeper, an impersonated whale), so the sender is chosen per call
//! with [`PreparedCall::from`] and the node signs the transaction.

use alloy::primitives::Address;
use alloy::providers::Provider;
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::sol_types::SolCall;

use crate::error::{ContractError, Result};
use crate::provider::HarnessProvider;

/// A typed transaction waiting to be sent.
///
/// # Example
///
/// ```rust,ignore
/// let call = ITheVault::earnCall {};
/// let receipt = PreparedCall::new(vault, call, &provider)
///     .from(governance)
///     .send()
///     .await?;
/// ```
pub struct PreparedCall<'a, C: SolCall> {
    to: Address,
    call: C,
    from: Option<Address>,
    provider: &'a HarnessProvider,
}

impl<'a, C: SolCall> PreparedCall<'a, C> {
    /// Create a new prepared call with no sender.
    pub fn new(to: Address, call: C, provider: &'a HarnessProvider) -> Self {
        Self {
            to,
            call,
            from: None,
            provider,
        }
    }

    /// Set the account the node should send this transaction from.
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Builds the transaction request without sending it.
    pub fn request(&self) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .to(self.to)
            .input(self.call.abi_encode().into());
        if let Some(from) = self.from {
            tx = tx.from(from);
        }
        tx
    }

    /// Sends the transaction, waits for the receipt and rejects reverts.
    pub async fn send(self) -> Result<TransactionReceipt> {
        let tx = self.request();

        tracing::debug!(to = %self.to, from = ?self.from, call = C::SIGNATURE, "sending transaction");

        let pending = self.provider.send_transaction(tx).await.map_err(|e| {
            ContractError::TransactionFailed(format!("Failed to send {}: {}", C::SIGNATURE, e))
        })?;

        let receipt = pending.get_receipt().await.map_err(|e| {
            ContractError::TransactionFailed(format!("Failed to get receipt: {}", e))
        })?;

        if !receipt.status() {
            return Err(ContractError::Reverted {
                tx_hash: receipt.transaction_hash,
                from: receipt.from,
                to: self.to,
            });
        }

        Ok(receipt)
    }
}
