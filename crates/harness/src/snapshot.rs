//! Point-in-time balance snapshots.
//!
//! A snapshot is built from a list of [`SnapshotCall`]s, each a read-only
//! call returning a single `uint256`, resolved in one Multicall3 batch
//! against one pinned block.
//! Values are addressed by dotted keys such as `sett.balance` or
//! `balances.<token>.<entity>`.

use std::collections::BTreeMap;

use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::Provider;
use alloy::sol_types::SolCall;
use crv_optimizer_contracts::erc20::IERC20;
use crv_optimizer_contracts::multicall::IMulticall3;
use crv_optimizer_contracts::{HarnessProvider, MULTICALL3};

use crate::error::{HarnessError, Result, VerificationError};
use crate::resolver::StrategyResolver;

/// Key of the balance `entity_key` holds of `token_key`.
pub fn balance_key(token_key: &str, entity_key: &str) -> String {
    format!("balances.{}.{}", token_key, entity_key)
}

/// A pending read whose `uint256` result is stored under `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotCall {
    pub key: String,
    pub target: Address,
    pub calldata: Bytes,
}

impl SnapshotCall {
    pub fn new<C: SolCall>(key: impl Into<String>, target: Address, call: &C) -> Self {
        Self {
            key: key.into(),
            target,
            calldata: call.abi_encode().into(),
        }
    }

    /// `token.balanceOf(entity)` stored under [`balance_key`].
    pub fn balance_of(token_key: &str, token: Address, entity_key: &str, entity: Address) -> Self {
        Self::new(
            balance_key(token_key, entity_key),
            token,
            &IERC20::balanceOfCall { account: entity },
        )
    }
}

/// Named addresses whose balances are tracked, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities(Vec<(String, Address)>);

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, replacing any previous address under the same key.
    pub fn with(mut self, key: impl Into<String>, address: Address) -> Self {
        self.insert(key, address);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, address: Address) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = address,
            None => self.0.push((key, address)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Address> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, a)| *a)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.0.iter().map(|(k, a)| (k.as_str(), *a))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Values read at one block. Immutable once captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    block: u64,
    values: BTreeMap<String, U256>,
}

impl Snapshot {
    pub fn from_values<K: Into<String>>(
        block: u64,
        values: impl IntoIterator<Item = (K, U256)>,
    ) -> Self {
        Self {
            block,
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Block the values were read at.
    pub fn block(&self) -> u64 {
        self.block
    }

    pub fn get(&self, key: &str) -> std::result::Result<U256, VerificationError> {
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| VerificationError::MissingKey(key.to_string()))
    }

    /// Balance `entity_key` holds of `token_key`.
    pub fn balances(
        &self,
        token_key: &str,
        entity_key: &str,
    ) -> std::result::Result<U256, VerificationError> {
        self.get(&balance_key(token_key, entity_key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, U256)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolves snapshot calls against the chain.
pub struct SnapshotManager<'a> {
    provider: &'a HarnessProvider,
}

impl<'a> SnapshotManager<'a> {
    pub fn new(provider: &'a HarnessProvider) -> Self {
        Self { provider }
    }

    /// Snapshot everything `resolver` tracks for `entities`.
    pub async fn snap<R: StrategyResolver + ?Sized>(
        &self,
        resolver: &R,
        entities: &Entities,
    ) -> Result<Snapshot> {
        let calls = resolver.add_sett_snap(Vec::new());
        let calls = resolver.add_strategy_snap(calls);
        let calls = resolver.add_balances_snap(calls, entities);
        self.resolve(&calls).await
    }

    /// Run every call in one Multicall3 `aggregate3` batch at the current block.
    pub async fn resolve(&self, calls: &[SnapshotCall]) -> Result<Snapshot> {
        let block = self.provider.get_block_number().await?;
        let batch = calls
            .iter()
            .map(|call| IMulticall3::Call3 {
                target: call.target,
                allowFailure: true,
                callData: call.calldata.clone(),
            })
            .collect::<Vec<_>>();

        let results = IMulticall3::new(MULTICALL3, self.provider)
            .aggregate3(batch)
            .block(block.into())
            .call()
            .await
            .map_err(|e| HarnessError::Call(format!("aggregate3 at block {}: {}", block, e)))?;

        let values = collect(calls, results)?;
        tracing::debug!(block, values = values.len(), "snapshot taken");
        Ok(Snapshot { block, values })
    }
}

/// Pair each call with its batched result, in order.
fn collect(
    calls: &[SnapshotCall],
    results: Vec<IMulticall3::Call3Result>,
) -> Result<BTreeMap<String, U256>> {
    if results.len() != calls.len() {
        return Err(HarnessError::Call(format!(
            "aggregate3 returned {} results for {} calls",
            results.len(),
            calls.len()
        )));
    }

    calls
        .iter()
        .zip(results)
        .map(|(call, result)| {
            if !result.success {
                return Err(HarnessError::Call(format!(
                    "{} at {} reverted",
                    call.key, call.target
                )));
            }
            Ok((call.key.clone(), decode_word(&call.key, &result.returnData)?))
        })
        .collect()
}

fn decode_word(key: &str, output: &[u8]) -> Result<U256> {
    output
        .get(..32)
        .map(U256::from_be_slice)
        .ok_or_else(|| {
            HarnessError::Call(format!(
                "{} returned {} bytes, expected a uint256",
                key,
                output.len()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_key_format() {
        assert_eq!(balance_key("bveCvx", "treasury"), "balances.bveCvx.treasury");
    }

    #[test]
    fn test_balance_of_call_encodes_entity() {
        let token = Address::repeat_byte(0xaa);
        let entity = Address::repeat_byte(0xbb);

        let call = SnapshotCall::balance_of("crv", token, "strategy", entity);

        assert_eq!(call.key, "balances.crv.strategy");
        assert_eq!(call.target, token);
        assert_eq!(&call.calldata[..4], &IERC20::balanceOfCall::SELECTOR);
        assert_eq!(&call.calldata[16..36], entity.as_slice());
    }

    #[test]
    fn test_entities_keep_insertion_order_and_replace_duplicates() {
        let entities = Entities::new()
            .with("user", Address::repeat_byte(1))
            .with("sett", Address::repeat_byte(2))
            .with("user", Address::repeat_byte(3));

        let keys: Vec<&str> = entities.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["user", "sett"]);
        assert_eq!(entities.get("user"), Some(Address::repeat_byte(3)));
        assert_eq!(entities.get("treasury"), None);
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_snapshot_lookup() {
        let snapshot = Snapshot::from_values(
            12,
            [
                ("sett.balance", U256::from(100)),
                ("balances.crv.strategy", U256::ZERO),
            ],
        );

        assert_eq!(snapshot.block(), 12);
        assert_eq!(snapshot.get("sett.balance"), Ok(U256::from(100)));
        assert_eq!(snapshot.balances("crv", "strategy"), Ok(U256::ZERO));
        assert_eq!(
            snapshot.get("sett.available"),
            Err(VerificationError::MissingKey("sett.available".to_string()))
        );
    }

    #[test]
    fn test_decode_word_reads_first_word() {
        let mut output = vec![0u8; 32];
        output[31] = 7;
        assert_eq!(decode_word("k", &output).unwrap(), U256::from(7));
    }

    #[test]
    fn test_decode_word_rejects_short_output() {
        let result = decode_word("sett.balance", &[0u8; 4]);
        assert!(matches!(result, Err(HarnessError::Call(msg)) if msg.contains("sett.balance")));
    }

    fn word(value: u64) -> IMulticall3::Call3Result {
        IMulticall3::Call3Result {
            success: true,
            returnData: U256::from(value).to_be_bytes::<32>().to_vec().into(),
        }
    }

    fn balance_calls() -> Vec<SnapshotCall> {
        let token = Address::repeat_byte(0xaa);
        vec![
            SnapshotCall::balance_of("crv", token, "strategy", Address::repeat_byte(1)),
            SnapshotCall::balance_of("crv", token, "sett", Address::repeat_byte(2)),
        ]
    }

    #[test]
    fn test_collect_pairs_results_with_keys_in_order() {
        let values = collect(&balance_calls(), vec![word(5), word(9)]).unwrap();

        assert_eq!(values.get("balances.crv.strategy"), Some(&U256::from(5)));
        assert_eq!(values.get("balances.crv.sett"), Some(&U256::from(9)));
    }

    #[test]
    fn test_collect_names_the_reverted_call() {
        let failed = IMulticall3::Call3Result {
            success: false,
            returnData: Bytes::new(),
        };

        let result = collect(&balance_calls(), vec![word(5), failed]);

        assert!(matches!(result, Err(HarnessError::Call(msg)) if msg.contains("balances.crv.sett")));
    }

    #[test]
    fn test_collect_rejects_missing_results() {
        let result = collect(&balance_calls(), vec![word(5)]);

        assert!(matches!(result, Err(HarnessError::Call(msg)) if msg.contains("1 results for 2 calls")));
    }
}
