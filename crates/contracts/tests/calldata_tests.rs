//! Unit tests for calldata encoding.
//!
//! These tests verify ABI encoding of the vault, strategy and Convex calls the
//! harness sends, without requiring RPC connections.

use alloy::primitives::{address, keccak256, Address, U256};
use alloy::sol_types::SolCall;
use crv_optimizer_contracts::convex::IBooster;
use crv_optimizer_contracts::erc20::IERC20;
use crv_optimizer_contracts::strategy::IConvexCrvOptimizer;
use crv_optimizer_contracts::vault::ITheVault;
use crv_optimizer_contracts::{connect, PreparedCall};

const TEST_VAULT: Address = address!("1234567890123456789012345678901234567890");
const TEST_WANT: Address = address!("62B9c7356A2Dc64a1969e19C23e4f579F9810Aa7");
const TEST_GOVERNANCE: Address = address!("abcdabcdabcdabcdabcdabcdabcdabcdabcdabcd");

fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

// ============================================================================
// TheVault
// ============================================================================

#[test]
fn test_vault_initialize_selector() {
    assert_eq!(
        ITheVault::initializeCall::SELECTOR,
        selector(
            "initialize(address,address,address,address,address,address,address,string,string,uint256[4])"
        )
    );
}

#[test]
fn test_vault_initialize_encodes_fee_config_inline() {
    let call = ITheVault::initializeCall {
        _token: TEST_WANT,
        _governance: TEST_GOVERNANCE,
        _keeper: Address::repeat_byte(0x02),
        _guardian: Address::repeat_byte(0x03),
        _treasury: TEST_GOVERNANCE,
        _strategist: Address::repeat_byte(0x01),
        _badgerTree: Address::repeat_byte(0x08),
        _name: String::new(),
        _symbol: String::new(),
        _feeConfig: [
            U256::from(2_000),
            U256::ZERO,
            U256::from(10),
            U256::ZERO,
        ],
    };
    let calldata = call.abi_encode();

    // Head: 7 addresses, 2 string offsets, 4 fixed fee words. Tail: 2 empty strings.
    assert_eq!(calldata.len(), 4 + 13 * 32 + 2 * 32);

    let first = U256::from_be_slice(&calldata[4..36]);
    assert_eq!(first, U256::from_be_slice(TEST_WANT.as_slice()));

    let fee_base = 4 + 9 * 32;
    let governance_fee = U256::from_be_slice(&calldata[fee_base..fee_base + 32]);
    let withdrawal_fee = U256::from_be_slice(&calldata[fee_base + 64..fee_base + 96]);
    assert_eq!(governance_fee, U256::from(2_000));
    assert_eq!(withdrawal_fee, U256::from(10));
}

#[test]
fn test_vault_entry_point_selectors() {
    assert_eq!(ITheVault::setStrategistCall::SELECTOR, selector("setStrategist(address)"));
    assert_eq!(ITheVault::setStrategyCall::SELECTOR, selector("setStrategy(address)"));
    assert_eq!(ITheVault::depositCall::SELECTOR, selector("deposit(uint256)"));
    assert_eq!(ITheVault::earnCall::SELECTOR, selector("earn()"));
    assert_eq!(ITheVault::withdrawCall::SELECTOR, selector("withdraw(uint256)"));
    assert_eq!(
        ITheVault::getPricePerFullShareCall::SELECTOR,
        selector("getPricePerFullShare()")
    );
}

#[test]
fn test_vault_deposit_calldata_encoding() {
    let amount = U256::from(5_000_000u64);
    let calldata = ITheVault::depositCall { _amount: amount }.abi_encode();

    assert_eq!(calldata.len(), 36);
    assert_eq!(U256::from_be_slice(&calldata[4..36]), amount);
}

// ============================================================================
// ConvexCrvOptimizer
// ============================================================================

#[test]
fn test_strategy_initialize_encoding() {
    let call = IConvexCrvOptimizer::initializeCall {
        _vault: TEST_VAULT,
        _wantConfig: [TEST_WANT],
        _pid: U256::from(50),
    };
    let calldata = call.abi_encode();

    assert_eq!(
        IConvexCrvOptimizer::initializeCall::SELECTOR,
        selector("initialize(address,address[1],uint256)")
    );
    // Static array is encoded inline: vault, want, pid
    assert_eq!(calldata.len(), 4 + 3 * 32);
    assert_eq!(U256::from_be_slice(&calldata[68..100]), U256::from(50));
}

#[test]
fn test_strategy_token_accessor_selectors() {
    assert_eq!(IConvexCrvOptimizer::BVECVXCall::SELECTOR, selector("BVECVX()"));
    assert_eq!(IConvexCrvOptimizer::THREE_CRVCall::SELECTOR, selector("THREE_CRV()"));
    assert_eq!(
        IConvexCrvOptimizer::baseRewardsPoolCall::SELECTOR,
        selector("baseRewardsPool()")
    );
    assert_eq!(IConvexCrvOptimizer::harvestCall::SELECTOR, selector("harvest()"));
}

// ============================================================================
// Convex and ERC20
// ============================================================================

#[test]
fn test_booster_earmark_rewards_encoding() {
    let calldata = IBooster::earmarkRewardsCall { _pid: U256::ZERO }.abi_encode();

    assert_eq!(&calldata[0..4], &selector("earmarkRewards(uint256)"));
    assert_eq!(calldata.len(), 36);
}

#[test]
fn test_erc20_transfer_selector() {
    // transfer(address,uint256)
    assert_eq!(IERC20::transferCall::SELECTOR, [0xa9, 0x05, 0x9c, 0xbb]);
}

#[test]
fn test_prepared_call_targets_vault() {
    let provider = connect("http://localhost:8545").expect("valid url");
    let prepared = PreparedCall::new(TEST_VAULT, ITheVault::earnCall {}, &provider)
        .from(TEST_GOVERNANCE);

    let request = prepared.request();
    assert_eq!(request.from, Some(TEST_GOVERNANCE));
    assert_eq!(request.to, Some(TEST_VAULT.into()));
    assert_eq!(
        request.input.input().map(|b| b.to_vec()),
        Some(ITheVault::earnCall::SELECTOR.to_vec())
    );
}
