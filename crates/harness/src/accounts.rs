//! Deterministic account roles taken from the fork's dev accounts.

use alloy_primitives::Address;

use crate::error::{HarnessError, Result};

/// Named roles used by the fixtures.
///
/// Roles map to fixed dev account indices so every run assigns the same
/// address to the same role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accounts {
    pub deployer: Address,
    pub strategist: Address,
    pub keeper: Address,
    pub guardian: Address,
    pub governance: Address,
    pub treasury: Address,
    pub proxy_admin: Address,
    pub random_user: Address,
    pub badger_tree: Address,
    pub user: Address,
}

impl Accounts {
    /// Number of dev accounts the roles occupy.
    pub const REQUIRED: usize = 10;

    /// Assign roles from an ordered list of unlocked accounts.
    pub fn from_dev_accounts(addresses: &[Address]) -> Result<Self> {
        if addresses.len() < Self::REQUIRED {
            return Err(HarnessError::NotEnoughAccounts {
                have: addresses.len(),
                need: Self::REQUIRED,
            });
        }

        Ok(Self {
            deployer: addresses[0],
            strategist: addresses[1],
            keeper: addresses[2],
            guardian: addresses[3],
            governance: addresses[4],
            treasury: addresses[5],
            proxy_admin: addresses[6],
            random_user: addresses[7],
            badger_tree: addresses[8],
            user: addresses[9],
        })
    }
}
