//! Account and reward-share records

use crate::core::Amount;
use crate::crypto::codec::base58_bytes;
use crate::crypto::{public_key_to_address, PUBLIC_KEY_LENGTH};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Asset id of the native coin
pub const QORT_ASSET_ID: i64 = 0;

/// Maximum reward-share percentage
pub const MAX_SHARE_PERCENT: i64 = 100;

bitflags! {
    /// Account state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AccountFlags: u32 {
        /// Genesis founder, allowed to mint regardless of level
        const FOUNDER = 0x0000_0001;
    }
}

/// Account state as stored in the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountData {
    pub address: String,
    /// Signature of the last transaction created by this account
    #[serde(
        default,
        with = "base58_bytes::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference: Option<Vec<u8>>,
    #[serde(
        default,
        with = "base58_bytes::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub public_key: Option<Vec<u8>>,
    #[serde(default)]
    pub default_group_id: i32,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub blocks_minted: i32,
}

impl AccountData {
    /// An account record with just the address populated
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            reference: None,
            public_key: None,
            default_group_id: 0,
            flags: 0,
            level: 0,
            blocks_minted: 0,
        }
    }

    /// An account record for a known public key
    pub fn with_public_key(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> Self {
        let mut account = Self::new(&public_key_to_address(public_key));
        account.public_key = Some(public_key.to_vec());
        account
    }

    pub fn account_flags(&self) -> AccountFlags {
        AccountFlags::from_bits_truncate(self.flags)
    }

    /// Whether this account may mint blocks
    pub fn can_mint(&self) -> bool {
        self.level > 0 || self.account_flags().contains(AccountFlags::FOUNDER)
    }
}

/// A reward-share relationship between a minter and a recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardShareData {
    #[serde(with = "base58_bytes")]
    pub minter_public_key: Vec<u8>,
    pub minting_account: String,
    pub recipient: String,
    #[serde(with = "base58_bytes")]
    pub reward_share_public_key: Vec<u8>,
    pub share_percent: Amount,
}

impl RewardShareData {
    pub fn new(
        minter_public_key: &[u8; PUBLIC_KEY_LENGTH],
        recipient: &str,
        reward_share_public_key: &[u8; PUBLIC_KEY_LENGTH],
        share_percent: Amount,
    ) -> Self {
        Self {
            minter_public_key: minter_public_key.to_vec(),
            minting_account: public_key_to_address(minter_public_key),
            recipient: recipient.to_string(),
            reward_share_public_key: reward_share_public_key.to_vec(),
            share_percent,
        }
    }

    /// Whether `address` is the minter or the recipient
    pub fn involves(&self, address: &str) -> bool {
        self.minting_account == address || self.recipient == address
    }
}
