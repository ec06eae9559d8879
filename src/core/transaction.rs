//! Transactions and reward-share transaction validation
//!
//! Only the reward-share path is built here: a client-supplied, unsigned
//! REWARD_SHARE transaction is checked against the repository (including
//! pending transactions) before it is serialized for signing.

use crate::config::Settings;
use crate::core::account::{MAX_SHARE_PERCENT, QORT_ASSET_ID};
use crate::core::account_view::AccountView;
use crate::core::transform::{self, TransformationError};
use crate::core::Amount;
use crate::crypto::codec::base58_bytes;
use crate::crypto::{is_valid_address, public_key_to_address, PUBLIC_KEY_LENGTH};
use crate::storage::RepositorySession;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The only transaction group currently recognised
pub const NO_GROUP: i32 = 0;

// =============================================================================
// Transaction Types
// =============================================================================

/// Transaction types known to this node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Genesis,
    Payment,
    AccountFlags,
    RewardShare,
    AccountLevel,
}

impl TransactionType {
    /// Numeric type as used in the canonical encoding
    pub fn value(&self) -> i32 {
        match self {
            TransactionType::Genesis => 1,
            TransactionType::Payment => 2,
            TransactionType::AccountFlags => 36,
            TransactionType::RewardShare => 38,
            TransactionType::AccountLevel => 39,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(TransactionType::Genesis),
            2 => Some(TransactionType::Payment),
            36 => Some(TransactionType::AccountFlags),
            38 => Some(TransactionType::RewardShare),
            39 => Some(TransactionType::AccountLevel),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Result
// =============================================================================

/// Outcome of validating a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationResult {
    Ok,
    InvalidAddress,
    InvalidPublicKey,
    InvalidReference,
    InvalidRewardSharePercent,
    InvalidTxGroupId,
    NegativeFee,
    InsufficientFee,
    NoBalance,
    NotMintingAccount,
    TimestampTooOld,
    TimestampTooNew,
    TooManyUnconfirmed,
}

impl ValidationResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationResult::Ok => "OK",
            ValidationResult::InvalidAddress => "INVALID_ADDRESS",
            ValidationResult::InvalidPublicKey => "INVALID_PUBLIC_KEY",
            ValidationResult::InvalidReference => "INVALID_REFERENCE",
            ValidationResult::InvalidRewardSharePercent => "INVALID_REWARD_SHARE_PERCENT",
            ValidationResult::InvalidTxGroupId => "INVALID_TX_GROUP_ID",
            ValidationResult::NegativeFee => "NEGATIVE_FEE",
            ValidationResult::InsufficientFee => "INSUFFICIENT_FEE",
            ValidationResult::NoBalance => "NO_BALANCE",
            ValidationResult::NotMintingAccount => "NOT_MINTING_ACCOUNT",
            ValidationResult::TimestampTooOld => "TIMESTAMP_TOO_OLD",
            ValidationResult::TimestampTooNew => "TIMESTAMP_TOO_NEW",
            ValidationResult::TooManyUnconfirmed => "TOO_MANY_UNCONFIRMED",
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Transaction Data
// =============================================================================

/// A signed transaction held in the repository (confirmed or pending)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub timestamp: i64,
    #[serde(default)]
    pub tx_group_id: i32,
    #[serde(
        default,
        with = "base58_bytes::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference: Option<Vec<u8>>,
    #[serde(with = "base58_bytes")]
    pub creator_public_key: Vec<u8>,
    pub fee: Amount,
    #[serde(with = "base58_bytes")]
    pub signature: Vec<u8>,
}

impl TransactionData {
    /// Address of the creator, if the stored public key is well-formed
    pub fn creator_address(&self) -> Option<String> {
        let key = <[u8; PUBLIC_KEY_LENGTH]>::try_from(self.creator_public_key.as_slice()).ok()?;
        Some(public_key_to_address(&key))
    }
}

/// An unsigned REWARD_SHARE transaction as submitted by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardShareTransactionData {
    pub timestamp: i64,
    #[serde(default)]
    pub tx_group_id: i32,
    #[serde(
        default,
        with = "base58_bytes::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference: Option<Vec<u8>>,
    #[serde(with = "base58_bytes", alias = "creatorPublicKey")]
    pub minter_public_key: Vec<u8>,
    pub recipient: String,
    #[serde(with = "base58_bytes")]
    pub reward_share_public_key: Vec<u8>,
    pub share_percent: Amount,
    pub fee: Amount,
}

impl RewardShareTransactionData {
    pub fn tx_type(&self) -> TransactionType {
        TransactionType::RewardShare
    }
}

// =============================================================================
// Reward-Share Transaction
// =============================================================================

/// A reward-share transaction bound to a repository session
pub struct RewardShareTransaction<'s> {
    session: &'s RepositorySession,
    data: RewardShareTransactionData,
}

impl<'s> RewardShareTransaction<'s> {
    pub fn new(session: &'s RepositorySession, data: RewardShareTransactionData) -> Self {
        Self { session, data }
    }

    pub fn data(&self) -> &RewardShareTransactionData {
        &self.data
    }

    /// Address of the minter creating this transaction
    pub fn creator_address(&self) -> Option<String> {
        let key = <[u8; PUBLIC_KEY_LENGTH]>::try_from(self.data.minter_public_key.as_slice()).ok()?;
        Some(public_key_to_address(&key))
    }

    /// Validate against current confirmed and unconfirmed state
    pub fn validate_unconfirmed(&self, settings: &Settings, now: i64) -> ValidationResult {
        let data = &self.data;

        let minter_public_key =
            match <[u8; PUBLIC_KEY_LENGTH]>::try_from(data.minter_public_key.as_slice()) {
                Ok(key) => key,
                Err(_) => return ValidationResult::InvalidPublicKey,
            };
        if data.reward_share_public_key.len() != PUBLIC_KEY_LENGTH {
            return ValidationResult::InvalidPublicKey;
        }

        if data.timestamp > now.saturating_add(settings.max_transaction_timestamp_future_ms) {
            return ValidationResult::TimestampTooNew;
        }
        if data.timestamp.saturating_add(settings.transaction_expiry_ms) <= now {
            return ValidationResult::TimestampTooOld;
        }

        if data.tx_group_id != NO_GROUP {
            return ValidationResult::InvalidTxGroupId;
        }

        if data.fee.is_negative() {
            return ValidationResult::NegativeFee;
        }
        if data.fee < settings.unit_fee {
            return ValidationResult::InsufficientFee;
        }

        let creator = public_key_to_address(&minter_public_key);

        if self.session.unconfirmed().count_for(&creator) >= settings.max_unconfirmed_per_account {
            return ValidationResult::TooManyUnconfirmed;
        }

        // Reference must chain from the most recent pending transaction, if any
        let last_reference = AccountView::new(self.session).last_reference(&creator);
        match (&data.reference, last_reference) {
            (Some(reference), Some(last)) if *reference == last => {}
            _ => return ValidationResult::InvalidReference,
        }

        if !is_valid_address(&data.recipient) {
            return ValidationResult::InvalidAddress;
        }

        let max_percent = Amount::from_units(MAX_SHARE_PERCENT * crate::core::amount::UNITS_PER_COIN);
        if data.share_percent.is_negative() || data.share_percent > max_percent {
            return ValidationResult::InvalidRewardSharePercent;
        }

        let accounts = self.session.accounts();
        match accounts.get(&creator) {
            Some(account) if account.can_mint() => {}
            _ => return ValidationResult::NotMintingAccount,
        }

        // One reward-share key per (minter, recipient) pair, never reused
        match accounts.reward_share_for(&minter_public_key, &data.recipient) {
            Some(existing) => {
                if existing.reward_share_public_key != data.reward_share_public_key {
                    return ValidationResult::InvalidPublicKey;
                }
            }
            None => {
                if accounts
                    .get_reward_share(&data.reward_share_public_key)
                    .is_some()
                {
                    return ValidationResult::InvalidPublicKey;
                }
            }
        }

        if accounts.balance(&creator, QORT_ASSET_ID) < data.fee {
            return ValidationResult::NoBalance;
        }

        ValidationResult::Ok
    }

    /// Canonical unsigned encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransformationError> {
        transform::to_bytes(&self.data)
    }
}
