//! Core account and reward-share components
//!
//! This module contains:
//! - Fixed-point amounts
//! - Account and reward-share records
//! - The unconfirmed-aware account view
//! - Online minter presence records
//! - Reward-share transactions, validation and canonical encoding

pub mod account;
pub mod account_view;
pub mod amount;
pub mod online;
pub mod transaction;
pub mod transform;

pub use account::{
    AccountData, AccountFlags, RewardShareData, MAX_SHARE_PERCENT, QORT_ASSET_ID,
};
pub use account_view::AccountView;
pub use amount::{Amount, AmountError, AMOUNT_DECIMALS, UNITS_PER_COIN};
pub use online::{to_online_timestamp, OnlineAccountRecord, OnlineAccountsProvider};
pub use transaction::{
    RewardShareTransaction, RewardShareTransactionData, TransactionData, TransactionType,
    ValidationResult,
};
pub use transform::{TransformationError, REWARD_SHARE_LENGTH};
