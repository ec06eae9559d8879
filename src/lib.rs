//! Reward-Share Node: account and reward-share HTTP API for a minting blockchain
//!
//! This crate provides:
//! - Base58 codec, Ed25519 accounts and address derivation
//! - Reward-share key derivation (X25519 over Ed25519 keys)
//! - A transactional in-process repository with JSON persistence
//! - Unconfirmed-aware account views
//! - Online minter tracking
//! - REWARD_SHARE transaction validation and canonical encoding
//! - An axum REST API under `/addresses`
//!
//! # Example
//!
//! ```rust
//! use reward_share_node::crypto::{is_valid_address, PrivateKeyAccount};
//!
//! let minter = PrivateKeyAccount::generate();
//! let recipient = PrivateKeyAccount::generate();
//! assert!(is_valid_address(&minter.address()));
//!
//! let key = minter.reward_share_private_key(&recipient.public_key());
//! assert_eq!(key.len(), 32);
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod storage;

// Re-export commonly used types
pub use api::{create_router, ApiError, ApiState};
pub use config::Settings;
pub use core::{
    AccountData, AccountView, Amount, OnlineAccountRecord, OnlineAccountsProvider,
    RewardShareData, RewardShareTransactionData, ValidationResult,
};
pub use crypto::PrivateKeyAccount;
pub use storage::{RepositoryManager, RepositorySession, Storage};
