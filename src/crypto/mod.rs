//! Cryptographic utilities for the node
//!
//! This module provides:
//! - Base58 encoding and fixed-length key decoding
//! - SHA-256 / SHA-512 / RIPEMD-160 hashing
//! - Ed25519 accounts, address derivation and validation
//! - Reward-share private key derivation

pub mod codec;
pub mod hash;
pub mod keys;

pub use codec::{
    CodecError, ADDRESS_LENGTH, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH,
};
pub use hash::{double_sha256, hash160, sha256, sha512};
pub use keys::{
    is_valid_address, public_key_to_address, reward_share_private_key, KeyError,
    PrivateKeyAccount, ADDRESS_VERSION, AT_ADDRESS_VERSION,
};
