//! Ed25519 key management and address derivation
//!
//! Accounts are identified by Ed25519 public keys. Addresses are
//! `Base58(version || RIPEMD160(SHA256(pubkey)) || checksum)` where the
//! checksum is the first four bytes of the double SHA-256 of the first 21
//! bytes.

use curve25519_dalek::montgomery::MontgomeryPoint;
use ed25519_dalek::SigningKey;
use num_bigint::BigUint;
use rand::rngs::OsRng;
use thiserror::Error;

use super::codec::{self, ADDRESS_LENGTH, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH};
use super::hash::{checksum, hash160, sha256, sha512, CHECKSUM_LENGTH};

/// Version byte of normal account addresses (Base58 prefix "Q")
pub const ADDRESS_VERSION: u8 = 58;

/// Version byte of automated-transaction addresses (Base58 prefix "A")
pub const AT_ADDRESS_VERSION: u8 = 23;

/// Errors that can occur during key operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
}

/// An account for which the private key (Ed25519 seed) is known
#[derive(Clone)]
pub struct PrivateKeyAccount {
    signing_key: SigningKey,
}

impl PrivateKeyAccount {
    /// Generate a new random account
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Create an account from a 32-byte private key
    pub fn from_private_key(private_key: &[u8; PRIVATE_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(private_key),
        }
    }

    /// Create an account from a Base58-encoded private key
    pub fn from_private_key_base58(encoded: &str) -> Result<Self, KeyError> {
        let bytes = codec::decode_private_key(encoded).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_private_key(&bytes))
    }

    /// Raw private key bytes
    pub fn private_key(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }

    /// Raw public key bytes
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Address derived from the public key
    pub fn address(&self) -> String {
        public_key_to_address(&self.public_key())
    }

    /// Reward-share private key shared with `recipient_public_key`
    pub fn reward_share_private_key(
        &self,
        recipient_public_key: &[u8; PUBLIC_KEY_LENGTH],
    ) -> [u8; PRIVATE_KEY_LENGTH] {
        reward_share_private_key(&self.private_key(), recipient_public_key)
    }
}

impl std::fmt::Debug for PrivateKeyAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyAccount")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Convert a public key to an account address
pub fn public_key_to_address(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> String {
    let mut address_bytes = Vec::with_capacity(ADDRESS_LENGTH);
    address_bytes.push(ADDRESS_VERSION);
    address_bytes.extend_from_slice(&hash160(public_key));

    let check = checksum(&address_bytes);
    address_bytes.extend_from_slice(&check);

    codec::encode(&address_bytes)
}

/// Check whether `address` is a well-formed, checksum-valid address
pub fn is_valid_address(address: &str) -> bool {
    let bytes = match codec::decode(address) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    if bytes.len() != ADDRESS_LENGTH {
        return false;
    }

    if bytes[0] != ADDRESS_VERSION && bytes[0] != AT_ADDRESS_VERSION {
        return false;
    }

    let (body, check) = bytes.split_at(ADDRESS_LENGTH - CHECKSUM_LENGTH);
    checksum(body) == check
}

/// Derive the reward-share private key for a minter and a recipient
///
/// The minter's Ed25519 seed is converted to an X25519 scalar and the
/// recipient's Ed25519 key to a Montgomery u-coordinate. The SHA-256 of the
/// resulting shared secret is the reward-share private key. Every 32-byte
/// public key yields a key, whether or not it encodes a curve point.
pub fn reward_share_private_key(
    minter_private_key: &[u8; PRIVATE_KEY_LENGTH],
    recipient_public_key: &[u8; PUBLIC_KEY_LENGTH],
) -> [u8; PRIVATE_KEY_LENGTH] {
    sha256(&shared_secret(minter_private_key, recipient_public_key))
}

/// X25519 shared secret between an Ed25519 seed and an Ed25519 public key
fn shared_secret(
    private_key: &[u8; PRIVATE_KEY_LENGTH],
    public_key: &[u8; PUBLIC_KEY_LENGTH],
) -> [u8; 32] {
    let montgomery = MontgomeryPoint(edwards_to_montgomery_u(public_key));

    // mul_clamped applies the X25519 clamping to the hashed seed
    let mut scalar = [0u8; 32];
    scalar.copy_from_slice(&sha512(private_key)[..32]);

    montgomery.mul_clamped(scalar).to_bytes()
}

/// `u = (1 + y) / (1 - y) mod 2^255 - 19` from the encoded y-coordinate
///
/// The sign bit is dropped and no curve membership check is made. A zero
/// denominator inverts to zero, giving `u = 0`.
fn edwards_to_montgomery_u(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> [u8; 32] {
    let one = BigUint::from(1u32);
    let p = (BigUint::from(1u32) << 255usize) - BigUint::from(19u32);

    let mut y_bytes = *public_key;
    y_bytes[31] &= 0x7f;
    let y = BigUint::from_bytes_le(&y_bytes) % &p;

    let numerator = (&one + &y) % &p;
    let denominator = (&p + &one - &y) % &p;
    let inverse = denominator.modpow(&(&p - BigUint::from(2u32)), &p);
    let u = (numerator * inverse) % &p;

    let mut out = [0u8; 32];
    let bytes = u.to_bytes_le();
    out[..bytes.len()].copy_from_slice(&bytes);
    out
}
