//! Base58 codec and fixed-length key decoding
//!
//! `encode`/`decode` do no length validation; the `decode_*` helpers enforce
//! the byte lengths of keys and signatures.

use thiserror::Error;

/// Length of an Ed25519 public key in bytes
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Length of a private key (Ed25519 seed) in bytes
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Length of a transaction signature in bytes
pub const SIGNATURE_LENGTH: usize = 64;

/// Length of a decoded address in bytes
pub const ADDRESS_LENGTH: usize = 25;

/// Errors that can occur while decoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid Base58 encoding")]
    InvalidEncoding,
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Base58-encode arbitrary bytes
pub fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode a Base58 string
pub fn decode(s: &str) -> Result<Vec<u8>, CodecError> {
    bs58::decode(s)
        .into_vec()
        .map_err(|_| CodecError::InvalidEncoding)
}

/// Decode a Base58 string into exactly `N` bytes
pub fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], CodecError> {
    let bytes = decode(s)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| CodecError::InvalidLength {
        expected: N,
        actual: bytes.len(),
    })
}

/// Decode a Base58 public key (32 bytes)
pub fn decode_public_key(s: &str) -> Result<[u8; PUBLIC_KEY_LENGTH], CodecError> {
    decode_fixed::<PUBLIC_KEY_LENGTH>(s)
}

/// Decode a Base58 private key (32 bytes)
pub fn decode_private_key(s: &str) -> Result<[u8; PRIVATE_KEY_LENGTH], CodecError> {
    decode_fixed::<PRIVATE_KEY_LENGTH>(s)
}

/// Decode a Base58 signature (64 bytes)
pub fn decode_signature(s: &str) -> Result<[u8; SIGNATURE_LENGTH], CodecError> {
    decode_fixed::<SIGNATURE_LENGTH>(s)
}

/// Serde adapters for byte fields carried as Base58 strings in JSON
pub mod base58_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::decode(&s).map_err(serde::de::Error::custom)
    }

    /// Same as the parent module but for `Option<Vec<u8>>`
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            bytes: &Option<Vec<u8>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match bytes {
                Some(b) => serializer.serialize_str(&crate::crypto::codec::encode(b)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Vec<u8>>, D::Error> {
            let s: Option<String> = Option::deserialize(deserializer)?;
            s.map(|s| crate::crypto::codec::decode(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
