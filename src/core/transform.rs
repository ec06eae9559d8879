//! Canonical byte encoding of REWARD_SHARE transactions
//!
//! Layout (big-endian, unsigned form):
//!
//! | field                   | bytes |
//! |-------------------------|-------|
//! | transaction type        | 4     |
//! | timestamp               | 8     |
//! | tx group id             | 4     |
//! | reference               | 64    |
//! | minter public key       | 32    |
//! | recipient address       | 25    |
//! | reward-share public key | 32    |
//! | share percent           | 8     |
//! | fee                     | 8     |

use crate::core::transaction::{RewardShareTransactionData, TransactionType};
use crate::core::Amount;
use crate::crypto::codec::{self, ADDRESS_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

/// Length of an unsigned REWARD_SHARE transaction
pub const REWARD_SHARE_LENGTH: usize = 4
    + 8
    + 4
    + SIGNATURE_LENGTH
    + PUBLIC_KEY_LENGTH
    + ADDRESS_LENGTH
    + PUBLIC_KEY_LENGTH
    + 8
    + 8;

/// Errors while encoding or decoding transactions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformationError {
    #[error("Invalid {field} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Missing {0}")]
    Missing(&'static str),
    #[error("Invalid recipient address")]
    InvalidRecipient,
    #[error("Unexpected transaction type {0}")]
    UnexpectedType(i32),
    #[error("Truncated transaction: need {0} bytes, got {1}")]
    Truncated(usize, usize),
}

fn check_length(
    field: &'static str,
    bytes: &[u8],
    expected: usize,
) -> Result<(), TransformationError> {
    if bytes.len() != expected {
        return Err(TransformationError::InvalidLength {
            field,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Serialize an unsigned REWARD_SHARE transaction
pub fn to_bytes(data: &RewardShareTransactionData) -> Result<Vec<u8>, TransformationError> {
    let reference = data
        .reference
        .as_deref()
        .ok_or(TransformationError::Missing("reference"))?;
    check_length("reference", reference, SIGNATURE_LENGTH)?;
    check_length("minter public key", &data.minter_public_key, PUBLIC_KEY_LENGTH)?;
    check_length(
        "reward-share public key",
        &data.reward_share_public_key,
        PUBLIC_KEY_LENGTH,
    )?;

    let recipient =
        codec::decode(&data.recipient).map_err(|_| TransformationError::InvalidRecipient)?;
    if recipient.len() != ADDRESS_LENGTH {
        return Err(TransformationError::InvalidRecipient);
    }

    let mut buf = BytesMut::with_capacity(REWARD_SHARE_LENGTH);
    buf.put_i32(data.tx_type().value());
    buf.put_i64(data.timestamp);
    buf.put_i32(data.tx_group_id);
    buf.put_slice(reference);
    buf.put_slice(&data.minter_public_key);
    buf.put_slice(&recipient);
    buf.put_slice(&data.reward_share_public_key);
    buf.put_i64(data.share_percent.units());
    buf.put_i64(data.fee.units());

    Ok(buf.to_vec())
}

/// Parse an unsigned REWARD_SHARE transaction
pub fn from_bytes(bytes: &[u8]) -> Result<RewardShareTransactionData, TransformationError> {
    if bytes.len() < REWARD_SHARE_LENGTH {
        return Err(TransformationError::Truncated(
            REWARD_SHARE_LENGTH,
            bytes.len(),
        ));
    }

    let mut buf = bytes;

    let tx_type = buf.get_i32();
    if tx_type != TransactionType::RewardShare.value() {
        return Err(TransformationError::UnexpectedType(tx_type));
    }

    let timestamp = buf.get_i64();
    let tx_group_id = buf.get_i32();

    let mut reference = vec![0u8; SIGNATURE_LENGTH];
    buf.copy_to_slice(&mut reference);

    let mut minter_public_key = vec![0u8; PUBLIC_KEY_LENGTH];
    buf.copy_to_slice(&mut minter_public_key);

    let mut recipient = [0u8; ADDRESS_LENGTH];
    buf.copy_to_slice(&mut recipient);

    let mut reward_share_public_key = vec![0u8; PUBLIC_KEY_LENGTH];
    buf.copy_to_slice(&mut reward_share_public_key);

    let share_percent = Amount::from_units(buf.get_i64());
    let fee = Amount::from_units(buf.get_i64());

    Ok(RewardShareTransactionData {
        timestamp,
        tx_group_id,
        reference: Some(reference),
        minter_public_key,
        recipient: codec::encode(&recipient),
        reward_share_public_key,
        share_percent,
        fee,
    })
}
