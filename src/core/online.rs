//! In-memory set of online minter presence records
//!
//! Records arrive from the gossip layer and are evicted once they fall out of
//! the online lifetime. Readers get a point-in-time snapshot: writers build a
//! new list and swap it in, so a reader never holds the lock for longer than
//! a pointer clone.

use crate::config::Settings;
use crate::crypto::codec::base58_bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A minter's presence announcement for one online window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineAccountRecord {
    /// Milliseconds since epoch, aligned to the online window
    pub timestamp: i64,
    #[serde(with = "base58_bytes")]
    pub signature: Vec<u8>,
    /// Reward-share public key the minter is online with
    #[serde(with = "base58_bytes")]
    pub public_key: Vec<u8>,
}

/// Align a timestamp down to the start of its online window
pub fn to_online_timestamp(timestamp: i64, modulus: i64) -> i64 {
    timestamp - timestamp.rem_euclid(modulus)
}

/// Snapshot accessor over the node's online accounts
#[derive(Debug)]
pub struct OnlineAccountsProvider {
    records: RwLock<Arc<Vec<OnlineAccountRecord>>>,
    timestamp_modulus: i64,
    lifetime: i64,
}

impl OnlineAccountsProvider {
    pub fn new(timestamp_modulus: i64, lifetime: i64) -> Self {
        Self {
            records: RwLock::new(Arc::new(Vec::new())),
            timestamp_modulus,
            lifetime,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.online_timestamp_modulus_ms,
            settings.online_lifetime_ms,
        )
    }

    /// Current records in arrival order
    pub async fn snapshot(&self) -> Arc<Vec<OnlineAccountRecord>> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Add or refresh a record
    ///
    /// Returns `false` if the record was rejected: misaligned timestamp, or
    /// older than the record already held for the same key.
    pub async fn upsert(&self, record: OnlineAccountRecord) -> bool {
        if to_online_timestamp(record.timestamp, self.timestamp_modulus) != record.timestamp {
            log::debug!("Rejecting misaligned online timestamp {}", record.timestamp);
            return false;
        }

        let mut guard = self.records.write().await;
        let mut records = guard.as_ref().clone();

        match records
            .iter_mut()
            .find(|existing| existing.public_key == record.public_key)
        {
            Some(existing) if existing.timestamp > record.timestamp => return false,
            Some(existing) => *existing = record,
            None => records.push(record),
        }

        *guard = Arc::new(records);
        true
    }

    /// Drop records older than the online lifetime, returning how many went
    pub async fn evict_expired(&self, now: i64) -> usize {
        let cutoff = now - self.lifetime;

        let mut guard = self.records.write().await;
        let before = guard.len();
        let kept: Vec<OnlineAccountRecord> = guard
            .iter()
            .filter(|record| record.timestamp >= cutoff)
            .cloned()
            .collect();

        let evicted = before - kept.len();
        if evicted > 0 {
            *guard = Arc::new(kept);
            log::debug!("Evicted {} expired online accounts", evicted);
        }
        evicted
    }
}
