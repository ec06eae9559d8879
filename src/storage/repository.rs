//! Transactional repository
//!
//! All node state the API reads lives in a [`RepositoryState`] behind an
//! async read/write lock. A [`RepositorySession`] holds a read guard for the
//! duration of one request, so every query made through it sees the same
//! snapshot. Sessions are released when dropped: on success, on error, on
//! panic unwinding and when a request future is cancelled.

use crate::core::transaction::{RewardShareTransaction, RewardShareTransactionData};
use crate::core::{AccountData, Amount, RewardShareData, TransactionData, QORT_ASSET_ID};
use crate::storage::persistence::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// Repository errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Repository is closed")]
    Closed,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Data error: {0}")]
    Data(String),
}

// =============================================================================
// State
// =============================================================================

/// Everything the repository holds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryState {
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountData>,
    /// Balances by address, then asset id
    #[serde(default)]
    pub balances: BTreeMap<String, BTreeMap<i64, Amount>>,
    #[serde(default)]
    pub reward_shares: Vec<RewardShareData>,
    /// Confirmed transactions
    #[serde(default)]
    pub transactions: Vec<TransactionData>,
    /// Pending transactions, ordered by timestamp then arrival
    #[serde(default)]
    pub unconfirmed: Vec<TransactionData>,
}

/// Filters for listing reward shares
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardShareCriteria {
    pub minters: Vec<String>,
    pub recipients: Vec<String>,
    pub involving: Vec<String>,
    pub limit: Option<usize>,
    pub offset: usize,
    pub reverse: bool,
}

impl RewardShareCriteria {
    /// Filters AND together; an empty list imposes no constraint
    pub fn matches(&self, share: &RewardShareData) -> bool {
        (self.minters.is_empty() || self.minters.contains(&share.minting_account))
            && (self.recipients.is_empty() || self.recipients.contains(&share.recipient))
            && (self.involving.is_empty()
                || self.involving.iter().any(|address| share.involves(address)))
    }
}

// =============================================================================
// Manager
// =============================================================================

/// Counts open sessions; decremented when the token drops
struct SessionToken {
    open_sessions: Arc<AtomicUsize>,
}

impl SessionToken {
    fn acquire(open_sessions: &Arc<AtomicUsize>) -> Self {
        open_sessions.fetch_add(1, Ordering::SeqCst);
        Self {
            open_sessions: open_sessions.clone(),
        }
    }
}

impl Drop for SessionToken {
    fn drop(&mut self) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
        log::trace!("Repository session released");
    }
}

/// Hands out repository sessions
#[derive(Debug)]
pub struct RepositoryManager {
    state: Arc<RwLock<RepositoryState>>,
    closed: AtomicBool,
    open_sessions: Arc<AtomicUsize>,
}

impl RepositoryManager {
    pub fn new(state: RepositoryState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            closed: AtomicBool::new(false),
            open_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Repository with no data
    pub fn empty() -> Self {
        Self::new(RepositoryState::default())
    }

    /// Open a read session
    pub async fn session(&self) -> Result<RepositorySession, RepositoryError> {
        self.check_open()?;
        let guard = self.state.clone().read_owned().await;
        log::trace!("Repository session opened");
        Ok(RepositorySession {
            state: guard,
            _token: SessionToken::acquire(&self.open_sessions),
        })
    }

    /// Open a write session
    pub async fn write(&self) -> Result<WriteSession, RepositoryError> {
        self.check_open()?;
        let guard = self.state.clone().write_owned().await;
        Ok(WriteSession {
            state: guard,
            _token: SessionToken::acquire(&self.open_sessions),
        })
    }

    /// Copy of the full state, for persistence
    pub async fn export(&self) -> Result<RepositoryState, RepositoryError> {
        let session = self.session().await?;
        Ok((*session.state).clone())
    }

    /// Refuse new sessions from now on
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of sessions currently held
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> Result<(), RepositoryError> {
        if self.is_closed() {
            return Err(RepositoryError::Closed);
        }
        Ok(())
    }
}

// =============================================================================
// Read Session
// =============================================================================

/// A read-only snapshot of the repository for one request
pub struct RepositorySession {
    state: OwnedRwLockReadGuard<RepositoryState>,
    _token: SessionToken,
}

impl RepositorySession {
    pub fn accounts(&self) -> AccountRepository<'_> {
        AccountRepository { state: &self.state }
    }

    pub fn transactions(&self) -> TransactionRepository<'_> {
        TransactionRepository { session: self }
    }

    pub fn unconfirmed(&self) -> UnconfirmedRepository<'_> {
        UnconfirmedRepository { state: &self.state }
    }
}

/// Account, balance and reward-share queries
pub struct AccountRepository<'s> {
    state: &'s RepositoryState,
}

impl<'s> AccountRepository<'s> {
    pub fn get(&self, address: &str) -> Option<AccountData> {
        self.state.accounts.get(address).cloned()
    }

    /// Confirmed balance; unknown accounts have zero
    pub fn balance(&self, address: &str, asset_id: i64) -> Amount {
        self.state
            .balances
            .get(address)
            .and_then(|assets| assets.get(&asset_id))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Reward share identified by its reward-share public key
    pub fn get_reward_share(&self, reward_share_public_key: &[u8]) -> Option<RewardShareData> {
        self.state
            .reward_shares
            .iter()
            .find(|share| share.reward_share_public_key == reward_share_public_key)
            .cloned()
    }

    /// Reward share between a minter and a recipient, if any
    pub fn reward_share_for(
        &self,
        minter_public_key: &[u8],
        recipient: &str,
    ) -> Option<RewardShareData> {
        self.state
            .reward_shares
            .iter()
            .find(|share| {
                share.minter_public_key == minter_public_key && share.recipient == recipient
            })
            .cloned()
    }

    /// Reward shares matching `criteria`
    ///
    /// Ordered by recipient, then share percent, then reward-share public
    /// key; `reverse` flips the whole order.
    pub fn find_reward_shares(&self, criteria: &RewardShareCriteria) -> Vec<RewardShareData> {
        let mut shares: Vec<&RewardShareData> = self
            .state
            .reward_shares
            .iter()
            .filter(|share| criteria.matches(share))
            .collect();

        shares.sort_by(|a, b| {
            a.recipient
                .cmp(&b.recipient)
                .then(a.share_percent.cmp(&b.share_percent))
                .then(a.reward_share_public_key.cmp(&b.reward_share_public_key))
        });

        if criteria.reverse {
            shares.reverse();
        }

        shares
            .into_iter()
            .skip(criteria.offset)
            .take(criteria.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

/// Materializes transactions against this session
pub struct TransactionRepository<'s> {
    session: &'s RepositorySession,
}

impl<'s> TransactionRepository<'s> {
    pub fn from_data(&self, data: RewardShareTransactionData) -> RewardShareTransaction<'s> {
        RewardShareTransaction::new(self.session, data)
    }
}

/// Queries over pending transactions
pub struct UnconfirmedRepository<'s> {
    state: &'s RepositoryState,
}

impl<'s> UnconfirmedRepository<'s> {
    /// Signature of the most recent pending transaction created by `address`
    pub fn last_reference_for(&self, address: &str) -> Option<Vec<u8>> {
        self.state
            .unconfirmed
            .iter()
            .rev()
            .find(|tx| tx.creator_address().as_deref() == Some(address))
            .map(|tx| tx.signature.clone())
    }

    /// Number of pending transactions created by `address`
    pub fn count_for(&self, address: &str) -> usize {
        self.state
            .unconfirmed
            .iter()
            .filter(|tx| tx.creator_address().as_deref() == Some(address))
            .count()
    }
}

// =============================================================================
// Write Session
// =============================================================================

/// Exclusive write access, used by bootstrap and import paths
pub struct WriteSession {
    state: OwnedRwLockWriteGuard<RepositoryState>,
    _token: SessionToken,
}

impl WriteSession {
    /// Insert or replace an account
    pub fn save_account(&mut self, account: AccountData) {
        self.state.accounts.insert(account.address.clone(), account);
    }

    pub fn set_balance(&mut self, address: &str, asset_id: i64, balance: Amount) {
        self.state
            .balances
            .entry(address.to_string())
            .or_default()
            .insert(asset_id, balance);
    }

    /// Insert a reward share, replacing any existing share for the same
    /// (minter, recipient) pair
    pub fn save_reward_share(&mut self, share: RewardShareData) {
        self.state.reward_shares.retain(|existing| {
            !(existing.minter_public_key == share.minter_public_key
                && existing.recipient == share.recipient)
        });
        self.state.reward_shares.push(share);
    }

    /// Remove a reward share, returning whether one existed
    pub fn delete_reward_share(&mut self, reward_share_public_key: &[u8]) -> bool {
        let before = self.state.reward_shares.len();
        self.state
            .reward_shares
            .retain(|share| share.reward_share_public_key != reward_share_public_key);
        self.state.reward_shares.len() != before
    }

    /// Add a pending transaction
    pub fn add_unconfirmed(&mut self, tx: TransactionData) -> Result<(), RepositoryError> {
        if self.contains_signature(&tx.signature) {
            return Err(RepositoryError::Data(
                "transaction already exists".to_string(),
            ));
        }

        // Stay sorted by timestamp; equal timestamps keep arrival order
        let position = self
            .state
            .unconfirmed
            .partition_point(|existing| existing.timestamp <= tx.timestamp);
        self.state.unconfirmed.insert(position, tx);
        Ok(())
    }

    /// Move a pending transaction into the confirmed set, advancing the
    /// creator's reference and charging the fee
    pub fn confirm(&mut self, signature: &[u8]) -> Result<(), RepositoryError> {
        let index = self
            .state
            .unconfirmed
            .iter()
            .position(|tx| tx.signature == signature)
            .ok_or_else(|| RepositoryError::Data("unknown unconfirmed transaction".to_string()))?;

        let tx = self.state.unconfirmed.remove(index);
        let creator = tx
            .creator_address()
            .ok_or_else(|| RepositoryError::Data("malformed creator public key".to_string()))?;

        let mut account = self
            .state
            .accounts
            .get(&creator)
            .cloned()
            .unwrap_or_else(|| AccountData::new(&creator));
        account.reference = Some(tx.signature.clone());
        account.public_key = Some(tx.creator_public_key.clone());
        self.save_account(account);

        let balance = self
            .state
            .balances
            .get(&creator)
            .and_then(|assets| assets.get(&QORT_ASSET_ID))
            .copied()
            .unwrap_or(Amount::ZERO);
        let remaining = balance
            .checked_sub(tx.fee)
            .ok_or_else(|| RepositoryError::Data("fee overflow".to_string()))?;
        self.set_balance(&creator, QORT_ASSET_ID, remaining);

        self.state.transactions.push(tx);
        Ok(())
    }

    fn contains_signature(&self, signature: &[u8]) -> bool {
        self.state
            .transactions
            .iter()
            .chain(self.state.unconfirmed.iter())
            .any(|tx| tx.signature == signature)
    }
}
