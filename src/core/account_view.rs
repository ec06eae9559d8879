//! Unconfirmed-aware account view
//!
//! Clients building a follow-on transaction need the signature of the most
//! recent *pending* transaction as their reference, otherwise consecutive
//! submissions would share a reference and all but one would be rejected.

use crate::core::AccountData;
use crate::storage::RepositorySession;

/// Read-only account view over one repository session
pub struct AccountView<'s> {
    session: &'s RepositorySession,
}

impl<'s> AccountView<'s> {
    pub fn new(session: &'s RepositorySession) -> Self {
        Self { session }
    }

    /// Account data with the last reference taken from pending
    /// transactions when the account is already known
    pub fn effective_account(&self, address: &str) -> AccountData {
        match self.session.accounts().get(address) {
            None => AccountData::new(address),
            Some(mut account) => {
                if let Some(reference) = self.session.unconfirmed().last_reference_for(address) {
                    account.reference = Some(reference);
                }
                account
            }
        }
    }

    /// Reference for the next transaction created by `address`
    ///
    /// Pending transactions take priority over the confirmed reference.
    /// Empty references count as absent.
    pub fn last_reference(&self, address: &str) -> Option<Vec<u8>> {
        self.session
            .unconfirmed()
            .last_reference_for(address)
            .or_else(|| {
                self.session
                    .accounts()
                    .get(address)
                    .and_then(|account| account.reference)
            })
            .filter(|reference| !reference.is_empty())
    }
}
