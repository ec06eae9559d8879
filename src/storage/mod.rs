//! Storage module: transactional repository and persistence

pub mod persistence;
pub mod repository;

pub use persistence::{Storage, StorageConfig, StorageError};
pub use repository::{
    AccountRepository, RepositoryError, RepositoryManager, RepositorySession, RepositoryState,
    RewardShareCriteria, TransactionRepository, UnconfirmedRepository, WriteSession,
};
