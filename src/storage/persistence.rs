//! Repository persistence layer
//!
//! Saves and loads the repository state as JSON with rotating backups.

use crate::storage::repository::RepositoryState;
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub repository_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".node_data"),
            repository_file: "repository.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Repository storage manager
#[derive(Debug)]
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    fn repository_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.repository_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.repository_file, index))
    }

    /// Save the repository state to disk
    pub fn save(&self, state: &RepositoryState) -> Result<(), StorageError> {
        let path = self.repository_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Write to temporary file first
        let temp_path = self.config.data_dir.join("repository.tmp");
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, state)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    /// Load the repository state from disk
    pub fn load(&self) -> Result<RepositoryState, StorageError> {
        let path = self.repository_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Repository file not found".to_string(),
            ));
        }

        load_from_file(&path)
    }

    /// Load the saved state, or an empty one if nothing was saved yet
    pub fn load_or_default(&self) -> Result<RepositoryState, StorageError> {
        if self.exists() {
            self.load()
        } else {
            Ok(RepositoryState::default())
        }
    }

    /// Check if a saved repository exists
    pub fn exists(&self) -> bool {
        self.repository_path().exists()
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }
}

fn load_from_file(path: &Path) -> Result<RepositoryState, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}
