//! CLI commands for the node
//!
//! Implements all command handlers for the CLI interface.

use crate::api::{create_router, ApiState};
use crate::config::{Settings, SettingsError};
use crate::core::OnlineAccountsProvider;
use crate::crypto::codec;
use crate::crypto::{is_valid_address, public_key_to_address, PrivateKeyAccount};
use crate::storage::{RepositoryManager, Storage, StorageConfig};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Command-line overrides applied on top of the settings file
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub restricted: bool,
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Load settings from an optional file, then apply overrides
pub fn load_settings(
    settings_file: Option<&Path>,
    overrides: &SettingsOverrides,
) -> Result<Settings, SettingsError> {
    let mut settings = match settings_file {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if overrides.restricted {
        settings.api_restricted = true;
    }
    if let Some(bind) = &overrides.bind {
        settings.api_bind = bind.clone();
    }
    if let Some(port) = overrides.port {
        settings.api_port = port;
    }

    settings.validate()?;
    Ok(settings)
}

/// Run the API server until Ctrl+C, then save the repository
pub async fn cmd_serve(data_dir: &Path, settings: Settings) -> CliResult<()> {
    let storage = Storage::new(StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    })?;

    if storage.exists() {
        println!("📂 Loading existing repository...");
    } else {
        println!("🆕 Creating new repository...");
    }
    let state = storage.load_or_default()?;

    let settings = Arc::new(settings);
    let repository = Arc::new(RepositoryManager::new(state));
    let online_accounts = Arc::new(OnlineAccountsProvider::from_settings(&settings));

    // Evict expired online records once per online window
    let eviction = online_accounts.clone();
    let period = Duration::from_millis(settings.online_timestamp_modulus_ms.max(1) as u64);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            eviction.evict_expired(Utc::now().timestamp_millis()).await;
        }
    });

    let app = create_router(ApiState::new(
        repository.clone(),
        online_accounts,
        settings.clone(),
    ));

    let addr = settings.api_listen_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!(
        "API listening on {} (restricted: {})",
        addr,
        settings.api_restricted
    );
    println!("🚀 REST API server starting on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("💾 Saving repository...");
    let state = repository.export().await?;
    repository.close();
    storage.save(&state)?;
    println!("✅ Repository saved to {}", data_dir.display());

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
    }
    println!("\n📴 Shutting down API server...");
}

/// Print the address for a Base58 public key
pub fn cmd_convert(public_key: &str) -> CliResult<()> {
    let public_key = codec::decode_public_key(public_key)?;
    println!("{}", public_key_to_address(&public_key));
    Ok(())
}

/// Report whether an address is valid
pub fn cmd_validate(address: &str) -> CliResult<()> {
    if is_valid_address(address) {
        println!("✅ {} is a valid address", address);
    } else {
        println!("❌ {} is not a valid address", address);
    }
    Ok(())
}

/// Print the reward-share private key for a minter and a recipient
pub fn cmd_reward_share_key(private_key: &str, public_key: &str) -> CliResult<()> {
    let minter = PrivateKeyAccount::from_private_key_base58(private_key)?;
    let public_key = codec::decode_public_key(public_key)?;
    let key = minter.reward_share_private_key(&public_key);

    let reward_share_account = PrivateKeyAccount::from_private_key(&key);
    println!("🔑 Reward-share key");
    println!("   ├─ Private key: {}", codec::encode(&key));
    println!(
        "   └─ Public key: {}",
        codec::encode(&reward_share_account.public_key())
    );
    Ok(())
}

/// Generate a new account
pub fn cmd_generate() -> CliResult<()> {
    let account = PrivateKeyAccount::generate();

    println!("🆕 New account");
    println!("   ├─ Address: {}", account.address());
    println!("   ├─ Public key: {}", codec::encode(&account.public_key()));
    println!("   └─ Private key: {}", codec::encode(&account.private_key()));
    println!("\n⚠️  Keep the private key secret!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_settings_defaults() {
        let settings = load_settings(None, &SettingsOverrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"apiPort": 9000, "apiBind": "0.0.0.0"}}"#).unwrap();

        let overrides = SettingsOverrides {
            restricted: true,
            bind: None,
            port: Some(9100),
        };
        let settings = load_settings(Some(file.path()), &overrides).unwrap();
        assert!(settings.api_restricted);
        assert_eq!(settings.api_bind, "0.0.0.0");
        assert_eq!(settings.api_port, 9100);
    }

    #[test]
    fn test_commands_reject_bad_keys() {
        assert!(cmd_convert("not-base58-0OIl").is_err());
        assert!(cmd_convert(&codec::encode(&[1u8; 31])).is_err());
        assert!(
            cmd_reward_share_key(&codec::encode(&[1u8; 32]), &codec::encode(&[2u8; 33])).is_err()
        );

        let recipient = PrivateKeyAccount::from_private_key(&[2u8; 32]);
        assert!(cmd_reward_share_key(
            &codec::encode(&[1u8; 32]),
            &codec::encode(&recipient.public_key())
        )
        .is_ok());
        assert!(cmd_validate("Qbogus").is_ok());
    }
}
