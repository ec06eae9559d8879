//! REST API handlers for account and reward-share operations

use crate::api::error::ApiError;
use crate::config::Settings;
use crate::core::{
    AccountData, AccountView, OnlineAccountsProvider, RewardShareData,
    RewardShareTransactionData, ValidationResult, QORT_ASSET_ID,
};
use crate::crypto::codec::{self, base58_bytes};
use crate::crypto::{is_valid_address, public_key_to_address, reward_share_private_key};
use crate::storage::{RepositoryManager, RewardShareCriteria};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Sentinel returned by scalar endpoints when there is nothing to return
const FALSE: &str = "false";

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub repository: Arc<RepositoryManager>,
    pub online_accounts: Arc<OnlineAccountsProvider>,
    pub settings: Arc<Settings>,
}

impl ApiState {
    pub fn new(
        repository: Arc<RepositoryManager>,
        online_accounts: Arc<OnlineAccountsProvider>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            repository,
            online_accounts,
            settings,
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// An online minter joined with its reward share
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOnlineAccount {
    pub timestamp: i64,
    #[serde(with = "base58_bytes")]
    pub signature: Vec<u8>,
    #[serde(with = "base58_bytes")]
    pub reward_share_public_key: Vec<u8>,
    pub minter_address: String,
    pub recipient_address: String,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardShareKeyRequest {
    pub minting_account_private_key: Option<String>,
    pub recipient_account_public_key: Option<String>,
}

fn require_valid_address(address: &str) -> Result<(), ApiError> {
    if !is_valid_address(address) {
        return Err(ApiError::InvalidAddress);
    }
    Ok(())
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::Json(rejection.body_text()))
}

// ============================================================================
// Account Handlers
// ============================================================================

/// GET /addresses/{address} - Account information, reflecting pending transactions
pub async fn get_account_info(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Result<Json<AccountData>, ApiError> {
    require_valid_address(&address)?;

    let session = state.repository.session().await?;
    let account = AccountView::new(&session).effective_account(&address);

    Ok(Json(account))
}

/// GET /addresses/lastreference/{address} - Reference for the next transaction
pub async fn get_last_reference(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Result<String, ApiError> {
    require_valid_address(&address)?;

    let session = state.repository.session().await?;
    let reference = AccountView::new(&session).last_reference(&address);

    Ok(match reference {
        Some(reference) => codec::encode(&reference),
        None => FALSE.to_string(),
    })
}

/// GET /addresses/validate/{address} - Whether an address is valid
pub async fn validate_address(Path(address): Path<String>) -> String {
    is_valid_address(&address).to_string()
}

/// GET /addresses/balance/{address} - Confirmed QORT balance
pub async fn get_balance(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Result<String, ApiError> {
    require_valid_address(&address)?;

    let session = state.repository.session().await?;
    let balance = session.accounts().balance(&address, QORT_ASSET_ID);

    Ok(balance.to_string())
}

/// GET /addresses/balance/{address}/{confirmations}
pub async fn get_balance_with_confirmations(
    Path((_address, _confirmations)): Path<(String, String)>,
) -> Result<String, ApiError> {
    Err(ApiError::Unsupported)
}

/// GET /addresses/publickey/{address} - Public key, if the account has revealed it
pub async fn get_public_key(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Result<String, ApiError> {
    require_valid_address(&address)?;

    let session = state.repository.session().await?;
    let public_key = session
        .accounts()
        .get(&address)
        .and_then(|account| account.public_key);

    Ok(match public_key {
        Some(public_key) => codec::encode(&public_key),
        None => FALSE.to_string(),
    })
}

/// GET /addresses/convert/{publickey} - Address for a public key
pub async fn from_public_key(
    State(state): State<ApiState>,
    Path(public_key): Path<String>,
) -> Result<String, ApiError> {
    if state.settings.api_restricted {
        return Err(ApiError::NonProduction);
    }

    let public_key =
        codec::decode_public_key(&public_key).map_err(|_| ApiError::InvalidPublicKey)?;

    let _session = state.repository.session().await?;
    Ok(public_key_to_address(&public_key))
}

// ============================================================================
// Online Accounts
// ============================================================================

/// GET /addresses/online - Online minters with their reward-share parties
pub async fn get_online_accounts(
    State(state): State<ApiState>,
) -> Result<Json<Vec<ApiOnlineAccount>>, ApiError> {
    let records = state.online_accounts.snapshot().await;

    let session = state.repository.session().await?;
    let accounts = session.accounts();

    let online = records
        .iter()
        .map(|record| {
            let share = accounts
                .get_reward_share(&record.public_key)
                .ok_or_else(|| {
                    log::error!(
                        "Online account {} has no reward share",
                        codec::encode(&record.public_key)
                    );
                    ApiError::PublicKeyNotFound
                })?;

            Ok(ApiOnlineAccount {
                timestamp: record.timestamp,
                signature: record.signature.clone(),
                reward_share_public_key: record.public_key.clone(),
                minter_address: share.minting_account,
                recipient_address: share.recipient,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(Json(online))
}

// ============================================================================
// Reward Share Handlers
// ============================================================================

/// Build listing criteria from raw query pairs
///
/// `minters`, `recipients` and `involving` may repeat. A `limit` of zero or
/// above `max_results` becomes `max_results`.
pub fn parse_reward_share_criteria(
    params: &[(String, String)],
    max_results: usize,
) -> Result<RewardShareCriteria, ApiError> {
    let mut criteria = RewardShareCriteria {
        limit: Some(max_results),
        ..Default::default()
    };

    for (key, value) in params {
        match key.as_str() {
            // Unknown addresses simply match nothing
            "minters" | "recipients" | "involving" => {
                let list = match key.as_str() {
                    "minters" => &mut criteria.minters,
                    "recipients" => &mut criteria.recipients,
                    _ => &mut criteria.involving,
                };
                list.push(value.clone());
            }
            "limit" => {
                let limit = parse_non_negative("limit", value)?;
                criteria.limit = Some(if limit == 0 {
                    max_results
                } else {
                    limit.min(max_results)
                });
            }
            "offset" => criteria.offset = parse_non_negative("offset", value)?,
            "reverse" => {
                criteria.reverse = value
                    .parse::<bool>()
                    .map_err(|_| ApiError::InvalidCriteria(format!("reverse: {}", value)))?;
            }
            _ => {}
        }
    }

    Ok(criteria)
}

fn parse_non_negative(name: &str, value: &str) -> Result<usize, ApiError> {
    let parsed = value
        .parse::<i64>()
        .map_err(|_| ApiError::InvalidCriteria(format!("{}: {}", name, value)))?;
    usize::try_from(parsed)
        .map_err(|_| ApiError::InvalidCriteria(format!("{} must not be negative", name)))
}

/// GET /addresses/rewardshares - List reward shares
pub async fn get_reward_shares(
    State(state): State<ApiState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<RewardShareData>>, ApiError> {
    let criteria = parse_reward_share_criteria(&params, state.settings.api_max_results)?;

    let session = state.repository.session().await?;
    let shares = session.accounts().find_reward_shares(&criteria);

    Ok(Json(shares))
}

/// POST /addresses/rewardsharekey - Derive a reward-share private key
pub async fn calculate_reward_share_key(
    body: Result<Json<RewardShareKeyRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let request = json_body(body)?;

    let private_key = request
        .minting_account_private_key
        .as_deref()
        .ok_or(ApiError::InvalidPrivateKey)
        .and_then(|key| codec::decode_private_key(key).map_err(|_| ApiError::InvalidPrivateKey))?;

    let public_key = request
        .recipient_account_public_key
        .as_deref()
        .ok_or(ApiError::InvalidPublicKey)
        .and_then(|key| codec::decode_public_key(key).map_err(|_| ApiError::InvalidPublicKey))?;

    let key = reward_share_private_key(&private_key, &public_key);
    Ok(codec::encode(&key))
}

/// POST /addresses/rewardshare - Validate and encode an unsigned REWARD_SHARE
pub async fn build_reward_share(
    State(state): State<ApiState>,
    body: Result<Json<RewardShareTransactionData>, JsonRejection>,
) -> Result<String, ApiError> {
    if state.settings.api_restricted {
        return Err(ApiError::NonProduction);
    }

    let data = json_body(body)?;

    let session = state.repository.session().await?;
    let transaction = session.transactions().from_data(data);

    let result = transaction.validate_unconfirmed(&state.settings, Utc::now().timestamp_millis());
    if result != ValidationResult::Ok {
        return Err(ApiError::TransactionInvalid(result));
    }

    let bytes = transaction.to_bytes()?;
    Ok(codec::encode(&bytes))
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform;
    use crate::core::{
        Amount, OnlineAccountRecord, TransactionData, TransactionType, REWARD_SHARE_LENGTH,
    };
    use crate::crypto::PrivateKeyAccount;

    const ONLINE_TIMESTAMP: i64 = 5 * 60 * 1000 * 100;

    struct Fixture {
        state: ApiState,
        minter: PrivateKeyAccount,
        recipient: PrivateKeyAccount,
        reward_share_public_key: [u8; 32],
    }

    fn reward_share_public_key(
        minter: &PrivateKeyAccount,
        recipient: &PrivateKeyAccount,
    ) -> [u8; 32] {
        let private_key = minter.reward_share_private_key(&recipient.public_key());
        PrivateKeyAccount::from_private_key(&private_key).public_key()
    }

    async fn fixture(settings: Settings) -> Fixture {
        let minter = PrivateKeyAccount::from_private_key(&[1u8; 32]);
        let recipient = PrivateKeyAccount::from_private_key(&[2u8; 32]);
        let share_key = reward_share_public_key(&minter, &recipient);

        let repository = RepositoryManager::empty();
        {
            let mut write = repository.write().await.unwrap();
            let mut account = AccountData::with_public_key(&minter.public_key());
            account.reference = Some(vec![9u8; 64]);
            account.level = 1;
            write.save_account(account);
            write.set_balance(&minter.address(), QORT_ASSET_ID, Amount::from_whole(10).unwrap());
            write.save_reward_share(RewardShareData::new(
                &minter.public_key(),
                &recipient.address(),
                &share_key,
                Amount::from_whole(20).unwrap(),
            ));
        }

        let online = OnlineAccountsProvider::from_settings(&settings);
        Fixture {
            state: ApiState::new(Arc::new(repository), Arc::new(online), Arc::new(settings)),
            minter,
            recipient,
            reward_share_public_key: share_key,
        }
    }

    async fn add_pending(state: &ApiState, creator: &PrivateKeyAccount, signature: u8) {
        let mut write = state.repository.write().await.unwrap();
        write
            .add_unconfirmed(TransactionData {
                tx_type: TransactionType::Payment,
                timestamp: Utc::now().timestamp_millis(),
                tx_group_id: 0,
                reference: Some(vec![9u8; 64]),
                creator_public_key: creator.public_key().to_vec(),
                fee: Amount::from_units(100_000),
                signature: vec![signature; 64],
            })
            .unwrap();
    }

    /// A valid new reward share from the fixture minter to a third account
    fn new_share_request(fixture: &Fixture) -> RewardShareTransactionData {
        let third = PrivateKeyAccount::from_private_key(&[3u8; 32]);
        RewardShareTransactionData {
            timestamp: Utc::now().timestamp_millis(),
            tx_group_id: 0,
            reference: Some(vec![9u8; 64]),
            minter_public_key: fixture.minter.public_key().to_vec(),
            recipient: third.address(),
            reward_share_public_key: reward_share_public_key(&fixture.minter, &third).to_vec(),
            share_percent: Amount::from_whole(5).unwrap(),
            fee: Amount::from_units(100_000),
        }
    }

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_validate_address() {
        let f = fixture(Settings::default()).await;

        assert_eq!(validate_address(Path("Qx-invalid".to_string())).await, "false");
        assert_eq!(validate_address(Path(String::new())).await, "false");
        assert_eq!(validate_address(Path(f.minter.address())).await, "true");

        let mut tampered = codec::decode(&f.minter.address()).unwrap();
        tampered[24] ^= 0xff;
        assert_eq!(validate_address(Path(codec::encode(&tampered))).await, "false");
        assert_eq!(validate_address(Path(codec::encode(&tampered[..24]))).await, "false");
    }

    #[tokio::test]
    async fn test_get_account_info_unknown_address() {
        let f = fixture(Settings::default()).await;
        let fresh = PrivateKeyAccount::from_private_key(&[42u8; 32]).address();

        let Json(account) = get_account_info(State(f.state.clone()), Path(fresh.clone()))
            .await
            .unwrap();
        assert_eq!(account.address, fresh);
        assert!(account.reference.is_none());
        assert!(account.public_key.is_none());
    }

    #[tokio::test]
    async fn test_get_account_info_reflects_pending() {
        let f = fixture(Settings::default()).await;

        let Json(account) = get_account_info(State(f.state.clone()), Path(f.minter.address()))
            .await
            .unwrap();
        assert_eq!(account.reference, Some(vec![9u8; 64]));

        add_pending(&f.state, &f.minter, 7).await;

        let Json(account) = get_account_info(State(f.state.clone()), Path(f.minter.address()))
            .await
            .unwrap();
        assert_eq!(account.reference, Some(vec![7u8; 64]));
        assert_eq!(account.level, 1);
    }

    #[tokio::test]
    async fn test_get_account_info_invalid_address() {
        let f = fixture(Settings::default()).await;
        let result = get_account_info(State(f.state.clone()), Path("Qbogus".to_string())).await;
        assert!(matches!(result, Err(ApiError::InvalidAddress)));
        assert_eq!(f.state.repository.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_get_last_reference() {
        let f = fixture(Settings::default()).await;
        let fresh = PrivateKeyAccount::from_private_key(&[42u8; 32]).address();

        let reference = get_last_reference(State(f.state.clone()), Path(fresh)).await.unwrap();
        assert_eq!(reference, "false");

        let reference = get_last_reference(State(f.state.clone()), Path(f.minter.address()))
            .await
            .unwrap();
        assert_eq!(reference, codec::encode(&[9u8; 64]));

        add_pending(&f.state, &f.minter, 7).await;
        let reference = get_last_reference(State(f.state.clone()), Path(f.minter.address()))
            .await
            .unwrap();
        assert_eq!(reference, codec::encode(&[7u8; 64]));
    }

    #[tokio::test]
    async fn test_get_balance() {
        let f = fixture(Settings::default()).await;

        let balance = get_balance(State(f.state.clone()), Path(f.minter.address()))
            .await
            .unwrap();
        assert_eq!(balance, "10.00000000");

        let balance = get_balance(State(f.state.clone()), Path(f.recipient.address()))
            .await
            .unwrap();
        assert_eq!(balance, "0.00000000");

        let result =
            get_balance_with_confirmations(Path((f.minter.address(), "3".to_string()))).await;
        assert!(matches!(result, Err(ApiError::Unsupported)));
    }

    #[tokio::test]
    async fn test_get_public_key() {
        let f = fixture(Settings::default()).await;

        let key = get_public_key(State(f.state.clone()), Path(f.minter.address()))
            .await
            .unwrap();
        assert_eq!(key, codec::encode(&f.minter.public_key()));

        let key = get_public_key(State(f.state.clone()), Path(f.recipient.address()))
            .await
            .unwrap();
        assert_eq!(key, "false");
    }

    #[tokio::test]
    async fn test_from_public_key() {
        let f = fixture(Settings::default()).await;

        let address = from_public_key(
            State(f.state.clone()),
            Path(codec::encode(&f.minter.public_key())),
        )
        .await
        .unwrap();
        assert_eq!(address, f.minter.address());
        assert!(is_valid_address(&address));

        for len in [31usize, 33] {
            let result =
                from_public_key(State(f.state.clone()), Path(codec::encode(&vec![5u8; len]))).await;
            assert!(matches!(result, Err(ApiError::InvalidPublicKey)));
        }

        let result = from_public_key(State(f.state.clone()), Path("0OIl".to_string())).await;
        assert!(matches!(result, Err(ApiError::InvalidPublicKey)));
    }

    #[tokio::test]
    async fn test_restricted_mode() {
        let f = fixture(Settings::restricted()).await;

        let result = from_public_key(State(f.state.clone()), Path("anything".to_string())).await;
        assert!(matches!(result, Err(ApiError::NonProduction)));

        let request = new_share_request(&f);
        let result = build_reward_share(State(f.state.clone()), Ok(Json(request))).await;
        assert!(matches!(result, Err(ApiError::NonProduction)));
    }

    #[tokio::test]
    async fn test_get_online_accounts() {
        let f = fixture(Settings::default()).await;

        let Json(online) = get_online_accounts(State(f.state.clone())).await.unwrap();
        assert!(online.is_empty());

        f.state
            .online_accounts
            .upsert(OnlineAccountRecord {
                timestamp: ONLINE_TIMESTAMP,
                signature: vec![8u8; 64],
                public_key: f.reward_share_public_key.to_vec(),
            })
            .await;

        let Json(online) = get_online_accounts(State(f.state.clone())).await.unwrap();
        assert_eq!(online.len(), 1);
        assert_eq!(online[0].timestamp, ONLINE_TIMESTAMP);
        assert_eq!(online[0].minter_address, f.minter.address());
        assert_eq!(online[0].recipient_address, f.recipient.address());

        let json = serde_json::to_value(&online[0]).unwrap();
        assert_eq!(
            json["rewardSharePublicKey"],
            codec::encode(&f.reward_share_public_key)
        );
    }

    #[tokio::test]
    async fn test_get_online_accounts_keeps_snapshot_order() {
        let f = fixture(Settings::default()).await;
        let high_key = [0xf0u8; 32];
        let low_key = [0x01u8; 32];
        let carol = PrivateKeyAccount::from_private_key(&[3u8; 32]).address();
        let dave = PrivateKeyAccount::from_private_key(&[4u8; 32]).address();
        let bob = f.recipient.address();

        {
            let mut write = f.state.repository.write().await.unwrap();
            let percent = Amount::from_whole(5).unwrap();
            write.save_reward_share(RewardShareData::new(
                &f.minter.public_key(),
                &carol,
                &high_key,
                percent,
            ));
            write.save_reward_share(RewardShareData::new(
                &f.minter.public_key(),
                &dave,
                &low_key,
                percent,
            ));
        }

        // Arrival order: high key, fixture key, low key
        for (key, signature) in [
            (high_key.to_vec(), 1u8),
            (f.reward_share_public_key.to_vec(), 2),
            (low_key.to_vec(), 3),
        ] {
            assert!(
                f.state
                    .online_accounts
                    .upsert(OnlineAccountRecord {
                        timestamp: ONLINE_TIMESTAMP,
                        signature: vec![signature; 64],
                        public_key: key,
                    })
                    .await
            );
        }

        // Refreshing a record keeps its position
        let refreshed = ONLINE_TIMESTAMP + 5 * 60 * 1000;
        assert!(
            f.state
                .online_accounts
                .upsert(OnlineAccountRecord {
                    timestamp: refreshed,
                    signature: vec![4u8; 64],
                    public_key: high_key.to_vec(),
                })
                .await
        );

        let Json(online) = get_online_accounts(State(f.state.clone())).await.unwrap();
        let recipients: Vec<&str> = online
            .iter()
            .map(|account| account.recipient_address.as_str())
            .collect();
        assert_eq!(
            recipients,
            vec![carol.as_str(), bob.as_str(), dave.as_str()]
        );
        assert_eq!(online[0].timestamp, refreshed);
        assert_eq!(online[0].signature, vec![4u8; 64]);
        assert_eq!(online[2].reward_share_public_key, low_key.to_vec());
        assert_eq!(f.state.repository.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_get_online_accounts_join_miss() {
        let f = fixture(Settings::default()).await;
        f.state
            .online_accounts
            .upsert(OnlineAccountRecord {
                timestamp: ONLINE_TIMESTAMP,
                signature: vec![8u8; 64],
                public_key: vec![77u8; 32],
            })
            .await;

        let result = get_online_accounts(State(f.state.clone())).await;
        assert!(matches!(result, Err(ApiError::PublicKeyNotFound)));
        assert_eq!(f.state.repository.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_repository_issue() {
        let f = fixture(Settings::default()).await;
        f.state.repository.close();

        let result = get_account_info(State(f.state.clone()), Path(f.minter.address())).await;
        match result {
            Err(err) => assert_eq!(err.code(), 5),
            Ok(_) => panic!("expected repository issue"),
        }
    }

    #[test]
    fn test_parse_reward_share_criteria() {
        let minter = PrivateKeyAccount::from_private_key(&[1u8; 32]).address();
        let other = PrivateKeyAccount::from_private_key(&[2u8; 32]).address();

        let criteria = parse_reward_share_criteria(&[], 1000).unwrap();
        assert_eq!(criteria.limit, Some(1000));
        assert_eq!(criteria.offset, 0);
        assert!(!criteria.reverse);

        let criteria = parse_reward_share_criteria(
            &params(&[
                ("recipients", minter.as_str()),
                ("recipients", other.as_str()),
                ("limit", "5000"),
                ("offset", "3"),
                ("reverse", "true"),
            ]),
            1000,
        )
        .unwrap();
        assert_eq!(criteria.recipients, vec![minter.clone(), other]);
        assert_eq!(criteria.limit, Some(1000));
        assert_eq!(criteria.offset, 3);
        assert!(criteria.reverse);

        let criteria = parse_reward_share_criteria(&params(&[("limit", "0")]), 50).unwrap();
        assert_eq!(criteria.limit, Some(50));
    }

    #[test]
    fn test_parse_reward_share_criteria_errors() {
        for pairs in [
            [("limit", "-1")],
            [("limit", "ten")],
            [("offset", "-5")],
            [("reverse", "maybe")],
        ] {
            let result = parse_reward_share_criteria(&params(&pairs), 1000);
            assert!(matches!(result, Err(ApiError::InvalidCriteria(_))), "{:?}", pairs);
        }
    }

    #[tokio::test]
    async fn test_get_reward_shares_unmatched_address_filters() {
        let f = fixture(Settings::default()).await;

        for key in ["minters", "recipients", "involving"] {
            let Json(shares) = get_reward_shares(
                State(f.state.clone()),
                Query(params(&[(key, "Qbogus")])),
            )
            .await
            .unwrap();
            assert!(shares.is_empty(), "{}", key);
        }

        let criteria =
            parse_reward_share_criteria(&params(&[("minters", "Qbogus")]), 1000).unwrap();
        assert_eq!(criteria.minters, vec!["Qbogus".to_string()]);
        assert_eq!(f.state.repository.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_get_reward_shares() {
        let f = fixture(Settings::default()).await;

        let Json(shares) = get_reward_shares(State(f.state.clone()), Query(Vec::new()))
            .await
            .unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].minting_account, f.minter.address());

        let recipient = f.recipient.address();
        let Json(shares) = get_reward_shares(
            State(f.state.clone()),
            Query(params(&[("involving", recipient.as_str())])),
        )
        .await
        .unwrap();
        assert_eq!(shares.len(), 1);

        let third = PrivateKeyAccount::from_private_key(&[3u8; 32]).address();
        let Json(shares) = get_reward_shares(
            State(f.state.clone()),
            Query(params(&[("minters", third.as_str())])),
        )
        .await
        .unwrap();
        assert!(shares.is_empty());
    }

    #[tokio::test]
    async fn test_calculate_reward_share_key() {
        let minter = PrivateKeyAccount::from_private_key(&[1u8; 32]);
        let recipient = PrivateKeyAccount::from_private_key(&[2u8; 32]);
        let request = RewardShareKeyRequest {
            minting_account_private_key: Some(codec::encode(&minter.private_key())),
            recipient_account_public_key: Some(codec::encode(&recipient.public_key())),
        };

        let first = calculate_reward_share_key(Ok(Json(request.clone()))).await.unwrap();
        let second = calculate_reward_share_key(Ok(Json(request))).await.unwrap();
        assert_eq!(first, second);

        let expected = minter.reward_share_private_key(&recipient.public_key());
        assert_eq!(codec::decode(&first).unwrap(), expected.to_vec());
    }

    #[tokio::test]
    async fn test_calculate_reward_share_key_errors() {
        let recipient = codec::encode(&PrivateKeyAccount::from_private_key(&[2u8; 32]).public_key());

        let result = calculate_reward_share_key(Ok(Json(RewardShareKeyRequest {
            minting_account_private_key: None,
            recipient_account_public_key: Some(recipient.clone()),
        })))
        .await;
        assert!(matches!(result, Err(ApiError::InvalidPrivateKey)));

        let result = calculate_reward_share_key(Ok(Json(RewardShareKeyRequest {
            minting_account_private_key: Some(codec::encode(&[1u8; 31])),
            recipient_account_public_key: Some(recipient),
        })))
        .await;
        assert!(matches!(result, Err(ApiError::InvalidPrivateKey)));

        let result = calculate_reward_share_key(Ok(Json(RewardShareKeyRequest {
            minting_account_private_key: Some(codec::encode(&[1u8; 32])),
            recipient_account_public_key: Some(codec::encode(&[2u8; 33])),
        })))
        .await;
        assert!(matches!(result, Err(ApiError::InvalidPublicKey)));
    }

    #[tokio::test]
    async fn test_calculate_reward_share_key_accepts_any_32_byte_key() {
        for seed in 0u8..64 {
            let mut public_key = [seed; 32];
            public_key[31] &= 0x7f;

            let result = calculate_reward_share_key(Ok(Json(RewardShareKeyRequest {
                minting_account_private_key: Some(codec::encode(&[1u8; 32])),
                recipient_account_public_key: Some(codec::encode(&public_key)),
            })))
            .await
            .unwrap();

            let expected = reward_share_private_key(&[1u8; 32], &public_key);
            assert_eq!(codec::decode(&result).unwrap(), expected.to_vec());
        }
    }

    #[tokio::test]
    async fn test_build_reward_share() {
        let f = fixture(Settings::default()).await;
        let request = new_share_request(&f);

        let encoded = build_reward_share(State(f.state.clone()), Ok(Json(request.clone())))
            .await
            .unwrap();

        let bytes = codec::decode(&encoded).unwrap();
        assert_eq!(bytes.len(), REWARD_SHARE_LENGTH);
        assert_eq!(bytes, transform::to_bytes(&request).unwrap());
        assert_eq!(transform::from_bytes(&bytes).unwrap(), request);
        assert_eq!(f.state.repository.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_build_reward_share_insufficient_fee() {
        let f = fixture(Settings::default()).await;
        let mut request = new_share_request(&f);
        request.fee = Amount::from_units(1);

        let result = build_reward_share(State(f.state.clone()), Ok(Json(request))).await;
        match result {
            Err(ApiError::TransactionInvalid(tag)) => {
                assert_eq!(tag, ValidationResult::InsufficientFee)
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(f.state.repository.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_build_reward_share_chains_from_pending() {
        let f = fixture(Settings::default()).await;
        add_pending(&f.state, &f.minter, 7).await;

        let stale = new_share_request(&f);
        let result = build_reward_share(State(f.state.clone()), Ok(Json(stale.clone()))).await;
        assert!(matches!(
            result,
            Err(ApiError::TransactionInvalid(ValidationResult::InvalidReference))
        ));

        let chained = RewardShareTransactionData {
            reference: Some(vec![7u8; 64]),
            ..stale
        };
        assert!(build_reward_share(State(f.state.clone()), Ok(Json(chained)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "OK");
    }
}
