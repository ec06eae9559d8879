//! REST API module
//!
//! Provides the HTTP account and reward-share API of the node.
//!
//! # Endpoints
//!
//! ## Accounts
//! - `GET /addresses/{address}` - Account information
//! - `GET /addresses/lastreference/{address}` - Reference for the next transaction
//! - `GET /addresses/validate/{address}` - Address validity
//! - `GET /addresses/publickey/{address}` - Public key or `false`
//! - `GET /addresses/convert/{publickey}` - Public key to address
//!
//! ## Balances
//! - `GET /addresses/balance/{address}` - Confirmed QORT balance
//! - `GET /addresses/balance/{address}/{confirmations}` - Unsupported
//!
//! ## Minting
//! - `GET /addresses/online` - Online minters
//! - `GET /addresses/rewardshares` - List reward shares
//! - `POST /addresses/rewardsharekey` - Derive a reward-share private key
//! - `POST /addresses/rewardshare` - Build an unsigned REWARD_SHARE transaction

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use handlers::ApiState;
pub use routes::create_router;
