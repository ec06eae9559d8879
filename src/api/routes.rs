//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .nest("/addresses", address_routes())
        .with_state(state)
        .layer(cors)
}

fn address_routes() -> Router<ApiState> {
    Router::new()
        // Accounts
        .route("/{address}", get(handlers::get_account_info))
        .route("/lastreference/{address}", get(handlers::get_last_reference))
        .route("/validate/{address}", get(handlers::validate_address))
        .route("/publickey/{address}", get(handlers::get_public_key))
        .route("/convert/{publickey}", get(handlers::from_public_key))
        // Balances
        .route("/balance/{address}", get(handlers::get_balance))
        .route(
            "/balance/{address}/{confirmations}",
            get(handlers::get_balance_with_confirmations),
        )
        // Online minters
        .route("/online", get(handlers::get_online_accounts))
        // Reward shares
        .route("/rewardshares", get(handlers::get_reward_shares))
        .route("/rewardsharekey", post(handlers::calculate_reward_share_key))
        .route("/rewardshare", post(handlers::build_reward_share))
}
