//! # routes::trade
//!
//! Trade submission — the only write path into the accounting engine —
//! plus the unauthenticated health probe.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::{
    auth::AuthUser,
    engine::execute_trade,
    error::AppError,
    models::{TradeRequest, TradeSide},
    state::SharedState,
};

// ─── POST /api/trade ──────────────────────────────────────────────────────────

/// Execute a buy or sell for the authenticated user.
///
/// The per-user trade lock is held across the whole engine call so two
/// concurrent trades by the same user cannot interleave their
/// read-modify-write on balance and average cost.
pub async fn submit_trade(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<TradeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let lock = state.trade_lock(auth.user_id).await;
    let _guard = lock.lock().await;

    let receipt = execute_trade(&state.pool, auth.user_id, &body).await?;

    // Post-trade navigation: back to the market after a buy, to the
    // portfolio after a sell.
    let redirect = match receipt.side {
        TradeSide::Buy => "/market",
        TradeSide::Sell => "/portfolio",
    };

    Ok(Json(json!({
        "ok":       true,
        "message":  format!("{} order executed successfully!", receipt.side.as_str()),
        "receipt":  receipt,
        "redirect": redirect,
    })))
}

// ─── GET /api/health ──────────────────────────────────────────────────────────

pub async fn health_check(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    // A cheap query proves the store is reachable, not just the process.
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&state.pool)
        .await?;
    let stocks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stocks")
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(json!({
        "ok":     true,
        "users":  users,
        "stocks": stocks,
    })))
}
