//! # routes::portfolio
//!
//! Valuation summary and the full transaction ledger.
//!
//! | Method | Path                          | Description                  |
//! |--------|-------------------------------|------------------------------|
//! | GET    | `/api/portfolio`              | Holdings + P/L totals        |
//! | GET    | `/api/portfolio/transactions` | Full ledger, newest first    |

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::{
    auth::AuthUser,
    engine::value_portfolio,
    error::AppError,
    models::TransactionRecord,
    state::SharedState,
};

// ─── GET /api/portfolio ───────────────────────────────────────────────────────

pub async fn get_portfolio(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let summary = value_portfolio(&state.pool, auth.user_id).await?;

    Ok(Json(json!({
        "ok":        true,
        "portfolio": summary,
    })))
}

// ─── GET /api/portfolio/transactions ──────────────────────────────────────────

pub async fn get_transactions(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let transactions: Vec<TransactionRecord> = sqlx::query_as(
        "SELECT * FROM transactions
         WHERE user_id = ?1
         ORDER BY executed_at DESC",
    )
    .bind(auth.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({
        "ok":           true,
        "transactions": transactions,
    })))
}
