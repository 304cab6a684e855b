//! # routes::market
//!
//! The catalog listing — every tradable equity with its current price.

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{error::AppError, models::Stock, state::SharedState};

// ─── GET /api/market ──────────────────────────────────────────────────────────

pub async fn list_stocks(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let stocks: Vec<Stock> = sqlx::query_as(
        "SELECT symbol, name, price, change_pct FROM stocks ORDER BY symbol",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({
        "ok":     true,
        "stocks": stocks,
    })))
}
