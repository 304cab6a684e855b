//! # models::transaction
//!
//! The immutable trade ledger.  One `TransactionRecord` is appended per
//! executed trade; rows are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── TradeSide ────────────────────────────────────────────────────────────────

/// Which way the trade goes.  Stored in the ledger as `"BUY"` / `"SELL"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

// ─── TransactionRecord ────────────────────────────────────────────────────────

/// One row of the `transactions` table.
///
/// `side` is kept as the raw ledger string so the row maps straight out of
/// sqlx; it always holds one of the two `TradeSide` spellings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TransactionRecord {
    pub id: i64,
    pub user_id: i64,
    pub symbol: String,
    pub side: String,
    pub quantity: i64,
    /// Execution price per unit at trade time.
    pub price: f64,
    /// `price * quantity`, denormalized for display.
    pub total: f64,
    pub executed_at: DateTime<Utc>,
}

// ─── TradeRequest ─────────────────────────────────────────────────────────────

/// Trade submission payload — `POST /api/trade`.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    pub side: TradeSide,
    /// Units to trade.  Must be a positive integer.
    pub quantity: i64,
}
