//! # models::position
//!
//! A user's current holding in one symbol: quantity + volume-weighted
//! average acquisition cost.
//!
//! Invariants enforced by the accounting engine:
//! - at most one row per (user, symbol) pair (UNIQUE constraint backs this),
//! - a row with quantity 0 must not exist — it is deleted on full sell,
//! - `avg_price` is re-averaged on buys and untouched by partial sells.

use serde::Serialize;

/// One row of the `positions` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Position {
    pub user_id: i64,
    pub symbol: String,
    /// Units held.  Always > 0 for a stored row.
    pub quantity: i64,
    /// Volume-weighted average acquisition cost per unit.
    pub avg_price: f64,
}
