//! # models::market
//!
//! The fixed equity catalog.  Read-only from the trading core's perspective —
//! there is no live feed, prices only change if the seed data changes.

use serde::Serialize;

/// One row of the `stocks` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    /// Current (simulated) market price per unit.
    pub price: f64,
    /// Last price-change percentage, display-only.
    pub change_pct: f64,
}
