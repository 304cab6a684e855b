//! # engine::valuation
//!
//! **Valuation Service** — joins a user's positions against current catalog
//! prices to produce unrealized P/L per holding plus portfolio totals.
//!
//! Pure read-only projection.  Recomputed on every call — catalog prices are
//! the freshest data available, so there is nothing worth caching.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::AppError;

// ─── Holding ──────────────────────────────────────────────────────────────────

/// One position valued against the current catalog price.
#[derive(Debug, Clone, Serialize)]
pub struct Holding {
    pub symbol: String,
    pub name: String,
    pub quantity: i64,
    pub avg_price: f64,
    pub current_price: f64,
    /// `quantity * avg_price` — the cost basis.
    pub investment: f64,
    /// `quantity * current_price`.
    pub current_value: f64,
    /// `current_value - investment`.
    pub unrealized_pl: f64,
    /// Percentage P/L against the cost basis; 0 when the basis is 0.
    pub pl_percent: f64,
}

// ─── PortfolioSummary ─────────────────────────────────────────────────────────

/// The full valuation: every holding plus aggregated totals.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub holdings: Vec<Holding>,
    pub total_investment: f64,
    pub total_current_value: f64,
    pub total_pl: f64,
    /// 0 when `total_investment` is 0 (empty portfolio).
    pub total_pl_percent: f64,
}

#[derive(sqlx::FromRow)]
struct HoldingRow {
    symbol: String,
    name: String,
    quantity: i64,
    avg_price: f64,
    current_price: f64,
}

// ─── Value Portfolio ──────────────────────────────────────────────────────────

/// Value every position `user_id` holds against current catalog prices.
pub async fn value_portfolio(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<PortfolioSummary, AppError> {
    let rows: Vec<HoldingRow> = sqlx::query_as(
        "SELECT p.symbol, s.name, p.quantity, p.avg_price, s.price AS current_price
         FROM positions p
         JOIN stocks s ON p.symbol = s.symbol
         WHERE p.user_id = ?1
         ORDER BY p.symbol",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let holdings: Vec<Holding> = rows
        .into_iter()
        .map(|row| {
            let investment = row.quantity as f64 * row.avg_price;
            let current_value = row.quantity as f64 * row.current_price;
            let unrealized_pl = current_value - investment;
            let pl_percent = if investment == 0.0 {
                0.0
            } else {
                unrealized_pl / investment * 100.0
            };

            Holding {
                symbol: row.symbol,
                name: row.name,
                quantity: row.quantity,
                avg_price: row.avg_price,
                current_price: row.current_price,
                investment,
                current_value,
                unrealized_pl,
                pl_percent,
            }
        })
        .collect();

    let total_investment: f64 = holdings.iter().map(|h| h.investment).sum();
    let total_current_value: f64 = holdings.iter().map(|h| h.current_value).sum();
    let total_pl = total_current_value - total_investment;
    let total_pl_percent = if total_investment == 0.0 {
        0.0
    } else {
        total_pl / total_investment * 100.0
    };

    Ok(PortfolioSummary {
        holdings,
        total_investment,
        total_current_value,
        total_pl,
        total_pl_percent,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::engine::accounting::execute_trade;
    use crate::models::{TradeRequest, TradeSide};
    use approx::assert_relative_eq;
    use chrono::Utc;

    async fn seed_user(pool: &SqlitePool) -> i64 {
        sqlx::query(
            "INSERT INTO users (name, email, phone, password_hash, balance, created_at)
             VALUES ('Val User', 'val@example.com', '555-0101', 'x', 100000.0, ?1)",
        )
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("seed user");

        sqlx::query_scalar("SELECT id FROM users WHERE email = 'val@example.com'")
            .fetch_one(pool)
            .await
            .expect("user id")
    }

    #[tokio::test]
    async fn empty_portfolio_has_zero_totals_and_no_division() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        let summary = value_portfolio(&pool, user).await.unwrap();

        assert!(summary.holdings.is_empty());
        assert_relative_eq!(summary.total_investment, 0.0);
        assert_relative_eq!(summary.total_current_value, 0.0);
        assert_relative_eq!(summary.total_pl, 0.0);
        assert_relative_eq!(summary.total_pl_percent, 0.0);
    }

    #[tokio::test]
    async fn flat_prices_mean_zero_pl() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        // Bought at the catalog price and never repriced — P/L must be flat 0.
        execute_trade(
            &pool,
            user,
            &TradeRequest {
                symbol: "ITC".to_string(),
                side: TradeSide::Buy,
                quantity: 40,
            },
        )
        .await
        .unwrap();

        let summary = value_portfolio(&pool, user).await.unwrap();
        assert_eq!(summary.holdings.len(), 1);
        assert_relative_eq!(summary.total_investment, 40.0 * 412.75);
        assert_relative_eq!(summary.total_pl, 0.0);
        assert_relative_eq!(summary.total_pl_percent, 0.0);
    }

    #[tokio::test]
    async fn repriced_catalog_shows_unrealized_gain() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        // 100 units of SBIN @ 598.90
        execute_trade(
            &pool,
            user,
            &TradeRequest {
                symbol: "SBIN".to_string(),
                side: TradeSide::Buy,
                quantity: 100,
            },
        )
        .await
        .unwrap();

        sqlx::query("UPDATE stocks SET price = 650.0 WHERE symbol = 'SBIN'")
            .execute(&pool)
            .await
            .unwrap();

        let summary = value_portfolio(&pool, user).await.unwrap();
        let holding = &summary.holdings[0];

        // 598.90 is not exactly representable, so compare with tolerance.
        assert_relative_eq!(holding.investment, 59890.0, epsilon = 1e-6);
        assert_relative_eq!(holding.current_value, 65000.0);
        assert_relative_eq!(holding.unrealized_pl, 5110.0, epsilon = 1e-6);
        assert_relative_eq!(holding.pl_percent, 5110.0 / 59890.0 * 100.0, epsilon = 1e-6);

        assert_relative_eq!(summary.total_pl, 5110.0, epsilon = 1e-6);
        assert_relative_eq!(summary.total_pl_percent, holding.pl_percent);
    }

    #[tokio::test]
    async fn holdings_come_back_in_symbol_order() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        for symbol in ["WIPRO", "ITC", "SBIN"] {
            execute_trade(
                &pool,
                user,
                &TradeRequest {
                    symbol: symbol.to_string(),
                    side: TradeSide::Buy,
                    quantity: 1,
                },
            )
            .await
            .unwrap();
        }

        let summary = value_portfolio(&pool, user).await.unwrap();
        let symbols: Vec<&str> = summary.holdings.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["ITC", "SBIN", "WIPRO"]);
    }
}
