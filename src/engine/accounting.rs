//! # engine::accounting
//!
//! **Accounting Engine** — the buy/sell balance-and-position update routine.
//!
//! Everything happens inside one sqlx transaction: the balance debit/credit,
//! the position upsert/delete and the ledger append commit together or not
//! at all.  A failed trade therefore leaves no observable state change.
//!
//! Cost-basis conventions:
//! - a buy re-averages: `new_avg = (old_avg*old_qty + total) / (old_qty+qty)`
//! - a partial sell leaves the remaining lot's average cost unchanged
//! - a sell that empties the position deletes the row (an average cost for
//!   an empty holding is meaningless)

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::AppError;
use crate::models::{Position, TradeRequest, TradeSide};

// ─── TradeReceipt ─────────────────────────────────────────────────────────────

/// What the caller gets back after a committed trade.
#[derive(Debug, Clone, Serialize)]
pub struct TradeReceipt {
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: i64,
    /// Execution price per unit (the catalog price at trade time).
    pub price: f64,
    /// `price * quantity`.
    pub total: f64,
    /// Cash balance after the trade committed.
    pub new_balance: f64,
    pub executed_at: DateTime<Utc>,
}

// ─── Execute Trade ────────────────────────────────────────────────────────────

/// Execute one validated trade for `user_id`.
///
/// Preconditions checked here: positive quantity, known symbol, sufficient
/// balance (BUY) or sufficient held quantity (SELL).  Any violation returns
/// the matching [`AppError`] with the transaction rolled back.
pub async fn execute_trade(
    pool: &SqlitePool,
    user_id: i64,
    request: &TradeRequest,
) -> Result<TradeReceipt, AppError> {
    // ── 1. Validate quantity ──────────────────────────────────────────────────
    if request.quantity <= 0 {
        return Err(AppError::BadRequest(format!(
            "quantity must be a positive integer, got {}",
            request.quantity
        )));
    }

    let mut tx = pool.begin().await?;

    // ── 2. Price lookup ───────────────────────────────────────────────────────
    let price: f64 = sqlx::query_scalar("SELECT price FROM stocks WHERE symbol = ?1")
        .bind(&request.symbol)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::UnknownSymbol(request.symbol.clone()))?;

    let total = price * request.quantity as f64;

    let balance: f64 = sqlx::query_scalar("SELECT balance FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

    // ── 3. Balance + position updates ─────────────────────────────────────────
    let position: Option<Position> = sqlx::query_as(
        "SELECT user_id, symbol, quantity, avg_price
         FROM positions WHERE user_id = ?1 AND symbol = ?2",
    )
    .bind(user_id)
    .bind(&request.symbol)
    .fetch_optional(&mut *tx)
    .await?;

    let new_balance = match request.side {
        TradeSide::Buy => {
            if balance < total {
                return Err(AppError::InsufficientBalance {
                    required: total,
                    available: balance,
                });
            }

            match position {
                // Re-average the existing lot against the full buy total.
                Some(held) => {
                    let new_quantity = held.quantity + request.quantity;
                    let new_avg =
                        (held.avg_price * held.quantity as f64 + total) / new_quantity as f64;

                    sqlx::query(
                        "UPDATE positions SET quantity = ?1, avg_price = ?2
                         WHERE user_id = ?3 AND symbol = ?4",
                    )
                    .bind(new_quantity)
                    .bind(new_avg)
                    .bind(user_id)
                    .bind(&request.symbol)
                    .execute(&mut *tx)
                    .await?;
                }
                // First buy of this symbol opens the position at the quote.
                None => {
                    sqlx::query(
                        "INSERT INTO positions (user_id, symbol, quantity, avg_price)
                         VALUES (?1, ?2, ?3, ?4)",
                    )
                    .bind(user_id)
                    .bind(&request.symbol)
                    .bind(request.quantity)
                    .bind(price)
                    .execute(&mut *tx)
                    .await?;
                }
            }

            balance - total
        }

        TradeSide::Sell => {
            let held = position.ok_or(AppError::InsufficientQuantity {
                requested: request.quantity,
                held: 0,
            })?;

            if held.quantity < request.quantity {
                return Err(AppError::InsufficientQuantity {
                    requested: request.quantity,
                    held: held.quantity,
                });
            }

            let remaining = held.quantity - request.quantity;
            if remaining == 0 {
                // Quantity-0 rows must not exist.
                sqlx::query("DELETE FROM positions WHERE user_id = ?1 AND symbol = ?2")
                    .bind(user_id)
                    .bind(&request.symbol)
                    .execute(&mut *tx)
                    .await?;
            } else {
                // Partial sell: avg_price untouched.
                sqlx::query(
                    "UPDATE positions SET quantity = ?1
                     WHERE user_id = ?2 AND symbol = ?3",
                )
                .bind(remaining)
                .bind(user_id)
                .bind(&request.symbol)
                .execute(&mut *tx)
                .await?;
            }

            balance + total
        }
    };

    sqlx::query("UPDATE users SET balance = ?1 WHERE id = ?2")
        .bind(new_balance)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    // ── 4. Ledger append ──────────────────────────────────────────────────────
    let executed_at = Utc::now();

    sqlx::query(
        "INSERT INTO transactions (user_id, symbol, side, quantity, price, total, executed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(user_id)
    .bind(&request.symbol)
    .bind(request.side.as_str())
    .bind(request.quantity)
    .bind(price)
    .bind(total)
    .bind(executed_at)
    .execute(&mut *tx)
    .await?;

    // ── 5. Commit ─────────────────────────────────────────────────────────────
    tx.commit().await?;

    info!(
        user_id,
        symbol   = %request.symbol,
        side     = request.side.as_str(),
        quantity = request.quantity,
        price,
        total,
        new_balance,
        "💸 Trade committed"
    );

    Ok(TradeReceipt {
        symbol: request.symbol.clone(),
        side: request.side,
        quantity: request.quantity,
        price,
        total,
        new_balance,
        executed_at,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use approx::assert_relative_eq;

    async fn seed_user(pool: &SqlitePool) -> i64 {
        sqlx::query(
            "INSERT INTO users (name, email, phone, password_hash, balance, created_at)
             VALUES ('Test User', 'test@example.com', '555-0100', 'x', 100000.0, ?1)",
        )
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("seed user");

        sqlx::query_scalar("SELECT id FROM users WHERE email = 'test@example.com'")
            .fetch_one(pool)
            .await
            .expect("user id")
    }

    fn buy(symbol: &str, quantity: i64) -> TradeRequest {
        TradeRequest {
            symbol: symbol.to_string(),
            side: TradeSide::Buy,
            quantity,
        }
    }

    fn sell(symbol: &str, quantity: i64) -> TradeRequest {
        TradeRequest {
            symbol: symbol.to_string(),
            side: TradeSide::Sell,
            quantity,
        }
    }

    async fn fetch_position(pool: &SqlitePool, user_id: i64, symbol: &str) -> Option<(i64, f64)> {
        sqlx::query_as(
            "SELECT quantity, avg_price FROM positions WHERE user_id = ?1 AND symbol = ?2",
        )
        .bind(user_id)
        .bind(symbol)
        .fetch_optional(pool)
        .await
        .expect("position query")
    }

    async fn fetch_balance(pool: &SqlitePool, user_id: i64) -> f64 {
        sqlx::query_scalar("SELECT balance FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .expect("balance query")
    }

    #[tokio::test]
    async fn first_buy_opens_position_at_quote() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        // RELIANCE seeds at 2450.50
        let receipt = execute_trade(&pool, user, &buy("RELIANCE", 10)).await.unwrap();

        assert_relative_eq!(receipt.total, 24505.0);
        assert_relative_eq!(receipt.new_balance, 75495.0);

        let (qty, avg) = fetch_position(&pool, user, "RELIANCE").await.unwrap();
        assert_eq!(qty, 10);
        assert_relative_eq!(avg, 2450.50);
        assert_relative_eq!(fetch_balance(&pool, user).await, 75495.0);
    }

    #[tokio::test]
    async fn second_buy_at_same_price_keeps_average() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        execute_trade(&pool, user, &buy("RELIANCE", 10)).await.unwrap();
        execute_trade(&pool, user, &buy("RELIANCE", 5)).await.unwrap();

        let (qty, avg) = fetch_position(&pool, user, "RELIANCE").await.unwrap();
        assert_eq!(qty, 15);
        assert_relative_eq!(avg, 2450.50);
        assert_relative_eq!(fetch_balance(&pool, user).await, 63242.50);
    }

    #[tokio::test]
    async fn buy_reaverages_across_different_prices() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        // ONGC seeds at 178.45; reprice between buys to force a real average.
        execute_trade(&pool, user, &buy("ONGC", 10)).await.unwrap();

        sqlx::query("UPDATE stocks SET price = 200.0 WHERE symbol = 'ONGC'")
            .execute(&pool)
            .await
            .unwrap();

        execute_trade(&pool, user, &buy("ONGC", 30)).await.unwrap();

        let (qty, avg) = fetch_position(&pool, user, "ONGC").await.unwrap();
        assert_eq!(qty, 40);
        // new_avg * new_qty == old_avg*old_qty + price*qty
        assert_relative_eq!(avg * qty as f64, 178.45 * 10.0 + 200.0 * 30.0, epsilon = 1e-9);
    }

    #[tokio::test]
    async fn partial_sell_keeps_average_cost() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        execute_trade(&pool, user, &buy("ITC", 50)).await.unwrap();
        let balance_before = fetch_balance(&pool, user).await;

        let receipt = execute_trade(&pool, user, &sell("ITC", 20)).await.unwrap();

        let (qty, avg) = fetch_position(&pool, user, "ITC").await.unwrap();
        assert_eq!(qty, 30);
        assert_relative_eq!(avg, 412.75);
        assert_relative_eq!(
            fetch_balance(&pool, user).await,
            balance_before + receipt.total
        );
    }

    #[tokio::test]
    async fn sell_to_zero_deletes_position_row() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        execute_trade(&pool, user, &buy("WIPRO", 7)).await.unwrap();
        execute_trade(&pool, user, &sell("WIPRO", 7)).await.unwrap();

        assert!(fetch_position(&pool, user, "WIPRO").await.is_none());
    }

    #[tokio::test]
    async fn oversell_fails_and_mutates_nothing() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        execute_trade(&pool, user, &buy("SBIN", 10)).await.unwrap();
        let balance_before = fetch_balance(&pool, user).await;

        let err = execute_trade(&pool, user, &sell("SBIN", 20)).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientQuantity { requested: 20, held: 10 }
        ));

        let (qty, _) = fetch_position(&pool, user, "SBIN").await.unwrap();
        assert_eq!(qty, 10);
        assert_relative_eq!(fetch_balance(&pool, user).await, balance_before);
    }

    #[tokio::test]
    async fn sell_without_position_fails() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        let err = execute_trade(&pool, user, &sell("TCS", 1)).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientQuantity { held: 0, .. }));
    }

    #[tokio::test]
    async fn overdraft_buy_fails_and_mutates_nothing() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        // 11 * 9850.20 = 108352.20 > 100000
        let err = execute_trade(&pool, user, &buy("MARUTI", 11)).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance { .. }));

        assert!(fetch_position(&pool, user, "MARUTI").await.is_none());
        assert_relative_eq!(fetch_balance(&pool, user).await, 100000.0);

        let ledger_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(ledger_rows, 0);
    }

    #[tokio::test]
    async fn unknown_symbol_is_rejected() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        let err = execute_trade(&pool, user, &buy("DOGE", 1)).await.unwrap_err();
        assert!(matches!(err, AppError::UnknownSymbol(_)));
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        for qty in [0, -5] {
            let err = execute_trade(&pool, user, &buy("TCS", qty)).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[tokio::test]
    async fn every_trade_appends_one_ledger_row() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        execute_trade(&pool, user, &buy("INFY", 3)).await.unwrap();
        execute_trade(&pool, user, &buy("INFY", 2)).await.unwrap();
        execute_trade(&pool, user, &sell("INFY", 5)).await.unwrap();

        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT side, quantity FROM transactions ORDER BY id")
                .fetch_all(&pool)
                .await
                .unwrap();

        assert_eq!(
            rows,
            vec![
                ("BUY".to_string(), 3),
                ("BUY".to_string(), 2),
                ("SELL".to_string(), 5),
            ]
        );
    }
}
