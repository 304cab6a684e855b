//! # db — SQLite Database Layer
//!
//! `sqlx` with the SQLite backend.  The schema lives in
//! `migrations/001_init.sql` and is embedded in the binary; startup applies
//! it idempotently and then seeds the equity catalog (insert-if-absent, so
//! restarts never duplicate or reprice rows).
//!
//! ## Setup
//! 1. Set `DATABASE_URL` in `.env` (defaults to `sqlite://paperdesk.db`)
//! 2. Run — migrations and seed data are applied automatically

use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;

// ─── Seed Catalog ─────────────────────────────────────────────────────────────

/// The fixed catalog: (symbol, name, price, change_pct).
///
/// There is no market feed; these prices are the simulation's ground truth.
const SEED_STOCKS: &[(&str, &str, f64, f64)] = &[
    ("RELIANCE", "Reliance Industries Ltd", 2450.50, 1.25),
    ("TCS", "Tata Consultancy Services", 3580.75, -0.85),
    ("INFY", "Infosys Ltd", 1456.30, 2.10),
    ("HDFCBANK", "HDFC Bank Ltd", 1625.40, 0.95),
    ("ICICIBANK", "ICICI Bank Ltd", 982.60, -1.20),
    ("BHARTIARTL", "Bharti Airtel Ltd", 1185.25, 1.85),
    ("SBIN", "State Bank of India", 598.90, 0.45),
    ("ITC", "ITC Ltd", 412.75, -0.35),
    ("WIPRO", "Wipro Ltd", 445.60, 1.60),
    ("TATAMOTORS", "Tata Motors Ltd", 765.30, 3.25),
    ("HINDALCO", "Hindalco Industries Ltd", 512.80, 2.40),
    ("ONGC", "Oil & Natural Gas Corp", 178.45, -1.05),
    ("MARUTI", "Maruti Suzuki India Ltd", 9850.20, 0.75),
    ("ASIANPAINT", "Asian Paints Ltd", 3245.60, -0.60),
    ("BAJFINANCE", "Bajaj Finance Ltd", 6780.40, 1.95),
];

// ─── Pool Init ────────────────────────────────────────────────────────────────

/// Create the pool, apply the embedded migration and seed the catalog.
pub async fn init_pool(database_url: &str) -> anyhow::Result<SqlitePool> {
    info!(%database_url, "Connecting to SQLite...");

    let options = SqliteConnectOptions::from_str(database_url)
        .context("Invalid DATABASE_URL")?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_with(options)
        .await
        .context("Failed to connect to SQLite")?;

    run_migrations(&pool).await?;
    seed_stocks(&pool).await?;

    info!("✅ SQLite connected, schema applied, catalog seeded");
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    // Embedded migration SQL
    sqlx::raw_sql(include_str!("../migrations/001_init.sql"))
        .execute(pool)
        .await
        .context("Failed to run migration 001_init.sql")?;

    Ok(())
}

// ─── Catalog Seed ─────────────────────────────────────────────────────────────

/// Insert the seed equities if absent.  `INSERT OR IGNORE` keys off the
/// UNIQUE(symbol) constraint, so re-running is a no-op.
pub async fn seed_stocks(pool: &SqlitePool) -> anyhow::Result<()> {
    for &(symbol, name, price, change_pct) in SEED_STOCKS {
        sqlx::query(
            "INSERT OR IGNORE INTO stocks (symbol, name, price, change_pct)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(symbol)
        .bind(name)
        .bind(price)
        .bind(change_pct)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to seed stock {symbol}"))?;
    }

    Ok(())
}

// ─── Test Support ─────────────────────────────────────────────────────────────

/// In-memory pool for unit tests.  Capped at a single connection because
/// every `sqlite::memory:` connection is its own empty database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");

    run_migrations(&pool).await.expect("migrations");
    seed_stocks(&pool).await.expect("seed");
    pool
}
