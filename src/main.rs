//! # Paperdesk — Simulated Stock-Trading Backend
//!
//! ```text
//!  ┌─────────────┐  POST /api/account/*        ┌─────────────────────────────┐
//!  │  Frontend   │ ──────────────────────────▶ │ AppState                    │
//!  │  (any SPA)  │  GET  /api/market           │ ├─ SqlitePool (4 tables)    │
//!  └─────────────┘  GET  /api/portfolio        │ ├─ sessions (bearer → user) │
//!                   POST /api/trade   💸        │ └─ trade_locks (per user)   │
//!                                              └─────────────────────────────┘
//! ```
//!
//! Users register with 100 000 virtual cash, trade against a fixed equity
//! catalog, and track unrealized P/L against an immutable ledger.

use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod auth;
mod db;
mod engine;
mod error;
mod models;
mod routes;
mod state;

use auth::require_session;
use routes::{
    account::{dashboard, login, logout, register},
    market::list_stocks,
    portfolio::{get_portfolio, get_transactions},
    trade::{health_check, submit_trade},
};
use state::build_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("paperdesk=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════════════╗
  ║            PAPERDESK — Trading Simulator              ║
  ║  Accounts · Catalog · Accounting · Valuation          ║
  ╚═══════════════════════════════════════════════════════╝"#);

    // ── 3. Store + shared state ───────────────────────────────────────────────
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://paperdesk.db".to_string());
    let pool = db::init_pool(&database_url).await?;
    let state = build_state(pool);

    // ── 4. CORS ───────────────────────────────────────────────────────────────
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 5. Router ─────────────────────────────────────────────────────────────
    let app = Router::new()
        // ── Accounts ──────────────────────────────────────────────────────────
        .route("/api/account/register", post(register))
        .route("/api/account/login",    post(login))
        .route("/api/account/logout",   post(logout))
        .route("/api/account/me",       get(dashboard))
        // ── Market ────────────────────────────────────────────────────────────
        .route("/api/market",           get(list_stocks))
        // ── Portfolio ─────────────────────────────────────────────────────────
        .route("/api/portfolio",              get(get_portfolio))
        .route("/api/portfolio/transactions", get(get_transactions))
        // ── Trading ───────────────────────────────────────────────────────────
        .route("/api/trade",            post(submit_trade))
        .route("/api/health",           get(health_check))
        // ── Middleware ────────────────────────────────────────────────────────
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // ── 6. Bind & Serve ───────────────────────────────────────────────────────
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    info!(?addr, "🚀 Paperdesk server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
