//! # routes::account
//!
//! Registration, login/logout and the dashboard endpoint.
//!
//! | Method | Path                    | Description                        |
//! |--------|-------------------------|------------------------------------|
//! | POST   | `/api/account/register` | Create a user (100 000 virtual cash) |
//! | POST   | `/api/account/login`    | Issue a session token              |
//! | POST   | `/api/account/logout`   | Revoke the session token           |
//! | GET    | `/api/account/me`       | Balance, portfolio value, recent trades |

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::{self, AuthUser},
    engine::value_portfolio,
    error::AppError,
    models::{
        user::{LoginRequest, RegisterRequest},
        TransactionRecord, User,
    },
    state::SharedState,
};

/// Opening cash balance for every new account.
const STARTING_BALANCE: f64 = 100_000.0;

// ─── POST /api/account/register ───────────────────────────────────────────────

pub async fn register(
    State(state): State<SharedState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, AppError> {
    // ── 1. Field validation ───────────────────────────────────────────────────
    if body.name.trim().is_empty() || body.email.trim().is_empty() {
        return Err(AppError::BadRequest("name and email are required".into()));
    }
    if body.password.is_empty() {
        return Err(AppError::BadRequest("password must not be empty".into()));
    }
    if body.password != body.confirm_password {
        return Err(AppError::BadRequest("passwords do not match".into()));
    }

    // ── 2. Hash + insert ──────────────────────────────────────────────────────
    let password_hash = auth::hash_password(&body.password)?;

    let result = sqlx::query(
        "INSERT INTO users (name, email, phone, password_hash, balance, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(body.name.trim())
    .bind(body.email.trim())
    .bind(body.phone.trim())
    .bind(&password_hash)
    .bind(STARTING_BALANCE)
    .bind(Utc::now())
    .execute(&state.pool)
    .await;

    match result {
        Ok(_) => {
            info!(email = %body.email, "🆕 User registered");
            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "ok":      true,
                    "message": "Registration successful! Please login.",
                })),
            ))
        }
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(AppError::DuplicateRegistration(body.email.trim().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

// ─── POST /api/account/login ──────────────────────────────────────────────────

pub async fn login(
    State(state): State<SharedState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, AppError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?1")
        .bind(body.email.trim())
        .fetch_optional(&state.pool)
        .await?;

    // Same error for unknown email and wrong password — no account probing.
    let user = user.ok_or(AppError::InvalidCredentials)?;
    if !auth::verify_password(&user.password_hash, &body.password) {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.issue_session(user.id).await;
    info!(user_id = user.id, "🔑 Login");

    Ok(Json(json!({
        "ok":    true,
        "token": token,
        "user": {
            "id":      user.id,
            "name":    user.name,
            "email":   user.email,
            "balance": user.balance,
        },
    })))
}

// ─── POST /api/account/logout ─────────────────────────────────────────────────

pub async fn logout(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or_else(|| AppError::Unauthorized("missing session token".into()))?;

    state.revoke_session(token).await;

    Ok(Json(json!({
        "ok":      true,
        "message": "Logged out",
    })))
}

// ─── GET /api/account/me ──────────────────────────────────────────────────────

/// Dashboard view: identity + cash + portfolio totals + 10 latest trades.
pub async fn dashboard(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let user: User = sqlx::query_as("SELECT * FROM users WHERE id = ?1")
        .bind(auth.user_id)
        .fetch_one(&state.pool)
        .await?;

    let summary = value_portfolio(&state.pool, auth.user_id).await?;

    let recent: Vec<TransactionRecord> = sqlx::query_as(
        "SELECT * FROM transactions
         WHERE user_id = ?1
         ORDER BY executed_at DESC
         LIMIT 10",
    )
    .bind(auth.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({
        "ok":                  true,
        "user":                user,
        "portfolio_value":     summary.total_current_value,
        "total_invested":      summary.total_investment,
        "unrealized_pl":       summary.total_pl,
        "recent_transactions": recent,
    })))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
