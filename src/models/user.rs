//! # models::user
//!
//! Account row + the registration / login payloads.
//!
//! `balance` is the user's virtual cash.  It is mutated **only** by the
//! accounting engine inside a trade transaction — handlers never write it
//! directly — and is never negative after a validated trade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── User ─────────────────────────────────────────────────────────────────────

/// One row of the `users` table.
///
/// `password_hash` is an argon2 PHC string; it never leaves the server, so
/// the field is skipped on serialization.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

// ─── API Payloads ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
