//! # auth — Credentials & Session Middleware
//!
//! Two concerns:
//! - argon2 password hashing / verification (PHC strings in `users.password_hash`)
//! - bearer-token sessions: login issues a UUID token held in `AppState`,
//!   `require_session` resolves it on every request
//!
//! ## Exemptions
//! Register, login and the health probe are reachable without a token.
//!
//! ## Usage
//! ```bash
//! curl -H "Authorization: Bearer <token>" http://localhost:3000/api/portfolio
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;
use uuid::Uuid;

use crate::{error::AppError, state::SharedState};

// ─── Password Hashing ─────────────────────────────────────────────────────────

/// Hash a plaintext password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {e}"))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC string.
///
/// An unparseable stored hash verifies as `false` rather than erroring —
/// the caller only ever needs "match / no match".
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// ─── Session Middleware ───────────────────────────────────────────────────────

/// The authenticated caller, injected into request extensions by
/// [`require_session`] and extracted by handlers via `Extension<AuthUser>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Axum middleware — resolve the `Authorization: Bearer <token>` header
/// against the in-memory session store.
pub async fn require_session(
    State(state): State<SharedState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // ── Public endpoints ──────────────────────────────────────────────────────
    let path = request.uri().path();
    if path == "/api/health"
        || path == "/api/account/register"
        || path == "/api/account/login"
    {
        return next.run(request).await;
    }

    // ── Resolve token ─────────────────────────────────────────────────────────
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|v| Uuid::parse_str(v.trim()).ok());

    let user_id = match token {
        Some(token) => state.session_user(token).await,
        None => None,
    };

    match user_id {
        Some(user_id) => {
            request.extensions_mut().insert(AuthUser { user_id });
            next.run(request).await
        }
        None => {
            warn!(path, "❌ Unauthorized request — invalid or missing session token");
            AppError::Unauthorized(
                "invalid or missing session token; login first".to_string(),
            )
            .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(verify_password(&hash, "s3cret-pass"));
        assert!(!verify_password(&hash, "wrong-pass"));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }
}
