//! # state
//!
//! `AppState` — the database pool plus the two in-memory maps the handlers
//! need: active sessions and the per-user trade locks that serialize
//! concurrent trades by the same user.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

// ─── AppState ─────────────────────────────────────────────────────────────────

/// Top-level shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    // ── Persistent Store ──────────────────────────────────────────────────────
    pub pool: SqlitePool,

    // ── Sessions ──────────────────────────────────────────────────────────────
    /// Bearer token → user id.  Issued on login, dropped on logout.
    /// Process-local; restarting the server logs everyone out.
    sessions: Arc<RwLock<HashMap<Uuid, i64>>>,

    // ── Trade Serialization ───────────────────────────────────────────────────
    /// One async lock per user.  The trade handler holds it across the whole
    /// read-modify-write transaction so two concurrent trades by the same
    /// user cannot interleave on the balance / average-cost computation.
    trade_locks: Arc<RwLock<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            trade_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // ── Session Helpers ───────────────────────────────────────────────────────

    /// Issue a fresh session token for `user_id`.
    pub async fn issue_session(&self, user_id: i64) -> Uuid {
        let token = Uuid::new_v4();
        self.sessions.write().await.insert(token, user_id);
        token
    }

    /// Resolve a token to its user id, if the session is live.
    pub async fn session_user(&self, token: Uuid) -> Option<i64> {
        self.sessions.read().await.get(&token).copied()
    }

    /// Drop a session.  Returns `true` if the token was live.
    pub async fn revoke_session(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }

    // ── Trade Lock ────────────────────────────────────────────────────────────

    /// Lock handle for `user_id`, created on first use.
    pub async fn trade_lock(&self, user_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.trade_locks.write().await;
        locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

pub fn build_state(pool: SqlitePool) -> SharedState {
    Arc::new(AppState::new(pool))
}
