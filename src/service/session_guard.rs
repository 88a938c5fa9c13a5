//! Session singleton guard: at most one active session per account.
//!
//! Login is last-login-wins: a new successful login invalidates every prior
//! active session for the same `(user, role)` rather than being blocked.
//! Invalidate-old and insert-new happen in that order inside one
//! transaction, so a crash can only leave zero active sessions, never two.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;

use crate::domain::{
    EventBus, MarketEvent, SessionContext, SessionId, SessionRecord,
};
use crate::error::MarketError;
use crate::persistence::session_store;

/// Enforces the single-active-session policy over `login_logs`.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    pool: PgPool,
    event_bus: EventBus,
    idle_timeout: Duration,
}

impl SessionGuard {
    /// Creates a new `SessionGuard` with the given idle timeout.
    #[must_use]
    pub fn new(pool: PgPool, event_bus: EventBus, idle_timeout: Duration) -> Self {
        Self {
            pool,
            event_bus,
            idle_timeout,
        }
    }

    /// Verifies credentials and opens a new session, terminating any prior
    /// active session for the same account and role.
    ///
    /// The session identifier is freshly generated here, never carried
    /// over from any pre-authentication value (fixation defense).
    ///
    /// # Errors
    ///
    /// [`MarketError::InvalidInput`] for empty credentials,
    /// [`MarketError::InvalidCredentials`] when verification fails, or
    /// [`MarketError::Database`] on failure.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        ip_address: &str,
        user_agent: &str,
    ) -> Result<SessionRecord, MarketError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(MarketError::InvalidInput(
                "username and password are required".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let Some((user_id, role)) =
            session_store::verify_credentials(&mut tx, username.trim(), password).await?
        else {
            return Err(MarketError::InvalidCredentials);
        };

        let superseded = session_store::deactivate_for_user(&mut tx, user_id, role).await?;

        let now = Utc::now();
        let record = SessionRecord {
            user_id,
            role,
            session_id: SessionId::new(),
            ip_address: ip_address.to_string(),
            user_agent: user_agent.to_string(),
            login_time: now,
            last_activity: now,
            logout_time: None,
            is_active: true,
        };
        session_store::insert_session(&mut tx, &record).await?;

        tx.commit().await?;

        if superseded > 0 {
            tracing::info!(%user_id, superseded, "prior active session(s) terminated by new login");
        }
        tracing::info!(%user_id, role = role.as_str(), "session opened");

        let _ = self.event_bus.publish(MarketEvent::SessionOpened {
            user_id,
            role,
            timestamp: Utc::now(),
        });

        Ok(record)
    }

    /// Resolves a presented session id into a [`SessionContext`], touching
    /// `last_activity`.
    ///
    /// A session that is missing, inactive (logged out or superseded by a
    /// later login), or idle past the configured timeout is invalid; an
    /// idle-expired row is additionally closed so it cannot linger active.
    ///
    /// # Errors
    ///
    /// [`MarketError::SessionRevoked`] for any invalid session, or
    /// [`MarketError::Database`] on failure.
    pub async fn authenticate(&self, session_id: SessionId) -> Result<SessionContext, MarketError> {
        let mut conn = self.pool.acquire().await?;

        match session_store::touch_active(&mut conn, session_id, self.idle_timeout.as_secs_f64())
            .await?
        {
            Some((user_id, role)) => Ok(SessionContext {
                user_id,
                role,
                session_id,
            }),
            None => {
                // Close an idle-expired row that is still flagged active.
                session_store::deactivate_session(&mut conn, session_id).await?;
                Err(MarketError::SessionRevoked)
            }
        }
    }

    /// Closes a session. Idempotent: logging out twice succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Database`] on failure.
    pub async fn logout(&self, session_id: SessionId) -> Result<(), MarketError> {
        let mut conn = self.pool.acquire().await?;
        let closed = session_store::deactivate_session(&mut conn, session_id).await?;
        if closed > 0 {
            tracing::info!(%session_id, "session closed");
        }
        Ok(())
    }
}
