//! Session extraction: turns the `x-session-id` header into a
//! [`SessionContext`].
//!
//! This is the per-request seam to the session guard: every protected
//! handler takes `SessionContext` as an argument and axum resolves it
//! here, touching the session's `last_activity` in the process. A request
//! carrying a session that a later login has invalidated is rejected with
//! 401 before the handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::domain::{SessionContext, SessionId};
use crate::error::MarketError;

/// Header clients present their session id in.
pub const SESSION_HEADER: &str = "x-session-id";

impl FromRequestParts<AppState> for SessionContext {
    type Rejection = MarketError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(MarketError::SessionRevoked)?;

        let session_id = header
            .parse::<uuid::Uuid>()
            .map_err(|_| MarketError::SessionRevoked)?;

        state
            .session_guard
            .authenticate(SessionId::from_uuid(session_id))
            .await
    }
}
