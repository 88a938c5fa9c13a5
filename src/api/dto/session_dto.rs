//! Login/logout DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::SessionRecord;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Account username.
    pub username: String,
    /// Account password, verified by the account service.
    pub password: String,
}

/// Response body for `POST /auth/login`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Session identifier to present in the `x-session-id` header.
    pub session_id: uuid::Uuid,
    /// Authenticated account.
    pub user_id: uuid::Uuid,
    /// Role the account logged in under: `buyer`, `seller`, or `admin`.
    pub role: String,
    /// When the session was opened.
    pub login_time: DateTime<Utc>,
}

impl From<SessionRecord> for LoginResponse {
    fn from(record: SessionRecord) -> Self {
        Self {
            session_id: *record.session_id.as_uuid(),
            user_id: *record.user_id.as_uuid(),
            role: record.role.as_str().to_string(),
            login_time: record.login_time,
        }
    }
}
