//! SQL for the `login_logs` table and credential verification.
//!
//! Credential storage and hashing belong to the account service; the
//! verification query delegates the hash comparison to Postgres `pgcrypto`
//! (`crypt($2, password_hash)`), so no hashing logic lives in this core.

use std::str::FromStr;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::domain::{Role, SessionId, SessionRecord, UserId};
use crate::error::MarketError;

/// Verifies a username/password pair against the account table.
///
/// Returns the account id and role on success, `None` on any mismatch.
/// Callers must not distinguish unknown-user from wrong-password.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure, or
/// [`MarketError::Internal`] when a stored role is unknown.
pub async fn verify_credentials(
    conn: &mut PgConnection,
    username: &str,
    password: &str,
) -> Result<Option<(UserId, Role)>, MarketError> {
    let row = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, role FROM users \
         WHERE username = $1 AND password_hash = crypt($2, password_hash)",
    )
    .bind(username)
    .bind(password)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(|(id, role)| Ok((UserId::from_uuid(id), Role::from_str(&role)?)))
        .transpose()
}

/// Marks every active session for `(user_id, role)` inactive with a logout
/// timestamp. Returns the number of sessions closed.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn deactivate_for_user(
    conn: &mut PgConnection,
    user_id: UserId,
    role: Role,
) -> Result<u64, MarketError> {
    let result = sqlx::query(
        "UPDATE login_logs SET is_active = FALSE, logout_time = now() \
         WHERE user_id = $1 AND role = $2 AND is_active",
    )
    .bind(*user_id.as_uuid())
    .bind(role.as_str())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Inserts a fresh active session row.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn insert_session(
    conn: &mut PgConnection,
    record: &SessionRecord,
) -> Result<(), MarketError> {
    sqlx::query(
        "INSERT INTO login_logs (user_id, role, session_id, ip_address, user_agent, \
                                 login_time, last_activity, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)",
    )
    .bind(*record.user_id.as_uuid())
    .bind(record.role.as_str())
    .bind(*record.session_id.as_uuid())
    .bind(&record.ip_address)
    .bind(&record.user_agent)
    .bind(record.login_time)
    .bind(record.last_activity)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Validates a session and touches its `last_activity` in one statement.
///
/// Matches only an active row whose last activity is within
/// `idle_timeout_secs`; returns the account id and role when the session is
/// good. A row invalidated by a later login simply does not match.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure, or
/// [`MarketError::Internal`] when a stored role is unknown.
pub async fn touch_active(
    conn: &mut PgConnection,
    session_id: SessionId,
    idle_timeout_secs: f64,
) -> Result<Option<(UserId, Role)>, MarketError> {
    let row = sqlx::query_as::<_, (Uuid, String)>(
        "UPDATE login_logs SET last_activity = now() \
         WHERE session_id = $1 AND is_active \
           AND last_activity > now() - make_interval(secs => $2) \
         RETURNING user_id, role",
    )
    .bind(*session_id.as_uuid())
    .bind(idle_timeout_secs)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(|(id, role)| Ok((UserId::from_uuid(id), Role::from_str(&role)?)))
        .transpose()
}

/// Marks one session inactive. Idempotent: closing an absent or
/// already-closed session affects zero rows and is not an error.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn deactivate_session(
    conn: &mut PgConnection,
    session_id: SessionId,
) -> Result<u64, MarketError> {
    let result = sqlx::query(
        "UPDATE login_logs SET is_active = FALSE, logout_time = now() \
         WHERE session_id = $1 AND is_active",
    )
    .bind(*session_id.as_uuid())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}
