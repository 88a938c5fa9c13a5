//! Authentication endpoint handlers: login and logout.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{LoginRequest, LoginResponse};
use crate::app_state::AppState;
use crate::domain::SessionContext;
use crate::error::{ErrorResponse, MarketError};

/// Best-effort client address from proxy headers.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// `POST /auth/login` — Open a session, terminating any prior one.
///
/// # Errors
///
/// Returns [`MarketError::InvalidCredentials`] when verification fails.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    summary = "Log in",
    description = "Verifies credentials and opens a new session. Last login wins: any prior active session for the same account is terminated, not this one rejected.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let record = state
        .session_guard
        .login(
            &req.username,
            &req.password,
            &client_ip(&headers),
            &user_agent(&headers),
        )
        .await?;

    Ok(Json(LoginResponse::from(record)))
}

/// `POST /auth/logout` — Close the presented session.
///
/// # Errors
///
/// Returns [`MarketError`] when the session header is missing or invalid.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    summary = "Log out",
    description = "Marks the presented session inactive. Idempotent.",
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Invalid session", body = ErrorResponse),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<impl IntoResponse, MarketError> {
    state.session_guard.logout(ctx.session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn missing_headers_fall_back_to_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), "unknown");
        assert_eq!(user_agent(&headers), "unknown");
    }
}
