use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use agora_types::{AuthResponse, LoginRequest, RegisterRequest};

use super::{ApiError, ApiJson, ApiResult};
use crate::state::AppState;

/// Pull the token out of an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolve the requester from their bearer token
pub(crate) fn require_user(state: &AppState, headers: &HeaderMap) -> ApiResult<Uuid> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    state
        .session_manager
        .validate_session(token)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session token".to_string()))
}

/// POST /register - Create an account and start a session for it
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let user = state.users.register(
        &payload.name,
        &payload.username,
        &payload.email,
        &payload.password,
    )?;
    let token = state.session_manager.create_session(user.id)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /login - Exchange email and password for a session token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let outcome = state.users.login(&payload.email, &payload.password)?;

    Ok(Json(AuthResponse {
        token: outcome.token,
        user: outcome.user,
    }))
}

/// POST /logout - End the current session
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<StatusCode> {
    require_user(&state, &headers)?;
    if let Some(token) = bearer_token(&headers) {
        state.session_manager.delete_session(token)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&headers_with("abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
