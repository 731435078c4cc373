use audit::Identity;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

pub const MISSING_BEARER_TOKEN: &str = "missing bearer token";
pub const INVALID_AUTHORIZATION_HEADER: &str = "invalid authorization header format";
/// Single outward message for every token or claims failure.
pub const INVALID_TOKEN: &str = "invalid token";

/// Identity of the caller, stored in the request extensions by [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: Option<String>,
}

impl Identity for AuthenticatedUser {
    fn user_id(&self) -> Option<i64> {
        Some(self.user_id.as_i64())
    }

    fn user_email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Middleware that validates bearer tokens and adds the caller's identity to
/// the request extensions. Preflight requests pass through untouched.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let token = extract_bearer_token(req.headers()).inspect_err(|e| {
        audit::warn!(state.log, "Rejected {}: {:?}", req.uri().path(), e);
    })?;

    let claims = state.authenticator.validate_token(token).map_err(|e| {
        audit::warn!(state.log, "Rejected {}: {}", req.uri().path(), e);
        ApiError::Unauthorized(INVALID_TOKEN.to_string())
    })?;

    let user_id = UserId::new(claims.sub).map_err(|e| {
        audit::warn!(state.log, "Rejected {}: {}", req.uri().path(), e);
        ApiError::Unauthorized(INVALID_TOKEN.to_string())
    })?;

    let user = AuthenticatedUser {
        user_id,
        email: claims.email,
    };
    audit::debug!(state.log, ctx: &user, "Authenticated {} {}", req.method(), req.uri());

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Accepts exactly `Bearer <token>`: one space, two non-empty parts.
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized(MISSING_BEARER_TOKEN.to_string()))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::Unauthorized(INVALID_AUTHORIZATION_HEADER.to_string()))?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(token),
        _ => Err(ApiError::Unauthorized(
            INVALID_AUTHORIZATION_HEADER.to_string(),
        )),
    }
}
