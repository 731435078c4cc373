use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenResponseData;
use crate::domain::user::models::RegisterCommand;
use crate::inbound::http::router::AppState;

/// Create an account and return its first token.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError> {
    let Json(body) = body?;
    let command = RegisterCommand::new(body.email, body.password).inspect_err(|e| {
        audit::warn!(state.log, "Registration rejected: {}", e);
    })?;

    state
        .user_service
        .register(command)
        .await
        .map_err(ApiError::from)
        .map(|issued| {
            ApiSuccess::new(
                StatusCode::CREATED,
                TokenResponseData {
                    token: issued.token,
                },
            )
        })
}

/// Absent fields deserialize as empty and are rejected by validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}
