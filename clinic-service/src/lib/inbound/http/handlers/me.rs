use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::User;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Return the account behind the bearer token.
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<CurrentUserData>, ApiError> {
    audit::info!(state.log, ctx: &user, "Fetching current user");

    state
        .user_service
        .get_user(&user.user_id)
        .await
        .map_err(|e| {
            match &e {
                UserError::NotFound(_) => {
                    audit::warn!(state.log, ctx: &user, "Account behind token no longer exists")
                }
                _ => audit::error!(state.log, ctx: &user, "Failed to fetch current user: {}", e),
            }
            ApiError::from(e)
        })
        .map(|account| ApiSuccess::new(StatusCode::OK, CurrentUserData::from(&account)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUserData {
    pub id: i64,
    pub email: String,
}

impl From<&User> for CurrentUserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_i64(),
            email: user.email.to_string(),
        }
    }
}
