use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::user::errors::UserError;

pub mod login;
pub mod me;
pub mod register;

/// Message returned for duplicate registrations.
pub const EMAIL_ALREADY_REGISTERED: &str = "email already registered";
/// Message returned for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";
/// Message returned for every 500.
pub const INTERNAL_SERVER_ERROR: &str = "internal server error";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

/// Collapses domain errors into client-safe messages. Internal details are
/// logged by the service before they reach this point.
impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::MissingCredentials
            | UserError::InvalidEmail(_)
            | UserError::InvalidUserId(_) => ApiError::BadRequest(err.to_string()),
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::EmailAlreadyExists(_) => {
                ApiError::Conflict(EMAIL_ALREADY_REGISTERED.to_string())
            }
            UserError::InvalidCredentials => {
                ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
            }
            UserError::Password(_)
            | UserError::Token(_)
            | UserError::DatabaseError(_)
            | UserError::Unknown(_) => {
                ApiError::InternalServerError(INTERNAL_SERVER_ERROR.to_string())
            }
        }
    }
}

/// Any unreadable request body is a 400, whatever axum would answer by default.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Body of a successful registration or login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResponseData {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use auth::JwtError;

    use super::*;
    use crate::user::errors::EmailError;

    #[test]
    fn test_internal_errors_hide_details() {
        let errors = [
            UserError::DatabaseError("relation \"users\" does not exist".to_string()),
            UserError::Token(JwtError::EncodingFailed("bad key".to_string())),
            UserError::Unknown("join error".to_string()),
        ];

        for err in errors {
            assert_eq!(
                ApiError::from(err),
                ApiError::InternalServerError(INTERNAL_SERVER_ERROR.to_string())
            );
        }
    }

    #[test]
    fn test_conflict_does_not_echo_email() {
        let err = UserError::EmailAlreadyExists("alice@example.com".to_string());
        assert_eq!(
            ApiError::from(err),
            ApiError::Conflict(EMAIL_ALREADY_REGISTERED.to_string())
        );
    }

    #[test]
    fn test_validation_errors_are_bad_requests() {
        assert!(matches!(
            ApiError::from(UserError::MissingCredentials),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::InvalidEmail(EmailError::InvalidFormat(
                "missing @".to_string()
            ))),
            ApiError::BadRequest(_)
        ));
    }
}
