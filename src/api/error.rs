use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::auth::models::AuthError;
use crate::errors::Error;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Conflict(String),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error_kind = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Internal(_) => "internal_error",
        };

        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Internal(msg) => msg,
        };

        (status, Json(ErrorBody { error: error_kind, message })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            Error::NotFound { resource, id } => {
                ApiError::NotFound(format!("{} '{}' not found", resource, id))
            }
            Error::Database { source, context } => {
                // SQLite reports PRIMARY KEY (1555) and UNIQUE (2067) violations
                // under distinct extended codes; kind() normalizes both.
                if source
                    .as_database_error()
                    .is_some_and(|db_err| db_err.is_unique_violation())
                {
                    return ApiError::Conflict(context);
                }
                ApiError::Internal(context)
            }
            Error::Config(msg) | Error::Transport(msg) | Error::Internal(msg) => {
                ApiError::Internal(msg)
            }
            Error::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailExists => ApiError::Conflict("Email already exists".to_string()),
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::InvalidRefreshToken => {
                ApiError::Unauthorized("Invalid refresh token".to_string())
            }
            AuthError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            AuthError::SignUpFailed(msg) => ApiError::Internal(msg),
            AuthError::Store(msg) => ApiError::Internal(msg),
        }
    }
}

impl ApiError {
    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn unauthorized<S: Into<String>>(msg: S) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden<S: Into<String>>(msg: S) -> Self {
        ApiError::Forbidden(msg.into())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_exists_maps_to_conflict() {
        let api: ApiError = AuthError::EmailExists.into();
        assert!(matches!(api, ApiError::Conflict(_)));
    }

    #[test]
    fn credential_failures_map_to_unauthorized() {
        for err in [AuthError::InvalidCredentials, AuthError::InvalidRefreshToken] {
            let api: ApiError = err.into();
            assert!(matches!(api, ApiError::Unauthorized(_)));
        }
    }

    #[test]
    fn not_found_carries_resource_and_id() {
        let api: ApiError = Error::not_found("Pokemon", "151").into();
        match api {
            ApiError::NotFound(msg) => assert_eq!(msg, "Pokemon '151' not found"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
