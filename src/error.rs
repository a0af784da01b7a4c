use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use compute::ComputeError;
use model::ModelError;
use sea_orm::DbErr;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::auth::AuthError;
use crate::schemas::ErrorResponse;

/// Every failure a handler can report. Each variant maps to one status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Dependency(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Dependency(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Dependency(_) => "SERVICE_UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn from_db(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                error!("Database unavailable: {}", err);
                ApiError::Dependency("Database unavailable".to_string())
            }
            _ => {
                error!("Database error: {}", err);
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        } else {
            warn!("Request rejected with {}: {}", status, self);
        }

        let body = ErrorResponse {
            detail: self.to_string(),
            code: self.code().to_string(),
        };
        let mut response = (status, Json(body)).into_response();
        if let ApiError::Unauthorized(_) = self {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Database(e) => ApiError::from_db(e),
            ModelError::Validation(msg) => ApiError::Validation(msg),
            ModelError::BadRequest(msg) => ApiError::BadRequest(msg),
            e @ ModelError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            ModelError::Conflict(msg) => ApiError::Conflict(msg),
        }
    }
}

impl From<ComputeError> for ApiError {
    fn from(err: ComputeError) -> Self {
        match err {
            ComputeError::Database(e) => ApiError::from_db(e),
            ComputeError::InvalidWindow(msg) => ApiError::Validation(msg),
            e @ ComputeError::Overflow(_) => {
                error!("{}", e);
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::WrongCredentials | AuthError::InvalidToken => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::TokenCreation => ApiError::Internal(err.to_string()),
            AuthError::Model(e) => e.into(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: invalid value ({})", field, e.code),
                })
            })
            .collect();
        messages.sort();
        ApiError::Validation(messages.join("; "))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_code_table() {
        let cases = [
            (ApiError::Validation(String::new()), 422, "VALIDATION_ERROR"),
            (ApiError::BadRequest(String::new()), 400, "BAD_REQUEST"),
            (ApiError::NotFound(String::new()), 404, "NOT_FOUND"),
            (ApiError::Conflict(String::new()), 409, "CONFLICT"),
            (ApiError::Unauthorized(String::new()), 401, "UNAUTHORIZED"),
            (ApiError::Dependency(String::new()), 503, "SERVICE_UNAVAILABLE"),
            (ApiError::Internal(String::new()), 500, "INTERNAL_ERROR"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status().as_u16(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_model_errors_map_to_kinds() {
        let not_found: ApiError = ModelError::NotFound {
            entity: "Transaction",
            id: 7,
        }
        .into();
        assert!(matches!(&not_found, ApiError::NotFound(msg) if msg == "Transaction with ID 7 not found"));

        let conflict: ApiError = ModelError::Conflict("taken".to_string()).into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let unavailable: ApiError =
            ModelError::Database(DbErr::Conn(sea_orm::RuntimeErr::Internal("down".to_string())))
                .into();
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_compute_errors_map_to_kinds() {
        let window: ApiError = ComputeError::InvalidWindow("bad window".to_string()).into();
        assert_eq!(window.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let overflow: ApiError = ComputeError::Overflow("balance").into();
        assert_eq!(overflow.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(overflow.to_string(), "Internal server error");
    }

    #[test]
    fn test_unauthorized_sets_challenge_header() {
        let response = ApiError::from(AuthError::InvalidToken).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
