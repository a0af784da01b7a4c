//! Validating request extractors.
//!
//! Payloads go through [`Valid`] and every rejection, parse or validation,
//! is turned into an [`ApiError`] so malformed input always gets a JSON body.

use axum::extract::{Form, Json, Path, Query};
use axum_extra::extract::WithRejection;
use axum_valid::{Valid, ValidRejection, ValidationRejection};

use crate::error::ApiError;

/// JSON body checked with `validator`.
pub type ValidJson<T> = WithRejection<Valid<Json<T>>, ApiError>;

/// URL-encoded form body checked with `validator`.
pub type ValidForm<T> = WithRejection<Valid<Form<T>>, ApiError>;

/// Query string checked with `validator`.
pub type ValidQuery<T> = WithRejection<Valid<Query<T>>, ApiError>;

/// Path parameters. Unparsable segments become validation errors.
pub type ApiPath<T> = WithRejection<Path<T>, ApiError>;

impl<E> From<ValidRejection<E>> for ApiError
where
    ApiError: From<E>,
{
    fn from(rejection: ValidRejection<E>) -> Self {
        match rejection {
            ValidationRejection::Valid(errors) => errors.into(),
            ValidationRejection::Inner(inner) => inner.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::json;
    use validator::Validate;

    use super::*;
    use crate::schemas::ErrorResponse;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
    }

    async fn echo(WithRejection(Valid(Json(payload)), _): ValidJson<Payload>) -> String {
        payload.name
    }

    fn server() -> TestServer {
        TestServer::new(Router::new().route("/echo", post(echo))).unwrap()
    }

    #[tokio::test]
    async fn test_valid_payload_passes_through() {
        let response = server().post("/echo").json(&json!({"name": "alice"})).await;
        response.assert_status_ok();
        response.assert_text("alice");
    }

    #[tokio::test]
    async fn test_validation_failure_is_a_json_error() {
        let response = server().post("/echo").json(&json!({"name": "al"})).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");
        assert_eq!(body.detail, "name: too short");
    }

    #[tokio::test]
    async fn test_unparsable_body_is_a_json_error() {
        let response = server().post("/echo").json(&json!({"other": 1})).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");
    }
}
