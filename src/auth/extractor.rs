use axum::{RequestPartsExt, async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use model::entities::user;
use tracing::debug;

use super::{AuthError, resolve_user};
use crate::error::ApiError;
use crate::schemas::AppState;

/// The user named by a valid `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

/// Like [`CurrentUser`] for routes where the token is optional.
///
/// A missing, malformed, expired or unknown-subject token yields `None`.
/// Store failures are still rejections.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<user::Model>);

async fn bearer_token(parts: &mut Parts) -> Option<String> {
    match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
        Ok(TypedHeader(Authorization(bearer))) => Some(bearer.token().to_string()),
        Err(e) => {
            debug!("Missing or malformed bearer token: {}", e);
            None
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).await.ok_or(AuthError::InvalidToken)?;
        let user = resolve_user(&state.db, &state.auth, &token).await?;
        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts).await else {
            return Ok(MaybeUser(None));
        };
        match resolve_user(&state.db, &state.auth, &token).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(AuthError::InvalidToken) => Ok(MaybeUser(None)),
            Err(e) => Err(e.into()),
        }
    }
}
