use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, error};

use super::{jwt::JwtKeys, repo_types::User};
use crate::{error::AppError, state::AppState};

/// Validates the bearer token and loads the caller's record from the store.
/// Every failure is reported the same way.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                debug!("missing Authorization header");
                AppError::TokenInvalid
            })?;

        let token = auth
            .strip_prefix(super::jwt::BEARER_PREFIX)
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| {
                debug!("invalid auth scheme");
                AppError::TokenInvalid
            })?;

        let claims = JwtKeys::from_ref(state).verify(token.trim())?;

        // Email and name come from the record, not the token.
        match state.users.find_by_id(claims.sub).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => {
                debug!(user_id = %claims.sub, "token subject no longer exists");
                Err(AppError::TokenInvalid)
            }
            Err(e) => {
                error!(error = %e, user_id = %claims.sub, "user lookup failed");
                Err(AppError::from(e))
            }
        }
    }
}
