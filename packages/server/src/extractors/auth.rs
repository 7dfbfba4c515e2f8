use axum::{extract::FromRequestParts, http::request::Parts};
use common::Actor;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated evaluator extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication. Permission
/// checks happen in the judging services, which receive [`AuthUser::actor`].
pub struct AuthUser(pub Actor);

impl AuthUser {
    pub fn actor(&self) -> &Actor {
        &self.0
    }

    pub fn user_id(&self) -> i32 {
        self.0.id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser(claims.into_actor()))
    }
}
