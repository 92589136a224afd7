use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::state::AppState;

use super::AuthCtx;

/// Verified caller for a handler.
///
/// Reads the `AuthCtx` that the access middleware stored after a successful
/// `verify`. A route mounted without that middleware has no context, which is
/// answered like a request without a token: 401 with the realm challenge.
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthCtx>() {
            Some(ctx) => Ok(Self(ctx.clone())),
            None => Err(AppError::unauthorized(
                state.realm.as_ref(),
                AuthError::MissingHeader,
            )),
        }
    }
}
