//! Bearer token check for protected routes.
//!
//! Reads the token header, runs `services::auth::verify`, and either aborts the
//! chain with 401 or stores an `AuthCtx` in request extensions for handlers.
//! The header is checked before any token parsing, so a request without it is
//! rejected as `MissingHeader`.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, Request},
    middleware::{self, Next},
    response::Response,
};
use tracing::warn;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{self, AuthError};
use crate::state::AppState;

/// Protect every route of `router` with token verification.
///
/// ```ignore
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let verified = token_from_header(req.headers(), &state.token_header)
        .and_then(|token| auth::verify(token, &state.keys, &state.verification));

    let verified = match verified {
        Ok(verified) => verified,
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "access token verification failed");
            return Err(AppError::unauthorized(state.realm.as_ref(), err));
        }
    };

    req.extensions_mut().insert(AuthCtx::from(verified));

    Ok(next.run(req).await)
}

const BEARER: &str = "bearer";

/// Extract the raw token from `name`. A `Bearer ` prefix is optional.
pub fn token_from_header<'a>(
    headers: &'a HeaderMap,
    name: &HeaderName,
) -> Result<&'a str, AuthError> {
    let value = headers
        .get(name)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedToken)?
        .trim();

    // a bare scheme with nothing after it is an empty header
    let token = match value.get(..BEARER.len()) {
        Some(scheme) if scheme.eq_ignore_ascii_case(BEARER) => match &value[BEARER.len()..] {
            rest if rest.is_empty() || rest.starts_with(' ') => rest.trim_start(),
            _ => value,
        },
        _ => value,
    };

    if token.is_empty() {
        return Err(AuthError::MissingHeader);
    }
    Ok(token)
}
