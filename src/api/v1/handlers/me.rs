/*
 * Responsibility
 * - GET /api/v1/me
 * - 検証済みトークンのクレームをそのまま返す
 */
use axum::{Json, response::IntoResponse};
use serde_json::json;

use crate::api::v1::extractors::AuthCtxExtractor;

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> impl IntoResponse {
    Json(json!({
        "sub": ctx.sub,
        "token_use": ctx.token_use,
        "kid": ctx.kid,
        "claims": ctx.claims,
    }))
}
