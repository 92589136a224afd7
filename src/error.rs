/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - 認証エラーは理由を問わず 401 + WWW-Authenticate に変換
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{reason}")]
    Unauthorized { realm: String, reason: AuthError },
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn unauthorized(realm: impl Into<String>, reason: AuthError) -> Self {
        Self::Unauthorized {
            realm: realm.into(),
            reason,
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, realm) = match self {
            AppError::Unauthorized { realm, reason } => {
                (StatusCode::UNAUTHORIZED, reason.to_string(), Some(realm))
            }
            AppError::NotFound { resource } => {
                (StatusCode::NOT_FOUND, format!("{resource} not found."), None)
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".into(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: status.as_u16(),
                message,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(realm) = realm {
            // Realm comes from config; fall back to a bare challenge if it is not a valid header value
            let challenge = HeaderValue::from_str(&format!("JWT realm={realm}"))
                .unwrap_or_else(|_| HeaderValue::from_static("JWT"));
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, challenge);
        }
        response
    }
}
