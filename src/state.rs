/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - keys: 検証鍵 (構築後は不変), verification: 検証設定
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - 鍵の更新は KeyStore を丸ごと差し替える (部分更新はしない)
 */
use std::sync::Arc;

use axum::http::HeaderName;

use crate::services::auth::{KeyStore, VerificationConfig};

#[derive(Clone, Debug)]
pub struct AppState {
    pub keys: Arc<KeyStore>,
    pub verification: Arc<VerificationConfig>,
    pub token_header: HeaderName,
    pub realm: Arc<str>,
}

impl AppState {
    pub fn new(
        keys: KeyStore,
        verification: VerificationConfig,
        token_header: HeaderName,
        realm: &str,
    ) -> Self {
        Self {
            keys: Arc::new(keys),
            verification: Arc::new(verification),
            token_header,
            realm: Arc::from(realm),
        }
    }
}
