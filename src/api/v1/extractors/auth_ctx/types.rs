/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 */

use crate::services::auth::{ClaimSet, Verified};

/// 検証済みリクエストに付与されるコンテキスト
///
/// - `claims` は署名・クレーム検証を通過したものだけ
/// - `kid` は署名に使われた鍵 (監査/ログ相関用)
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub sub: Option<String>,
    pub token_use: Option<String>,
    pub kid: String,
    pub claims: ClaimSet,
}

impl From<Verified> for AuthCtx {
    fn from(verified: Verified) -> Self {
        Self {
            sub: verified.claims.sub().map(str::to_string),
            token_use: verified.claims.token_use().map(str::to_string),
            kid: verified.kid,
            claims: verified.claims,
        }
    }
}
