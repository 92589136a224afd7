/*
 * Responsibility
 * - ドメインロジック (トークン検証) の公開
 * - HTTP / axum には依存しない
 */
pub mod auth;
