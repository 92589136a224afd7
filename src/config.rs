/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, AWS_REGION, COGNITO_USER_POOL_ID, JWKS_PATH など)
 * - HTTP 共通の上限 (BODY_LIMIT_BYTES, REQUEST_TIMEOUT_SECS)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::middleware::http::HttpLimits;
use crate::services::auth::{IssuerPolicy, KeyDecodePolicy};

pub const DEFAULT_TOKEN_HEADER: &str = "Authorization";
pub const DEFAULT_REALM: &str = "cognito-guard";

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub aws_region: String,
    pub user_pool_id: String,
    pub jwks_path: PathBuf,

    pub key_decode_policy: KeyDecodePolicy,
    pub issuer_policy: IssuerPolicy,

    pub token_header: String,
    pub realm: String,

    pub http_limits: HttpLimits,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key -> value source (env in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let aws_region = required(&lookup, "AWS_REGION")?;
        let user_pool_id = required(&lookup, "COGNITO_USER_POOL_ID")?;
        let jwks_path = PathBuf::from(required(&lookup, "JWKS_PATH")?);

        let key_decode_policy = match lookup("KEY_DECODE_POLICY") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("KEY_DECODE_POLICY"))?,
            None => KeyDecodePolicy::default(),
        };

        let issuer_policy = match lookup("ISSUER_POLICY") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("ISSUER_POLICY"))?,
            None => IssuerPolicy::default(),
        };

        let token_header = lookup("AUTH_TOKEN_HEADER")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_HEADER.to_string());
        axum::http::HeaderName::from_str(&token_header)
            .map_err(|_| ConfigError::Invalid("AUTH_TOKEN_HEADER"))?;

        let realm = lookup("AUTH_REALM")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REALM.to_string());

        let defaults = HttpLimits::default();
        let http_limits = HttpLimits {
            body_bytes: match lookup("BODY_LIMIT_BYTES") {
                Some(v) => v
                    .parse()
                    .map_err(|_| ConfigError::Invalid("BODY_LIMIT_BYTES"))?,
                None => defaults.body_bytes,
            },
            timeout: match lookup("REQUEST_TIMEOUT_SECS") {
                Some(v) => v
                    .parse()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or(ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?,
                None => defaults.timeout,
            },
        };

        Ok(Self {
            addr,
            aws_region,
            user_pool_id,
            jwks_path,
            key_decode_policy,
            issuer_policy,
            token_header,
            realm,
            http_limits,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}
