//! Rejection reasons produced by the verification core.
//!
//! The taxonomy is flat on purpose: the HTTP layer maps every variant to 401,
//! but the distinct kind is kept for logging and tests.
//! Messages never include key material or the raw token.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("auth header empty")]
    MissingHeader,
    #[error("malformed token")]
    MalformedToken,
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("unknown signing key")]
    UnknownKey,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token does not contain issuer")]
    MissingIssuer,
    #[error("invalid claim: {field:?}")]
    InvalidClaim { field: &'static str },
    #[error("cannot parse token exp")]
    ClaimParseError,
    #[error("expired token")]
    ExpiredToken,
    #[error("cannot decode key {kid:?}: {reason}")]
    KeyDecodeError { kid: String, reason: String },
}

impl AuthError {
    /// Stable identifier for logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::MalformedToken => "malformed_token",
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::UnknownKey => "unknown_key",
            Self::InvalidSignature => "invalid_signature",
            Self::MissingIssuer => "missing_issuer",
            Self::InvalidClaim { .. } => "invalid_claim",
            Self::ClaimParseError => "claim_parse_error",
            Self::ExpiredToken => "expired_token",
            Self::KeyDecodeError { .. } => "key_decode_error",
        }
    }
}
