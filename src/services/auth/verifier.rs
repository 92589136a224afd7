//! Bearer token verification against a user pool key store.
//!
//! Steps run strictly in order; the first failure ends the call:
//! 1. split and decode the compact token (`MalformedToken`)
//! 2. require an RSA PKCS#1 algorithm (`UnsupportedAlgorithm`)
//! 3. resolve `kid` in the key store (`UnknownKey`)
//! 4. verify the signature (`InvalidSignature`)
//! 5. read `iss` (`MissingIssuer`) and, for user pool issuers, check
//!    issuer / token_use / exp
//!
//! Claims never leave this module unless step 4 succeeded.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;
use tracing::debug;

use super::claims::{self, ClaimSet};
use super::error::AuthError;
use super::jwk::rsa_algorithm;
use super::key_store::KeyStore;

/// Substring that marks an issuer as belonging to the user pool service.
pub const PROVIDER_ISSUER_MARKER: &str = "cognito-idp";

/// Returns the current Unix time in seconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Which issuers get the user pool claim checks (issuer, token_use, exp).
///
/// Tokens from any other issuer are accepted on signature alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IssuerPolicy {
    /// `iss` contains the marker anywhere. An attacker-chosen issuer that
    /// embeds the marker still gets the full checks, and will then fail the
    /// exact issuer match, but any issuer without the marker skips them.
    #[default]
    Substring,
    /// `iss` parses as an https URL whose host is `<marker>.<region>.amazonaws.com`.
    Host,
}

impl IssuerPolicy {
    pub fn is_provider_issuer(self, iss: &str, marker: &str) -> bool {
        match self {
            Self::Substring => iss.contains(marker),
            Self::Host => url::Url::parse(iss)
                .ok()
                .filter(|u| u.scheme() == "https")
                .and_then(|u| {
                    u.host_str().map(|host| {
                        host.strip_prefix(marker)
                            .and_then(|rest| rest.strip_prefix('.'))
                            .and_then(|rest| rest.strip_suffix(".amazonaws.com"))
                            .is_some_and(|region| !region.is_empty() && !region.contains('.'))
                    })
                })
                .unwrap_or(false),
        }
    }
}

impl std::str::FromStr for IssuerPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "host" => Ok(Self::Host),
            _ => Err(()),
        }
    }
}

/// Per-pool verification settings. Immutable for the duration of a call.
#[derive(Clone)]
pub struct VerificationConfig {
    region: String,
    user_pool_id: String,
    issuer_marker: String,
    issuer_policy: IssuerPolicy,
    clock: Clock,
}

impl std::fmt::Debug for VerificationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationConfig")
            .field("region", &self.region)
            .field("user_pool_id", &self.user_pool_id)
            .field("issuer_marker", &self.issuer_marker)
            .field("issuer_policy", &self.issuer_policy)
            .finish_non_exhaustive()
    }
}

impl VerificationConfig {
    pub fn new(region: impl Into<String>, user_pool_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            user_pool_id: user_pool_id.into(),
            issuer_marker: PROVIDER_ISSUER_MARKER.to_string(),
            issuer_policy: IssuerPolicy::default(),
            clock: Arc::new(|| chrono::Utc::now().timestamp()),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_issuer_policy(mut self, policy: IssuerPolicy) -> Self {
        self.issuer_policy = policy;
        self
    }

    pub fn with_issuer_marker(mut self, marker: impl Into<String>) -> Self {
        self.issuer_marker = marker.into();
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn user_pool_id(&self) -> &str {
        &self.user_pool_id
    }

    pub fn issuer_policy(&self) -> IssuerPolicy {
        self.issuer_policy
    }

    /// `https://cognito-idp.{region}.amazonaws.com/{user_pool_id}`
    pub fn expected_issuer(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }

    /// Where the pool publishes its key set.
    pub fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.expected_issuer())
    }

    pub fn now(&self) -> i64 {
        (self.clock)()
    }

    fn is_provider_issuer(&self, iss: &str) -> bool {
        self.issuer_policy.is_provider_issuer(iss, &self.issuer_marker)
    }
}

/// A token that passed every check.
#[derive(Debug, Clone)]
pub struct Verified {
    pub claims: ClaimSet,
    pub kid: String,
    pub algorithm: Algorithm,
}

/// Where a verification call stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Unparsed,
    StructurallyParsed,
    AlgorithmChecked,
    KeyResolved,
    SignatureVerified,
    ClaimsValidated,
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    #[serde(default)]
    alg: Option<String>,
    #[serde(default)]
    kid: Option<String>,
}

struct RawToken<'a> {
    compact: &'a str,
    header: RawHeader,
    claims: ClaimSet,
}

impl<'a> RawToken<'a> {
    fn parse(compact: &'a str) -> Result<Self, AuthError> {
        let mut parts = compact.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::MalformedToken);
        };

        let header: RawHeader = decode_segment(header).and_then(|bytes| {
            serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
        })?;
        let claims = decode_segment(payload)
            .and_then(|bytes| {
                serde_json::from_slice::<serde_json::Value>(&bytes)
                    .map_err(|_| AuthError::MalformedToken)
            })
            .and_then(ClaimSet::try_from)?;
        // An empty signature is structurally fine; alg "none" is rejected next.
        decode_segment(signature)?;

        Ok(Self {
            compact,
            header,
            claims,
        })
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::MalformedToken)
}

/// Verify `token` against `keys` and `config`.
///
/// # Errors
/// One `AuthError` per failed step; see the module docs for the order.
pub fn verify(
    token: &str,
    keys: &KeyStore,
    config: &VerificationConfig,
) -> Result<Verified, AuthError> {
    let mut stage = Stage::Unparsed;
    let result = run(token, keys, config, &mut stage);
    if let Err(err) = &result {
        debug!(?stage, kind = err.kind(), "token rejected");
    }
    result
}

fn run(
    token: &str,
    keys: &KeyStore,
    config: &VerificationConfig,
    stage: &mut Stage,
) -> Result<Verified, AuthError> {
    let raw = RawToken::parse(token)?;
    *stage = Stage::StructurallyParsed;

    let algorithm = match raw.header.alg.as_deref() {
        Some(alg) => {
            rsa_algorithm(alg).ok_or_else(|| AuthError::UnsupportedAlgorithm(alg.to_string()))?
        }
        None => return Err(AuthError::UnsupportedAlgorithm("none".to_string())),
    };
    *stage = Stage::AlgorithmChecked;

    let kid = raw.header.kid.as_deref().ok_or(AuthError::UnknownKey)?;
    let key = keys.get(kid).ok_or(AuthError::UnknownKey)?;
    *stage = Stage::KeyResolved;

    verify_signature(raw.compact, key.decoding_key(), algorithm)?;
    *stage = Stage::SignatureVerified;

    let claims = raw.claims;
    let iss = match claims.get("iss") {
        None | Some(serde_json::Value::Null) => return Err(AuthError::MissingIssuer),
        Some(value) => value.as_str().ok_or(AuthError::InvalidClaim { field: "iss" })?,
    };

    if config.is_provider_issuer(iss) {
        validate_provider_claims(&claims, config)?;
    } else {
        debug!(iss, "issuer outside user pool, claim checks skipped");
    }
    *stage = Stage::ClaimsValidated;

    Ok(Verified {
        claims,
        kid: kid.to_string(),
        algorithm,
    })
}

/// Issuer, token_use and expiry checks for tokens minted by the user pool.
pub fn validate_provider_claims(
    claims: &ClaimSet,
    config: &VerificationConfig,
) -> Result<(), AuthError> {
    claims::validate_issuer(claims, &[config.expected_issuer()])?;
    claims::validate_token_use(claims)?;
    claims::validate_expiry(claims, config.now())
}

// Signature only: every claim rule is ours, so jsonwebtoken's are switched off.
fn verify_signature(
    token: &str,
    key: &jsonwebtoken::DecodingKey,
    algorithm: Algorithm,
) -> Result<(), AuthError> {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<serde_json::Value>(token, key, &validation)
        .map(|_| ())
        .map_err(|e| {
            debug!(error = %e, "signature check failed");
            signature_error(e.kind())
        })
}

// jsonwebtoken parses the full JOSE header (`typ`, `cty`, `jwk`, ...), which
// our own header read does not; those failures are structural.
fn signature_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => AuthError::MalformedToken,
        _ => AuthError::InvalidSignature,
    }
}
