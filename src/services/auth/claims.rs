//! Claim set and the individual claim checks.
//!
//! Every check is a pure function over a `ClaimSet`; string comparisons go
//! through `ct` so they run in fixed time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ct;
use super::error::AuthError;

pub const TOKEN_USES: [&str; 2] = ["id", "access"];

/// Token payload as a name -> JSON value map.
///
/// Only ever handed to callers after the signature and claim checks pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn iss(&self) -> Option<&str> {
        self.get_str("iss")
    }

    pub fn sub(&self) -> Option<&str> {
        self.get_str("sub")
    }

    pub fn token_use(&self) -> Option<&str> {
        self.get_str("token_use")
    }

    /// `exp` as whole seconds. JSON numbers may arrive as floats; the
    /// fractional part is dropped.
    pub fn exp(&self) -> Result<i64, AuthError> {
        match self.0.get("exp") {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                .ok_or(AuthError::ClaimParseError),
            _ => Err(AuthError::ClaimParseError),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl TryFrom<Value> for ClaimSet {
    type Error = AuthError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(AuthError::MalformedToken),
        }
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// `iss` must equal one of `allowed` (case-sensitive).
pub fn validate_issuer(claims: &ClaimSet, allowed: &[impl AsRef<str>]) -> Result<(), AuthError> {
    match claims.iss() {
        Some(iss) if ct::str_in(iss, allowed) => Ok(()),
        _ => Err(AuthError::InvalidClaim { field: "iss" }),
    }
}

/// `token_use` must be `"id"` or `"access"`.
pub fn validate_token_use(claims: &ClaimSet) -> Result<(), AuthError> {
    match claims.token_use() {
        Some(token_use) if ct::str_in(token_use, &TOKEN_USES) => Ok(()),
        _ => Err(AuthError::InvalidClaim { field: "token_use" }),
    }
}

/// `exp` must be present, numeric and not before `now`.
pub fn validate_expiry(claims: &ClaimSet, now: i64) -> Result<(), AuthError> {
    let exp = claims.exp()?;
    if ct::not_after(now, exp) {
        Ok(())
    } else {
        Err(AuthError::ExpiredToken)
    }
}
