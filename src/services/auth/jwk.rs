//! Provider key-set document and RSA key material decoding.
//!
//! The document shape is the user pool's `/.well-known/jwks.json`:
//! `{"keys": [{"kid", "alg", "kty", "use", "n", "e"}, ...]}`.
//!
//! Entries are read leniently: a record that is missing fields, or is not an
//! RSA key at all, still parses and is rejected later by `decode_key`, so one
//! odd entry never takes the whole document down with it.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::AuthError;

// Accept both padded and unpadded base64url; providers differ.
const B64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JwkSet {
    #[serde(deserialize_with = "lenient_records")]
    pub keys: Vec<JwkRecord>,
}

/// One `keys` entry. Fields that are absent or not strings are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct JwkRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kty: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

impl JwkRecord {
    pub fn from_entry(entry: &Value) -> Self {
        let field = |name: &str| entry.get(name).and_then(Value::as_str).map(str::to_string);
        Self {
            kid: field("kid"),
            alg: field("alg"),
            kty: field("kty"),
            key_use: field("use"),
            n: field("n"),
            e: field("e"),
        }
    }
}

fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<JwkRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries.iter().map(JwkRecord::from_entry).collect())
}

/// Map a JOSE `alg` name onto the RSA PKCS#1 v1.5 family.
///
/// Anything else (`none`, HMAC, EC, PSS) is `None`.
pub fn rsa_algorithm(name: &str) -> Option<Algorithm> {
    match name {
        "RS256" => Some(Algorithm::RS256),
        "RS384" => Some(Algorithm::RS384),
        "RS512" => Some(Algorithm::RS512),
        _ => None,
    }
}

/// A decoded public key, ready for signature verification.
///
/// Immutable once built; owned by the `KeyStore`.
#[derive(Clone)]
pub struct VerificationKey {
    kid: String,
    algorithm: Algorithm,
    exponent: u32,
    modulus_bits: usize,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("VerificationKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .field("modulus_bits", &self.modulus_bits)
            .finish_non_exhaustive()
    }
}

impl VerificationKey {
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Algorithm declared by the key record.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    pub fn modulus_bits(&self) -> usize {
        self.modulus_bits
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// Decode one key record into a `VerificationKey`.
///
/// The exponent is left-padded to a 4-byte big-endian integer; the modulus is
/// taken as an unsigned big-endian integer of any width.
pub fn decode_key(record: &JwkRecord) -> Result<VerificationKey, AuthError> {
    let fail = |reason: &str| AuthError::KeyDecodeError {
        kid: record.kid.clone().unwrap_or_default(),
        reason: reason.to_string(),
    };

    let kid = record
        .kid
        .as_deref()
        .filter(|kid| !kid.is_empty())
        .ok_or_else(|| fail("missing kid"))?;
    if record.kty.as_deref() != Some("RSA") {
        return Err(fail("key type is not RSA"));
    }
    let algorithm = record
        .alg
        .as_deref()
        .and_then(rsa_algorithm)
        .ok_or_else(|| fail("unsupported key algorithm"))?;
    let e = record.e.as_deref().ok_or_else(|| fail("missing exponent"))?;
    let n = record.n.as_deref().ok_or_else(|| fail("missing modulus"))?;

    let raw_e = B64URL
        .decode(e.as_bytes())
        .map_err(|_| fail("exponent is not valid base64url"))?;
    let exponent = exponent_from_be(&raw_e).ok_or_else(|| fail("exponent out of range"))?;

    let raw_n = B64URL
        .decode(n.as_bytes())
        .map_err(|_| fail("modulus is not valid base64url"))?;
    let modulus = strip_leading_zeros(&raw_n);
    if modulus.is_empty() {
        return Err(fail("modulus is zero"));
    }

    let modulus_bits = modulus.len() * 8 - modulus[0].leading_zeros() as usize;
    let exponent_bytes = exponent.to_be_bytes();
    let decoding_key =
        DecodingKey::from_rsa_raw_components(modulus, strip_leading_zeros(&exponent_bytes));

    Ok(VerificationKey {
        kid: kid.to_string(),
        algorithm,
        exponent,
        modulus_bits,
        decoding_key,
    })
}

// Short exponents ("AQAB" is three bytes) are left-padded to four.
fn exponent_from_be(raw: &[u8]) -> Option<u32> {
    let raw = strip_leading_zeros(raw);
    if raw.len() > 4 {
        return None;
    }
    let mut padded = [0u8; 4];
    padded[4 - raw.len()..].copy_from_slice(raw);
    let e = u32::from_be_bytes(padded);
    (e != 0).then_some(e)
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}
