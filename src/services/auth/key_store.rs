//! Immutable kid -> key mapping, built once from a provider key-set document.
//!
//! Never mutated after construction, so it is shared across requests behind an
//! `Arc` without locking. A refresh replaces the whole store.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::warn;

use super::error::AuthError;
use super::jwk::{JwkRecord, JwkSet, VerificationKey, decode_key};

/// What to do when a single key record fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyDecodePolicy {
    /// Drop the entry and record the error; the other keys stay usable.
    #[default]
    Skip,
    /// Fail construction on the first bad entry.
    Strict,
}

impl FromStr for KeyDecodePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "strict" => Ok(Self::Strict),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    keys: HashMap<String, VerificationKey>,
    rejected: Vec<AuthError>,
}

impl KeyStore {
    pub fn from_records<'a, I>(records: I, policy: KeyDecodePolicy) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = &'a JwkRecord>,
    {
        let mut keys = HashMap::new();
        let mut rejected = Vec::new();

        for record in records {
            match decode_key(record) {
                Ok(key) => {
                    if keys.contains_key(key.kid()) {
                        // kids are unique; keep the first occurrence
                        warn!(kid = %key.kid(), "duplicate kid in key set, ignoring");
                        continue;
                    }
                    keys.insert(key.kid().to_string(), key);
                }
                Err(err) if policy == KeyDecodePolicy::Skip => {
                    warn!(error = %err, "skipping undecodable key");
                    rejected.push(err);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(Self { keys, rejected })
    }

    pub fn from_jwk_set(set: &JwkSet, policy: KeyDecodePolicy) -> Result<Self, AuthError> {
        Self::from_records(&set.keys, policy)
    }

    pub fn get(&self, kid: &str) -> Option<&VerificationKey> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Errors recorded for entries dropped under `KeyDecodePolicy::Skip`.
    pub fn rejected(&self) -> &[AuthError] {
        &self.rejected
    }

    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }
}
