//! Factory: build the `KeyStore` and `VerificationConfig` from application `Config`.
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::services::auth::{JwkSet, KeyStore, VerificationConfig};
use crate::services::auth::error::AuthError;

#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("cannot read key set {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid key set document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Decode(#[from] AuthError),
}

pub fn load_key_store(config: &Config) -> Result<KeyStore, KeyStoreError> {
    let raw = std::fs::read_to_string(&config.jwks_path).map_err(|source| KeyStoreError::Read {
        path: config.jwks_path.clone(),
        source,
    })?;
    let store = parse_key_store(&raw, config)?;

    info!(
        keys = store.len(),
        rejected = store.rejected().len(),
        path = %config.jwks_path.display(),
        "key set loaded"
    );
    Ok(store)
}

pub fn parse_key_store(raw: &str, config: &Config) -> Result<KeyStore, KeyStoreError> {
    let set: JwkSet = serde_json::from_str(raw)?;
    Ok(KeyStore::from_jwk_set(&set, config.key_decode_policy)?)
}

pub fn build_verification_config(config: &Config) -> VerificationConfig {
    VerificationConfig::new(&config.aws_region, &config.user_pool_id)
        .with_issuer_policy(config.issuer_policy)
}
