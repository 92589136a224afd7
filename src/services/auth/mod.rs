pub mod claims;
pub mod ct;
pub mod error;
pub mod factory;
pub mod jwk;
pub mod key_store;
pub mod verifier;

pub use claims::{ClaimSet, validate_expiry, validate_issuer, validate_token_use};
pub use error::AuthError;
pub use factory::{build_verification_config, load_key_store};
pub use jwk::{JwkRecord, JwkSet, VerificationKey, decode_key};
pub use key_store::{KeyDecodePolicy, KeyStore};
pub use verifier::{IssuerPolicy, Verified, VerificationConfig, verify};
