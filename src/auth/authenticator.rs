//! Inbound credential validation.
//!
//! Tokens are reduced to SHA-256 digests before comparison so the
//! constant-time check always runs over 32 bytes, whatever the caller sent.

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::utils::AuthUtils;
use crate::error::AuthError;

/// Validates the gateway token presented by callers.
#[derive(Clone)]
pub struct Authenticator {
    expected_digest: [u8; 32],
}

impl Authenticator {
    /// Builds an authenticator for the configured gateway token.
    #[must_use]
    pub fn new(gateway_token: &str) -> Self {
        Self {
            expected_digest: digest(gateway_token),
        }
    }

    /// Extracts the inbound credential and checks it against the configured token.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let token = AuthUtils::extract_gateway_token(headers);
        self.verify(&token)
    }

    /// Checks an already extracted credential.
    pub fn verify(&self, token: &str) -> Result<(), AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        if bool::from(digest(token)[..].ct_eq(&self.expected_digest[..])) {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}
