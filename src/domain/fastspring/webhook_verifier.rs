//! FastSpring webhook signature verification.
//!
//! FastSpring signs the raw request body with HMAC-SHA256 keyed by the
//! store's webhook secret and sends the base64 digest in `X-FS-Signature`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::event::WebhookBatch;
use super::webhook_errors::WebhookError;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "X-FS-Signature";

type HmacSha256 = Hmac<Sha256>;

/// Verifier for FastSpring webhook signatures.
pub struct FastSpringWebhookVerifier {
    secret: SecretString,
}

impl FastSpringWebhookVerifier {
    /// Creates a new verifier with the given webhook secret.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies the signature and parses the batch.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` - Header is not base64 or does not match the body
    /// - `ParseError` - Body is not a valid webhook batch
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookBatch, WebhookError> {
        self.verify(payload, signature_header)?;
        parse_batch(payload)
    }

    /// Checks the base64 HMAC-SHA256 signature of `payload`.
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<(), WebhookError> {
        let provided = STANDARD
            .decode(signature_header.trim())
            .map_err(|_| WebhookError::InvalidSignature)?;
        let expected = self.digest(payload)?;

        if !constant_time_compare(&expected, &provided) {
            return Err(WebhookError::InvalidSignature);
        }
        Ok(())
    }

    /// Produces the header value FastSpring would send for `payload`.
    pub fn sign(&self, payload: &[u8]) -> Result<String, WebhookError> {
        Ok(STANDARD.encode(self.digest(payload)?))
    }

    fn digest(&self, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Parses a webhook body without signature checks.
pub fn parse_batch(payload: &[u8]) -> Result<WebhookBatch, WebhookError> {
    serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
