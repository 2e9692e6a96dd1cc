//! HMAC-SHA256 webhook signing.

use std::fmt;

use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;

use crate::canonical::{CanonicalBytes, Canonicalizer};
use crate::error::{Result, SignatureError};
use crate::secret::WebhookSecret;

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded signature (32 bytes of HMAC-SHA256 output).
pub const SIGNATURE_HEX_LEN: usize = 64;

/// A webhook signature: 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// The signature as a hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the hex string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Signature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A canonical body together with its signature, ready to transmit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    /// Canonical request body.
    pub body: CanonicalBytes,
    /// Signature over `body`.
    pub signature: Signature,
}

/// Signs payloads with a webhook secret.
///
/// Holds the secret for its whole lifetime and never logs it. Cheap to clone
/// and safe to share across threads.
#[derive(Debug, Clone)]
pub struct Signer {
    secret: WebhookSecret,
    canonicalizer: Canonicalizer,
}

impl Signer {
    /// Create a signer using the default (order-preserving) canonicalizer.
    #[must_use]
    pub fn new(secret: WebhookSecret) -> Self {
        Self {
            secret,
            canonicalizer: Canonicalizer::default(),
        }
    }

    /// Use a different canonicalizer for [`Signer::sign_payload`].
    #[must_use]
    pub fn with_canonicalizer(mut self, canonicalizer: Canonicalizer) -> Self {
        self.canonicalizer = canonicalizer;
        self
    }

    /// The canonicalizer used for structured payloads.
    #[must_use]
    pub fn canonicalizer(&self) -> Canonicalizer {
        self.canonicalizer
    }

    /// Sign raw body bytes.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The exact request body, as it will be sent on the wire
    ///
    /// # Returns
    ///
    /// The hex-encoded HMAC-SHA256 of `bytes` (64 lowercase characters).
    ///
    /// # Errors
    ///
    /// [`SignatureError::Encoding`] if `bytes` is not valid UTF-8. Nothing is
    /// hashed in that case.
    ///
    /// # Example
    ///
    /// ```
    /// use billing_webhook_auth::{Signer, WebhookSecret};
    ///
    /// let signer = Signer::new(WebhookSecret::new("key").unwrap());
    /// let signature = signer
    ///     .sign(b"The quick brown fox jumps over the lazy dog")
    ///     .unwrap();
    /// assert_eq!(
    ///     signature.as_str(),
    ///     "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
    /// );
    /// ```
    pub fn sign(&self, bytes: &[u8]) -> Result<Signature> {
        std::str::from_utf8(bytes)
            .map_err(|e| SignatureError::Encoding(format!("payload is not valid UTF-8: {e}")))?;
        self.compute(bytes)
    }

    /// Sign bytes produced by a [`Canonicalizer`].
    ///
    /// Skips the UTF-8 check; canonical bytes are UTF-8 by construction.
    pub fn sign_canonical(&self, bytes: &CanonicalBytes) -> Result<Signature> {
        self.compute(bytes.as_bytes())
    }

    /// Canonicalize a payload and sign it.
    ///
    /// # Arguments
    ///
    /// * `payload` - The structured payload; keys are taken in map order
    ///   unless the signer's canonicalizer sorts them
    ///
    /// # Returns
    ///
    /// The canonical body to transmit and its signature. Send `body`
    /// verbatim; re-serializing it may change the bytes.
    ///
    /// # Errors
    ///
    /// [`SignatureError::Serialization`] if the payload cannot be encoded.
    pub fn sign_payload(&self, payload: &Value) -> Result<SignedPayload> {
        let body = self.canonicalizer.canonicalize(payload)?;
        let signature = self.sign_canonical(&body)?;
        Ok(SignedPayload { body, signature })
    }

    fn compute(&self, bytes: &[u8]) -> Result<Signature> {
        // HMAC accepts keys of any length, so this only fails if the
        // implementation is broken.
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| SignatureError::InvalidSecret)?;
        mac.update(bytes);

        let signature = Signature(hex::encode(mac.finalize().into_bytes()));
        tracing::debug!(len = bytes.len(), "Computed webhook signature");

        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signer(secret: &str) -> Signer {
        Signer::new(WebhookSecret::new(secret).unwrap())
    }

    #[test]
    fn matches_hmac_sha256_reference_vector() {
        let signature = signer("key")
            .sign(b"The quick brown fox jumps over the lazy dog")
            .unwrap();
        assert_eq!(
            signature.as_str(),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn signs_example_payload() {
        let signed = signer("whsec_test")
            .sign_payload(&json!({"a": 1, "b": "x"}))
            .unwrap();
        assert_eq!(signed.body.as_str(), r#"{"a":1,"b":"x"}"#);
        assert_eq!(
            signed.signature.as_str(),
            "980dcbe85c0ab7ac06da63a247de0c108573533b5de0f5187ea647735ca5146a"
        );
    }

    #[test]
    fn produces_64_lowercase_hex_chars() {
        let signature = signer("secret").sign(b"message").unwrap();
        assert_eq!(signature.as_str().len(), SIGNATURE_HEX_LEN);
        assert!(signature
            .as_str()
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }

    #[test]
    fn is_deterministic() {
        let signer = signer("secret");
        assert_eq!(
            signer.sign(b"message").unwrap(),
            signer.sign(b"message").unwrap()
        );
    }

    #[test]
    fn different_inputs_differ() {
        let signer = signer("secret");
        assert_ne!(
            signer.sign(b"message1").unwrap(),
            signer.sign(b"message2").unwrap()
        );
    }

    #[test]
    fn non_utf8_body_is_an_encoding_error() {
        let err = signer("secret").sign(&[0x7b, 0xff, 0x7d]).unwrap_err();
        assert!(matches!(err, SignatureError::Encoding(_)));
    }

    #[test]
    fn empty_body_is_signable() {
        let signature = signer("secret").sign(b"").unwrap();
        assert_eq!(signature.as_str().len(), SIGNATURE_HEX_LEN);
    }

    #[test]
    fn sorted_canonicalizer_changes_the_body() {
        let signer = signer("whsec_test")
            .with_canonicalizer(Canonicalizer::new(crate::KeyOrder::Sorted));
        let signed = signer.sign_payload(&json!({"b": "x", "a": 1})).unwrap();
        assert_eq!(signed.body.as_str(), r#"{"a":1,"b":"x"}"#);
        assert_eq!(
            signed.signature.as_str(),
            "980dcbe85c0ab7ac06da63a247de0c108573533b5de0f5187ea647735ca5146a"
        );
    }
}
