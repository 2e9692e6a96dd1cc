//! Constant-time webhook signature verification.
//!
//! Every failure, whatever its cause, is reported as the same
//! [`Rejection`]. A missing header, a truncated tag, uppercase or non-hex
//! characters, a body that is not UTF-8, and a wrong tag are
//! indistinguishable to the caller.

use std::fmt;

use subtle::ConstantTimeEq;

use crate::secret::WebhookSecret;
use crate::signer::Signer;

/// Generic verification failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("signature mismatch")]
pub struct Rejection;

/// Outcome of verifying a webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Verification {
    /// The signature matches; the body came from a holder of the secret.
    Accepted,
    /// The signature does not match.
    Rejected(Rejection),
}

impl Verification {
    /// Whether the webhook was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Convert into a `Result` for use with `?`.
    pub fn into_result(self) -> Result<(), Rejection> {
        match self {
            Self::Accepted => Ok(()),
            Self::Rejected(rejection) => Err(rejection),
        }
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected(rejection) => write!(f, "rejected: {rejection}"),
        }
    }
}

/// Verifies webhook signatures against a secret.
#[derive(Debug, Clone)]
pub struct Verifier {
    signer: Signer,
}

impl Verifier {
    /// Create a verifier for the given secret.
    #[must_use]
    pub fn new(secret: WebhookSecret) -> Self {
        Self {
            signer: Signer::new(secret),
        }
    }

    /// Verify `received` against the exact body bytes taken off the wire.
    ///
    /// # Arguments
    ///
    /// * `body` - The raw request body. Do not parse and re-serialize it
    /// * `received` - Value of the signature header
    ///
    /// # Returns
    ///
    /// [`Verification::Accepted`] if `received` is the signature of `body`
    /// under this verifier's secret, otherwise the generic
    /// [`Verification::Rejected`]. The comparison does not exit early on
    /// the first differing character.
    ///
    /// # Example
    ///
    /// ```
    /// use billing_webhook_auth::{Verifier, WebhookSecret};
    ///
    /// let verifier = Verifier::new(WebhookSecret::new("whsec_test").unwrap());
    /// let body = br#"{"a":1,"b":"x"}"#;
    ///
    /// let good = "980dcbe85c0ab7ac06da63a247de0c108573533b5de0f5187ea647735ca5146a";
    /// assert!(verifier.verify(body, good).is_accepted());
    /// assert!(!verifier.verify(body, "deadbeef").is_accepted());
    /// ```
    pub fn verify(&self, body: &[u8], received: &str) -> Verification {
        let Ok(expected) = self.signer.sign(body) else {
            return self.reject();
        };

        // Length is public (always 64 for a well-formed tag); content is
        // compared without early exit.
        let matches: bool = expected.as_str().as_bytes().ct_eq(received.as_bytes()).into();

        if matches {
            tracing::debug!(len = body.len(), "Webhook signature verified");
            Verification::Accepted
        } else {
            self.reject()
        }
    }

    /// Verify using an optional header value.
    ///
    /// A missing header is rejected the same way as a wrong signature.
    pub fn verify_header(&self, body: &[u8], header: Option<&str>) -> Verification {
        match header {
            Some(received) => self.verify(body, received),
            None => self.reject(),
        }
    }

    #[allow(clippy::unused_self)]
    fn reject(&self) -> Verification {
        tracing::warn!("Webhook signature rejected");
        Verification::Rejected(Rejection)
    }
}
