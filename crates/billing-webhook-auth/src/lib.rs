//! Webhook signature authentication for billing provider callbacks.
//!
//! This crate provides the pieces needed to authenticate inbound webhooks
//! signed with HMAC-SHA256:
//!
//! - **Canonicalization**: `Canonicalizer`, `CanonicalBytes`, `KeyOrder`, `TextEscaping`
//! - **Secrets**: `WebhookSecret`
//! - **Signing**: `Signer`, `Signature`
//! - **Verification**: `Verifier`, `Verification`, `Rejection`
//! - **Configuration**: `WebhookConfig`
//!
//! # Signature scheme
//!
//! `signature = hex(HMAC-SHA256(secret, canonical_bytes))`
//!
//! - The tag is always 64 lowercase hex characters
//! - There is no timestamp or nonce, so a captured request can be replayed
//! - The verifier hashes the exact body bytes received on the wire
//!
//! # Example
//!
//! ```
//! use billing_webhook_auth::{Signer, Verifier, WebhookSecret};
//!
//! # fn example() -> Result<(), billing_webhook_auth::SignatureError> {
//! let secret = WebhookSecret::new("whsec_test")?;
//! let signer = Signer::new(secret.clone());
//! let verifier = Verifier::new(secret);
//!
//! let body = br#"{"a":1,"b":"x"}"#;
//! let signature = signer.sign(body)?;
//!
//! assert!(verifier.verify(body, signature.as_str()).is_accepted());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Error variants are documented on the error enums themselves
#![allow(clippy::missing_errors_doc)]

pub mod canonical;
pub mod config;
pub mod error;
pub mod secret;
pub mod signer;
pub mod verifier;

pub use canonical::{CanonicalBytes, Canonicalizer, KeyOrder, ParseOptionError, TextEscaping};
pub use config::{ConfigError, WebhookConfig, DEFAULT_SIGNATURE_HEADER};
pub use error::{Result, SignatureError};
pub use secret::WebhookSecret;
pub use signer::{Signature, SignedPayload, Signer, SIGNATURE_HEX_LEN};
pub use verifier::{Rejection, Verification, Verifier};
