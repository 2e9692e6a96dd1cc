//! Harness configuration.

use billing_webhook_auth::{KeyOrder, TextEscaping, DEFAULT_SIGNATURE_HEADER};

/// Endpoint the sample request targets by default.
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:54321/functions/v1/lemonsqueezy-webhook";

/// Harness configuration loaded from environment variables.
///
/// The secret is deliberately absent: it comes from the command line or an
/// interactive prompt only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Webhook endpoint URL (default: [`DEFAULT_ENDPOINT_URL`]).
    pub endpoint_url: String,

    /// Header carrying the signature (default: `x-signature`).
    pub signature_header: String,

    /// Key ordering for canonicalization (default: preserve).
    pub key_order: KeyOrder,

    /// How non-ASCII text is written (default: `\uXXXX` escapes).
    pub text_escaping: TextEscaping,

    /// Request timeout in seconds for `--send`.
    pub request_timeout_seconds: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.into(),
            signature_header: DEFAULT_SIGNATURE_HEADER.into(),
            key_order: KeyOrder::Preserve,
            text_escaping: TextEscaping::Ascii,
            request_timeout_seconds: 30,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration using `lookup` to read variables.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let key_order = match lookup("WEBHOOK_KEY_ORDER").map(|s| s.parse::<KeyOrder>()) {
            Some(Ok(order)) => order,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Ignoring WEBHOOK_KEY_ORDER");
                defaults.key_order
            }
            None => defaults.key_order,
        };

        let text_escaping =
            match lookup("WEBHOOK_TEXT_ESCAPING").map(|s| s.parse::<TextEscaping>()) {
                Some(Ok(escaping)) => escaping,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Ignoring WEBHOOK_TEXT_ESCAPING");
                    defaults.text_escaping
                }
                None => defaults.text_escaping,
            };

        Self {
            endpoint_url: lookup("WEBHOOK_ENDPOINT_URL").unwrap_or(defaults.endpoint_url),
            signature_header: lookup("WEBHOOK_SIGNATURE_HEADER")
                .unwrap_or(defaults.signature_header),
            key_order,
            text_escaping,
            request_timeout_seconds: lookup("REQUEST_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }
}
