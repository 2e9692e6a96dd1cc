//! The signed test request.

use std::fmt::Write as _;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use billing_webhook_auth::SignedPayload;

use crate::error::HarnessError;

/// A signed webhook request ready to be printed or sent.
#[derive(Debug, Clone, Serialize)]
pub struct TestRequest {
    /// HTTP method (always `POST`).
    pub method: &'static str,
    /// Target endpoint URL.
    pub url: String,
    /// Name of the signature header.
    pub signature_header: String,
    /// Hex signature.
    pub signature: String,
    /// Canonical JSON body.
    pub body: String,
}

/// Response from the endpoint when the request was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl TestRequest {
    /// Build a request from a signed payload.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        signature_header: impl Into<String>,
        signed: SignedPayload,
    ) -> Self {
        Self {
            method: "POST",
            url: url.into(),
            signature_header: signature_header.into(),
            signature: signed.signature.into_string(),
            body: signed.body.into_string(),
        }
    }

    /// Render as a copy-pasteable `curl` command.
    #[must_use]
    pub fn to_curl(&self) -> String {
        let mut command = String::new();
        let _ = writeln!(command, "curl -X {} \\", self.method);
        let _ = writeln!(command, "  -H \"Content-Type: application/json\" \\");
        let _ = writeln!(
            command,
            "  -H \"{}: {}\" \\",
            self.signature_header, self.signature
        );
        let _ = writeln!(command, "  -d '{}' \\", shell_single_quote(&self.body));
        let _ = write!(command, "  {}", self.url);
        command
    }

    /// Send the request and return the endpoint's answer.
    ///
    /// A non-success status is reported as [`HarnessError::Rejected`].
    pub async fn send(&self, timeout: Duration) -> Result<SendOutcome, HarnessError> {
        let client = Client::builder().timeout(timeout).build()?;

        tracing::info!(url = %self.url, header = %self.signature_header, "Sending signed webhook");

        let response = client
            .post(&self.url)
            .header("content-type", "application/json")
            .header(self.signature_header.as_str(), &self.signature)
            .body(self.body.clone())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = %status, "Webhook endpoint rejected request");
            return Err(HarnessError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(status = %status, "Webhook endpoint accepted request");
        Ok(SendOutcome {
            status: status.as_u16(),
            body,
        })
    }
}

/// Escape a value for use inside a single-quoted shell string.
fn shell_single_quote(value: &str) -> String {
    value.replace('\'', r"'\''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use billing_webhook_auth::{Signer, WebhookSecret};
    use serde_json::json;

    fn signed(payload: &serde_json::Value) -> SignedPayload {
        Signer::new(WebhookSecret::new("whsec_test").unwrap())
            .sign_payload(payload)
            .unwrap()
    }

    #[test]
    fn renders_curl_command() {
        let request = TestRequest::new(
            "https://example.test/hook",
            "x-signature",
            signed(&json!({"a": 1, "b": "x"})),
        );

        assert_eq!(
            request.to_curl(),
            "curl -X POST \\\n  -H \"Content-Type: application/json\" \\\n  -H \"x-signature: 980dcbe85c0ab7ac06da63a247de0c108573533b5de0f5187ea647735ca5146a\" \\\n  -d '{\"a\":1,\"b\":\"x\"}' \\\n  https://example.test/hook"
        );
    }

    #[test]
    fn escapes_single_quotes_in_body() {
        let request = TestRequest::new(
            "https://example.test/hook",
            "x-signature",
            signed(&json!({"name": "O'Brien"})),
        );

        assert!(request.to_curl().contains(r#"-d '{"name":"O'\''Brien"}'"#));
        assert_eq!(request.body, r#"{"name":"O'Brien"}"#);
    }
}
