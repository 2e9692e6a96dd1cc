//! Sample webhook payloads.

use std::path::PathBuf;

use serde_json::{json, Value};

use crate::error::HarnessError;

/// A LemonSqueezy `subscription_created` event for a pro plan.
///
/// Key order matters: it is the order the provider emits, and the default
/// canonicalizer keeps it.
#[must_use]
pub fn subscription_created() -> Value {
    json!({
        "meta": {
            "event_name": "subscription_created",
            "custom_data": {
                "plan": "pro",
                "user_id": "a1b2c3d4-e5f6-7890-1234-567890abcdef"
            }
        },
        "data": {
            "id": "sub_test_123",
            "type": "subscriptions",
            "attributes": {
                "customer_id": "cust_test_456",
                "status": "active",
                "plan_id": 12345,
                "custom_data": {
                    "plan": "pro"
                }
            }
        }
    })
}

/// Where the payload to sign comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    /// The built-in [`subscription_created`] event.
    Sample,
    /// A JSON file on disk.
    File(PathBuf),
    /// JSON text given on the command line.
    Inline(String),
}

impl PayloadSource {
    /// Load the payload, keeping object key order as written.
    pub fn load(&self) -> Result<Value, HarnessError> {
        match self {
            Self::Sample => Ok(subscription_created()),
            Self::File(path) => {
                let text =
                    std::fs::read_to_string(path).map_err(|e| HarnessError::PayloadFile {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                serde_json::from_str(&text).map_err(|e| HarnessError::PayloadFile {
                    path: path.clone(),
                    message: e.to_string(),
                })
            }
            Self::Inline(text) => Ok(serde_json::from_str(text)
                .map_err(billing_webhook_auth::SignatureError::from)?),
        }
    }
}
