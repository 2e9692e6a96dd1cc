//! Webhook authentication configuration.
//!
//! The secret is loaded once at startup, from a JSON secrets file if one is
//! found and otherwise from the environment, and then handed to the
//! [`Signer`] or [`Verifier`] that uses it.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::canonical::{Canonicalizer, KeyOrder, ParseOptionError, TextEscaping};
use crate::error::SignatureError;
use crate::secret::WebhookSecret;
use crate::signer::Signer;
use crate::verifier::Verifier;

/// Header that carries the signature by default.
pub const DEFAULT_SIGNATURE_HEADER: &str = "x-signature";

/// Paths searched for a webhook secrets file, in order.
pub const SECRET_PATHS: [&str; 2] = [".secrets/webhook.json", "../.secrets/webhook.json"];

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The secrets file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the secrets file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The secrets file is not valid JSON of the expected shape.
    #[error("invalid secrets file {path}: {message}")]
    InvalidFile {
        /// Path of the secrets file.
        path: PathBuf,
        /// Parse error.
        message: String,
    },

    /// A configuration value could not be parsed.
    #[error("invalid value for {name}: {message}")]
    InvalidValue {
        /// Variable name.
        name: String,
        /// What was wrong with it.
        message: String,
    },

    /// No secret is configured, or the configured one is unusable.
    #[error(transparent)]
    Secret(#[from] SignatureError),
}

/// Webhook secrets file structure.
#[derive(Debug, Deserialize)]
struct WebhookSecrets {
    webhook_secret: String,
    #[serde(default)]
    signature_header: Option<String>,
}

/// Webhook authentication configuration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Secret shared with the billing provider.
    pub webhook_secret: Option<WebhookSecret>,

    /// Header carrying the signature (default: `x-signature`).
    pub signature_header: String,

    /// Key ordering used when canonicalizing structured payloads.
    pub key_order: KeyOrder,

    /// Escaping of non-ASCII text in structured payloads (default: ascii).
    pub text_escaping: TextEscaping,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            signature_header: DEFAULT_SIGNATURE_HEADER.into(),
            key_order: KeyOrder::default(),
            text_escaping: TextEscaping::default(),
        }
    }
}

impl WebhookConfig {
    /// Create a configuration with default values and no secret.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the webhook secret.
    #[must_use]
    pub fn with_secret(mut self, secret: WebhookSecret) -> Self {
        self.webhook_secret = Some(secret);
        self
    }

    /// Set the signature header name.
    #[must_use]
    pub fn with_signature_header(mut self, header: impl Into<String>) -> Self {
        self.signature_header = header.into();
        self
    }

    /// Set the key ordering.
    #[must_use]
    pub fn with_key_order(mut self, key_order: KeyOrder) -> Self {
        self.key_order = key_order;
        self
    }

    /// Set the text escaping.
    #[must_use]
    pub fn with_text_escaping(mut self, text_escaping: TextEscaping) -> Self {
        self.text_escaping = text_escaping;
        self
    }

    /// Load configuration from a secrets file or environment variables.
    ///
    /// Reads `WEBHOOK_SECRET`, `WEBHOOK_SIGNATURE_HEADER`,
    /// `WEBHOOK_KEY_ORDER` and `WEBHOOK_TEXT_ESCAPING`. A secrets file found
    /// at one of [`SECRET_PATHS`] takes precedence over the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let paths: Vec<PathBuf> = SECRET_PATHS.iter().map(PathBuf::from).collect();
        Self::load(|name| std::env::var(name).ok(), &paths)
    }

    /// Load configuration using `lookup` for variables and `secret_paths`
    /// for the secrets file search.
    pub fn load<F>(lookup: F, secret_paths: &[PathBuf]) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(order) = lookup("WEBHOOK_KEY_ORDER") {
            config.key_order = order
                .parse()
                .map_err(|e| invalid_value("WEBHOOK_KEY_ORDER", &e))?;
        }

        if let Some(escaping) = lookup("WEBHOOK_TEXT_ESCAPING") {
            config.text_escaping = escaping
                .parse()
                .map_err(|e| invalid_value("WEBHOOK_TEXT_ESCAPING", &e))?;
        }

        if let Some(header) = lookup("WEBHOOK_SIGNATURE_HEADER") {
            config.signature_header = header;
        }

        if let Some(path) = secret_paths.iter().find(|p| p.exists()) {
            let secrets = load_secrets_file(path)?;
            tracing::info!(path = %path.display(), "Loaded webhook secret from file");
            config.webhook_secret = Some(WebhookSecret::new(secrets.webhook_secret)?);
            if let Some(header) = secrets.signature_header {
                config.signature_header = header;
            }
            return Ok(config);
        }

        tracing::debug!("Webhook secrets file not found, using environment variables");
        config.webhook_secret = lookup("WEBHOOK_SECRET")
            .map(WebhookSecret::new)
            .transpose()?;

        Ok(config)
    }

    /// Canonicalizer matching the configured key order.
    #[must_use]
    pub fn canonicalizer(&self) -> Canonicalizer {
        Canonicalizer::new(self.key_order).with_escaping(self.text_escaping)
    }

    /// Build a signer from the configured secret.
    pub fn signer(&self) -> Result<Signer, ConfigError> {
        let secret = self.secret()?;
        Ok(Signer::new(secret).with_canonicalizer(self.canonicalizer()))
    }

    /// Build a verifier from the configured secret.
    pub fn verifier(&self) -> Result<Verifier, ConfigError> {
        Ok(Verifier::new(self.secret()?))
    }

    fn secret(&self) -> Result<WebhookSecret, ConfigError> {
        self.webhook_secret
            .clone()
            .ok_or(ConfigError::Secret(SignatureError::InvalidSecret))
    }
}

fn invalid_value(name: &str, err: &ParseOptionError) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.into(),
        message: err.to_string(),
    }
}

/// Load webhook secrets from a JSON file.
fn load_secrets_file(path: &Path) -> Result<WebhookSecrets, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|e| ConfigError::InvalidFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
