//! The shared webhook signing secret.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, SignatureError};

/// Secret shared with the billing provider.
///
/// Never empty and always valid UTF-8. `Debug` output is redacted and the
/// backing memory is wiped on drop. The key bytes are only reachable from
/// inside this crate.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WebhookSecret(String);

impl WebhookSecret {
    /// Create a secret from a string.
    ///
    /// Fails with [`SignatureError::InvalidSecret`] if the string is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(SignatureError::InvalidSecret);
        }
        Ok(Self(secret))
    }

    /// Create a secret from raw bytes.
    ///
    /// Fails with [`SignatureError::Encoding`] if the bytes are not UTF-8
    /// and with [`SignatureError::InvalidSecret`] if they are empty.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let secret = String::from_utf8(bytes).map_err(|e| {
            let mut rejected = e.into_bytes();
            rejected.zeroize();
            SignatureError::Encoding("webhook secret is not valid UTF-8".into())
        })?;
        Self::new(secret)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WebhookSecret(<redacted>)")
    }
}

impl TryFrom<String> for WebhookSecret {
    type Error = SignatureError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for WebhookSecret {
    type Error = SignatureError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            WebhookSecret::new(""),
            Err(SignatureError::InvalidSecret)
        ));
        assert!(matches!(
            WebhookSecret::from_bytes(Vec::new()),
            Err(SignatureError::InvalidSecret)
        ));
    }

    #[test]
    fn non_utf8_secret_is_an_encoding_error() {
        let err = WebhookSecret::from_bytes(vec![0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, SignatureError::Encoding(_)));
    }

    #[test]
    fn debug_is_redacted() {
        let secret = WebhookSecret::new("whsec_very_secret").unwrap();
        let rendered = format!("{secret:?}");
        assert!(!rendered.contains("whsec_very_secret"));
        assert_eq!(rendered, "WebhookSecret(<redacted>)");
    }

    #[test]
    fn try_from_str() {
        let secret = WebhookSecret::try_from("abc").unwrap();
        assert_eq!(secret.as_bytes(), b"abc");
    }
}
