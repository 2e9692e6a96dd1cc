//! Deterministic byte encoding of webhook payloads.
//!
//! The canonical form is compact JSON: no insignificant whitespace, `,`
//! between items, `:` between keys and values. By default every character
//! outside printable ASCII is written as a lowercase `\uXXXX` escape
//! (surrogate pairs above the BMP), which is what the provider's reference
//! signing tool emits. [`TextEscaping::Utf8`] writes such characters as raw
//! UTF-8 instead.
//!
//! Object keys keep the order in which the caller inserted them unless the
//! canonicalizer is configured with [`KeyOrder::Sorted`]. Signer and verifier
//! must agree on both settings, otherwise structurally equal payloads sign to
//! different tags.

use std::fmt;
use std::io;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use serde_json::{Map, Value};

use crate::error::{Result, SignatureError};

/// How object keys are ordered in the canonical form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyOrder {
    /// Keep the caller's insertion order. Matches what billing providers sign.
    #[default]
    Preserve,
    /// Sort keys lexicographically (by UTF-8 bytes) at every depth.
    Sorted,
}

/// How characters outside printable ASCII are written in strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEscaping {
    /// `\uXXXX` escapes; the output is pure ASCII.
    #[default]
    Ascii,
    /// Raw UTF-8.
    Utf8,
}

/// Error returned when parsing a [`KeyOrder`] or [`TextEscaping`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseOptionError {
    kind: &'static str,
    value: String,
}

impl fmt::Display for KeyOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preserve => write!(f, "preserve"),
            Self::Sorted => write!(f, "sorted"),
        }
    }
}

impl FromStr for KeyOrder {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> std::result::Result<Self, ParseOptionError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "sorted" => Ok(Self::Sorted),
            other => Err(ParseOptionError {
                kind: "key order",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TextEscaping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascii => write!(f, "ascii"),
            Self::Utf8 => write!(f, "utf8"),
        }
    }
}

impl FromStr for TextEscaping {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> std::result::Result<Self, ParseOptionError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascii" => Ok(Self::Ascii),
            "utf8" | "utf-8" => Ok(Self::Utf8),
            other => Err(ParseOptionError {
                kind: "text escaping",
                value: other.to_string(),
            }),
        }
    }
}

/// Canonical UTF-8 bytes of a payload.
///
/// Always valid UTF-8; the value is immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(String);

impl CanonicalBytes {
    /// The canonical bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// The canonical bytes as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of bytes in the canonical form.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical form is empty. Never true for canonicalizer output.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume and return the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Display for CanonicalBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compact formatter that escapes everything outside `' '..='~'`.
///
/// serde_json already escapes quotes, backslashes and control characters;
/// this adds DEL and every non-ASCII character.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Turns payloads into [`CanonicalBytes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Canonicalizer {
    key_order: KeyOrder,
    escaping: TextEscaping,
}

impl Canonicalizer {
    /// Create a canonicalizer with the given key ordering and ASCII escaping.
    #[must_use]
    pub fn new(key_order: KeyOrder) -> Self {
        Self {
            key_order,
            escaping: TextEscaping::default(),
        }
    }

    /// Use a different text escaping.
    #[must_use]
    pub fn with_escaping(mut self, escaping: TextEscaping) -> Self {
        self.escaping = escaping;
        self
    }

    /// The configured key ordering.
    #[must_use]
    pub fn key_order(&self) -> KeyOrder {
        self.key_order
    }

    /// The configured text escaping.
    #[must_use]
    pub fn escaping(&self) -> TextEscaping {
        self.escaping
    }

    /// Canonicalize a JSON value.
    ///
    /// # Arguments
    ///
    /// * `payload` - The payload tree; object keys are taken in map order
    ///
    /// # Returns
    ///
    /// The compact encoding under the configured key order and escaping.
    /// Equal trees always give byte-identical output.
    pub fn canonicalize(&self, payload: &Value) -> Result<CanonicalBytes> {
        let sorted;
        let payload = match self.key_order {
            KeyOrder::Preserve => payload,
            KeyOrder::Sorted => {
                sorted = sort_keys(payload);
                &sorted
            }
        };

        let encoded = match self.escaping {
            TextEscaping::Utf8 => serde_json::to_string(payload)?,
            TextEscaping::Ascii => {
                let mut buf = Vec::with_capacity(128);
                let mut serializer =
                    serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter);
                payload.serialize(&mut serializer)?;
                String::from_utf8(buf).map_err(|e| SignatureError::Encoding(e.to_string()))?
            }
        };

        tracing::debug!(
            key_order = %self.key_order,
            escaping = %self.escaping,
            len = encoded.len(),
            "Canonicalized webhook payload"
        );

        Ok(CanonicalBytes(encoded))
    }

    /// Canonicalize any serializable value.
    ///
    /// Struct fields are emitted in declaration order. Hash maps have no
    /// stable order; use [`KeyOrder::Sorted`] or an ordered map for them.
    /// Non-finite floats are converted to `null` by `serde_json` before they
    /// reach the canonicalizer, so callers holding `f64` fields must reject
    /// them first.
    pub fn canonicalize_serialize<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<CanonicalBytes> {
        let value = serde_json::to_value(payload)?;
        self.canonicalize(&value)
    }

    /// Parse JSON text and re-emit it in canonical form.
    ///
    /// Key order in the text is kept (or sorted, per configuration). Text
    /// that is not valid JSON, including `NaN` and `Infinity` literals, is a
    /// serialization error.
    pub fn canonicalize_str(&self, text: &str) -> Result<CanonicalBytes> {
        let value: Value = serde_json::from_str(text)?;
        self.canonicalize(&value)
    }
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
