//! Precache manifest wire format.
//!
//! ```json
//! { "generated_at": "2024-09-01T00:00:00Z", "precache": ["/", "/app.js"] }
//! ```
//!
//! `generated_at` is optional and may be a string or a number (the generator
//! writes epoch seconds). `precache` is optional; an empty list counts as absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecacheManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precache: Option<Vec<String>>,
}

impl PrecacheManifest {
    /// Build a manifest stamped with epoch seconds, as the generator emits it.
    pub fn stamped(precache: Vec<String>, generated_at: i64) -> Self {
        Self { generated_at: Some(Value::from(generated_at)), precache: Some(precache) }
    }

    /// Parse a manifest body. Anything that is not a JSON object with the
    /// expected field types is rejected.
    pub fn parse(body: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(body).map_err(|e| Error::ManifestInvalid(e.to_string()))
    }

    /// The generation token this manifest asks for, string-converted.
    ///
    /// Falsy values (`null`, `false`, `""`, `0`) do not count.
    pub fn version_token(&self) -> Option<String> {
        match self.generated_at.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(number_token(n)),
            Value::Bool(true) => Some("true".into()),
            _ => None,
        }
    }

    /// The precache list, if present and non-empty.
    pub fn precache_urls(&self) -> Option<&[String]> {
        self.precache.as_deref().filter(|urls| !urls.is_empty())
    }
}

/// Integral floats print without a fractional part (`1.0` is `"1"`), matching
/// how a page script would stringify the same JSON number.
fn number_token(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}
