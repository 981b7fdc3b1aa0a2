//! Content negotiation and marshaling.
//!
//! A [`Codec`] turns a value into bytes in one wire format. [`Codecs`] is the
//! registry a [`Router`](crate::Router) consults to pick the codec for a
//! request from its `Accept` header. JSON and YAML are registered by default.
//!
//! Register your own by implementing [`Codec`]:
//!
//! ```rust
//! use rivet::codec::{Codec, CodecError};
//!
//! struct Text;
//!
//! impl Codec for Text {
//!     fn name(&self) -> &str { "plain" }
//!
//!     fn marshal(&self, value: &serde_json::Value) -> Result<Vec<u8>, CodecError> {
//!         Ok(value.to_string().into_bytes())
//!     }
//! }
//!
//! let app = rivet::Router::new().codec(Text);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use http::HeaderMap;
use http::header::ACCEPT;
use thiserror::Error;

/// Name of the codec used when negotiation finds nothing better.
pub const DEFAULT_CODEC: &str = "json";

/// Failure to marshal a value.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value could not be converted into the codec's data model.
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Anything a user-supplied codec wants to report.
    #[error("{0}")]
    Custom(String),
}

/// A wire format.
///
/// Codecs receive the envelope as a [`serde_json::Value`], so a payload must
/// fit that data model before any codec sees it. Integers beyond the `i64` /
/// `u64` range (a large `u128`, say) and maps with non-string keys are
/// rejected with [`CodecError::Encode`] whichever codec was negotiated.
/// Send such values as strings.
pub trait Codec: Send + Sync + 'static {
    /// Short name, used as the media subtype: `application/<name>`.
    fn name(&self) -> &str;

    fn marshal(&self, value: &serde_json::Value) -> Result<Vec<u8>, CodecError>;
}

/// `application/json`
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &str { "json" }

    fn marshal(&self, value: &serde_json::Value) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(value)?)
    }
}

/// `application/yaml`
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn name(&self) -> &str { "yaml" }

    fn marshal(&self, value: &serde_json::Value) -> Result<Vec<u8>, CodecError> {
        Ok(serde_yaml::to_string(value)?.into_bytes())
    }
}

/// `application/<codec-name>`
pub fn content_type(codec: &dyn Codec) -> String {
    format!("application/{}", codec.name())
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Codecs known to a router, keyed by name.
#[derive(Clone)]
pub struct Codecs {
    by_name: HashMap<String, Arc<dyn Codec>>,
}

impl Codecs {
    /// A registry with [`JsonCodec`] and [`YamlCodec`].
    pub fn new() -> Self {
        let mut codecs = Self::empty();
        codecs.register(JsonCodec);
        codecs.register(YamlCodec);
        codecs
    }

    /// A registry with nothing in it. Negotiation still falls back to JSON.
    pub fn empty() -> Self {
        Self { by_name: HashMap::new() }
    }

    /// Adds `codec`, replacing any codec already registered under its name.
    pub fn register(&mut self, codec: impl Codec) {
        self.by_name.insert(codec.name().to_ascii_lowercase(), Arc::new(codec));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Codec>> {
        self.by_name.get(&name.to_ascii_lowercase()).cloned()
    }

    /// Picks the codec for a request from its `Accept` header(s).
    ///
    /// Media ranges are tried in the order they appear; the first one whose
    /// subtype names a registered codec wins. Quality values are not ranked.
    pub fn for_request(&self, headers: &HeaderMap) -> Arc<dyn Codec> {
        headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .filter_map(subtype)
            .find_map(|name| self.get(name))
            .or_else(|| self.get(DEFAULT_CODEC))
            .unwrap_or_else(|| Arc::new(JsonCodec))
    }
}

impl Default for Codecs {
    fn default() -> Self { Self::new() }
}

/// Extracts the codec name from one media range.
///
/// `application/json; charset=utf-8` → `json`,
/// `application/vnd.acme+json` → `json`,
/// `*/*` → nothing.
fn subtype(range: &str) -> Option<&str> {
    let essence = range.split(';').next()?.trim();
    let (_, sub) = essence.split_once('/')?;
    let sub = sub.rsplit('+').next()?.trim();
    if sub.is_empty() || sub == "*" {
        return None;
    }
    Some(sub)
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    fn accept(values: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for v in values {
            headers.append(ACCEPT, HeaderValue::from_static(v));
        }
        headers
    }

    #[test]
    fn subtype_parsing() {
        assert_eq!(subtype("application/json"), Some("json"));
        assert_eq!(subtype(" application/yaml ; q=0.9"), Some("yaml"));
        assert_eq!(subtype("application/vnd.acme.v2+json"), Some("json"));
        assert_eq!(subtype("*/*"), None);
        assert_eq!(subtype("garbage"), None);
    }

    #[test]
    fn missing_accept_falls_back_to_json() {
        let codec = Codecs::new().for_request(&HeaderMap::new());
        assert_eq!(codec.name(), "json");
    }

    #[test]
    fn first_known_range_wins() {
        let codecs = Codecs::new();
        let headers = accept(&["text/html, application/yaml, application/json"]);
        assert_eq!(codecs.for_request(&headers).name(), "yaml");
    }

    #[test]
    fn later_accept_headers_are_consulted() {
        let codecs = Codecs::new();
        let headers = accept(&["text/html", "application/YAML"]);
        assert_eq!(codecs.for_request(&headers).name(), "yaml");
    }

    #[test]
    fn empty_registry_still_answers_json() {
        let headers = accept(&["application/yaml"]);
        assert_eq!(Codecs::empty().for_request(&headers).name(), "json");
    }

    #[test]
    fn register_replaces_by_name() {
        struct Loud;
        impl Codec for Loud {
            fn name(&self) -> &str { "json" }
            fn marshal(&self, _: &serde_json::Value) -> Result<Vec<u8>, CodecError> {
                Ok(b"LOUD".to_vec())
            }
        }

        let mut codecs = Codecs::new();
        codecs.register(Loud);
        let out = codecs.for_request(&HeaderMap::new()).marshal(&serde_json::json!({})).unwrap();
        assert_eq!(out, b"LOUD");
    }

    #[test]
    fn json_and_yaml_marshal() {
        let value = serde_json::json!({ "n": 1 });
        assert_eq!(JsonCodec.marshal(&value).unwrap(), br#"{"n":1}"#);
        assert_eq!(String::from_utf8(YamlCodec.marshal(&value).unwrap()).unwrap(), "n: 1\n");
        assert_eq!(content_type(&YamlCodec), "application/yaml");
    }
}
