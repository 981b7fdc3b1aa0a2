//! Object storage credentials and addressing.

use serde::Deserialize;
use url::Url;

/// `[storage]`
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObjectStoreOptions {
    /// Region endpoint host, e.g. `oss-cn-hangzhou.aliyuncs.com`.
    pub endpoint: String,
    pub access_key_id: String,
    pub access_key_secret: String,
    pub bucket: String,
}

impl ObjectStoreOptions {
    /// Virtual-hosted URL of `key`: `https://<bucket>.<endpoint>/<key>`.
    ///
    /// Each segment of `key` is percent-encoded; `/` separators are kept.
    /// A scheme on `endpoint` is honoured.
    pub fn object_url(&self, key: &str) -> Result<Url, url::ParseError> {
        let (scheme, host) = match self.endpoint.split_once("://") {
            Some((scheme, host)) => (scheme, host),
            None => ("https", self.endpoint.as_str()),
        };
        let mut url = Url::parse(&format!(
            "{scheme}://{}.{}/",
            self.bucket,
            host.trim_end_matches('/'),
        ))?;
        // Only cannot-be-a-base URLs refuse segments; http(s) never does.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(key.trim_start_matches('/').split('/'));
        }
        Ok(url)
    }
}
