//! Cache client options.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// `[cache]`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheOptions {
    /// `host:port`
    pub addr: String,
    pub pass: String,
    /// Logical database index.
    pub db: u32,
    pub max_retries: u32,
    pub pool_size: u32,
    pub min_idle_conns: u32,
    #[serde(with = "super::secs", rename = "dial_timeout_secs")]
    pub dial_timeout: Duration,
    #[serde(with = "super::secs", rename = "write_timeout_secs")]
    pub write_timeout: Duration,
    #[serde(with = "super::secs", rename = "read_timeout_secs")]
    pub read_timeout: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6379".to_owned(),
            pass: String::new(),
            db: 0,
            max_retries: 3,
            pool_size: 15,
            min_idle_conns: 10,
            dial_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(3),
            read_timeout: Duration::from_secs(3),
        }
    }
}

impl CacheOptions {
    /// `redis://[:pass@]addr/db`.
    ///
    /// The password is percent-encoded as URL userinfo, so a client parsing
    /// the URL recovers it byte for byte.
    pub fn url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("redis://{}/{}", self.addr, self.db))?;
        if !self.pass.is_empty() {
            url.set_password(Some(&self.pass)).map_err(|()| url::ParseError::EmptyHost)?;
        }
        Ok(url)
    }
}
