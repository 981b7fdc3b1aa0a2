//! Relational database settings.
//!
//! A DSN is built from a base (`user:pass@tcp(host:port)/db`) plus optional
//! query settings. [`DsnBuilder`] accumulates the settings as ordered
//! key/value pairs and serializes once:
//!
//! ```rust
//! use rivet::store::DsnBuilder;
//!
//! let query = DsnBuilder::new()
//!     .charset("utf8mb4")
//!     .set("parseTime", "true")
//!     .set("timeout", "")          // empty values are skipped
//!     .to_query();
//! assert_eq!(query, "charset=utf8mb4&parseTime=true");
//! ```

use std::time::Duration;

use serde::Deserialize;

/// Charset applied by [`DbConfig::default_dsn`].
pub const DEFAULT_CHARSET: &str = "utf8mb4";

/// Time zone applied by [`DbConfig::default_dsn`].
pub const DEFAULT_LOC: &str = "Asia/Shanghai";

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    #[default]
    Mysql,
    Sqlite,
}

/// `[database]`
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub user: String,
    pub pass: String,
    pub host: String,
    pub port: u16,
    pub db_name: String,
    pub driver: Driver,
    /// Hint for the driver layer: log statements instead of staying silent.
    /// See [`DbConfig::statement_log_level`].
    pub debug: bool,
    pub pool: PoolSettings,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            pass: String::new(),
            host: String::new(),
            port: 3306,
            db_name: String::new(),
            driver: Driver::default(),
            debug: false,
            pool: PoolSettings::default(),
        }
    }
}

impl DbConfig {
    /// Level a driver layer should log statements at, `None` for silent.
    pub fn statement_log_level(&self) -> Option<tracing::Level> {
        self.debug.then_some(tracing::Level::DEBUG)
    }

    /// The DSN with `settings` as its query string.
    ///
    /// For SQLite the DSN is the database path and `settings` is ignored.
    pub fn dsn(&self, settings: &DsnBuilder) -> String {
        match self.driver {
            Driver::Sqlite => self.db_name.clone(),
            Driver::Mysql => {
                let base = format!(
                    "{}:{}@tcp({}:{})/{}",
                    self.user, self.pass, self.host, self.port, self.db_name,
                );
                match settings.to_query() {
                    query if query.is_empty() => base,
                    query => format!("{base}?{query}"),
                }
            }
        }
    }

    /// The DSN with `settings` plus the default charset and time zone.
    /// Keys already present in `settings` keep their position and get the
    /// default value.
    pub fn default_dsn(&self, settings: DsnBuilder) -> String {
        self.dsn(&settings.charset(DEFAULT_CHARSET).loc(DEFAULT_LOC))
    }
}

// ── DsnBuilder ────────────────────────────────────────────────────────────────

/// Ordered DSN query settings.
#[derive(Clone, Debug, Default)]
pub struct DsnBuilder {
    pairs: Vec<(String, String)>,
}

impl DsnBuilder {
    pub fn new() -> Self { Self::default() }

    /// Sets `key` to `value`. An empty value is skipped; a repeated key is
    /// replaced in place.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value) = (key.into(), value.into());
        if value.is_empty() {
            return self;
        }
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
        self
    }

    pub fn charset(self, charset: &str) -> Self {
        self.set("charset", charset)
    }

    /// Time zone used to interpret `DATETIME` values.
    pub fn loc(self, loc: &str) -> Self {
        self.set("loc", loc)
    }

    pub fn is_empty(&self) -> bool { self.pairs.is_empty() }

    /// `k1=v1&k2=v2`, values percent-encoded.
    pub fn to_query(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

// ── PoolSettings ──────────────────────────────────────────────────────────────

/// Connection-pool limits.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PoolSettings {
    pub max_idle: u32,
    pub max_open: u32,
    #[serde(with = "super::secs", rename = "max_lifetime_secs")]
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self { max_idle: 10, max_open: 100, max_lifetime: Duration::from_secs(60 * 60) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DbConfig {
        DbConfig {
            user: "app".into(),
            pass: "pw".into(),
            host: "db".into(),
            db_name: "orders".into(),
            ..DbConfig::default()
        }
    }

    #[test]
    fn no_settings_means_no_question_mark() {
        assert_eq!(config().dsn(&DsnBuilder::new()), "app:pw@tcp(db:3306)/orders");
    }

    #[test]
    fn default_dsn_adds_charset_and_encoded_loc() {
        assert_eq!(
            config().default_dsn(DsnBuilder::new().set("parseTime", "true")),
            "app:pw@tcp(db:3306)/orders?parseTime=true&charset=utf8mb4&loc=Asia%2FShanghai",
        );
    }

    #[test]
    fn repeated_key_replaced_in_place() {
        let query = DsnBuilder::new()
            .charset("latin1")
            .set("timeout", "5s")
            .charset("utf8")
            .to_query();
        assert_eq!(query, "charset=utf8&timeout=5s");
    }

    #[test]
    fn empty_values_skipped() {
        assert!(DsnBuilder::new().set("loc", "").charset("").is_empty());
    }

    #[test]
    fn sqlite_dsn_is_the_path() {
        let db = DbConfig { driver: Driver::Sqlite, db_name: "/tmp/app.db".into(), ..config() };
        assert_eq!(db.default_dsn(DsnBuilder::new()), "/tmp/app.db");
    }

    #[test]
    fn statements_are_silent_unless_debug() {
        assert_eq!(config().statement_log_level(), None);
        let verbose = DbConfig { debug: true, ..config() };
        assert_eq!(verbose.statement_log_level(), Some(tracing::Level::DEBUG));
    }

    #[test]
    fn pool_defaults() {
        let pool = PoolSettings::default();
        assert_eq!((pool.max_idle, pool.max_open), (10, 100));
        assert_eq!(pool.max_lifetime, Duration::from_secs(3600));
    }
}
