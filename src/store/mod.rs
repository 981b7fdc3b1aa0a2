//! Connection settings for the data stores a service talks to.
//!
//! Pure configuration: nothing here opens a connection. Each type carries the
//! defaults a service should start from and renders the connection string
//! its driver expects.
//!
//! - [`database`]: relational DSN composition and pool limits
//! - [`cache`]: key/value cache client options
//! - [`object`]: object storage credentials and addressing

pub mod cache;
pub mod database;
pub mod object;

pub use cache::CacheOptions;
pub use database::{DbConfig, Driver, DsnBuilder, PoolSettings};
pub use object::ObjectStoreOptions;

/// Serde helper: a `Duration` written as whole seconds.
pub(crate) mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
