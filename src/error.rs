//! Unified error types.

use thiserror::Error;

use crate::codec::CodecError;
use crate::config::ConfigError;

/// A boxed, thread-safe error. The error type API handlers may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by rivet's fallible operations.
///
/// Application-level failures (not found, bad input, etc.) are expressed as
/// [`StatusError`](crate::StatusError) values and encoded into an error
/// envelope. This type surfaces infrastructure failures: binding a port,
/// accepting a connection, marshaling a reply, loading configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
