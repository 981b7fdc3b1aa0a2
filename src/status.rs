//! Structured application errors.
//!
//! Every error a handler returns ends up on the wire as an error envelope
//! carrying three fields: a numeric `code`, a human `message` and a
//! machine-readable `reason` token. [`StatusError`] is that model.
//!
//! ```rust
//! use rivet::StatusError;
//!
//! let err = StatusError::not_found("USER_NOT_FOUND", "user 42 does not exist");
//! assert_eq!(err.code(), 404);
//! assert_eq!(err.reason(), "USER_NOT_FOUND");
//! ```
//!
//! Handlers may also fail with any other error type. Those are normalized by
//! [`StatusError::from_error`]: a `StatusError` found anywhere in the
//! `source()` chain wins, everything else becomes a generic 500.

use thiserror::Error;

use crate::error::BoxError;

/// Code given to errors that carry no structured status.
pub const UNKNOWN_CODE: i32 = 500;

/// Reason given to errors that carry no structured status.
pub const UNKNOWN_REASON: &str = "";

/// An application error with a code, a reason token and a message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("error: code = {code} reason = {reason} message = {message}")]
pub struct StatusError {
    code: i32,
    reason: String,
    message: String,
}

impl StatusError {
    pub fn new(code: i32, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code, reason: reason.into(), message: message.into() }
    }

    pub fn code(&self) -> i32 { self.code }
    pub fn reason(&self) -> &str { &self.reason }
    pub fn message(&self) -> &str { &self.message }

    /// Normalizes any error into the structured model.
    ///
    /// The error itself, then each error in its `source()` chain, is checked
    /// for a `StatusError`. If none is found the result is
    /// `UNKNOWN_CODE` / `UNKNOWN_REASON` with the error's display text as
    /// the message.
    pub fn from_error(err: BoxError) -> Self {
        let err = match err.downcast::<StatusError>() {
            Ok(status) => return *status,
            Err(err) => err,
        };

        let mut source = err.source();
        while let Some(cause) = source {
            if let Some(status) = cause.downcast_ref::<StatusError>() {
                return status.clone();
            }
            source = cause.source();
        }

        Self::new(UNKNOWN_CODE, UNKNOWN_REASON, err.to_string())
    }

    // ── Common codes ─────────────────────────────────────────────────────────

    /// 400
    pub fn bad_request(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(400, reason, message)
    }

    /// 401
    pub fn unauthorized(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(401, reason, message)
    }

    /// 403
    pub fn forbidden(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(403, reason, message)
    }

    /// 404
    pub fn not_found(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(404, reason, message)
    }

    /// 405
    pub fn method_not_allowed(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(405, reason, message)
    }

    /// 409
    pub fn conflict(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(409, reason, message)
    }

    /// 500
    pub fn internal(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(500, reason, message)
    }

    /// 503
    pub fn service_unavailable(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(503, reason, message)
    }

    /// 504
    pub fn gateway_timeout(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(504, reason, message)
    }
}
