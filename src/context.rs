//! Request-scoped state.
//!
//! Every [`Request`](crate::Request) owns a [`Context`]. It travels with the
//! request through the middleware chain into the handler, so nothing has to
//! live in globals or thread-locals. Concurrent requests never see each
//! other's state.
//!
//! The only value carried today is the correlation identifier, written by
//! [`RequestIdLayer`](crate::middleware::RequestIdLayer) and read through
//! [`middleware::request_id::from_context`](crate::middleware::request_id::from_context).

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

// ── RequestId ─────────────────────────────────────────────────────────────────

/// Per-request correlation identifier.
///
/// Opaque, case-preserved and cheap to clone.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RequestId(Arc<str>);

impl RequestId {
    /// A fresh random identifier (UUID v4, hyphenated).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string().into())
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self { Self(id.into()) }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self { Self(id.into()) }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str { &self.0 }
}

// ── Context ───────────────────────────────────────────────────────────────────

/// Immutable bag of request-scoped values.
///
/// A `Context` is never modified in place. Binding a value produces a new
/// `Context`, so a copy handed to one part of the pipeline cannot be changed
/// by another.
#[derive(Clone, Debug, Default)]
pub struct Context {
    request_id: Option<RequestId>,
}

impl Context {
    pub fn new() -> Self { Self::default() }

    /// The bound correlation identifier, if any.
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Returns a copy of this context with `id` bound as the correlation
    /// identifier. `self` is left as it was.
    pub fn with_request_id(&self, id: RequestId) -> Self {
        let mut next = self.clone();
        next.request_id = Some(id);
        next
    }
}
