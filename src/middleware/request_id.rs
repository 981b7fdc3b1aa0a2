//! Request-id propagation.
//!
//! Every request gets a correlation identifier before its handler runs:
//!
//! 1. Read `X-Request-ID` from the request. Surrounding whitespace is
//!    trimmed; a missing, empty or unreadable header counts as absent.
//! 2. If absent, generate a UUID v4.
//! 3. Bind it into the request's [`Context`].
//! 4. Echo it in the `X-Request-ID` response header.
//!
//! None of these steps can fail. Handlers read the id back with
//! [`from_context`]:
//!
//! ```rust
//! use rivet::middleware::request_id;
//! use rivet::{Request, Response};
//!
//! async fn handler(req: Request) -> Response {
//!     let id = request_id::from_context(req.context());
//!     tracing::info!(%id, "handling");
//!     Response::text(id.to_string())
//! }
//! ```

use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::Instrument;

use crate::context::{Context, RequestId};
use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;

/// `X-Request-ID`, used both to read the inbound id and to echo it back.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Middleware that binds a correlation identifier to every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestIdLayer;

impl RequestIdLayer {
    pub fn new() -> Self { Self }
}

impl Middleware for RequestIdLayer {
    fn call(&self, mut req: Request, next: Next) -> BoxFuture {
        let id = resolve(Some(req.headers()));
        req.set_context(with_context(req.context(), id.clone()));

        let span = tracing::info_span!("request", request_id = %id);
        Box::pin(
            async move {
                let mut resp = next.run(req).await;
                echo(Some(resp.headers_mut()), &id);
                resp
            }
            .instrument(span),
        )
    }
}

/// The trimmed, non-empty identifier supplied in `headers`, if any.
pub fn extract(headers: Option<&HeaderMap>) -> Option<RequestId> {
    let value = headers?.get(X_REQUEST_ID)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(RequestId::from(value))
}

/// The supplied identifier, or a freshly generated one.
pub fn resolve(headers: Option<&HeaderMap>) -> RequestId {
    extract(headers).unwrap_or_else(RequestId::generate)
}

/// Writes `id` into the response-header sink, when there is one.
///
/// An id that is not a legal header value is skipped with a warning.
pub fn echo(sink: Option<&mut HeaderMap>, id: &RequestId) {
    let Some(headers) = sink else { return };
    match HeaderValue::from_str(id.as_str()) {
        Ok(value) => {
            headers.insert(X_REQUEST_ID, value);
        }
        Err(_) => tracing::warn!(request_id = %id, "request id is not a valid header value"),
    }
}

/// The identifier bound in `ctx`.
///
/// Returns a freshly generated identifier when nothing was bound, for
/// example when the handler runs without [`RequestIdLayer`]. Never fails.
pub fn from_context(ctx: &Context) -> RequestId {
    ctx.request_id().cloned().unwrap_or_else(RequestId::generate)
}

/// A copy of `ctx` with `id` bound. `ctx` itself is not modified.
pub fn with_context(ctx: &Context, id: RequestId) -> Context {
    ctx.with_request_id(id)
}
