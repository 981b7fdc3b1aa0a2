//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: request-id propagation, structured tracing,
//! authentication-header inspection.
//!
//! A middleware receives the request and a [`Next`] continuation. Calling
//! [`Next::run`] hands the request to the rest of the chain and resolves to
//! its response:
//!
//! ```rust
//! use rivet::BoxFuture;
//! use rivet::middleware::{Middleware, Next};
//! use rivet::Request;
//!
//! struct PoweredBy;
//!
//! impl Middleware for PoweredBy {
//!     fn call(&self, req: Request, next: Next) -> BoxFuture {
//!         Box::pin(async move {
//!             let mut resp = next.run(req).await;
//!             resp.headers_mut().insert("x-powered-by", "rivet".parse().unwrap());
//!             resp
//!         })
//!     }
//! }
//! ```
//!
//! Layers run in registration order: the first one added with
//! [`Router::layer`](crate::Router::layer) is the outermost.
//!
//! Built-in middleware:
//! - [`RequestIdLayer`]: binds and echoes `X-Request-ID`
//! - [`Trace`]: one log line per request with method, path, status, latency

pub mod request_id;
pub mod trace;

use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler};
use crate::request::Request;

pub use request_id::{RequestIdLayer, X_REQUEST_ID};
pub use trace::Trace;

/// A request/response interceptor.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// The ordered middleware stack of a router.
pub(crate) type Chain = Arc<Vec<Arc<dyn Middleware>>>;

/// The remainder of the chain after the current middleware.
pub struct Next {
    chain: Chain,
    index: usize,
    endpoint: BoxedHandler,
}

impl Next {
    pub(crate) fn new(chain: Chain, endpoint: BoxedHandler) -> Self {
        Self { chain, index: 0, endpoint }
    }

    /// Passes `req` to the next middleware, or to the handler once the
    /// chain is exhausted.
    pub fn run(self, req: Request) -> BoxFuture {
        match self.chain.get(self.index).cloned() {
            Some(middleware) => {
                let next = Self { index: self.index + 1, ..self };
                middleware.call(req, next)
            }
            None => self.endpoint.call(req),
        }
    }
}
