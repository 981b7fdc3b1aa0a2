//! Per-request access log.

use std::time::Instant;

use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;

/// Logs one `info` event per request: method, path, status, latency.
///
/// Register it after [`RequestIdLayer`](super::RequestIdLayer) so the event
/// carries the request id.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Middleware for Trace {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let method = req.method().clone();
        let path = req.path().to_owned();
        let request_id = req.context().request_id().cloned();
        let start = Instant::now();

        Box::pin(async move {
            let resp = next.run(req).await;
            tracing::info!(
                request_id = request_id.as_ref().map(|id| id.as_str()),
                %method,
                %path,
                status = resp.status_code().as_u16(),
                latency_ms = start.elapsed().as_secs_f64() * 1000.0,
                "request completed",
            );
            resp
        })
    }
}
