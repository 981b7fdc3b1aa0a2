//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Every request, matched or
//! not, runs through the middleware chain, so even a 404 carries its
//! `X-Request-ID`.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use http_body_util::Full;
use matchit::Router as MatchitRouter;

use crate::codec::{Codec, Codecs};
use crate::envelope;
use crate::handler::{ApiHandler, BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::middleware::{Chain, Middleware, Next};
use crate::request::Request;
use crate::status::StatusError;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Every builder method returns `self` so registrations chain:
///
/// ```rust,no_run
/// # use rivet::{Request, Response, StatusError};
/// # async fn get_user(_: Request) -> Result<&'static str, StatusError> { Ok("") }
/// # async fn upload(_: Request) -> Response { Response::text("") }
/// use http::Method;
/// use rivet::{Router, middleware::{RequestIdLayer, Trace}};
///
/// Router::new()
///     .layer(RequestIdLayer)
///     .layer(Trace)
///     .api(Method::GET, "/users/{id}", get_user)
///     .on(Method::PUT,  "/files/{name}", upload);
/// ```
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    middleware: Chain,
    codecs: Arc<Codecs>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            middleware: Arc::new(Vec::new()),
            codecs: Arc::new(Codecs::new()),
        }
    }

    /// Registers a raw handler: its return value is sent as-is.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or conflicts with an existing route.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, handler.into_boxed_handler())
    }

    /// Registers an API handler: `Ok` is wrapped in the success envelope,
    /// `Err` in the error envelope.
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or conflicts with an existing route.
    pub fn api<M>(self, method: Method, path: &str, handler: impl ApiHandler<M>) -> Self {
        self.add(method, path, handler.into_boxed_handler())
    }

    /// Appends a middleware. The first one added is the outermost.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        Arc::make_mut(&mut self.middleware).push(Arc::new(middleware));
        self
    }

    /// Registers a codec for content negotiation, replacing any codec with
    /// the same name.
    pub fn codec(mut self, codec: impl Codec) -> Self {
        Arc::make_mut(&mut self.codecs).register(codec);
        self
    }

    fn add(mut self, method: Method, path: &str, handler: BoxedHandler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Routes one fully-read request through the middleware chain and its
    /// handler.
    pub async fn call(&self, req: http::Request<Bytes>) -> http::Response<Full<Bytes>> {
        let (head, body) = req.into_parts();

        let (endpoint, params) = match self.lookup(&head.method, head.uri.path()) {
            Some(found) => found,
            None => {
                let err = self.unmatched(&head.method, head.uri.path());
                (Arc::new(Rejected(err)) as BoxedHandler, HashMap::new())
            }
        };

        self.run(Request::new(head, body, params, Arc::clone(&self.codecs)), endpoint).await
    }

    /// Answers a request the server could not read with `err`, still through
    /// the middleware chain so the reply carries its id and an envelope.
    pub(crate) async fn reject(
        &self,
        head: http::request::Parts,
        err: StatusError,
    ) -> http::Response<Full<Bytes>> {
        let req = Request::new(head, Bytes::new(), HashMap::new(), Arc::clone(&self.codecs));
        self.run(req, Arc::new(Rejected(err))).await
    }

    async fn run(&self, req: Request, endpoint: BoxedHandler) -> http::Response<Full<Bytes>> {
        Next::new(Arc::clone(&self.middleware), endpoint)
            .run(req)
            .await
            .into_inner()
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    fn unmatched(&self, method: &Method, path: &str) -> StatusError {
        let elsewhere = self.routes.iter()
            .any(|(m, tree)| m != method && tree.at(path).is_ok());
        if elsewhere {
            StatusError::method_not_allowed(
                "METHOD_NOT_ALLOWED",
                format!("method {method} not allowed for {path}"),
            )
        } else {
            StatusError::not_found("NOT_FOUND", format!("no route for {path}"))
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// Endpoint for requests that never reach a route: an error envelope.
struct Rejected(StatusError);

impl ErasedHandler for Rejected {
    fn call(&self, req: Request) -> BoxFuture {
        let resp = envelope::encode_error(req.negotiate().as_ref(), self.0.clone());
        Box::pin(async move { resp })
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::Value;

    use super::*;
    use crate::middleware::{RequestIdLayer, X_REQUEST_ID};

    #[tokio::test]
    async fn rejected_request_runs_the_chain() {
        let router = Router::new().layer(RequestIdLayer);
        let (head, ()) = http::Request::post("/upload")
            .header("x-request-id", "bad-body")
            .body(())
            .unwrap()
            .into_parts();

        let resp = router
            .reject(head, StatusError::bad_request("INVALID_BODY", "truncated"))
            .await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(resp.headers()[X_REQUEST_ID], "bad-body");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["code"], 400);
        assert_eq!(body["reason"], "INVALID_BODY");
        assert_eq!(body["message"], "truncated");
        assert_eq!(body["data"], Value::Null);
    }
}
